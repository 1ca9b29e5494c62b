use std::sync::Arc;

use http::StatusCode;
use serde_json::{json, Value};

use crate::container::Container;
use crate::host::{DataStore, NonceVerifier};
use crate::http::{Request, Response};
use crate::kernel::error::Result;
use crate::options::Options;
use crate::persistence::transaction;
use crate::validation::SchemaValidator;
use crate::view::Template;

/// Nonce action guarding the settings form
pub const SETTINGS_NONCE_ACTION: &str = "dt_plugin_settings";

/// Where a successful update sends the browser
pub const SETTINGS_UPDATED_URL: &str = "admin.php?page=dt-plugin&tab=general&updated=1";

const DEFAULT_GREETING: &str = "Hello";

/// The plugin's settings screen: the "General" tab and its form.
#[derive(Clone)]
pub struct SettingsController {
    template: Arc<Template>,
    options: Arc<Options>,
    nonces: Arc<dyn NonceVerifier>,
    validator: Arc<SchemaValidator>,
    data: Arc<dyn DataStore>,
}

impl std::fmt::Debug for SettingsController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsController").field("options", &self.options).finish_non_exhaustive()
    }
}

fn general_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "greeting": { "type": "string", "minLength": 1, "maxLength": 200 }
        },
        "required": ["greeting"]
    })
}

impl SettingsController {
    pub fn from_container(container: &Container) -> Result<Self> {
        Ok(Self {
            template: container.get::<Template>()?,
            options: container.get::<Options>()?,
            nonces: container.get::<dyn NonceVerifier>()?,
            validator: container.get::<SchemaValidator>()?,
            data: container.get::<dyn DataStore>()?,
        })
    }

    pub fn show(&self, request: &Request, _response: Response) -> Result<Response> {
        let greeting = self
            .options
            .get("greeting", None, true)?
            .unwrap_or_else(|| json!(DEFAULT_GREETING));
        let body = self.template.render(
            "settings/general",
            &json!({
                "tabs": request.attribute("tabs").cloned().unwrap_or_else(|| json!([])),
                "tab": request.param("tab").unwrap_or("general"),
                "nonce": self.nonces.create_nonce(SETTINGS_NONCE_ACTION),
                "greeting": greeting,
                "updated": request.input("updated").is_some(),
            }),
        )?;
        Ok(Response::html(body))
    }

    /// Validate and store the form. Invalid input gives `422` with the
    /// validation message; a store failure gives `500` with the raw store
    /// message.
    pub fn update(&self, request: &Request, _response: Response) -> Result<Response> {
        let input = json!({ "greeting": request.input("greeting") });
        let data = match self.validator.validate(&general_schema(), &input) {
            Ok(data) => data,
            Err(message) => {
                return Ok(Response::html(message).with_status(StatusCode::UNPROCESSABLE_ENTITY));
            }
        };

        let outcome = transaction(self.data.as_ref(), || {
            self.options
                .set("greeting", data["greeting"].clone())
                .map(|_| ())
                .map_err(|e| e.to_string())
        });
        if let Err(e) = outcome {
            log::error!("Failed to save settings: {}", e);
            return Ok(Response::html(e.message()).with_status(StatusCode::INTERNAL_SERVER_ERROR));
        }

        Response::redirect(SETTINGS_UPDATED_URL, StatusCode::FOUND)
    }
}
