use std::sync::Arc;

use serde_json::json;

use crate::container::Container;
use crate::host::{CurrentUser, PostMetaStore};
use crate::http::{Request, Response};
use crate::kernel::constants::PLUGIN_SLUG;
use crate::kernel::error::Result;
use crate::magic_link::MagicApp;
use crate::support::UrlGenerator;
use crate::view::Template;

/// Type name of the bundled magic-link app
pub const STARTER_MAGIC_APP: &str = "starter-magic-link";

/// The bundled magic-link app: one secret link per user record.
pub fn starter_app() -> MagicApp {
    MagicApp {
        root: PLUGIN_SLUG.to_string(),
        kind: STARTER_MAGIC_APP.to_string(),
        post_type: "user".to_string(),
        meta_key: format!("{}_{}_magic_key", PLUGIN_SLUG, STARTER_MAGIC_APP),
        label: "Starter Magic Link".to_string(),
    }
}

/// Pages reached through the starter magic link.
#[derive(Clone)]
pub struct MagicLinkController {
    app: MagicApp,
    template: Arc<Template>,
    meta: Arc<dyn PostMetaStore>,
    user: Arc<dyn CurrentUser>,
    urls: Arc<UrlGenerator>,
}

impl std::fmt::Debug for MagicLinkController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MagicLinkController").field("app", &self.app).finish_non_exhaustive()
    }
}

impl MagicLinkController {
    pub fn from_container(container: &Container) -> Result<Self> {
        Ok(Self {
            app: starter_app(),
            template: container.get::<Template>()?,
            meta: container.get::<dyn PostMetaStore>()?,
            user: container.get::<dyn CurrentUser>()?,
            urls: container.get::<UrlGenerator>()?,
        })
    }

    /// `404` unless the `key` route parameter belongs to a record.
    fn authorize(&self, request: &Request) -> Option<(u64, String)> {
        let key = request.param("key")?;
        let record = self.meta.find_post_by_meta(&self.app.meta_key, key)?;
        Some((record, key.to_string()))
    }

    pub fn show(&self, request: &Request, _response: Response) -> Result<Response> {
        let Some((record, key)) = self.authorize(request) else {
            return Ok(Response::not_found());
        };
        log::debug!("Magic link opened for record {}", record);
        let subpage_url = self
            .urls
            .route_url(&format!("{}/{}/subpage", self.app.kind, key), "magic")?;
        let body = self.template.render(
            "starter-magic-link/show",
            &json!({
                "user": { "ID": record, "user_nicename": self.user.display_name() },
                "subpage_url": subpage_url,
            }),
        )?;
        Ok(Response::html(body))
    }

    pub fn subpage(&self, request: &Request, _response: Response) -> Result<Response> {
        let Some((_, key)) = self.authorize(request) else {
            return Ok(Response::not_found());
        };
        let body = self.template.render(
            "starter-magic-link/subpage",
            &json!({
                "user": { "user_nicename": self.user.display_name() },
                "back_url": self.urls.route_url(&format!("{}/{}", self.app.kind, key), "magic")?,
            }),
        )?;
        Ok(Response::html(body))
    }
}
