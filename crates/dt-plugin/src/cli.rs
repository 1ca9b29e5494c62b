use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{json, Value};

use dt_plugin_core::admin::settings::{PARENT_MENU_SLUG, SETTINGS_ROUTE_FILE};
use dt_plugin_core::controllers::magic_link::STARTER_MAGIC_APP;
use dt_plugin_core::controllers::settings::SETTINGS_NONCE_ACTION;
use dt_plugin_core::host::{AdminMenu, AdminNotices, NonceVerifier};
use dt_plugin_core::http::{Method, ResponseRenderer, SharedBuffer};
use dt_plugin_core::kernel::constants::{
    ADMIN_MENU_ACTION, ADMIN_NOTICES_ACTION, DT_PLUGINS_FILTER, INIT_ACTION, PLUGIN_SLUG, TEMPLATE_REDIRECT_ACTION,
    WP_LOADED_ACTION,
};
use dt_plugin_core::magic_link::MagicLinks;
use dt_plugin_core::support::UrlGenerator;
use dt_plugin_core::{Application, Config, Error, HostServices, MemoryHost, Request, Result, Route};

/// Runs one command against a freshly booted plugin.
///
/// Each command gets its own [`MemoryHost`] and [`Application`], the way a
/// host serves each request from a clean process.
#[derive(Debug)]
pub struct Simulator {
    root: PathBuf,
    host: Arc<MemoryHost>,
}

impl Simulator {
    pub fn new(root: PathBuf, theme_version: Option<String>) -> Self {
        let host = Arc::new(MemoryHost::new());
        if let Some(version) = theme_version {
            host.set_theme("Disciple.Tools", &version, true);
        }
        Self { root, host }
    }

    async fn boot(&self, request: Request) -> Result<(Application, SharedBuffer)> {
        let (renderer, output) = ResponseRenderer::buffered();
        let mut app = Application::new(&self.root, HostServices::memory(self.host.clone()))
            .with_request(request)
            .with_renderer(Arc::new(renderer));
        app.boot().await?;
        app.fire(INIT_ACTION, Value::Null).await?;
        app.fire(WP_LOADED_ACTION, Value::Null).await?;
        Ok((app, output))
    }

    /// Admin notices queued so far, one per line.
    async fn notices(&self, app: &Application) -> Result<String> {
        app.fire(ADMIN_NOTICES_ACTION, Value::Null).await?;
        let notices = self.host.notices();
        Ok(notices
            .iter()
            .map(|notice| format!("[{:?}] {}", notice.level, notice.message))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        form: &[(String, String)],
        headers: &[(String, String)],
        nonce: Option<&str>,
    ) -> Result<String> {
        let mut request = Request::parse(method, uri)?;
        if !form.is_empty() {
            request = request.with_form(form.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        for (name, value) in headers {
            request = request.with_header(name, value)?;
        }
        if let Some(action) = nonce {
            request = request.with_header("X-WP-Nonce", &self.host.create_nonce(action))?;
        }

        let (app, output) = self.boot(request).await?;
        app.fire(TEMPLATE_REDIRECT_ACTION, Value::Null).await?;

        let rendered = output.contents();
        if rendered.is_empty() {
            return Ok(format!("{} {} is not handled by the plugin", method.to_ascii_uppercase(), uri));
        }
        Ok(rendered)
    }

    pub async fn admin(&self, tab: &str, fields: &[(String, String)]) -> Result<String> {
        let uri = format!("/wp-admin/admin.php?page={}&tab={}", PLUGIN_SLUG, tab);
        let request = if fields.is_empty() {
            Request::get(&uri)
        } else {
            let nonce = self.host.create_nonce(SETTINGS_NONCE_ACTION);
            let mut form: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
            form.push(("_wpnonce", nonce.as_str()));
            Request::new(Method::POST, &uri).with_form(form)
        };

        let (app, output) = self.boot(request).await?;
        let notices = self.notices(&app).await?;
        if !notices.is_empty() {
            return Ok(notices);
        }

        app.fire(ADMIN_MENU_ACTION, Value::Null).await?;
        let hook = self
            .host
            .page_hook(PLUGIN_SLUG)
            .ok_or_else(|| Error::Other(format!("Settings page was not added under {}", PARENT_MENU_SLUG)))?;
        app.fire(&format!("load-{}", hook), Value::Null).await?;
        Ok(output.contents())
    }

    pub async fn plugins(&self) -> Result<String> {
        let (app, _) = self.boot(Request::get("/")).await?;
        let plugins = app.filter(DT_PLUGINS_FILTER, json!({})).await?;
        pretty(&plugins)
    }

    pub async fn config(&self, key: Option<&str>) -> Result<String> {
        let (app, _) = self.boot(Request::get("/")).await?;
        let config = app.container().get::<Config>()?;
        match key {
            Some(key) => {
                let value = config
                    .value(key)
                    .ok_or_else(|| Error::Other(format!("No configuration value at '{}'", key)))?;
                pretty(value)
            }
            None => pretty(&config.as_value()),
        }
    }

    pub async fn routes(&self) -> Result<String> {
        let (app, _) = self.boot(Request::get("/")).await?;
        let container = app.container();
        let urls = container.get::<UrlGenerator>()?;

        let mut files: Vec<String> = urls.route_files().values().map(|file| file.file.clone()).collect();
        files.push(SETTINGS_ROUTE_FILE.to_string());

        let mut lines = Vec::new();
        for file in files {
            lines.push(format!("{}:", file));
            let route = Route::from_container(container)?.from_route_file(&file)?;
            for entry in route.router().routes() {
                let mut line = format!("  {:<7} {} -> {}", entry.method().as_str(), entry.pattern(), entry.handler_name());
                if !entry.middleware_names().is_empty() {
                    line.push_str(&format!(" [{}]", entry.middleware_names().join(", ")));
                }
                lines.push(line);
            }
        }
        Ok(lines.join("\n"))
    }

    pub async fn magic_link(&self, user_id: u64) -> Result<String> {
        let (app, _) = self.boot(Request::get("/")).await?;
        let links = app.container().get::<MagicLinks>()?;
        links.url(PLUGIN_SLUG, STARTER_MAGIC_APP, user_id).await
    }
}

fn pretty(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| Error::Other(e.to_string()))
}
