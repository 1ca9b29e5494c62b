use std::sync::Arc;

use serde_json::json;

use crate::container::Container;
use crate::http::{Request, Response};
use crate::kernel::error::Result;
use crate::support::UrlGenerator;
use crate::view::Template;

/// The public example page under the `web` route file.
#[derive(Debug, Clone)]
pub struct HelloController {
    template: Arc<Template>,
    urls: Arc<UrlGenerator>,
}

impl HelloController {
    pub fn from_container(container: &Container) -> Result<Self> {
        Ok(Self {
            template: container.get::<Template>()?,
            urls: container.get::<UrlGenerator>()?,
        })
    }

    pub fn show(&self, request: &Request, _response: Response) -> Result<Response> {
        let name = request.param("name").unwrap_or("World");
        let body = self.template.render(
            "hello",
            &json!({
                "name": name,
                "api_url": self.urls.api_url("hello")?,
            }),
        )?;
        Ok(Response::html(body))
    }
}
