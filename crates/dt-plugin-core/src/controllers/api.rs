use serde_json::json;

use crate::container::Container;
use crate::http::{Request, Response};
use crate::kernel::constants::VERSION;
use crate::kernel::error::Result;

/// JSON endpoints under the `api` route file.
#[derive(Debug, Clone, Default)]
pub struct ApiController;

impl ApiController {
    pub fn from_container(_container: &Container) -> Result<Self> {
        Ok(Self)
    }

    pub fn hello(&self, request: &Request, _response: Response) -> Result<Response> {
        let name = request.input("name").unwrap_or_else(|| "World".to_string());
        Ok(Response::json(&json!({
            "message": format!("Hello, {}!", name),
            "version": VERSION,
        })))
    }
}
