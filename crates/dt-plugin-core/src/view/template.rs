use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::kernel::error::Result;
use crate::view::engine::ViewEngine;

/// Renders views inside the plugin's page layout.
///
/// The layout receives the view's data plus the rendered view as
/// `content`. Without a registered layout the view is returned as is.
#[derive(Debug, Clone)]
pub struct Template {
    engine: Arc<ViewEngine>,
    layout: String,
}

impl Template {
    pub fn new(engine: Arc<ViewEngine>, layout: &str) -> Self {
        Self { engine, layout: layout.to_string() }
    }

    pub fn layout(&self) -> &str {
        &self.layout
    }

    pub fn render<T: Serialize>(&self, view: &str, data: &T) -> Result<String> {
        let content = self.engine.render(view, data)?;
        if !self.engine.has(&self.layout) {
            log::debug!("Layout '{}' not registered; rendering '{}' bare", self.layout, view);
            return Ok(content);
        }
        let mut context = match serde_json::to_value(data) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        context.insert("content".to_string(), Value::String(content));
        self.engine.render(&self.layout, &context)
    }
}
