use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Utc};
use handlebars::{Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use serde::Serialize;

use crate::kernel::error::Result;
use crate::utils::fs::{find_files_with_extension, relative_stem};
use crate::view::error::ViewError;

/// File extension of view templates
pub const VIEW_EXTENSION: &str = "hbs";

/// Named view templates.
///
/// Views are Handlebars templates named by their path relative to the views
/// directory, without extension (`settings/general`). Every view is also a
/// partial, so layouts wrap a view with a partial block:
///
/// ```handlebars
/// {{#> layouts/plugin}}<p>body</p>{{/layouts/plugin}}
/// ```
#[derive(Debug)]
pub struct ViewEngine {
    registry: Handlebars<'static>,
    directory: Option<PathBuf>,
}

impl Default for ViewEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn year_helper(_: &Helper, _: &Handlebars, _: &Context, _: &mut RenderContext, out: &mut dyn Output) -> HelperResult {
    out.write(&Utc::now().year().to_string())?;
    Ok(())
}

impl ViewEngine {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        registry.register_helper("year", Box::new(year_helper));
        Self { registry, directory: None }
    }

    /// Load every `*.hbs` file under `directory`. A missing directory
    /// yields an engine without views.
    pub fn from_directory(directory: &Path) -> Result<Self> {
        let mut engine = Self::new();
        let files = find_files_with_extension(directory, VIEW_EXTENSION)
            .map_err(|source| ViewError::Io { path: directory.to_path_buf(), source })?;
        for file in files {
            let Some(name) = relative_stem(directory, &file) else { continue };
            let source = fs::read_to_string(&file).map_err(|source| ViewError::Io { path: file.clone(), source })?;
            engine.register_template(&name, &source)?;
        }
        log::debug!("Loaded {} views from {:?}", engine.names().len(), directory);
        engine.directory = Some(directory.to_path_buf());
        Ok(engine)
    }

    pub fn register_template(&mut self, name: &str, source: &str) -> Result<()> {
        self.registry
            .register_template_string(name, source)
            .map_err(|e| ViewError::Template { name: name.to_string(), message: e.to_string() })?;
        Ok(())
    }

    pub fn has(&self, name: &str) -> bool {
        self.registry.has_template(name)
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String> {
        if !self.has(name) {
            return Err(ViewError::NotFound { name: name.to_string() }.into());
        }
        self.registry
            .render(name, data)
            .map_err(|e| ViewError::Render { name: name.to_string(), message: e.to_string() }.into())
    }

    /// Registered view names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry.get_templates().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }
}
