#![cfg(test)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::host::{HostServices, MemoryHost};
use crate::http::{Request, ResponseRenderer, SharedBuffer};
use crate::kernel::bootstrap::Application;

/// The repository's own plugin directory (config, routes, views).
pub fn plugin_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// A booted application over an in-memory host, rendering into a buffer.
pub struct TestApp {
    pub app: Application,
    pub host: Arc<MemoryHost>,
    pub output: SharedBuffer,
}

impl TestApp {
    pub async fn fire(&self, name: &str) -> usize {
        self.app.fire(name, Value::Null).await.unwrap()
    }

    /// Everything rendered so far.
    pub fn output(&self) -> String {
        self.output.contents()
    }
}

pub async fn boot(request: Request) -> TestApp {
    boot_with(&plugin_root(), Arc::new(MemoryHost::new()), request).await
}

pub async fn boot_with(root: &Path, host: Arc<MemoryHost>, request: Request) -> TestApp {
    let (renderer, output) = ResponseRenderer::buffered();
    let mut app = Application::new(root, HostServices::memory(host.clone()))
        .with_request(request)
        .with_renderer(Arc::new(renderer));
    app.boot().await.unwrap();
    TestApp { app, host, output }
}

/// A plugin directory seeded from the repository's, so a test can change
/// single files.
pub fn copy_plugin_root(target: &Path) {
    for dir in ["config", "routes", "resources"] {
        copy_dir(&plugin_root().join(dir), &target.join(dir));
    }
}

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), target).unwrap();
        }
    }
}
