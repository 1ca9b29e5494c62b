use std::sync::Arc;

use async_trait::async_trait;

use crate::container::Registrar;
use crate::kernel::error::Result;
use crate::providers::{Boot, BootContext, Register};
use crate::validation::SchemaValidator;

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationServiceProvider;

impl Register for ValidationServiceProvider {
    fn name(&self) -> &'static str {
        "ValidationServiceProvider"
    }

    fn register(&self, registrar: &Registrar<'_>) -> Result<()> {
        registrar.bind::<SchemaValidator, _>(|_| Ok(Arc::new(SchemaValidator::new())))
    }
}

#[async_trait]
impl Boot for ValidationServiceProvider {
    async fn boot(&self, _cx: &BootContext) -> Result<()> {
        Ok(())
    }
}
