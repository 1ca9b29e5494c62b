//! # Hook Errors
//!
//! Errors raised while registering hook callbacks or running them.
use thiserror::Error;

use crate::hooks::{HookId, HookKind};
use crate::kernel::error::Error as KernelError;

#[derive(Debug, Error)]
pub enum HookError {
    #[error("Cannot register a {kind:?} callback under an empty hook name")]
    EmptyName { kind: HookKind },

    #[error("No hook callback registered with ID {id}")]
    UnknownCallback { id: HookId },

    #[error("Callback {id} for {kind:?} '{hook}' failed: {source}")]
    CallbackFailed {
        hook: String,
        kind: HookKind,
        id: HookId,
        #[source]
        source: Box<KernelError>,
    },
}
