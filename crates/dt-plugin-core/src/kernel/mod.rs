pub mod bootstrap;
pub mod constants;
pub mod error;

pub use bootstrap::Application;
