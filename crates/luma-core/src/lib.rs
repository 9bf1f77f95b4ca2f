pub mod config;
pub mod error;
pub mod types;

pub use config::LumaConfig;
pub use error::{LumaError, Result};
pub use types::*;
