pub mod config;
pub mod error;
pub mod types;
pub mod vm;

pub use config::*;
pub use error::*;
pub use types::*;
pub use vm::*;
