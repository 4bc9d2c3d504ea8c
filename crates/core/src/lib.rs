pub mod config;
pub mod error;
pub mod filing;

pub use config::Config;
pub use error::*;
pub use filing::*;
