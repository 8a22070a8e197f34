pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod parsers;
pub mod protocol;
pub mod services;

pub use config::AppConfig;
pub use error::{Result, ReviewError};
pub use protocol::Runtime;
