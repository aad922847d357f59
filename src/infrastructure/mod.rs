//! Infrastructure layer - external adapters (config file, input streams).

pub mod config;
pub mod source;

pub use config::{config_file_path, ensure_config_exists, load_config, AppConfig};
pub use source::open_source;
