mod router_config;

pub use router_config::{ConfigError, RouterConfig, get_config_file_path};
