// Keylayer Config API
// TOML layer definitions -> layer tree + document settings

pub mod parser;

pub use parser::{Config, ConfigError, ConfigToml, LeaderConfig, OutputConfig};
