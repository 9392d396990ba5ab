//! Persistent configuration for rtproxy.
//!
//! Settings live in `~/.rtproxy/config.ini`. A missing file yields the
//! built-in defaults; values present in the file override them, and command
//! line flags override both.
//!
//! # Example
//!
//! ```
//! use rtproxy::config::{ConfigFile, ConfigKey};
//!
//! let mut config = ConfigFile::default();
//! let key: ConfigKey = "publish.mode".parse().unwrap();
//! key.set(&mut config, "single").unwrap();
//! assert_eq!(key.get(&config), "single");
//! ```

mod defaults;
mod file;
mod keys;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use keys::{ConfigKey, ConfigKeyError};
pub use settings::{ConfigFile, ListenSettings, LoggingSettings, PublishSettings};
