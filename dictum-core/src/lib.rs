pub mod config;
pub mod error;
pub mod yaml;

pub use config::{
    ConfigWarning, DictionaryPath, GLOBAL_SCOPE, LocaleConfig, MissingDictionary, Scope, Suppress,
};
pub use error::ConfigError;
pub use yaml::YamlLoaderError;
