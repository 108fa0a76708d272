//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `MUVERA_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_EMBEDDING_DIM, DEFAULT_LEXICAL_WEIGHT, DEFAULT_RATE_LIMIT_PER_MINUTE,
    DEFAULT_SEARCH_TIMEOUT_SECS, DEFAULT_SEMANTIC_WEIGHT,
};

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `MUVERA_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Data directory. The corpus is read from `processed/passages.jsonl`. Default: `./data`.
    pub data_dir: PathBuf,

    /// Path to the sentence-embedding model directory (BERT + tokenizer).
    pub model_path: Option<PathBuf>,

    /// Qdrant endpoint URL. Default: `http://localhost:6334`.
    pub qdrant_url: String,

    /// Qdrant collection holding document vectors. Default: `semantic_search`.
    pub collection_name: String,

    /// Dense embedding dimension. Default: `384`.
    pub vector_size: usize,

    /// Base URL of the tensor backend used for multi-vector indexing.
    pub tensor_url: Option<String>,

    /// Timeout applied to embedding and backend calls. Default: `30`.
    pub search_timeout_secs: u64,

    /// Global rate-limiter switch. Default: `true`.
    pub rate_limit_enabled: bool,

    /// Requests per minute allowed on the search route. Default: `60`.
    pub rate_limit_per_minute: u32,

    /// Fusion weight of the semantic source. Default: `0.7`.
    pub semantic_weight: f32,

    /// Fusion weight of the lexical source. Default: `0.3`.
    pub lexical_weight: f32,
}

/// Default Qdrant URL used when `MUVERA_QDRANT_URL` is not set.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

/// Default collection name used when `MUVERA_COLLECTION` is not set.
pub const DEFAULT_COLLECTION_NAME: &str = "semantic_search";

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            data_dir: PathBuf::from("./data"),
            model_path: None,
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
            vector_size: DEFAULT_EMBEDDING_DIM,
            tensor_url: None,
            search_timeout_secs: DEFAULT_SEARCH_TIMEOUT_SECS,
            rate_limit_enabled: true,
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
            semantic_weight: DEFAULT_SEMANTIC_WEIGHT,
            lexical_weight: DEFAULT_LEXICAL_WEIGHT,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "MUVERA_PORT";
    const ENV_BIND_ADDR: &'static str = "MUVERA_BIND_ADDR";
    const ENV_DATA_DIR: &'static str = "MUVERA_DATA_DIR";
    const ENV_MODEL_PATH: &'static str = "MUVERA_MODEL_PATH";
    const ENV_QDRANT_URL: &'static str = "MUVERA_QDRANT_URL";
    const ENV_COLLECTION: &'static str = "MUVERA_COLLECTION";
    const ENV_VECTOR_SIZE: &'static str = "MUVERA_VECTOR_SIZE";
    const ENV_TENSOR_URL: &'static str = "MUVERA_TENSOR_URL";
    const ENV_SEARCH_TIMEOUT: &'static str = "MUVERA_SEARCH_TIMEOUT_SECS";
    const ENV_RATE_LIMIT_ENABLED: &'static str = "MUVERA_RATE_LIMIT_ENABLED";
    const ENV_RATE_LIMIT_PER_MINUTE: &'static str = "MUVERA_RATE_LIMIT_PER_MINUTE";
    const ENV_SEMANTIC_WEIGHT: &'static str = "MUVERA_SEMANTIC_WEIGHT";
    const ENV_LEXICAL_WEIGHT: &'static str = "MUVERA_LEXICAL_WEIGHT";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let data_dir = Self::parse_path_from_env(Self::ENV_DATA_DIR, defaults.data_dir);
        let model_path = Self::parse_optional_path_from_env(Self::ENV_MODEL_PATH);
        let qdrant_url = Self::parse_string_from_env(Self::ENV_QDRANT_URL, defaults.qdrant_url);
        let collection_name =
            Self::parse_string_from_env(Self::ENV_COLLECTION, defaults.collection_name);
        let vector_size = Self::parse_number_from_env(Self::ENV_VECTOR_SIZE, defaults.vector_size)?;
        let tensor_url = Self::parse_optional_string_from_env(Self::ENV_TENSOR_URL);
        let search_timeout_secs =
            Self::parse_number_from_env(Self::ENV_SEARCH_TIMEOUT, defaults.search_timeout_secs)?;
        let rate_limit_enabled =
            Self::parse_bool_from_env(Self::ENV_RATE_LIMIT_ENABLED, defaults.rate_limit_enabled);
        let rate_limit_per_minute = Self::parse_number_from_env(
            Self::ENV_RATE_LIMIT_PER_MINUTE,
            defaults.rate_limit_per_minute,
        )?;
        let semantic_weight =
            Self::parse_number_from_env(Self::ENV_SEMANTIC_WEIGHT, defaults.semantic_weight)?;
        let lexical_weight =
            Self::parse_number_from_env(Self::ENV_LEXICAL_WEIGHT, defaults.lexical_weight)?;

        Ok(Self {
            port,
            bind_addr,
            data_dir,
            model_path,
            qdrant_url,
            collection_name,
            vector_size,
            tensor_url,
            search_timeout_secs,
            rate_limit_enabled,
            rate_limit_per_minute,
            semantic_weight,
            lexical_weight,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.exists() && !self.data_dir.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.data_dir.clone(),
            });
        }

        if let Some(ref path) = self.model_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        if self.vector_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_VECTOR_SIZE,
                reason: "must be greater than 0".to_string(),
            });
        }

        if self.search_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_SEARCH_TIMEOUT,
                reason: "must be greater than 0".to_string(),
            });
        }

        if self.rate_limit_per_minute == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_RATE_LIMIT_PER_MINUTE,
                reason: "must be greater than 0".to_string(),
            });
        }

        for (name, weight) in [
            (Self::ENV_SEMANTIC_WEIGHT, self.semantic_weight),
            (Self::ENV_LEXICAL_WEIGHT, self.lexical_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidValue {
                    name,
                    reason: format!("must be a finite, non-negative number (got {})", weight),
                });
            }
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Returns the configured backend timeout.
    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }

    /// Returns the expected location of the processed corpus.
    pub fn corpus_path(&self) -> PathBuf {
        self.data_dir.join("processed").join("passages.jsonl")
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        Self::parse_optional_string_from_env(var_name).map(PathBuf::from)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_number_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    name: var_name,
                    reason: format!("'{}': {}", value, e),
                }),
            Err(_) => Ok(default),
        }
    }

    fn parse_bool_from_env(var_name: &str, default: bool) -> bool {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(default)
    }
}
