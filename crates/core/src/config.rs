use std::env;
use std::fs;
use std::path::PathBuf;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Process-wide configuration, resolved once at startup from defaults, an
/// optional TOML file, and `GIFTROUTE_*` environment overrides (in that
/// order of precedence, later wins).
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub sources: SourcesConfig,
    pub cache: CacheConfig,
    pub enrichment: EnrichmentConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SourcesConfig {
    pub jarir: JarirConfig,
    pub niceone: NiceOneConfig,
    pub floward: FlowardConfig,
}

#[derive(Clone, Debug)]
pub struct JarirConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct NiceOneConfig {
    pub endpoint: String,
    pub session_cookie: Option<SecretString>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct FlowardConfig {
    pub endpoint: String,
    pub api_key: Option<SecretString>,
    pub timeout_secs: u64,
}

#[derive(Clone, Copy, Debug)]
pub struct CacheConfig {
    pub recommendation_ttl_secs: u64,
    pub product_ttl_secs: u64,
}

#[derive(Clone, Copy, Debug)]
pub struct EnrichmentConfig {
    pub max_concurrent: usize,
    pub max_products: usize,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

/// Programmatic overrides, applied last so embedding callers (and tests) can
/// pin values without touching the process environment.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_model: Option<String>,
    pub niceone_session_cookie: Option<String>,
    pub floward_api_key: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

const DEFAULT_CONFIG_FILE: &str = "giftroute.toml";
const ENV_PREFIX: &str = "GIFTROUTE_";

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), port: 8787 },
            llm: LlmConfig {
                api_key: None,
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-4o-mini".to_string(),
                timeout_secs: 30,
            },
            sources: SourcesConfig {
                jarir: JarirConfig {
                    endpoint: "https://search.jarir.com/autocomplete".to_string(),
                    timeout_secs: 10,
                },
                niceone: NiceOneConfig {
                    endpoint: "https://niceonesa.com/index.php".to_string(),
                    session_cookie: None,
                    timeout_secs: 15,
                },
                floward: FlowardConfig {
                    endpoint: "https://search.floward.com/indexes/products/query".to_string(),
                    api_key: None,
                    timeout_secs: 30,
                },
            },
            cache: CacheConfig { recommendation_ttl_secs: 3600, product_ttl_secs: 900 },
            enrichment: EnrichmentConfig { max_concurrent: 3, max_products: 30 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = options
            .config_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        match fs::read_to_string(&path) {
            Ok(raw) => {
                let file: RawConfig = toml::from_str(&raw)
                    .map_err(|source| ConfigError::ParseFile { path: path.clone(), source })?;
                config.apply_file(file);
            }
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                if options.require_file {
                    return Err(ConfigError::MissingConfigFile(path));
                }
            }
            Err(source) => return Err(ConfigError::ReadFile { path, source }),
        }

        config.apply_env()?;
        config.apply_overrides(options.overrides);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(llm_api_key) = overrides.llm_api_key {
            self.llm.api_key = Some(SecretString::from(llm_api_key));
        }
        if let Some(llm_model) = overrides.llm_model {
            self.llm.model = llm_model;
        }
        if let Some(session_cookie) = overrides.niceone_session_cookie {
            self.sources.niceone.session_cookie = Some(SecretString::from(session_cookie));
        }
        if let Some(floward_api_key) = overrides.floward_api_key {
            self.sources.floward.api_key = Some(SecretString::from(floward_api_key));
        }
    }

    fn apply_file(&mut self, raw: RawConfig) {
        if let Some(server) = raw.server {
            merge(&mut self.server.bind_address, server.bind_address);
            merge(&mut self.server.port, server.port);
        }
        if let Some(llm) = raw.llm {
            if let Some(api_key) = llm.api_key {
                self.llm.api_key = Some(SecretString::from(api_key));
            }
            merge(&mut self.llm.base_url, llm.base_url);
            merge(&mut self.llm.model, llm.model);
            merge(&mut self.llm.timeout_secs, llm.timeout_secs);
        }
        if let Some(sources) = raw.sources {
            if let Some(jarir) = sources.jarir {
                merge(&mut self.sources.jarir.endpoint, jarir.endpoint);
                merge(&mut self.sources.jarir.timeout_secs, jarir.timeout_secs);
            }
            if let Some(niceone) = sources.niceone {
                merge(&mut self.sources.niceone.endpoint, niceone.endpoint);
                merge(&mut self.sources.niceone.timeout_secs, niceone.timeout_secs);
                if let Some(cookie) = niceone.session_cookie {
                    self.sources.niceone.session_cookie = Some(SecretString::from(cookie));
                }
            }
            if let Some(floward) = sources.floward {
                merge(&mut self.sources.floward.endpoint, floward.endpoint);
                merge(&mut self.sources.floward.timeout_secs, floward.timeout_secs);
                if let Some(api_key) = floward.api_key {
                    self.sources.floward.api_key = Some(SecretString::from(api_key));
                }
            }
        }
        if let Some(cache) = raw.cache {
            merge(&mut self.cache.recommendation_ttl_secs, cache.recommendation_ttl_secs);
            merge(&mut self.cache.product_ttl_secs, cache.product_ttl_secs);
        }
        if let Some(enrichment) = raw.enrichment {
            merge(&mut self.enrichment.max_concurrent, enrichment.max_concurrent);
            merge(&mut self.enrichment.max_products, enrichment.max_products);
        }
        if let Some(logging) = raw.logging {
            merge(&mut self.logging.level, logging.level);
            merge(&mut self.logging.format, logging.format);
        }
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = env_var("BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = env_var("PORT") {
            self.server.port = parse_env("PORT", &value)?;
        }
        if let Some(value) = env_var("LLM_API_KEY") {
            self.llm.api_key = Some(SecretString::from(value));
        }
        if let Some(value) = env_var("LLM_BASE_URL") {
            self.llm.base_url = value;
        }
        if let Some(value) = env_var("LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = env_var("NICEONE_SESSION_COOKIE") {
            self.sources.niceone.session_cookie = Some(SecretString::from(value));
        }
        if let Some(value) = env_var("FLOWARD_API_KEY") {
            self.sources.floward.api_key = Some(SecretString::from(value));
        }
        if let Some(value) = env_var("LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = env_var("LOG_FORMAT") {
            self.logging.format = match value.to_lowercase().as_str() {
                "compact" => LogFormat::Compact,
                "pretty" => LogFormat::Pretty,
                "json" => LogFormat::Json,
                _ => {
                    return Err(ConfigError::InvalidEnvOverride {
                        key: format!("{ENV_PREFIX}LOG_FORMAT"),
                        value,
                    })
                }
            };
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("server.port must be non-zero".to_string()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
        }
        if self.cache.recommendation_ttl_secs == 0 || self.cache.product_ttl_secs == 0 {
            return Err(ConfigError::Validation("cache TTLs must be non-zero".to_string()));
        }
        if self.enrichment.max_products == 0 {
            return Err(ConfigError::Validation(
                "enrichment.max_products must be non-zero".to_string(),
            ));
        }
        for (name, endpoint) in [
            ("sources.jarir.endpoint", &self.sources.jarir.endpoint),
            ("sources.niceone.endpoint", &self.sources.niceone.endpoint),
            ("sources.floward.endpoint", &self.sources.floward.endpoint),
        ] {
            if !endpoint.starts_with("http") {
                return Err(ConfigError::Validation(format!("{name} must be an http(s) URL")));
            }
        }
        Ok(())
    }
}

fn merge<T>(target: &mut T, candidate: Option<T>) {
    if let Some(value) = candidate {
        *target = value;
    }
}

fn env_var(suffix: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}{suffix}")).ok().filter(|value| !value.is_empty())
}

fn parse_env<T: std::str::FromStr>(suffix: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
        key: format!("{ENV_PREFIX}{suffix}"),
        value: value.to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    server: Option<RawServer>,
    llm: Option<RawLlm>,
    sources: Option<RawSources>,
    cache: Option<RawCache>,
    enrichment: Option<RawEnrichment>,
    logging: Option<RawLogging>,
}

#[derive(Debug, Deserialize)]
struct RawServer {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct RawLlm {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawSources {
    jarir: Option<RawJarir>,
    niceone: Option<RawNiceOne>,
    floward: Option<RawFloward>,
}

#[derive(Debug, Deserialize)]
struct RawJarir {
    endpoint: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawNiceOne {
    endpoint: Option<String>,
    session_cookie: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawFloward {
    endpoint: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawCache {
    recommendation_ttl_secs: Option<u64>,
    product_ttl_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawEnrichment {
    max_concurrent: Option<usize>,
    max_products: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawLogging {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use secrecy::ExposeSecret;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    fn load_from_toml(contents: &str) -> Result<AppConfig, ConfigError> {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            ..LoadOptions::default()
        })
    }

    #[test]
    fn defaults_apply_when_no_file_is_present() {
        let config = AppConfig::load(LoadOptions {
            config_path: Some("/nonexistent/giftroute.toml".into()),
            ..LoadOptions::default()
        })
        .expect("defaults should load");
        assert_eq!(config.server.port, 8787);
        assert_eq!(config.enrichment.max_concurrent, 3);
        assert_eq!(config.cache.recommendation_ttl_secs, 3600);
        assert_eq!(config.cache.product_ttl_secs, 900);
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let result = AppConfig::load(LoadOptions {
            config_path: Some("/nonexistent/giftroute.toml".into()),
            require_file: true,
            ..LoadOptions::default()
        });
        assert!(matches!(result, Err(ConfigError::MissingConfigFile(_))));
    }

    #[test]
    fn file_values_override_defaults() {
        let config = load_from_toml(
            r#"
            [server]
            port = 9000

            [llm]
            api_key = "sk-test"
            model = "gpt-4o"

            [sources.jarir]
            timeout_secs = 5

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.api_key.unwrap().expose_secret(), "sk-test");
        assert_eq!(config.sources.jarir.timeout_secs, 5);
        assert_eq!(config.logging.format, LogFormat::Json);
        // Untouched sections keep their defaults.
        assert_eq!(config.sources.floward.timeout_secs, 30);
    }

    #[test]
    fn programmatic_overrides_win_over_file_values() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"[llm]\napi_key = \"sk-from-file\"\nmodel = \"gpt-4o\"\n")
            .expect("write config");

        let config = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides {
                llm_api_key: Some("sk-pinned".to_string()),
                log_level: Some("trace".to_string()),
                ..ConfigOverrides::default()
            },
        })
        .expect("config should load");

        assert_eq!(config.llm.api_key.unwrap().expose_secret(), "sk-pinned");
        assert_eq!(config.llm.model, "gpt-4o", "untouched fields keep the file value");
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let result = load_from_toml("[server\nport = 9000");
        assert!(matches!(result, Err(ConfigError::ParseFile { .. })));
    }

    #[test]
    fn zero_ttl_fails_validation() {
        let result = load_from_toml("[cache]\nrecommendation_ttl_secs = 0");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn non_http_endpoint_fails_validation() {
        let result = load_from_toml("[sources.floward]\nendpoint = \"ftp://example\"");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
