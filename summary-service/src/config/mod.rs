use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Deep research runs take minutes; 20 minutes covers the slowest reports seen.
const DEFAULT_RESEARCH_TIMEOUT_SECS: u64 = 1200;
/// A single completion is much faster than a research run.
const DEFAULT_COMPLETION_TIMEOUT_SECS: u64 = 120;
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 1500;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct SummaryConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub backend: BackendKind,
    pub research: ResearchConfig,
    pub completion: CompletionConfig,
    pub cors: CorsConfig,
}

/// Which downstream shape the forwarder talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// `POST /summarize`, no fallback.
    Direct,
    /// `POST /api/research`, falling back to a chat completion.
    Research,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Direct => "direct",
            BackendKind::Research => "research",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(BackendKind::Direct),
            "research" => Ok(BackendKind::Research),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "SUMMARY_BACKEND must be 'direct' or 'research', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResearchConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub report_type: String,
}

impl ResearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Only required when the research backend (and its fallback) is selected.
    pub api_key: Option<Secret<String>>,
    pub api_base: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl CompletionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl SummaryConfig {
    pub fn load() -> Result<Self, AppError> {
        let mut common = core_config::Config::load()?;
        apply_listener_overrides(&mut common)?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let backend: BackendKind = get_env("SUMMARY_BACKEND", Some("direct"), is_prod)?.parse()?;

        let default_level = if common.debug { "debug" } else { "info" };
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| default_level.to_string());

        // The credential has no default; only the research backend needs it.
        let api_key = match env::var("OPENAI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Some(Secret::new(key)),
            _ if backend == BackendKind::Research || is_prod => {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "OPENAI_API_KEY is required when SUMMARY_BACKEND=research"
                )));
            }
            _ => None,
        };

        Ok(SummaryConfig {
            common,
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| "summary-service".to_string()),
            log_level,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            backend,
            research: ResearchConfig {
                base_url: get_env("RESEARCH_BACKEND_URL", Some("http://localhost:8001"), is_prod)?,
                timeout_secs: parse_env(
                    "RESEARCH_TIMEOUT_SECS",
                    DEFAULT_RESEARCH_TIMEOUT_SECS,
                    is_prod,
                )?,
                report_type: get_env("RESEARCH_REPORT_TYPE", Some("research_report"), is_prod)?,
            },
            completion: CompletionConfig {
                api_key,
                api_base: get_env("OPENAI_API_BASE", Some("https://api.openai.com/v1"), is_prod)?,
                model: get_env("OPENAI_MODEL", Some("gpt-4o"), is_prod)?,
                temperature: parse_env("OPENAI_TEMPERATURE", DEFAULT_TEMPERATURE, is_prod)?,
                max_tokens: parse_env("OPENAI_MAX_TOKENS", DEFAULT_MAX_TOKENS, is_prod)?,
                timeout_secs: parse_env(
                    "OPENAI_TIMEOUT_SECS",
                    DEFAULT_COMPLETION_TIMEOUT_SECS,
                    is_prod,
                )?,
            },
            cors: CorsConfig {
                allowed_origins: split_origins(&get_env(
                    "CORS_ALLOWED_ORIGINS",
                    Some(DEFAULT_CORS_ORIGINS),
                    is_prod,
                )?),
            },
        })
    }
}

/// Plain `HOST`, `PORT` and `DEBUG` win over the `APP__*` layer when set.
fn apply_listener_overrides(common: &mut core_config::Config) -> Result<(), AppError> {
    if let Ok(host) = env::var("HOST") {
        if !host.trim().is_empty() {
            common.host = host.trim().to_string();
        }
    }
    if let Ok(port) = env::var("PORT") {
        common.port = port
            .trim()
            .parse()
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("PORT is invalid: {}", e)))?;
    }
    if let Ok(debug) = env::var("DEBUG") {
        common.debug = debug.trim().eq_ignore_ascii_case("true");
    }
    Ok(())
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_env<T>(key: &str, default: T, is_prod: bool) -> Result<T, AppError>
where
    T: FromStr + ToString,
    T::Err: fmt::Display,
{
    get_env(key, Some(&default.to_string()), is_prod)?
        .trim()
        .parse()
        .map_err(|e: T::Err| AppError::ConfigError(anyhow::anyhow!("{} is invalid: {}", key, e)))
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
