use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for hosts embedding the appraiser.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub appraisal: AppraisalConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let growth_annual = match non_empty_var("LEXLOT_GROWTH_RATE") {
            Some(raw) => Some(parse_growth_rate(&raw)?),
            None => None,
        };

        Ok(Self {
            environment,
            appraisal: AppraisalConfig {
                rulebook_path: non_empty_var("LEXLOT_RULEBOOK").map(PathBuf::from),
                preferences_path: non_empty_var("LEXLOT_PREFERENCES").map(PathBuf::from),
                growth_annual,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Where the rule tables and preferences come from.
#[derive(Debug, Clone, Default)]
pub struct AppraisalConfig {
    /// JSON rulebook; the built-in tables are used when absent.
    pub rulebook_path: Option<PathBuf>,
    /// JSON preferences; defaults are used when absent.
    pub preferences_path: Option<PathBuf>,
    /// Overrides the preferences' capital growth rate (fraction).
    pub growth_annual: Option<f64>,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Accepts a fraction (`0.03`) or a percentage (`3%`). Values outside -50%..=50% are rejected.
pub fn parse_growth_rate(raw: &str) -> Result<f64, ConfigError> {
    let invalid = || ConfigError::InvalidGrowthRate {
        value: raw.to_string(),
    };

    let trimmed = raw.trim();
    let (number, scale) = match trimmed.strip_suffix('%') {
        Some(percent) => (percent.trim(), 100.0),
        None => (trimmed, 1.0),
    };

    let rate = number.parse::<f64>().map_err(|_| invalid())? / scale;
    if rate.is_finite() && (-0.5..=0.5).contains(&rate) {
        Ok(rate)
    } else {
        Err(invalid())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidGrowthRate { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidGrowthRate { value } => write!(
                f,
                "LEXLOT_GROWTH_RATE must be a fraction or percentage between -50% and 50%, got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("LEXLOT_RULEBOOK");
        env::remove_var("LEXLOT_PREFERENCES");
        env::remove_var("LEXLOT_GROWTH_RATE");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.appraisal.rulebook_path.is_none());
        assert!(config.appraisal.preferences_path.is_none());
        assert!(config.appraisal.growth_annual.is_none());
    }

    #[test]
    fn reads_paths_and_growth_override() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "prod");
        env::set_var("LEXLOT_RULEBOOK", "/etc/lexlot/rules.json");
        env::set_var("LEXLOT_PREFERENCES", "  ");
        env::set_var("LEXLOT_GROWTH_RATE", "3%");
        let config = AppConfig::load().expect("config loads");
        reset_env();

        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(
            config.appraisal.rulebook_path,
            Some(PathBuf::from("/etc/lexlot/rules.json"))
        );
        assert!(config.appraisal.preferences_path.is_none());
        let growth = config.appraisal.growth_annual.expect("growth override");
        assert!((growth - 0.03).abs() < 1e-12);
    }

    #[test]
    fn rejects_unparseable_growth_rate() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LEXLOT_GROWTH_RATE", "lots");
        let result = AppConfig::load();
        reset_env();

        match result {
            Err(ConfigError::InvalidGrowthRate { value }) => assert_eq!(value, "lots"),
            other => panic!("expected invalid growth rate, got {other:?}"),
        }
    }

    #[test]
    fn growth_rate_bounds() {
        assert_eq!(parse_growth_rate("0.02").ok(), Some(0.02));
        assert!(parse_growth_rate("-0.6").is_err());
        assert!(parse_growth_rate("75%").is_err());
        assert!(parse_growth_rate("NaN").is_err());
    }
}
