use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    /// CSV file with `district` and price per area columns
    #[serde(default = "default_districts_csv")]
    pub districts_csv: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            districts_csv: default_districts_csv(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PricingConfig {
    /// Fixed reference year; the local calendar year when unset
    #[serde(default)]
    pub current_year: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_metrics_endpoint")]
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_metrics_endpoint(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8050
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_districts_csv() -> PathBuf {
    PathBuf::from("data/districts.csv")
}

fn default_metrics_endpoint() -> String {
    "/metrics".to_string()
}

fn default_true() -> bool {
    true
}

/// Load configuration from `path` layered with `IMMO_ESTIMATOR__*` environment
/// variables; a missing file leaves every setting at its default
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path.to_path_buf()).required(false))
        .add_source(config::Environment::with_prefix("IMMO_ESTIMATOR").separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

/// Accepted values for a pinned reference year
pub const CURRENT_YEAR_RANGE: std::ops::RangeInclusive<i32> = 1800..=9999;

fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    match cfg.server.log_format.as_str() {
        "text" | "json" => {}
        other => anyhow::bail!("Invalid log format '{}' (expected 'text' or 'json')", other),
    }

    if cfg.data.districts_csv.as_os_str().is_empty() {
        anyhow::bail!("data.districts_csv cannot be empty");
    }

    if let Some(year) = cfg.pricing.current_year {
        if !CURRENT_YEAR_RANGE.contains(&year) {
            anyhow::bail!("pricing.current_year {} is out of range (1800-9999)", year);
        }
    }

    if cfg.metrics.enabled && !cfg.metrics.endpoint.starts_with('/') {
        anyhow::bail!("Metrics endpoint must start with '/': {}", cfg.metrics.endpoint);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = Config::default();
        assert!(validate_config(&cfg).is_ok());
        assert_eq!(cfg.server.port, 8050);
        assert_eq!(cfg.data.districts_csv, PathBuf::from("data/districts.csv"));
        assert!(cfg.pricing.current_year.is_none());
    }

    #[test]
    fn test_validate_config_rejects_bad_log_format() {
        let mut cfg = Config::default();
        cfg.server.log_format = "yaml".to_string();

        let result = validate_config(&cfg);
        assert!(result.unwrap_err().to_string().contains("Invalid log format"));
    }

    #[test]
    fn test_validate_config_rejects_bad_year() {
        let mut cfg = Config::default();
        cfg.pricing.current_year = Some(1700);
        assert!(validate_config(&cfg).is_err());

        cfg.pricing.current_year = Some(2024);
        assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn test_validate_config_rejects_bad_metrics_endpoint() {
        let mut cfg = Config::default();
        cfg.metrics.endpoint = "metrics".to_string();
        assert!(validate_config(&cfg).is_err());

        cfg.metrics.enabled = false;
        assert!(validate_config(&cfg).is_ok());
    }

    // Tests that read the process environment through `load_config`
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[test]
    fn test_env_overrides_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 8100

[data]
districts_csv = "/srv/from-file.csv"
"#
        )
        .unwrap();
        file.flush().unwrap();

        std::env::set_var("IMMO_ESTIMATOR__SERVER__PORT", "9000");
        std::env::set_var("IMMO_ESTIMATOR__DATA__DISTRICTS_CSV", "/srv/from-env.csv");
        let result = load_config(file.path());
        std::env::remove_var("IMMO_ESTIMATOR__SERVER__PORT");
        std::env::remove_var("IMMO_ESTIMATOR__DATA__DISTRICTS_CSV");

        let cfg = result.unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.data.districts_csv, PathBuf::from("/srv/from-env.csv"));
        assert_eq!(cfg.server.log_format, "text");
    }

    #[test]
    fn test_load_config_from_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9000
log_format = "json"

[data]
districts_csv = "/srv/prices.csv"

[pricing]
current_year = 2024
"#
        )
        .unwrap();
        file.flush().unwrap();

        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.log_format, "json");
        assert_eq!(cfg.data.districts_csv, PathBuf::from("/srv/prices.csv"));
        assert_eq!(cfg.pricing.current_year, Some(2024));
        assert!(cfg.metrics.enabled);
    }
}
