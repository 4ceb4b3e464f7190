// CRM Settings
//
// Layering: compiled defaults -> optional TOML file -> CRM_* environment
// variables (`__` separates sections, e.g. CRM_JOBS__HEARTBEAT).

use config::{Config, Environment, File, FileFormat};
use crm_core::application::constants::{
    DEFAULT_API_TIMEOUT_SECS, DEFAULT_HEARTBEAT_LOG_PATH, DEFAULT_HEARTBEAT_SCHEDULE,
    DEFAULT_LOW_STOCK_THRESHOLD, DEFAULT_REMINDER_LOG_PATH, DEFAULT_REMINDER_LOOKBACK_DAYS,
    DEFAULT_REMINDER_SCHEDULE, DEFAULT_REPORT_LOG_PATH, DEFAULT_REPORT_SCHEDULE,
    DEFAULT_RESTOCK_INCREMENT, DEFAULT_RESTOCK_LOG_PATH, DEFAULT_RESTOCK_SCHEDULE,
};
use crm_core::application::Schedule;
use crm_core::domain::RestockPolicy;
use crm_core::error::{AppError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Environment variable naming an explicit settings file
pub const CONFIG_PATH_ENV: &str = "CRM_CONFIG";

/// Settings file picked up from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "crm.toml";

const ENV_PREFIX: &str = "CRM";
const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9527;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "~/.crm/crm.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RpcSettings {
    pub host: String,
    pub port: u16,
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// Client side of the query API
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            endpoint: format!("http://{}:{}", DEFAULT_RPC_HOST, DEFAULT_RPC_PORT),
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
        }
    }
}

/// Job log files (one per job)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogPaths {
    pub heartbeat: String,
    pub restock: String,
    pub report: String,
    pub reminders: String,
}

impl Default for LogPaths {
    fn default() -> Self {
        Self {
            heartbeat: DEFAULT_HEARTBEAT_LOG_PATH.to_string(),
            restock: DEFAULT_RESTOCK_LOG_PATH.to_string(),
            report: DEFAULT_REPORT_LOG_PATH.to_string(),
            reminders: DEFAULT_REMINDER_LOG_PATH.to_string(),
        }
    }
}

/// Diagnostic log (tracing output), separate from the job logs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub dir: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: "~/.crm/logs".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InventorySettings {
    pub threshold: i64,
    pub increment: i64,
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            increment: DEFAULT_RESTOCK_INCREMENT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReminderSettings {
    pub days: i64,
    pub enabled: bool,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            days: DEFAULT_REMINDER_LOOKBACK_DAYS,
            enabled: true,
        }
    }
}

/// Schedule strings, parsed by `Schedule::from_str`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JobSchedules {
    pub heartbeat: String,
    pub restock: String,
    pub report: String,
    pub reminders: String,
}

impl Default for JobSchedules {
    fn default() -> Self {
        Self {
            heartbeat: DEFAULT_HEARTBEAT_SCHEDULE.to_string(),
            restock: DEFAULT_RESTOCK_SCHEDULE.to_string(),
            report: DEFAULT_REPORT_SCHEDULE.to_string(),
            reminders: DEFAULT_REMINDER_SCHEDULE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HeartbeatSettings {
    /// Probe the query endpoint with `hello`
    pub probe: bool,
}

impl Default for HeartbeatSettings {
    fn default() -> Self {
        Self { probe: true }
    }
}

/// Parsed job schedules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSchedules {
    pub heartbeat: Schedule,
    pub restock: Schedule,
    pub report: Schedule,
    pub reminders: Schedule,
}

impl JobSchedules {
    pub fn resolve(&self) -> Result<ResolvedSchedules> {
        let parse = |job: &str, raw: &str| {
            raw.parse::<Schedule>()
                .map_err(|e| AppError::Config(format!("jobs.{}: {}", job, e)))
        };
        Ok(ResolvedSchedules {
            heartbeat: parse("heartbeat", &self.heartbeat)?,
            restock: parse("restock", &self.restock)?,
            report: parse("report", &self.report)?,
            reminders: parse("reminders", &self.reminders)?,
        })
    }
}

/// Top-level settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CrmSettings {
    pub database: DatabaseSettings,
    pub rpc: RpcSettings,
    pub api: ApiSettings,
    pub logs: LogPaths,
    pub logging: LoggingSettings,
    pub inventory: InventorySettings,
    pub reminders: ReminderSettings,
    pub jobs: JobSchedules,
    pub heartbeat: HeartbeatSettings,
}

impl CrmSettings {
    /// Load from `CRM_CONFIG` (required when set) or `./crm.toml` (optional), then env
    pub fn load() -> Result<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load_from(Some(Path::new(&path))),
            Err(_) => Self::load_from(None),
        }
    }

    /// Load with an explicit file (required) or the default file (optional)
    pub fn load_from(file: Option<&Path>) -> Result<Self> {
        let file_source = match file {
            Some(path) => File::from(path).required(true),
            None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
        };

        let settings = Config::builder()
            .add_source(file_source)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| AppError::Config(format!("Failed to load settings: {}", e)))?;

        let mut loaded: CrmSettings = settings
            .try_deserialize()
            .map_err(|e| AppError::Config(format!("Invalid settings: {}", e)))?;
        loaded.expand_paths();
        loaded.validate()?;

        debug!(settings = ?loaded, "Settings loaded");
        Ok(loaded)
    }

    fn expand_paths(&mut self) {
        let expand = |p: &mut String| *p = shellexpand::tilde(p.as_str()).into_owned();
        expand(&mut self.database.url);
        expand(&mut self.logging.dir);
        expand(&mut self.logs.heartbeat);
        expand(&mut self.logs.restock);
        expand(&mut self.logs.report);
        expand(&mut self.logs.reminders);
    }

    fn validate(&self) -> Result<()> {
        self.restock_policy()?;
        self.jobs.resolve()?;
        if self.reminders.days < 0 {
            return Err(AppError::Config(format!(
                "reminders.days must not be negative, got {}",
                self.reminders.days
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(AppError::Config(
                "api.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn restock_policy(&self) -> Result<RestockPolicy> {
        RestockPolicy::new(self.inventory.threshold, self.inventory.increment)
            .map_err(|e| AppError::Config(format!("inventory: {}", e)))
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Diagnostic log directory
    pub fn logging_dir(&self) -> PathBuf {
        PathBuf::from(&self.logging.dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = CrmSettings::default();

        assert_eq!(settings.logs.heartbeat, "/tmp/crm_heartbeat_log.txt");
        assert_eq!(settings.logs.restock, "/tmp/low_stock_updates_log.txt");
        assert_eq!(settings.logs.report, "/tmp/crm_report_log.txt");
        assert_eq!(settings.logs.reminders, "/tmp/order_reminders_log.txt");
        assert_eq!(settings.api.timeout_secs, 5);
        assert_eq!(settings.api.endpoint, "http://127.0.0.1:9527");
        assert_eq!(settings.restock_policy().unwrap(), RestockPolicy::default());
        assert_eq!(settings.reminders.days, 7);
        assert!(settings.heartbeat.probe);
        assert_eq!(
            settings.jobs.resolve().unwrap().report,
            "weekly mon 06:00".parse().unwrap()
        );
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[inventory]
threshold = 20

[jobs]
heartbeat = "every 30s"

[heartbeat]
probe = false
"#
        )
        .unwrap();

        let settings = CrmSettings::load_from(Some(file.path())).unwrap();

        assert_eq!(settings.inventory.threshold, 20);
        assert_eq!(settings.inventory.increment, 10);
        assert_eq!(settings.jobs.heartbeat, "every 30s");
        assert_eq!(settings.jobs.restock, "every 12h");
        assert!(!settings.heartbeat.probe);
    }

    #[test]
    fn test_bad_schedule_is_config_error() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[jobs]\nreport = \"fortnightly\"").unwrap();

        let err = CrmSettings::load_from(Some(file.path())).unwrap_err();
        assert!(matches!(err, AppError::Config(ref msg) if msg.contains("jobs.report")));
    }

    #[test]
    fn test_oversized_interval_is_config_error() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[jobs]\nheartbeat = \"every 9000000000000000000h\"").unwrap();

        let err = CrmSettings::load_from(Some(file.path())).unwrap_err();
        assert!(matches!(err, AppError::Config(ref msg) if msg.contains("jobs.heartbeat")));
    }

    #[test]
    fn test_non_positive_increment_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[inventory]\nincrement = 0").unwrap();

        assert!(CrmSettings::load_from(Some(file.path())).is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let err = CrmSettings::load_from(Some(Path::new("/nonexistent/crm.toml"))).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
