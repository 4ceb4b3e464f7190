// Job constants (no magic values)

/// Products with stock strictly below this are restocked
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Units added to each low-stock product per run
pub const DEFAULT_RESTOCK_INCREMENT: i64 = 10;

/// Reminder window: orders dated on or after the start of this many days ago
pub const DEFAULT_REMINDER_LOOKBACK_DAYS: i64 = 7;

/// Timeout applied to every query API call (seconds)
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 5;

/// Job log files
pub const DEFAULT_HEARTBEAT_LOG_PATH: &str = "/tmp/crm_heartbeat_log.txt";
pub const DEFAULT_RESTOCK_LOG_PATH: &str = "/tmp/low_stock_updates_log.txt";
pub const DEFAULT_REPORT_LOG_PATH: &str = "/tmp/crm_report_log.txt";
pub const DEFAULT_REMINDER_LOG_PATH: &str = "/tmp/order_reminders_log.txt";

/// Default schedules (see `Schedule` for the syntax)
pub const DEFAULT_HEARTBEAT_SCHEDULE: &str = "every 5m";
pub const DEFAULT_RESTOCK_SCHEDULE: &str = "every 12h";
pub const DEFAULT_REPORT_SCHEDULE: &str = "weekly mon 06:00";
pub const DEFAULT_REMINDER_SCHEDULE: &str = "daily 08:00";

/// Heartbeat line timestamp (DD/MM/YYYY-HH:MM:SS)
pub const HEARTBEAT_TIMESTAMP_FORMAT: &str = "%d/%m/%Y-%H:%M:%S";

/// Restock and report line timestamp
pub const LOG_TIMESTAMP_FORMAT: &str = crate::domain::report::REPORT_TIMESTAMP_FORMAT;
