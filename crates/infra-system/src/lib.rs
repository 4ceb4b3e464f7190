// CRM Infrastructure - System Adapters
// Implements: LogSink (append-only job log files), settings loading

pub mod file_log_sink;
pub mod settings;

pub use file_log_sink::FileLogSink;
pub use settings::CrmSettings;
