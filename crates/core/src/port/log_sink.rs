// Log Sink Port
// Append-only line writer bound to one fixed location

use crate::error::Result;
use async_trait::async_trait;

/// Append-only text log (one per job)
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Where the lines go (file path for file sinks)
    fn location(&self) -> &str;

    /// Append one line; the sink adds the trailing newline
    async fn append_line(&self, line: &str) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::{Arc, Mutex};

    /// Collects lines in memory
    #[derive(Clone, Default)]
    pub struct MemoryLogSink {
        lines: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl MemoryLogSink {
        pub fn new() -> Self {
            Self::default()
        }

        /// Every append fails with an I/O error
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        pub fn lines(&self) -> Vec<String> {
            self.lines.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LogSink for MemoryLogSink {
        fn location(&self) -> &str {
            "memory"
        }

        async fn append_line(&self, line: &str) -> Result<()> {
            if self.fail {
                return Err(AppError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "log file is read-only",
                )));
            }
            self.lines.lock().unwrap().push(line.to_string());
            Ok(())
        }
    }
}
