//! Severity-routed multi-channel logging.
//!
//! The logger fans every record out to a set of [`ChannelSink`]s, each sink
//! applying its own minimum-severity filter:
//!
//! ```text
//! logger/
//! ├── severity    # ordered DEBUG..EMERGENCY level set
//! └── sink        # stderr, file, and mail channel sinks
//! ```
//!
//! The standard wiring ([`Logger::with_config`]) registers a stderr sink and
//! a file sink accepting everything from DEBUG upward, plus a mail sink
//! restricted to ALERT and above. The logger holds no state about prior
//! records: every call is an independent, fully-dispatched side effect.
//!
//! A process-wide instance is available through [`Logger::global`], created
//! lazily on first access. Code that wants isolation (tests, embedders with
//! their own wiring) constructs [`Logger::new`] directly and passes the
//! instance around instead.

mod severity;
mod sink;

pub use severity::Severity;
pub use sink::{ChannelSink, FileSink, MailSink, MailTransport, SendmailTransport, StderrSink};

use std::sync::{Arc, OnceLock};

use anyhow::Result;
use chrono::Utc;
use serde_json::Value as JsonValue;

use crate::config::QuarryConfig;

static LOGGER: OnceLock<Arc<Logger>> = OnceLock::new();

/// Subject line used for mail escalation.
const MAIL_SUBJECT: &str = "Critical Error";

/// A log message, scalar or structured.
///
/// Scalar text passes through unchanged; structured values are serialized
/// into a readable representation before dispatch.
pub enum LogMessage {
    Text(String),
    Structured(JsonValue),
}

impl LogMessage {
    fn into_text(self) -> String {
        match self {
            LogMessage::Text(text) => text,
            LogMessage::Structured(value) => {
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}

impl From<&str> for LogMessage {
    fn from(text: &str) -> Self {
        LogMessage::Text(text.to_string())
    }
}

impl From<String> for LogMessage {
    fn from(text: String) -> Self {
        LogMessage::Text(text)
    }
}

impl From<JsonValue> for LogMessage {
    fn from(value: JsonValue) -> Self {
        LogMessage::Structured(value)
    }
}

/// Multi-channel logger.
pub struct Logger {
    channel: String,
    sinks: Vec<Box<dyn ChannelSink>>,
}

impl Logger {
    /// Construct a logger with an explicit sink list.
    pub fn new(channel: impl Into<String>, sinks: Vec<Box<dyn ChannelSink>>) -> Self {
        Self {
            channel: channel.into(),
            sinks,
        }
    }

    /// Standard three-channel wiring: stderr and the configured log file from
    /// DEBUG upward, mail to the administrator address from ALERT upward.
    pub fn with_config(config: &QuarryConfig) -> Result<Logger> {
        let sinks: Vec<Box<dyn ChannelSink>> = vec![
            Box::new(StderrSink::new(Severity::Debug)),
            Box::new(FileSink::open(&config.log_path, Severity::Debug)?),
            Box::new(MailSink::new(
                Box::new(SendmailTransport::default()),
                MAIL_SUBJECT,
                &config.admin_email,
            )),
        ];
        Ok(Logger::new(config.channel.clone(), sinks))
    }

    /// Process-wide logger, created lazily from the default configuration on
    /// first access.
    ///
    /// If sink construction fails there is no logger to report through: the
    /// failure goes to stderr directly and the process terminates.
    pub fn global() -> Arc<Logger> {
        LOGGER
            .get_or_init(|| {
                let config = QuarryConfig::new(&None).unwrap_or_else(|e| {
                    eprintln!("could not load logger configuration: {}", e);
                    std::process::exit(1);
                });
                match Logger::with_config(&config) {
                    Ok(logger) => Arc::new(logger),
                    Err(e) => {
                        eprintln!("could not construct logger: {}", e);
                        std::process::exit(1);
                    }
                }
            })
            .clone()
    }

    /// Dispatch one record to every sink whose severity floor admits it.
    pub fn log(&self, severity: Severity, message: impl Into<LogMessage>, context: JsonValue) {
        let text = message.into().into_text();
        let line = self.format_line(severity, &text, &context);
        for sink in &self.sinks {
            if severity >= sink.min_severity() {
                sink.write(severity, &line);
            }
        }
    }

    fn format_line(&self, severity: Severity, text: &str, context: &JsonValue) -> String {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        if context.is_null() {
            format!("[{}] {}.{}: {}", timestamp, self.channel, severity, text)
        } else {
            format!(
                "[{}] {}.{}: {} {}",
                timestamp, self.channel, severity, text, context
            )
        }
    }

    // =========================================================================
    // Per-level conveniences, all forwarding to `log`
    // =========================================================================

    pub fn debug(&self, message: impl Into<LogMessage>, context: JsonValue) {
        self.log(Severity::Debug, message, context);
    }

    pub fn info(&self, message: impl Into<LogMessage>, context: JsonValue) {
        self.log(Severity::Info, message, context);
    }

    pub fn notice(&self, message: impl Into<LogMessage>, context: JsonValue) {
        self.log(Severity::Notice, message, context);
    }

    pub fn warning(&self, message: impl Into<LogMessage>, context: JsonValue) {
        self.log(Severity::Warning, message, context);
    }

    pub fn error(&self, message: impl Into<LogMessage>, context: JsonValue) {
        self.log(Severity::Error, message, context);
    }

    pub fn critical(&self, message: impl Into<LogMessage>, context: JsonValue) {
        self.log(Severity::Critical, message, context);
    }

    pub fn alert(&self, message: impl Into<LogMessage>, context: JsonValue) {
        self.log(Severity::Alert, message, context);
    }

    pub fn emergency(&self, message: impl Into<LogMessage>, context: JsonValue) {
        self.log(Severity::Emergency, message, context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct CaptureSink {
        min: Severity,
        records: Arc<Mutex<Vec<(Severity, String)>>>,
    }

    impl CaptureSink {
        fn new(min: Severity) -> (Self, Arc<Mutex<Vec<(Severity, String)>>>) {
            let records = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    min,
                    records: records.clone(),
                },
                records,
            )
        }
    }

    impl ChannelSink for CaptureSink {
        fn min_severity(&self) -> Severity {
            self.min
        }

        fn write(&self, severity: Severity, line: &str) {
            self.records.lock().unwrap().push((severity, line.to_string()));
        }
    }

    fn three_channel_logger() -> (
        Logger,
        Arc<Mutex<Vec<(Severity, String)>>>,
        Arc<Mutex<Vec<(Severity, String)>>>,
        Arc<Mutex<Vec<(Severity, String)>>>,
    ) {
        let (os, os_records) = CaptureSink::new(Severity::Debug);
        let (file, file_records) = CaptureSink::new(Severity::Debug);
        let (mail, mail_records) = CaptureSink::new(Severity::Alert);
        let logger = Logger::new(
            "test",
            vec![Box::new(os), Box::new(file), Box::new(mail)],
        );
        (logger, os_records, file_records, mail_records)
    }

    #[test]
    fn test_alert_reaches_all_three_sinks() {
        let (logger, os, file, mail) = three_channel_logger();
        logger.alert("disk failure", JsonValue::Null);

        assert_eq!(os.lock().unwrap().len(), 1);
        assert_eq!(file.lock().unwrap().len(), 1);
        assert_eq!(mail.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_debug_skips_alert_sink() {
        let (logger, os, file, mail) = three_channel_logger();
        logger.debug("connection opened", JsonValue::Null);

        assert_eq!(os.lock().unwrap().len(), 1);
        assert_eq!(file.lock().unwrap().len(), 1);
        assert!(mail.lock().unwrap().is_empty());
    }

    #[test]
    fn test_formatted_line_carries_channel_level_and_context() {
        let (logger, os, _, _) = three_channel_logger();
        logger.critical("could not execute query", json!({ "cause": "no such table" }));

        let records = os.lock().unwrap();
        assert_eq!(records[0].0, Severity::Critical);
        let line = &records[0].1;
        assert!(line.contains("test.CRITICAL:"));
        assert!(line.contains("could not execute query"));
        assert!(line.contains("no such table"));
    }

    #[test]
    fn test_structured_message_is_serialized() {
        let (logger, os, _, _) = three_channel_logger();
        logger.info(json!({ "rows": 3, "table": "users" }), JsonValue::Null);

        let records = os.lock().unwrap();
        assert!(records[0].1.contains("\"rows\": 3"));
        assert!(records[0].1.contains("\"table\": \"users\""));
    }

    #[test]
    fn test_each_level_routes_at_its_severity() {
        let (logger, os, _, _) = three_channel_logger();
        logger.debug("a", JsonValue::Null);
        logger.info("b", JsonValue::Null);
        logger.notice("c", JsonValue::Null);
        logger.warning("d", JsonValue::Null);
        logger.error("e", JsonValue::Null);
        logger.critical("f", JsonValue::Null);
        logger.alert("g", JsonValue::Null);
        logger.emergency("h", JsonValue::Null);

        let severities: Vec<Severity> =
            os.lock().unwrap().iter().map(|(s, _)| *s).collect();
        assert_eq!(
            severities,
            vec![
                Severity::Debug,
                Severity::Info,
                Severity::Notice,
                Severity::Warning,
                Severity::Error,
                Severity::Critical,
                Severity::Alert,
                Severity::Emergency,
            ]
        );
    }

    #[test]
    fn test_logger_without_sinks_is_inert() {
        let logger = Logger::new("test", Vec::new());
        logger.emergency("nowhere to go", JsonValue::Null);
    }
}
