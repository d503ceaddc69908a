//! Log channel sinks.
//!
//! A [`ChannelSink`] is a destination for formatted, leveled records. Each
//! sink carries its own minimum severity; the logger skips any sink whose
//! floor is above the record's level. The shipped sinks cover the standard
//! wiring: process stderr, an append-only file, and mail escalation through
//! a narrow [`MailTransport`] interface.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Mutex;

use anyhow::{anyhow, Result};

use super::Severity;

/// A destination for formatted log records.
pub trait ChannelSink: Send + Sync {
    /// Lowest severity this sink accepts.
    fn min_severity(&self) -> Severity;

    /// Deliver one formatted record. Delivery is best-effort: a sink that
    /// cannot deliver falls back to stderr rather than dropping the record.
    fn write(&self, severity: Severity, line: &str);
}

// =============================================================================
// Stderr sink (OS error facility)
// =============================================================================

/// Sink writing to the process standard-error stream.
pub struct StderrSink {
    min: Severity,
}

impl StderrSink {
    pub fn new(min: Severity) -> Self {
        Self { min }
    }
}

impl ChannelSink for StderrSink {
    fn min_severity(&self) -> Severity {
        self.min
    }

    fn write(&self, _severity: Severity, line: &str) {
        eprintln!("{}", line);
    }
}

// =============================================================================
// File sink
// =============================================================================

/// Append-only file sink.
pub struct FileSink {
    file: Mutex<File>,
    min: Severity,
}

impl FileSink {
    /// Open (or create) the log file at `path` for appending.
    pub fn open(path: &str, min: Severity) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| anyhow!("Failed to open log file '{}': {}", path, e))?;
        Ok(Self {
            file: Mutex::new(file),
            min,
        })
    }
}

impl ChannelSink for FileSink {
    fn min_severity(&self) -> Severity {
        self.min
    }

    fn write(&self, _severity: Severity, line: &str) {
        // a record that cannot reach the file still reaches stderr
        match self.file.lock() {
            Ok(mut file) => {
                if writeln!(file, "{}", line).is_err() {
                    eprintln!("{}", line);
                }
            }
            Err(_) => eprintln!("{}", line),
        }
    }
}

// =============================================================================
// Mail sink
// =============================================================================

/// Delivery interface the mail sink calls through.
///
/// The transport is an external collaborator; the sink only knows how to
/// hand it a formatted message, a subject, and a recipient.
pub trait MailTransport: Send + Sync {
    fn send(&self, message: &str, subject: &str, recipient: &str) -> Result<()>;
}

/// [`MailTransport`] piping messages through the local sendmail binary.
pub struct SendmailTransport {
    sendmail: String,
}

impl SendmailTransport {
    pub fn new(sendmail: impl Into<String>) -> Self {
        Self {
            sendmail: sendmail.into(),
        }
    }
}

impl Default for SendmailTransport {
    fn default() -> Self {
        Self::new("/usr/sbin/sendmail")
    }
}

impl MailTransport for SendmailTransport {
    fn send(&self, message: &str, subject: &str, recipient: &str) -> Result<()> {
        let mut child = Command::new(&self.sendmail)
            .arg("-t")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| anyhow!("Failed to spawn '{}': {}", self.sendmail, e))?;

        // stdin must be dropped so sendmail sees EOF before we wait
        if let Some(mut stdin) = child.stdin.take() {
            write!(stdin, "To: {}\r\nSubject: {}\r\n\r\n{}\r\n", recipient, subject, message)
                .map_err(|e| anyhow!("Failed to write mail body: {}", e))?;
        }

        let status = child
            .wait()
            .map_err(|e| anyhow!("Failed to wait for sendmail: {}", e))?;
        if !status.success() {
            return Err(anyhow!("sendmail exited with status {}", status));
        }
        Ok(())
    }
}

/// Alerting sink: only records at ALERT and above reach the transport.
pub struct MailSink {
    transport: Box<dyn MailTransport>,
    subject: String,
    recipient: String,
    min: Severity,
}

impl MailSink {
    pub fn new(
        transport: Box<dyn MailTransport>,
        subject: impl Into<String>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            subject: subject.into(),
            recipient: recipient.into(),
            min: Severity::Alert,
        }
    }
}

impl ChannelSink for MailSink {
    fn min_severity(&self) -> Severity {
        self.min
    }

    fn write(&self, _severity: Severity, line: &str) {
        if let Err(e) = self.transport.send(line, &self.subject, &self.recipient) {
            eprintln!("mail sink delivery failed: {}", e);
            eprintln!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct CaptureTransport {
        sent: Arc<Mutex<Vec<(String, String, String)>>>,
    }

    impl MailTransport for CaptureTransport {
        fn send(&self, message: &str, subject: &str, recipient: &str) -> Result<()> {
            self.sent.lock().unwrap().push((
                message.to_string(),
                subject.to_string(),
                recipient.to_string(),
            ));
            Ok(())
        }
    }

    #[test]
    fn test_file_sink_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quarry.log");
        let path_str = path.to_str().unwrap();

        let sink = FileSink::open(path_str, Severity::Debug).unwrap();
        sink.write(Severity::Info, "first line");
        sink.write(Severity::Error, "second line");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first line\nsecond line\n");
    }

    #[test]
    fn test_file_sink_open_failure() {
        let result = FileSink::open("/nonexistent-dir/quarry.log", Severity::Debug);
        assert!(result.is_err());
    }

    #[test]
    fn test_mail_sink_delivers_through_transport() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let transport = CaptureTransport { sent: sent.clone() };
        let sink = MailSink::new(Box::new(transport), "Critical Error", "ops@example.com");

        assert_eq!(sink.min_severity(), Severity::Alert);
        sink.write(Severity::Alert, "database is on fire");

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "database is on fire");
        assert_eq!(sent[0].1, "Critical Error");
        assert_eq!(sent[0].2, "ops@example.com");
    }
}
