//! Log severity levels.

use serde::{Deserialize, Serialize};

/// Record severity, ordered from least to most important.
///
/// Severity is a closed set: callers pick a level, the logger routes the
/// record through a single dispatch path. Each sink filters on its own
/// minimum level, so ordering comparisons (`>=`) are part of the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

impl Severity {
    /// Upper-case level name as it appears in formatted log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Notice => "NOTICE",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
            Severity::Alert => "ALERT",
            Severity::Emergency => "EMERGENCY",
        }
    }

    /// Parse a level name, case-insensitively.
    pub fn from_str(s: &str) -> Option<Severity> {
        match s.to_lowercase().as_str() {
            "debug" => Some(Severity::Debug),
            "info" => Some(Severity::Info),
            "notice" => Some(Severity::Notice),
            "warning" => Some(Severity::Warning),
            "error" => Some(Severity::Error),
            "critical" => Some(Severity::Critical),
            "alert" => Some(Severity::Alert),
            "emergency" => Some(Severity::Emergency),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Error < Severity::Critical);
        assert!(Severity::Critical < Severity::Alert);
        assert!(Severity::Alert < Severity::Emergency);
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(format!("{}", Severity::Critical), "CRITICAL");
        assert_eq!(format!("{}", Severity::Debug), "DEBUG");
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!(Severity::from_str("alert"), Some(Severity::Alert));
        assert_eq!(Severity::from_str("ALERT"), Some(Severity::Alert));
        assert_eq!(Severity::from_str("unknown"), None);
    }
}
