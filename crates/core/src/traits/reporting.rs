//! Advisory text and telemetry sinks
//!
//! Both are fire-and-forget: nothing the sink does feeds back into the
//! control loop.

use heapless::{String, Vec};

use crate::autorotation::LogRecord;

/// Maximum advisory text length (one MAVLink STATUSTEXT chunk)
pub const MAX_TEXT_LEN: usize = 50;

/// Message severity (MAVLink MAV_SEVERITY ordering)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

/// Ground control station text channel
pub trait GcsNotifier {
    /// Queue a text message for the GCS
    fn send_text(&mut self, severity: Severity, text: &str);
}

/// Onboard log sink for tuning records
pub trait TelemetrySink {
    /// Write one record
    fn write_record(&mut self, record: &LogRecord);
}

// ============================================================================
// Mock Implementations (always available for testing)
// ============================================================================

/// Number of messages retained by [`MockGcs`]
pub const MOCK_GCS_CAPACITY: usize = 32;

/// GCS sink keeping the most recent messages
#[derive(Debug, Default)]
pub struct MockGcs {
    pub messages: Vec<(Severity, String<MAX_TEXT_LEN>), MOCK_GCS_CAPACITY>,
}

impl MockGcs {
    /// Number of messages exactly matching `text`
    pub fn count(&self, text: &str) -> usize {
        self.messages
            .iter()
            .filter(|(_, msg)| msg.as_str() == text)
            .count()
    }

    /// True if any message matched `text`
    pub fn contains(&self, text: &str) -> bool {
        self.count(text) > 0
    }
}

impl GcsNotifier for MockGcs {
    fn send_text(&mut self, severity: Severity, text: &str) {
        let mut msg = String::new();
        // Truncate silently like the STATUSTEXT encoder
        for ch in text.chars() {
            if msg.push(ch).is_err() {
                break;
            }
        }
        if self.messages.is_full() {
            self.messages.remove(0);
        }
        let _ = self.messages.push((severity, msg));
    }
}

/// Telemetry sink counting records per kind
#[derive(Debug, Default)]
pub struct MockTelemetry {
    pub glide_tuning: u32,
    pub flare_tuning: u32,
    pub tracking: u32,
    pub flare_assessment: u32,
    pub flare_detail: u32,
    pub last: Option<LogRecord>,
}

impl TelemetrySink for MockTelemetry {
    fn write_record(&mut self, record: &LogRecord) {
        match record {
            LogRecord::GlideTuning(_) => self.glide_tuning += 1,
            LogRecord::FlareTuning(_) => self.flare_tuning += 1,
            LogRecord::Tracking(_) => self.tracking += 1,
            LogRecord::FlareAssessment(_) => self.flare_assessment += 1,
            LogRecord::FlareDetail(_) => self.flare_detail += 1,
        }
        self.last = Some(*record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_gcs_truncates_long_text() {
        let mut gcs = MockGcs::default();
        let long = "0123456789012345678901234567890123456789012345678901234567890123456789";
        gcs.send_text(Severity::Info, long);
        assert_eq!(gcs.messages[0].1.len(), MAX_TEXT_LEN);
    }

    #[test]
    fn test_mock_gcs_drops_oldest_when_full() {
        let mut gcs = MockGcs::default();
        gcs.send_text(Severity::Info, "first");
        for _ in 0..MOCK_GCS_CAPACITY {
            gcs.send_text(Severity::Info, "filler");
        }
        assert!(!gcs.contains("first"));
        assert_eq!(gcs.count("filler"), MOCK_GCS_CAPACITY);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical < Severity::Warning);
        assert!(Severity::Info < Severity::Debug);
    }
}
