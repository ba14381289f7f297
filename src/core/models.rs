// src/core/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// --- Core Data Models ---

/// Severity of a vulnerability finding, doubling as the discrete risk level
/// of a whole report. Serialized in the uppercase form used by CVSS feeds
/// ("LOW", "MEDIUM", "HIGH", "CRITICAL").
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Maps a CVSS v3.1 base score onto a severity tier.
    pub fn from_cvss(score: f64) -> Self {
        if score >= 9.0 {
            Severity::Critical
        } else if score >= 7.0 {
            Severity::High
        } else if score >= 4.0 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    /// Parses the `baseSeverity` string carried by upstream CVSS metrics.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_uppercase().as_str() {
            "LOW" => Some(Severity::Low),
            "MEDIUM" => Some(Severity::Medium),
            "HIGH" => Some(Severity::High),
            "CRITICAL" => Some(Severity::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "LOW"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::High => write!(f, "HIGH"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// A validated, normalized assessment target. Constructed exclusively by the
/// validator; every downstream component trusts it and performs no further
/// host checks. The scheme is always the secure transport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalTarget {
    /// The raw string the caller submitted, kept for diagnostics.
    pub original_input: String,
    /// Always "https" — a caller cannot request the insecure transport.
    pub scheme: String,
    pub host: String,
}

impl CanonicalTarget {
    /// The origin URL all outbound probes are issued against.
    pub fn origin_url(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }
}

/// The caller's-fault error: malformed input or a private/local target.
/// This is the only error that aborts an assessment before a report exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTarget {
    pub message: String,
    /// The offending input, echoed back for caller diagnostics.
    pub original_input: String,
}

impl InvalidTarget {
    pub fn new(message: impl Into<String>, original_input: &str) -> Self {
        Self {
            message: message.into(),
            original_input: original_input.to_string(),
        }
    }
}

impl fmt::Display for InvalidTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.message, self.original_input)
    }
}

impl std::error::Error for InvalidTarget {}

// --- Header Inspection Models ---

/// The compliance verdict for one entry of the security-header checklist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeaderFinding {
    /// Lowercase header name, e.g. "content-security-policy".
    pub name: String,
    /// The value observed on the wire, `None` when absent or unverifiable.
    pub observed_value: Option<String>,
    /// True only when the header is present and matches its expectation.
    pub passed: bool,
    /// Fixed per-header risk weight (1..=5), not derived at runtime.
    pub weight: u8,
    pub description: String,
}

// --- Technology Detection Models ---

/// A technology inferred from markup patterns or hostname suffixes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectedTechnology {
    pub name: String,
    pub category: String,
    /// 0..1; grows with the number of independent signals that agree.
    pub confidence: f64,
}

// --- Vulnerability Correlation Models ---

/// Where a vulnerability record came from. Kept out of the serialized report
/// so tests can assert the fallback fired without sniffing summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FindingOrigin {
    /// Fetched from the live vulnerability database.
    #[default]
    Upstream,
    /// Deterministically generated because the upstream was unavailable.
    Synthetic,
}

/// A single known-vulnerability record associated with one detected
/// technology.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VulnerabilityFinding {
    /// CVE-shaped identifier (`CVE-\d{4}-\d{4,}`).
    pub id: String,
    pub severity: Severity,
    /// CVSS-style base score (0..10).
    pub score: f64,
    pub published_at: DateTime<Utc>,
    pub summary: String,
    #[serde(skip)]
    pub origin: FindingOrigin,
}

// --- Assessment Report ---

/// The atomic output of one assessment. Immutable once assembled; never
/// persisted beyond the request/response that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub target: CanonicalTarget,
    pub technologies: Vec<DetectedTechnology>,
    pub headers: Vec<HeaderFinding>,
    /// Flattened across technologies, in detection order.
    pub vulnerabilities: Vec<VulnerabilityFinding>,
    /// 0..=100.
    pub risk_score: u32,
    pub risk_level: Severity,
    pub generated_at: DateTime<Utc>,
}
