// src/core/scanner/mod.rs

// Public interface of the `scanner` module: one sub-scanner per pipeline
// stage, plus the orchestrator that sequences them.
pub mod headers_scanner;
pub mod tech_scanner;
pub mod vuln_scanner;

use chrono::Utc;
use tracing::info;

use crate::config::AppConfig;
use crate::core::models::{AssessmentReport, InvalidTarget, VulnerabilityFinding};
use crate::core::scorer::score_assessment;
use crate::core::validator::canonicalize;
use self::headers_scanner::run_headers_inspection;
use self::tech_scanner::run_tech_detection;
use self::vuln_scanner::{CorrelatorSettings, run_vuln_correlation};

/// Runs the whole assessment pipeline for one target and assembles the
/// atomic report.
///
/// Header inspection and technology detection have no data dependency on
/// each other and run concurrently via `tokio::join!`; vulnerability
/// correlation consumes the detected technologies and therefore waits for
/// detection. Only an invalid target aborts — every later stage degrades
/// into the report instead of failing it.
pub async fn run_assessment(
    input: &str,
    config: &AppConfig,
) -> Result<AssessmentReport, InvalidTarget> {
    let target = canonicalize(input)?;
    info!(host = %target.host, "starting assessment");

    let (headers, technologies) = tokio::join!(
        run_headers_inspection(&target),
        run_tech_detection(&target, config.scrape_api_key.as_deref()),
    );

    let correlator = CorrelatorSettings {
        api_key: config.vuln_api_key.clone(),
        call_delay: config.vuln_call_delay,
    };
    let findings_by_tech = run_vuln_correlation(&technologies, &correlator).await;

    // Flatten in detection order, then upstream/fallback order within each
    // technology. The map itself carries no ordering.
    let vulnerabilities: Vec<VulnerabilityFinding> = technologies
        .iter()
        .filter_map(|tech| findings_by_tech.get(&tech.name))
        .flatten()
        .cloned()
        .collect();

    let (risk_score, risk_level) = score_assessment(&headers, &vulnerabilities);
    info!(host = %target.host, risk_score, risk_level = %risk_level, "assessment finished");

    Ok(AssessmentReport {
        target,
        technologies,
        headers,
        vulnerabilities,
        risk_score,
        risk_level,
        generated_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Private/local targets must be rejected before any probe is issued, so
    // these run without network access.
    #[tokio::test]
    async fn private_targets_are_rejected_before_any_probe() {
        let config = AppConfig::offline();
        for input in [
            "10.0.0.1",
            "192.168.1.1",
            "172.16.0.1",
            "127.0.0.1",
            "localhost",
            "app.localhost",
            "test.local",
        ] {
            let err = run_assessment(input, &config).await.unwrap_err();
            assert_eq!(err.original_input, input, "input {:?}", input);
        }
    }

    #[tokio::test]
    async fn malformed_targets_are_rejected() {
        let config = AppConfig::offline();
        for input in ["", "not-a-url", "ftp://x.com"] {
            assert!(run_assessment(input, &config).await.is_err(), "input {:?}", input);
        }
    }
}
