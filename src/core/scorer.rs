// src/core/scorer.rs

use crate::core::knowledge_base::{
    HEADER_FAIL_MULTIPLIER, RISK_THRESHOLD_CRITICAL, RISK_THRESHOLD_HIGH, RISK_THRESHOLD_MEDIUM,
    severity_points,
};
use crate::core::models::{HeaderFinding, Severity, VulnerabilityFinding};

/// Combines header compliance and vulnerability severities into the final
/// score and level. Pure and deterministic: identical findings always
/// produce an identical result.
pub fn score_assessment(
    headers: &[HeaderFinding],
    vulnerabilities: &[VulnerabilityFinding],
) -> (u32, Severity) {
    let score = calculate_risk_score(headers, vulnerabilities);
    (score, level_for_score(score))
}

/// Failed header checks contribute `weight * 5`; each vulnerability adds its
/// fixed severity points. The total is clamped to 0..=100.
pub fn calculate_risk_score(
    headers: &[HeaderFinding],
    vulnerabilities: &[VulnerabilityFinding],
) -> u32 {
    let header_contribution: u32 = headers
        .iter()
        .filter(|finding| !finding.passed)
        .map(|finding| u32::from(finding.weight) * HEADER_FAIL_MULTIPLIER)
        .sum();

    let vulnerability_contribution: u32 = vulnerabilities
        .iter()
        .map(|finding| severity_points(finding.severity))
        .sum();

    (header_contribution + vulnerability_contribution).min(100)
}

/// Threshold mapping: `<40` LOW, `[40,60)` MEDIUM, `[60,80)` HIGH,
/// `>=80` CRITICAL.
pub fn level_for_score(score: u32) -> Severity {
    if score >= RISK_THRESHOLD_CRITICAL {
        Severity::Critical
    } else if score >= RISK_THRESHOLD_HIGH {
        Severity::High
    } else if score >= RISK_THRESHOLD_MEDIUM {
        Severity::Medium
    } else {
        Severity::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::FindingOrigin;
    use chrono::Utc;

    fn header(passed: bool, weight: u8) -> HeaderFinding {
        HeaderFinding {
            name: "content-security-policy".into(),
            observed_value: passed.then(|| "default-src 'self'".into()),
            passed,
            weight,
            description: String::new(),
        }
    }

    fn vuln(severity: Severity) -> VulnerabilityFinding {
        VulnerabilityFinding {
            id: "CVE-2024-1000".into(),
            severity,
            score: 5.0,
            published_at: Utc::now(),
            summary: String::new(),
            origin: FindingOrigin::Upstream,
        }
    }

    #[test]
    fn level_thresholds_are_inclusive_lower_bounds() {
        assert_eq!(level_for_score(0), Severity::Low);
        assert_eq!(level_for_score(39), Severity::Low);
        assert_eq!(level_for_score(40), Severity::Medium);
        assert_eq!(level_for_score(59), Severity::Medium);
        assert_eq!(level_for_score(60), Severity::High);
        assert_eq!(level_for_score(79), Severity::High);
        assert_eq!(level_for_score(80), Severity::Critical);
        assert_eq!(level_for_score(100), Severity::Critical);
    }

    #[test]
    fn passed_headers_and_no_vulnerabilities_score_zero() {
        let headers = vec![header(true, 5), header(true, 4)];
        let (score, level) = score_assessment(&headers, &[]);
        assert_eq!(score, 0);
        assert_eq!(level, Severity::Low);
    }

    #[test]
    fn failed_headers_contribute_weight_times_five() {
        let headers = vec![header(false, 5), header(false, 2), header(true, 4)];
        assert_eq!(calculate_risk_score(&headers, &[]), 35);
    }

    #[test]
    fn severity_tiers_contribute_fixed_points() {
        let vulns = vec![
            vuln(Severity::Low),
            vuln(Severity::Medium),
            vuln(Severity::High),
            vuln(Severity::Critical),
        ];
        assert_eq!(calculate_risk_score(&[], &vulns), 5 + 10 + 15 + 20);
    }

    #[test]
    fn score_is_clamped_to_one_hundred() {
        let vulns: Vec<VulnerabilityFinding> =
            (0..10).map(|_| vuln(Severity::Critical)).collect();
        let (score, level) = score_assessment(&[], &vulns);
        assert_eq!(score, 100);
        assert_eq!(level, Severity::Critical);
    }

    #[test]
    fn identical_findings_produce_identical_scores() {
        let headers = vec![header(false, 3)];
        let vulns = vec![vuln(Severity::High)];
        assert_eq!(
            score_assessment(&headers, &vulns),
            score_assessment(&headers, &vulns)
        );
    }
}
