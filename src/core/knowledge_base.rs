//! The static, inspectable knowledge that drives the assessment pipeline:
//! the security-header checklist, the technology signature tables, and the
//! hand-tuned scoring constants. Everything here is data, not control flow,
//! so each table can be audited and extended without touching the scanners.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::models::Severity;

/// User-agent sent on every outbound probe. Honest about what we are.
pub const PROBE_USER_AGENT: &str = "AegisRS-Assessor/0.1";

// --- Security-Header Checklist ---

/// One entry of the fixed header checklist.
pub struct HeaderCheck {
    /// Lowercase header name as it appears on the wire.
    pub name: &'static str,
    /// The value must match this for the check to pass.
    pub expected: &'static Lazy<Regex>,
    /// Fixed risk weight (1..=5) contributed when the check fails.
    pub weight: u8,
    pub description: &'static str,
}

static RE_PRESENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^.+$").unwrap());
static RE_HSTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^max-age=\d+").unwrap());
static RE_FRAME_OPTIONS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(DENY|SAMEORIGIN|ALLOW-FROM .+)$").unwrap());
static RE_NOSNIFF: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^nosniff$").unwrap());
static RE_REFERRER_POLICY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(no-referrer|no-referrer-when-downgrade|origin|origin-when-cross-origin|same-origin|strict-origin|strict-origin-when-cross-origin|unsafe-url)$",
    )
    .unwrap()
});

/// The checklist evaluated by the header inspector. Exactly one finding is
/// emitted per entry, in this order.
pub static HEADER_CHECKLIST: &[HeaderCheck] = &[
    HeaderCheck {
        name: "content-security-policy",
        expected: &RE_PRESENT,
        weight: 5,
        description: "Content Security Policy helps prevent XSS attacks by controlling resource loading",
    },
    HeaderCheck {
        name: "strict-transport-security",
        expected: &RE_HSTS,
        weight: 4,
        description: "HSTS enforces secure HTTPS connections and prevents protocol downgrade attacks",
    },
    HeaderCheck {
        name: "x-frame-options",
        expected: &RE_FRAME_OPTIONS,
        weight: 3,
        description: "X-Frame-Options prevents clickjacking attacks by controlling iframe embedding",
    },
    HeaderCheck {
        name: "x-content-type-options",
        expected: &RE_NOSNIFF,
        weight: 2,
        description: "X-Content-Type-Options prevents MIME type sniffing vulnerabilities",
    },
    HeaderCheck {
        name: "referrer-policy",
        expected: &RE_REFERRER_POLICY,
        weight: 2,
        description: "Referrer Policy controls how much referrer information is shared with requests",
    },
    HeaderCheck {
        name: "permissions-policy",
        expected: &RE_PRESENT,
        weight: 3,
        description: "Permissions Policy controls access to browser features and APIs",
    },
    HeaderCheck {
        name: "cache-control",
        expected: &RE_PRESENT,
        weight: 1,
        description: "Cache-Control headers help prevent sensitive data caching",
    },
];

// --- Technology Signature Tables ---

/// A markup-derived technology signature. Confidence grows with the number
/// of patterns that match: `min(0.9, 0.5 + 0.2 * matches)`.
pub struct MarkupSignature {
    pub name: &'static str,
    pub category: &'static str,
    pub patterns: &'static [&'static Lazy<Regex>],
}

/// A hostname-suffix signature for hosting platforms. A match carries a
/// fixed confidence of 0.95.
pub struct HostSignature {
    pub name: &'static str,
    pub category: &'static str,
    pub suffix: &'static Lazy<Regex>,
}

static RE_REACT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)react").unwrap());
static RE_REACT_ROOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)data-reactroot").unwrap());
static RE_NEXT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)next\.js").unwrap());
static RE_NEXT_ASSETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)/_next/").unwrap());
static RE_NEXT_DATA: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)__next").unwrap());
static RE_VUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)vue(\.js)?").unwrap());
static RE_VUE_DIRECTIVES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)v-if|v-for|v-model").unwrap());
static RE_ANGULAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)angular").unwrap());
static RE_ANGULAR_ATTRS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)ng-[a-z]+=").unwrap());
static RE_SVELTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)svelte").unwrap());
static RE_TAILWIND: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)tailwind").unwrap());
static RE_UTILITY_CLASSES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)class="[^"]*\b(bg-|text-|p-|m-|flex|grid)"#).unwrap());
static RE_BOOTSTRAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)bootstrap").unwrap());
static RE_BOOTSTRAP_CLASSES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)class="[^"]*\b(btn|container|row|col)"#).unwrap());
static RE_JQUERY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)jquery").unwrap());
static RE_JQUERY_MIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)jquery\.min\.js").unwrap());
static RE_WORDPRESS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)wordpress").unwrap());
static RE_WP_PATHS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)wp-content|wp-includes").unwrap());
static RE_SHOPIFY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)shopify").unwrap());
static RE_SHOPIFY_CDN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)cdn\.shopify|myshopify\.com").unwrap());
static RE_WEBFLOW: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)webflow").unwrap());
static RE_SQUARESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)squarespace|static1\.squarespace").unwrap());

/// The markup signature table.
pub static MARKUP_SIGNATURES: &[MarkupSignature] = &[
    MarkupSignature { name: "React", category: "Frontend Framework", patterns: &[&RE_REACT, &RE_REACT_ROOT] },
    MarkupSignature { name: "Next.js", category: "Frontend Framework", patterns: &[&RE_NEXT, &RE_NEXT_ASSETS, &RE_NEXT_DATA] },
    MarkupSignature { name: "Vue.js", category: "Frontend Framework", patterns: &[&RE_VUE, &RE_VUE_DIRECTIVES] },
    MarkupSignature { name: "Angular", category: "Frontend Framework", patterns: &[&RE_ANGULAR, &RE_ANGULAR_ATTRS] },
    MarkupSignature { name: "Svelte", category: "Frontend Framework", patterns: &[&RE_SVELTE] },
    MarkupSignature { name: "Tailwind CSS", category: "CSS Framework", patterns: &[&RE_TAILWIND, &RE_UTILITY_CLASSES] },
    MarkupSignature { name: "Bootstrap", category: "CSS Framework", patterns: &[&RE_BOOTSTRAP, &RE_BOOTSTRAP_CLASSES] },
    MarkupSignature { name: "jQuery", category: "JavaScript Library", patterns: &[&RE_JQUERY, &RE_JQUERY_MIN] },
    MarkupSignature { name: "WordPress", category: "CMS", patterns: &[&RE_WORDPRESS, &RE_WP_PATHS] },
    MarkupSignature { name: "Shopify", category: "E-commerce", patterns: &[&RE_SHOPIFY, &RE_SHOPIFY_CDN] },
    MarkupSignature { name: "Webflow", category: "Website Builder", patterns: &[&RE_WEBFLOW] },
    MarkupSignature { name: "Squarespace", category: "Website Builder", patterns: &[&RE_SQUARESPACE] },
];

static RE_VERCEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)vercel\.app$").unwrap());
static RE_NETLIFY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)netlify\.app$").unwrap());
static RE_GITHUB_PAGES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)github\.io$").unwrap());
static RE_HEROKU: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)herokuapp\.com$").unwrap());
static RE_FIREBASE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)firebaseapp\.com$").unwrap());
static RE_CLOUDFRONT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)cloudfront\.net$").unwrap());

/// The hosting-platform signature table, matched against the canonical host.
pub static HOST_SIGNATURES: &[HostSignature] = &[
    HostSignature { name: "Vercel", category: "Hosting Platform", suffix: &RE_VERCEL },
    HostSignature { name: "Netlify", category: "Hosting Platform", suffix: &RE_NETLIFY },
    HostSignature { name: "GitHub Pages", category: "Hosting Platform", suffix: &RE_GITHUB_PAGES },
    HostSignature { name: "Heroku", category: "Hosting Platform", suffix: &RE_HEROKU },
    HostSignature { name: "Firebase", category: "Hosting Platform", suffix: &RE_FIREBASE },
    HostSignature { name: "AWS CloudFront", category: "CDN", suffix: &RE_CLOUDFRONT },
];

/// Generic CSS frameworks are only reported when nothing more specific was
/// detected; on their own they say very little about the exposed stack.
pub const GENERIC_CSS_FRAMEWORKS: &[&str] = &["Tailwind CSS", "Bootstrap"];

// --- Scoring Constants ---
//
// Hand-tuned heuristics. These values define the observable scoring behavior
// and are kept as configuration constants rather than re-derived.

/// Each failed header check contributes `weight * HEADER_FAIL_MULTIPLIER`.
pub const HEADER_FAIL_MULTIPLIER: u32 = 5;

/// Fixed point value contributed by one vulnerability of the given tier.
pub fn severity_points(severity: Severity) -> u32 {
    match severity {
        Severity::Low => 5,
        Severity::Medium => 10,
        Severity::High => 15,
        Severity::Critical => 20,
    }
}

/// Inclusive lower bounds of the risk levels above LOW.
pub const RISK_THRESHOLD_MEDIUM: u32 = 40;
pub const RISK_THRESHOLD_HIGH: u32 = 60;
pub const RISK_THRESHOLD_CRITICAL: u32 = 80;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checklist_has_exactly_seven_entries_in_fixed_order() {
        let names: Vec<&str> = HEADER_CHECKLIST.iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec![
                "content-security-policy",
                "strict-transport-security",
                "x-frame-options",
                "x-content-type-options",
                "referrer-policy",
                "permissions-policy",
                "cache-control",
            ]
        );
    }

    #[test]
    fn checklist_weights_are_in_range() {
        for check in HEADER_CHECKLIST {
            assert!((1..=5).contains(&check.weight), "{}", check.name);
        }
    }

    #[test]
    fn header_expectations_match_known_good_values() {
        let find = |name: &str| {
            HEADER_CHECKLIST
                .iter()
                .find(|c| c.name == name)
                .unwrap_or_else(|| panic!("missing checklist entry {name}"))
        };
        assert!(find("strict-transport-security").expected.is_match("max-age=31536000"));
        assert!(!find("strict-transport-security").expected.is_match("enabled"));
        assert!(find("x-frame-options").expected.is_match("DENY"));
        assert!(find("x-frame-options").expected.is_match("sameorigin"));
        assert!(!find("x-frame-options").expected.is_match("ALLOWALL"));
        assert!(find("x-content-type-options").expected.is_match("nosniff"));
        assert!(!find("x-content-type-options").expected.is_match("sniff"));
        assert!(find("referrer-policy").expected.is_match("strict-origin-when-cross-origin"));
        assert!(!find("referrer-policy").expected.is_match("whatever"));
        assert!(find("content-security-policy").expected.is_match("default-src 'self'"));
    }

    #[test]
    fn host_signatures_match_only_suffixes() {
        assert!(RE_VERCEL.is_match("my-app.vercel.app"));
        assert!(!RE_VERCEL.is_match("vercel.app.evil.com"));
        assert!(RE_GITHUB_PAGES.is_match("user.github.io"));
    }

    #[test]
    fn every_signature_table_regex_compiles() {
        for sig in MARKUP_SIGNATURES {
            for re in sig.patterns {
                let _ = re.as_str();
            }
        }
        for sig in HOST_SIGNATURES {
            let _ = sig.suffix.as_str();
        }
    }
}
