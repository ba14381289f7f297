// src/core/scanner/tech_scanner.rs

use std::collections::HashSet;
use std::time::Duration;

use scraper::{Html, Selector};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::core::knowledge_base::{
    GENERIC_CSS_FRAMEWORKS, HOST_SIGNATURES, MARKUP_SIGNATURES, PROBE_USER_AGENT,
};
use crate::core::models::{CanonicalTarget, DetectedTechnology};

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
const SCRAPE_SERVICE_URL: &str = "https://api.firecrawl.dev/v0/scrape";

/// Infers the technology stack exposed by the target.
///
/// Markup is acquired best-effort through three tiers: the credentialed
/// scraping service (when configured), then a direct fetch of the target,
/// then nothing at all. Each tier's failure is absorbed and the next one
/// tried; with no markup the detector still runs host-suffix inference.
pub async fn run_tech_detection(
    target: &CanonicalTarget,
    scrape_api_key: Option<&str>,
) -> Vec<DetectedTechnology> {
    info!(host = %target.host, "starting technology detection");

    let markup = fetch_markup(target, scrape_api_key).await;
    let technologies = match &markup {
        Some(html) => {
            let from_markup = analyze_markup(html);
            debug!(count = from_markup.len(), "markup signals evaluated");
            merge_signals(from_markup, analyze_host(&target.host))
        }
        None => {
            warn!(host = %target.host, "no markup available, falling back to host-only inference");
            analyze_host(&target.host)
        }
    };

    let technologies = filter_generic_frameworks(technologies);
    info!(count = technologies.len(), "technology detection finished");
    technologies
}

/// Acquires page markup through the fallback tiers. Returns `None` when
/// every tier fails; that is an ordinary outcome, not an error.
async fn fetch_markup(target: &CanonicalTarget, scrape_api_key: Option<&str>) -> Option<String> {
    let client = match reqwest::Client::builder()
        .user_agent(PROBE_USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "failed to build HTTP client for markup fetch");
            return None;
        }
    };

    if let Some(key) = scrape_api_key {
        match fetch_via_scrape_service(&client, target, key).await {
            Ok(html) => {
                debug!(bytes = html.len(), "markup acquired via scraping service");
                return Some(html);
            }
            Err(e) => {
                warn!(error = %e, "scraping service unavailable, falling back to direct fetch");
            }
        }
    }

    match fetch_direct(&client, target).await {
        Ok(html) => {
            debug!(bytes = html.len(), "markup acquired via direct fetch");
            Some(html)
        }
        Err(e) => {
            warn!(error = %e, "direct fetch failed");
            None
        }
    }
}

async fn fetch_via_scrape_service(
    client: &reqwest::Client,
    target: &CanonicalTarget,
    api_key: &str,
) -> Result<String, String> {
    let response = client
        .post(SCRAPE_SERVICE_URL)
        .bearer_auth(api_key)
        .json(&json!({
            "url": target.origin_url(),
            "pageOptions": { "onlyMainContent": false, "includeHtml": true },
        }))
        .send()
        .await
        .map_err(|e| format!("scrape request failed: {}", e))?;

    if !response.status().is_success() {
        return Err(format!("scrape service returned {}", response.status()));
    }

    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|e| format!("scrape response was not JSON: {}", e))?;
    body.pointer("/data/html")
        .and_then(|v| v.as_str())
        .filter(|html| !html.is_empty())
        .map(str::to_string)
        .ok_or_else(|| "scrape response carried no HTML".to_string())
}

async fn fetch_direct(
    client: &reqwest::Client,
    target: &CanonicalTarget,
) -> Result<String, String> {
    let response = client
        .get(target.origin_url())
        .send()
        .await
        .map_err(|e| format!("request failed: {}", e))?;

    if !response.status().is_success() {
        return Err(format!("target returned {}", response.status()));
    }

    response
        .text()
        .await
        .map_err(|e| format!("failed to read body: {}", e))
}

/// Evaluates the markup signature table against the page.
///
/// Each signature pattern counts at most once, whether it hits the raw body
/// or an attribute value pulled out of the document (script sources, the
/// generator meta tag). Confidence is `min(0.9, 0.5 + 0.2 * matches)`.
pub fn analyze_markup(markup: &str) -> Vec<DetectedTechnology> {
    let document = Html::parse_document(markup);
    let attribute_corpus = collect_attribute_corpus(&document);

    let mut technologies = Vec::new();
    for signature in MARKUP_SIGNATURES {
        let matches = signature
            .patterns
            .iter()
            .filter(|re| {
                re.is_match(markup) || attribute_corpus.iter().any(|v| re.is_match(v))
            })
            .count();
        if matches > 0 {
            technologies.push(DetectedTechnology {
                name: signature.name.to_string(),
                category: signature.category.to_string(),
                confidence: markup_confidence(matches),
            });
        }
    }
    technologies
}

fn markup_confidence(matches: usize) -> f64 {
    (0.5 + 0.2 * matches as f64).min(0.9)
}

/// Pulls `script[src]`, `link[href]` and the generator meta tag out of the
/// parsed document so signatures can hit attribute-borne signals.
fn collect_attribute_corpus(document: &Html) -> Vec<String> {
    let mut corpus = Vec::new();
    for (selector_str, attr) in [
        ("script[src]", "src"),
        ("link[href]", "href"),
        ("meta[name='generator']", "content"),
    ] {
        if let Ok(selector) = Selector::parse(selector_str) {
            for element in document.select(&selector) {
                if let Some(value) = element.value().attr(attr) {
                    corpus.push(value.to_string());
                }
            }
        }
    }
    corpus
}

/// Evaluates the hosting-platform suffix table against the canonical host.
pub fn analyze_host(host: &str) -> Vec<DetectedTechnology> {
    HOST_SIGNATURES
        .iter()
        .filter(|sig| sig.suffix.is_match(host))
        .map(|sig| DetectedTechnology {
            name: sig.name.to_string(),
            category: sig.category.to_string(),
            confidence: 0.95,
        })
        .collect()
}

/// Union by name; a markup-derived entry always wins over the host-derived
/// entry for the same technology.
pub fn merge_signals(
    from_markup: Vec<DetectedTechnology>,
    from_host: Vec<DetectedTechnology>,
) -> Vec<DetectedTechnology> {
    let seen: HashSet<String> = from_markup.iter().map(|t| t.name.clone()).collect();
    let mut merged = from_markup;
    merged.extend(from_host.into_iter().filter(|t| !seen.contains(&t.name)));
    merged
}

/// Drops generic CSS frameworks when anything more specific was detected;
/// on their own they remain the best available signal.
pub fn filter_generic_frameworks(
    technologies: Vec<DetectedTechnology>,
) -> Vec<DetectedTechnology> {
    let has_specific = technologies
        .iter()
        .any(|t| !GENERIC_CSS_FRAMEWORKS.contains(&t.name.as_str()));
    if has_specific {
        technologies
            .into_iter()
            .filter(|t| !GENERIC_CSS_FRAMEWORKS.contains(&t.name.as_str()))
            .collect()
    } else {
        technologies
    }
}
