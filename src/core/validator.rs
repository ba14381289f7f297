// src/core/validator.rs

use std::net::{Ipv4Addr, Ipv6Addr};

use tracing::debug;
use url::{Host, Url};

use crate::core::models::{CanonicalTarget, InvalidTarget};

/// Normalizes a free-form URL string into a [`CanonicalTarget`], rejecting
/// anything that could be used to probe the local network.
///
/// This is the sole SSRF defense boundary of the pipeline: the scheme is
/// forced to HTTPS, IP literals in private/loopback/link-local ranges are
/// rejected, and so are `localhost`-style and `.local` hostnames. Everything
/// downstream trusts the output unconditionally.
pub fn canonicalize(input: &str) -> Result<CanonicalTarget, InvalidTarget> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(InvalidTarget::new("empty target", input));
    }

    // Bare hostnames are accepted; the secure scheme is assumed for them.
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else if trimmed.contains("://") {
        // An explicit non-web scheme is a malformed target, not something to
        // silently rewrite.
        return Err(InvalidTarget::new("unsupported scheme", input));
    } else {
        format!("https://{}", trimmed)
    };

    let parsed = Url::parse(&with_scheme)
        .map_err(|e| InvalidTarget::new(format!("malformed URL ({})", e), input))?;

    let host = match parsed.host() {
        Some(h) => h.to_owned(),
        None => return Err(InvalidTarget::new("missing host", input)),
    };

    match &host {
        Host::Ipv4(addr) => {
            if is_forbidden_ipv4(addr) {
                return Err(InvalidTarget::new("private or loopback address", input));
            }
        }
        Host::Ipv6(addr) => {
            if is_forbidden_ipv6(addr) {
                return Err(InvalidTarget::new("private or loopback address", input));
            }
        }
        Host::Domain(name) => {
            let name = name.to_ascii_lowercase();
            if name == "localhost" || name.ends_with(".localhost") || name.ends_with(".local") {
                return Err(InvalidTarget::new("local hostname", input));
            }
            // A hostname without a registrable suffix cannot be a public
            // target; this also catches plain words like "not-a-url".
            if !name.contains('.') {
                return Err(InvalidTarget::new("unqualified hostname", input));
            }
        }
    }

    let canonical = CanonicalTarget {
        original_input: input.to_string(),
        // The transport is forced regardless of what the caller supplied.
        scheme: "https".to_string(),
        host: host.to_string(),
    };
    debug!(host = %canonical.host, "target canonicalized");
    Ok(canonical)
}

/// 10/8, 172.16/12, 192.168/16, 127/8 and 169.254/16.
fn is_forbidden_ipv4(addr: &Ipv4Addr) -> bool {
    addr.is_private() || addr.is_loopback() || addr.is_link_local()
}

/// `::1`, `fc00::/7` (unique local) and `fe80::/10` (link local).
fn is_forbidden_ipv6(addr: &Ipv6Addr) -> bool {
    let first = addr.segments()[0];
    addr.is_loopback() || (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
}
