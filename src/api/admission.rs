// src/api/admission.rs

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::http::HeaderMap;
use tracing::debug;

/// The per-client request gate in front of the pipeline. Abstracted as a
/// trait so the in-memory map used here (and in tests) could be swapped for
/// a distributed store without touching the pipeline.
pub trait AdmissionPolicy: Send + Sync {
    /// Returns true when the keyed client may proceed, consuming one unit
    /// of its quota.
    fn try_admit(&self, key: &str) -> bool;
}

struct WindowSlot {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window counter: each key gets `quota` requests per `window`.
/// Increments are serialized per the shared lock; distinct keys only contend
/// on the map itself.
pub struct FixedWindowLimiter {
    window: Duration,
    quota: u32,
    slots: Mutex<HashMap<String, WindowSlot>>,
}

impl FixedWindowLimiter {
    pub fn new(window: Duration, quota: u32) -> Self {
        Self {
            window,
            quota,
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl AdmissionPolicy for FixedWindowLimiter {
    fn try_admit(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut slots = match self.slots.lock() {
            Ok(guard) => guard,
            // A poisoned lock means a panic elsewhere; fail open rather than
            // refusing all traffic.
            Err(poisoned) => poisoned.into_inner(),
        };

        match slots.get_mut(key) {
            Some(slot) if now < slot.reset_at => {
                if slot.count >= self.quota {
                    debug!(key, "admission denied, quota exhausted");
                    return false;
                }
                slot.count += 1;
                true
            }
            _ => {
                slots.insert(
                    key.to_string(),
                    WindowSlot {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                true
            }
        }
    }
}

/// Derives the admission key from proxy-forwarding headers, falling back to
/// a shared bucket when the client cannot be identified.
pub fn client_key(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first_hop) = forwarded.split(',').next() {
            let first_hop = first_hop.trim();
            if !first_hop.is_empty() {
                return first_hop.to_string();
            }
        }
    }
    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        return real_ip.trim().to_string();
    }
    "unknown".to_string()
}
