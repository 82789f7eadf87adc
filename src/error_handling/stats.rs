//! Capture statistics tracking.
//!
//! This module provides thread-safe counters for the events observed by the
//! listener and its connection tasks.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::CaptureEvent;

/// Thread-safe capture statistics tracker.
///
/// Every [`CaptureEvent`] is initialized to zero on creation. Connection
/// tasks only ever increment; nothing reads the counters to decide an outcome.
///
/// # Thread Safety
///
/// This struct is thread-safe and can be shared across multiple tasks using `Arc`.
#[derive(Debug)]
pub struct CaptureStats {
    events: HashMap<CaptureEvent, AtomicUsize>,
}

impl CaptureStats {
    /// Creates a tracker with every counter at zero.
    pub fn new() -> Self {
        let mut events = HashMap::new();
        for event in CaptureEvent::iter() {
            events.insert(event, AtomicUsize::new(0));
        }
        CaptureStats { events }
    }

    /// Increment the counter for an event.
    pub fn record(&self, event: CaptureEvent) {
        if let Some(counter) = self.events.get(&event) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to record {:?} which is not in the map. \
                 This indicates a bug in CaptureStats initialization.",
                event
            );
        }
    }

    /// Get the count for an event.
    ///
    /// Returns 0 if the event is not in the map (should never happen if properly initialized).
    pub fn count(&self, event: CaptureEvent) -> usize {
        self.events
            .get(&event)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Total connections that ended without an artifact for any reason.
    pub fn total_without_artifact(&self) -> usize {
        [
            CaptureEvent::HandshakeFailed,
            CaptureEvent::HandshakeTimeout,
            CaptureEvent::NoChainPresented,
            CaptureEvent::CaptureFailed,
        ]
        .into_iter()
        .map(|event| self.count(event))
        .sum()
    }

    /// Logs one line per non-zero counter, then the artifact-less total.
    pub fn log_summary(&self) {
        for event in CaptureEvent::iter() {
            let count = self.count(event);
            if count > 0 {
                log::info!("[+] {}: {}", event.label(), count);
            }
        }
        let without_artifact = self.total_without_artifact();
        if without_artifact > 0 {
            log::info!("[+] connections without artifact: {without_artifact}");
        }
    }
}

impl Default for CaptureStats {
    fn default() -> Self {
        Self::new()
    }
}
