//! Prometheus counters for the resolution ladder.
//!
//! The registry is shared workspace-wide: other crates register their counters into
//! [`registry()`] through [`register_counter`] so [`render`] exposes everything in one place.

use once_cell::sync::{Lazy, OnceCell};
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use tracing::{debug, error};

use crate::types::ResolutionSource;

static GLOBAL_REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);
static REGISTER_ONCE: OnceCell<()> = OnceCell::new();
static QUERY_CACHE_EVENTS: OnceCell<IntCounterVec> = OnceCell::new();
static RESOLUTION_STAGES: OnceCell<IntCounterVec> = OnceCell::new();

/// Cache outcomes observed by the resolution engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheEvent {
    Hit,
    Stale,
    Miss,
    Store,
}

impl CacheEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheEvent::Hit => "hit",
            CacheEvent::Stale => "stale",
            CacheEvent::Miss => "miss",
            CacheEvent::Store => "store",
        }
    }
}

pub fn register_metrics() {
    REGISTER_ONCE.get_or_init(|| {
        let registry = registry();
        register_counter(
            registry,
            &QUERY_CACHE_EVENTS,
            "locus_query_cache_events_total",
            "Description cache lookups and stores by outcome",
            &["event"],
        );
        register_counter(
            registry,
            &RESOLUTION_STAGES,
            "locus_resolution_total",
            "Element resolutions by terminal stage",
            &["stage"],
        );
    });
}

pub fn register_counter(
    registry: &Registry,
    slot: &OnceCell<IntCounterVec>,
    name: &str,
    help: &str,
    labels: &[&str],
) {
    let counter = match IntCounterVec::new(Opts::new(name, help), labels) {
        Ok(counter) => counter,
        Err(err) => {
            error!(?err, metric = name, "failed to create counter");
            return;
        }
    };
    if let Err(err) = registry.register(Box::new(counter.clone())) {
        error!(?err, metric = name, "failed to register counter");
    }
    let _ = slot.set(counter);
}

pub fn registry() -> &'static Registry {
    &GLOBAL_REGISTRY
}

pub fn record_cache_event(event: CacheEvent) {
    register_metrics();
    if let Some(counter) = QUERY_CACHE_EVENTS.get() {
        counter.with_label_values(&[event.as_str()]).inc();
    }
    debug!(target: "query_cache", event = event.as_str(), "query cache metric");
}

pub fn record_resolution(source: ResolutionSource) {
    register_metrics();
    if let Some(counter) = RESOLUTION_STAGES.get() {
        counter.with_label_values(&[source.name()]).inc();
    }
}

/// Text exposition of every registered metric.
pub fn render() -> String {
    register_metrics();
    let encoder = TextEncoder::new();
    let families = registry().gather();
    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&families, &mut buffer) {
        error!(?err, "failed to encode prometheus metrics");
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
