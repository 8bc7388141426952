//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use glyphdeck::icons::{CodepointSource, FontWeight, IconFontSource, SourceId, SourceRegistry};
use glyphdeck_net::NetworkError;
use parking_lot::{Condvar, Mutex};

/// The three-glyph payload from `fixtures/sample.codepoints`.
pub const SAMPLE: &str = include_str!("../fixtures/sample.codepoints");

pub fn font(id: &str, style: &str) -> IconFontSource {
    IconFontSource {
        id: SourceId::new(id),
        display_name: "Test Symbols".to_string(),
        style_label: style.to_string(),
        font_family: format!("Test Symbols {style}"),
        codepoints_url: format!("https://icons.invalid/{id}.codepoints"),
        font_files: Vec::new(),
        available_weights: vec![FontWeight::Light, FontWeight::Regular, FontWeight::Bold],
        default_enabled: true,
    }
}

/// Blocks fetches until opened.
#[derive(Clone, Default)]
pub struct Gate(Arc<(Mutex<bool>, Condvar)>);

impl Gate {
    pub fn open(&self) {
        let (open, cvar) = &*self.0;
        *open.lock() = true;
        cvar.notify_all();
    }

    fn wait(&self) {
        let (open, cvar) = &*self.0;
        let mut guard = open.lock();
        while !*guard {
            cvar.wait(&mut guard);
        }
    }
}

/// In-memory source that counts its fetches.
pub struct FakeSource {
    font: IconFontSource,
    payload: Mutex<Result<Vec<u8>, NetworkError>>,
    fetches: AtomicUsize,
    gate: Option<Gate>,
}

impl FakeSource {
    pub fn new(id: &str, payload: &str) -> Arc<Self> {
        Self::build(id, Ok(payload.as_bytes().to_vec()), None)
    }

    pub fn failing(id: &str) -> Arc<Self> {
        Self::build(id, Err(NetworkError::Connection("connection refused".into())), None)
    }

    pub fn gated(id: &str, payload: &str, gate: &Gate) -> Arc<Self> {
        Self::build(id, Ok(payload.as_bytes().to_vec()), Some(gate.clone()))
    }

    fn build(id: &str, payload: Result<Vec<u8>, NetworkError>, gate: Option<Gate>) -> Arc<Self> {
        Arc::new(Self {
            font: font(id, "Outlined"),
            payload: Mutex::new(payload),
            fetches: AtomicUsize::new(0),
            gate,
        })
    }

    pub fn set_payload(&self, payload: &str) {
        *self.payload.lock() = Ok(payload.as_bytes().to_vec());
    }

    pub fn set_failure(&self, error: NetworkError) {
        *self.payload.lock() = Err(error);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl CodepointSource for FakeSource {
    fn font(&self) -> &IconFontSource {
        &self.font
    }

    fn fetch(&self) -> Result<Vec<u8>, NetworkError> {
        if let Some(gate) = &self.gate {
            gate.wait();
        }
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.payload.lock().clone()
    }
}

pub fn registry(sources: &[Arc<FakeSource>]) -> SourceRegistry {
    let mut registry = SourceRegistry::new();
    for source in sources {
        registry.register(source.clone());
    }
    registry
}

pub fn ids(ids: &[&str]) -> BTreeSet<SourceId> {
    ids.iter().map(|id| SourceId::new(*id)).collect()
}

pub fn names(entries: &[&glyphdeck::CodepointEntry]) -> Vec<String> {
    entries.iter().map(|e| e.name().to_string()).collect()
}
