use oxigraph::model::Quad;
use std::collections::HashSet;

// Representing a container for RDF Quads in the Window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuadContainer {
    pub elements: HashSet<Quad>,
    pub last_timestamp_changed: i64,
}

impl QuadContainer {
    pub fn new(elements: HashSet<Quad>, ts: i64) -> Self {
        Self {
            elements,
            last_timestamp_changed: ts,
        }
    }

    /// A container nothing was added to yet. Its change time sorts before any
    /// event, so the first `add` sets it.
    pub fn empty() -> Self {
        Self::new(HashSet::new(), i64::MIN)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Insert a quad; the change timestamp only ever moves forward.
    pub fn add(&mut self, quad: Quad, ts: i64) {
        self.elements.insert(quad);
        self.last_timestamp_changed = self.last_timestamp_changed.max(ts);
    }

    /// Fold every quad of `other` into this container at time `ts`.
    pub fn merge(&mut self, other: &QuadContainer, ts: i64) {
        for quad in &other.elements {
            self.add(quad.clone(), ts);
        }
    }

    pub fn contains(&self, quad: &Quad) -> bool {
        self.elements.contains(quad)
    }

    pub fn last_time_changed(&self) -> i64 {
        self.last_timestamp_changed
    }
}

impl Default for QuadContainer {
    fn default() -> Self {
        Self::empty()
    }
}
