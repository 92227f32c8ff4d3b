use crate::windowing::StreamType;
use serde::{Deserialize, Serialize};

/// A window declared with `FROM NAMED WINDOW ... ON STREAM ... [RANGE w STEP s]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowDefinition {
    pub window_name: String,
    pub stream_name: String,
    pub width: i64,
    pub slide: i64,
}

/// Relation-to-stream operator from the `REGISTER` clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct R2S {
    pub operator: StreamType,
    pub name: String,
}

impl Default for R2S {
    fn default() -> Self {
        Self {
            operator: StreamType::RStream,
            name: "undefined".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedQuery {
    pub sparql_query: String,
    pub r2s: R2S,
    pub s2r: Vec<WindowDefinition>,
}

impl Default for ParsedQuery {
    fn default() -> Self {
        Self {
            sparql_query: "SELECT * WHERE { ?s ?p ?o }".to_string(),
            r2s: R2S::default(),
            s2r: Vec::new(),
        }
    }
}

impl ParsedQuery {
    pub fn set_sparql(&mut self, sparql: String) {
        self.sparql_query = sparql;
    }

    pub fn set_r2s(&mut self, r2s: R2S) {
        self.r2s = r2s;
    }

    pub fn add_s2r(&mut self, s2r: WindowDefinition) {
        self.s2r.push(s2r);
    }

    pub fn window(&self, window_name: &str) -> Option<&WindowDefinition> {
        self.s2r.iter().find(|w| w.window_name == window_name)
    }
}
