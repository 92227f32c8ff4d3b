//! Sliding-window engine for RDF Stream Processing.
//!
//! [`CSPARQLWindow`] partitions a stream of timestamped quads into overlapping
//! windows, advances a watermark, buffers late quads for re-admission and emits
//! finished windows to `RStream` subscribers. [`RSPEngine`] wires windows
//! declared in an RSP-QL query to named streams and evaluates the query over
//! each emitted window.

pub mod config;
pub mod engine;
pub mod error;
mod parsed_query;
mod quad_container;
mod rspql_parser;
mod window_instance;
pub mod windowing;

pub use config::{EngineOptions, WindowConfig};
pub use engine::{BindingWithTimestamp, R2ROperator, RDFStream, RSPEngine};
pub use error::{Result, RspError};
pub use parsed_query::{ParsedQuery, R2S, WindowDefinition};
pub use quad_container::QuadContainer;
pub use rspql_parser::RSPQLParser;
pub use window_instance::WindowInstance;
pub use windowing::{
    CSPARQLWindow, LateElementSweeper, ReportStrategy, StreamType, Tick, WindowCallback,
};
