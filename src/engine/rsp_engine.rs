use crate::config::EngineOptions;
use crate::engine::R2ROperator;
use crate::error::{Result, RspError};
use crate::parsed_query::{ParsedQuery, WindowDefinition};
use crate::rspql_parser::RSPQLParser;
use crate::windowing::{CSPARQLWindow, LateElementSweeper, StreamType};
use crate::QuadContainer;
use crossbeam_channel::{Receiver, Sender, unbounded};
use oxigraph::model::{GraphName, Literal, NamedNode, Quad};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};
use std::thread;
use tracing::{debug, info, warn};

/// Represents a binding result with timestamp information
#[derive(Debug, Clone)]
pub struct BindingWithTimestamp {
    pub bindings: String,
    pub timestamp_from: i64,
    pub timestamp_to: i64,
}

/// Represents an RDF stream that feeds data into its windows
#[derive(Clone)]
pub struct RDFStream {
    pub name: String,
    pub(crate) window_sender: Sender<QuadContainer>,
}

impl RDFStream {
    pub fn new(name: String, window_sender: Sender<QuadContainer>) -> Self {
        Self {
            name,
            window_sender,
        }
    }

    /// Add a quad container to the stream
    pub fn add(&self, container: QuadContainer) -> Result<()> {
        self.window_sender
            .send(container)
            .map_err(|e| RspError::ChannelClosed(format!("stream {}: {}", self.name, e)))
    }

    /// Add a set of quads with a timestamp to the stream
    pub fn add_quads(&self, quads: Vec<Quad>, timestamp: i64) -> Result<()> {
        let elements: HashSet<Quad> = quads.into_iter().collect();
        self.add(QuadContainer::new(elements, timestamp))
    }
}

type SharedWindow = Arc<Mutex<CSPARQLWindow>>;

/// The main RSP (RDF Stream Processing) Engine
pub struct RSPEngine {
    windows: HashMap<String, SharedWindow>,
    streams: HashMap<String, RDFStream>,
    sweepers: Vec<LateElementSweeper>,
    r2r: R2ROperator,
    parsed_query: ParsedQuery,
    options: EngineOptions,
    results: OnceLock<Receiver<BindingWithTimestamp>>,
}

impl RSPEngine {
    /// Create a new RSP Engine from an RSPQL query
    pub fn new(query: String) -> Result<Self> {
        Self::with_options(query, EngineOptions::default())
    }

    pub fn with_options(query: String, options: EngineOptions) -> Result<Self> {
        let parsed_query = RSPQLParser::new(query).parse()?;
        debug!(sparql = %parsed_query.sparql_query, "parsed SPARQL query");

        let r2r = R2ROperator::new(parsed_query.sparql_query.clone());

        Ok(Self {
            windows: HashMap::new(),
            streams: HashMap::new(),
            sweepers: Vec::new(),
            r2r,
            parsed_query,
            options,
            results: OnceLock::new(),
        })
    }

    /// Initialize the engine by creating windows, streams and their workers
    pub fn initialize(&mut self) -> Result<()> {
        if !self.windows.is_empty() {
            return Ok(());
        }

        let mut windows_by_stream: HashMap<String, Vec<SharedWindow>> = HashMap::new();
        for window_def in &self.parsed_query.s2r {
            let window = Arc::new(Mutex::new(CSPARQLWindow::from_config(
                self.options.window_config(window_def),
            )?));

            self.sweepers
                .push(LateElementSweeper::for_window(window.clone()));
            self.windows
                .insert(window_def.window_name.clone(), window.clone());
            windows_by_stream
                .entry(window_def.stream_name.clone())
                .or_default()
                .push(window);
        }

        for (stream_name, windows) in windows_by_stream {
            let (tx, rx) = unbounded::<QuadContainer>();
            self.streams
                .insert(stream_name.clone(), RDFStream::new(stream_name.clone(), tx));
            spawn_ingestion(stream_name, windows, rx);
        }

        info!(
            windows = self.windows.len(),
            streams = self.streams.len(),
            "RSP engine initialized"
        );
        Ok(())
    }

    /// Subscribe to every window's RStream and evaluate the R2R operator on
    /// each emitted window in a dedicated worker.
    /// Returns a receiver for binding results
    pub fn register(
        windows: HashMap<String, SharedWindow>,
        r2r: R2ROperator,
        window_defs: Vec<WindowDefinition>,
    ) -> Receiver<BindingWithTimestamp> {
        let (result_tx, result_rx) = unbounded();
        let (emitted_tx, emitted_rx) = unbounded::<(String, QuadContainer)>();

        for (window_name, window) in &windows {
            let emitted_tx = emitted_tx.clone();
            let window_name = window_name.clone();
            window
                .lock()
                .subscribe(StreamType::RStream, move |container| {
                    if emitted_tx.send((window_name.clone(), container)).is_err() {
                        debug!(window = %window_name, "query worker is gone, dropping window content");
                    }
                });
        }
        drop(emitted_tx);

        thread::spawn(move || {
            while let Ok((window_name, container)) = emitted_rx.recv() {
                let width = window_defs
                    .iter()
                    .find(|w| w.window_name == window_name)
                    .map(|w| w.width)
                    .unwrap_or_default();
                let results =
                    evaluate_window(&windows, &r2r, &window_name, container, width);
                for result in results {
                    if result_tx.send(result).is_err() {
                        debug!("result receiver dropped, stopping query worker");
                        return;
                    }
                }
            }
        });

        result_rx
    }

    /// Register the engine's own windows and query. Later calls return a
    /// handle to the same result channel, so every binding is produced once.
    pub fn start_processing(&self) -> Receiver<BindingWithTimestamp> {
        self.results
            .get_or_init(|| {
                Self::register(
                    self.windows.clone(),
                    self.r2r.clone(),
                    self.parsed_query.s2r.clone(),
                )
            })
            .clone()
    }

    /// Get a stream by name (returns a clone for easier usage)
    pub fn get_stream(&self, stream_name: &str) -> Option<RDFStream> {
        self.streams.get(stream_name).cloned()
    }

    /// Add static data to the R2R operator
    pub fn add_static_data(&mut self, quad: Quad) {
        self.r2r.add_static_data(quad);
    }

    /// Get all stream names
    pub fn get_all_streams(&self) -> Vec<String> {
        self.streams.keys().cloned().collect()
    }

    /// Add a sentinel event to trigger closure of all open windows
    /// This should be called when the stream ends to emit final results
    pub fn close_stream(&self, stream_uri: &str, final_timestamp: i64) -> Result<()> {
        let stream = self
            .get_stream(stream_uri)
            .ok_or_else(|| RspError::StreamNotFound(stream_uri.to_string()))?;

        let sentinel = Quad::new(
            NamedNode::new("urn:rsp:sentinel").map_err(RspError::query)?,
            NamedNode::new("urn:rsp:type").map_err(RspError::query)?,
            Literal::new_simple_literal("end"),
            GraphName::DefaultGraph,
        );
        stream.add_quads(vec![sentinel], final_timestamp)
    }

    /// Get the parsed query
    pub fn parsed_query(&self) -> &ParsedQuery {
        &self.parsed_query
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Get a window by name
    pub fn get_window(&self, window_name: &str) -> Option<SharedWindow> {
        self.windows.get(window_name).cloned()
    }

    /// Stop every sweeper and window. Nothing is emitted afterwards.
    pub fn stop(&mut self) {
        for sweeper in &mut self.sweepers {
            sweeper.stop();
        }
        self.sweepers.clear();
        for window in self.windows.values() {
            window.lock().stop();
        }
    }
}

impl Drop for RSPEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Feed every container received on a stream into all windows declared over it.
/// Quads are moved into the named graph of their window so that the `GRAPH`
/// clauses rewritten from `WINDOW` match.
fn spawn_ingestion(stream_name: String, windows: Vec<SharedWindow>, rx: Receiver<QuadContainer>) {
    thread::spawn(move || {
        while let Ok(container) = rx.recv() {
            let timestamp = container.last_time_changed();
            for window in &windows {
                let mut win = window.lock();
                let graph = window_graph(&win.name);
                for quad in &container.elements {
                    let mut quad = quad.clone();
                    if let Some(graph) = &graph {
                        quad.graph_name = graph.clone();
                    }
                    win.add(quad, timestamp);
                }
            }
        }
        debug!(stream = %stream_name, "stream closed, ingestion worker exiting");
    });
}

fn window_graph(window_name: &str) -> Option<GraphName> {
    match NamedNode::new(window_name) {
        Ok(node) => Some(GraphName::NamedNode(node)),
        Err(e) => {
            warn!(window = %window_name, error = %e, "window name is not an IRI, keeping quad graphs");
            None
        }
    }
}

/// Merge the content of the sibling windows into an emitted container and run
/// the R2R operator over it.
fn evaluate_window(
    windows: &HashMap<String, SharedWindow>,
    r2r: &R2ROperator,
    window_name: &str,
    mut container: QuadContainer,
    width: i64,
) -> Vec<BindingWithTimestamp> {
    let timestamp = container.last_time_changed();

    for (other_name, other_window) in windows {
        if other_name == window_name {
            continue;
        }
        let other = other_window.lock();
        if let Some(other_container) = other.get_content(timestamp) {
            container.merge(other_container, timestamp);
        }
    }

    debug!(
        window = %window_name,
        timestamp,
        quads = container.len(),
        "starting window query processing"
    );

    match r2r.execute_select(&container) {
        Ok(bindings) => bindings
            .into_iter()
            .map(|bindings| BindingWithTimestamp {
                bindings,
                timestamp_from: timestamp,
                timestamp_to: timestamp + width,
            })
            .collect(),
        Err(e) => {
            warn!(window = %window_name, error = %e, "R2R evaluation failed");
            Vec::new()
        }
    }
}
