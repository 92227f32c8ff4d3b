//! Windows feeding the R2R operator directly, and the engine end to end.

mod aggregation_test;
mod r2r_test;
mod rsp_engine_integration_test;

use oxigraph::model::*;
use oxigraph::sparql::QueryResults;
use rsp_windowing::{CSPARQLWindow, R2ROperator, ReportStrategy, StreamType, Tick};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const WINDOW_GRAPH: &str = "http://example.org/tempWindow";

/// One emitted window: its solutions, each as variable name to lexical value.
pub type Emission = Vec<HashMap<String, String>>;

pub fn temperature_quad(sensor: &str, value: i64) -> Quad {
    Quad::new(
        NamedNode::new(format!("http://example.org/{}", sensor)).unwrap(),
        NamedNode::new("http://example.org/temperature").unwrap(),
        Literal::new_typed_literal(
            value.to_string(),
            NamedNode::new("http://www.w3.org/2001/XMLSchema#integer").unwrap(),
        ),
        GraphName::NamedNode(NamedNode::new(WINDOW_GRAPH).unwrap()),
    )
}

/// Run `query` over every window a 5s/1s window emits while `events` are
/// added in order.
pub fn run_windowed_query(query: &str, events: &[(Quad, i64)]) -> Vec<Emission> {
    let mut window = CSPARQLWindow::new(
        WINDOW_GRAPH.to_string(),
        5000,
        1000,
        ReportStrategy::OnWindowClose,
        Tick::TimeDriven,
        0,
        0,
    )
    .unwrap();

    let r2r = R2ROperator::new(query.to_string());
    let emissions = Arc::new(Mutex::new(Vec::new()));
    let sink = emissions.clone();

    window.subscribe(StreamType::RStream, move |container| {
        let mut rows = Vec::new();
        if let QueryResults::Solutions(solutions) = r2r.execute(&container).unwrap() {
            for solution in solutions {
                let solution = solution.unwrap();
                let row = solution
                    .iter()
                    .map(|(variable, term)| (variable.as_str().to_string(), lexical(term)))
                    .collect();
                rows.push(row);
            }
        }
        sink.lock().unwrap().push(rows);
    });

    for (quad, timestamp) in events {
        window.add(quad.clone(), *timestamp);
    }

    let emitted = emissions.lock().unwrap().clone();
    emitted
}

fn lexical(term: &Term) -> String {
    match term {
        Term::NamedNode(node) => node.as_str().to_string(),
        Term::Literal(literal) => literal.value().to_string(),
        other => other.to_string(),
    }
}
