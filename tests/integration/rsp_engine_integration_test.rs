use super::temperature_quad;
use oxigraph::model::*;
use rsp_windowing::RSPEngine;
use std::time::{Duration, Instant};

const QUERY: &str = r#"
    REGISTER RStream <http://example.org/output> AS
    PREFIX ex: <http://example.org/>
    PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>
    SELECT ?sensor ?temperature
    FROM NAMED WINDOW ex:tempWindow ON STREAM ex:temperatureStream [RANGE 5000 STEP 1000]
    WHERE {
        WINDOW ex:tempWindow {
            ?sensor ex:temperature ?temperature .
        }
    }
"#;

#[test]
fn test_rsp_engine_basic() {
    let mut engine = RSPEngine::new(QUERY.to_string()).unwrap();
    engine
        .initialize()
        .expect("Engine initialization should succeed");

    engine.add_static_data(Quad::new(
        NamedNode::new("http://example.org/sensor1").unwrap(),
        NamedNode::new("http://www.w3.org/1999/02/22-rdf-syntax-ns#type").unwrap(),
        NamedNode::new("http://example.org/TemperatureSensor").unwrap(),
        GraphName::DefaultGraph,
    ));

    let result_receiver = engine.start_processing();
    let stream = engine
        .get_stream("http://example.org/temperatureStream")
        .unwrap();

    for i in 1..=5 {
        stream
            .add_quads(vec![temperature_quad("sensor1", 20 + i)], i * 1000)
            .expect("Adding quads should succeed");
    }

    // Windows closing at 2000..5000 hold 1, 2, 3 and 4 readings.
    let mut results = Vec::new();
    let start = Instant::now();
    while results.len() < 10 && start.elapsed() < Duration::from_secs(5) {
        if let Ok(result) = result_receiver.recv_timeout(Duration::from_millis(100)) {
            results.push(result);
        }
    }

    assert_eq!(results.len(), 10, "RSP engine should produce every binding");
    for result in &results {
        assert_eq!(result.timestamp_to - result.timestamp_from, 5000);
        assert!(result.bindings.contains("sensor1"));
    }
    assert_eq!(results[0].timestamp_from, 1000);
}

#[test]
fn test_results_stop_after_engine_stop() {
    let mut engine = RSPEngine::new(QUERY.to_string()).unwrap();
    engine.initialize().unwrap();
    let result_receiver = engine.start_processing();
    let stream = engine
        .get_stream("http://example.org/temperatureStream")
        .unwrap();

    engine.stop();
    for i in 1..=5 {
        stream
            .add_quads(vec![temperature_quad("sensor1", 20 + i)], i * 1000)
            .unwrap();
    }

    assert!(
        result_receiver
            .recv_timeout(Duration::from_millis(300))
            .is_err()
    );
}

#[test]
fn test_start_processing_twice_yields_each_binding_once() {
    let mut engine = RSPEngine::new(QUERY.to_string()).unwrap();
    engine.initialize().unwrap();
    let first = engine.start_processing();
    let second = engine.start_processing();
    let stream = engine
        .get_stream("http://example.org/temperatureStream")
        .unwrap();

    for i in 1..=5 {
        stream
            .add_quads(vec![temperature_quad("sensor1", 20 + i)], i * 1000)
            .unwrap();
    }

    let mut count = 0;
    while let Ok(_result) = first.recv_timeout(Duration::from_millis(500)) {
        count += 1;
    }
    assert_eq!(count, 10);
    assert!(second.try_recv().is_err());
}
