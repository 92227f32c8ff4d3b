use oxigraph::model::{GraphName, Literal, NamedNode, Quad};
use rsp_windowing::{EngineOptions, RSPEngine, Result, RspError};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const QUERY: &str = r#"
    PREFIX ex: <https://rsp.rs/>
    REGISTER RStream <output> AS
    SELECT ?sensor ?value
    FROM NAMED WINDOW ex:w1 ON STREAM ex:stream1 [RANGE 10000 STEP 2000]
    WHERE {
        WINDOW ex:w1 { ?sensor ex:value ?value }
    }
"#;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = EngineOptions::default()
        .with_max_delay(1000)
        .with_late_sweep_interval(Duration::from_millis(100));
    let mut engine = RSPEngine::with_options(QUERY.to_string(), options)?;
    engine.initialize()?;

    let results = engine.start_processing();
    let stream = engine
        .get_stream("https://rsp.rs/stream1")
        .ok_or_else(|| RspError::StreamNotFound("https://rsp.rs/stream1".into()))?;

    // Event time drives the windows. The reading at 3500 arrives after the one
    // at 4000 and goes through the late buffer.
    for (i, timestamp) in [0_i64, 1000, 2000, 4000, 3500, 5000, 6000].into_iter().enumerate() {
        let quad = Quad::new(
            NamedNode::new(format!("https://rsp.rs/sensor{}", i)).map_err(RspError::query)?,
            NamedNode::new("https://rsp.rs/value").map_err(RspError::query)?,
            Literal::new_simple_literal(format!("{}", 20 + i)),
            GraphName::DefaultGraph,
        );
        stream.add_quads(vec![quad], timestamp)?;
    }
    std::thread::sleep(Duration::from_millis(300));
    engine.close_stream("https://rsp.rs/stream1", 30_000)?;

    while let Ok(result) = results.recv_timeout(Duration::from_millis(500)) {
        println!(
            "[{}, {}) {}",
            result.timestamp_from, result.timestamp_to, result.bindings
        );
    }

    engine.stop();
    Ok(())
}
