use super::{run_windowed_query, temperature_quad};

fn number(value: &str) -> f64 {
    value.parse().unwrap()
}

/// Readings 21, 22, 23 at 1s, 2s, 3s, then one more at 6s to close the
/// window that holds all three.
fn three_readings() -> Vec<(oxigraph::model::Quad, i64)> {
    vec![
        (temperature_quad("sensor1", 21), 1000),
        (temperature_quad("sensor1", 22), 2000),
        (temperature_quad("sensor1", 23), 3000),
        (temperature_quad("sensor1", 99), 6000),
    ]
}

#[test]
fn test_count_aggregation() {
    let query = r#"
        PREFIX ex: <http://example.org/>
        SELECT (COUNT(?temperature) AS ?count)
        WHERE {
            GRAPH ex:tempWindow { ?sensor ex:temperature ?temperature . }
        }
    "#;

    let emissions = run_windowed_query(query, &three_readings());
    let counts: Vec<f64> = emissions.iter().map(|rows| number(&rows[0]["count"])).collect();
    assert_eq!(counts, vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_avg_aggregation() {
    let query = r#"
        PREFIX ex: <http://example.org/>
        SELECT (AVG(?temperature) AS ?avgTemp)
        WHERE {
            GRAPH ex:tempWindow { ?sensor ex:temperature ?temperature . }
        }
    "#;

    let emissions = run_windowed_query(query, &three_readings());
    let averages: Vec<f64> = emissions
        .iter()
        .map(|rows| number(&rows[0]["avgTemp"]))
        .collect();
    assert_eq!(averages, vec![21.0, 21.5, 22.0]);
}

#[test]
fn test_min_max_aggregation() {
    let query = r#"
        PREFIX ex: <http://example.org/>
        SELECT (MIN(?temperature) AS ?minTemp) (MAX(?temperature) AS ?maxTemp)
        WHERE {
            GRAPH ex:tempWindow { ?sensor ex:temperature ?temperature . }
        }
    "#;

    let emissions = run_windowed_query(query, &three_readings());
    let last = &emissions.last().unwrap()[0];
    assert_eq!(number(&last["minTemp"]), 21.0);
    assert_eq!(number(&last["maxTemp"]), 23.0);
}

#[test]
fn test_sum_aggregation() {
    let query = r#"
        PREFIX ex: <http://example.org/>
        SELECT (SUM(?temperature) AS ?totalTemp)
        WHERE {
            GRAPH ex:tempWindow { ?sensor ex:temperature ?temperature . }
        }
    "#;

    let emissions = run_windowed_query(query, &three_readings());
    let sums: Vec<f64> = emissions
        .iter()
        .map(|rows| number(&rows[0]["totalTemp"]))
        .collect();
    assert_eq!(sums, vec![21.0, 43.0, 66.0]);
}

#[test]
fn test_group_by_aggregation() {
    let query = r#"
        PREFIX ex: <http://example.org/>
        SELECT ?sensor (AVG(?temperature) AS ?avgTemp) (COUNT(?temperature) AS ?count)
        WHERE {
            GRAPH ex:tempWindow { ?sensor ex:temperature ?temperature . }
        }
        GROUP BY ?sensor
    "#;

    let events = vec![
        (temperature_quad("sensor1", 20), 1000),
        (temperature_quad("sensor2", 30), 1200),
        (temperature_quad("sensor1", 24), 1500),
        (temperature_quad("sensor2", 32), 1800),
        (temperature_quad("sensor1", 0), 2000),
    ];
    let emissions = run_windowed_query(query, &events);

    assert_eq!(emissions.len(), 1);
    let mut groups: Vec<(String, f64, f64)> = emissions[0]
        .iter()
        .map(|row| {
            (
                row["sensor"].clone(),
                number(&row["avgTemp"]),
                number(&row["count"]),
            )
        })
        .collect();
    groups.sort_by(|a, b| a.0.cmp(&b.0));

    assert_eq!(
        groups,
        vec![
            ("http://example.org/sensor1".to_string(), 22.0, 2.0),
            ("http://example.org/sensor2".to_string(), 31.0, 2.0),
        ]
    );
}
