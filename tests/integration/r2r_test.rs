use super::temperature_quad;
use oxigraph::model::*;
use oxigraph::sparql::QueryResults;
use rsp_windowing::{QuadContainer, R2ROperator, RspError};
use std::collections::HashSet;

fn solution_count(r2r: &R2ROperator, container: &QuadContainer) -> usize {
    match r2r.execute(container).unwrap() {
        QueryResults::Solutions(solutions) => solutions.count(),
        _ => panic!("Expected Solutions result"),
    }
}

#[test]
fn test_r2r_basic_query() {
    let r2r = R2ROperator::new("SELECT ?s ?p ?o WHERE { ?s ?p ?o . }".to_string());

    let mut container = QuadContainer::new(HashSet::new(), 1000);
    container.add(
        Quad::new(
            NamedNode::new("http://example.org/subject1").unwrap(),
            NamedNode::new("http://example.org/predicate1").unwrap(),
            Literal::new_simple_literal("object1"),
            GraphName::DefaultGraph,
        ),
        1000,
    );

    assert_eq!(solution_count(&r2r, &container), 1);
}

#[test]
fn test_r2r_with_named_graph() {
    let query = r#"
        PREFIX ex: <http://example.org/>
        SELECT ?sensor ?temperature
        WHERE {
            GRAPH ex:tempWindow {
                ?sensor ex:temperature ?temperature .
            }
        }
    "#;
    let r2r = R2ROperator::new(query.to_string());

    let mut container = QuadContainer::empty();
    container.add(temperature_quad("sensor1", 25), 1000);
    assert_eq!(solution_count(&r2r, &container), 1);

    let mut other_graph = QuadContainer::empty();
    let mut quad = temperature_quad("sensor1", 25);
    quad.graph_name = GraphName::NamedNode(NamedNode::new("http://example.org/other").unwrap());
    other_graph.add(quad, 1000);
    assert_eq!(solution_count(&r2r, &other_graph), 0);
}

#[test]
fn test_r2r_joins_static_data() {
    let query = r#"
        PREFIX ex: <http://example.org/>
        SELECT ?sensor ?location ?temperature
        WHERE {
            ?sensor ex:location ?location .
            GRAPH ex:tempWindow { ?sensor ex:temperature ?temperature . }
        }
    "#;
    let mut r2r = R2ROperator::new(query.to_string());
    r2r.add_static_data(Quad::new(
        NamedNode::new("http://example.org/sensor1").unwrap(),
        NamedNode::new("http://example.org/location").unwrap(),
        Literal::new_simple_literal("Room A"),
        GraphName::DefaultGraph,
    ));

    // Static data alone does not satisfy the window pattern
    assert_eq!(solution_count(&r2r, &QuadContainer::empty()), 0);

    let mut container = QuadContainer::empty();
    container.add(temperature_quad("sensor1", 21), 1000);
    container.add(temperature_quad("sensor2", 22), 1000);
    let rows = r2r.execute_select(&container).unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].contains("Room A"));
}

#[test]
fn test_r2r_rejects_invalid_query() {
    let r2r = R2ROperator::new("SELECT ?s WHERE { ?s".to_string());
    assert!(matches!(
        r2r.execute_select(&QuadContainer::empty()),
        Err(RspError::Query(_))
    ));
}
