use crate::error::{Result, RspError};
use crate::quad_container::QuadContainer;
use oxigraph::model::Quad;
use oxigraph::sparql::{QueryResults, SparqlEvaluator};
use oxigraph::store::Store;
use std::collections::HashSet;
use tracing::trace;

/// R2R (Relation-to-Relation) Operator
/// Executes SPARQL queries over streaming data combined with static data
#[derive(Clone)]
pub struct R2ROperator {
    pub(crate) query: String,
    pub(crate) static_data: HashSet<Quad>,
}

impl R2ROperator {
    /// Create a new R2ROperator with a SPARQL query
    pub fn new(query: String) -> Self {
        Self {
            query,
            static_data: HashSet::new(),
        }
    }

    /// Add a static quad to the operator's static data store
    pub fn add_static_data(&mut self, quad: Quad) {
        self.static_data.insert(quad);
    }

    /// Execute the SPARQL query over the container's quads combined with static data
    pub fn execute(&self, container: &QuadContainer) -> Result<QueryResults<'_>> {
        let store = Store::new().map_err(RspError::query)?;

        for quad in container.elements.iter().chain(&self.static_data) {
            store.insert(quad).map_err(RspError::query)?;
        }

        trace!(
            window_quads = container.len(),
            static_quads = self.static_data.len(),
            "executing R2R query"
        );

        SparqlEvaluator::new()
            .parse_query(&self.query)
            .map_err(RspError::query)?
            .on_store(&store)
            .execute()
            .map_err(RspError::query)
    }

    /// Execute the SPARQL query and return results as a vector of solution mappings
    pub fn execute_select(&self, container: &QuadContainer) -> Result<Vec<String>> {
        let mut output = Vec::new();

        if let QueryResults::Solutions(solutions) = self.execute(container)? {
            for solution in solutions {
                let solution = solution.map_err(RspError::query)?;
                output.push(format!("{:?}", solution));
            }
        }

        Ok(output)
    }

    /// Get a reference to the query string
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Get the number of static quads
    pub fn static_data_size(&self) -> usize {
        self.static_data.len()
    }
}
