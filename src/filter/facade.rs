use super::gridify::{compile_query, QueryEnvelope, QueryOptions};
use super::node::FilterNode;
use super::predicate::compile_predicate;
use crate::query::RecordEvaluator;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Runs a compiled predicate expression over a dataset.
pub trait Evaluator<R> {
    type Error: std::error::Error;

    fn evaluate(&self, expression: &str, dataset: &[R]) -> Result<Vec<R>, Self::Error>;
}

/// Owns a filter tree, compiles it once into a predicate for local filtering
/// and on demand into a Gridify envelope for remote filtering.
#[derive(Debug)]
pub struct Filter<E = RecordEvaluator> {
    nodes: Vec<FilterNode>,
    evaluator: E,
    options: QueryOptions,
    predicate: OnceLock<String>,
}

impl Filter<RecordEvaluator> {
    pub fn from_nodes(nodes: Vec<FilterNode>) -> Self {
        Self::new(nodes, RecordEvaluator)
    }
}

impl<E> Filter<E> {
    pub fn new(nodes: Vec<FilterNode>, evaluator: E) -> Self {
        Self {
            nodes,
            evaluator,
            options: QueryOptions::default(),
            predicate: OnceLock::new(),
        }
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn nodes(&self) -> &[FilterNode] {
        &self.nodes
    }

    /// Top-level nodes only; nested group members are not counted.
    pub fn filter_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn predicate(&self) -> &str {
        self.predicate.get_or_init(|| {
            let expr = compile_predicate(&self.nodes);
            debug!(predicate = %expr, "compiled filter predicate");
            expr
        })
    }

    pub fn to_remote_query(&self) -> QueryEnvelope {
        compile_query(&self.nodes).with_options(&self.options)
    }

    /// Matching records, or none at all if the evaluator rejects the predicate.
    pub fn filter<R>(&self, dataset: &[R]) -> Vec<R>
    where
        E: Evaluator<R>,
    {
        match self.try_filter(dataset) {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, predicate = self.predicate(), "filter failed, returning no records");
                Vec::new()
            }
        }
    }

    pub fn try_filter<R>(&self, dataset: &[R]) -> Result<Vec<R>, E::Error>
    where
        E: Evaluator<R>,
    {
        self.evaluator.evaluate(self.predicate(), dataset)
    }
}
