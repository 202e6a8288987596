use std::collections::BTreeMap;

use serde::Serialize;

use crate::constraints::{ConstraintEvaluator, ConstraintProvider};
use crate::domain::belief::BeliefCatalog;
use crate::domain::phase::Phase;
use crate::errors::DomainError;
use crate::graph::{EdgeId, GraphNode, NodeId, SearchGraph};

pub const UNDEFINED_UTTERANCE: &str = "undefined";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BeliefEntry {
    pub id: String,
    pub full_name: String,
    pub value: f32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DesireEntry {
    pub id: String,
    pub full_name: String,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IntentExample {
    pub intent: String,
    pub example: String,
}

/// One step of a planned conversation: the state before a move and the move itself.
///
/// The last node of a path carries no intent.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MessageNode {
    pub beliefs: Vec<BeliefEntry>,
    pub desires: Vec<DesireEntry>,
    pub phase: Phase,
    pub intent: Option<IntentExample>,
}

/// Example utterances keyed by intent label.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UtteranceTable {
    examples: BTreeMap<String, String>,
}

impl UtteranceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, label: impl Into<String>, example: impl Into<String>) -> Self {
        self.examples.insert(label.into(), example.into());
        self
    }

    pub fn example(&self, label: &str) -> &str {
        self.examples.get(label).map_or(UNDEFINED_UTTERANCE, String::as_str)
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}

impl<L, E> FromIterator<(L, E)> for UtteranceTable
where
    L: Into<String>,
    E: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (L, E)>>(iter: I) -> Self {
        Self {
            examples: iter.into_iter().map(|(label, example)| (label.into(), example.into())).collect(),
        }
    }
}

pub struct ResponseFormatter<'a> {
    provider: &'a ConstraintProvider,
    catalog: &'a BeliefCatalog,
    utterances: &'a UtteranceTable,
}

impl<'a> ResponseFormatter<'a> {
    pub fn new(
        provider: &'a ConstraintProvider,
        catalog: &'a BeliefCatalog,
        utterances: &'a UtteranceTable,
    ) -> Self {
        Self { provider, catalog, utterances }
    }

    /// One message node per edge (its source state plus the uttered intent),
    /// followed by the state the last edge leads to.
    pub fn optimal_path_to_path_request<E: ConstraintEvaluator>(
        &self,
        graph: &SearchGraph,
        path: &[EdgeId],
        evaluator: &E,
    ) -> Result<Vec<MessageNode>, DomainError> {
        let mut nodes = Vec::with_capacity(path.len() + 1);
        for (position, edge_id) in path.iter().enumerate() {
            let edge = graph.edge(*edge_id).ok_or_else(|| {
                DomainError::InvariantViolation(format!("path refers to unknown edge {}", edge_id.index()))
            })?;
            let label = edge.intent().label();
            let intent = IntentExample {
                intent: label.to_string(),
                example: self.utterances.example(label).to_string(),
            };
            nodes.push(self.message_node(self.node_at(graph, edge.from())?, Some(intent), evaluator)?);

            if position + 1 == path.len() {
                nodes.push(self.message_node(self.node_at(graph, edge.to())?, None, evaluator)?);
            }
        }
        Ok(nodes)
    }

    fn node_at<'g>(&self, graph: &'g SearchGraph, id: NodeId) -> Result<&'g GraphNode, DomainError> {
        graph.node(id).ok_or_else(|| {
            DomainError::InvariantViolation(format!("path refers to unknown node {}", id.index()))
        })
    }

    fn message_node<E: ConstraintEvaluator>(
        &self,
        node: &GraphNode,
        intent: Option<IntentExample>,
        evaluator: &E,
    ) -> Result<MessageNode, DomainError> {
        self.catalog.ensure_len("message node beliefs", node.beliefs())?;
        let beliefs = self
            .catalog
            .entries()
            .iter()
            .zip(node.beliefs().values())
            .map(|(descriptor, value)| BeliefEntry {
                id: descriptor.id.to_string(),
                full_name: descriptor.full_name.clone(),
                value: *value,
            })
            .collect();
        let desires = self
            .provider
            .desires()
            .iter()
            .map(|desire| DesireEntry {
                id: desire.id.to_string(),
                full_name: desire.full_name.clone(),
                active: evaluator.check_desire_active(&desire.id, node.beliefs()),
            })
            .collect();

        Ok(MessageNode { beliefs, desires, phase: node.phase(), intent })
    }
}
