use std::hash::{Hash, Hasher};

use crate::domain::belief::BeliefVector;
use crate::domain::phase::Phase;
use crate::graph::intent::Intent;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub(crate) usize);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Search identity of a node: beliefs (bitwise), phase and subject.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeKey {
    beliefs: Vec<u32>,
    phase: Phase,
    subject: Option<String>,
}

/// Simulated belief state. Owns its outgoing edges; `edge_to` is only a
/// back-reference used to rebuild paths.
#[derive(Clone, Debug)]
pub struct GraphNode {
    beliefs: BeliefVector,
    phase: Phase,
    subject: Option<String>,
    pub(crate) edges_from: Vec<EdgeId>,
    pub(crate) edge_to: Option<EdgeId>,
}

impl GraphNode {
    pub fn new(beliefs: BeliefVector, phase: Phase, subject: Option<String>) -> Self {
        Self { beliefs, phase, subject, edges_from: Vec::new(), edge_to: None }
    }

    pub fn beliefs(&self) -> &BeliefVector {
        &self.beliefs
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn has_subject(&self, subject: &str) -> bool {
        self.subject.as_deref() == Some(subject)
    }

    pub fn edges_from(&self) -> &[EdgeId] {
        &self.edges_from
    }

    pub fn edge_to(&self) -> Option<EdgeId> {
        self.edge_to
    }

    pub fn is_root(&self) -> bool {
        self.edge_to.is_none()
    }

    pub fn key(&self) -> NodeKey {
        NodeKey {
            beliefs: self.beliefs.fingerprint(),
            phase: self.phase,
            subject: self.subject.clone(),
        }
    }
}

impl PartialEq for GraphNode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for GraphNode {}

impl Hash for GraphNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// A move between two nodes. Two edges are equal when their intents are.
#[derive(Clone, Debug)]
pub struct GraphEdge {
    intent: Intent,
    from: NodeId,
    to: NodeId,
}

impl GraphEdge {
    pub(crate) fn new(intent: Intent, from: NodeId, to: NodeId) -> Self {
        Self { intent, from, to }
    }

    pub fn intent(&self) -> &Intent {
        &self.intent
    }

    pub fn from(&self) -> NodeId {
        self.from
    }

    pub fn to(&self) -> NodeId {
        self.to
    }
}

impl PartialEq for GraphEdge {
    fn eq(&self, other: &Self) -> bool {
        self.intent == other.intent
    }
}

impl Eq for GraphEdge {}
