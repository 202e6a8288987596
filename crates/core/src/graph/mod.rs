//! Arena-backed search graph.
//!
//! Nodes and edges live in flat vectors and refer to each other by index, so
//! the child-to-parent back-references never form ownership cycles.

pub mod intent;
pub mod node;

use std::collections::HashMap;

use crate::errors::DomainError;

pub use intent::Intent;
pub use node::{EdgeId, GraphEdge, GraphNode, NodeId, NodeKey};

#[derive(Clone, Debug)]
pub struct SearchGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    discovered: HashMap<NodeKey, NodeId>,
}

impl SearchGraph {
    pub fn new(root: GraphNode) -> Self {
        let mut discovered = HashMap::new();
        discovered.insert(root.key(), NodeId(0));
        Self { nodes: vec![root], edges: Vec::new(), discovered }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(id.0)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&GraphEdge> {
        self.edges.get(id.0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether a structurally equal node was already registered.
    pub fn is_discovered(&self, node: &GraphNode) -> bool {
        self.discovered.contains_key(&node.key())
    }

    /// Adds `node` below `from` through a new edge labelled `intent`.
    ///
    /// The node is not registered for deduplication; use [`Self::attach_unique`]
    /// for nodes that join the search frontier.
    pub fn attach(
        &mut self,
        from: NodeId,
        intent: Intent,
        mut node: GraphNode,
    ) -> Result<NodeId, DomainError> {
        if from.0 >= self.nodes.len() {
            return Err(DomainError::InvariantViolation(format!(
                "cannot attach below unknown node {}",
                from.0
            )));
        }

        let to = NodeId(self.nodes.len());
        let edge = EdgeId(self.edges.len());
        node.edge_to = Some(edge);
        node.edges_from.clear();
        self.edges.push(GraphEdge::new(intent, from, to));
        self.nodes.push(node);
        self.nodes[from.0].edges_from.push(edge);
        Ok(to)
    }

    /// Like [`Self::attach`], but skips nodes already discovered in this search.
    pub fn attach_unique(
        &mut self,
        from: NodeId,
        intent: Intent,
        node: GraphNode,
    ) -> Result<Option<NodeId>, DomainError> {
        let key = node.key();
        if self.discovered.contains_key(&key) {
            return Ok(None);
        }
        let id = self.attach(from, intent, node)?;
        self.discovered.insert(key, id);
        Ok(Some(id))
    }

    /// Edges leading from `ancestor` down to `target`, or `None` when `ancestor`
    /// is not on the back-reference chain of `target`.
    pub fn path_between(&self, ancestor: NodeId, target: NodeId) -> Option<Vec<EdgeId>> {
        let mut path = Vec::new();
        let mut current = target;
        while current != ancestor {
            let edge_id = self.node(current)?.edge_to()?;
            path.push(edge_id);
            current = self.edge(edge_id)?.from();
        }
        path.reverse();
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::{GraphNode, Intent, SearchGraph};
    use crate::domain::belief::BeliefVector;
    use crate::domain::phase::Phase;

    fn node(values: &[f32], phase: Phase, subject: Option<&str>) -> GraphNode {
        GraphNode::new(BeliefVector::new(values.to_vec()), phase, subject.map(str::to_string))
    }

    fn intent(label: &str) -> Intent {
        Intent::parse(label).expect("valid label")
    }

    #[test]
    fn nodes_compare_by_beliefs_phase_and_subject_only() {
        let mut graph = SearchGraph::new(node(&[0.1, 0.2], Phase::Phase1, None));
        let child = graph
            .attach(graph.root(), intent("request_chitchat_greeting"), node(&[0.2, 0.2], Phase::Phase1, Some("chitchat")))
            .expect("attach");

        let attached = graph.node(child).expect("child").clone();
        let detached = node(&[0.2, 0.2], Phase::Phase1, Some("chitchat"));
        assert_eq!(attached, detached);
        assert!(attached.edge_to().is_some());
        assert!(detached.edge_to().is_none());

        assert_ne!(detached, node(&[0.2, 0.2], Phase::Phase2, Some("chitchat")));
        assert_ne!(detached, node(&[0.2, 0.2], Phase::Phase1, Some("goal")));
        assert_ne!(detached, node(&[0.2, 0.3], Phase::Phase1, Some("chitchat")));
    }

    #[test]
    fn edges_compare_by_intent_label_only() {
        let mut graph = SearchGraph::new(node(&[0.0], Phase::Phase1, None));
        let first = graph
            .attach(graph.root(), intent("request_goal_what"), node(&[0.1], Phase::Phase1, None))
            .expect("attach");
        graph.attach(first, intent("request_goal_what"), node(&[0.2], Phase::Phase1, None)).expect("attach");

        let edges: Vec<_> = (0..graph.edge_count())
            .map(|index| graph.edge(super::EdgeId(index)).expect("edge").clone())
            .collect();
        assert_ne!(edges[0].from(), edges[1].from());
        assert_eq!(edges[0], edges[1]);
    }

    #[test]
    fn attach_unique_skips_discovered_nodes() {
        let mut graph = SearchGraph::new(node(&[0.0], Phase::Phase1, None));
        let root = graph.root();

        assert!(graph
            .attach_unique(root, intent("request_bullying_who"), node(&[0.0], Phase::Phase1, None))
            .expect("attach")
            .is_none());
        let added = graph
            .attach_unique(root, intent("request_bullying_who"), node(&[0.1], Phase::Phase1, Some("bullying")))
            .expect("attach");
        assert!(added.is_some());
        assert!(graph
            .attach_unique(root, intent("request_bullying_why"), node(&[0.1], Phase::Phase1, Some("bullying")))
            .expect("attach")
            .is_none());
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.node(root).expect("root").edges_from().len(), 1);
    }

    #[test]
    fn path_between_walks_back_references_to_the_ancestor() {
        let mut graph = SearchGraph::new(node(&[0.0], Phase::Phase1, None));
        let a = graph.attach(graph.root(), intent("request_goal_what"), node(&[0.1], Phase::Phase1, None)).expect("a");
        let b = graph.attach(a, intent("ack_unknown_compliment"), node(&[0.2], Phase::Phase2, None)).expect("b");

        let path = graph.path_between(graph.root(), b).expect("path");
        let labels: Vec<_> = path
            .iter()
            .map(|edge| graph.edge(*edge).expect("edge").intent().label().to_string())
            .collect();
        assert_eq!(labels, vec!["request_goal_what", "ack_unknown_compliment"]);
        assert_eq!(graph.path_between(graph.root(), graph.root()), Some(vec![]));
        assert_eq!(graph.path_between(a, b).map(|path| path.len()), Some(1));
        assert_eq!(graph.path_between(b, a), None);
    }

    #[test]
    fn attaching_below_an_unknown_node_is_rejected() {
        let mut graph = SearchGraph::new(node(&[0.0], Phase::Phase1, None));
        assert!(graph.attach(super::NodeId(7), intent("request_goal_what"), node(&[0.1], Phase::Phase1, None)).is_err());
    }
}
