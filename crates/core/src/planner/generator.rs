use crate::constraints::{BeliefConstraint, PhaseTransitionConstraints};
use crate::graph::{GraphNode, Intent, NodeId, SearchGraph};

/// A candidate child produced by a [`NodeGenerator`], not yet part of the graph.
///
/// When `intermediate` is set, the move is a two-step chain: the intermediate
/// node sits between the parent and `node`, and is never expanded on its own.
#[derive(Clone, Debug)]
pub struct SimulatedMove {
    pub intermediate: Option<(Intent, GraphNode)>,
    pub intent: Intent,
    pub node: GraphNode,
}

impl SimulatedMove {
    pub fn direct(intent: Intent, node: GraphNode) -> Self {
        Self { intermediate: None, intent, node }
    }

    pub fn chained(first: (Intent, GraphNode), intent: Intent, node: GraphNode) -> Self {
        Self { intermediate: Some(first), intent, node }
    }

    /// Nodes this move adds to the graph when it is attached.
    pub fn node_count(&self) -> usize {
        1 + usize::from(self.intermediate.is_some())
    }
}

/// Produces the moves that push one belief of `from` toward `goal`.
pub trait NodeGenerator {
    fn update_belief(
        &self,
        graph: &SearchGraph,
        from: NodeId,
        goal: &BeliefConstraint,
        transition: &PhaseTransitionConstraints,
    ) -> Vec<SimulatedMove>;
}

impl<G: NodeGenerator + ?Sized> NodeGenerator for &G {
    fn update_belief(
        &self,
        graph: &SearchGraph,
        from: NodeId,
        goal: &BeliefConstraint,
        transition: &PhaseTransitionConstraints,
    ) -> Vec<SimulatedMove> {
        (**self).update_belief(graph, from, goal, transition)
    }
}
