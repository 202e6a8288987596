pub mod comparer;
pub mod config;
pub mod constraints;
pub mod domain;
pub mod errors;
pub mod graph;
pub mod planner;
pub mod scenario;

pub use comparer::{FloatComparer, DEFAULT_EPSILON};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use constraints::{
    BeliefConstraint, BoundaryCheck, ConstraintEvaluator, ConstraintProvider, ConstraintSet,
    ToleranceEvaluator,
};
pub use domain::agent::{apply_phase_state, Agent, AgentBelief, AgentId, AgentStore};
pub use domain::phase::Phase;
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use graph::{GraphEdge, GraphNode, Intent, SearchGraph};
pub use planner::{
    MessageNode, NodeGenerator, OptimalPath, OptimalPathService, PathPlanner, PathStatus,
    ResponseFormatter, SearchLimits,
};
pub use scenario::{BeliefThresholds, IntentNodeGenerator, LiloBelief, Scenario};
