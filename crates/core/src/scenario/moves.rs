//! Candidate helpline moves for pushing one belief toward a goal.

use tracing::debug;

use crate::comparer::FloatComparer;
use crate::constraints::{
    BeliefConstraint, BoundaryCheck, ConstraintEvaluator, PhaseTransitionConstraints,
    ToleranceEvaluator,
};
use crate::domain::phase::Phase;
use crate::graph::{GraphNode, Intent, NodeId, SearchGraph};
use crate::planner::{NodeGenerator, SimulatedMove};

use super::effects::{SUBJECT_BULLYING, SUBJECT_CONFIDANT, SUBJECT_GOAL};
use super::BeliefThresholds;
use super::LiloBelief::{self, *};

/// Moves that switch the conversation to the bullying itself.
pub const BULLYING_INTENTS: &[&str] = &[
    "request_bullying_who",
    "request_bullying_details",
    "request_bullying_count",
    "request_bullying_location",
    "request_bullying_duration",
    "request_bullying_frequency",
    "request_bullying_why",
    "request_bullying_response",
    "request_bullying_confidant",
    "request_bullying_parent",
    "confirm_bullying_summary",
];

/// Moves that switch the conversation to the child's goal.
pub const GOAL_INTENTS: &[&str] = &[
    "inform_goal_negative",
    "inform_goal_help",
    "request_goal_what",
    "request_goal_dream",
    "request_goal_feeling",
    "confirm_goal_summary",
    "confirm_goal_collaborate",
    "request_goal_howkt",
    "request_goal_howchild",
];

/// Moves that switch the conversation to a person the child trusts.
pub const CONFIDANT_INTENTS: &[&str] = &[
    "request_confidant_who",
    "confirm_confidant_teacher",
    "confirm_confidant_parent",
    "request_confidant_when",
    "request_confidant_feeling",
    "request_confidant_why",
    "request_confidant_how",
    "inform_confidant_help",
    "inform_confidant_say",
    "request_confidant_say",
    "confirm_confidant_summary",
];

const CONTROL_INTENTS: &[&str] = &["request_goal_effect", "request_goal_feeling", "request_goal_howchild"];

/// At or below this relatedness only the first bullying move is tried.
const LOW_RELATEDNESS: f32 = 0.32;

/// Node generator for the Lilobot scenario.
#[derive(Clone, Copy, Debug)]
pub struct IntentNodeGenerator<'a> {
    evaluator: ToleranceEvaluator<'a>,
    thresholds: BeliefThresholds,
}

const BELIEF_COUNT: usize = LiloBelief::ALL.len();

/// The node being expanded and the transition it is trying to make.
struct Frame<'n> {
    node: &'n GraphNode,
    values: &'n [f32; BELIEF_COUNT],
    is_root: bool,
    transition: &'n PhaseTransitionConstraints,
}

impl Frame<'_> {
    fn value(&self, belief: LiloBelief) -> f32 {
        self.values[belief.index()]
    }

    fn subject_is(&self, subject: &str) -> bool {
        self.node.has_subject(subject)
    }
}

impl<'a> IntentNodeGenerator<'a> {
    pub fn new(evaluator: ToleranceEvaluator<'a>, thresholds: BeliefThresholds) -> Self {
        Self { evaluator, thresholds }
    }

    pub fn evaluator(&self) -> &ToleranceEvaluator<'a> {
        &self.evaluator
    }

    pub fn thresholds(&self) -> &BeliefThresholds {
        &self.thresholds
    }

    fn comparer(&self) -> FloatComparer {
        self.evaluator.comparer()
    }

    /// Whether `current` already satisfies the goal.
    fn goal_reached(&self, current: f32, goal: f32, check: BoundaryCheck) -> bool {
        let comparer = self.comparer();
        let equal_stop = matches!(
            check,
            BoundaryCheck::LessOrEqual | BoundaryCheck::GreaterOrEqual | BoundaryCheck::Equal
        ) && comparer.equal(current, goal);
        let less_stop = matches!(check, BoundaryCheck::LessOrEqual | BoundaryCheck::LessThan)
            && comparer.less_than(current, goal);
        let greater_stop = matches!(check, BoundaryCheck::GreaterOrEqual | BoundaryCheck::GreaterThan)
            && comparer.greater_than(current, goal);
        equal_stop || less_stop || greater_stop
    }

    fn needs_increase(&self, current: f32, goal: f32, check: BoundaryCheck) -> bool {
        match check {
            BoundaryCheck::GreaterOrEqual | BoundaryCheck::Equal => {
                self.comparer().less_than(current, goal)
            }
            BoundaryCheck::GreaterThan => self.comparer().less_or_equal(current, goal),
            _ => false,
        }
    }

    fn update(
        &self,
        frame: &Frame<'_>,
        belief: LiloBelief,
        goal: f32,
        check: BoundaryCheck,
        moves: &mut Vec<SimulatedMove>,
    ) {
        let current = frame.value(belief);
        if self.goal_reached(current, goal, check) {
            return;
        }
        let increase = self.needs_increase(current, goal, check);
        let t = &self.thresholds;

        match (belief, increase) {
            (B1, true) => self.raise_control(frame, moves),
            (B11, true) => {
                self.raise_control(frame, moves);
                self.direct(frame, "request_goal_dream", moves);
            }
            (B13, true) => {
                self.raise_control(frame, moves);
                self.direct(frame, "inform_confidant_help", moves);
                self.direct(frame, "inform_confidant_say", moves);
            }
            (B2, true) => self.raise_competence(frame, moves),
            (B3, _) => {
                let (inner_goal, inner_check) = if increase {
                    (t.max_value, BoundaryCheck::GreaterOrEqual)
                } else {
                    (t.min_value, BoundaryCheck::LessOrEqual)
                };
                // Greetings only make sense as the opening moves of the conversation.
                if frame.node.phase() == Phase::Phase1 && frame.is_root {
                    self.update(frame, B4, inner_goal, inner_check, moves);
                }
                for belief in [B5, B6, B7] {
                    self.update(frame, belief, inner_goal, inner_check, moves);
                }
            }
            (B4, true) => {
                self.direct(frame, "request_chitchat_greeting", moves);
                self.direct(frame, "request_chitchat_faring", moves);
            }
            (B5, true) => {
                if frame.subject_is(SUBJECT_GOAL) || frame.subject_is(SUBJECT_BULLYING) {
                    self.direct(frame, "ack_unknown_empathize", moves);
                } else {
                    for &intent in self.bullying_openers(frame) {
                        self.chained(frame, intent, "ack_unknown_empathize", moves);
                    }
                }
            }
            (B6, true) => {
                if self.relatedness_is_low(frame) {
                    self.chained(frame, BULLYING_INTENTS[0], "ack_unknown_empathize", moves);
                } else {
                    for &intent in BULLYING_INTENTS.iter().filter(|intent| **intent != "confirm_bullying_summary") {
                        self.direct(frame, intent, moves);
                    }
                }
            }
            (B7, true) => {
                self.direct(frame, "ack_contactingkt_compliment", moves);
                self.direct(frame, "inform_goal_help", moves);
                self.collaborate_or_build_trust(frame, moves);
            }
            (B7, false) => self.disappoint_or_ask_wish(frame, moves),
            (B8, false) => {
                self.collaborate_or_build_trust(frame, moves);
                self.disappoint_or_ask_wish(frame, moves);
                self.teacher_or_build_confidence(frame, moves);
            }
            (B10, true) => {
                for &intent in GOAL_INTENTS {
                    self.direct(frame, intent, moves);
                }
                if frame.subject_is(SUBJECT_GOAL) {
                    self.direct(frame, "inform_unknown_negative", moves);
                }
            }
            (B10, false) => {
                for &intent in BULLYING_INTENTS {
                    self.direct(frame, intent, moves);
                }
            }
            (B12, true) => {
                self.direct(frame, "request_confidant_who", moves);
                if frame.subject_is(SUBJECT_CONFIDANT) {
                    self.direct(frame, "request_unknown_who", moves);
                }
            }
            (B15, true) => self.direct(frame, "request_chitchat_goodbye", moves),
            (B16, true) => {
                self.collaborate_or_build_trust(frame, moves);
                self.teacher_or_build_confidence(frame, moves);
            }
            (B17, true) => {
                if self.comparer().equal(frame.value(B10), t.max_value) {
                    if frame.subject_is(SUBJECT_GOAL) {
                        self.direct(frame, "inform_unknown_positive", moves);
                    } else {
                        for &intent in GOAL_INTENTS {
                            self.chained(frame, intent, "inform_unknown_positive", moves);
                        }
                    }
                } else {
                    self.update(frame, B10, t.max_value, BoundaryCheck::GreaterOrEqual, moves);
                }
            }
            _ => {}
        }
    }

    fn raise_control(&self, frame: &Frame<'_>, moves: &mut Vec<SimulatedMove>) {
        for &intent in CONTROL_INTENTS {
            self.direct(frame, intent, moves);
        }
        if frame.subject_is(SUBJECT_GOAL) {
            self.direct(frame, "request_unknown_feeling", moves);
        }
    }

    /// Compliments only land once the child talks about their goal or a confidant.
    fn raise_competence(&self, frame: &Frame<'_>, moves: &mut Vec<SimulatedMove>) {
        if frame.subject_is(SUBJECT_GOAL) || frame.subject_is(SUBJECT_CONFIDANT) {
            self.direct(frame, "ack_unknown_compliment", moves);
            return;
        }

        // In phase 4 these openers end the conversation without the child feeling competent.
        let phase4 = frame.node.phase() == Phase::Phase4;
        for &intent in GOAL_INTENTS {
            if phase4 && matches!(intent, "inform_goal_help" | "confirm_goal_collaborate") {
                continue;
            }
            self.chained(frame, intent, "ack_unknown_compliment", moves);
        }
        let weak_relatedness = self.comparer().less_than(frame.value(B3), self.thresholds.mid_threshold);
        for &intent in CONFIDANT_INTENTS {
            if phase4 && weak_relatedness && intent == "request_confidant_who" {
                continue;
            }
            self.chained(frame, intent, "ack_unknown_compliment", moves);
        }
    }

    fn relatedness_is_low(&self, frame: &Frame<'_>) -> bool {
        self.comparer().less_or_equal(frame.value(B3), LOW_RELATEDNESS)
    }

    fn bullying_openers(&self, frame: &Frame<'_>) -> &'static [&'static str] {
        if self.relatedness_is_low(frame) {
            &BULLYING_INTENTS[..1]
        } else {
            BULLYING_INTENTS
        }
    }

    /// Proposing to collaborate only helps once the child trusts the helpline.
    fn collaborate_or_build_trust(&self, frame: &Frame<'_>, moves: &mut Vec<SimulatedMove>) {
        let mid = self.thresholds.mid_threshold;
        if self.comparer().greater_than(frame.value(B4), mid) {
            self.direct(frame, "confirm_goal_collaborate", moves);
        } else {
            self.update(frame, B4, mid, BoundaryCheck::GreaterThan, moves);
        }
    }

    /// Telling the child what the helpline cannot do requires talking about their wish first.
    fn disappoint_or_ask_wish(&self, frame: &Frame<'_>, moves: &mut Vec<SimulatedMove>) {
        let max = self.thresholds.max_value;
        if self.comparer().equal(frame.value(B10), max) {
            self.direct(frame, "inform_goal_negative", moves);
            if frame.subject_is(SUBJECT_GOAL) {
                self.direct(frame, "inform_unknown_negative", moves);
            }
        } else {
            self.update(frame, B10, max, BoundaryCheck::GreaterOrEqual, moves);
        }
    }

    /// Suggesting the teacher only helps once the child believes she can help.
    fn teacher_or_build_confidence(&self, frame: &Frame<'_>, moves: &mut Vec<SimulatedMove>) {
        let mid = self.thresholds.mid_threshold;
        if self.comparer().greater_than(frame.value(B13), mid) {
            self.direct(frame, "confirm_confidant_teacher", moves);
        } else {
            self.update(frame, B13, mid, BoundaryCheck::GreaterThan, moves);
        }
    }

    /// Simulates `label` from `node` and keeps the result only if it stays in the
    /// current phase, or enters the next one through its optimal goal.
    fn valid_step(
        &self,
        node: &GraphNode,
        label: &str,
        transition: &PhaseTransitionConstraints,
    ) -> Option<(Intent, GraphNode)> {
        let (intent, child) = match self.simulate(node, label) {
            Ok(step) => step,
            Err(error) => {
                debug!(event_name = "core.generator.simulation_failed", intent = label, %error);
                return None;
            }
        };

        let phase = child.phase();
        if phase == transition.current_phase {
            return Some((intent, child));
        }
        let enters_next = transition.next_phase == Some(phase)
            && self.evaluator.is_dnf_satisfied(&transition.optimal_goal, child.beliefs());
        enters_next.then_some((intent, child))
    }

    fn direct(&self, frame: &Frame<'_>, label: &str, moves: &mut Vec<SimulatedMove>) {
        if let Some((intent, child)) = self.valid_step(frame.node, label, frame.transition) {
            moves.push(SimulatedMove::direct(intent, child));
        }
    }

    /// `first` switches the subject; only the state after `then` joins the frontier.
    fn chained(&self, frame: &Frame<'_>, first: &str, then: &str, moves: &mut Vec<SimulatedMove>) {
        let Some((first_intent, middle)) = self.valid_step(frame.node, first, frame.transition) else {
            return;
        };
        if let Some((intent, child)) = self.valid_step(&middle, then, frame.transition) {
            moves.push(SimulatedMove::chained((first_intent, middle), intent, child));
        }
    }
}

impl NodeGenerator for IntentNodeGenerator<'_> {
    fn update_belief(
        &self,
        graph: &SearchGraph,
        from: NodeId,
        goal: &BeliefConstraint,
        transition: &PhaseTransitionConstraints,
    ) -> Vec<SimulatedMove> {
        let Some(node) = graph.node(from) else {
            return Vec::new();
        };
        let Some(belief) = LiloBelief::from_id(&goal.belief) else {
            return Vec::new();
        };
        if let Err(error) = self.evaluator.catalog().ensure_len("generator input", node.beliefs()) {
            debug!(event_name = "core.generator.skipped", node = from.index(), %error);
            return Vec::new();
        }

        let Ok(values) = <&[f32; BELIEF_COUNT]>::try_from(node.beliefs().values()) else {
            debug!(event_name = "core.generator.skipped", node = from.index(), "catalog is not the lilobot catalog");
            return Vec::new();
        };

        let frame = Frame { node, values, is_root: node.is_root(), transition };
        let mut moves = Vec::new();
        self.update(&frame, belief, goal.goal, goal.check, &mut moves);
        moves
    }
}
