//! How a helpline move changes the child's beliefs.

use crate::constraints::ConstraintEvaluator;
use crate::domain::belief::{BeliefChange, BeliefVector};
use crate::errors::DomainError;
use crate::graph::{GraphNode, Intent};

use super::moves::IntentNodeGenerator;
use super::LiloBelief::{self, *};

pub const SUBJECT_GOAL: &str = "goal";
pub const SUBJECT_BULLYING: &str = "bullying";
pub const SUBJECT_CONFIDANT: &str = "confidant";

/// Desire under which a closing confirmation is read back as helpful.
const TEACHER_DESIRE: &str = "D4";

/// Boost given to the feeling of being understood by a neutral acknowledgement.
const NEUTRAL_ACK_STEP: f32 = 0.05;

impl IntentNodeGenerator<'_> {
    /// The child state after the helpline utters `label` in `node`.
    ///
    /// The returned intent carries the refinements made along the way: an
    /// `unknown` subject resolved from the node, and confirmations read back as
    /// acknowledgements.
    pub fn simulate(&self, node: &GraphNode, label: &str) -> Result<(Intent, GraphNode), DomainError> {
        self.evaluator().catalog().ensure_len("simulated node beliefs", node.beliefs())?;
        let mut intent = Intent::parse(label)?;
        if intent.has_unknown_subject() {
            if let Some(subject) = node.subject() {
                intent.set_subject(subject);
            }
        }

        let mut beliefs = node.beliefs().clone();
        let t = self.thresholds();
        let comparer = self.evaluator().comparer();
        match intent.subject() {
            SUBJECT_GOAL => self.change(&mut beliefs, B10, BeliefChange::Set(t.max_value))?,
            SUBJECT_BULLYING => self.change(&mut beliefs, B10, BeliefChange::Set(t.min_value))?,
            _ => {}
        }

        match intent.resolved_name().as_str() {
            "request_chitchat_greeting" | "request_chitchat_faring" => {
                self.change(&mut beliefs, B4, BeliefChange::Increase(t.one_step))?;
            }
            "request_chitchat_goodbye" => {
                self.change(&mut beliefs, B15, BeliefChange::Set(t.max_value))?;
            }
            "confirm_bullying_summary" => {
                self.confirm_to_ack(&mut intent, value(&beliefs, B9)?, t.min_value);
            }
            "ack_contactingkt_compliment" | "inform_goal_help" => {
                self.change(&mut beliefs, B7, BeliefChange::Increase(t.one_step))?;
            }
            "ack_bullying_empathize" | "ack_goal_empathize" => {
                self.change(&mut beliefs, B5, BeliefChange::Increase(t.one_step))?;
            }
            "ack_goal_compliment" | "ack_confidant_compliment" => {
                self.change(&mut beliefs, B1, BeliefChange::Increase(t.one_step))?;
                self.change(&mut beliefs, B2, BeliefChange::Increase(t.one_step))?;
            }
            "request_confidant_when"
            | "request_confidant_feeling"
            | "request_confidant_how"
            | "request_confidant_say" => {
                self.change(&mut beliefs, B2, BeliefChange::Increase(t.one_step))?;
            }
            "request_goal_dream" => {
                self.change(&mut beliefs, B11, BeliefChange::Set(t.max_value))?;
            }
            "request_goal_feeling" | "request_goal_howchild" => {
                self.change(&mut beliefs, B1, BeliefChange::Increase(t.one_step))?;
                self.change(&mut beliefs, B11, BeliefChange::Increase(t.one_step))?;
            }
            "confirm_goal_summary" => {
                self.confirm_to_ack(&mut intent, value(&beliefs, B10)?, t.min_value);
            }
            "confirm_goal_collaborate" => {
                let trust = value(&beliefs, B4)?;
                if comparer.greater_than(trust, t.mid_threshold) {
                    self.change(&mut beliefs, B7, BeliefChange::Increase(t.one_step))?;
                    self.change(&mut beliefs, B8, BeliefChange::Decrease(t.two_steps))?;
                    self.change(&mut beliefs, B16, BeliefChange::Set(t.max_value))?;
                }
                self.confirm_to_ack(&mut intent, trust, t.mid_threshold);
            }
            "inform_goal_negative" => {
                if comparer.equal(value(&beliefs, B10)?, t.max_value) {
                    self.change(&mut beliefs, B7, BeliefChange::Decrease(t.one_step))?;
                    self.change(&mut beliefs, B8, BeliefChange::Set(t.min_value))?;
                }
            }
            "inform_goal_positive" => {
                if comparer.equal(value(&beliefs, B10)?, t.max_value) {
                    self.change(&mut beliefs, B17, BeliefChange::Set(t.max_value))?;
                }
            }
            "request_confidant_who" => {
                self.change(&mut beliefs, B12, BeliefChange::Set(t.max_value))?;
            }
            "inform_confidant_help" | "inform_confidant_say" => {
                self.change(&mut beliefs, B13, BeliefChange::Set(t.max_value))?;
            }
            "confirm_confidant_teacher" => {
                let confidant_can_help = value(&beliefs, B13)?;
                if comparer.greater_than(confidant_can_help, t.mid_threshold) {
                    self.change(&mut beliefs, B8, BeliefChange::Set(t.min_value))?;
                    self.change(&mut beliefs, B16, BeliefChange::Set(t.max_value))?;
                }
                self.confirm_to_ack(&mut intent, confidant_can_help, t.mid_threshold);
            }
            "confirm_confidant_parent" => intent.acknowledge("negative"),
            "confirm_confidant_summary" | "confirm_chitchat_satisfaction" => {
                let wants_teacher = self
                    .evaluator()
                    .active_desire(&beliefs)
                    .is_some_and(|desire| desire.as_str() == TEACHER_DESIRE);
                intent.acknowledge(if wants_teacher { "helpful" } else { "negative" });
            }
            _ => {}
        }

        if intent.kind() == "request" && intent.subject() == SUBJECT_BULLYING {
            self.change(&mut beliefs, B6, BeliefChange::Increase(t.one_step))?;
        }
        if intent.kind() == "ack" && intent.attribute() == "neutral" {
            self.change(&mut beliefs, B5, BeliefChange::Increase(NEUTRAL_ACK_STEP))?;
        }

        let indices = LiloBelief::RELATEDNESS.map(LiloBelief::index);
        let relatedness = beliefs.mean_of(&indices).ok_or_else(|| {
            DomainError::InvariantViolation("relatedness beliefs are missing".to_string())
        })?;
        self.change(&mut beliefs, B3, BeliefChange::Set(relatedness))?;

        let phase = self.evaluator().phase_of(&beliefs);
        let subject = (!intent.has_unknown_subject()).then(|| intent.subject().to_string());
        Ok((intent, GraphNode::new(beliefs, phase, subject)))
    }

    fn change(
        &self,
        beliefs: &mut BeliefVector,
        belief: LiloBelief,
        change: BeliefChange,
    ) -> Result<(), DomainError> {
        self.thresholds().scale(self.evaluator().comparer()).apply(beliefs, belief.index(), change)
    }

    fn confirm_to_ack(&self, intent: &mut Intent, value: f32, threshold: f32) {
        let positive = self.evaluator().comparer().greater_than(value, threshold);
        intent.acknowledge(if positive { "positive" } else { "negative" });
    }
}

pub(crate) fn value(beliefs: &BeliefVector, belief: LiloBelief) -> Result<f32, DomainError> {
    beliefs.get(belief.index()).ok_or_else(|| DomainError::SizeMismatch {
        context: format!("belief {belief}"),
        expected: belief.index() + 1,
        actual: beliefs.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::value;
    use crate::comparer::FloatComparer;
    use crate::domain::belief::BeliefVector;
    use crate::domain::phase::Phase;
    use crate::errors::DomainError;
    use crate::graph::GraphNode;
    use crate::scenario::LiloBelief::{self, *};
    use crate::scenario::{BeliefThresholds, Scenario};

    fn read(beliefs: &BeliefVector, belief: LiloBelief) -> f32 {
        value(beliefs, belief).expect("belief in range")
    }

    fn scenario() -> Scenario {
        Scenario::lilobot(BeliefThresholds::default()).expect("scenario")
    }

    fn node(scenario: &Scenario, phase: Phase, subject: Option<&str>, edits: &[(LiloBelief, f32)]) -> GraphNode {
        let mut beliefs = scenario.provider.phase_state(phase).expect("state").values().to_vec();
        for (belief, value) in edits {
            beliefs[belief.index()] = *value;
        }
        GraphNode::new(BeliefVector::new(beliefs), phase, subject.map(str::to_string))
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn greeting_builds_trust_and_refreshes_relatedness() {
        let scenario = scenario();
        let generator = scenario.generator(FloatComparer::default());
        let start = node(&scenario, Phase::Phase1, None, &[(B4, 0.5), (B7, 0.5)]);

        let (intent, child) = generator.simulate(&start, "request_chitchat_greeting").expect("simulate");

        assert_eq!(intent.label(), "request_chitchat_greeting");
        assert!(close(read(child.beliefs(), B4), 0.6));
        assert!(close(read(child.beliefs(), B3), (0.6 + 0.5) / 4.0));
        assert_eq!(child.subject(), Some("chitchat"));
    }

    #[test]
    fn unknown_subject_takes_the_subject_of_the_conversation() {
        let scenario = scenario();
        let generator = scenario.generator(FloatComparer::default());
        let start = node(&scenario, Phase::Phase4, Some("confidant"), &[]);

        let (intent, child) = generator.simulate(&start, "ack_unknown_compliment").expect("simulate");

        assert_eq!(intent.label(), "ack_unknown_compliment");
        assert_eq!(intent.resolved_name(), "ack_confidant_compliment");
        assert!(close(read(child.beliefs(), B1), 0.6));
        assert!(close(read(child.beliefs(), B2), 0.4));
        assert_eq!(child.subject(), Some("confidant"));
    }

    #[test]
    fn unknown_subject_without_context_stays_unresolved() {
        let scenario = scenario();
        let generator = scenario.generator(FloatComparer::default());
        let start = node(&scenario, Phase::Phase1, None, &[]);

        let (intent, child) = generator.simulate(&start, "ack_unknown_compliment").expect("simulate");

        assert!(intent.has_unknown_subject());
        assert_eq!(child.subject(), None);
        assert!(close(read(child.beliefs(), B1), read(start.beliefs(), B1)));
    }

    #[test]
    fn goal_and_bullying_subjects_toggle_the_wish_belief() {
        let scenario = scenario();
        let generator = scenario.generator(FloatComparer::default());
        let start = node(&scenario, Phase::Phase2, None, &[]);

        let (_, goal) = generator.simulate(&start, "request_goal_what").expect("simulate");
        let (_, bullying) = generator.simulate(&goal, "request_bullying_who").expect("simulate");

        assert!(close(read(goal.beliefs(), B10), 1.0));
        assert!(close(read(bullying.beliefs(), B10), 0.0));
        assert!(close(read(bullying.beliefs(), B6), 0.4));
    }

    #[test]
    fn confirmations_are_read_back_as_acknowledgements() {
        let scenario = scenario();
        let generator = scenario.generator(FloatComparer::default());

        let trusting = node(&scenario, Phase::Phase3, None, &[(B4, 0.7), (B8, 0.5)]);
        let (intent, child) = generator.simulate(&trusting, "confirm_goal_collaborate").expect("simulate");
        assert_eq!((intent.kind(), intent.attribute()), ("ack", "positive"));
        assert_eq!(intent.label(), "confirm_goal_collaborate");
        assert!(close(read(child.beliefs(), B8), 0.3));
        assert!(close(read(child.beliefs(), B16), 1.0));

        let wary = node(&scenario, Phase::Phase3, None, &[(B4, 0.5)]);
        let (intent, child) = generator.simulate(&wary, "confirm_goal_collaborate").expect("simulate");
        assert_eq!((intent.kind(), intent.attribute()), ("ack", "negative"));
        assert!(close(read(child.beliefs(), B16), 0.0));

        let (intent, _) = generator.simulate(&wary, "confirm_confidant_parent").expect("simulate");
        assert_eq!(intent.resolved_name(), "ack_confidant_negative");
    }

    #[test]
    fn increases_stop_at_the_upper_bound() {
        let scenario = scenario();
        let generator = scenario.generator(FloatComparer::default());
        let start = node(&scenario, Phase::Phase4, Some("goal"), &[(B7, 1.0)]);

        let (_, child) = generator.simulate(&start, "inform_goal_help").expect("simulate");

        assert!(close(read(child.beliefs(), B7), 1.0));
    }

    #[test]
    fn phase_follows_the_active_desire() {
        let scenario = scenario();
        let generator = scenario.generator(FloatComparer::default());
        let start = node(&scenario, Phase::Phase4, Some("confidant"), &[(B2, 0.9), (B1, 0.9)]);

        let (_, child) = generator.simulate(&start, "ack_unknown_compliment").expect("simulate");

        assert!(close(read(child.beliefs(), B2), 1.0));
        assert_eq!(child.phase(), Phase::Phase5);
    }

    #[test]
    fn malformed_labels_are_rejected() {
        let scenario = scenario();
        let generator = scenario.generator(FloatComparer::default());
        let start = node(&scenario, Phase::Phase1, None, &[]);

        assert!(generator.simulate(&start, "hello").is_err());
    }

    #[test]
    fn short_belief_vector_is_rejected_instead_of_read_as_zero() {
        let scenario = scenario();
        let generator = scenario.generator(FloatComparer::default());
        let short = GraphNode::new(BeliefVector::new(vec![0.5; 12]), Phase::Phase4, Some("confidant".to_string()));

        let error = generator.simulate(&short, "confirm_confidant_teacher").expect_err("short vector");

        assert_eq!(
            error,
            DomainError::SizeMismatch { context: "simulated node beliefs".to_string(), expected: 17, actual: 12 }
        );
        assert!(matches!(
            value(&BeliefVector::new(vec![0.5; 12]), B13),
            Err(DomainError::SizeMismatch { expected: 13, actual: 12, .. })
        ));
    }
}
