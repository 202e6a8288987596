use crate::constraints::{BeliefConstraint, BoundaryCheck, ConstraintProvider, ConstraintSet, PhaseTransitionConstraints};
use crate::domain::belief::{BeliefCatalog, BeliefDescriptor, BeliefVector};
use crate::domain::desire::{DesireId, DesireSpec};
use crate::domain::phase::Phase;
use crate::planner::UtteranceTable;

use super::{BeliefThresholds, LiloBelief};

use BoundaryCheck::{Equal, GreaterOrEqual, GreaterThan, LessThan};
use LiloBelief::*;

fn constraint(belief: LiloBelief, check: BoundaryCheck, goal: f32) -> BeliefConstraint {
    BeliefConstraint::new(belief.to_string(), check, goal)
}

pub fn catalog() -> BeliefCatalog {
    BeliefCatalog::new(
        LiloBelief::ALL
            .into_iter()
            .map(|belief| BeliefDescriptor { id: belief.id(), full_name: belief.full_name().to_string() })
            .collect(),
    )
}

/// D1..D5 in declaration order.
pub fn desires(t: &BeliefThresholds) -> Vec<DesireSpec> {
    let desire = |id: &str, full_name: &str, phase: Phase, clauses: Vec<Vec<BeliefConstraint>>| DesireSpec {
        id: DesireId::new(id),
        full_name: full_name.to_string(),
        phase,
        activation: ConstraintSet::new(clauses),
    };

    vec![
        desire(
            "D1",
            "Lilobot wants to talk about his problem",
            Phase::Phase2,
            vec![vec![
                constraint(B3, GreaterThan, t.min_threshold),
                constraint(B9, LessThan, t.max_threshold),
                constraint(B10, Equal, t.min_value),
                constraint(B12, Equal, t.min_value),
            ]],
        ),
        desire(
            "D2",
            "Lilobot wants to end the conversation",
            Phase::Phase5,
            vec![
                vec![constraint(B1, LessThan, t.min_threshold)],
                vec![constraint(B17, Equal, t.max_value)],
                vec![constraint(B3, LessThan, t.mid_threshold), constraint(B12, Equal, t.max_value)],
                vec![constraint(B2, Equal, t.max_value)],
            ],
        ),
        desire(
            "D3",
            "Lilobot wants the helpline to remove the bullies from school",
            Phase::Phase3,
            vec![vec![
                constraint(B2, LessThan, t.max_threshold),
                constraint(B8, GreaterThan, t.max_threshold),
                constraint(B10, Equal, t.max_value),
            ]],
        ),
        desire(
            "D4",
            "Lilobot wants to talk to his teacher about the situation",
            Phase::Phase4,
            vec![vec![
                constraint(B3, GreaterOrEqual, t.mid_threshold),
                constraint(B12, Equal, t.max_value),
                constraint(B13, GreaterOrEqual, t.mid_threshold),
            ]],
        ),
        desire(
            "D5",
            "Lilobot wants to find a solution together with the helpline",
            Phase::Phase3,
            vec![vec![
                constraint(B4, GreaterOrEqual, t.mid_threshold),
                constraint(B10, Equal, t.max_value),
                constraint(B12, Equal, t.min_value),
            ]],
        ),
    ]
}

/// Reference belief state with B3 set to the mean of the relatedness beliefs.
fn reference_state(mut values: [f32; 17]) -> BeliefVector {
    let relatedness: f32 =
        LiloBelief::RELATEDNESS.iter().map(|belief| values[belief.index()]).sum::<f32>()
            / LiloBelief::RELATEDNESS.len() as f32;
    values[B3.index()] = relatedness;
    BeliefVector::new(values.to_vec())
}

/// A rule that moves `goal` into place whenever it does not hold yet.
fn until(goal: BeliefConstraint) -> (Vec<BeliefConstraint>, BeliefConstraint) {
    (vec![goal.negated()], goal)
}

pub fn transitions(t: &BeliefThresholds) -> Vec<PhaseTransitionConstraints> {
    let (lo, mid, hi) = (t.min_threshold, t.mid_threshold, t.max_threshold);
    let (min, max) = (t.min_value, t.max_value);

    let phase1 = {
        let b9 = constraint(B9, LessThan, hi);
        let b12 = constraint(B12, Equal, min);
        let (when_b3, b3) = until(constraint(B3, GreaterThan, lo));
        let (when_b10, b10) = until(constraint(B10, Equal, min));
        PhaseTransitionConstraints::new(
            Phase::Phase1,
            reference_state([
                mid, lo, 0.0, mid, min, min, hi, max, min, min, min, min, mid, max, min, min, min,
            ]),
        )
        .with_rule(when_b3, b3)
        .with_rule(when_b10, b10)
        .with_impossible_to_reach(ConstraintSet::new(vec![vec![b9.negated()], vec![b12.negated()]]))
    };

    let phase2 = {
        let b2 = constraint(B2, LessThan, hi);
        let b8 = constraint(B8, GreaterThan, hi);
        let b4 = constraint(B4, GreaterOrEqual, mid);
        let b12 = constraint(B12, Equal, min);
        let (when_b10, b10) = until(constraint(B10, Equal, max));
        PhaseTransitionConstraints::new(
            Phase::Phase2,
            reference_state([
                mid, lo, 0.0, hi, lo, lo, hi, max, min, min, min, min, mid, max, min, min, min,
            ]),
        )
        .with_rule(vec![b12.clone(), b4.negated()], b4)
        .with_rule(when_b10, b10)
        .with_impossible_to_reach(ConstraintSet::new(vec![
            vec![b12.negated(), b2.negated()],
            vec![b12.negated(), b8.negated()],
        ]))
    };

    let phase3 = {
        let (when_b3, b3) = until(constraint(B3, GreaterOrEqual, mid));
        let (when_b12, b12) = until(constraint(B12, Equal, max));
        let (when_b13, b13) = until(constraint(B13, GreaterOrEqual, mid));
        PhaseTransitionConstraints::new(
            Phase::Phase3,
            reference_state([
                mid, lo, 0.0, hi, lo, lo, max - t.one_step, min, min, max, min, min, mid, max, min,
                min, min,
            ]),
        )
        .with_rule(when_b3, b3)
        .with_rule(when_b12, b12)
        .with_rule(when_b13, b13)
    };

    let phase4 = {
        let (when_b2, b2) = until(constraint(B2, Equal, max));
        PhaseTransitionConstraints::new(
            Phase::Phase4,
            reference_state([
                mid, lo, 0.0, hi, lo, lo, max, min, min, max, min, max, mid, max, min, min, min,
            ]),
        )
        .with_rule(when_b2, b2.clone())
        .with_optimal_goal(ConstraintSet::single(b2))
    };

    vec![phase1, phase2, phase3, phase4]
}

/// Reference state of a child that has reached the final phase.
pub fn terminal_state(t: &BeliefThresholds) -> BeliefVector {
    let (lo, mid, hi) = (t.min_threshold, t.mid_threshold, t.max_threshold);
    let (min, max) = (t.min_value, t.max_value);
    reference_state([mid, max, 0.0, hi, lo, lo, max, min, min, max, min, max, mid, max, min, min, min])
}

pub fn provider(t: &BeliefThresholds) -> ConstraintProvider {
    transitions(t)
        .into_iter()
        .fold(ConstraintProvider::new(desires(t)), ConstraintProvider::with_transition)
        .with_terminal_beliefs(terminal_state(t))
}

pub fn utterances() -> UtteranceTable {
    [
        ("request_chitchat_greeting", "hello"),
        ("request_chitchat_faring", "How are you?"),
        ("trigger_unknown_what", "What do you want to talk about?"),
        ("request_bullying_who", "who is bullying you?"),
        ("request_unknown_who", "who is bullying you?"),
        ("request_bullying_details", "Would you like to tell me more about your situation?"),
        ("request_unknown_details", "what exactly did they do?"),
        ("request_bullying_count", "How many kids bullied you?"),
        ("request_bullying_location", "where do they bully you?"),
        ("request_unknown_location", "where does this happen?"),
        ("request_bullying_duration", "when did the bullying start?"),
        ("request_unknown_duration", "how long has this been going on?"),
        ("request_bullying_frequency", "do they bully you often?"),
        ("request_unknown_frequency", "do they do that often?"),
        ("request_unknown_when", "when did that happen?"),
        ("request_bullying_why", "why did they bully you?"),
        ("request_unknown_why", "do you know why they do this?"),
        ("request_bullying_response", "what do you do when they bully you?"),
        ("request_unknown_response", "what do you do when this happens?"),
        ("request_unknown_feeling", "how does that make you feel?"),
        ("request_bullying_confidant", "Did you tell anyone about the bullying?"),
        ("request_unknown_confidant", "have you told anyone about this?"),
        ("request_bullying_parent", "did you tell your parents about this?"),
        ("confirm_bullying_summary", "so, you were bullied at school yesterday, is that right?"),
        ("request_school_start", "did you start at this school this year?"),
        ("inform_unknown_positive", "I can do that"),
        ("inform_unknown_negative", "Unfortunately, that's not possible"),
        ("inform_goal_negative", "the child helpline can not call your school"),
        ("inform_goal_help", "I can talk to you"),
        ("ack_unknown_empathize", "oh how annoying"),
        ("ack_unknown_neutral", "that's good to hear"),
        ("ack_unknown_compliment", "That's a good idea"),
        ("ack_contactingkt_compliment", "Good that you're contacting the child helpline"),
        ("request_goal_what", "what is your goal for contacting the children helpline?"),
        (
            "request_goal_dream",
            "suppose you wake up tomorrow and the problem is no longer there, what would be different?",
        ),
        ("request_goal_feeling", "what would it feel like if the bullying stops?"),
        (
            "confirm_goal_summary",
            "if I understand you correctly, you are being bullied at school and you want it to stop, is that correct?",
        ),
        (
            "confirm_goal_collaborate",
            "we can look for a different solution together. what do you think of that?",
        ),
        ("request_goal_howkt", "is there anything I can do to help you?"),
        ("request_goal_howchild", "what could you do yourself?"),
        ("request_unknown_how", "what can you do to achieve this?"),
        ("request_confidant_who", "is there anyone you trust?"),
        ("confirm_confidant_teacher", "would you try to talk to your teacher?"),
        ("confirm_confidant_parent", "could you talk to your parents about this?"),
        ("request_confidant_when", "when could you talk to your teacher?"),
        ("request_confidant_feeling", "what would it be like to talk to Miss Ellie?"),
        ("request_confidant_why", "why are you afraid to talk to your teacher?"),
        ("request_confidant_how", "how would you discuss it with your teacher?"),
        ("inform_confidant_help", "she can listen to you and support you"),
        ("inform_confidant_say", "you can tell her the same thing you told me"),
        ("request_confidant_say", "what would you like to tell Miss Ellie?"),
        (
            "confirm_confidant_summary",
            "Shall we agree that you will talk to your teacher about your situation?",
        ),
        ("request_chitchat_end", "I suggest we wrap up the conversation"),
        ("confirm_chitchat_satisfaction", "did you like this conversation?"),
        ("request_chitchat_goodbye", "bye bye"),
        ("ack_unknown_guilt", "it's all your fault"),
        ("ack_unknown_taunt", "you're so stupid"),
    ]
    .into_iter()
    .collect()
}
