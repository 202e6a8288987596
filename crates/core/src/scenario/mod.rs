//! The built-in Lilobot counselling scenario.
//!
//! A child (Lilobot) contacts a helpline about being bullied. Seventeen beliefs
//! describe how the child sees the conversation, five desires signal the
//! phase of the five-phase conversation model, and the intent generator
//! simulates how helpline moves shift those beliefs.

pub mod effects;
pub mod moves;
pub mod tables;

use std::fmt;

use crate::comparer::FloatComparer;
use crate::constraints::{ConstraintProvider, ToleranceEvaluator};
use crate::domain::belief::{BeliefCatalog, BeliefId, BeliefScale};
use crate::errors::DomainError;
use crate::planner::{OptimalPathService, UtteranceTable};

pub use moves::IntentNodeGenerator;

/// The scenario's beliefs, in canonical order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LiloBelief {
    B1,
    B2,
    B3,
    B4,
    B5,
    B6,
    B7,
    B8,
    B9,
    B10,
    B11,
    B12,
    B13,
    B14,
    B15,
    B16,
    B17,
}

impl LiloBelief {
    pub const ALL: [Self; 17] = [
        Self::B1,
        Self::B2,
        Self::B3,
        Self::B4,
        Self::B5,
        Self::B6,
        Self::B7,
        Self::B8,
        Self::B9,
        Self::B10,
        Self::B11,
        Self::B12,
        Self::B13,
        Self::B14,
        Self::B15,
        Self::B16,
        Self::B17,
    ];

    /// Beliefs whose mean is the child's relatedness to the helpline (B3).
    pub const RELATEDNESS: [Self; 4] = [Self::B4, Self::B5, Self::B6, Self::B7];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn id(self) -> BeliefId {
        BeliefId::new(self.to_string())
    }

    pub fn from_id(id: &BeliefId) -> Option<Self> {
        Self::ALL.into_iter().find(|belief| belief.to_string() == id.as_str())
    }

    pub fn full_name(self) -> &'static str {
        match self {
            Self::B1 => "I feel in control of the conversation",
            Self::B2 => "I think I am competent to solve the problem",
            Self::B3 => "I feel connected to KT",
            Self::B4 => "I think KT can be trusted",
            Self::B5 => "I think KT understands me",
            Self::B6 => "I think KT is interested in my story",
            Self::B7 => "I think KT can help me",
            Self::B8 => "I think KT can solve the problem",
            Self::B9 => "I think I have told my story",
            Self::B10 => "I think KT is asking about a wish",
            Self::B11 => "I think KT is asking about a positive wish",
            Self::B12 => "I think KT is asking about a confidant",
            Self::B13 => "I think Miss Ellie can help me",
            Self::B14 => "I feel safe in the conversation",
            Self::B15 => "I think KT wants to end the conversation",
            Self::B16 => "I think KT and I will find a solution together",
            Self::B17 => "I think KT is going to solve the problem for me",
        }
    }
}

impl fmt::Display for LiloBelief {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}", self.index() + 1)
    }
}

/// Step sizes and thresholds shared by the desire formulas, the phase table
/// and the move effects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeliefThresholds {
    pub one_step: f32,
    pub two_steps: f32,
    pub min_threshold: f32,
    pub mid_threshold: f32,
    pub max_threshold: f32,
    pub min_value: f32,
    pub max_value: f32,
}

impl Default for BeliefThresholds {
    fn default() -> Self {
        Self {
            one_step: 0.1,
            two_steps: 0.2,
            min_threshold: 0.3,
            mid_threshold: 0.5,
            max_threshold: 0.7,
            min_value: 0.0,
            max_value: 1.0,
        }
    }
}

impl BeliefThresholds {
    pub fn scale(&self, comparer: FloatComparer) -> BeliefScale {
        BeliefScale { min_value: self.min_value, max_value: self.max_value, comparer }
    }
}

/// Static tables of one scenario, built once and shared by reference.
#[derive(Clone, Debug)]
pub struct Scenario {
    pub catalog: BeliefCatalog,
    pub provider: ConstraintProvider,
    pub utterances: UtteranceTable,
    pub thresholds: BeliefThresholds,
}

impl Scenario {
    pub fn lilobot(thresholds: BeliefThresholds) -> Result<Self, DomainError> {
        let catalog = tables::catalog();
        let provider = tables::provider(&thresholds);
        provider.validate(&catalog)?;
        Ok(Self { catalog, provider, utterances: tables::utterances(), thresholds })
    }

    pub fn evaluator(&self, comparer: FloatComparer) -> ToleranceEvaluator<'_> {
        ToleranceEvaluator::new(&self.provider, &self.catalog, comparer)
    }

    pub fn generator(&self, comparer: FloatComparer) -> IntentNodeGenerator<'_> {
        IntentNodeGenerator::new(self.evaluator(comparer), self.thresholds)
    }

    pub fn path_service(
        &self,
        comparer: FloatComparer,
    ) -> OptimalPathService<'_, IntentNodeGenerator<'_>> {
        OptimalPathService::new(
            &self.provider,
            &self.catalog,
            &self.utterances,
            self.generator(comparer),
        )
        .with_comparer(comparer)
    }
}

#[cfg(test)]
mod tests {
    use super::{BeliefThresholds, LiloBelief, Scenario};
    use crate::domain::belief::BeliefId;
    use crate::domain::phase::Phase;

    #[test]
    fn beliefs_map_to_their_canonical_ids_and_indices() {
        assert_eq!(LiloBelief::B1.index(), 0);
        assert_eq!(LiloBelief::B17.index(), 16);
        assert_eq!(LiloBelief::B10.to_string(), "B10");
        assert_eq!(LiloBelief::from_id(&BeliefId::new("B13")), Some(LiloBelief::B13));
        assert_eq!(LiloBelief::from_id(&BeliefId::new("B18")), None);
    }

    #[test]
    fn lilobot_tables_are_consistent() {
        let scenario = Scenario::lilobot(BeliefThresholds::default()).expect("valid scenario");

        assert_eq!(scenario.catalog.len(), 17);
        assert_eq!(scenario.provider.desires().len(), 5);
        for phase in Phase::first().remaining_transitions() {
            assert!(scenario.provider.transition(phase).is_some(), "{phase} has no entry");
        }
        assert_eq!(scenario.provider.phase_state(Phase::Phase5).map(|state| state.len()), Some(17));
        assert_eq!(scenario.utterances.example("request_chitchat_greeting"), "hello");
    }
}
