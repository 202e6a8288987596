use std::fmt;

use serde::{Deserialize, Serialize};

use crate::comparer::FloatComparer;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BeliefId(pub String);

impl BeliefId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Sort key for canonical ordering: numeric suffix first, then the raw id.
    fn canonical_key(&self) -> (u32, &str) {
        let digits = self.0.trim_start_matches(|ch: char| !ch.is_ascii_digit());
        (digits.parse().unwrap_or(u32::MAX), self.0.as_str())
    }
}

impl fmt::Display for BeliefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Belief values in canonical catalog order.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BeliefVector {
    values: Vec<f32>,
}

impl BeliefVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn set(&mut self, index: usize, value: f32) -> Result<(), DomainError> {
        let len = self.values.len();
        let slot = self.values.get_mut(index).ok_or_else(|| {
            DomainError::InvariantViolation(format!(
                "belief index {index} is outside a vector of length {len}"
            ))
        })?;
        *slot = value;
        Ok(())
    }

    /// Bit patterns of the values, used as the hashable part of node identity.
    pub fn fingerprint(&self) -> Vec<u32> {
        self.values.iter().map(|value| value.to_bits()).collect()
    }

    pub fn mean_of(&self, indices: &[usize]) -> Option<f32> {
        if indices.is_empty() {
            return None;
        }
        let mut sum = 0.0;
        for index in indices {
            sum += self.get(*index)?;
        }
        Some(sum / indices.len() as f32)
    }
}

impl From<Vec<f32>> for BeliefVector {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeliefDescriptor {
    pub id: BeliefId,
    pub full_name: String,
}

/// Naming service for beliefs: canonical index and human readable name per id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BeliefCatalog {
    entries: Vec<BeliefDescriptor>,
}

impl BeliefCatalog {
    /// Builds the catalog, sorting entries by the numeric suffix of their id.
    pub fn new(mut entries: Vec<BeliefDescriptor>) -> Self {
        entries.sort_by(|left, right| left.id.canonical_key().cmp(&right.id.canonical_key()));
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index_of(&self, id: &BeliefId) -> Option<usize> {
        self.entries.iter().position(|entry| &entry.id == id)
    }

    pub fn full_name(&self, id: &BeliefId) -> Option<&str> {
        self.entries.iter().find(|entry| &entry.id == id).map(|entry| entry.full_name.as_str())
    }

    pub fn entries(&self) -> &[BeliefDescriptor] {
        &self.entries
    }

    pub fn ensure_len(&self, context: &str, vector: &BeliefVector) -> Result<(), DomainError> {
        if vector.len() == self.len() {
            Ok(())
        } else {
            Err(DomainError::SizeMismatch {
                context: context.to_string(),
                expected: self.len(),
                actual: vector.len(),
            })
        }
    }
}

/// One simulated change to a single belief.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BeliefChange {
    Increase(f32),
    Decrease(f32),
    Set(f32),
}

/// Bounds that increases and decreases are clamped to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeliefScale {
    pub min_value: f32,
    pub max_value: f32,
    pub comparer: FloatComparer,
}

impl Default for BeliefScale {
    fn default() -> Self {
        Self { min_value: 0.0, max_value: 1.0, comparer: FloatComparer::default() }
    }
}

impl BeliefScale {
    /// Applies `change` to the belief at `index`.
    ///
    /// Increases stop at `max_value` and decreases at `min_value`; a value already
    /// at its bound (within the comparer's tolerance), or a negative amount, leaves
    /// the belief untouched. `Set` is unconditional.
    pub fn apply(
        &self,
        beliefs: &mut BeliefVector,
        index: usize,
        change: BeliefChange,
    ) -> Result<(), DomainError> {
        let current = beliefs.get(index).ok_or_else(|| {
            DomainError::InvariantViolation(format!(
                "belief index {index} is outside a vector of length {}",
                beliefs.len()
            ))
        })?;

        let next = match change {
            BeliefChange::Increase(amount) => {
                if self.comparer.greater_or_equal(current, self.max_value) || amount < 0.0 {
                    current
                } else {
                    (current + amount).min(self.max_value)
                }
            }
            BeliefChange::Decrease(amount) => {
                if self.comparer.less_or_equal(current, self.min_value) || amount < 0.0 {
                    current
                } else {
                    (current - amount).max(self.min_value)
                }
            }
            BeliefChange::Set(value) => value,
        };

        beliefs.set(index, next)
    }
}
