use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constraints::ConstraintSet;
use crate::domain::phase::Phase;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DesireId(pub String);

impl DesireId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DesireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A desire, the phase it signals, and the DNF formula that activates it.
#[derive(Clone, Debug, PartialEq)]
pub struct DesireSpec {
    pub id: DesireId,
    pub full_name: String,
    pub phase: Phase,
    pub activation: ConstraintSet,
}
