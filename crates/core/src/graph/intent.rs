use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};

use crate::errors::DomainError;

pub const UNKNOWN_SUBJECT: &str = "unknown";

/// A simulated conversational move, labelled `type_subject_attribute`.
///
/// The label is fixed at construction and is the intent's identity. The kind,
/// subject and attribute start out as the label's segments and may be refined
/// while the move is simulated (an `unknown` subject resolved from context, a
/// confirmation read back as an acknowledgement) without changing the label.
#[derive(Clone, Debug)]
pub struct Intent {
    label: String,
    kind: String,
    subject: String,
    attribute: String,
}

impl Intent {
    pub fn parse(label: impl Into<String>) -> Result<Self, DomainError> {
        let label = label.into();
        let mut segments = label.split('_');
        let parsed = match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(kind), Some(subject), Some(attribute), None)
                if !kind.is_empty() && !subject.is_empty() && !attribute.is_empty() =>
            {
                Some((kind.to_string(), subject.to_string(), attribute.to_string()))
            }
            _ => None,
        };
        let Some((kind, subject, attribute)) = parsed else {
            return Err(DomainError::InvalidIntentLabel { label });
        };

        Ok(Self { label, kind, subject, attribute })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// The `type_subject_attribute` name after refinement.
    pub fn resolved_name(&self) -> String {
        format!("{}_{}_{}", self.kind, self.subject, self.attribute)
    }

    pub fn has_unknown_subject(&self) -> bool {
        self.subject == UNKNOWN_SUBJECT
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.subject = subject.into();
    }

    /// Reads the move back as an acknowledgement with the given attribute.
    pub fn acknowledge(&mut self, attribute: impl Into<String>) {
        self.kind = "ack".to_string();
        self.attribute = attribute.into();
    }
}

impl PartialEq for Intent {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
    }
}

impl Eq for Intent {}

impl Hash for Intent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.label.hash(state);
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl Serialize for Intent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label)
    }
}
