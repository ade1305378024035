//! Instruction identity.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Identifies one running unit of work.
///
/// All logical streams of an instruction share its id, across every endpoint
/// the instruction talks to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstructionId(String);

impl InstructionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for InstructionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstructionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for InstructionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for InstructionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
