use crate::model::instruction::InstructionId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Address of one logical stream inside a multiplexed connection.
///
/// A data stream is addressed by instruction and transform. A timer stream is
/// additionally qualified by its timer family.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicalEndpoint {
    instruction_id: InstructionId,
    transform_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timer_family_id: Option<String>,
}

impl LogicalEndpoint {
    pub fn data(instruction_id: impl Into<InstructionId>, transform_id: impl Into<String>) -> Self {
        Self {
            instruction_id: instruction_id.into(),
            transform_id: transform_id.into(),
            timer_family_id: None,
        }
    }

    pub fn timer(
        instruction_id: impl Into<InstructionId>,
        transform_id: impl Into<String>,
        timer_family_id: impl Into<String>,
    ) -> Self {
        Self {
            instruction_id: instruction_id.into(),
            transform_id: transform_id.into(),
            timer_family_id: Some(timer_family_id.into()),
        }
    }

    pub fn instruction_id(&self) -> &InstructionId {
        &self.instruction_id
    }

    pub fn transform_id(&self) -> &str {
        &self.transform_id
    }

    pub fn timer_family_id(&self) -> Option<&str> {
        self.timer_family_id.as_deref()
    }

    pub fn is_timer(&self) -> bool {
        self.timer_family_id.is_some()
    }
}

impl Display for LogicalEndpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.timer_family_id {
            Some(timer_family_id) => write!(
                f,
                "[instruction: {}, transform: {}, timer family: {}]",
                self.instruction_id, self.transform_id, timer_family_id
            ),
            None => write!(
                f,
                "[instruction: {}, transform: {}]",
                self.instruction_id, self.transform_id
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LogicalEndpoint;

    #[test]
    fn data_and_timer_endpoints_are_distinct() {
        let data = LogicalEndpoint::data("i1", "out");
        let timer = LogicalEndpoint::timer("i1", "out", "event-timers");

        assert_ne!(data, timer);
        assert!(!data.is_timer());
        assert_eq!(timer.timer_family_id(), Some("event-timers"));
        assert_eq!(data.instruction_id(), timer.instruction_id());
    }

    #[test]
    fn display_names_every_part() {
        let timer = LogicalEndpoint::timer("i1", "out", "event-timers");

        assert_eq!(
            timer.to_string(),
            "[instruction: i1, transform: out, timer family: event-timers]"
        );
    }
}
