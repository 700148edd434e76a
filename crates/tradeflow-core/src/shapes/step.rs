//! Workflow steps and the fixed shape sequence.

use super::ShapeKind;
use serde::{Deserialize, Serialize};

/// The order shapes are chained in when building a complete trade.
pub const SEQUENCE: [ShapeKind; 7] = [
    ShapeKind::Circle,
    ShapeKind::Rectangle,
    ShapeKind::Square,
    ShapeKind::Diamond,
    ShapeKind::Rectangle,
    ShapeKind::Triangle,
    ShapeKind::Circle,
];

/// The role a node plays in the trade.
///
/// Kinds that appear twice in [`SEQUENCE`] can play two steps. A node keeps
/// the step it was placed as for its whole life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowStep {
    UserInput,
    OnChainData,
    AiReasoning,
    TradeDetails,
    Verification,
    Confirmation,
    Execute,
}

impl WorkflowStep {
    /// Steps a node of `kind` can play, in the order they are handed out.
    pub fn of_kind(kind: ShapeKind) -> &'static [WorkflowStep] {
        match kind {
            ShapeKind::Circle => &[WorkflowStep::UserInput, WorkflowStep::Execute],
            ShapeKind::Rectangle => &[WorkflowStep::OnChainData, WorkflowStep::Verification],
            ShapeKind::Square => &[WorkflowStep::AiReasoning],
            ShapeKind::Diamond => &[WorkflowStep::TradeDetails],
            ShapeKind::Triangle => &[WorkflowStep::Confirmation],
        }
    }

    /// Step the first node of `kind` plays.
    pub fn primary(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Circle => WorkflowStep::UserInput,
            ShapeKind::Rectangle => WorkflowStep::OnChainData,
            ShapeKind::Square => WorkflowStep::AiReasoning,
            ShapeKind::Diamond => WorkflowStep::TradeDetails,
            ShapeKind::Triangle => WorkflowStep::Confirmation,
        }
    }

    /// Kind of the node that follows this step, if any.
    pub fn successor(self) -> Option<ShapeKind> {
        match self {
            WorkflowStep::UserInput => Some(ShapeKind::Rectangle),
            WorkflowStep::OnChainData => Some(ShapeKind::Square),
            WorkflowStep::AiReasoning => Some(ShapeKind::Diamond),
            WorkflowStep::TradeDetails => Some(ShapeKind::Rectangle),
            WorkflowStep::Verification => Some(ShapeKind::Triangle),
            WorkflowStep::Confirmation => Some(ShapeKind::Circle),
            WorkflowStep::Execute => None,
        }
    }

    /// Panel title shown for this step.
    pub fn title(self) -> &'static str {
        match self {
            WorkflowStep::UserInput => "User Preferences",
            WorkflowStep::OnChainData => "On Chain Data",
            WorkflowStep::AiReasoning => "AI Prompts",
            WorkflowStep::TradeDetails => "Trade Details",
            WorkflowStep::Verification => "Verification",
            WorkflowStep::Confirmation => "Trade Confirmation",
            WorkflowStep::Execute => "Execute",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successors_follow_sequence() {
        let mut handed_out = std::collections::HashMap::new();
        for pair in SEQUENCE.windows(2) {
            let ordinal = handed_out.entry(pair[0]).or_insert(0usize);
            let step = WorkflowStep::of_kind(pair[0])[*ordinal];
            *ordinal += 1;
            assert_eq!(step.successor(), Some(pair[1]));
        }
    }

    #[test]
    fn test_second_circle_executes() {
        assert_eq!(WorkflowStep::of_kind(ShapeKind::Circle)[1], WorkflowStep::Execute);
        assert_eq!(WorkflowStep::primary(ShapeKind::Circle), WorkflowStep::UserInput);
        assert_eq!(WorkflowStep::Execute.successor(), None);
    }

    #[test]
    fn test_steps_per_kind_match_caps() {
        for kind in ShapeKind::ALL {
            let count = SEQUENCE.iter().filter(|&&k| k == kind).count();
            assert_eq!(count, kind.cap());
            assert_eq!(WorkflowStep::of_kind(kind).len(), kind.cap());
            assert_eq!(WorkflowStep::of_kind(kind)[0], WorkflowStep::primary(kind));
        }
    }
}
