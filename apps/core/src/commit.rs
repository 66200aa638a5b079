use crate::model::OpenMode;
use crate::search::Candidate;
use crate::trigger::{strip_segment, TriggerKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    ActiveEngine(String),
    OpenModeOverride(OpenMode),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub text: String,
    pub change: SessionChange,
}

/// Applies `candidate` to `text`: the trailing segment of the candidate's trigger kind is
/// removed and the matching session change is returned. Nothing is dispatched.
pub fn commit(text: &str, candidate: &Candidate) -> CommitOutcome {
    match candidate {
        Candidate::Engine(id) => CommitOutcome {
            text: strip_segment(text, TriggerKind::Engine),
            change: SessionChange::ActiveEngine(id.clone()),
        },
        Candidate::OpenMode(mode) => CommitOutcome {
            text: strip_segment(text, TriggerKind::Mode),
            change: SessionChange::OpenModeOverride(*mode),
        },
    }
}
