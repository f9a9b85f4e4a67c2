use std::fmt;

/// Lifecycle of one candidate within a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateState {
    Buffered,
    Uploading,
    Uploaded,
    UploadFailed,
    /// Removed again by rollback
    Deleted,
}

impl CandidateState {
    pub fn can_transition_to(self, next: CandidateState) -> bool {
        use CandidateState::*;
        matches!(
            (self, next),
            (Buffered, Uploading)
                | (Uploading, Uploaded)
                | (Uploading, UploadFailed)
                | (Uploaded, Deleted)
        )
    }

    /// States a candidate may end a batch in. `Uploaded` is terminal only when
    /// the batch succeeded or its rollback deletion failed.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CandidateState::Uploaded | CandidateState::UploadFailed | CandidateState::Deleted
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateState::Buffered => "buffered",
            CandidateState::Uploading => "uploading",
            CandidateState::Uploaded => "uploaded",
            CandidateState::UploadFailed => "upload_failed",
            CandidateState::Deleted => "deleted",
        }
    }

    /// Move to `next`, logging the change. Illegal edges trip a debug assertion.
    pub(crate) fn advance(&mut self, next: CandidateState, file_name: &str) {
        debug_assert!(
            self.can_transition_to(next),
            "illegal state transition {} -> {} for {}",
            self,
            next,
            file_name
        );
        tracing::debug!(
            file_name = %file_name,
            from = %self,
            to = %next,
            "Candidate state changed"
        );
        *self = next;
    }
}

impl fmt::Display for CandidateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
