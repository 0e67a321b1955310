/// Resource state definitions for tracking collection progress
///
/// Each resource moves through a small state machine while it is paginated.
use std::fmt;

/// Represents the current state of one resource's collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceState {
    // ===== Active States =====
    /// Collector created, nothing requested yet
    Init,

    /// Page 1 is being fetched; the page count is still unknown
    FetchingFirst,

    /// Remaining pages are being fetched into the buffer
    Accumulating,

    /// The complete buffer is being handed to the sink
    Flushing,

    // ===== Terminal States =====
    /// All pages fetched and the batch was flushed
    Done,

    /// A fetch failed, the flush failed, or the run was cancelled
    Failed,
}

impl ResourceState {
    /// Returns true if no further transitions are possible
    #[cfg(test)]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if this represents a successful completion
    #[cfg(test)]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if moving from `self` to `next` is allowed
    pub fn can_transition_to(&self, next: ResourceState) -> bool {
        use ResourceState::*;
        matches!(
            (self, next),
            (Init, FetchingFirst)
                | (FetchingFirst, Accumulating)
                | (FetchingFirst, Failed)
                | (Accumulating, Accumulating)
                | (Accumulating, Flushing)
                | (Accumulating, Failed)
                | (Flushing, Done)
                | (Flushing, Failed)
        )
    }

    /// Short lowercase name, used in logs and the SQLite store
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::FetchingFirst => "fetching_first",
            Self::Accumulating => "accumulating",
            Self::Flushing => "flushing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible resource states
    #[cfg(test)]
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Init,
            Self::FetchingFirst,
            Self::Accumulating,
            Self::Flushing,
            Self::Done,
            Self::Failed,
        ]
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
