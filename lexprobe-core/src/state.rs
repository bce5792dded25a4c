use std::fmt;

/// Where a probe is within its trial, derived from which timestamps are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Idle,
    PlayRequested,
    OnsetMarked,
    Responded,
}

/// The measurement points a trial driver reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    PlayRequest,
    Onset,
    Response,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Hook::PlayRequest => "play request",
            Hook::Onset => "onset",
            Hook::Response => "response",
        })
    }
}
