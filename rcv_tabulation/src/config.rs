// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// A ranked ballot, most preferred candidate first.
///
/// `count` is the number of identical ballots this vote stands for.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Vote {
    pub candidates: Vec<String>,
    pub count: u64,
}

impl Vote {
    pub fn single(candidates: &[&str]) -> Vote {
        Vote {
            candidates: candidates.iter().map(|s| s.to_string()).collect(),
            count: 1,
        }
    }
}

// ******** Output data structures *********

/// The facts emitted by the tabulator, once per event, while an election runs.
///
/// Presentation is left entirely to the [`crate::Reporter`] that receives them.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ElectionEvent {
    Start {
        election_name: String,
        num_of_winners: u32,
        win_number: u64,
    },
    RoundStart {
        round: u32,
        candidates_left: usize,
    },
    /// First-preference counts, highest first.
    Tally {
        round: u32,
        counts: Vec<(String, u64)>,
    },
    /// A candidate reached the win number.
    ThresholdWin {
        round: u32,
        candidate: String,
        spots_remaining: u32,
    },
    Elimination {
        round: u32,
        candidate: String,
    },
    /// The higher of the last two candidates holding votes.
    RoundWin {
        round: u32,
        candidate: String,
    },
    /// A winner confirmed while resolving the last open seats.
    FinalWin {
        round: u32,
        candidate: String,
    },
    ElectionComplete {
        winners: Vec<String>,
    },
}

/// Statistics for one round
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoundStats {
    pub round: u32,
    pub tally: Vec<(String, u64)>,
    pub elected: Vec<String>,
    pub eliminated: Vec<String>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ElectionSummary {
    pub election_name: String,
    pub number_of_winners: u32,
    pub win_number: u64,
    pub winners: Vec<String>,
    pub round_stats: Vec<RoundStats>,
}

/// Errors that prevent the algorithm from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TabulationErrors {
    /// The election cannot be set up with the given inputs.
    InvalidArgument(String),
    /// A round found no candidate left to act on while seats were still open.
    ElectionStalled { round: u32 },
}

impl Error for TabulationErrors {}

impl Display for TabulationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TabulationErrors::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            TabulationErrors::ElectionStalled { round } => {
                write!(f, "election stalled in round {}: no candidate left", round)
            }
        }
    }
}

// ********* Configuration **********

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ElectionRules {
    /// Name of the office being sought.
    pub election_name: String,
    pub number_of_winners: u32,
    /// A candidate (for example "No Endorsement") that is skipped over when it
    /// would otherwise be the one eliminated.
    pub protected_candidate: Option<String>,
}

impl ElectionRules {
    pub const DEFAULT_RULES: ElectionRules = ElectionRules {
        election_name: String::new(),
        number_of_winners: 1,
        protected_candidate: None,
    };
}
