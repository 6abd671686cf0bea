use log::info;

use crate::config::*;

/// Receives the events of an election as they happen.
pub trait Reporter {
    fn report(&mut self, event: &ElectionEvent);
}

/// Records all the events, in order.
impl Reporter for Vec<ElectionEvent> {
    fn report(&mut self, event: &ElectionEvent) {
        self.push(event.clone());
    }
}

/// Forwards each event to both reporters.
impl<A: Reporter, B: Reporter> Reporter for (A, B) {
    fn report(&mut self, event: &ElectionEvent) {
        self.0.report(event);
        self.1.report(event);
    }
}

/// Writes the events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&mut self, event: &ElectionEvent) {
        match event {
            ElectionEvent::Start {
                election_name,
                num_of_winners,
                win_number,
            } => {
                info!(
                    "Election {:?}: {} winner(s), win number: {}",
                    election_name, num_of_winners, win_number
                );
            }
            ElectionEvent::RoundStart {
                round,
                candidates_left,
            } => {
                info!("Round {} ({} candidates left)", round, candidates_left);
            }
            ElectionEvent::Tally { counts, .. } => {
                for (name, count) in counts.iter() {
                    info!("{:>8} {}", count, name);
                }
            }
            ElectionEvent::ThresholdWin {
                candidate,
                spots_remaining,
                ..
            } => {
                info!(
                    "{} -> elected (threshold), spots remaining: {}",
                    candidate, spots_remaining
                );
            }
            ElectionEvent::Elimination { candidate, .. } => {
                info!("{} -> eliminated", candidate);
            }
            ElectionEvent::RoundWin { candidate, .. } => {
                info!("{} -> elected (won round)", candidate);
            }
            ElectionEvent::FinalWin { candidate, .. } => {
                info!("{} -> elected (last round)", candidate);
            }
            ElectionEvent::ElectionComplete { winners } => {
                info!("Winners: {:?}", winners);
            }
        }
    }
}

/// Assembles the per-round statistics of an election.
#[derive(Debug, Default, Clone)]
pub struct SummaryReporter {
    election_name: String,
    number_of_winners: u32,
    win_number: u64,
    winners: Vec<String>,
    rounds: Vec<RoundStats>,
}

impl SummaryReporter {
    pub fn new() -> SummaryReporter {
        SummaryReporter::default()
    }

    fn round_mut(&mut self, round: u32) -> &mut RoundStats {
        let is_new = self.rounds.last().map(|rs| rs.round) != Some(round);
        if is_new {
            self.rounds.push(RoundStats {
                round,
                tally: Vec::new(),
                elected: Vec::new(),
                eliminated: Vec::new(),
            });
        }
        // A round was pushed above if the list was empty.
        let idx = self.rounds.len() - 1;
        &mut self.rounds[idx]
    }

    pub fn into_summary(self) -> ElectionSummary {
        ElectionSummary {
            election_name: self.election_name,
            number_of_winners: self.number_of_winners,
            win_number: self.win_number,
            winners: self.winners,
            round_stats: self.rounds,
        }
    }
}

impl Reporter for SummaryReporter {
    fn report(&mut self, event: &ElectionEvent) {
        match event {
            ElectionEvent::Start {
                election_name,
                num_of_winners,
                win_number,
            } => {
                self.election_name = election_name.clone();
                self.number_of_winners = *num_of_winners;
                self.win_number = *win_number;
            }
            ElectionEvent::RoundStart { round, .. } => {
                self.round_mut(*round);
            }
            ElectionEvent::Tally { round, counts } => {
                self.round_mut(*round).tally = counts.clone();
            }
            ElectionEvent::ThresholdWin {
                round, candidate, ..
            }
            | ElectionEvent::RoundWin { round, candidate }
            | ElectionEvent::FinalWin { round, candidate } => {
                self.round_mut(*round).elected.push(candidate.clone());
            }
            ElectionEvent::Elimination { round, candidate } => {
                self.round_mut(*round).eliminated.push(candidate.clone());
            }
            ElectionEvent::ElectionComplete { winners } => {
                self.winners = winners.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_groups_events_by_round() {
        let events = vec![
            ElectionEvent::Start {
                election_name: "Treasurer".to_string(),
                num_of_winners: 1,
                win_number: 3,
            },
            ElectionEvent::RoundStart {
                round: 1,
                candidates_left: 3,
            },
            ElectionEvent::Tally {
                round: 1,
                counts: vec![("A".to_string(), 2), ("B".to_string(), 2), ("C".to_string(), 1)],
            },
            ElectionEvent::Elimination {
                round: 1,
                candidate: "C".to_string(),
            },
            ElectionEvent::RoundStart {
                round: 2,
                candidates_left: 2,
            },
            ElectionEvent::Tally {
                round: 2,
                counts: vec![("A".to_string(), 3), ("B".to_string(), 2)],
            },
            ElectionEvent::ThresholdWin {
                round: 2,
                candidate: "A".to_string(),
                spots_remaining: 0,
            },
            ElectionEvent::ElectionComplete {
                winners: vec!["A".to_string()],
            },
        ];
        let mut reporter = SummaryReporter::new();
        for e in events.iter() {
            reporter.report(e);
        }
        let summary = reporter.into_summary();
        assert_eq!(summary.election_name, "Treasurer");
        assert_eq!(summary.win_number, 3);
        assert_eq!(summary.winners, vec!["A".to_string()]);
        assert_eq!(summary.round_stats.len(), 2);
        assert_eq!(summary.round_stats[0].eliminated, vec!["C".to_string()]);
        assert!(summary.round_stats[0].elected.is_empty());
        assert_eq!(summary.round_stats[1].elected, vec!["A".to_string()]);
        assert_eq!(summary.round_stats[1].tally[0], ("A".to_string(), 3));
    }

    #[test]
    fn pair_forwards_to_both() {
        let mut pair = (Vec::<ElectionEvent>::new(), Vec::<ElectionEvent>::new());
        let e = ElectionEvent::ElectionComplete { winners: vec![] };
        pair.report(&e);
        assert_eq!(pair.0, vec![e.clone()]);
        assert_eq!(pair.1, vec![e]);
    }
}
