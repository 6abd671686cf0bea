/*!
Multi-seat instant-runoff tabulation.

The [`Tabulator`] owns the ballots of one election and runs elimination rounds
until all the seats are filled. Every fact of a round (tally, eliminated
candidate, winners) is sent to a [`Reporter`]; nothing is printed by the
library itself.

```
use rcv_tabulation::*;

let ballots = vec![
    vec!["Anna".to_string(), "Bob".to_string()],
    vec!["Anna".to_string(), "Bob".to_string()],
    vec!["Bob".to_string(), "Anna".to_string()],
];
let mut tabulator = Tabulator::from_ballots(&ballots, None, "Treasurer", 1)?;
let mut events: Vec<ElectionEvent> = Vec::new();
let winners = tabulator.conduct_election(&mut events)?;
assert_eq!(winners, ["Anna".to_string()]);
# Ok::<(), TabulationErrors>(())
```

See the [manual] for the exact rules.
*/

pub mod builder;
mod config;
pub mod manual;
mod reporter;

use log::{debug, info, warn};

use std::{
    collections::{HashMap, HashSet},
    ops::{Add, AddAssign},
};

pub use crate::config::*;
pub use crate::reporter::*;

// **** Private structures ****

type RoundId = u32;

// Index into the candidate list of the tabulator.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct CandidateId(u32);

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct VoteCount(u64);

impl VoteCount {
    const EMPTY: VoteCount = VoteCount(0);
}

impl std::iter::Sum for VoteCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        VoteCount(iter.map(|vc| vc.0).sum())
    }
}

impl AddAssign for VoteCount {
    fn add_assign(&mut self, rhs: VoteCount) {
        self.0 += rhs.0;
    }
}

impl Add for VoteCount {
    type Output = VoteCount;
    fn add(self: VoteCount, rhs: VoteCount) -> VoteCount {
        VoteCount(self.0 + rhs.0)
    }
}

// Invariant: ranks is never empty and count is never zero, once spoiled
// ballots have been discarded at the end of a round.
#[derive(Eq, PartialEq, Debug, Clone)]
struct VoteInternal {
    ranks: Vec<CandidateId>,
    count: VoteCount,
}

#[derive(Eq, PartialEq, Debug, Clone)]
struct ElectionState {
    seats_remaining: u32,
    round: RoundId,
    winners: Vec<String>,
    winner_exists: bool,
}

/// Runs one election over a set of ranked ballots.
#[derive(Debug, Clone)]
pub struct Tabulator {
    votes: Vec<VoteInternal>,
    // In order of first appearance in the ballots. This is also the tiebreak order.
    candidates: Vec<String>,
    protected_name: Option<String>,
    // None if the protected candidate is not on any ballot.
    protected_candidate: Option<CandidateId>,
    election_name: String,
    num_of_winners: u32,
    win_number: VoteCount,
    state: ElectionState,
}

impl Tabulator {
    /// Creates a new election.
    ///
    /// Arguments:
    /// * `votes` the ballots, with their weights. Empty ballots are discarded.
    /// * `protected_candidate` a candidate that is skipped when it would be
    /// eliminated with the fewest votes. An empty name means no protected candidate.
    /// * `election_name` the name of the office being sought
    /// * `num_of_winners` the number of seats, at least 1 and at most the number of candidates
    pub fn new(
        votes: &[Vote],
        protected_candidate: Option<&str>,
        election_name: &str,
        num_of_winners: u32,
    ) -> Result<Tabulator, TabulationErrors> {
        if num_of_winners == 0 {
            return Err(TabulationErrors::InvalidArgument(
                "the number of winners must be positive".to_string(),
            ));
        }

        let mut candidates: Vec<String> = Vec::new();
        let mut candidate_ids: HashMap<String, CandidateId> = HashMap::new();
        let mut internal_votes: Vec<VoteInternal> = Vec::new();
        for v in votes.iter() {
            if v.count == 0 || v.candidates.is_empty() {
                debug!("Tabulator::new: discarding spoiled ballot {:?}", v);
                continue;
            }
            let mut ranks: Vec<CandidateId> = Vec::with_capacity(v.candidates.len());
            for name in v.candidates.iter() {
                let cid = *candidate_ids.entry(name.clone()).or_insert_with(|| {
                    candidates.push(name.clone());
                    CandidateId((candidates.len() - 1) as u32)
                });
                ranks.push(cid);
            }
            internal_votes.push(VoteInternal {
                ranks,
                count: VoteCount(v.count),
            });
        }

        if num_of_winners as usize > candidates.len() {
            return Err(TabulationErrors::InvalidArgument(format!(
                "{} winners requested but the ballots only name {} candidates",
                num_of_winners,
                candidates.len()
            )));
        }

        let total_count: VoteCount = internal_votes.iter().map(|v| v.count).sum();
        let win_number = VoteCount(total_count.0 / 2 + 1);

        let protected_name = protected_candidate
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());
        let protected_cid = protected_name
            .as_ref()
            .and_then(|name| candidate_ids.get(name).cloned());
        if protected_name.is_some() && protected_cid.is_none() {
            warn!(
                "Tabulator::new: protected candidate {:?} does not appear on any ballot",
                protected_name
            );
        }

        debug!(
            "Tabulator::new: {} ballots (total weight {}), candidates: {:?}",
            internal_votes.len(),
            total_count.0,
            candidates
        );

        Ok(Tabulator {
            votes: internal_votes,
            candidates,
            protected_name,
            protected_candidate: protected_cid,
            election_name: election_name.to_string(),
            num_of_winners,
            win_number,
            state: ElectionState {
                seats_remaining: num_of_winners,
                round: 1,
                winners: Vec::new(),
                winner_exists: false,
            },
        })
    }

    /// Creates an election where each ballot counts once.
    pub fn from_ballots(
        ballots: &[Vec<String>],
        protected_candidate: Option<&str>,
        election_name: &str,
        num_of_winners: u32,
    ) -> Result<Tabulator, TabulationErrors> {
        let votes: Vec<Vote> = ballots
            .iter()
            .map(|b| Vote {
                candidates: b.clone(),
                count: 1,
            })
            .collect();
        Tabulator::new(&votes, protected_candidate, election_name, num_of_winners)
    }

    pub fn winner_exists(&self) -> bool {
        self.state.winner_exists
    }

    /// The winners, in the order they were confirmed.
    pub fn winners(&self) -> &[String] {
        &self.state.winners
    }

    pub fn number_of_confirmed_winners(&self) -> usize {
        self.state.winners.len()
    }

    pub fn election_name(&self) -> &str {
        &self.election_name
    }

    pub fn num_of_winners(&self) -> u32 {
        self.num_of_winners
    }

    /// Simple majority of the ballots cast at construction. It never changes afterwards.
    pub fn win_number(&self) -> u64 {
        self.win_number.0
    }

    pub fn protected_candidate(&self) -> Option<&str> {
        self.protected_name.as_deref()
    }

    /// All the candidates named on the ballots, in order of first appearance.
    pub fn candidate_list(&self) -> &[String] {
        &self.candidates
    }

    pub fn round(&self) -> u32 {
        self.state.round
    }

    pub fn seats_remaining(&self) -> u32 {
        self.state.seats_remaining
    }

    /// The first-preference counts of the current ballots, highest first.
    pub fn current_tally(&self) -> Vec<(String, u64)> {
        let remaining = self.remaining_candidates();
        self.named_tally(&self.compute_tally(&remaining))
    }

    /// Runs rounds until all the seats are filled and returns the winners.
    ///
    /// Calling it again on a finished election returns the same winners and
    /// does not report anything.
    pub fn conduct_election(
        &mut self,
        reporter: &mut dyn Reporter,
    ) -> Result<&[String], TabulationErrors> {
        if self.state.winner_exists {
            return Ok(&self.state.winners);
        }
        info!(
            "conduct_election: {:?}, winners: {}, win number: {}",
            self.election_name, self.num_of_winners, self.win_number.0
        );
        reporter.report(&ElectionEvent::Start {
            election_name: self.election_name.clone(),
            num_of_winners: self.num_of_winners,
            win_number: self.win_number.0,
        });

        while self.state.seats_remaining > 0 {
            self.run_one_round(reporter)?;
            self.remove_spoiled_ballots();
            self.state.round += 1;
        }

        self.state.winner_exists = true;
        info!("conduct_election: winners: {:?}", self.state.winners);
        reporter.report(&ElectionEvent::ElectionComplete {
            winners: self.state.winners.clone(),
        });
        Ok(&self.state.winners)
    }

    fn run_one_round(&mut self, reporter: &mut dyn Reporter) -> Result<(), TabulationErrors> {
        let round = self.state.round;
        let seats = self.state.seats_remaining as usize;
        let remaining = self.remaining_candidates();
        info!(
            "Round {}: {} candidates left, {} seats to fill",
            round,
            remaining.len(),
            seats
        );
        reporter.report(&ElectionEvent::RoundStart {
            round,
            candidates_left: remaining.len(),
        });
        if remaining.is_empty() {
            warn!("run_one_round: no candidate left in round {}", round);
            return Err(TabulationErrors::ElectionStalled { round });
        }

        let tally = self.compute_tally(&remaining);
        debug!("run_one_round: tally: {:?}", tally);
        reporter.report(&ElectionEvent::Tally {
            round,
            counts: self.named_tally(&tally),
        });

        let over_threshold: Vec<CandidateId> = tally
            .iter()
            .filter(|(_, vc)| *vc >= self.win_number)
            .map(|(cid, _)| *cid)
            .collect();

        if !over_threshold.is_empty() {
            for cid in over_threshold.into_iter().take(seats) {
                self.confirm_winner(cid);
                reporter.report(&ElectionEvent::ThresholdWin {
                    round,
                    candidate: self.name(cid).to_string(),
                    spots_remaining: self.state.seats_remaining,
                });
            }
        } else if let Some(pc) = self.protected_candidate_in_last_at_end(&remaining, &tally) {
            debug!("run_one_round: protected candidate is last with the final seats open");
            self.eliminate(pc, round, reporter);
        } else if remaining.len() <= seats {
            // Only reachable after the protected candidate was removed at the end.
            for (cid, _) in tally.iter() {
                self.confirm_winner(*cid);
                reporter.report(&ElectionEvent::FinalWin {
                    round,
                    candidate: self.name(*cid).to_string(),
                });
            }
        } else if remaining.len() - 1 == seats {
            self.final_candidates_round(&tally, round, reporter)?;
        } else {
            self.conduct_round(&tally, round, reporter)?;
        }
        Ok(())
    }

    // One more candidate than seats: the last one is out and everybody else wins.
    fn final_candidates_round(
        &mut self,
        tally: &[(CandidateId, VoteCount)],
        round: RoundId,
        reporter: &mut dyn Reporter,
    ) -> Result<(), TabulationErrors> {
        let ((loser, _), rest) = tally
            .split_last()
            .ok_or(TabulationErrors::ElectionStalled { round })?;
        self.eliminate(*loser, round, reporter);
        for (cid, _) in rest.iter() {
            self.confirm_winner(*cid);
            reporter.report(&ElectionEvent::FinalWin {
                round,
                candidate: self.name(*cid).to_string(),
            });
        }
        Ok(())
    }

    fn conduct_round(
        &mut self,
        tally: &[(CandidateId, VoteCount)],
        round: RoundId,
        reporter: &mut dyn Reporter,
    ) -> Result<(), TabulationErrors> {
        let with_votes: Vec<CandidateId> = tally
            .iter()
            .filter(|(_, vc)| *vc > VoteCount::EMPTY)
            .map(|(cid, _)| *cid)
            .collect();

        // Runoff between the last two candidates holding votes: the higher one
        // wins this round even below the win number.
        if let [first, second] = with_votes.as_slice() {
            debug!("conduct_round: runoff between {:?} and {:?}", first, second);
            self.eliminate(*second, round, reporter);
            self.confirm_winner(*first);
            reporter.report(&ElectionEvent::RoundWin {
                round,
                candidate: self.name(*first).to_string(),
            });
            return Ok(());
        }

        let fewest = self
            .candidate_with_fewest(tally)
            .ok_or(TabulationErrors::ElectionStalled { round })?;
        self.eliminate(fewest, round, reporter);
        Ok(())
    }

    // The last candidate of the tally, or the one before it if the last one is protected.
    fn candidate_with_fewest(&self, tally: &[(CandidateId, VoteCount)]) -> Option<CandidateId> {
        let mut from_last = tally.iter().rev().map(|(cid, _)| *cid);
        let fewest = from_last.next()?;
        if Some(fewest) == self.protected_candidate {
            if let Some(second_fewest) = from_last.next() {
                debug!(
                    "candidate_with_fewest: skipping protected candidate {:?}",
                    self.protected_name
                );
                return Some(second_fewest);
            }
        }
        Some(fewest)
    }

    fn protected_candidate_in_last_at_end(
        &self,
        remaining: &[CandidateId],
        tally: &[(CandidateId, VoteCount)],
    ) -> Option<CandidateId> {
        let pc = self.protected_candidate?;
        if self.num_of_winners > 1
            && remaining.len() == self.state.seats_remaining as usize + 1
            && tally.last().map(|(cid, _)| *cid) == Some(pc)
        {
            Some(pc)
        } else {
            None
        }
    }

    fn eliminate(&mut self, cid: CandidateId, round: RoundId, reporter: &mut dyn Reporter) {
        self.remove_candidate(cid);
        reporter.report(&ElectionEvent::Elimination {
            round,
            candidate: self.name(cid).to_string(),
        });
    }

    fn confirm_winner(&mut self, cid: CandidateId) {
        self.state.winners.push(self.name(cid).to_string());
        self.remove_candidate(cid);
        self.state.seats_remaining -= 1;
    }

    // Removes every occurrence of the candidate. The other preferences keep their order.
    fn remove_candidate(&mut self, cid: CandidateId) {
        for v in self.votes.iter_mut() {
            v.ranks.retain(|c| *c != cid);
        }
    }

    fn remove_spoiled_ballots(&mut self) {
        let before = self.votes.len();
        self.votes.retain(|v| !v.ranks.is_empty());
        if self.votes.len() < before {
            debug!(
                "remove_spoiled_ballots: {} ballots exhausted",
                before - self.votes.len()
            );
        }
    }

    // The candidates still on some ballot, in candidate order.
    fn remaining_candidates(&self) -> Vec<CandidateId> {
        let present: HashSet<CandidateId> = self
            .votes
            .iter()
            .flat_map(|v| v.ranks.iter().cloned())
            .collect();
        (0..self.candidates.len() as u32)
            .map(CandidateId)
            .filter(|cid| present.contains(cid))
            .collect()
    }

    // Every remaining candidate, including the ones without a first preference,
    // by decreasing count. Ties keep the candidate order.
    fn compute_tally(&self, remaining: &[CandidateId]) -> Vec<(CandidateId, VoteCount)> {
        let mut counts: HashMap<CandidateId, VoteCount> = remaining
            .iter()
            .map(|cid| (*cid, VoteCount::EMPTY))
            .collect();
        for v in self.votes.iter() {
            if let Some(vc) = v.ranks.first().and_then(|cid| counts.get_mut(cid)) {
                *vc += v.count;
            }
        }
        let mut tally: Vec<(CandidateId, VoteCount)> = remaining
            .iter()
            .map(|cid| (*cid, counts.get(cid).cloned().unwrap_or(VoteCount::EMPTY)))
            .collect();
        tally.sort_by(|a, b| b.1.cmp(&a.1));
        tally
    }

    fn named_tally(&self, tally: &[(CandidateId, VoteCount)]) -> Vec<(String, u64)> {
        tally
            .iter()
            .map(|(cid, vc)| (self.name(*cid).to_string(), vc.0))
            .collect()
    }

    fn name(&self, cid: CandidateId) -> &str {
        &self.candidates[cid.0 as usize]
    }
}

/// Runs the election for the given votes and rules, logging each round.
///
/// Arguments:
/// * `votes` the collection of votes to process
/// * `rules` the rules that govern this election
pub fn run_election(
    votes: &[Vote],
    rules: &ElectionRules,
) -> Result<ElectionSummary, TabulationErrors> {
    info!("run_election: Processing {} votes", votes.len());
    let mut tabulator = Tabulator::new(
        votes,
        rules.protected_candidate.as_deref(),
        &rules.election_name,
        rules.number_of_winners,
    )?;
    let mut reporter = (LogReporter, SummaryReporter::new());
    tabulator.conduct_election(&mut reporter)?;
    Ok(reporter.1.into_summary())
}
