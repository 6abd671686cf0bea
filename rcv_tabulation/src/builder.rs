use log::{debug, warn};

pub use crate::config::*;
use crate::Tabulator;

/// A builder for adding votes.
///
/// ```
/// pub use rcv_tabulation::builder::Builder;
/// pub use rcv_tabulation::ElectionRules;
/// # use rcv_tabulation::TabulationErrors;
///
/// let mut builder = Builder::new(&ElectionRules::DEFAULT_RULES)?
///     .candidates(&["Anna".to_string(), "Bob".to_string()])?;
///
/// builder.add_vote_simple(&["Anna".to_string(), "Clara".to_string(), "".to_string()])?;
/// builder.add_vote(&["Bob".to_string(), "Anna".to_string()], 2)?;
///
/// let tabulator = builder.build()?;
/// assert_eq!(tabulator.win_number(), 2);
/// # Ok::<(), TabulationErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: ElectionRules,
    pub(crate) _candidates: Option<Vec<String>>,
    pub(crate) _votes: Vec<Vote>,
}

impl Builder {
    pub fn new(rules: &ElectionRules) -> Result<Builder, TabulationErrors> {
        Ok(Builder {
            _rules: rules.clone(),
            _candidates: None,
            _votes: Vec::new(),
        })
    }

    /// Declares the candidates. Names outside this list are then dropped from the ballots.
    pub fn candidates(self, cands: &[String]) -> Result<Builder, TabulationErrors> {
        if cands.iter().any(|c| c.is_empty()) {
            return Err(TabulationErrors::InvalidArgument(
                "candidate names cannot be empty".to_string(),
            ));
        }
        Ok(Builder {
            _rules: self._rules,
            _candidates: Some(cands.to_vec()),
            _votes: Vec::new(),
        })
    }

    /// Adds a vote to the builder.
    ///
    /// It is the simplest use case for most cases.
    pub fn add_vote_simple(&mut self, candidates: &[String]) -> Result<(), TabulationErrors> {
        self.add_vote(candidates, 1)
    }

    /// Adds a vote, with a weight attached to it.
    ///
    /// candidates: the choices made by the voter, in order. Blank choices are skipped.
    pub fn add_vote(&mut self, candidates: &[String], count: u64) -> Result<(), TabulationErrors> {
        let mut choices: Vec<String> = Vec::new();
        for c in candidates.iter() {
            if c.is_empty() {
                continue;
            }
            if let Some(valid_candidates) = self._candidates.as_deref() {
                if !valid_candidates.contains(c) {
                    warn!("add_vote: skipping undeclared candidate {:?}", c);
                    continue;
                }
            }
            choices.push(c.clone());
        }
        if choices.is_empty() || count == 0 {
            debug!("add_vote: dropping empty vote {:?}", candidates);
            return Ok(());
        }
        self._votes.push(Vote {
            candidates: choices,
            count,
        });
        Ok(())
    }

    pub fn votes(&self) -> &[Vote] {
        &self._votes
    }

    pub fn build(&self) -> Result<Tabulator, TabulationErrors> {
        Tabulator::new(
            &self._votes,
            self._rules.protected_candidate.as_deref(),
            &self._rules.election_name,
            self._rules.number_of_winners,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undeclared_and_blank_choices_are_skipped() {
        let mut builder = Builder::new(&ElectionRules::DEFAULT_RULES)
            .unwrap()
            .candidates(&["A".to_string(), "B".to_string()])
            .unwrap();
        builder
            .add_vote_simple(&["".to_string(), "X".to_string(), "B".to_string()])
            .unwrap();
        builder.add_vote_simple(&["X".to_string()]).unwrap();
        builder.add_vote(&["A".to_string()], 0).unwrap();
        assert_eq!(builder.votes(), &[Vote::single(&["B"])]);
    }

    #[test]
    fn build_uses_rules() {
        let rules = ElectionRules {
            election_name: "Board".to_string(),
            number_of_winners: 2,
            protected_candidate: Some("NE".to_string()),
        };
        let mut builder = Builder::new(&rules).unwrap();
        builder
            .add_vote(&["A".to_string(), "NE".to_string()], 3)
            .unwrap();
        builder.add_vote_simple(&["B".to_string()]).unwrap();
        let t = builder.build().unwrap();
        assert_eq!(t.election_name(), "Board");
        assert_eq!(t.num_of_winners(), 2);
        assert_eq!(t.protected_candidate(), Some("NE"));
        assert_eq!(t.win_number(), 3);
    }

    #[test]
    fn empty_candidate_name_rejected() {
        let res = Builder::new(&ElectionRules::DEFAULT_RULES)
            .unwrap()
            .candidates(&["".to_string()]);
        assert!(res.is_err());
    }
}
