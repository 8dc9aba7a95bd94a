//! Candidate vote collection.
//!
//! Votes are kept per candidate as a set of voter ids, so a voter can back
//! a candidate at most once no matter how the other votes interleave.

use std::collections::{BTreeSet, HashMap};
use surety_core::LedgerError;
use surety_types::Principal;

/// Required votes for `percent`% of `registered` airlines, rounded up.
pub fn quorum(percent: u32, registered: usize) -> usize {
    (percent as usize * registered).div_ceil(100)
}

/// Tracks which airlines have voted for which candidate.
#[derive(Debug, Default)]
pub struct CandidateVotes {
    /// candidate -> voters
    by_candidate: HashMap<Principal, BTreeSet<Principal>>,
}

impl CandidateVotes {
    /// Create a new empty vote collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a vote would be accepted, without recording it.
    pub fn check(&self, candidate: &Principal, voter: &Principal) -> Result<(), LedgerError> {
        if self.is_voter_of(candidate, voter) {
            return Err(LedgerError::DuplicateVote);
        }
        Ok(())
    }

    /// Record `voter`'s vote for `candidate`.
    ///
    /// Returns the candidate's vote count after the vote.
    pub fn cast(&mut self, candidate: Principal, voter: Principal) -> Result<usize, LedgerError> {
        self.check(&candidate, &voter)?;
        let voters = self.by_candidate.entry(candidate).or_default();
        voters.insert(voter);
        Ok(voters.len())
    }

    /// Number of votes a candidate holds.
    pub fn votes(&self, candidate: &Principal) -> usize {
        self.by_candidate.get(candidate).map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_voter_of(&self, candidate: &Principal, voter: &Principal) -> bool {
        self.by_candidate
            .get(candidate)
            .is_some_and(|voters| voters.contains(voter))
    }

    /// Drop every vote for a candidate (after it is elected).
    pub fn clear(&mut self, candidate: &Principal) {
        self.by_candidate.remove(candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quorum_rounds_up() {
        assert_eq!(quorum(50, 4), 2);
        assert_eq!(quorum(50, 5), 3);
        assert_eq!(quorum(66, 3), 2);
        assert_eq!(quorum(100, 7), 7);
        assert_eq!(quorum(0, 7), 0);
    }

    #[test]
    fn test_duplicate_vote_rejected_and_count_unchanged() {
        let candidate = Principal::from_label("candidate");
        let alice = Principal::from_label("alice");
        let bob = Principal::from_label("bob");
        let mut votes = CandidateVotes::new();

        assert_eq!(votes.cast(candidate, alice), Ok(1));
        assert_eq!(votes.cast(candidate, bob), Ok(2));
        assert_eq!(votes.cast(candidate, alice), Err(LedgerError::DuplicateVote));
        assert_eq!(votes.votes(&candidate), 2);
        assert!(votes.is_voter_of(&candidate, &bob));
    }

    #[test]
    fn test_clear_forgets_voters() {
        let candidate = Principal::from_label("candidate");
        let alice = Principal::from_label("alice");
        let mut votes = CandidateVotes::new();

        votes.cast(candidate, alice).unwrap();
        votes.clear(&candidate);
        assert_eq!(votes.votes(&candidate), 0);
        assert!(!votes.is_voter_of(&candidate, &alice));
    }
}
