//! Cross-round scoring
//!
//! This module keeps the cumulative point tally of every participant for the
//! lifetime of the process and produces ranked snapshots of it. Points only
//! grow, one per correct first answer, until an operator clears the board.

use std::collections::HashMap;

use itertools::Itertools;
use serde::Serialize;

use super::{TruncatedVec, participant::ParticipantId};

/// Score information for a single participant
///
/// Contains the participant's total points and their position in the
/// ranking (0-indexed).
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct ScoreMessage {
    /// Total points earned by the participant
    pub points: u64,
    /// Current position in the ranking (0 is first)
    pub position: usize,
}

/// One row of a ranked snapshot
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct Standing {
    /// The participant
    pub participant: ParticipantId,
    /// Their total points
    pub points: u64,
}

/// Cumulative points per participant
///
/// Entries remember the order in which participants first scored, which is
/// used to break ties deterministically.
#[derive(Debug, Default, Clone)]
pub struct Scoreboard {
    /// Points per participant, in first-scored order
    entries: Vec<(ParticipantId, u64)>,
    /// Index of each participant in `entries`
    index: HashMap<ParticipantId, usize>,
}

impl Scoreboard {
    /// Adds one point to a participant
    ///
    /// # Returns
    ///
    /// The participant's new total
    pub fn increment(&mut self, participant: ParticipantId) -> u64 {
        let position = *self.index.entry(participant).or_insert_with(|| {
            self.entries.push((participant, 0));
            self.entries.len() - 1
        });

        let (_, points) = &mut self.entries[position];
        *points += 1;
        *points
    }

    /// Returns a participant's points, zero if they never scored
    pub fn points(&self, participant: ParticipantId) -> u64 {
        self.index
            .get(&participant)
            .map_or(0, |position| self.entries[*position].1)
    }

    /// Returns every participant ranked by points, highest first
    ///
    /// Participants with equal points keep the order in which they first
    /// scored.
    pub fn ranked(&self) -> Vec<Standing> {
        self.entries
            .iter()
            .enumerate()
            .sorted_by_key(|(order, (_, points))| (std::cmp::Reverse(*points), *order))
            .map(|(_, (participant, points))| Standing {
                participant: *participant,
                points: *points,
            })
            .collect_vec()
    }

    /// Returns the ranking truncated for display
    ///
    /// # Arguments
    ///
    /// * `limit` - Maximum number of rows kept
    pub fn ranked_truncated(&self, limit: usize) -> TruncatedVec<Standing> {
        TruncatedVec::new(self.ranked().into_iter(), limit, self.entries.len())
    }

    /// Gets the points and ranking position of a participant
    ///
    /// # Returns
    ///
    /// `None` if the participant never scored
    pub fn score(&self, participant: ParticipantId) -> Option<ScoreMessage> {
        self.ranked()
            .iter()
            .find_position(|standing| standing.participant == participant)
            .map(|(position, standing)| ScoreMessage {
                points: standing.points,
                position,
            })
    }

    /// Number of participants on the board
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nobody has scored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every participant from the board
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}
