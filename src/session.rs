//! Round lifecycle state machine
//!
//! The session owns the single live round of a chat and the scoreboard. It
//! is synchronous and performs no I/O: callers hold it behind one lock, feed
//! it operations and alarms, and publish whatever it returns once the lock
//! is released.
//!
//! ```text
//! Idle -> Active -> HintGiven -> Ended -> Idle
//! ```
//!
//! `Ended` is transient: concluding a round reports the results and leaves
//! the session idle in the same step.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    error::Error,
    leaderboard::{Scoreboard, Standing},
    participant::ParticipantId,
    round::{AnswerOutcome, Phase, QuestionMessage, Round, RoundId},
    scheduler::{AlarmKind, AlarmMessage},
};

/// Observable state of a session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SessionState {
    /// No round is running
    Idle,
    /// A round is running and its hint has not been revealed
    Active,
    /// A round is running and its hint has been revealed
    HintGiven,
    /// A round has been closed and its results are being published
    Ended,
}

impl From<Phase> for SessionState {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Active => Self::Active,
            Phase::HintGiven => Self::HintGiven,
            Phase::Ended => Self::Ended,
        }
    }
}

/// The results of a concluded round
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevealMessage {
    /// The round that ended
    pub round: RoundId,
    /// The correct answer
    pub answer: String,
    /// Participants who answered correctly, first correct first
    pub winners: Vec<ParticipantId>,
    /// Scoreboard snapshot taken after the round
    pub leaderboard: Vec<Standing>,
}

/// Announcements produced by alarms and operator actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Announcement {
    /// The hint for a round
    Hint {
        /// The round the hint belongs to
        round: RoundId,
        /// Title of the character's source work
        source_title: String,
    },
    /// The end of a round
    Reveal(RevealMessage),
}

/// The round slot and scoreboard of one chat
#[derive(Debug, Default)]
pub struct Session {
    round: Option<Round>,
    scoreboard: Scoreboard,
}

impl Session {
    /// Current observable state
    pub fn state(&self) -> SessionState {
        self.round
            .as_ref()
            .map_or(SessionState::Idle, |round| round.phase().into())
    }

    /// The live round, if any
    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    /// The cumulative scoreboard
    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    /// Installs a freshly built round and arms its alarms
    ///
    /// This is the compare-and-set step of starting a round: it succeeds only
    /// if the session is still idle.
    ///
    /// # Arguments
    ///
    /// * `round` - The round to install
    /// * `hint_delay` - Delay of the hint alarm
    /// * `end_delay` - Delay of the end alarm
    /// * `schedule_message` - Function to arm a delayed alarm
    ///
    /// # Errors
    ///
    /// Returns `Error::RoundAlreadyActive` if a round is already live; the
    /// live round is left untouched and no alarm is armed.
    pub fn install<S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        round: Round,
        hint_delay: Duration,
        end_delay: Duration,
        mut schedule_message: S,
    ) -> Result<QuestionMessage, Error> {
        if self.round.is_some() {
            return Err(Error::RoundAlreadyActive);
        }

        let id = round.id();
        let question = round.question();

        info!(round = %id, "Round started");
        debug!(round = %id, answer = %round.candidate().name, "Round candidate");

        self.round = Some(round);

        schedule_message(
            AlarmMessage {
                round: id,
                kind: AlarmKind::Hint,
            },
            hint_delay,
        );
        schedule_message(
            AlarmMessage {
                round: id,
                kind: AlarmKind::End,
            },
            end_delay,
        );

        Ok(question)
    }

    /// Records a participant's answer and scores it
    ///
    /// # Errors
    ///
    /// * `Error::NoActiveRound` if no round is live
    /// * `Error::AlreadyAnswered` if the participant already answered this round
    pub fn submit_answer(
        &mut self,
        participant: ParticipantId,
        chosen: &str,
    ) -> Result<AnswerOutcome, Error> {
        let round = self.round.as_mut().ok_or(Error::NoActiveRound)?;
        let outcome = round.submit(participant, chosen)?;

        if outcome == AnswerOutcome::Correct {
            self.scoreboard.increment(participant);
        }

        debug!(round = %round.id(), %participant, ?outcome, "Answer recorded");

        Ok(outcome)
    }

    /// Handles a fired alarm
    ///
    /// Alarms armed for a round that is no longer live are ignored, as is a
    /// hint alarm for a round whose hint was already given.
    ///
    /// # Returns
    ///
    /// The announcement to publish, if the alarm caused a transition
    pub fn receive_alarm(&mut self, alarm: AlarmMessage) -> Option<Announcement> {
        if self.round.as_ref().map(Round::id) != Some(alarm.round) {
            debug!(round = %alarm.round, kind = ?alarm.kind, "Stale alarm ignored");
            return None;
        }

        match alarm.kind {
            AlarmKind::Hint => self.give_hint(),
            AlarmKind::End => self.conclude().map(Announcement::Reveal),
        }
    }

    /// Reveals the hint of the live round
    fn give_hint(&mut self) -> Option<Announcement> {
        let round = self.round.as_mut()?;
        let id = round.id();
        let source_title = round.give_hint()?.to_owned();

        info!(round = %id, "Hint given");

        Some(Announcement::Hint {
            round: id,
            source_title,
        })
    }

    /// Closes the live round and returns the session to idle
    ///
    /// # Returns
    ///
    /// The round's results, or `None` if no round was live
    pub fn conclude(&mut self) -> Option<RevealMessage> {
        let mut round = self.round.take()?;
        round.conclude();

        info!(
            round = %round.id(),
            answers = round.answer_count(),
            winners = round.winners().len(),
            "Round ended"
        );

        Some(RevealMessage {
            round: round.id(),
            answer: round.candidate().name.clone(),
            winners: round.winners().to_vec(),
            leaderboard: self.scoreboard.ranked(),
        })
    }

    /// Removes a round whose question could not be published
    ///
    /// Nothing happens if the live round is a different one.
    ///
    /// # Returns
    ///
    /// `true` if the round was removed
    pub fn withdraw(&mut self, id: RoundId) -> bool {
        if self.round.as_ref().map(Round::id) == Some(id) {
            self.round = None;
            info!(round = %id, "Round withdrawn");
            true
        } else {
            false
        }
    }

    /// Ranked scoreboard snapshot
    pub fn leaderboard(&self) -> Vec<Standing> {
        self.scoreboard.ranked()
    }

    /// Clears the scoreboard without touching the live round
    pub fn reset_scoreboard(&mut self) {
        self.scoreboard.clear();
        info!("Scoreboard reset");
    }
}
