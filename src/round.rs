//! A single question-and-answer cycle
//!
//! A round is built around one [`Candidate`]. It holds the shuffled options,
//! the timing of its hint and end, and the set of participants who already
//! answered. Only the first answer of each participant counts.

use std::{
    collections::HashSet,
    fmt::Display,
    time::Duration,
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use web_time::SystemTime;

use crate::{
    constants::round::OPTION_COUNT, error::Error, participant::ParticipantId,
};

/// A unique identifier for a round
///
/// Timers carry the id of the round they were armed for, so an alarm that
/// outlives its round can be recognised and dropped.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoundId(Uuid);

impl RoundId {
    /// Creates a new random round id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RoundId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RoundId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// An opaque reference to the picture shown with a question
///
/// Usually a URL; the transport decides how to deliver it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::From)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// The raw reference
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The character a round is built around
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Full name of the character, the correct answer
    pub name: String,
    /// Picture of the character
    pub image: ImageRef,
    /// Title of the work the character comes from, used as the hint
    pub source_title: String,
    /// Whether the source work satisfied the recency cutoff
    pub recent: bool,
}

/// Lifecycle phase of a live round
///
/// The idle state between rounds is the absence of a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Accepting answers, hint not yet revealed
    Active,
    /// Accepting answers, hint revealed
    HintGiven,
    /// Answer revealed, no more answers accepted
    Ended,
}

/// Result of an admitted answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnswerOutcome {
    /// The answer matched the character's name
    Correct,
    /// The answer did not match
    Incorrect,
}

/// What participants see when a round starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionMessage {
    /// The round the question belongs to
    pub round: RoundId,
    /// Picture of the character to guess
    pub image: ImageRef,
    /// Button labels in display order
    pub options: [String; OPTION_COUNT],
    /// How long participants have to answer
    pub answer_window: Duration,
}

/// Normalizes an answer for comparison
pub(crate) fn normalize(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// The single live round of a chat
#[derive(Debug, Clone)]
pub struct Round {
    id: RoundId,
    candidate: Candidate,
    correct_answer: String,
    options: [String; OPTION_COUNT],
    started_at: SystemTime,
    hint_at: SystemTime,
    end_at: SystemTime,
    phase: Phase,
    answered_by: HashSet<ParticipantId>,
    winners: Vec<ParticipantId>,
}

impl Round {
    /// Creates a round in the active phase, starting now
    ///
    /// # Arguments
    ///
    /// * `candidate` - The character to guess
    /// * `options` - The shuffled options, containing the candidate's name once
    /// * `hint_delay` - Time from start until the hint is revealed
    /// * `end_delay` - Time from start until the answer is revealed
    pub fn new(
        candidate: Candidate,
        options: [String; OPTION_COUNT],
        hint_delay: Duration,
        end_delay: Duration,
    ) -> Self {
        let started_at = SystemTime::now();

        Self {
            id: RoundId::new(),
            correct_answer: normalize(&candidate.name),
            candidate,
            options,
            started_at,
            hint_at: started_at + hint_delay,
            end_at: started_at + end_delay,
            phase: Phase::Active,
            answered_by: HashSet::new(),
            winners: Vec::new(),
        }
    }

    /// The round's id
    pub fn id(&self) -> RoundId {
        self.id
    }

    /// The character being guessed
    pub fn candidate(&self) -> &Candidate {
        &self.candidate
    }

    /// The options in display order
    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// When the round started
    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }

    /// When the hint is due
    pub fn hint_at(&self) -> SystemTime {
        self.hint_at
    }

    /// When the answer is due
    pub fn end_at(&self) -> SystemTime {
        self.end_at
    }

    /// Participants who answered correctly, first correct first
    pub fn winners(&self) -> &[ParticipantId] {
        &self.winners
    }

    /// Number of participants who answered at all
    pub fn answer_count(&self) -> usize {
        self.answered_by.len()
    }

    /// Whether the participant already used their answer
    pub fn has_answered(&self, participant: ParticipantId) -> bool {
        self.answered_by.contains(&participant)
    }

    /// Builds the question shown at the start of the round
    pub fn question(&self) -> QuestionMessage {
        QuestionMessage {
            round: self.id,
            image: self.candidate.image.clone(),
            options: self.options.clone(),
            answer_window: self
                .end_at
                .duration_since(self.started_at)
                .unwrap_or_default(),
        }
    }

    /// Attempts to move from one phase to another
    ///
    /// # Returns
    ///
    /// `true` if the round was in `before` and is now in `after`
    fn change_phase(&mut self, before: Phase, after: Phase) -> bool {
        if self.phase == before {
            self.phase = after;

            true
        } else {
            false
        }
    }

    /// Records a participant's answer
    ///
    /// The first answer of a participant is final. A correct answer appends
    /// the participant to the winners.
    ///
    /// # Errors
    ///
    /// * `Error::NoActiveRound` if the round has already ended
    /// * `Error::AlreadyAnswered` if the participant answered before
    pub fn submit(
        &mut self,
        participant: ParticipantId,
        chosen: &str,
    ) -> Result<AnswerOutcome, Error> {
        if self.phase == Phase::Ended {
            return Err(Error::NoActiveRound);
        }

        if !self.answered_by.insert(participant) {
            return Err(Error::AlreadyAnswered);
        }

        if normalize(chosen) == self.correct_answer {
            self.winners.push(participant);
            Ok(AnswerOutcome::Correct)
        } else {
            Ok(AnswerOutcome::Incorrect)
        }
    }

    /// Reveals the hint if it has not been revealed yet
    ///
    /// # Returns
    ///
    /// The source title if the round moved from active to hint-given,
    /// `None` if the hint was already given or the round has ended
    pub fn give_hint(&mut self) -> Option<&str> {
        if self.change_phase(Phase::Active, Phase::HintGiven) {
            Some(&self.candidate.source_title)
        } else {
            None
        }
    }

    /// Closes the round to further answers
    ///
    /// # Returns
    ///
    /// `true` if the round was still open
    pub fn conclude(&mut self) -> bool {
        self.change_phase(Phase::Active, Phase::Ended)
            || self.change_phase(Phase::HintGiven, Phase::Ended)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn asuna() -> Candidate {
        Candidate {
            name: "Asuna Yuuki".to_owned(),
            image: ImageRef::from("https://img.example/asuna.png".to_owned()),
            source_title: "Sword Art Online".to_owned(),
            recent: false,
        }
    }

    pub(crate) fn asuna_options() -> [String; OPTION_COUNT] {
        ["Rem", "Asuna Yuuki", "Levi", "Mikasa", "Naruto"].map(str::to_owned)
    }

    fn create_test_round() -> Round {
        Round::new(
            asuna(),
            asuna_options(),
            Duration::from_secs(120),
            Duration::from_secs(300),
        )
    }

    #[test]
    fn test_new_round_is_active() {
        let round = create_test_round();

        assert_eq!(round.phase(), Phase::Active);
        assert_eq!(round.answer_count(), 0);
        assert!(round.winners().is_empty());
        assert_eq!(
            round.hint_at().duration_since(round.started_at()).unwrap(),
            Duration::from_secs(120)
        );
        assert_eq!(
            round.end_at().duration_since(round.started_at()).unwrap(),
            Duration::from_secs(300)
        );
    }

    #[test]
    fn test_round_ids_are_unique() {
        assert_ne!(create_test_round().id(), create_test_round().id());
    }

    #[test]
    fn test_submit_is_case_insensitive() {
        let mut round = create_test_round();
        let player = ParticipantId::new(1);

        assert_eq!(round.submit(player, "  asuna YUUKI "), Ok(AnswerOutcome::Correct));
        assert_eq!(round.winners(), &[player]);
    }

    #[test]
    fn test_first_answer_is_final() {
        let mut round = create_test_round();
        let player = ParticipantId::new(1);

        assert_eq!(round.submit(player, "Levi"), Ok(AnswerOutcome::Incorrect));
        assert_eq!(round.submit(player, "Asuna Yuuki"), Err(Error::AlreadyAnswered));
        assert!(round.winners().is_empty());
        assert_eq!(round.answer_count(), 1);
    }

    #[test]
    fn test_winners_keep_answer_order() {
        let mut round = create_test_round();
        let first = ParticipantId::new(5);
        let second = ParticipantId::new(3);

        round.submit(first, "Asuna Yuuki").unwrap();
        round.submit(ParticipantId::new(9), "Rem").unwrap();
        round.submit(second, "Asuna Yuuki").unwrap();

        assert_eq!(round.winners(), &[first, second]);
    }

    #[test]
    fn test_hint_is_given_once() {
        let mut round = create_test_round();

        assert_eq!(round.give_hint(), Some("Sword Art Online"));
        assert_eq!(round.phase(), Phase::HintGiven);
        assert_eq!(round.give_hint(), None);
    }

    #[test]
    fn test_answers_still_accepted_after_hint() {
        let mut round = create_test_round();
        round.give_hint();

        assert_eq!(
            round.submit(ParticipantId::new(1), "Asuna Yuuki"),
            Ok(AnswerOutcome::Correct)
        );
    }

    #[test]
    fn test_concluded_round_rejects_answers_and_hint() {
        let mut round = create_test_round();

        assert!(round.conclude());
        assert!(!round.conclude());
        assert_eq!(round.give_hint(), None);
        assert_eq!(
            round.submit(ParticipantId::new(1), "Asuna Yuuki"),
            Err(Error::NoActiveRound)
        );
    }

    #[test]
    fn test_question_exposes_options_and_window() {
        let round = create_test_round();
        let question = round.question();

        assert_eq!(question.round, round.id());
        assert_eq!(question.options, asuna_options());
        assert_eq!(question.answer_window, Duration::from_secs(300));
        assert_eq!(question.image.as_str(), "https://img.example/asuna.png");
    }
}
