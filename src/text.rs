//! Chat texts
//!
//! Plain-text renderings of everything the engine posts. They carry no
//! markup so any transport can send them unchanged.

use std::time::Duration;

use itertools::Itertools;

use crate::{
    TruncatedVec,
    error::Error,
    participant::Participant,
    round::AnswerOutcome,
};

fn points(count: u64) -> String {
    pluralizer::pluralize("point", isize::try_from(count).unwrap_or(isize::MAX), true)
}

fn window(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        pluralizer::pluralize("minute", isize::try_from(secs / 60).unwrap_or(isize::MAX), true)
    } else {
        pluralizer::pluralize("second", isize::try_from(secs).unwrap_or(isize::MAX), true)
    }
}

/// Caption posted under the question picture
pub fn question_caption(answer_window: Duration) -> String {
    format!(
        "🧠 GUESS THE CHARACTER!\nWho is this character?\nYou have {} to answer!",
        window(answer_window)
    )
}

/// Hint posted partway through a round
pub fn hint(source_title: &str) -> String {
    format!("💡 Hint: this character comes from {source_title}")
}

/// Acknowledgement of a submitted answer
///
/// # Returns
///
/// `None` for results that are not acknowledged in chat
pub fn acknowledgement(participant: &Participant, result: Result<AnswerOutcome, Error>) -> Option<String> {
    let name = &participant.display_name;
    match result {
        Ok(AnswerOutcome::Correct) => Some(format!("✅ {name} guessed it!")),
        Ok(AnswerOutcome::Incorrect) => Some(format!("❌ {name} got it wrong!")),
        Err(Error::AlreadyAnswered) => Some(format!("{name}, you already answered!")),
        Err(_) => None,
    }
}

/// Ranked leaderboard
pub fn leaderboard(rows: &TruncatedVec<(Participant, u64)>) -> String {
    if rows.items().is_empty() {
        return "Nobody has points yet!".to_owned();
    }

    let mut text = format!(
        "🏆 Current leaderboard:\n\n{}",
        rows.items()
            .iter()
            .enumerate()
            .map(|(position, (participant, score))| {
                format!("{}. {}: {}", position + 1, participant.display_name, points(*score))
            })
            .join("\n")
    );

    let hidden = rows.exact_count().saturating_sub(rows.items().len());
    if hidden > 0 {
        text.push_str(&format!("\n…and {hidden} more"));
    }

    text
}

/// End-of-round reveal with winners and leaderboard
pub fn reveal(
    answer: &str,
    winners: &[Participant],
    standings: &TruncatedVec<(Participant, u64)>,
) -> String {
    let winners = if winners.is_empty() {
        "Nobody guessed it.".to_owned()
    } else {
        format!(
            "🎉 Guessed by: {}",
            winners.iter().map(|w| &w.display_name).join(", ")
        )
    };

    format!(
        "⏱ Time's up!\nThe correct answer was: {answer}\n{winners}\n\n{}",
        leaderboard(standings)
    )
}

/// Notice posted when an operator cancels a round
pub fn cancelled(answer: &str) -> String {
    format!("🛑 The round was cancelled. The answer was: {answer}")
}

/// Confirmation for an operator who reset the scoreboard
pub fn reset_confirmation() -> String {
    "✅ Leaderboard reset!".to_owned()
}
