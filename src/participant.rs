//! Participant identity
//!
//! Participants are identified by the stable numeric id the chat platform
//! assigns them. Display names are only hints: they are resolved from the
//! chat transport when a message needs them and are never stored.

use std::{fmt::Display, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};

/// A stable identifier for a chat participant
///
/// The same id is used for operators and for players; being an operator is
/// decided by the configured allow-list, not by the id itself.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    derive_more::From,
)]
#[serde(transparent)]
pub struct ParticipantId(i64);

impl ParticipantId {
    /// Creates a participant id from the raw chat platform id
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw chat platform id
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ParticipantId {
    type Err = ParseIntError;

    /// Parses an id from its decimal representation
    ///
    /// # Errors
    ///
    /// Returns a `ParseIntError` if the string is not a valid integer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// A participant together with a display-name hint
///
/// The hint is whatever the transport reported for a single message; it
/// falls back to the id when the transport could not resolve a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    /// The participant's stable id
    pub id: ParticipantId,
    /// Name to show in chat
    pub display_name: String,
}

impl Participant {
    /// Builds a participant from a resolved name, censoring it for public display
    ///
    /// Empty or whitespace-only names fall back to the id.
    pub fn new(id: ParticipantId, name: Option<&str>) -> Self {
        let display_name = match name.map(str::trim) {
            Some(name) if !name.is_empty() => rustrict::CensorStr::censor(name),
            _ => id.to_string(),
        };

        Self { id, display_name }
    }

    /// A participant whose name could not be resolved
    pub fn anonymous(id: ParticipantId) -> Self {
        Self::new(id, None)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_participant_id_round_trips_through_string() {
        let id = ParticipantId::new(-1_001_234);
        let parsed: ParticipantId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_participant_id_rejects_garbage() {
        assert!("not-a-number".parse::<ParticipantId>().is_err());
    }

    #[test]
    fn test_participant_id_serializes_as_number() {
        let json = serde_json::to_string(&ParticipantId::new(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_participant_falls_back_to_id() {
        let id = ParticipantId::new(7);
        assert_eq!(Participant::new(id, Some("   ")).display_name, "7");
        assert_eq!(Participant::anonymous(id).display_name, "7");
    }

    #[test]
    fn test_participant_keeps_clean_name() {
        let participant = Participant::new(ParticipantId::new(7), Some(" Alice "));
        assert_eq!(participant.display_name, "Alice");
    }
}
