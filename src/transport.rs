//! Chat transport capability
//!
//! This module defines the trait through which the engine talks to the
//! chat. The engine only needs to post a picture with buttons, post plain
//! text, and look up display names; how a chat platform does this is left
//! to the implementation.

use async_trait::async_trait;

use crate::{
    error::TransportError,
    participant::{Participant, ParticipantId},
    round::ImageRef,
};

/// An opaque handle to a posted message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::From, derive_more::Display)]
pub struct MessageHandle(i64);

/// Trait for publishing round events to a chat
///
/// Implementations might use a bot API over HTTP, a websocket gateway, or an
/// in-memory recorder in tests. No method is called while the engine holds
/// its state lock.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Posts the question picture with one button per option
    ///
    /// # Arguments
    ///
    /// * `image` - Picture of the character
    /// * `caption` - Text shown under the picture
    /// * `options` - Button labels in display order; a pressed button
    ///   reports its label back as the chosen answer
    ///
    /// # Errors
    ///
    /// Returns a `TransportError` if the question could not be posted.
    async fn publish_question(
        &self,
        image: &ImageRef,
        caption: &str,
        options: &[String],
    ) -> Result<MessageHandle, TransportError>;

    /// Posts a plain text message
    ///
    /// # Errors
    ///
    /// Returns a `TransportError` if the message could not be posted.
    async fn publish_text(&self, text: &str) -> Result<MessageHandle, TransportError>;

    /// Looks up the name a participant is shown under
    ///
    /// Best effort: `None` when the name is unknown or the lookup failed.
    async fn resolve_display_name(&self, participant: ParticipantId) -> Option<String>;

    /// Resolves a participant for display, falling back to the id
    async fn resolve_participant(&self, participant: ParticipantId) -> Participant {
        let name = self.resolve_display_name(participant).await;
        Participant::new(participant, name.as_deref())
    }
}
