//! # Character Quiz Engine
//!
//! This library runs "guess the character" rounds in a group chat. An
//! operator starts a round, the engine posts a character picture with five
//! name options, participants answer once each, a hint about the source work
//! follows after two minutes and the answer is revealed after five. Points
//! accumulate on a scoreboard shared by every round of the chat.
//!
//! The chat itself and the character database are abstracted behind the
//! [`transport::Transport`] and [`provider::ContentProvider`] traits.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::ignored_unit_patterns)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::wildcard_imports)]
use derive_where::derive_where;
use itertools::Itertools;
use serde::Serialize;

pub mod config;
pub mod constants;
pub mod distractor;
pub mod engine;
pub mod error;
pub mod leaderboard;
pub mod participant;
pub mod provider;
pub mod round;
pub mod scheduler;
pub mod selector;
pub mod session;
pub mod text;
pub mod transport;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::Error;
pub use participant::ParticipantId;
pub use session::SessionState;

/// A truncated vector that maintains the exact count while limiting displayed items
///
/// Used to render a long leaderboard: only the top rows are shown, together
/// with how many were left out.
#[derive(Debug, Clone, Serialize)]
#[derive_where(Default)]
pub struct TruncatedVec<T> {
    /// The exact total count of items
    exact_count: usize,
    /// The truncated list of items (up to the limit)
    items: Vec<T>,
}

impl<T: Clone> TruncatedVec<T> {
    /// Creates a new truncated vector from an iterator
    ///
    /// # Arguments
    ///
    /// * `list` - An iterator over items to include
    /// * `limit` - Maximum number of items to include in the truncated vector
    /// * `exact_count` - The exact total count of items (may be larger than limit)
    ///
    /// # Returns
    ///
    /// A new `TruncatedVec` containing up to `limit` items from the iterator
    pub fn new<I: Iterator<Item = T>>(list: I, limit: usize, exact_count: usize) -> Self {
        let items = list.take(limit).collect_vec();
        Self { exact_count, items }
    }

    /// Maps a function over the items in the truncated vector
    ///
    /// # Arguments
    ///
    /// * `f` - Function to apply to each item
    ///
    /// # Returns
    ///
    /// A new `TruncatedVec` with the function applied to each item
    pub fn map<F, U>(self, f: F) -> TruncatedVec<U>
    where
        F: Fn(T) -> U,
    {
        TruncatedVec {
            exact_count: self.exact_count,
            items: self.items.into_iter().map(f).collect_vec(),
        }
    }

    /// Returns the exact count of items
    pub fn exact_count(&self) -> usize {
        self.exact_count
    }

    /// Returns the truncated items
    pub fn items(&self) -> &[T] {
        &self.items
    }
}
