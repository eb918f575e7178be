//! Round timers
//!
//! A round arms two alarms when it starts: the hint and the end. Alarms are
//! never cancelled. Each one carries the id of the round it was armed for,
//! and the session drops any alarm whose round is no longer the live one.

use std::{future::Future, time::Duration};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::round::RoundId;

/// What an alarm does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlarmKind {
    /// Reveal the source title
    Hint,
    /// Reveal the answer and the leaderboard
    End,
}

/// A timed event bound to a specific round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlarmMessage {
    /// Round the alarm was armed for
    pub round: RoundId,
    /// Transition to perform
    pub kind: AlarmKind,
}

/// Arms an alarm on the tokio runtime
///
/// After `delay` has elapsed `fire` is called with the alarm and the future
/// it returns is awaited on a background task.
///
/// # Arguments
///
/// * `alarm` - The alarm to deliver
/// * `delay` - Time until delivery
/// * `fire` - Delivery callback
pub fn arm<F, Fut>(alarm: AlarmMessage, delay: Duration, fire: F)
where
    F: FnOnce(AlarmMessage) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    debug!(round = %alarm.round, kind = ?alarm.kind, delay_secs = delay.as_secs(), "Alarm armed");

    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        fire(alarm).await;
    });
}
