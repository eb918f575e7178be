//! Quiz engine
//!
//! The engine is the entry point used by a chat front end. It ties the
//! session state machine to a content provider, a transport and the tokio
//! timers, and serializes every state change through one lock.
//!
//! Slow work never happens under the lock: candidates are fetched before a
//! round is installed and chat messages are posted after the state change
//! has been made.

use std::{collections::HashMap, sync::Arc, time::Duration};

use derive_where::derive_where;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::{
    TruncatedVec,
    config::{ConfigError, EngineConfig},
    distractor,
    error::Error,
    leaderboard::{ScoreMessage, Standing},
    participant::{Participant, ParticipantId},
    provider::ContentProvider,
    round::{AnswerOutcome, QuestionMessage, Round},
    scheduler::{self, AlarmMessage},
    selector::{Selection, Selector},
    session::{Announcement, RevealMessage, Session, SessionState},
    text,
    transport::Transport,
};

struct Inner<P, T> {
    config: EngineConfig,
    selector: Selector,
    provider: P,
    transport: T,
    session: Mutex<Session>,
}

/// A quiz engine for one chat
///
/// Cloning is cheap and every clone drives the same session.
#[derive_where(Clone)]
pub struct Engine<P, T> {
    inner: Arc<Inner<P, T>>,
}

impl<P, T> Engine<P, T>
where
    P: ContentProvider + 'static,
    T: Transport + 'static,
{
    /// Creates an idle engine with an empty scoreboard
    ///
    /// # Arguments
    ///
    /// * `config` - Engine configuration
    /// * `provider` - Source of candidate characters
    /// * `transport` - Chat the engine posts to
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the configuration fails
    /// [`EngineConfig::checked`].
    pub fn new(config: EngineConfig, provider: P, transport: T) -> Result<Self, ConfigError> {
        let selector = Selector::new(&config);
        Self::with_selector(selector, config, provider, transport)
    }

    /// Creates an engine with a custom selection policy
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the configuration fails
    /// [`EngineConfig::checked`].
    pub fn with_selector(
        selector: Selector,
        config: EngineConfig,
        provider: P,
        transport: T,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: Arc::new(Inner {
                config: config.checked()?,
                selector,
                provider,
                transport,
                session: Mutex::new(Session::default()),
            }),
        })
    }

    /// The configuration the engine runs with
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// The content provider
    pub fn provider(&self) -> &P {
        &self.inner.provider
    }

    /// The chat transport
    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// Current state of the session
    pub async fn state(&self) -> SessionState {
        self.inner.session.lock().await.state()
    }

    fn authorize(&self, requester: ParticipantId) -> Result<(), Error> {
        if self.inner.config.is_operator(requester) {
            Ok(())
        } else {
            warn!(%requester, "Privileged operation refused");
            Err(Error::Unauthorized)
        }
    }

    fn arm(&self, alarm: AlarmMessage, delay: Duration) {
        let engine = self.clone();
        scheduler::arm(alarm, delay, move |alarm| async move {
            engine.receive_alarm(alarm).await;
        });
    }

    /// Starts a new round
    ///
    /// A candidate is selected and its options are built before the session
    /// is locked. The round is then installed only if the session is still
    /// idle, its alarms are armed, and the question is posted. If posting
    /// fails the round is withdrawn and its alarms become stale.
    ///
    /// # Arguments
    ///
    /// * `requester` - The participant asking for the round
    ///
    /// # Returns
    ///
    /// The question that was posted
    ///
    /// # Errors
    ///
    /// * `Error::Unauthorized` if the requester is not an operator
    /// * `Error::RoundAlreadyActive` if a round is running
    /// * `Error::NoCandidateFound` or `Error::ProviderUnavailable` if selection failed
    /// * `Error::TransportUnavailable` if the question could not be posted
    #[instrument(skip(self))]
    pub async fn start_round(&self, requester: ParticipantId) -> Result<QuestionMessage, Error> {
        self.authorize(requester)?;

        if self.state().await != SessionState::Idle {
            return Err(Error::RoundAlreadyActive);
        }

        let Selection { candidate, pool } = self.inner.selector.select(&self.inner.provider).await?;
        let options = distractor::build_options(&candidate.name, &pool)?;

        let hint_delay = self.inner.config.hint_delay;
        let end_delay = self.inner.config.end_delay;
        let round = Round::new(candidate, options, hint_delay, end_delay);

        let question = self.inner.session.lock().await.install(
            round,
            hint_delay,
            end_delay,
            |alarm, delay| self.arm(alarm, delay),
        )?;

        let caption = text::question_caption(question.answer_window);
        if let Err(error) = self
            .inner
            .transport
            .publish_question(&question.image, &caption, &question.options)
            .await
        {
            warn!(round = %question.round, %error, "Question could not be posted");
            self.inner.session.lock().await.withdraw(question.round);
            return Err(error.into());
        }

        info!(round = %question.round, %requester, "Question posted");

        Ok(question)
    }

    /// Records a participant's answer
    ///
    /// Correct, incorrect and repeated answers are acknowledged in chat.
    ///
    /// # Arguments
    ///
    /// * `participant` - Who answered
    /// * `chosen` - The label of the chosen option
    ///
    /// # Errors
    ///
    /// * `Error::NoActiveRound` if no round is running
    /// * `Error::AlreadyAnswered` if the participant already answered
    #[instrument(skip(self))]
    pub async fn submit_answer(
        &self,
        participant: ParticipantId,
        chosen: &str,
    ) -> Result<AnswerOutcome, Error> {
        let result = self.inner.session.lock().await.submit_answer(participant, chosen);

        if matches!(result, Ok(_) | Err(Error::AlreadyAnswered)) {
            let who = self.inner.transport.resolve_participant(participant).await;
            if let Some(ack) = text::acknowledgement(&who, result) {
                self.post(&ack).await;
            }
        }

        result
    }

    /// Delivers a fired alarm
    ///
    /// Alarms of rounds that are no longer live are ignored.
    #[instrument(skip(self))]
    pub async fn receive_alarm(&self, alarm: AlarmMessage) {
        let announcement = self.inner.session.lock().await.receive_alarm(alarm);

        match announcement {
            None => {}
            Some(Announcement::Hint { source_title, .. }) => {
                self.post(&text::hint(&source_title)).await;
            }
            Some(Announcement::Reveal(reveal)) => {
                let winners = self.resolve_all(reveal.winners.iter().copied()).await;
                let standings = self.named(self.truncate(&reveal.leaderboard)).await;
                self.post(&text::reveal(&reveal.answer, &winners, &standings)).await;
            }
        }
    }

    /// Ranked snapshot of the scoreboard, highest first
    pub async fn get_leaderboard(&self) -> Vec<Standing> {
        self.inner.session.lock().await.leaderboard()
    }

    /// Points and ranking position of one participant
    ///
    /// # Returns
    ///
    /// `None` if the participant has not scored since the last reset
    pub async fn get_score(&self, participant: ParticipantId) -> Option<ScoreMessage> {
        self.inner.session.lock().await.scoreboard().score(participant)
    }

    /// The scoreboard rendered for chat with display names
    pub async fn render_leaderboard(&self) -> String {
        let rows = self
            .inner
            .session
            .lock()
            .await
            .scoreboard()
            .ranked_truncated(self.inner.config.leaderboard_limit);

        text::leaderboard(&self.named(rows).await)
    }

    /// Clears the scoreboard and confirms it in chat
    ///
    /// A running round continues and its later correct answers score into
    /// the fresh scoreboard.
    ///
    /// # Errors
    ///
    /// Returns `Error::Unauthorized` if the requester is not an operator.
    #[instrument(skip(self))]
    pub async fn reset_leaderboard(&self, requester: ParticipantId) -> Result<(), Error> {
        self.authorize(requester)?;
        self.inner.session.lock().await.reset_scoreboard();
        self.post(&text::reset_confirmation()).await;
        Ok(())
    }

    /// Ends the running round early and reveals its answer
    ///
    /// Points already awarded are kept. The round's alarms become stale.
    ///
    /// # Errors
    ///
    /// * `Error::Unauthorized` if the requester is not an operator
    /// * `Error::NoActiveRound` if no round is running
    #[instrument(skip(self))]
    pub async fn cancel_round(&self, requester: ParticipantId) -> Result<RevealMessage, Error> {
        self.authorize(requester)?;

        let reveal = self
            .inner
            .session
            .lock()
            .await
            .conclude()
            .ok_or(Error::NoActiveRound)?;

        info!(round = %reveal.round, %requester, "Round cancelled");
        self.post(&text::cancelled(&reveal.answer)).await;

        Ok(reveal)
    }

    async fn post(&self, message: &str) {
        if let Err(error) = self.inner.transport.publish_text(message).await {
            warn!(%error, "Message could not be posted");
        }
    }

    fn truncate(&self, standings: &[Standing]) -> TruncatedVec<Standing> {
        TruncatedVec::new(
            standings.iter().copied(),
            self.inner.config.leaderboard_limit,
            standings.len(),
        )
    }

    async fn resolve_all<I: IntoIterator<Item = ParticipantId>>(&self, ids: I) -> Vec<Participant> {
        let mut participants = Vec::new();
        for id in ids {
            participants.push(self.inner.transport.resolve_participant(id).await);
        }
        participants
    }

    async fn named(&self, rows: TruncatedVec<Standing>) -> TruncatedVec<(Participant, u64)> {
        let mut names = HashMap::new();
        for standing in rows.items() {
            let participant = self.inner.transport.resolve_participant(standing.participant).await;
            names.insert(standing.participant, participant);
        }

        rows.map(|standing| {
            let participant = names
                .get(&standing.participant)
                .cloned()
                .unwrap_or_else(|| Participant::anonymous(standing.participant));
            (participant, standing.points)
        })
    }
}
