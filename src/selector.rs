//! Candidate selection
//!
//! The selector turns raw provider pages into a validated [`Candidate`] plus
//! a pool of distractor names. It makes at most `retry_budget` provider
//! requests and then gives up with an explicit error, leaving it to the
//! operator to try again.

use chrono::Datelike;
use itertools::Itertools;
use tracing::{debug, warn};

use crate::{
    config::{EngineConfig, RecencyPolicy},
    error::Error,
    provider::{ContentProvider, RawCharacter},
    round::{Candidate, ImageRef},
};

/// A chosen candidate and the names that may serve as its distractors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// The character of the round
    pub candidate: Candidate,
    /// Other usable names from the same page
    pub pool: Vec<String>,
}

/// Retry and acceptance policy for candidate selection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selector {
    retry_budget: u32,
    recency: RecencyPolicy,
    page_count: u32,
    per_page: u32,
    current_year: Option<i32>,
}

impl Selector {
    /// Creates a selector from the engine configuration
    ///
    /// A rolling recency window is resolved against the calendar year at the
    /// time of each selection.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            retry_budget: config.retry_budget,
            recency: config.recency,
            page_count: config.page_count.max(1),
            per_page: config.per_page,
            current_year: None,
        }
    }

    /// Pins the year used to resolve a rolling recency window
    #[must_use]
    pub fn with_current_year(self, current_year: i32) -> Self {
        Self {
            current_year: Some(current_year),
            ..self
        }
    }

    /// The year a rolling recency window is counted back from
    pub fn current_year(&self) -> i32 {
        self.current_year.unwrap_or_else(|| chrono::Utc::now().year())
    }

    /// The first release year considered recent
    pub fn cutoff_year(&self) -> i32 {
        self.recency.threshold.cutoff_year(self.current_year())
    }

    /// Checks a single record against the acceptance policy
    ///
    /// A record needs a name, a picture and a titled source work. Its work
    /// must have been released in or after the cutoff year unless `bypass`
    /// is set.
    ///
    /// # Returns
    ///
    /// The candidate built from the record, or `None` if it is rejected
    pub fn accept(&self, record: &RawCharacter, bypass: bool) -> Option<Candidate> {
        let name = record.full_name()?;
        let image = record.image_url()?;
        let source = record.source_work()?;

        let recent = source.year.is_some_and(|year| year >= self.cutoff_year());

        (recent || bypass).then(|| Candidate {
            name: name.to_owned(),
            image: ImageRef::from(image.to_owned()),
            source_title: source.title.to_owned(),
            recent,
        })
    }

    /// Picks a candidate, querying the provider at most `retry_budget` times
    ///
    /// Each attempt fetches a random page. One bypass roll is made per page;
    /// when it succeeds the release year is ignored for that page. Among the
    /// accepted records one is chosen uniformly and the other usable names
    /// of the page become the distractor pool.
    ///
    /// # Errors
    ///
    /// * `Error::ProviderUnavailable` if every request failed
    /// * `Error::NoCandidateFound` if pages were fetched but none qualified
    pub async fn select<P: ContentProvider + ?Sized>(
        &self,
        provider: &P,
    ) -> Result<Selection, Error> {
        let mut fetched_any = false;

        for attempt in 1..=self.retry_budget {
            let page = fastrand::u32(1..=self.page_count);

            let raw = match provider.fetch_candidate_page(page, self.per_page).await {
                Ok(raw) => raw,
                Err(error) => {
                    warn!(attempt, page, %error, "Provider request failed");
                    continue;
                }
            };
            fetched_any = true;

            let bypass = fastrand::f64() < self.recency.bypass_probability;

            let mut accepted = raw
                .characters
                .iter()
                .filter_map(|record| self.accept(record, bypass))
                .collect_vec();

            if accepted.is_empty() {
                debug!(
                    attempt,
                    page,
                    records = raw.characters.len(),
                    "No acceptable candidate on page"
                );
                continue;
            }

            let candidate = accepted.swap_remove(fastrand::usize(..accepted.len()));

            let pool = raw
                .characters
                .iter()
                .filter(|record| record.image_url().is_some())
                .filter_map(RawCharacter::full_name)
                .filter(|name| *name != candidate.name)
                .map(str::to_owned)
                .collect_vec();

            debug!(
                attempt,
                page,
                bypass,
                recent = candidate.recent,
                pool = pool.len(),
                "Candidate selected"
            );

            return Ok(Selection { candidate, pool });
        }

        if fetched_any {
            Err(Error::NoCandidateFound)
        } else {
            Err(Error::ProviderUnavailable)
        }
    }
}
