//! Option set construction
//!
//! Every round shows exactly five options: the correct name and four
//! distinct wrong ones, in uniformly random order. The wrong names come from
//! a pool (usually the other characters on the fetched page) and are topped
//! up from a curated list when the pool is too small.

use std::collections::HashSet;

use itertools::Itertools;

use crate::{
    constants::{
        FALLBACK_DISTRACTORS,
        round::{DISTRACTOR_COUNT, OPTION_COUNT},
    },
    error::Error,
    round::normalize,
};

/// Builds the shuffled option set for a round
///
/// Pool entries are deduplicated case-insensitively, blank entries and any
/// entry equal to the correct name are discarded, and four of the remaining
/// names are drawn at random. The correct name is appended and the whole set
/// is shuffled.
///
/// # Arguments
///
/// * `correct` - The correct answer
/// * `pool` - Candidate wrong answers, may contain duplicates or the correct name
///
/// # Errors
///
/// Returns `Error::NoCandidateFound` if not even the fallback list can supply
/// four distinct wrong names.
pub fn build_options<I, S>(correct: &str, pool: I) -> Result<[String; OPTION_COUNT], Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let correct = correct.trim();
    let mut seen = HashSet::from([normalize(correct)]);

    let mut distinct = |name: &str| {
        let name = name.trim();
        (!name.is_empty() && seen.insert(normalize(name))).then(|| name.to_owned())
    };

    let mut wrong = pool
        .into_iter()
        .filter_map(|name| distinct(name.as_ref()))
        .collect_vec();
    fastrand::shuffle(&mut wrong);
    wrong.truncate(DISTRACTOR_COUNT);

    if wrong.len() < DISTRACTOR_COUNT {
        let mut fallback = FALLBACK_DISTRACTORS
            .iter()
            .copied()
            .filter_map(|name| distinct(name))
            .collect_vec();
        fastrand::shuffle(&mut fallback);
        wrong.extend(fallback.into_iter().take(DISTRACTOR_COUNT - wrong.len()));
    }

    if wrong.len() < DISTRACTOR_COUNT {
        return Err(Error::NoCandidateFound);
    }

    wrong.push(correct.to_owned());
    fastrand::shuffle(&mut wrong);

    wrong.try_into().map_err(|_| Error::NoCandidateFound)
}
