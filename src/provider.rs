//! Trivia content provider capability
//!
//! The engine asks a provider for a page of characters and decides on its own
//! which entries are usable. Every nested field of a record is optional: the
//! character database happily returns characters without pictures or works
//! without start dates, and those records are simply rejected later.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// A source of candidate characters
///
/// Implementations typically wrap an HTTP client for a character database.
/// Errors are reported as [`ProviderError`] and never abort the engine.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Fetches one page of characters
    ///
    /// # Arguments
    ///
    /// * `page` - 1-based page number
    /// * `per_page` - Number of characters requested
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Unavailable` if the provider cannot be reached
    /// and `ProviderError::Malformed` if its response cannot be understood.
    async fn fetch_candidate_page(&self, page: u32, per_page: u32)
    -> Result<RawPage, ProviderError>;
}

/// A page of characters as returned by the provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPage {
    /// Characters on the page, possibly incomplete
    #[serde(default)]
    pub characters: Vec<RawCharacter>,
}

/// A character record with every field optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCharacter {
    /// Provider-side id
    pub id: Option<u64>,
    /// Character names
    pub name: Option<RawName>,
    /// Character pictures
    pub image: Option<RawImage>,
    /// Works the character appears in
    pub media: Option<RawMediaConnection>,
}

/// Name block of a character
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawName {
    /// Full display name
    pub full: Option<String>,
}

/// Picture block of a character
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawImage {
    /// URL of the large picture
    pub large: Option<String>,
}

/// Works a character appears in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMediaConnection {
    /// The works, most relevant first
    #[serde(default)]
    pub nodes: Vec<Option<RawMedia>>,
}

/// A single work
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMedia {
    /// Titles of the work
    pub title: Option<RawTitle>,
    /// First release date of the work
    pub start_date: Option<RawDate>,
}

/// Titles of a work
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTitle {
    /// Romanized title
    pub romaji: Option<String>,
    /// English title
    pub english: Option<String>,
}

/// A possibly partial date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDate {
    /// Year, if known
    pub year: Option<i32>,
}

/// The source work of a character, as far as the record tells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceWork<'a> {
    /// Title used as the hint
    pub title: &'a str,
    /// Release year, if known
    pub year: Option<i32>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl RawCharacter {
    /// The character's full name, if present and not blank
    pub fn full_name(&self) -> Option<&str> {
        non_blank(self.name.as_ref()?.full.as_ref())
    }

    /// The character's picture, if present and not blank
    pub fn image_url(&self) -> Option<&str> {
        non_blank(self.image.as_ref()?.large.as_ref())
    }

    /// The first listed work that carries a usable title
    pub fn source_work(&self) -> Option<SourceWork<'_>> {
        self.media
            .as_ref()?
            .nodes
            .iter()
            .flatten()
            .find_map(|media| {
                let title = media.title.as_ref()?;
                let title = non_blank(title.english.as_ref())
                    .or_else(|| non_blank(title.romaji.as_ref()))?;
                Some(SourceWork {
                    title,
                    year: media.start_date.as_ref().and_then(|date| date.year),
                })
            })
    }
}

/// Response envelope of the character database's GraphQL endpoint
#[derive(Deserialize)]
struct GraphQlEnvelope {
    data: Option<GraphQlData>,
}

#[derive(Deserialize)]
struct GraphQlData {
    #[serde(rename = "Page")]
    page: Option<RawPage>,
}

impl RawPage {
    /// Parses a page from a GraphQL response body
    ///
    /// A response without data yields an empty page, which the selector
    /// treats like any other page without acceptable characters.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Malformed` if the body is not valid JSON of the
    /// expected shape.
    pub fn from_graphql_response(body: &str) -> Result<Self, ProviderError> {
        let envelope: GraphQlEnvelope = serde_json::from_str(body)?;

        Ok(envelope
            .data
            .and_then(|data| data.page)
            .unwrap_or_default())
    }
}
