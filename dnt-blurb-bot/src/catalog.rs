//! Scryfall catalog access.
//!
//! Searches for freshly spoiled white cards, converts catalog records into
//! [`Subject`]s, and downloads card images.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use dnt_blurb::schema::subject::{Face, Subject, DUAL_FACED_LAYOUTS};

/// Upper bound on search result pages followed in one run.
const MAX_SEARCH_PAGES: usize = 10;

/// Catalog lookup failures.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Underlying HTTP transport error.
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-success status other than "no results".
    #[error("catalog returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },
    /// A card record lacks something the bot needs.
    #[error("card '{card}' is unusable: {reason}")]
    InvalidCard {
        /// Card name (may be empty).
        card: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Image links for one card or face.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageUris {
    /// The 488×680 JPEG rendition.
    pub normal: Option<String>,
}

/// One face of a catalog card.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFace {
    /// Face name.
    pub name: String,
    /// Face mana value; Scryfall usually only sets this card-wide.
    #[serde(default)]
    pub cmc: Option<f64>,
    /// Face type line.
    #[serde(default)]
    pub type_line: String,
    /// Face rules text.
    #[serde(default)]
    pub oracle_text: Option<String>,
    /// Printed power.
    #[serde(default)]
    pub power: Option<String>,
    /// Printed toughness.
    #[serde(default)]
    pub toughness: Option<String>,
    /// Printed loyalty.
    #[serde(default)]
    pub loyalty: Option<String>,
    /// Per-face images (dual-faced layouts only).
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
}

/// A card record as returned by the search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogCard {
    /// Full card name (`Front // Back` for multi-face cards).
    pub name: String,
    /// Mana value.
    #[serde(default)]
    pub cmc: f64,
    /// Full type line.
    #[serde(default)]
    pub type_line: String,
    /// Rules text; absent on multi-face cards.
    #[serde(default)]
    pub oracle_text: Option<String>,
    /// Printed power.
    #[serde(default)]
    pub power: Option<String>,
    /// Printed toughness.
    #[serde(default)]
    pub toughness: Option<String>,
    /// Printed loyalty.
    #[serde(default)]
    pub loyalty: Option<String>,
    /// Set code.
    #[serde(default)]
    pub set: Option<String>,
    /// Layout, e.g. `normal`, `transform`, `modal_dfc`, `split`.
    #[serde(default = "default_layout")]
    pub layout: String,
    /// Faces for multi-face layouts.
    #[serde(default)]
    pub card_faces: Option<Vec<CatalogFace>>,
    /// Card-wide images (single-image layouts only).
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
}

fn default_layout() -> String {
    "normal".to_string()
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    data: Vec<CatalogCard>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_page: Option<String>,
}

impl CatalogCard {
    fn is_dual_faced(&self) -> bool {
        DUAL_FACED_LAYOUTS.contains(&self.layout.as_str())
            && self.card_faces.as_ref().is_some_and(|f| f.len() >= 2)
    }

    /// Convert into the generator's subject type, rejecting nameless cards.
    pub fn to_subject(&self) -> Result<Subject, CatalogError> {
        let subject = Subject {
            name: self.name.clone(),
            mana_value: self.cmc,
            type_line: self.type_line.clone(),
            oracle_text: self.oracle_text.clone(),
            power: self.power.clone(),
            toughness: self.toughness.clone(),
            loyalty: self.loyalty.clone(),
            set: self.set.clone(),
            layout: self.layout.clone(),
            faces: self
                .card_faces
                .iter()
                .flatten()
                .map(|f| Face {
                    name: f.name.clone(),
                    mana_value: f.cmc,
                    type_line: f.type_line.clone(),
                    oracle_text: f.oracle_text.clone(),
                    power: f.power.clone(),
                    toughness: f.toughness.clone(),
                    loyalty: f.loyalty.clone(),
                })
                .collect(),
        };
        subject.validate().map_err(|e| CatalogError::InvalidCard {
            card: self.name.clone(),
            reason: e.to_string(),
        })?;
        Ok(subject)
    }

    /// `normal` image URL for every face that gets its own picture, front
    /// first. Lines up with [`Subject::faces`].
    pub fn image_urls(&self) -> Result<Vec<String>, CatalogError> {
        let missing = |what: &str| CatalogError::InvalidCard {
            card: self.name.clone(),
            reason: format!("no normal image for {}", what),
        };

        if self.is_dual_faced() {
            self.card_faces
                .iter()
                .flatten()
                .take(2)
                .map(|face| {
                    face.image_uris
                        .as_ref()
                        .and_then(|u| u.normal.clone())
                        .ok_or_else(|| missing(&face.name))
                })
                .collect()
        } else {
            self.image_uris
                .as_ref()
                .and_then(|u| u.normal.clone())
                .map(|url| vec![url])
                .ok_or_else(|| missing("card"))
        }
    }
}

/// Search string for white cards first printed after `today`.
pub fn search_query(today: NaiveDate) -> String {
    format!("c=w not:reprint date>{}", today.format("%Y-%m-%d"))
}

/// Keep candidates whose exact name has not been posted before, in order.
pub fn filter_unmentioned(cards: Vec<CatalogCard>, mentioned: &HashSet<String>) -> Vec<CatalogCard> {
    cards
        .into_iter()
        .filter(|card| !mentioned.contains(&card.name))
        .collect()
}

/// Where candidate cards and their images come from.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Unreleased cards that are candidates for a post.
    async fn candidates(&self, today: NaiveDate) -> Result<Vec<CatalogCard>, CatalogError>;

    /// Download one image.
    async fn image(&self, url: &str) -> Result<Vec<u8>, CatalogError>;
}

/// Scryfall REST client.
#[derive(Debug, Clone)]
pub struct ScryfallClient {
    client: reqwest::Client,
    base_url: String,
}

impl ScryfallClient {
    /// Create a client against `base_url` (no trailing slash).
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Catalog for ScryfallClient {
    async fn candidates(&self, today: NaiveDate) -> Result<Vec<CatalogCard>, CatalogError> {
        let query = search_query(today);
        info!(%query, "searching catalog");

        let mut response = self
            .client
            .get(format!("{}/cards/search", self.base_url))
            .query(&[("order", "cmc"), ("q", query.as_str())])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let mut cards = Vec::new();
        for page in 1..=MAX_SEARCH_PAGES {
            let status = response.status();
            // Scryfall answers an empty search with 404.
            if status == reqwest::StatusCode::NOT_FOUND {
                debug!("catalog search matched nothing");
                break;
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(CatalogError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            let parsed: SearchPage = response.json().await?;
            debug!(page, count = parsed.data.len(), "catalog page received");
            cards.extend(parsed.data);

            match (parsed.has_more, parsed.next_page) {
                (true, Some(next)) if page < MAX_SEARCH_PAGES => {
                    response = self.client.get(next).send().await?;
                }
                _ => break,
            }
        }

        info!(count = cards.len(), "catalog candidates fetched");
        Ok(cards)
    }

    async fn image(&self, url: &str) -> Result<Vec<u8>, CatalogError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}
