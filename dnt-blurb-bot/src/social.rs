//! X (Twitter) API v2 client.
//!
//! Three concerns: reading the account's recent timeline, uploading card
//! images with alt text, and publishing the post.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

use crate::history::{Post, TimelinePage};

/// Timeline pages followed when reading history.
const MAX_TIMELINE_PAGES: usize = 20;

/// Social platform failures.
#[derive(Debug, Error)]
pub enum SocialError {
    /// Underlying HTTP transport error.
    #[error("platform request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-success HTTP status.
    #[error("platform returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },
    /// Response body did not have the expected shape.
    #[error("unexpected platform response: {0}")]
    Decode(String),
    /// No access token configured.
    #[error("no access token configured")]
    MissingToken,
}

/// Where posts are read from and published to.
#[async_trait]
pub trait Platform: Send + Sync {
    /// The account's own posts created at or after `since`, newest first.
    async fn recent_posts(&self, since: DateTime<Utc>) -> Result<Vec<Post>, SocialError>;

    /// Upload one image and attach `alt_text`; returns the media id.
    async fn upload_image(&self, image: Vec<u8>, alt_text: &str) -> Result<String, SocialError>;

    /// Publish a post with the given media attached; returns the post id.
    async fn publish(&self, text: &str, media_ids: &[String]) -> Result<String, SocialError>;
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct MediaUploaded {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Created {
    id: String,
}

/// X API v2 client authenticated with an OAuth 2 user-context token.
#[derive(Debug, Clone)]
pub struct XClient {
    client: reqwest::Client,
    base_url: String,
    account_id: String,
    access_token: Option<String>,
}

impl XClient {
    /// Create a client for `account_id` against `base_url`.
    pub fn new(
        base_url: &str,
        account_id: &str,
        access_token: Option<String>,
        user_agent: &str,
    ) -> Result<Self, SocialError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            account_id: account_id.to_string(),
            access_token,
        })
    }

    fn token(&self) -> Result<&str, SocialError> {
        self.access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(SocialError::MissingToken)
    }

    async fn checked(response: reqwest::Response) -> Result<reqwest::Response, SocialError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(SocialError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SocialError> {
        let body = Self::checked(response).await?.text().await?;
        serde_json::from_str(&body).map_err(|e| SocialError::Decode(format!("{}: {}", e, body)))
    }
}

#[async_trait]
impl Platform for XClient {
    async fn recent_posts(&self, since: DateTime<Utc>) -> Result<Vec<Post>, SocialError> {
        let token = self.token()?;
        let url = format!("{}/2/users/{}/tweets", self.base_url, self.account_id);
        let start_time = since.to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut posts = Vec::new();
        let mut pagination_token: Option<String> = None;
        for page in 1..=MAX_TIMELINE_PAGES {
            let mut query: Vec<(&str, &str)> = vec![
                ("expansions", "attachments.media_keys"),
                ("media.fields", "type,alt_text,url"),
                ("max_results", "100"),
                ("exclude", "retweets,replies"),
                ("start_time", start_time.as_str()),
            ];
            if let Some(ref next) = pagination_token {
                query.push(("pagination_token", next.as_str()));
            }

            let response = self
                .client
                .get(&url)
                .bearer_auth(token)
                .query(&query)
                .send()
                .await?;
            let parsed: TimelinePage = Self::decode(response).await?;
            let next = parsed.meta.as_ref().and_then(|m| m.next_token.clone());
            let batch = parsed.into_posts();
            debug!(page, count = batch.len(), "timeline page received");
            posts.extend(batch);

            match next {
                Some(next) => pagination_token = Some(next),
                None => break,
            }
        }

        info!(count = posts.len(), since = %start_time, "history fetched");
        Ok(posts)
    }

    async fn upload_image(&self, image: Vec<u8>, alt_text: &str) -> Result<String, SocialError> {
        let token = self.token()?;
        let size = image.len();
        let part = Part::bytes(image)
            .file_name("card.jpg")
            .mime_str("image/jpeg")?;
        let form = Form::new()
            .part("media", part)
            .text("media_category", "tweet_image");

        let response = self
            .client
            .post(format!("{}/2/media/upload", self.base_url))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        let uploaded: DataEnvelope<MediaUploaded> = Self::decode(response).await?;
        let media_id = uploaded.data.id;
        debug!(%media_id, size, "image uploaded");

        let response = self
            .client
            .post(format!("{}/2/media/metadata", self.base_url))
            .bearer_auth(token)
            .json(&json!({
                "id": media_id,
                "metadata": { "alt_text": { "text": alt_text } }
            }))
            .send()
            .await?;
        Self::checked(response).await?;
        debug!(%media_id, "alt text attached");

        Ok(media_id)
    }

    async fn publish(&self, text: &str, media_ids: &[String]) -> Result<String, SocialError> {
        let token = self.token()?;
        let mut body = json!({ "text": text });
        if !media_ids.is_empty() {
            body["media"] = json!({ "media_ids": media_ids });
        }

        let response = self
            .client
            .post(format!("{}/2/tweets", self.base_url))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        let created: DataEnvelope<Created> = Self::decode(response).await?;
        info!(post_id = %created.data.id, media = media_ids.len(), "post published");
        Ok(created.data.id)
    }
}
