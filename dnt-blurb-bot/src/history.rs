//! Posting history: which cards the account has already talked about.
//!
//! Every post the bot makes carries alt text produced by
//! [`dnt_blurb::core::describe`], whose first line names the card. Reading
//! those names back out of recent posts is how repeats are avoided.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

/// First line of a card description: `... card named <name>.` followed by a
/// newline. The name is everything on the line except its final character.
static MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Magic: The Gathering card named ([^\n]+).\n").expect("mention pattern is valid")
});

/// A media attachment on a past post.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PostedMedia {
    /// Platform media key.
    pub media_key: String,
    /// `photo`, `video`, `animated_gif`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Alt text, if any was set.
    #[serde(default)]
    pub alt_text: Option<String>,
}

/// A past post with its media joined in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Post {
    /// Post id.
    pub id: String,
    /// Post text.
    pub text: String,
    /// Attached media, in attachment order.
    pub media: Vec<PostedMedia>,
}

/// Card name from one alt text, if it is a card description.
pub fn extract_name(alt_text: &str) -> Option<&str> {
    MENTION
        .captures(alt_text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Every card name mentioned in the alt text of `posts`.
pub fn mentioned_names(posts: &[Post]) -> HashSet<String> {
    posts
        .iter()
        .flat_map(|post| post.media.iter())
        .filter_map(|media| media.alt_text.as_deref())
        .filter_map(extract_name)
        .map(str::to_string)
        .collect()
}

// X API v2 timeline wire format.

#[derive(Debug, Deserialize)]
pub(crate) struct TimelinePage {
    #[serde(default)]
    data: Vec<TimelinePost>,
    #[serde(default)]
    includes: Option<TimelineIncludes>,
    #[serde(default)]
    pub(crate) meta: Option<TimelineMeta>,
}

#[derive(Debug, Deserialize)]
struct TimelinePost {
    id: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    attachments: Option<Attachments>,
}

#[derive(Debug, Deserialize)]
struct Attachments {
    #[serde(default)]
    media_keys: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TimelineIncludes {
    #[serde(default)]
    media: Vec<PostedMedia>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TimelineMeta {
    #[serde(default)]
    pub(crate) next_token: Option<String>,
}

impl TimelinePage {
    /// Attach each post's media (looked up by key from `includes`).
    pub(crate) fn into_posts(self) -> Vec<Post> {
        let media: HashMap<String, PostedMedia> = self
            .includes
            .map(|inc| inc.media)
            .unwrap_or_default()
            .into_iter()
            .map(|m| (m.media_key.clone(), m))
            .collect();

        self.data
            .into_iter()
            .map(|post| {
                let attached = post
                    .attachments
                    .map(|a| a.media_keys)
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|key| media.get(key).cloned())
                    .collect();
                Post {
                    id: post.id,
                    text: post.text,
                    media: attached,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dnt_blurb::core::describe::describe_all;
    use dnt_blurb::schema::subject::{Face, Subject};

    fn post_with_alts(alts: &[&str]) -> Post {
        Post {
            id: "1".to_string(),
            text: "caption".to_string(),
            media: alts
                .iter()
                .enumerate()
                .map(|(i, alt)| PostedMedia {
                    media_key: format!("3_{}", i),
                    kind: Some("photo".to_string()),
                    alt_text: Some(alt.to_string()),
                })
                .collect(),
        }
    }

    #[test]
    fn mention_pattern_compiles() {
        assert_eq!(MENTION.captures_len(), 2);
    }

    #[test]
    fn extracts_name_from_description() {
        let mut subject = Subject::new("Test Cleric", 1.0, "Creature — Cleric");
        subject.power = Some("1".to_string());
        subject.toughness = Some("1".to_string());
        let alts = describe_all(&subject).unwrap();
        assert_eq!(extract_name(&alts[0]), Some("Test Cleric"));
    }

    #[test]
    fn names_with_punctuation_survive() {
        let mut subject = Subject::new("Thalia, Guardian of Thraben", 2.0, "Legendary Creature — Human Soldier");
        subject.oracle_text = Some("First strike.\nNoncreature spells cost {1} more to cast.".to_string());
        let alts = describe_all(&subject).unwrap();
        assert_eq!(extract_name(&alts[0]), Some("Thalia, Guardian of Thraben"));
    }

    #[test]
    fn dual_faced_posts_yield_the_full_name() {
        let mut subject = Subject::new(
            "Dawn Saint // Dusk Wraith",
            3.0,
            "Creature — Human Cleric // Creature — Spirit",
        );
        subject.layout = "transform".to_string();
        subject.faces = vec![
            Face {
                name: "Dawn Saint".to_string(),
                type_line: "Creature — Human Cleric".to_string(),
                ..Face::default()
            },
            Face {
                name: "Dusk Wraith".to_string(),
                type_line: "Creature — Spirit".to_string(),
                ..Face::default()
            },
        ];
        let alts = describe_all(&subject).unwrap();
        let alt_refs: Vec<&str> = alts.iter().map(String::as_str).collect();
        let names = mentioned_names(&[post_with_alts(&alt_refs)]);
        assert_eq!(names.len(), 1);
        assert!(names.contains("Dawn Saint // Dusk Wraith"));
    }

    #[test]
    fn unrelated_alt_text_is_ignored() {
        let posts = vec![
            post_with_alts(&["A photo of a cat.", "Magic: The Gathering card named but no newline"]),
            Post::default(),
        ];
        assert!(mentioned_names(&posts).is_empty());
    }

    #[test]
    fn timeline_media_is_joined_by_key() {
        let json = r#"{
            "data": [
                {"id": "10", "text": "first", "attachments": {"media_keys": ["3_b", "3_a"]}},
                {"id": "11", "text": "no media"}
            ],
            "includes": {
                "media": [
                    {"media_key": "3_a", "type": "photo", "alt_text": "back"},
                    {"media_key": "3_b", "type": "photo", "alt_text": "front"},
                    {"media_key": "3_z", "type": "photo"}
                ]
            },
            "meta": {"result_count": 2, "next_token": "abc"}
        }"#;
        let page: TimelinePage = serde_json::from_str(json).unwrap();
        assert_eq!(
            page.meta.as_ref().and_then(|m| m.next_token.as_deref()),
            Some("abc")
        );
        let posts = page.into_posts();
        assert_eq!(posts.len(), 2);
        let alts: Vec<Option<&str>> = posts[0]
            .media
            .iter()
            .map(|m| m.alt_text.as_deref())
            .collect();
        assert_eq!(alts, vec![Some("front"), Some("back")]);
        assert!(posts[1].media.is_empty());
    }

    #[test]
    fn empty_timeline_has_no_posts() {
        let page: TimelinePage = serde_json::from_str(r#"{"meta": {"result_count": 0}}"#).unwrap();
        assert!(page.into_posts().is_empty());
    }
}
