/// Phrase pools: reference lists and sentence templates, loaded from RON.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::core::template::{Template, TemplateError, TemplateSegment};

/// The Death & Taxes phrase book shipped with the crate.
const STANDARD_PHRASES: &str = include_str!("../../phrase_data/death_and_taxes.ron");

#[derive(Debug, Error)]
pub enum PhraseError {
    #[error("{0}")]
    Template(#[from] TemplateError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid phrase book: {0}")]
    Invalid(String),
}

/// A group of middle-sentence templates with tag preconditions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlePool {
    pub name: String,
    pub requires: Vec<String>,
    pub excludes: Vec<String>,
    pub templates: Vec<Template>,
}

impl MiddlePool {
    /// True if this pool has no preconditions at all.
    pub fn is_unconditional(&self) -> bool {
        self.requires.is_empty() && self.excludes.is_empty()
    }
}

/// A rare trailing paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EasterEgg {
    /// Probability of appending the text to a caption (0.0..=1.0).
    pub chance: f64,
    pub text: String,
}

/// Everything the composer draws from.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PhraseBook {
    pub lists: FxHashMap<String, Vec<String>>,
    pub openers: Vec<Template>,
    pub middles: Vec<MiddlePool>,
    pub closers: Vec<Template>,
    pub easter_egg: Option<EasterEgg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A single finding from [`PhraseBook::problems`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub severity: Severity,
    pub message: String,
}

// The RON files name templates as plain strings; these are parsed into
// `Template`s after deserialization.

#[derive(Debug, Deserialize)]
#[serde(rename = "Pool")]
struct RonPool {
    name: String,
    #[serde(default)]
    requires: Vec<String>,
    #[serde(default)]
    excludes: Vec<String>,
    templates: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename = "PhraseBook")]
struct RonPhraseBook {
    #[serde(default)]
    lists: HashMap<String, Vec<String>>,
    #[serde(default)]
    openers: Vec<String>,
    #[serde(default)]
    middles: Vec<RonPool>,
    #[serde(default)]
    closers: Vec<String>,
    #[serde(default)]
    easter_egg: Option<EasterEgg>,
}

fn parse_all(texts: &[String]) -> Result<Vec<Template>, TemplateError> {
    texts.iter().map(|t| Template::parse(t)).collect()
}

impl PhraseBook {
    /// The built-in Death & Taxes phrase book, parsed and validated.
    pub fn standard() -> Result<PhraseBook, PhraseError> {
        let book = Self::parse_ron(STANDARD_PHRASES)?;
        book.validate()?;
        Ok(book)
    }

    /// Load a phrase book from a RON file. Not validated.
    pub fn load_from_ron(path: &Path) -> Result<PhraseBook, PhraseError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Merge every `.ron` file under `dir` (recursively, sorted by path)
    /// into this book. Files that cannot be read or parsed are skipped and
    /// reported as error-level problems.
    pub fn merge_dir(&mut self, dir: &Path) -> Vec<Problem> {
        let mut failures = Vec::new();
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                failures.push(Problem {
                    severity: Severity::Error,
                    message: format!("cannot read {}: {}", dir.display(), e),
                });
                return failures;
            }
        };

        let mut paths: Vec<_> = entries.flatten().map(|e| e.path()).collect();
        paths.sort();
        for path in paths {
            if path.is_dir() {
                failures.extend(self.merge_dir(&path));
            } else if path.extension().and_then(|s| s.to_str()) == Some("ron") {
                match Self::load_from_ron(&path) {
                    Ok(other) => self.merge(other),
                    Err(e) => failures.push(Problem {
                        severity: Severity::Error,
                        message: format!("failed to load {}: {}", path.display(), e),
                    }),
                }
            }
        }
        failures
    }

    /// Parse a phrase book from a RON string. Not validated.
    pub fn parse_ron(input: &str) -> Result<PhraseBook, PhraseError> {
        let raw: RonPhraseBook = ron::from_str(input)?;

        let mut middles = Vec::with_capacity(raw.middles.len());
        for pool in raw.middles {
            middles.push(MiddlePool {
                name: pool.name,
                requires: pool.requires,
                excludes: pool.excludes,
                templates: parse_all(&pool.templates)?,
            });
        }

        Ok(PhraseBook {
            lists: raw.lists.into_iter().collect(),
            openers: parse_all(&raw.openers)?,
            middles,
            closers: parse_all(&raw.closers)?,
            easter_egg: raw.easter_egg,
        })
    }

    /// Merge another phrase book into this one.
    ///
    /// Lists and middle pools from `other` replace ours by name; a
    /// non-empty opener or closer pool in `other` replaces ours wholesale,
    /// as does its easter egg when it has one.
    pub fn merge(&mut self, other: PhraseBook) {
        for (name, list) in other.lists {
            self.lists.insert(name, list);
        }
        for pool in other.middles {
            match self.middles.iter_mut().find(|p| p.name == pool.name) {
                Some(existing) => *existing = pool,
                None => self.middles.push(pool),
            }
        }
        if !other.openers.is_empty() {
            self.openers = other.openers;
        }
        if !other.closers.is_empty() {
            self.closers = other.closers;
        }
        if other.easter_egg.is_some() {
            self.easter_egg = other.easter_egg;
        }
    }

    /// Look up a middle pool by name.
    pub fn pool(&self, name: &str) -> Option<&MiddlePool> {
        self.middles.iter().find(|p| p.name == name)
    }

    /// Every template in the book with a label saying where it lives.
    fn labelled_templates(&self) -> Vec<(String, &Template)> {
        let mut out = Vec::new();
        for (i, t) in self.openers.iter().enumerate() {
            out.push((format!("opener #{}", i), t));
        }
        for pool in &self.middles {
            for (i, t) in pool.templates.iter().enumerate() {
                out.push((format!("middle pool '{}' #{}", pool.name, i), t));
            }
        }
        for (i, t) in self.closers.iter().enumerate() {
            out.push((format!("closer #{}", i), t));
        }
        out
    }

    /// Check the book for anything that would make composition fail, plus
    /// softer quality warnings.
    pub fn problems(&self) -> Vec<Problem> {
        let mut problems = Vec::new();
        let error = |message: String| Problem {
            severity: Severity::Error,
            message,
        };

        if self.openers.is_empty() {
            problems.push(error("no opener templates".to_string()));
        }
        if self.closers.is_empty() {
            problems.push(error("no closer templates".to_string()));
        }
        if !self.middles.iter().any(MiddlePool::is_unconditional) {
            problems.push(error(
                "no unconditional middle pool; some subjects would have nothing to draw from"
                    .to_string(),
            ));
        }
        for pool in &self.middles {
            if pool.templates.is_empty() {
                problems.push(error(format!("middle pool '{}' has no templates", pool.name)));
            }
        }
        if let Some(egg) = &self.easter_egg {
            if !(0.0..=1.0).contains(&egg.chance) {
                problems.push(error(format!(
                    "easter egg chance {} is outside 0..=1",
                    egg.chance
                )));
            }
        }

        let mut used = rustc_hash::FxHashSet::default();
        for (label, template) in self.labelled_templates() {
            for segment in &template.segments {
                match segment {
                    TemplateSegment::Pick { lists } => {
                        for name in lists {
                            used.insert(name.as_str());
                            match self.lists.get(name) {
                                None => problems.push(error(format!(
                                    "{} references unknown list '{}'",
                                    label, name
                                ))),
                                Some(list) if list.is_empty() => problems.push(error(format!(
                                    "{} references empty list '{}'",
                                    label, name
                                ))),
                                Some(_) => {}
                            }
                        }
                    }
                    TemplateSegment::Number { min, max } if min > max => {
                        problems.push(error(format!(
                            "{} has number slot with min {} > max {}",
                            label, min, max
                        )));
                    }
                    _ => {}
                }
            }
        }

        let warning = |message: String| Problem {
            severity: Severity::Warning,
            message,
        };
        for pool in &self.middles {
            if !pool.templates.is_empty() && pool.templates.len() < 3 {
                problems.push(warning(format!(
                    "middle pool '{}' has only {} templates (minimum 3 recommended)",
                    pool.name,
                    pool.templates.len()
                )));
            }
        }
        let mut unused: Vec<&str> = self
            .lists
            .keys()
            .map(String::as_str)
            .filter(|name| !used.contains(name))
            .collect();
        unused.sort_unstable();
        for name in unused {
            problems.push(warning(format!("list '{}' is never referenced", name)));
        }

        problems
    }

    /// Fails on the first error-level problem. Warnings are ignored.
    pub fn validate(&self) -> Result<(), PhraseError> {
        match self
            .problems()
            .into_iter()
            .find(|p| p.severity == Severity::Error)
        {
            Some(problem) => Err(PhraseError::Invalid(problem.message)),
            None => Ok(()),
        }
    }
}
