/// The blurb engine: a validated phrase book plus the random source that
/// drives it.
///
/// Wires together representative-face selection, caption composition and
/// alt-text generation.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

use crate::core::composer::{compose_traced, CaptionTrace};
use crate::core::describe::describe_all;
use crate::core::phrases::PhraseBook;
use crate::core::BlurbError;
use crate::schema::subject::Subject;

/// The top-level blurb engine. Built via `BlurbEngine::builder()`.
pub struct BlurbEngine {
    phrases: PhraseBook,
    rng: StdRng,
    seed: Option<u64>,
}

/// Builder for constructing a `BlurbEngine`.
pub struct BlurbEngineBuilder {
    seed: Option<u64>,
    /// Directly provided phrases (for testing without files).
    phrases: Option<PhraseBook>,
    /// Extra phrase files merged over the base book, in order.
    phrase_files: Vec<PathBuf>,
}

impl BlurbEngine {
    pub fn builder() -> BlurbEngineBuilder {
        BlurbEngineBuilder {
            seed: None,
            phrases: None,
            phrase_files: Vec::new(),
        }
    }

    pub fn phrases(&self) -> &PhraseBook {
        &self.phrases
    }

    /// The seed this engine was built with, if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Compose a caption from the subject's representative view.
    pub fn caption(&mut self, subject: &Subject) -> Result<String, BlurbError> {
        self.caption_traced(subject).map(|(caption, _)| caption)
    }

    /// Compose a caption and report which fragments were drawn.
    pub fn caption_traced(
        &mut self,
        subject: &Subject,
    ) -> Result<(String, CaptionTrace), BlurbError> {
        subject.validate()?;
        let view = subject.representative();
        compose_traced(&self.phrases, &view, &mut self.rng)
    }

    /// Compose several independent captions for the same subject.
    pub fn caption_variants(
        &mut self,
        subject: &Subject,
        count: usize,
    ) -> Result<Vec<String>, BlurbError> {
        let mut results = Vec::with_capacity(count);
        for _ in 0..count {
            results.push(self.caption(subject)?);
        }
        Ok(results)
    }

    /// Alt text for every face of the subject, front first.
    pub fn alt_texts(&self, subject: &Subject) -> Result<Vec<String>, BlurbError> {
        describe_all(subject)
    }
}

impl BlurbEngineBuilder {
    /// Fix the random source. Without a seed the engine draws from entropy.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Provide phrases directly instead of the built-in book.
    pub fn with_phrases(mut self, phrases: PhraseBook) -> Self {
        self.phrases = Some(phrases);
        self
    }

    /// Merge a RON phrase file over the base book.
    pub fn phrase_file(mut self, path: impl AsRef<Path>) -> Self {
        self.phrase_files.push(path.as_ref().to_path_buf());
        self
    }

    pub fn build(self) -> Result<BlurbEngine, BlurbError> {
        let mut phrases = match self.phrases {
            Some(phrases) => phrases,
            None => PhraseBook::standard()?,
        };

        for path in &self.phrase_files {
            phrases.merge(PhraseBook::load_from_ron(path)?);
        }

        phrases.validate()?;

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(BlurbEngine {
            phrases,
            rng,
            seed: self.seed,
        })
    }
}
