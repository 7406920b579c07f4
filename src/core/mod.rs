pub mod composer;
pub mod describe;
pub mod phrases;
pub mod pipeline;
pub mod selector;
pub mod template;

use thiserror::Error;

use crate::core::phrases::PhraseError;
use crate::core::template::TemplateError;

/// Errors from caption and alt-text generation.
#[derive(Debug, Error)]
pub enum BlurbError {
    #[error("subject has no name")]
    MissingName,
    #[error("face index {index} out of range for {total} face(s)")]
    FaceOutOfRange { index: usize, total: usize },
    #[error("phrase book error: {0}")]
    Phrase(#[from] PhraseError),
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
}
