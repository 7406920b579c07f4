//! D&T Blurb: spoiler-season captions and card alt text.
//!
//! Composes promotional captions from pools of phrase templates,
//! conditioned on a card's type line, toughness and rules text, and
//! describes each card face for screen readers. Pure and synchronous; the
//! posting bot lives in the `dnt-blurb-bot` crate.

pub mod core;
pub mod schema;
