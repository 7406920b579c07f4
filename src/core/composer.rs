/// Caption composition: opener, middle and closer sentences plus the
/// occasional easter egg.

use rand::Rng;

use crate::core::phrases::{PhraseBook, PhraseError};
use crate::core::selector::SelectionContext;
use crate::core::template::Template;
use crate::core::BlurbError;
use crate::schema::subject::Subject;

/// Which fragments a caption was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrace {
    pub opener: usize,
    pub pool: String,
    pub middle: usize,
    pub closer: usize,
    pub easter_egg: bool,
}

/// Compose a caption for `subject`.
///
/// The subject is used as given; callers holding a dual-faced card should
/// pass [`Subject::representative`]. Two calls with the same subject draw
/// independently and will usually differ.
pub fn compose<R: Rng + ?Sized>(
    book: &PhraseBook,
    subject: &Subject,
    rng: &mut R,
) -> Result<String, BlurbError> {
    compose_traced(book, subject, rng).map(|(caption, _)| caption)
}

/// Like [`compose`], also reporting which fragments were drawn.
pub fn compose_traced<R: Rng + ?Sized>(
    book: &PhraseBook,
    subject: &Subject,
    rng: &mut R,
) -> Result<(String, CaptionTrace), BlurbError> {
    subject.validate()?;

    let (opener_idx, opener_t) = choose(&book.openers, "opener", rng)?;
    let opener = opener_t.render(subject, &book.lists, rng)?;

    let ctx = SelectionContext::from_subject(subject);
    let pools = ctx.eligible_pools(book);
    if pools.is_empty() {
        return Err(PhraseError::Invalid("no eligible middle pool".to_string()).into());
    }
    let pool = pools[rng.gen_range(0..pools.len())];
    let (middle_idx, middle_t) = choose(&pool.templates, "middle", rng)?;
    let middle = middle_t.render(subject, &book.lists, rng)?;

    let (closer_idx, closer_t) = choose(&book.closers, "closer", rng)?;
    let closer = closer_t.render(subject, &book.lists, rng)?;

    let mut caption = format!("{} {}\n\n{}", opener, middle, closer);

    let mut easter_egg = false;
    if let Some(egg) = &book.easter_egg {
        if (0.0..=1.0).contains(&egg.chance) && rng.gen_bool(egg.chance) {
            caption.push_str("\n\n");
            caption.push_str(&egg.text);
            easter_egg = true;
        }
    }

    Ok((
        caption,
        CaptionTrace {
            opener: opener_idx,
            pool: pool.name.clone(),
            middle: middle_idx,
            closer: closer_idx,
            easter_egg,
        },
    ))
}

fn choose<'t, R: Rng + ?Sized>(
    templates: &'t [Template],
    what: &str,
    rng: &mut R,
) -> Result<(usize, &'t Template), BlurbError> {
    if templates.is_empty() {
        return Err(PhraseError::Invalid(format!("no {} templates", what)).into());
    }
    let idx = rng.gen_range(0..templates.len());
    Ok((idx, &templates[idx]))
}
