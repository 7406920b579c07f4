/// Alt text for card images. Fully deterministic.

use crate::core::BlurbError;
use crate::schema::subject::{Face, Subject};

/// Fixed wording that precedes the card name on the first line. The
/// driver reads previously posted names back out of this line.
pub const NAME_PREFIX: &str = "Magic: The Gathering card named ";

/// Describe one face of `subject` for screen readers.
///
/// ```text
/// A Magic: The Gathering card named Test Cleric.
/// It is a 1 mana value Creature — Cleric with 1 power and 1 toughness.
/// It's oracle text is ""
/// ```
pub fn describe(
    subject: &Subject,
    face: &Face,
    face_index: usize,
    total_faces: usize,
) -> Result<String, BlurbError> {
    subject.validate()?;
    if total_faces == 0 || face_index >= total_faces {
        return Err(BlurbError::FaceOutOfRange {
            index: face_index,
            total: total_faces,
        });
    }

    let lead = match (total_faces, face_index) {
        (1, _) => "A",
        (_, 0) => "The front face of a",
        _ => "The back face of a",
    };

    let mana_value = face.mana_value.unwrap_or(subject.mana_value);

    let stats = if let Some((power, toughness)) = face.power_toughness() {
        format!(" with {} power and {} toughness", power, toughness)
    } else if let Some(loyalty) = &face.loyalty {
        format!(" with {} loyalty", loyalty)
    } else {
        String::new()
    };

    Ok(format!(
        "{} {}{}.\nIt is a {} mana value {}{}.\nIt's oracle text is \"{}\"",
        lead,
        NAME_PREFIX,
        subject.name,
        mana_value,
        face.type_line,
        stats,
        face.oracle_text.as_deref().unwrap_or(""),
    ))
}

/// Alt text for every face of `subject`, front first.
pub fn describe_all(subject: &Subject) -> Result<Vec<String>, BlurbError> {
    let faces = subject.faces();
    let total = faces.len();
    faces
        .iter()
        .enumerate()
        .map(|(i, face)| describe(subject, face, i, total))
        .collect()
}
