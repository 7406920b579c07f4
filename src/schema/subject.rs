use serde::{Deserialize, Serialize};

use crate::core::BlurbError;

/// Layouts whose faces are printed on separate sides of the card and
/// therefore get one image (and one alt text) each.
pub const DUAL_FACED_LAYOUTS: &[&str] = &["transform", "modal_dfc"];

/// One printed face of a card.
///
/// Fields left empty fall back to the owning [`Subject`] where that makes
/// sense (mana value in particular is usually only given card-wide).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub name: String,
    #[serde(default, alias = "cmc")]
    pub mana_value: Option<f64>,
    #[serde(default)]
    pub type_line: String,
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub power: Option<String>,
    #[serde(default)]
    pub toughness: Option<String>,
    #[serde(default)]
    pub loyalty: Option<String>,
}

impl Face {
    /// Power/toughness pair, only when both halves are printed.
    pub fn power_toughness(&self) -> Option<(&str, &str)> {
        match (&self.power, &self.toughness) {
            (Some(p), Some(t)) => Some((p.as_str(), t.as_str())),
            _ => None,
        }
    }
}

/// The card being promoted.
///
/// Built by the driver from a catalog record. Core operations refuse a
/// subject without a name rather than producing degraded text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    #[serde(default, alias = "cmc")]
    pub mana_value: f64,
    #[serde(default)]
    pub type_line: String,
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub power: Option<String>,
    #[serde(default)]
    pub toughness: Option<String>,
    #[serde(default)]
    pub loyalty: Option<String>,
    /// Set code as printed by the catalog (lower case, e.g. `"mh3"`).
    #[serde(default)]
    pub set: Option<String>,
    #[serde(default = "default_layout")]
    pub layout: String,
    #[serde(default, alias = "card_faces")]
    pub faces: Vec<Face>,
}

fn default_layout() -> String {
    "normal".to_string()
}

impl Subject {
    /// A single-faced subject with no stats, oracle text or set.
    pub fn new(name: impl Into<String>, mana_value: f64, type_line: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mana_value,
            type_line: type_line.into(),
            oracle_text: None,
            power: None,
            toughness: None,
            loyalty: None,
            set: None,
            layout: default_layout(),
            faces: Vec::new(),
        }
    }

    /// Fails when the subject has no usable name.
    pub fn validate(&self) -> Result<(), BlurbError> {
        if self.name.trim().is_empty() {
            return Err(BlurbError::MissingName);
        }
        Ok(())
    }

    /// Returns true if each face gets its own image.
    pub fn is_dual_faced(&self) -> bool {
        DUAL_FACED_LAYOUTS.contains(&self.layout.as_str()) && self.faces.len() >= 2
    }

    /// The faces to render, front first.
    ///
    /// Dual-faced subjects yield their first two printed faces; everything
    /// else (including split and adventure cards, which share one image)
    /// yields a single face built from the subject's own fields.
    pub fn faces(&self) -> Vec<Face> {
        if self.is_dual_faced() {
            self.faces.iter().take(2).cloned().collect()
        } else {
            vec![self.own_face()]
        }
    }

    /// The subject viewed as the face it would print on a single-faced card.
    pub fn own_face(&self) -> Face {
        Face {
            name: self.name.clone(),
            mana_value: Some(self.mana_value),
            type_line: self.type_line.clone(),
            oracle_text: self.oracle_text.clone(),
            power: self.power.clone(),
            toughness: self.toughness.clone(),
            loyalty: self.loyalty.clone(),
        }
    }

    /// The view captions are composed from.
    ///
    /// For a dual-faced subject every field the front face prints replaces
    /// the card-wide field, name included, so the blurb talks about the
    /// front face. Other subjects are returned unchanged.
    pub fn representative(&self) -> Subject {
        if !self.is_dual_faced() {
            return self.clone();
        }
        let front = &self.faces[0];
        Subject {
            name: if front.name.is_empty() {
                self.name.clone()
            } else {
                front.name.clone()
            },
            mana_value: front.mana_value.unwrap_or(self.mana_value),
            type_line: if front.type_line.is_empty() {
                self.type_line.clone()
            } else {
                front.type_line.clone()
            },
            oracle_text: front.oracle_text.clone().or_else(|| self.oracle_text.clone()),
            power: front.power.clone().or_else(|| self.power.clone()),
            toughness: front.toughness.clone().or_else(|| self.toughness.clone()),
            loyalty: front.loyalty.clone().or_else(|| self.loyalty.clone()),
            set: self.set.clone(),
            layout: self.layout.clone(),
            faces: self.faces.clone(),
        }
    }

    /// Toughness as a number, when it is one. `*` and `1+*` are not.
    pub fn numeric_toughness(&self) -> Option<f64> {
        self.toughness.as_deref().and_then(|t| t.trim().parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_dfc() -> Subject {
        Subject {
            name: "Brutal Cathar // Moonrage Brute".to_string(),
            mana_value: 3.0,
            type_line: "Creature — Human Soldier Werewolf // Creature — Werewolf".to_string(),
            oracle_text: None,
            power: None,
            toughness: None,
            loyalty: None,
            set: Some("vow".to_string()),
            layout: "transform".to_string(),
            faces: vec![
                Face {
                    name: "Brutal Cathar".to_string(),
                    mana_value: None,
                    type_line: "Creature — Human Soldier Werewolf".to_string(),
                    oracle_text: Some("When this creature enters the battlefield or transforms into Brutal Cathar, exile target creature an opponent controls until this creature leaves the battlefield.".to_string()),
                    power: Some("2".to_string()),
                    toughness: Some("2".to_string()),
                    loyalty: None,
                },
                Face {
                    name: "Moonrage Brute".to_string(),
                    mana_value: None,
                    type_line: "Creature — Werewolf".to_string(),
                    oracle_text: Some("First strike\nWard—Pay 3 life.".to_string()),
                    power: Some("3".to_string()),
                    toughness: Some("3".to_string()),
                    loyalty: None,
                },
            ],
        }
    }

    #[test]
    fn validate_rejects_blank_name() {
        assert!(Subject::new("", 1.0, "Creature").validate().is_err());
        assert!(Subject::new("   ", 1.0, "Creature").validate().is_err());
        assert!(Subject::new("Thalia", 2.0, "Creature").validate().is_ok());
    }

    #[test]
    fn single_faced_yields_own_face() {
        let mut subject = Subject::new("Test Cleric", 1.0, "Creature — Cleric");
        subject.power = Some("1".to_string());
        subject.toughness = Some("1".to_string());

        let faces = subject.faces();
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].name, "Test Cleric");
        assert_eq!(faces[0].mana_value, Some(1.0));
        assert_eq!(faces[0].power_toughness(), Some(("1", "1")));
    }

    #[test]
    fn split_layout_is_not_dual_faced() {
        let mut subject = make_dfc();
        subject.layout = "split".to_string();
        assert!(!subject.is_dual_faced());
        assert_eq!(subject.faces().len(), 1);
    }

    #[test]
    fn dual_faced_yields_both_faces() {
        let subject = make_dfc();
        assert!(subject.is_dual_faced());
        let faces = subject.faces();
        assert_eq!(faces.len(), 2);
        assert_eq!(faces[1].name, "Moonrage Brute");
    }

    #[test]
    fn representative_takes_front_face() {
        let view = make_dfc().representative();
        assert_eq!(view.name, "Brutal Cathar");
        assert_eq!(view.type_line, "Creature — Human Soldier Werewolf");
        assert_eq!(view.toughness.as_deref(), Some("2"));
        assert_eq!(view.mana_value, 3.0);
        assert_eq!(view.set.as_deref(), Some("vow"));
    }

    #[test]
    fn representative_of_single_faced_is_identity() {
        let subject = Subject::new("Solitude", 5.0, "Creature — Elemental Incarnation");
        assert_eq!(subject.representative(), subject);
    }

    #[test]
    fn numeric_toughness_ignores_stars() {
        let mut subject = Subject::new("Tarmogoyf", 2.0, "Creature — Lhurgoyf");
        subject.toughness = Some("1+*".to_string());
        assert_eq!(subject.numeric_toughness(), None);
        subject.toughness = Some("2".to_string());
        assert_eq!(subject.numeric_toughness(), Some(2.0));
        subject.toughness = None;
        assert_eq!(subject.numeric_toughness(), None);
    }

    #[test]
    fn deserializes_catalog_field_names() {
        let input = r#"(
            name: "Kytheon, Hero of Akros // Gideon, Battle-Forged",
            cmc: 1.0,
            type_line: "Legendary Creature — Human Soldier // Legendary Planeswalker — Gideon",
            layout: "transform",
            card_faces: [
                (name: "Kytheon, Hero of Akros", type_line: "Legendary Creature — Human Soldier", power: Some("2"), toughness: Some("1")),
                (name: "Gideon, Battle-Forged", type_line: "Legendary Planeswalker — Gideon", loyalty: Some("3")),
            ],
        )"#;
        let subject: Subject = ron::from_str(input).unwrap();
        assert_eq!(subject.mana_value, 1.0);
        assert_eq!(subject.faces.len(), 2);
        assert_eq!(subject.faces[1].loyalty.as_deref(), Some("3"));
    }
}
