/// Slot templates: parsing and rendering of single phrase fragments.

use rand::Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::subject::Subject;

#[derive(Debug, Error, PartialEq)]
pub enum TemplateError {
    #[error("template parse error: {0}")]
    Parse(String),
    #[error("unknown reference list: {0}")]
    UnknownList(String),
    #[error("nothing to pick from in '{0}'")]
    EmptyPick(String),
}

/// A segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TemplateSegment {
    /// Literal text, emitted as-is.
    Literal(String),
    /// The subject's name: `{name}`.
    Name,
    /// The subject's set code, upper-cased: `{set}`.
    SetCode,
    /// A uniform draw from one or more reference lists: `{pick:a+b}`.
    Pick { lists: Vec<String> },
    /// A uniform integer in an inclusive range: `{number:0:3}`.
    Number { min: i64, max: i64 },
}

/// A parsed template: a sequence of segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub segments: Vec<TemplateSegment>,
}

impl Template {
    /// Parse a template string into a sequence of segments.
    ///
    /// Syntax:
    /// - `{name}` → `Name`
    /// - `{set}` → `SetCode`
    /// - `{pick:list}` / `{pick:list+other}` → `Pick`
    /// - `{number:min:max}` → `Number`
    /// - `{{` / `}}` → literal braces
    /// - Everything else → `Literal`
    pub fn parse(input: &str) -> Result<Template, TemplateError> {
        let mut segments = Vec::new();
        let mut literal_buf = String::new();
        let chars: Vec<char> = input.chars().collect();
        let len = chars.len();
        let mut i = 0;

        while i < len {
            if chars[i] == '{' {
                // Escaped brace
                if i + 1 < len && chars[i + 1] == '{' {
                    literal_buf.push('{');
                    i += 2;
                    continue;
                }

                if !literal_buf.is_empty() {
                    segments.push(TemplateSegment::Literal(std::mem::take(&mut literal_buf)));
                }

                let start = i + 1;
                let mut end = start;
                let mut closed = false;
                while end < len {
                    if chars[end] == '{' {
                        return Err(TemplateError::Parse(
                            "nested braces are not allowed".to_string(),
                        ));
                    }
                    if chars[end] == '}' {
                        closed = true;
                        break;
                    }
                    end += 1;
                }

                if !closed {
                    return Err(TemplateError::Parse("unclosed brace".to_string()));
                }

                let content: String = chars[start..end].iter().collect();
                if content.is_empty() {
                    return Err(TemplateError::Parse("empty braces".to_string()));
                }

                segments.push(Self::parse_segment(&content)?);
                i = end + 1;
            } else if chars[i] == '}' {
                // Escaped closing brace
                if i + 1 < len && chars[i + 1] == '}' {
                    literal_buf.push('}');
                    i += 2;
                    continue;
                }
                return Err(TemplateError::Parse(
                    "unmatched closing brace".to_string(),
                ));
            } else {
                literal_buf.push(chars[i]);
                i += 1;
            }
        }

        if !literal_buf.is_empty() {
            segments.push(TemplateSegment::Literal(literal_buf));
        }

        Ok(Template { segments })
    }

    fn parse_segment(content: &str) -> Result<TemplateSegment, TemplateError> {
        match content {
            "name" => return Ok(TemplateSegment::Name),
            "set" => return Ok(TemplateSegment::SetCode),
            _ => {}
        }

        if let Some(rest) = content.strip_prefix("pick:") {
            let lists: Vec<String> = rest.split('+').map(|s| s.trim().to_string()).collect();
            if lists.iter().any(|l| l.is_empty()) {
                return Err(TemplateError::Parse(format!(
                    "invalid pick '{}': expected pick:list[+list...]",
                    content
                )));
            }
            return Ok(TemplateSegment::Pick { lists });
        }

        if let Some(rest) = content.strip_prefix("number:") {
            let parts: Vec<&str> = rest.splitn(2, ':').collect();
            if parts.len() == 2 {
                if let (Ok(min), Ok(max)) = (parts[0].trim().parse(), parts[1].trim().parse()) {
                    return Ok(TemplateSegment::Number { min, max });
                }
            }
            return Err(TemplateError::Parse(format!(
                "invalid number slot '{}': expected number:min:max",
                content
            )));
        }

        Err(TemplateError::Parse(format!("unknown slot '{}'", content)))
    }

    /// Names of every reference list this template draws from.
    pub fn referenced_lists(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().flat_map(|segment| match segment {
            TemplateSegment::Pick { lists } => lists.iter().map(String::as_str).collect::<Vec<&str>>(),
            _ => Vec::new(),
        })
    }

    /// Fill every slot. Each slot draws independently from `rng`.
    pub fn render<R: Rng + ?Sized>(
        &self,
        subject: &Subject,
        lists: &FxHashMap<String, Vec<String>>,
        rng: &mut R,
    ) -> Result<String, TemplateError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                TemplateSegment::Literal(text) => out.push_str(text),
                TemplateSegment::Name => out.push_str(&subject.name),
                TemplateSegment::SetCode => {
                    if let Some(set) = &subject.set {
                        out.push_str(&set.to_uppercase());
                    }
                }
                TemplateSegment::Pick { lists: names } => {
                    out.push_str(pick(names, lists, rng)?);
                }
                TemplateSegment::Number { min, max } => {
                    let (lo, hi) = if min <= max { (*min, *max) } else { (*max, *min) };
                    out.push_str(&rng.gen_range(lo..=hi).to_string());
                }
            }
        }
        Ok(out)
    }
}

/// Uniform draw over the concatenation of the named lists.
fn pick<'a, R: Rng + ?Sized>(
    names: &[String],
    lists: &'a FxHashMap<String, Vec<String>>,
    rng: &mut R,
) -> Result<&'a str, TemplateError> {
    let mut pools = Vec::with_capacity(names.len());
    for name in names {
        let list = lists
            .get(name)
            .ok_or_else(|| TemplateError::UnknownList(name.clone()))?;
        pools.push(list);
    }

    let total: usize = pools.iter().map(|l| l.len()).sum();
    if total == 0 {
        return Err(TemplateError::EmptyPick(names.join("+")));
    }

    let mut index = rng.gen_range(0..total);
    for list in pools {
        if index < list.len() {
            return Ok(list[index].as_str());
        }
        index -= list.len();
    }
    Err(TemplateError::EmptyPick(names.join("+")))
}
