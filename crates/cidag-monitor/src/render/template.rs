//! Substitution templates: literal text with `{path}` placeholders.

use std::fmt;
use thiserror::Error as ThisError;

///
/// TemplateError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum TemplateError {
    #[error("unterminated placeholder starting at byte {position}")]
    Unterminated { position: usize },

    #[error("empty placeholder at byte {position}")]
    EmptyPlaceholder { position: usize },

    #[error("unmatched '}}' at byte {position}")]
    UnmatchedClose { position: usize },
}

///
/// Segment
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Segment {
    Literal(String),
    Field(String),
}

///
/// TemplateText
///
/// Parsed template. `{{` and `}}` are literal braces; anything else between
/// braces is a field path, trimmed of surrounding whitespace.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TemplateText {
    source: String,
    segments: Vec<Segment>,
}

impl TemplateText {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((position, c)) = chars.next() {
            match c {
                '{' if chars.next_if(|&(_, c)| c == '{').is_some() => literal.push('{'),
                '}' if chars.next_if(|&(_, c)| c == '}').is_some() => literal.push('}'),
                '}' => return Err(TemplateError::UnmatchedClose { position }),
                '{' => {
                    let mut field = String::new();
                    loop {
                        match chars.next() {
                            Some((_, '}')) => break,
                            Some((_, '{')) | None => {
                                return Err(TemplateError::Unterminated { position });
                            }
                            Some((_, c)) => field.push(c),
                        }
                    }

                    let field = field.trim();
                    if field.is_empty() {
                        return Err(TemplateError::EmptyPlaceholder { position });
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(field.to_string()));
                }
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Field paths in order of appearance.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field(field) => Some(field.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Substitute every field. Fails with the first field `lookup` cannot
    /// resolve; nothing partial is returned.
    pub fn render<F>(&self, mut lookup: F) -> Result<String, &str>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => out.push_str(&lookup(field).ok_or(field.as_str())?),
            }
        }

        Ok(out)
    }
}

impl fmt::Display for TemplateText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
