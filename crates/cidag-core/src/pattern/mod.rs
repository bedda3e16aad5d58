//! Module: pattern
//! Responsibility: compile pattern strings into ordered traversal hops and
//! re-serialize them canonically.
//! Does not own: traversal; see `query`.
//!
//! Grammar:
//! ```text
//! Pattern     := Hop+
//! Hop         := Direction? TypeMatcher Marker?
//! Direction   := '>' | '<'
//! TypeMatcher := Identifier | '*'
//! Marker      := '#'
//! ```
//!
//! A hop without a direction is a forward hop; on the first hop that means
//! "start at the root types". Whitespace between tokens is ignored.


use crate::model::ObjectModel;
use std::{fmt, iter::Peekable, str::CharIndices};
use thiserror::Error as ThisError;

///
/// PatternError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PatternError {
    #[error("pattern syntax error at {position}: {reason}")]
    Syntax {
        position: usize,
        reason: &'static str,
    },

    #[error("pattern references unknown type '{name}' at {position}")]
    UnknownType { name: String, position: usize },
}

impl PatternError {
    const fn syntax(position: usize, reason: &'static str) -> Self {
        Self::Syntax { position, reason }
    }
}

///
/// Direction
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Direction {
    /// Toward children (`>`).
    #[default]
    Forward,
    /// Toward the parent (`<`).
    Backward,
}

impl Direction {
    const fn symbol(self) -> char {
        match self {
            Self::Forward => '>',
            Self::Backward => '<',
        }
    }
}

///
/// TypeMatcher
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum TypeMatcher {
    /// Exactly one relation hop, objects of this type only.
    Type(String),
    /// Transitive closure in the hop's direction, every type.
    Any,
}

impl TypeMatcher {
    #[must_use]
    pub const fn is_wildcard(&self) -> bool {
        matches!(self, Self::Any)
    }
}

///
/// Hop
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Hop {
    pub direction: Direction,
    pub matcher: TypeMatcher,
    /// Objects reached by this hop go into the result.
    pub marked: bool,
}

impl Hop {
    #[must_use]
    pub const fn new(direction: Direction, matcher: TypeMatcher, marked: bool) -> Self {
        Self {
            direction,
            matcher,
            marked,
        }
    }
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.direction.symbol())?;
        match &self.matcher {
            TypeMatcher::Type(name) => f.write_str(name)?,
            TypeMatcher::Any => f.write_str("*")?,
        }
        if self.marked {
            f.write_str("#")?;
        }

        Ok(())
    }
}

///
/// Pattern
///
/// Parsed, registry-validated sequence of hops. `Display` produces the
/// canonical form: every hop carries an explicit direction and there is no
/// whitespace, so equal hop sequences always print identically.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Pattern {
    hops: Vec<Hop>,
}

impl Pattern {
    /// Parse a pattern string, validating concrete type names against the
    /// registry.
    pub fn parse(text: &str, model: &ObjectModel) -> Result<Self, PatternError> {
        let hops = Parser::new(text, model).parse()?;

        Ok(Self { hops })
    }

    #[must_use]
    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    /// True when at least one hop contributes to the result.
    #[must_use]
    pub fn is_marked(&self) -> bool {
        self.hops.iter().any(|hop| hop.marked)
    }

    #[must_use]
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for hop in &self.hops {
            write!(f, "{hop}")?;
        }

        Ok(())
    }
}

///
/// Parser
///

struct Parser<'a> {
    text: &'a str,
    chars: Peekable<CharIndices<'a>>,
    model: &'a ObjectModel,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str, model: &'a ObjectModel) -> Self {
        Self {
            text,
            chars: text.char_indices().peekable(),
            model,
        }
    }

    fn parse(mut self) -> Result<Vec<Hop>, PatternError> {
        let mut hops = Vec::new();

        while let Some(hop) = self.hop()? {
            hops.push(hop);
        }
        if hops.is_empty() {
            return Err(PatternError::syntax(0, "empty pattern"));
        }

        Ok(hops)
    }

    // Parse one hop; `None` at end of input.
    fn hop(&mut self) -> Result<Option<Hop>, PatternError> {
        self.skip_whitespace();
        let Some(&(start, c)) = self.chars.peek() else {
            return Ok(None);
        };

        // Phase 1: optional direction.
        let direction = match c {
            '>' => Some(Direction::Forward),
            '<' => Some(Direction::Backward),
            _ => None,
        };
        if direction.is_some() {
            self.chars.next();
            self.skip_whitespace();
        }

        // Phase 2: mandatory type matcher.
        let matcher = match self.chars.peek().copied() {
            None if direction.is_some() => {
                return Err(PatternError::syntax(
                    start,
                    "direction at end of pattern has no type matcher",
                ));
            }
            None => return Ok(None),
            Some((_, '*')) => {
                self.chars.next();
                TypeMatcher::Any
            }
            Some((pos, c)) if is_ident_char(c) => {
                let name = self.identifier(pos);
                if !self.model.contains(name) {
                    return Err(PatternError::UnknownType {
                        name: name.to_string(),
                        position: pos,
                    });
                }
                TypeMatcher::Type(name.to_string())
            }
            Some((pos, _)) if direction.is_some() => {
                return Err(PatternError::syntax(
                    pos,
                    "direction must be followed by a type name or '*'",
                ));
            }
            Some((pos, _)) => {
                return Err(PatternError::syntax(
                    pos,
                    "expected direction, type name or '*'",
                ));
            }
        };

        // Phase 3: optional marker.
        self.skip_whitespace();
        let marked = self.chars.next_if(|&(_, c)| c == '#').is_some();

        Ok(Some(Hop::new(direction.unwrap_or_default(), matcher, marked)))
    }

    fn identifier(&mut self, start: usize) -> &'a str {
        let mut end = start;
        while let Some((pos, c)) = self.chars.next_if(|&(_, c)| is_ident_char(c)) {
            end = pos + c.len_utf8();
        }

        &self.text[start..end]
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}
    }
}

/// Characters a type name may use; registration enforces the same set.
pub(crate) const fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
