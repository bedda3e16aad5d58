//! Rule predicates as data.
//!
//! A predicate is tagged configuration evaluated against one object of an
//! `ObjectView`, optionally consulting its resolved parent or children.

mod eval;


use cidag_core::value::Value;
use serde::Deserialize;

pub use eval::{EvalError, FieldPresence, Row, eval};

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    /// Attribute equals one of the listed literals.
    In,
}

///
/// Literal
/// Configuration-side constant a predicate compares against.
///

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Self>),
}

impl Literal {
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(n) => Value::Int(*n),
            Self::Float(n) => Value::Float(*n),
            Self::Text(s) => Value::Text(s.clone()),
            Self::List(items) => Value::List(items.iter().map(Self::to_value).collect()),
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Literal {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

///
/// ComparePredicate
///

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ComparePredicate {
    pub field: String,
    pub op: CompareOp,
    pub value: Literal,
}

///
/// Predicate
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    #[default]
    True,
    False,

    All(Vec<Self>),
    Any(Vec<Self>),
    Not(Box<Self>),

    Compare(ComparePredicate),
    IsMissing {
        field: String,
    },
    IsNull {
        field: String,
    },
    /// Text substring or list membership.
    Contains {
        field: String,
        value: Literal,
    },

    /// Evaluate against the resolved parent; false for roots and dangling
    /// foreign keys.
    Parent(Box<Self>),
    /// True if any child of the given type satisfies `when`.
    AnyChild {
        #[serde(rename = "type")]
        type_name: String,
        when: Box<Self>,
    },
}

impl Predicate {
    #[must_use]
    pub fn compare(field: impl Into<String>, op: CompareOp, value: impl Into<Literal>) -> Self {
        Self::Compare(ComparePredicate {
            field: field.into(),
            op,
            value: value.into(),
        })
    }

    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Literal>) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    /// Type names referenced by `any_child` anywhere in the tree.
    pub(crate) fn child_types(&self, out: &mut Vec<String>) {
        match self {
            Self::All(children) | Self::Any(children) => {
                children.iter().for_each(|child| child.child_types(out));
            }
            Self::Not(inner) | Self::Parent(inner) => inner.child_types(out),
            Self::AnyChild { type_name, when } => {
                out.push(type_name.clone());
                when.child_types(out);
            }
            Self::True
            | Self::False
            | Self::Compare(_)
            | Self::IsMissing { .. }
            | Self::IsNull { .. }
            | Self::Contains { .. } => {}
        }
    }
}
