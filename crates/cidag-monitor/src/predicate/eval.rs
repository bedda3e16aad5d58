use crate::predicate::{CompareOp, ComparePredicate, Literal, Predicate};
use cidag_core::{
    object::Object,
    query::{ObjectRef, ParentLink},
    value::Value,
};
use std::cmp::Ordering;
use thiserror::Error as ThisError;

///
/// EvalError
///
/// Raised when a predicate needs an attribute the object does not carry.
/// The matcher turns this into a skip for that (object, rule) pairing.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum EvalError {
    #[error("attribute '{field}' is missing on {object}")]
    MissingAttribute { field: String, object: String },
}

///
/// FieldPresence
///
/// Result of attempting to read a field from a row during predicate
/// evaluation. This distinguishes between a missing field and a present
/// field whose value may be `Value::Null`.
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldPresence<'a> {
    Present(&'a Value),
    Missing,
}

///
/// Row
///
/// Uniform attribute accessor over objects. Decouples predicate
/// evaluation from how an object is held.
///

pub trait Row {
    fn field(&self, path: &str) -> FieldPresence<'_>;
}

impl Row for Object {
    fn field(&self, path: &str) -> FieldPresence<'_> {
        self.get(path)
            .map_or(FieldPresence::Missing, FieldPresence::Present)
    }
}

impl Row for ObjectRef<'_> {
    fn field(&self, path: &str) -> FieldPresence<'_> {
        self.object().field(path)
    }
}

// Read a field that the predicate requires.
fn require<'a>(object: &'a ObjectRef<'_>, field: &str) -> Result<&'a Value, EvalError> {
    match object.field(field) {
        FieldPresence::Present(value) => Ok(value),
        FieldPresence::Missing => Err(EvalError::MissingAttribute {
            field: field.to_string(),
            object: object.key().to_string(),
        }),
    }
}

///
/// Evaluate a predicate against one object of a view.
///
/// - `all` / `any` short-circuit left to right
/// - comparisons across value families are false, never errors
/// - reading an absent attribute is an error (`is_missing` excepted)
///
pub fn eval(object: &ObjectRef<'_>, predicate: &Predicate) -> Result<bool, EvalError> {
    match predicate {
        Predicate::True => Ok(true),
        Predicate::False => Ok(false),

        Predicate::All(children) => {
            for child in children {
                if !eval(object, child)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Predicate::Any(children) => {
            for child in children {
                if eval(object, child)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Predicate::Not(inner) => eval(object, inner).map(|matched| !matched),

        Predicate::Compare(cmp) => eval_compare(object, cmp),
        Predicate::IsMissing { field } => Ok(object.field(field) == FieldPresence::Missing),
        Predicate::IsNull { field } => require(object, field).map(Value::is_null),
        Predicate::Contains { field, value } => {
            let actual = require(object, field)?;
            // NOTE: Unsupported containment is treated as a non-match.
            Ok(actual.contains(&value.to_value()).unwrap_or(false))
        }

        Predicate::Parent(inner) => match object.parent() {
            ParentLink::Resolved(parent) => eval(&parent, inner),
            ParentLink::Root | ParentLink::Unresolved(_) => Ok(false),
        },
        Predicate::AnyChild { type_name, when } => {
            for child in object.children().filter(|c| c.type_name() == type_name) {
                if eval(&child, when)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}

fn eval_compare(object: &ObjectRef<'_>, cmp: &ComparePredicate) -> Result<bool, EvalError> {
    let ComparePredicate { field, op, value } = cmp;
    let actual = require(object, field)?;

    if let (CompareOp::In, Literal::List(items)) = (op, value) {
        return Ok(items
            .iter()
            .any(|item| actual.compare(&item.to_value()) == Some(Ordering::Equal)));
    }

    let Some(ordering) = actual.compare(&value.to_value()) else {
        // Incomparable families only satisfy `ne`.
        return Ok(*op == CompareOp::Ne);
    };

    Ok(match op {
        CompareOp::Eq | CompareOp::In => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Lte => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Gte => ordering != Ordering::Less,
    })
}
