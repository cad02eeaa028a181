//! Declarative resource schemas and the validator that checks request payloads
//! against them.
//!
//! A [`Schema`] is plain data: an ordered list of [`FieldSpec`]s. The
//! [`validate`] function interprets it against an untrusted JSON value and
//! either accepts the value unchanged or reports every [`Violation`] it found.

pub mod types;
pub mod validation;

pub use types::{Constraint, FieldSpec, FieldType, Mutability, Schema, UpdatePolicy};
pub use validation::{validate, Rule, ValidationResult, Violation};
