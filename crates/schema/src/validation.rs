//! Payload validation against a [`Schema`].

use std::fmt;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::{Map, Value};
use url::Url;

use crate::types::{Constraint, FieldSpec, FieldType, Schema};

/// Field name used for violations that concern the payload as a whole.
pub const ROOT: &str = "$";

/// The rule a payload broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    NotAnObject,
    Required,
    Type { expected: FieldType },
    NonEmpty,
    Minimum(i64),
    Maximum(i64),
    Url,
    UnknownField,
    ImmutableField,
    EmptyPatch,
}

impl Rule {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Rule::NotAnObject => "not_an_object",
            Rule::Required => "required",
            Rule::Type { .. } => "type",
            Rule::NonEmpty => "non_empty",
            Rule::Minimum(_) => "minimum",
            Rule::Maximum(_) => "maximum",
            Rule::Url => "url",
            Rule::UnknownField => "unknown_field",
            Rule::ImmutableField => "immutable_field",
            Rule::EmptyPatch => "empty_patch",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::NotAnObject => write!(f, "payload must be a JSON object"),
            Rule::Required => write!(f, "is required"),
            Rule::Type { expected } => write!(f, "must be of type {}", expected.as_str()),
            Rule::NonEmpty => write!(f, "must not be empty"),
            Rule::Minimum(bound) => write!(f, "must be at least {bound}"),
            Rule::Maximum(bound) => write!(f, "must be at most {bound}"),
            Rule::Url => write!(f, "must be an absolute http(s) URL"),
            Rule::UnknownField => write!(f, "is not a recognised field"),
            Rule::ImmutableField => write!(f, "cannot be changed once set"),
            Rule::EmptyPatch => write!(f, "at least one field must be supplied"),
        }
    }
}

/// A single broken rule, attributed to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub rule: Rule,
}

impl Violation {
    pub fn new(field: impl Into<String>, rule: Rule) -> Self {
        Self {
            field: field.into(),
            rule,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.rule)
    }
}

impl Serialize for Violation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Violation", 3)?;
        state.serialize_field("field", &self.field)?;
        state.serialize_field("rule", self.rule.code())?;
        state.serialize_field("message", &self.rule.to_string())?;
        state.end()
    }
}

/// Outcome of [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid(Vec<Violation>),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            ValidationResult::Valid => &[],
            ValidationResult::Invalid(violations) => violations,
        }
    }

    pub fn into_result(self) -> Result<(), Vec<Violation>> {
        match self {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid(violations) => Err(violations),
        }
    }
}

/// Check `candidate` against `schema` and collect every violation.
///
/// Declared fields are checked in declaration order, then any remaining keys
/// of the candidate are reported as unknown (or immutable, if the schema
/// forbids them). The candidate is never modified.
pub fn validate(candidate: &Value, schema: &Schema) -> ValidationResult {
    let Some(object) = candidate.as_object() else {
        return ValidationResult::Invalid(vec![Violation::new(ROOT, Rule::NotAnObject)]);
    };

    let mut violations = Vec::new();

    for spec in &schema.fields {
        match object.get(&spec.name) {
            Some(value) => check_field(spec, value, &mut violations),
            None if spec.required => violations.push(Violation::new(&spec.name, Rule::Required)),
            None => {}
        }
    }

    let mut extra: Vec<&String> = object
        .keys()
        .filter(|key| schema.get_field(key).is_none())
        .collect();
    extra.sort();

    for key in extra {
        let rule = if schema.is_forbidden(key) {
            Rule::ImmutableField
        } else {
            Rule::UnknownField
        };
        violations.push(Violation::new(key, rule));
    }

    if schema.require_any && !has_declared_field(object, schema) {
        violations.push(Violation::new(ROOT, Rule::EmptyPatch));
    }

    if violations.is_empty() {
        ValidationResult::Valid
    } else {
        ValidationResult::Invalid(violations)
    }
}

fn has_declared_field(object: &Map<String, Value>, schema: &Schema) -> bool {
    schema.fields.iter().any(|f| object.contains_key(&f.name))
}

fn check_field(spec: &FieldSpec, value: &Value, violations: &mut Vec<Violation>) {
    let type_ok = match spec.field_type {
        FieldType::String => value.is_string(),
        FieldType::Integer => value.as_i64().is_some(),
    };
    if !type_ok {
        violations.push(Violation::new(
            &spec.name,
            Rule::Type {
                expected: spec.field_type,
            },
        ));
        return;
    }

    for constraint in &spec.constraints {
        if let Some(rule) = check_constraint(constraint, value) {
            violations.push(Violation::new(&spec.name, rule));
        }
    }
}

fn check_constraint(constraint: &Constraint, value: &Value) -> Option<Rule> {
    match constraint {
        Constraint::NonEmpty => match value.as_str() {
            Some(s) if s.trim().is_empty() => Some(Rule::NonEmpty),
            _ => None,
        },
        Constraint::Minimum(bound) => match value.as_i64() {
            Some(n) if n < *bound => Some(Rule::Minimum(*bound)),
            _ => None,
        },
        Constraint::Maximum(bound) => match value.as_i64() {
            Some(n) if n > *bound => Some(Rule::Maximum(*bound)),
            _ => None,
        },
        Constraint::Url => match value.as_str() {
            Some(s) if !is_http_url(s) => Some(Rule::Url),
            _ => None,
        },
    }
}

/// Absolute `http`/`https` URL with a host. The parser trims and drops
/// whitespace, so any whitespace in the raw string is rejected up front.
fn is_http_url(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    match Url::parse(s) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}
