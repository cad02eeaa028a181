//! Core schema type definitions.

use serde::{Deserialize, Serialize};

/// Data type a field value must have.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// JSON string
    String,
    /// JSON number without a fractional part that fits in an `i64`
    Integer,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
        }
    }
}

/// Value constraint checked once the type is known to conform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// String must contain at least one non-whitespace character
    NonEmpty,
    /// Integer must be greater than or equal to the bound
    Minimum(i64),
    /// Integer must be less than or equal to the bound
    Maximum(i64),
    /// String must be an absolute `http` or `https` URL
    Url,
}

/// Whether a field may be written after the resource exists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mutability {
    #[default]
    ReadWrite,
    /// Set once on create, never supplied again
    Immutable,
}

/// How an update payload is reconciled with the stored record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UpdatePolicy {
    /// Every mutable field must be supplied and all of them are overwritten.
    #[default]
    Replace,
    /// Any non-empty subset of mutable fields may be supplied; the rest keep
    /// their stored values.
    Merge,
}

/// Declaration of a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
    #[serde(default)]
    pub mutability: Mutability,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

impl FieldSpec {
    /// Required read-write string field.
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    /// Required read-write integer field.
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Integer)
    }

    fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
            mutability: Mutability::ReadWrite,
            constraints: Vec::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn immutable(mut self) -> Self {
        self.mutability = Mutability::Immutable;
        self
    }

    pub fn non_empty(self) -> Self {
        self.constraint(Constraint::NonEmpty)
    }

    pub fn min(self, bound: i64) -> Self {
        self.constraint(Constraint::Minimum(bound))
    }

    pub fn max(self, bound: i64) -> Self {
        self.constraint(Constraint::Maximum(bound))
    }

    pub fn url(self) -> Self {
        self.constraint(Constraint::Url)
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}

/// A resource schema: the complete set of fields a payload may carry.
///
/// Fields listed in `forbidden` are known to the resource but may not appear
/// in this particular payload (identity fields on update). `require_any`
/// rejects an empty object, which only matters when every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub forbidden: Vec<String>,
    #[serde(default)]
    pub require_any: bool,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            forbidden: Vec::new(),
            require_any: false,
        }
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_forbidden(&self, name: &str) -> bool {
        self.forbidden.iter().any(|f| f == name)
    }

    /// Derive the schema an update payload is checked against.
    ///
    /// Immutable fields move to the forbidden list. Under
    /// [`UpdatePolicy::Merge`] the remaining fields become optional and the
    /// payload must carry at least one of them.
    pub fn for_update(&self, policy: UpdatePolicy) -> Schema {
        let mut fields = Vec::with_capacity(self.fields.len());
        let mut forbidden = self.forbidden.clone();

        for spec in &self.fields {
            if spec.mutability == Mutability::Immutable {
                forbidden.push(spec.name.clone());
                continue;
            }
            let mut spec = spec.clone();
            if policy == UpdatePolicy::Merge {
                spec.required = false;
            }
            fields.push(spec);
        }

        Schema {
            name: format!("{}.update", self.name),
            fields,
            forbidden,
            require_any: policy == UpdatePolicy::Merge,
        }
    }
}
