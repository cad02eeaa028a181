//! Payload schemas for the books resource.

use shelf_kernel::settings::UpdateMode;
use shelf_schema::{FieldSpec, Schema, UpdatePolicy};

/// Fields accepted on create, in the order violations are reported.
pub fn book_schema() -> Schema {
    Schema::new("book")
        .field(FieldSpec::string("isbn").immutable().non_empty())
        .field(FieldSpec::string("amazon_url").non_empty().url())
        .field(FieldSpec::string("author").non_empty())
        .field(FieldSpec::string("language").non_empty())
        .field(FieldSpec::integer("pages").min(1))
        .field(FieldSpec::string("publisher").non_empty())
        .field(FieldSpec::string("title").non_empty())
        .field(FieldSpec::integer("year").min(0))
}

/// Schema-level policy for the configured update mode
pub fn update_policy(mode: UpdateMode) -> UpdatePolicy {
    match mode {
        UpdateMode::Replace => UpdatePolicy::Replace,
        UpdateMode::Merge => UpdatePolicy::Merge,
    }
}

/// Create and update schemas, built once per service.
#[derive(Debug, Clone)]
pub struct BookSchemas {
    pub create: Schema,
    pub update: Schema,
    pub policy: UpdatePolicy,
}

impl BookSchemas {
    pub fn new(policy: UpdatePolicy) -> Self {
        let create = book_schema();
        let update = create.for_update(policy);
        Self {
            create,
            update,
            policy,
        }
    }
}
