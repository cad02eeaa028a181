use serde_json::json;
use shelf_db::StorageError;
use shelf_http::error::AppError;
use shelf_schema::Violation;
use thiserror::Error;

/// Outcome of a failed book operation.
#[derive(Error, Debug)]
pub enum BookError {
    #[error("book payload failed validation ({} violations)", .0.len())]
    Validation(Vec<Violation>),

    /// Passed the schema but could not be read into a book
    #[error("malformed book payload: {0}")]
    Malformed(String),

    #[error("no book with isbn '{0}'")]
    NotFound(String),

    #[error("a book with isbn '{0}' already exists")]
    Conflict(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        let message = err.to_string();
        match err {
            BookError::Validation(violations) => {
                let details = violations
                    .iter()
                    .map(|v| serde_json::to_value(v).unwrap_or_else(|_| json!(v.to_string())))
                    .collect();
                AppError::validation(details, message)
            }
            BookError::Malformed(_) => AppError::bad_request(message),
            BookError::NotFound(_) => AppError::not_found(message),
            BookError::Conflict(isbn) => {
                AppError::conflict(vec![json!({"field": "isbn", "value": isbn})], message)
            }
            BookError::Storage(e) => AppError::Internal(anyhow::Error::new(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use shelf_schema::Rule;

    #[test]
    fn maps_to_http_statuses() {
        let cases = [
            (
                BookError::Validation(vec![Violation::new("title", Rule::Required)]),
                StatusCode::BAD_REQUEST,
            ),
            (BookError::Malformed("x".into()), StatusCode::BAD_REQUEST),
            (BookError::NotFound("999".into()), StatusCode::NOT_FOUND),
            (BookError::Conflict("1".into()), StatusCode::CONFLICT),
            (
                BookError::Storage(StorageError::Closed {
                    table: "books".into(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn validation_details_list_each_violation() {
        let err = BookError::Validation(vec![
            Violation::new("badField", Rule::UnknownField),
            Violation::new("isbn", Rule::ImmutableField),
        ]);
        match AppError::from(err) {
            AppError::Validation { details, .. } => {
                assert_eq!(details.len(), 2);
                assert_eq!(details[0]["field"], "badField");
                assert_eq!(details[1]["rule"], "immutable_field");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
