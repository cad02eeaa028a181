pub mod error;
pub mod models;
pub mod routes;
pub mod schema;
pub mod service;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use shelf_kernel::{settings::Settings, InitCtx, Migration, Module};

use service::BookService;
use store::BookStore;

/// The `/books` resource
pub struct BooksModule {
    service: Arc<BookService>,
}

impl BooksModule {
    pub fn new(store: Arc<dyn BookStore>, settings: &Settings) -> Self {
        Self {
            service: Arc::new(BookService::new(store, schema::update_policy(settings.books.update_policy))),
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let stored = self.service.list().await?.len();
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            update_policy = ?self.service.update_policy(),
            stored,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_create_books",
            description: "books table keyed by isbn",
            up: r#"
                CREATE TABLE books (
                    isbn       TEXT PRIMARY KEY,
                    amazon_url TEXT NOT NULL,
                    author     TEXT NOT NULL,
                    language   TEXT NOT NULL,
                    pages      INTEGER NOT NULL CHECK (pages > 0),
                    publisher  TEXT NOT NULL,
                    title      TEXT NOT NULL,
                    year       INTEGER NOT NULL CHECK (year >= 0)
                );
                "#,
        }]
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.service.store().close().await;
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn error_response(description: &str) -> serde_json::Value {
    serde_json::json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn book_response(description: &str) -> serde_json::Value {
    serde_json::json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/BookResponse" }
            }
        }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let isbn_param = serde_json::json!({
        "name": "isbn",
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    });
    let string_field = |description: &str| {
        serde_json::json!({ "type": "string", "minLength": 1, "description": description })
    };

    serde_json::json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List books",
                    "tags": ["Books"],
                    "responses": {
                        "200": {
                            "description": "Every stored book, ordered by isbn",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookListResponse" }
                                }
                            }
                        },
                        "500": error_response("Storage failure")
                    }
                },
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/Book" }
                            }
                        }
                    },
                    "responses": {
                        "201": book_response("Created"),
                        "400": error_response("Payload failed validation"),
                        "409": error_response("ISBN already exists")
                    }
                }
            },
            "/{isbn}": {
                "get": {
                    "summary": "Get a book",
                    "tags": ["Books"],
                    "parameters": [isbn_param.clone()],
                    "responses": {
                        "200": book_response("The book"),
                        "404": error_response("No such book")
                    }
                },
                "put": {
                    "summary": "Update a book",
                    "tags": ["Books"],
                    "parameters": [isbn_param.clone()],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/BookFields" }
                            }
                        }
                    },
                    "responses": {
                        "200": book_response("Updated book"),
                        "400": error_response("Payload failed validation"),
                        "404": error_response("No such book")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": [isbn_param.clone()],
                    "responses": {
                        "200": {
                            "description": "Deleted",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": { "message": { "type": "string" } },
                                        "required": ["message"]
                                    }
                                }
                            }
                        },
                        "404": error_response("No such book")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {
                        "isbn": string_field("Unique identifier, immutable"),
                        "amazon_url": {
                            "type": "string",
                            "format": "uri",
                            "description": "Absolute http(s) link to the listing"
                        },
                        "author": string_field("Author"),
                        "language": string_field("Language"),
                        "pages": { "type": "integer", "minimum": 1 },
                        "publisher": string_field("Publisher"),
                        "title": string_field("Title"),
                        "year": { "type": "integer", "minimum": 0 }
                    },
                    "required": [
                        "isbn", "amazon_url", "author", "language",
                        "pages", "publisher", "title", "year"
                    ]
                },
                "BookFields": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": {
                        "amazon_url": { "type": "string", "format": "uri" },
                        "author": string_field("Author"),
                        "language": string_field("Language"),
                        "pages": { "type": "integer", "minimum": 1 },
                        "publisher": string_field("Publisher"),
                        "title": string_field("Title"),
                        "year": { "type": "integer", "minimum": 0 }
                    },
                    "required": [
                        "amazon_url", "author", "language",
                        "pages", "publisher", "title", "year"
                    ]
                },
                "BookResponse": {
                    "type": "object",
                    "properties": { "book": { "$ref": "#/components/schemas/Book" } },
                    "required": ["book"]
                },
                "BookListResponse": {
                    "type": "object",
                    "properties": {
                        "books": {
                            "type": "array",
                            "items": { "$ref": "#/components/schemas/Book" }
                        }
                    },
                    "required": ["books"]
                }
            }
        }
    })
}

/// Create the books module around an injected store
pub fn create_module(store: Arc<dyn BookStore>, settings: &Settings) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store, settings))
}
