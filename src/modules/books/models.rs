use serde::{Deserialize, Serialize};

/// A catalogued book, identified by its ISBN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier; never changes once the book exists
    pub isbn: String,
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i64,
    pub publisher: String,
    pub title: String,
    pub year: i64,
}

impl Book {
    pub fn from_parts(isbn: impl Into<String>, fields: BookFields) -> Self {
        Self {
            isbn: isbn.into(),
            amazon_url: fields.amazon_url,
            author: fields.author,
            language: fields.language,
            pages: fields.pages,
            publisher: fields.publisher,
            title: fields.title,
            year: fields.year,
        }
    }

    /// Overwrite every mutable field, keeping the ISBN
    pub fn replace_fields(&mut self, fields: BookFields) {
        let isbn = std::mem::take(&mut self.isbn);
        *self = Book::from_parts(isbn, fields);
    }

    pub fn fields(&self) -> BookFields {
        BookFields {
            amazon_url: self.amazon_url.clone(),
            author: self.author.clone(),
            language: self.language.clone(),
            pages: self.pages,
            publisher: self.publisher.clone(),
            title: self.title.clone(),
            year: self.year,
        }
    }
}

/// The mutable fields of a book: the body of a full-replace update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookFields {
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i64,
    pub publisher: String,
    pub title: String,
    pub year: i64,
}

/// Sparse update applied under the merge policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookPatch {
    pub amazon_url: Option<String>,
    pub author: Option<String>,
    pub language: Option<String>,
    pub pages: Option<i64>,
    pub publisher: Option<String>,
    pub title: Option<String>,
    pub year: Option<i64>,
}

impl BookPatch {
    /// Apply supplied fields on top of `base`
    pub fn apply(self, mut base: BookFields) -> BookFields {
        if let Some(v) = self.amazon_url {
            base.amazon_url = v;
        }
        if let Some(v) = self.author {
            base.author = v;
        }
        if let Some(v) = self.language {
            base.language = v;
        }
        if let Some(v) = self.pages {
            base.pages = v;
        }
        if let Some(v) = self.publisher {
            base.publisher = v;
        }
        if let Some(v) = self.title {
            base.title = v;
        }
        if let Some(v) = self.year {
            base.year = v;
        }
        base
    }
}

/// `{"book": ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookResponse {
    pub book: Book,
}

/// `{"books": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookListResponse {
    pub books: Vec<Book>,
}

/// `{"message": "Book deleted"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub message: String,
}

impl DeletedResponse {
    pub const MESSAGE: &'static str = "Book deleted";

    pub fn new() -> Self {
        Self {
            message: Self::MESSAGE.to_string(),
        }
    }
}

impl Default for DeletedResponse {
    fn default() -> Self {
        Self::new()
    }
}
