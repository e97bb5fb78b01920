use serde::{Deserialize, Serialize};

/// A catalog entry as stored in the `books` table.
///
/// `author` and `year` are left out of the JSON when empty or zero.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Book {
    /// Store-assigned identifier, always >= 1 once persisted
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub year: i64,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

/// Row shape of `SELECT id, title, author, year FROM books`.
///
/// `author` and `year` are nullable in the schema.
#[derive(Debug, sqlx::FromRow)]
pub struct BookRow {
    pub id: i64,
    pub title: String,
    pub author: Option<String>,
    pub year: Option<i64>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            author: row.author.unwrap_or_default(),
            year: row.year.unwrap_or_default(),
        }
    }
}

/// Envelope of `GET /books`
#[derive(Debug, Serialize, Deserialize)]
pub struct BooksResponse {
    pub books: Vec<Book>,
}
