//! Write-side payload for `POST /books` and `PUT /books/{id}`.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Full replacement of a book's writable fields.
///
/// Keys match case-insensitively, an exact-case key winning over a folded
/// one. Unknown keys are ignored. Missing keys and `null` become the zero
/// value and are then caught by [`validate_full_book_request`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct FullBookRequest {
    pub title: String,
    pub author: String,
    pub year: i64,
}

impl TryFrom<Map<String, Value>> for FullBookRequest {
    type Error = serde_json::Error;

    fn try_from(object: Map<String, Value>) -> Result<Self, Self::Error> {
        Ok(Self {
            title: field(&object, "title")?,
            author: field(&object, "author")?,
            year: field(&object, "year")?,
        })
    }
}

fn field<T>(object: &Map<String, Value>, name: &str) -> Result<T, serde_json::Error>
where
    T: DeserializeOwned + Default,
{
    let value = object.get(name).or_else(|| {
        object
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    });

    match value {
        Some(value) => Ok(Option::<T>::deserialize(value)?.unwrap_or_default()),
        None => Ok(T::default()),
    }
}

/// Field name → message; empty when the request is acceptable.
pub type ValidationErrors = BTreeMap<&'static str, &'static str>;

pub fn validate_full_book_request(req: &FullBookRequest) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if req.title.is_empty() {
        errors.insert("title", "title is required");
    }

    if req.author.is_empty() {
        errors.insert("author", "author is required");
    }

    // No upper bound on purpose.
    if req.year < 1 {
        errors.insert("year", "year must be a positive integer");
    }

    errors
}
