use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Router,
};

use bookshelf_http::{error::AppError, response::write_json};

use super::models::{Book, BooksResponse};
use super::request::{validate_full_book_request, FullBookRequest};
use super::store::{BookStore, StoreError};

/// Collaborators shared by every books handler
#[derive(Debug, Clone)]
pub struct App {
    pub books: BookStore,
}

impl App {
    pub fn new(books: BookStore) -> Self {
        Self { books }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::not_found("book not found"),
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

type HandlerResult = Result<Response, AppError>;

pub fn router(app: App) -> Router {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route("/books/{id}", get(show_book).put(put_book))
        .with_state(app)
}

/// An id that does not parse or is below 1 cannot name a book.
fn parse_id(raw: &str) -> Result<i64, AppError> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(AppError::not_found(format!("invalid book id '{}'", raw))),
    }
}

/// Decode and validate a body regardless of its declared content type.
///
/// Only the first JSON value is read; anything after it is ignored. A
/// top-level `null` decodes to the empty request.
fn decode_full_book_request(body: &Bytes) -> Result<FullBookRequest, AppError> {
    let req = serde_json::Deserializer::from_slice(body)
        .into_iter::<Option<FullBookRequest>>()
        .next()
        .ok_or_else(|| AppError::bad_request("empty request body"))?
        .map_err(|e| AppError::bad_request(format!("malformed JSON body: {}", e)))?
        .unwrap_or_default();

    let errors = validate_full_book_request(&req);
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }

    Ok(req)
}

async fn list_books(State(app): State<App>) -> HandlerResult {
    let books = app.books.get_all().await?;
    Ok(write_json(StatusCode::OK, &BooksResponse { books }))
}

async fn show_book(State(app): State<App>, Path(id): Path<String>) -> HandlerResult {
    let id = parse_id(&id)?;
    let book = app.books.get(id).await?;
    Ok(write_json(StatusCode::OK, &book))
}

async fn create_book(State(app): State<App>, body: Bytes) -> HandlerResult {
    let req = decode_full_book_request(&body)?;

    let saved = app
        .books
        .insert(Book {
            id: 0,
            title: req.title,
            author: req.author,
            year: req.year,
        })
        .await?;

    Ok(write_json(StatusCode::CREATED, &saved))
}

#[tracing::instrument(name = "books.put", skip(app, body))]
async fn put_book(State(app): State<App>, Path(id): Path<String>, body: Bytes) -> HandlerResult {
    let id = parse_id(&id)?;
    let req = decode_full_book_request(&body)?;

    let mut book = app.books.get(id).await?;
    book.title = req.title;
    book.author = req.author;
    book.year = req.year;

    let updated = app.books.update(book).await?;
    Ok(write_json(StatusCode::OK, &updated))
}
