use crate::error::{persistence_failure, AppError};
use crate::flash;
use crate::views::{self, AuthorFormContext, BookFormContext, IndexContext, Notice};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    Form,
};
use axum_extra::extract::CookieJar;
use core_types::{NewAuthor, NewBook, SortBy};
use database::DbError;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CatalogQuery {
    pub search_query: Option<String>,
    pub sort_by: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthorForm {
    pub name: String,
    pub birthdate: String,
    pub date_of_death: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BookForm {
    pub title: String,
    pub isbn: String,
    pub publication_year: String,
    pub author: String,
}

/// # GET /
/// The catalog: every book, searched or sorted, with cover images when enabled.
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CatalogQuery>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let search_query = query.search_query.unwrap_or_default().trim().to_string();
    let sort_by = SortBy::from_param(query.sort_by.as_deref());
    let searching = !search_query.is_empty();

    let mut books = if searching {
        state.db_repo.search_catalog(&search_query).await?
    } else {
        state.db_repo.get_catalog(sort_by).await?
    };
    if let Some(covers) = &state.covers {
        covers.enrich(&mut books).await;
    }

    let (jar, notice) = flash::take(jar);
    let context = IndexContext {
        count: books.len(),
        books,
        search_query,
        searching,
        sort_by,
        sort_by_author: sort_by == SortBy::Author,
        notice,
    };
    Ok((jar, state.views.render(views::INDEX, &context)?))
}

/// # GET /add_author
pub async fn add_author_form(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    state.views.render(views::ADD_AUTHOR, AuthorFormContext::default())
}

/// # POST /add_author
pub async fn add_author(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AuthorForm>,
) -> Result<(StatusCode, Html<String>), AppError> {
    let (status, notice) = match NewAuthor::parse(&form.name, &form.birthdate, &form.date_of_death) {
        Err(e) => (StatusCode::BAD_REQUEST, Notice::error(e.to_string())),
        Ok(author) => match state.db_repo.create_author(&author).await {
            Ok(created) => (
                StatusCode::CREATED,
                Notice::success(format!("Author '{}' added successfully.", created.name)),
            ),
            Err(e) => {
                let (status, message) = persistence_failure(&e, "author");
                (status, Notice::error(message))
            }
        },
    };

    let page = state
        .views
        .render(views::ADD_AUTHOR, AuthorFormContext { notice: Some(notice) })?;
    Ok((status, page))
}

/// # GET /add_book
/// The form lists every author for selection by id.
pub async fn add_book_form(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let authors = state.db_repo.get_all_authors().await?;
    state
        .views
        .render(views::ADD_BOOK, BookFormContext { authors, notice: None })
}

/// # POST /add_book
/// Re-renders the form in every outcome; there is no redirect.
pub async fn add_book(
    State(state): State<Arc<AppState>>,
    Form(form): Form<BookForm>,
) -> Result<(StatusCode, Html<String>), AppError> {
    let parsed = NewBook::parse(&form.title, &form.isbn, &form.publication_year, &form.author);
    let (status, notice) = match parsed {
        Err(e) => (StatusCode::BAD_REQUEST, Notice::error(e.to_string())),
        Ok(book) => match state.db_repo.create_book(&book).await {
            Ok(created) => (
                StatusCode::CREATED,
                Notice::success(format!("Book '{}' added successfully.", created.title)),
            ),
            Err(e) => {
                let (status, message) = persistence_failure(&e, "book");
                (status, Notice::error(message))
            }
        },
    };

    let authors = state.db_repo.get_all_authors().await?;
    let page = state.views.render(
        views::ADD_BOOK,
        BookFormContext { authors, notice: Some(notice) },
    )?;
    Ok((status, page))
}

/// # POST /book/:book_id/delete
/// Deletes the book (and its author, if this was the author's last book),
/// then redirects to the catalog with a notice.
pub async fn delete_book(
    Path(book_id): Path<i64>,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    let notice = match state.db_repo.delete_book(book_id).await {
        Ok(deleted) if deleted.author_removed => Notice::success(format!(
            "Book '{}' deleted, along with its author who has no other books.",
            deleted.book.title
        )),
        Ok(deleted) => Notice::success(format!("Book '{}' deleted successfully.", deleted.book.title)),
        Err(DbError::NotFound) => {
            return Err(AppError::NotFound(format!("No book with id {book_id}")));
        }
        Err(e) => {
            tracing::error!(error = ?e, book_id, "Failed to delete book.");
            Notice::error("The book could not be deleted.")
        }
    };

    Ok((flash::set(jar, notice), Redirect::to("/")))
}
