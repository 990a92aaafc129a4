use crate::error::CoreError;
use crate::isbn::clean_isbn;
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use std::fmt;

/// The only date format accepted from forms (ISO 8601 calendar date).
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A persisted author, as stored in the `authors` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub birth_date: NaiveDate,
    /// Absent when the author is living or the date is unknown.
    pub date_of_death: Option<NaiveDate>,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Author: {}, born on {}, died on ", self.name, self.birth_date)?;
        match self.date_of_death {
            Some(date) => write!(f, "{date}"),
            None => f.write_str("N/A"),
        }
    }
}

/// A persisted book, as stored in the `books` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Book {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub publication_year: i32,
    pub author_id: i64,
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Book: {} (ISBN: {}), published in {}",
            self.title, self.isbn, self.publication_year
        )
    }
}

/// A validated author submission that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub name: String,
    pub birth_date: NaiveDate,
    pub date_of_death: Option<NaiveDate>,
}

impl NewAuthor {
    /// Builds a submission from raw form values.
    ///
    /// `name` and `birth_date` are required; a blank `date_of_death` means the
    /// author has no recorded date of death.
    pub fn parse(name: &str, birth_date: &str, date_of_death: &str) -> Result<Self, CoreError> {
        Ok(Self {
            name: required("name", name)?.to_string(),
            birth_date: parse_date("birthdate", required("birthdate", birth_date)?)?,
            date_of_death: match date_of_death.trim() {
                "" => None,
                value => Some(parse_date("date_of_death", value)?),
            },
        })
    }
}

/// A validated book submission that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub isbn: String,
    pub title: String,
    pub publication_year: i32,
    pub author_id: i64,
}

impl NewBook {
    /// Builds a submission from raw form values. Every field is required.
    pub fn parse(
        title: &str,
        isbn: &str,
        publication_year: &str,
        author: &str,
    ) -> Result<Self, CoreError> {
        let title = required("title", title)?.to_string();
        let isbn = required("isbn", isbn)?.to_string();
        let publication_year = required("publication_year", publication_year)?
            .parse::<i32>()
            .map_err(|e| CoreError::InvalidInput("publication_year", e.to_string()))?;
        let author_id = required("author", author)?
            .parse::<i64>()
            .map_err(|e| CoreError::InvalidInput("author", e.to_string()))?;
        Ok(Self { isbn, title, publication_year, author_id })
    }
}

/// One row of the catalog: a book joined with its author's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub isbn: String,
    /// Digits-only ISBN, used as the cover lookup key.
    pub clean_isbn: String,
    pub title: String,
    pub publication_year: i32,
    pub author_id: i64,
    pub author_name: String,
    pub cover_url: Option<String>,
}

impl CatalogEntry {
    pub fn new(book: Book, author_name: String) -> Self {
        Self {
            clean_isbn: clean_isbn(&book.isbn),
            id: book.id,
            isbn: book.isbn,
            title: book.title,
            publication_year: book.publication_year,
            author_id: book.author_id,
            author_name,
            cover_url: None,
        }
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, CoreError> {
    match value.trim() {
        "" => Err(CoreError::MissingField(field)),
        value => Ok(value),
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
        CoreError::InvalidInput(field, format!("'{value}' is not a YYYY-MM-DD date ({e})"))
    })
}
