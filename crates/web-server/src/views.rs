//! Server-rendered HTML views.
//!
//! Templates are embedded at compile time and compiled once at start-up, so a
//! syntax error fails the server before it binds. Every interpolated value is
//! HTML-escaped unless a template asks otherwise.

use crate::error::AppError;
use axum::response::Html;
use core_types::{Author, CatalogEntry, SortBy};
use serde::Serialize;
use std::fmt::Write;
use upon::{fmt as upon_fmt, Engine, Value};

pub const INDEX: &str = "index";
pub const ADD_AUTHOR: &str = "add_author";
pub const ADD_BOOK: &str = "add_book";

const TEMPLATES: &[(&str, &str)] = &[
    ("header", include_str!("../templates/header.html")),
    ("footer", include_str!("../templates/footer.html")),
    (INDEX, include_str!("../templates/index.html")),
    (ADD_AUTHOR, include_str!("../templates/add_author.html")),
    (ADD_BOOK, include_str!("../templates/add_book.html")),
];

/// A one-line message shown above a form or the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// `success` or `error`; used as a CSS class.
    pub kind: &'static str,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self { kind: "success", text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: "error", text: text.into() }
    }
}

#[derive(Debug, Serialize)]
pub struct IndexContext {
    pub books: Vec<CatalogEntry>,
    pub count: usize,
    pub search_query: String,
    pub searching: bool,
    pub sort_by: SortBy,
    pub sort_by_author: bool,
    pub notice: Option<Notice>,
}

#[derive(Debug, Default, Serialize)]
pub struct AuthorFormContext {
    pub notice: Option<Notice>,
}

#[derive(Debug, Default, Serialize)]
pub struct BookFormContext {
    pub authors: Vec<Author>,
    pub notice: Option<Notice>,
}

pub struct Views {
    engine: Engine<'static>,
}

impl Views {
    pub fn new() -> Result<Self, upon::Error> {
        let mut engine = Engine::new();
        engine.set_default_formatter(&escape_html);
        for (name, source) in TEMPLATES {
            engine.add_template(*name, *source)?;
        }
        Ok(Self { engine })
    }

    /// Renders the named view with `context`.
    pub fn render<S: Serialize>(&self, name: &'static str, context: S) -> Result<Html<String>, AppError> {
        let template = self.engine.get_template(name).ok_or(AppError::UnknownView(name))?;
        Ok(Html(template.render(context).to_string()?))
    }
}

fn escape_html(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
    match value {
        Value::String(s) => {
            for c in s.chars() {
                match c {
                    '&' => f.write_str("&amp;")?,
                    '<' => f.write_str("&lt;")?,
                    '>' => f.write_str("&gt;")?,
                    '"' => f.write_str("&quot;")?,
                    '\'' => f.write_str("&#x27;")?,
                    c => f.write_char(c)?,
                }
            }
        }
        v => upon_fmt::default(f, v)?,
    };
    Ok(())
}
