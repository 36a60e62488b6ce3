use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::window::{DateWindow, Granularity};

/// Represents a PubMed journal article with metadata
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct PubMedArticle {
    /// PubMed ID
    pub pmid: String,
    /// Article title
    pub title: String,
    /// List of authors, "ForeName LastName" or the collective name
    pub authors: Vec<String>,
    /// Journal name
    pub journal: String,
    /// Publication date as printed in the record
    pub pub_date: String,
    /// DOI (Digital Object Identifier)
    pub doi: Option<String>,
    /// Abstract text (if available)
    pub abstract_text: Option<String>,
    /// Article types (e.g., "Clinical Trial", "Review", etc.)
    pub article_types: Vec<String>,
    /// Author-supplied keywords
    pub keywords: Vec<String>,
}

/// Represents a PubMed book or book chapter record
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct PubMedBookArticle {
    /// PubMed ID
    pub pmid: String,
    /// Title of the book
    pub book_title: String,
    /// Chapter/section title when the record is part of a book
    pub article_title: Option<String>,
    /// Authors of the book or chapter
    pub authors: Vec<String>,
    /// Publisher name
    pub publisher: Option<String>,
    /// Publication date as printed in the record
    pub pub_date: String,
    /// Abstract text (if available)
    pub abstract_text: Option<String>,
    /// ISBN, when present
    pub isbn: Option<String>,
}

/// A record decoded from an EFetch payload
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Article(PubMedArticle),
    Book(PubMedBookArticle),
}

impl Record {
    pub fn pmid(&self) -> &str {
        match self {
            Record::Article(article) => &article.pmid,
            Record::Book(book) => &book.pmid,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Record::Article(article) => &article.title,
            Record::Book(book) => book.article_title.as_deref().unwrap_or(&book.book_title),
        }
    }

    pub fn is_book(&self) -> bool {
        matches!(self, Record::Book(_))
    }
}

/// A condition that makes a resolved id list knowingly incomplete or redundant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RetrievalWarning {
    /// A single-day window still matches more ids than one search can return;
    /// its ids are omitted from the result
    UnrecoverableWindow {
        window: DateWindow,
        count: usize,
        cap: usize,
    },
    /// Values of the split component assigned to no sub-window
    UncoveredRange {
        window: DateWindow,
        granularity: Granularity,
        from: u32,
        to: u32,
    },
    /// The concatenated list repeats ids across adjacent windows
    DuplicateIds { count: usize },
    /// More ids were gathered than requested; the list was cut to `limit`
    Truncated { available: usize, limit: usize },
}

impl fmt::Display for RetrievalWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrievalWarning::UnrecoverableWindow { window, count, cap } => write!(
                f,
                "{} matches {} records, above the cap of {}; its ids were skipped",
                window, count, cap
            ),
            RetrievalWarning::UncoveredRange {
                window,
                granularity,
                from,
                to,
            } => write!(
                f,
                "splitting {} by {} left {}..={} unsearched",
                window, granularity, from, to
            ),
            RetrievalWarning::DuplicateIds { count } => {
                write!(f, "{} duplicate ids across adjacent windows", count)
            }
            RetrievalWarning::Truncated { available, limit } => {
                write!(f, "{} ids gathered, truncated to {}", available, limit)
            }
        }
    }
}

/// Outcome of resolving a query to its id list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedIds {
    /// Ids in window order, server order within each window
    pub ids: Vec<String>,
    /// Match count reported for the top-level window
    pub total_count: usize,
    /// Number of ESearch calls issued
    pub search_requests: usize,
    /// Everything that makes `ids` differ from the true match set
    pub warnings: Vec<RetrievalWarning>,
}

impl ResolvedIds {
    /// True when no warning was raised
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of ids that already appeared earlier in the list
    pub fn duplicate_count(&self) -> usize {
        let mut seen = HashSet::with_capacity(self.ids.len());
        self.ids.iter().filter(|id| !seen.insert(id.as_str())).count()
    }

    /// Ids with repeats removed, first occurrence kept
    pub fn unique_ids(&self) -> Vec<String> {
        let mut seen = HashSet::with_capacity(self.ids.len());
        self.ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect()
    }
}
