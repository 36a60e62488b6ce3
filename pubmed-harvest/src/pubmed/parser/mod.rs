//! EFetch XML parsing
//!
//! [`parse_records_from_xml`] turns one `PubmedArticleSet` payload into
//! [`Record`]s. Journal articles come first in document order, followed by
//! book records in document order.

mod preprocessing;
mod xml_types;

use quick_xml::de::from_str;
use tracing::{debug, instrument, warn};

use crate::error::{PubMedError, Result};
use crate::pubmed::models::Record;
use preprocessing::strip_inline_markup;
use xml_types::PubmedArticleSet;

/// Parse every record in an EFetch XML response
///
/// Records without a PMID, or missing a required title, are logged and
/// skipped. A payload that is not a `PubmedArticleSet` at all is an
/// [`PubMedError::XmlError`].
///
/// # Example
///
/// ```ignore
/// let records = parse_records_from_xml(&xml)?;
/// for record in &records {
///     println!("{}: {}", record.pmid(), record.title());
/// }
/// ```
#[instrument(skip(xml), fields(xml_size = xml.len()))]
pub fn parse_records_from_xml(xml: &str) -> Result<Vec<Record>> {
    let cleaned = strip_inline_markup(xml);

    let set: PubmedArticleSet = from_str(&cleaned)
        .map_err(|e| PubMedError::XmlError(format!("Failed to deserialize XML: {}", e)))?;

    let mut records = Vec::with_capacity(set.articles.len() + set.books.len());

    for article in set.articles {
        let Some(pmid) = article.pmid() else {
            warn!("PubmedArticle without PMID, skipping");
            continue;
        };
        match article.into_article(&pmid) {
            Ok(article) => records.push(Record::Article(article)),
            Err(e) => warn!(pmid = %pmid, error = %e, "Failed to parse article, skipping"),
        }
    }

    for book in set.books {
        let Some(pmid) = book.pmid() else {
            warn!("PubmedBookArticle without PMID, skipping");
            continue;
        };
        match book.into_book(&pmid) {
            Ok(book) => records.push(Record::Book(book)),
            Err(e) => warn!(pmid = %pmid, error = %e, "Failed to parse book article, skipping"),
        }
    }

    debug!(records = records.len(), "Parsed EFetch payload");
    Ok(records)
}
