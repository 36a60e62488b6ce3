//! Serde mirror of the EFetch `PubmedArticleSet` schema
//!
//! Only the elements the public models need are declared; everything else is
//! ignored by quick-xml.

use std::fmt;

use serde::Deserialize;

use crate::error::{PubMedError, Result};
use crate::pubmed::models::{PubMedArticle, PubMedBookArticle};

#[derive(Debug, Default, Deserialize)]
#[serde(rename = "PubmedArticleSet")]
pub(super) struct PubmedArticleSet {
    #[serde(rename = "PubmedArticle", default)]
    pub articles: Vec<PubmedArticleXml>,
    #[serde(rename = "PubmedBookArticle", default)]
    pub books: Vec<PubmedBookArticleXml>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TextNode {
    #[serde(rename = "$text", default)]
    pub value: String,
}

impl TextNode {
    fn non_empty(&self) -> Option<String> {
        let value = self.value.trim();
        (!value.is_empty()).then(|| value.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PubmedArticleXml {
    #[serde(rename = "MedlineCitation")]
    pub medline_citation: MedlineCitation,
    #[serde(rename = "PubmedData")]
    pub pubmed_data: Option<PubmedData>,
}

impl PubmedArticleXml {
    pub fn pmid(&self) -> Option<String> {
        self.medline_citation.pmid.as_ref().and_then(TextNode::non_empty)
    }

    pub fn into_article(self, pmid: &str) -> Result<PubMedArticle> {
        let medline = self.medline_citation;
        let article = medline
            .article
            .ok_or_else(|| PubMedError::MalformedResponse {
                message: format!("PMID {} has no Article element", pmid),
            })?;

        let title = article
            .article_title
            .as_ref()
            .and_then(TextNode::non_empty)
            .ok_or_else(|| PubMedError::MalformedResponse {
                message: format!("PMID {} has no ArticleTitle", pmid),
            })?;

        let (journal, pub_date) = match article.journal {
            Some(journal) => (
                journal.title.unwrap_or_default(),
                journal
                    .journal_issue
                    .and_then(|issue| issue.pub_date)
                    .map(|date| date.to_string())
                    .unwrap_or_default(),
            ),
            None => (String::new(), String::new()),
        };

        // ArticleIdList is authoritative; ELocationID is the fallback
        let doi = self
            .pubmed_data
            .and_then(|data| data.article_ids)
            .and_then(|list| list.find("doi"))
            .or_else(|| {
                article
                    .elocation_ids
                    .iter()
                    .find(|id| id.eid_type.as_deref() == Some("doi"))
                    .map(|id| id.value.trim().to_string())
                    .filter(|doi| !doi.is_empty())
            });

        Ok(PubMedArticle {
            pmid: pmid.to_string(),
            title,
            authors: article.author_list.map(AuthorList::into_names).unwrap_or_default(),
            journal,
            pub_date,
            doi,
            abstract_text: article.abstract_section.and_then(AbstractSection::joined),
            article_types: article
                .publication_types
                .map(|list| list.types.iter().filter_map(TextNode::non_empty).collect())
                .unwrap_or_default(),
            keywords: medline
                .keyword_lists
                .iter()
                .flat_map(|list| list.keywords.iter().filter_map(TextNode::non_empty))
                .collect(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct MedlineCitation {
    #[serde(rename = "PMID")]
    pub pmid: Option<TextNode>,
    #[serde(rename = "Article")]
    pub article: Option<ArticleXml>,
    #[serde(rename = "KeywordList", default)]
    pub keyword_lists: Vec<KeywordList>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ArticleXml {
    #[serde(rename = "Journal")]
    pub journal: Option<Journal>,
    #[serde(rename = "ArticleTitle")]
    pub article_title: Option<TextNode>,
    #[serde(rename = "Abstract")]
    pub abstract_section: Option<AbstractSection>,
    #[serde(rename = "AuthorList")]
    pub author_list: Option<AuthorList>,
    #[serde(rename = "PublicationTypeList")]
    pub publication_types: Option<PublicationTypeList>,
    #[serde(rename = "ELocationID", default)]
    pub elocation_ids: Vec<ELocationId>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Journal {
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "JournalIssue")]
    pub journal_issue: Option<JournalIssue>,
}

#[derive(Debug, Deserialize)]
pub(super) struct JournalIssue {
    #[serde(rename = "PubDate")]
    pub pub_date: Option<PubDate>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PubDate {
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Month")]
    pub month: Option<String>,
    #[serde(rename = "Day")]
    pub day: Option<String>,
    #[serde(rename = "MedlineDate")]
    pub medline_date: Option<String>,
}

impl fmt::Display for PubDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(medline_date) = &self.medline_date {
            return f.write_str(medline_date);
        }
        let parts: Vec<&str> = [&self.year, &self.month, &self.day]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .collect();
        f.write_str(&parts.join(" "))
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AbstractSection {
    #[serde(rename = "AbstractText", default)]
    pub texts: Vec<AbstractText>,
}

impl AbstractSection {
    /// Structured sections are rendered as `LABEL: text`, one per line
    fn joined(self) -> Option<String> {
        let sections: Vec<String> = self
            .texts
            .into_iter()
            .filter(|section| !section.text.trim().is_empty())
            .map(|section| match section.label {
                Some(label) => format!("{}: {}", label, section.text.trim()),
                None => section.text.trim().to_string(),
            })
            .collect();

        (!sections.is_empty()).then(|| sections.join("\n"))
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AbstractText {
    #[serde(rename = "@Label")]
    pub label: Option<String>,
    #[serde(rename = "$text", default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct AuthorList {
    #[serde(rename = "Author", default)]
    pub authors: Vec<AuthorXml>,
}

impl AuthorList {
    fn into_names(self) -> Vec<String> {
        self.authors.iter().filter_map(AuthorXml::display_name).collect()
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AuthorXml {
    #[serde(rename = "LastName")]
    pub last_name: Option<String>,
    #[serde(rename = "ForeName")]
    pub fore_name: Option<String>,
    #[serde(rename = "Initials")]
    pub initials: Option<String>,
    #[serde(rename = "CollectiveName")]
    pub collective_name: Option<String>,
}

impl AuthorXml {
    fn display_name(&self) -> Option<String> {
        if let Some(collective) = &self.collective_name {
            return Some(collective.trim().to_string());
        }
        let last = self.last_name.as_deref()?.trim();
        match (self.fore_name.as_deref(), self.initials.as_deref()) {
            (Some(fore), _) => Some(format!("{} {}", fore.trim(), last)),
            (None, Some(initials)) => Some(format!("{} {}", last, initials.trim())),
            (None, None) => Some(last.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PublicationTypeList {
    #[serde(rename = "PublicationType", default)]
    pub types: Vec<TextNode>,
}

#[derive(Debug, Deserialize)]
pub(super) struct KeywordList {
    #[serde(rename = "Keyword", default)]
    pub keywords: Vec<TextNode>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ELocationId {
    #[serde(rename = "@EIdType")]
    pub eid_type: Option<String>,
    #[serde(rename = "$text", default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct PubmedData {
    #[serde(rename = "ArticleIdList")]
    pub article_ids: Option<ArticleIdList>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ArticleIdList {
    #[serde(rename = "ArticleId", default)]
    pub ids: Vec<ArticleId>,
}

impl ArticleIdList {
    fn find(&self, id_type: &str) -> Option<String> {
        self.ids
            .iter()
            .find(|id| id.id_type.as_deref() == Some(id_type))
            .and_then(|id| {
                let value = id.value.trim();
                (!value.is_empty()).then(|| value.to_string())
            })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ArticleId {
    #[serde(rename = "@IdType")]
    pub id_type: Option<String>,
    #[serde(rename = "$text", default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct PubmedBookArticleXml {
    #[serde(rename = "BookDocument")]
    pub book_document: BookDocument,
}

impl PubmedBookArticleXml {
    pub fn pmid(&self) -> Option<String> {
        self.book_document.pmid.as_ref().and_then(TextNode::non_empty)
    }

    pub fn into_book(self, pmid: &str) -> Result<PubMedBookArticle> {
        let document = self.book_document;
        let book = document.book.ok_or_else(|| PubMedError::MalformedResponse {
            message: format!("PMID {} has no Book element", pmid),
        })?;

        let book_title = book
            .book_title
            .as_ref()
            .and_then(TextNode::non_empty)
            .ok_or_else(|| PubMedError::MalformedResponse {
                message: format!("PMID {} has no BookTitle", pmid),
            })?;

        // Chapter authors first; whole-book records only list them under Book
        let mut authors: Vec<String> = document
            .author_lists
            .into_iter()
            .flat_map(AuthorList::into_names)
            .collect();
        if authors.is_empty() {
            authors = book.author_lists.into_iter().flat_map(AuthorList::into_names).collect();
        }

        Ok(PubMedBookArticle {
            pmid: pmid.to_string(),
            book_title,
            article_title: document.article_title.as_ref().and_then(TextNode::non_empty),
            authors,
            publisher: book.publisher.and_then(|p| p.name).map(|name| name.trim().to_string()),
            pub_date: book.pub_date.map(|date| date.to_string()).unwrap_or_default(),
            abstract_text: document.abstract_section.and_then(AbstractSection::joined),
            isbn: book.isbns.iter().find_map(TextNode::non_empty),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct BookDocument {
    #[serde(rename = "PMID")]
    pub pmid: Option<TextNode>,
    #[serde(rename = "ArticleTitle")]
    pub article_title: Option<TextNode>,
    #[serde(rename = "Book")]
    pub book: Option<BookXml>,
    #[serde(rename = "AuthorList", default)]
    pub author_lists: Vec<AuthorList>,
    #[serde(rename = "Abstract")]
    pub abstract_section: Option<AbstractSection>,
}

#[derive(Debug, Deserialize)]
pub(super) struct BookXml {
    #[serde(rename = "Publisher")]
    pub publisher: Option<Publisher>,
    #[serde(rename = "BookTitle")]
    pub book_title: Option<TextNode>,
    #[serde(rename = "PubDate")]
    pub pub_date: Option<PubDate>,
    #[serde(rename = "AuthorList", default)]
    pub author_lists: Vec<AuthorList>,
    #[serde(rename = "Isbn", default)]
    pub isbns: Vec<TextNode>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Publisher {
    #[serde(rename = "PublisherName")]
    pub name: Option<String>,
}
