//! Shared mocks for the integration tests
//!
//! [`CorpusSearch`] answers ESearch from a synthetic dated corpus, honouring
//! `mindate`, `maxdate` and `retmax`, so the partitioner can run against
//! arbitrary windows. [`CorpusFetch`] answers EFetch with one record per
//! requested id.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use pubmed_harvest::{ClientConfig, DateBound, PubMedClient};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Ids with publication dates, kept sorted by date (stable for equal dates)
#[derive(Debug, Clone)]
pub struct Corpus {
    entries: Arc<Vec<(DateBound, String)>>,
}

impl Corpus {
    pub fn new(mut entries: Vec<(DateBound, String)>) -> Self {
        entries.sort_by_key(|(date, _)| *date);
        Self {
            entries: Arc::new(entries),
        }
    }

    /// `count` ids starting at `first_id`, all published on one day
    pub fn on_day(year: u32, month: u32, day: u32, first_id: u32, count: u32) -> Vec<(DateBound, String)> {
        let date = DateBound::new(year, month, day).unwrap();
        (first_id..first_id + count)
            .map(|id| (date, id.to_string()))
            .collect()
    }

    /// Ids `1..=count` spread evenly over 2018-2022, every year/month/day used
    pub fn spread(count: u32) -> Self {
        let entries = (1..=count)
            .map(|i| {
                let date =
                    DateBound::new(2018 + i % 5, 1 + (i / 5) % 12, 1 + (i / 60) % 28).unwrap();
                (date, i.to_string())
            })
            .collect();
        Self::new(entries)
    }

    pub fn matching(&self, min: DateBound, max: DateBound) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(date, _)| min <= *date && *date <= max)
            .map(|(_, id)| id.as_str())
            .collect()
    }

    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|(_, id)| id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// One ESearch call as seen by the mock
#[derive(Debug, Clone)]
pub struct SearchCall {
    pub mindate: Option<String>,
    pub maxdate: Option<String>,
    pub retmax: usize,
    pub count: usize,
    pub returned: usize,
}

pub type SearchLog = Arc<Mutex<Vec<SearchCall>>>;

pub struct CorpusSearch {
    corpus: Corpus,
    log: SearchLog,
}

impl CorpusSearch {
    pub fn new(corpus: Corpus) -> (Self, SearchLog) {
        let log = SearchLog::default();
        (
            Self {
                corpus,
                log: log.clone(),
            },
            log,
        )
    }
}

fn query_params(request: &Request) -> HashMap<String, String> {
    request.url.query_pairs().into_owned().collect()
}

impl Respond for CorpusSearch {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let params = query_params(request);

        let min = params
            .get("mindate")
            .map(|s| DateBound::parse_lower(s).unwrap())
            .unwrap_or(DateBound::new(0, 1, 1).unwrap());
        let max = params
            .get("maxdate")
            .map(|s| DateBound::parse_upper(s).unwrap())
            .unwrap_or(DateBound::new(9999, 12, 31).unwrap());
        let retmax: usize = params
            .get("retmax")
            .and_then(|s| s.parse().ok())
            .unwrap_or(20);

        let matching = self.corpus.matching(min, max);
        let ids = &matching[..retmax.min(matching.len())];

        self.log.lock().unwrap().push(SearchCall {
            mindate: params.get("mindate").cloned(),
            maxdate: params.get("maxdate").cloned(),
            retmax,
            count: matching.len(),
            returned: ids.len(),
        });

        ResponseTemplate::new(200).set_body_json(json!({
            "header": {"type": "esearch", "version": "0.3"},
            "esearchresult": {
                "count": matching.len().to_string(),
                "retmax": ids.len().to_string(),
                "retstart": "0",
                "idlist": ids,
            }
        }))
    }
}

/// Ids of every EFetch call, in call order
pub type FetchLog = Arc<Mutex<Vec<Vec<String>>>>;

/// EFetch mock: ids divisible by 10 come back as book records, the rest as
/// journal articles; ids listed in `missing` are left out of the payload
pub struct CorpusFetch {
    missing: Vec<String>,
    log: FetchLog,
}

impl CorpusFetch {
    pub fn new() -> (Self, FetchLog) {
        Self::with_missing(&[])
    }

    pub fn with_missing(missing: &[&str]) -> (Self, FetchLog) {
        let log = FetchLog::default();
        (
            Self {
                missing: missing.iter().map(|s| s.to_string()).collect(),
                log: log.clone(),
            },
            log,
        )
    }
}

pub fn article_xml(pmid: &str) -> String {
    format!(
        r#"<PubmedArticle>
    <MedlineCitation Status="MEDLINE" Owner="NLM">
        <PMID Version="1">{pmid}</PMID>
        <Article PubModel="Print">
            <Journal><Title>Journal of Tests</Title><JournalIssue><PubDate><Year>2020</Year></PubDate></JournalIssue></Journal>
            <ArticleTitle>Article {pmid}</ArticleTitle>
            <AuthorList><Author><LastName>Doe</LastName><ForeName>Jane</ForeName></Author></AuthorList>
        </Article>
    </MedlineCitation>
</PubmedArticle>"#
    )
}

pub fn book_xml(pmid: &str) -> String {
    format!(
        r#"<PubmedBookArticle>
    <BookDocument>
        <PMID Version="1">{pmid}</PMID>
        <Book><BookTitle book="tests">Book {pmid}</BookTitle><PubDate><Year>2019</Year></PubDate></Book>
    </BookDocument>
</PubmedBookArticle>"#
    )
}

impl Respond for CorpusFetch {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let params = query_params(request);
        let ids: Vec<String> = params
            .get("id")
            .map(|ids| ids.split(',').map(str::to_string).collect())
            .unwrap_or_default();

        self.log.lock().unwrap().push(ids.clone());

        let body: String = ids
            .iter()
            .filter(|id| !self.missing.contains(*id))
            .map(|id| {
                if id.parse::<u64>().unwrap() % 10 == 0 {
                    book_xml(id)
                } else {
                    article_xml(id)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        ResponseTemplate::new(200)
            .set_body_string(format!(
                "<?xml version=\"1.0\" ?>\n<PubmedArticleSet>\n{}\n</PubmedArticleSet>",
                body
            ))
            .insert_header("content-type", "text/xml")
    }
}

/// ESearch body with a fixed count and id list
pub fn esearch_json(ids: &[&str], count: usize) -> serde_json::Value {
    json!({
        "esearchresult": {
            "count": count.to_string(),
            "retmax": ids.len().to_string(),
            "retstart": "0",
            "idlist": ids,
        }
    })
}

pub async fn mount_search(server: &MockServer, corpus: Corpus) -> SearchLog {
    let (responder, log) = CorpusSearch::new(corpus);
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(responder)
        .mount(server)
        .await;
    log
}

pub async fn mount_fetch(server: &MockServer) -> FetchLog {
    let (responder, log) = CorpusFetch::new();
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(responder)
        .mount(server)
        .await;
    log
}

/// Client pointed at the mock server with a generous rate limit
pub fn mock_client(server: &MockServer, search_cap: usize) -> PubMedClient {
    let config = ClientConfig::new()
        .with_base_url(server.uri())
        .with_rate_limit(1_000)
        .with_search_cap(search_cap);

    PubMedClient::with_config(config)
}

pub async fn esearch_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|request| request.url.path() == "/esearch.fcgi")
        .count()
}
