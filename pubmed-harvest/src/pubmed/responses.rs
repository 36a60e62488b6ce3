use serde::Deserialize;

use crate::error::{PubMedError, Result};

#[derive(Debug, Deserialize)]
pub(crate) struct ESearchResult {
    pub esearchresult: ESearchData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ESearchData {
    #[serde(default, rename = "ERROR")]
    pub error: Option<String>,
    #[serde(default)]
    pub count: Option<String>,
    #[serde(default)]
    pub idlist: Option<Vec<String>>,
}

impl ESearchData {
    /// Total match count; a missing or non-numeric `count` is malformed
    pub fn total_count(&self) -> Result<usize> {
        let raw = self
            .count
            .as_deref()
            .ok_or_else(|| PubMedError::MalformedResponse {
                message: "ESearch response has no count".to_string(),
            })?;

        raw.trim()
            .parse()
            .map_err(|_| PubMedError::MalformedResponse {
                message: format!("ESearch count '{}' is not an integer", raw),
            })
    }

    /// Take the id list out of the response; a missing `idlist` is malformed
    pub fn take_ids(&mut self) -> Result<Vec<String>> {
        self.idlist
            .take()
            .ok_or_else(|| PubMedError::MalformedResponse {
                message: "ESearch response has no idlist".to_string(),
            })
    }
}
