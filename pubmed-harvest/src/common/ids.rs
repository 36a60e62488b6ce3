//! Validated PubMed identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PubMedError, Result};

/// A validated PubMed ID (PMID)
///
/// PMIDs are positive integers. Surrounding whitespace is ignored.
///
/// ```
/// use pubmed_harvest::common::PubMedId;
///
/// let pmid = PubMedId::parse("  31978945 ").unwrap();
/// assert_eq!(pmid.as_u32(), 31978945);
/// assert_eq!(pmid.to_string(), "31978945");
///
/// assert!(PubMedId::parse("").is_err());
/// assert!(PubMedId::parse("0").is_err());
/// assert!(PubMedId::parse("PMC7092803").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PubMedId(u32);

impl PubMedId {
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || PubMedError::InvalidPmid {
            pmid: s.to_string(),
        };

        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        match trimmed.parse::<u32>() {
            Ok(0) | Err(_) => Err(invalid()),
            Ok(value) => Ok(Self(value)),
        }
    }

    /// Validate every id in order, failing on the first bad one
    pub fn parse_all<S: AsRef<str>>(ids: &[S]) -> Result<Vec<Self>> {
        ids.iter().map(|id| Self::parse(id.as_ref())).collect()
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PubMedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PubMedId {
    type Err = PubMedError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<PubMedId> for u32 {
    fn from(pmid: PubMedId) -> Self {
        pmid.0
    }
}
