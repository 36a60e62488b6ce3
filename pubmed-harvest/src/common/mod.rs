//! Identifier types shared by the search and fetch paths

pub mod ids;

pub use ids::PubMedId;
