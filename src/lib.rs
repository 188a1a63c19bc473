//! vocabaudit - dependency-aware quality checks for SKOS vocabularies.
//!
//! A vocabulary is loaded into a [`store::DataStore`]; the built-in
//! [`issues`] are registered in an [`engine::IssueCatalog`] and evaluated by
//! the memoizing [`engine::Engine`], which computes every issue at most once
//! and hands resolved dependency outcomes to its dependents. Finished runs
//! are summarized by [`analysis`] and written by [`report`].

pub mod analysis;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod issues;
pub mod links;
pub mod models;
pub mod report;
pub mod result;
pub mod sampling;
pub mod store;
pub mod vocab;
