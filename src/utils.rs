#![forbid(unsafe_code)]

pub mod config;
pub mod errors;
pub mod snippet_store;
pub mod snippets_utils;
