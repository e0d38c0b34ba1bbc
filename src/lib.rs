// Cairn: unsupervised topical clustering for search results.
//
// This is the library root. Each module corresponds to one stage of the
// clustering pipeline or a cross-cutting concern shared by the stages.

pub mod assign;
pub mod cluster;
pub mod config;
pub mod document;
pub mod error;
pub mod finalize;
pub mod label;
pub mod language;
pub mod output;
pub mod pipeline;
pub mod preprocess;
pub mod reduce;
pub mod vsm;
