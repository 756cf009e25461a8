// PyO3 Bindings Module
//
// Thin wrappers over the library API; only compiled with the `python` feature.

mod api;

// Re-export for lib.rs
pub use api::{extract_corpus, extract_method_pairs, hash_content, supported_languages};
