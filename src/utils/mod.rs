// Shared helpers

pub mod string_similarity;
