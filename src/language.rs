//! Language Support - tree-sitter grammars and method-pair node kinds
//!
//! ALL language-specific configuration lives here: which grammar parses a file,
//! which grammar kinds count as method declarations, and which count as the
//! simple names those declarations carry.
//!
//! # Supported Languages
//!
//! **JVM / .NET**: Java, C#
//! **Systems**: Rust, Go
//! **Scripting**: Python, JavaScript, TypeScript (and TSX)

/// Get tree-sitter language parser for a given language name
pub fn get_tree_sitter_language(language: &str) -> Option<tree_sitter::Language> {
    match language {
        "java" => Some(tree_sitter_java::LANGUAGE.into()),
        "csharp" => Some(tree_sitter_c_sharp::LANGUAGE.into()),
        "rust" => Some(tree_sitter_rust::LANGUAGE.into()),
        "go" => Some(tree_sitter_go::LANGUAGE.into()),
        "python" => Some(tree_sitter_python::LANGUAGE.into()),
        "javascript" => Some(tree_sitter_javascript::LANGUAGE.into()),
        "typescript" => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        "tsx" => Some(tree_sitter_typescript::LANGUAGE_TSX.into()),
        _ => None,
    }
}

/// Detect language from file extension
///
/// Returns the language name that can be passed to `get_tree_sitter_language()`.
pub fn detect_language_from_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "java" => Some("java"),
        "cs" => Some("csharp"),
        "rs" => Some("rust"),
        "go" => Some("go"),
        "py" => Some("python"),
        "js" | "jsx" | "mjs" | "cjs" => Some("javascript"),
        "ts" | "mts" | "cts" => Some("typescript"),
        "tsx" => Some("tsx"),
        _ => None,
    }
}

/// All language names accepted by `get_tree_sitter_language()`
pub fn supported_languages() -> &'static [&'static str] {
    &[
        "java",
        "csharp",
        "rust",
        "go",
        "python",
        "javascript",
        "typescript",
        "tsx",
    ]
}

/// Grammar kinds that represent a method (function) declaration with a body
///
/// Constructors count: the corpus treats them like any other method.
pub fn get_method_declaration_kinds(language: &str) -> &'static [&'static str] {
    match language {
        "java" => &[
            "method_declaration",
            "constructor_declaration",
            "compact_constructor_declaration",
        ],
        "csharp" => &[
            "method_declaration",
            "constructor_declaration",
            "destructor_declaration",
            "local_function_statement",
        ],
        "rust" => &["function_item"],
        "go" => &["function_declaration", "method_declaration"],
        "python" => &["function_definition"],
        "javascript" | "typescript" | "tsx" => &[
            "function_declaration",
            "generator_function_declaration",
            "method_definition",
        ],
        _ => &[],
    }
}

/// Grammar kinds of identifier leaves that can name a declaration
pub fn get_simple_name_kinds(language: &str) -> &'static [&'static str] {
    match language {
        "go" => &["identifier", "field_identifier"],
        "javascript" | "typescript" | "tsx" => &[
            "identifier",
            "property_identifier",
            "private_property_identifier",
        ],
        "java" | "csharp" | "rust" | "python" => &["identifier"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_supported_language_has_a_grammar_and_kinds() {
        for language in supported_languages() {
            assert!(
                get_tree_sitter_language(language).is_some(),
                "missing grammar for {}",
                language
            );
            assert!(
                !get_method_declaration_kinds(language).is_empty(),
                "missing method kinds for {}",
                language
            );
            assert!(
                !get_simple_name_kinds(language).is_empty(),
                "missing name kinds for {}",
                language
            );
        }
    }

    #[test]
    fn test_extension_detection() {
        assert_eq!(detect_language_from_extension("java"), Some("java"));
        assert_eq!(detect_language_from_extension("cs"), Some("csharp"));
        assert_eq!(detect_language_from_extension("tsx"), Some("tsx"));
        assert_eq!(detect_language_from_extension("py"), Some("python"));
        assert_eq!(detect_language_from_extension("txt"), None);
    }

    #[test]
    fn test_unknown_language_has_no_grammar() {
        assert!(get_tree_sitter_language("cobol").is_none());
        assert!(get_method_declaration_kinds("cobol").is_empty());
    }
}
