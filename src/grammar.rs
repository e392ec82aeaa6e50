/// Tree-sitter grammar resolution by code-fence language tag.
use tree_sitter::Language;

/// Canonical language name for a fence tag or frontmatter `language` value.
/// Unknown tags are returned lowercased as-is.
pub fn canonical_language(tag: &str) -> String {
    let lower = tag.trim().to_ascii_lowercase();
    let canonical = match lower.as_str() {
        "py" | "python3" | "pycon" | "python" => "python",
        "rs" | "rust" => "rust",
        "js" | "javascript" | "jsx" | "mjs" => "javascript",
        "ts" | "typescript" | "tsx" => "typescript",
        "go" | "golang" => "go",
        "bash" | "sh" | "shell" | "zsh" => "bash",
        _ => return lower,
    };
    return canonical.to_string();
}

/// Map a code-fence tag to its tree-sitter language.
/// Returns `None` when no grammar is bundled for the tag.
pub fn language_for_tag(tag: &str) -> Option<Language> {
    return match canonical_language(tag).as_str() {
        "bash" => Some(tree_sitter_bash::LANGUAGE.into()),
        "go" => Some(tree_sitter_go::LANGUAGE.into()),
        "javascript" | "typescript" => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        "python" => Some(tree_sitter_python::LANGUAGE.into()),
        "rust" => Some(tree_sitter_rust::LANGUAGE.into()),
        _ => None,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_share_a_canonical_name() {
        assert_eq!(canonical_language("py"), "python");
        assert_eq!(canonical_language("Python3"), "python");
        assert_eq!(canonical_language("rs"), "rust");
        assert_eq!(canonical_language("golang"), "go");
        assert_eq!(canonical_language("Haskell"), "haskell");
    }

    #[test]
    fn grammars_exist_for_bundled_languages() {
        for tag in ["python", "rs", "ts", "js", "go", "sh"] {
            assert!(language_for_tag(tag).is_some(), "{tag}");
        }
        assert!(language_for_tag("text").is_none());
        assert!(language_for_tag("").is_none());
    }
}
