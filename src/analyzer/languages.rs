//! Static language and category metadata tables.
//!
//! Extension lookups go through [`LanguageTable`], which merges a static
//! built-in table with an optional runtime overlay for custom formats. The
//! built-in tables are immutable; extension happens only through the overlay.

use std::collections::HashMap;

use serde::Serialize;

/// Coarse file-category buckets for the corpus breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Code,
    Markup,
    Styling,
    Config,
    Documentation,
    Data,
    Media,
    Build,
    Other,
}

impl Category {
    /// Stable lowercase label, matching the serialized form.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Markup => "markup",
            Self::Styling => "styling",
            Self::Config => "config",
            Self::Documentation => "documentation",
            Self::Data => "data",
            Self::Media => "media",
            Self::Build => "build",
            Self::Other => "other",
        }
    }
}

/// Comment/naming metadata for one language extension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageSpec {
    /// Human-readable language name
    pub name: String,
    /// Category bucket
    pub category: Category,
    /// Single-line comment token, if the language has one
    pub line_comment: Option<String>,
    /// Multi-line comment open/close tokens, if the language has them
    pub block_comment: Option<(String, String)>,
}

impl LanguageSpec {
    fn new(
        name: &str,
        category: Category,
        line_comment: Option<&str>,
        block_comment: Option<(&str, &str)>,
    ) -> Self {
        Self {
            name: name.to_string(),
            category,
            line_comment: line_comment.map(str::to_string),
            block_comment: block_comment.map(|(o, c)| (o.to_string(), c.to_string())),
        }
    }
}

/// Look up the built-in language descriptor for a lowercase extension.
#[must_use]
pub fn builtin(ext: &str) -> Option<LanguageSpec> {
    use Category::*;
    let spec = match ext {
        "rs" => LanguageSpec::new("Rust", Code, Some("//"), Some(("/*", "*/"))),
        "py" => LanguageSpec::new("Python", Code, Some("#"), Some(("\"\"\"", "\"\"\""))),
        "js" => LanguageSpec::new("JavaScript", Code, Some("//"), Some(("/*", "*/"))),
        "jsx" => LanguageSpec::new("JSX", Code, Some("//"), Some(("/*", "*/"))),
        "ts" => LanguageSpec::new("TypeScript", Code, Some("//"), Some(("/*", "*/"))),
        "tsx" => LanguageSpec::new("TSX", Code, Some("//"), Some(("/*", "*/"))),
        "java" => LanguageSpec::new("Java", Code, Some("//"), Some(("/*", "*/"))),
        "c" | "h" => LanguageSpec::new("C", Code, Some("//"), Some(("/*", "*/"))),
        "cpp" | "cc" | "hpp" => LanguageSpec::new("C++", Code, Some("//"), Some(("/*", "*/"))),
        "cs" => LanguageSpec::new("C#", Code, Some("//"), Some(("/*", "*/"))),
        "go" => LanguageSpec::new("Go", Code, Some("//"), Some(("/*", "*/"))),
        "swift" => LanguageSpec::new("Swift", Code, Some("//"), Some(("/*", "*/"))),
        "kt" => LanguageSpec::new("Kotlin", Code, Some("//"), Some(("/*", "*/"))),
        "rb" => LanguageSpec::new("Ruby", Code, Some("#"), Some(("=begin", "=end"))),
        "php" => LanguageSpec::new("PHP", Code, Some("//"), Some(("/*", "*/"))),
        "pl" | "pm" => LanguageSpec::new("Perl", Code, Some("#"), None),
        "sh" | "bash" => LanguageSpec::new("Shell", Code, Some("#"), None),
        "lua" => LanguageSpec::new("Lua", Code, Some("--"), Some(("--[[", "]]"))),
        "sql" => LanguageSpec::new("SQL", Code, Some("--"), Some(("/*", "*/"))),
        "html" | "htm" => LanguageSpec::new("HTML", Markup, None, Some(("<!--", "-->"))),
        "xml" => LanguageSpec::new("XML", Markup, None, Some(("<!--", "-->"))),
        "css" => LanguageSpec::new("CSS", Styling, None, Some(("/*", "*/"))),
        "scss" => LanguageSpec::new("SCSS", Styling, Some("//"), Some(("/*", "*/"))),
        "less" => LanguageSpec::new("Less", Styling, Some("//"), Some(("/*", "*/"))),
        "yaml" | "yml" => LanguageSpec::new("YAML", Config, Some("#"), None),
        "toml" => LanguageSpec::new("TOML", Config, Some("#"), None),
        "ini" | "cfg" | "conf" => LanguageSpec::new("INI", Config, Some(";"), None),
        "json" => LanguageSpec::new("JSON", Data, None, None),
        "md" => LanguageSpec::new("Markdown", Documentation, None, Some(("<!--", "-->"))),
        "rst" => LanguageSpec::new("reStructuredText", Documentation, None, None),
        "txt" => LanguageSpec::new("Plain Text", Documentation, None, None),
        _ => return None,
    };
    Some(spec)
}

/// Category bucket for a lowercase extension; first matching rule wins.
///
/// This table covers more extensions than the language table: it buckets
/// every file, including ones no line counter understands.
#[must_use]
pub fn category_for(ext: &str) -> Category {
    match ext {
        "rs" | "py" | "js" | "jsx" | "ts" | "tsx" | "java" | "c" | "h" | "cpp" | "cc" | "hpp"
        | "cs" | "go" | "swift" | "kt" | "rb" | "php" | "pl" | "pm" | "sh" | "bash" | "lua"
        | "sql" => Category::Code,
        "html" | "htm" | "xml" | "svg" => Category::Markup,
        "css" | "scss" | "sass" | "less" => Category::Styling,
        "yaml" | "yml" | "toml" | "ini" | "cfg" | "conf" | "env" => Category::Config,
        "md" | "rst" | "txt" | "adoc" => Category::Documentation,
        "json" | "csv" | "tsv" | "parquet" => Category::Data,
        "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" | "ico" | "mp3" | "wav" | "mp4"
        | "avi" | "mkv" => Category::Media,
        "mk" | "cmake" | "gradle" | "bazel" | "dockerfile" => Category::Build,
        _ => Category::Other,
    }
}

/// Extension-to-descriptor lookup with an overlay for custom formats.
///
/// The overlay is consulted before the built-in table, so callers can both
/// add new extensions and shadow built-in ones.
#[derive(Debug, Clone, Default)]
pub struct LanguageTable {
    overlay: HashMap<String, LanguageSpec>,
}

impl LanguageTable {
    /// Table with only the built-in languages.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with custom descriptors merged over the built-ins.
    #[must_use]
    pub fn with_overlay(overlay: HashMap<String, LanguageSpec>) -> Self {
        let overlay = overlay
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        Self { overlay }
    }

    /// Look up the descriptor for an extension (any case).
    #[must_use]
    pub fn lookup(&self, ext: &str) -> Option<LanguageSpec> {
        let ext = ext.to_lowercase();
        self.overlay.get(&ext).cloned().or_else(|| builtin(&ext))
    }
}
