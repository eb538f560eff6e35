//! Ground-truth file enumeration supplied by the repository scanner.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One scanned file.
///
/// Trusted over model output whenever the two disagree about which files
/// exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path relative to the repository root, `/`-separated.
    pub relative_path: String,

    /// Language name (e.g., "Python").
    #[serde(default)]
    pub language: String,

    /// Extension including the leading dot, lowercase (e.g., ".py").
    #[serde(default)]
    pub extension: String,

    /// Heuristic complexity score in 0..=100.
    #[serde(default)]
    pub complexity_score: f64,

    /// Raw import specifiers found in the file.
    #[serde(default)]
    pub imports: Vec<String>,

    #[serde(default)]
    pub line_count: u64,

    #[serde(default)]
    pub size_bytes: u64,

    /// Language color reported by the scanner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_color: Option<String>,
}

impl FileRecord {
    /// Creates a record with the extension derived from the path.
    pub fn new(relative_path: impl Into<String>, language: impl Into<String>) -> Self {
        let relative_path = relative_path.into().replace('\\', "/");
        let extension = extension_of(&relative_path);
        Self {
            relative_path,
            language: language.into(),
            extension,
            complexity_score: 0.0,
            imports: Vec::new(),
            line_count: 0,
            size_bytes: 0,
            language_color: None,
        }
    }

    /// Sets the complexity score.
    pub fn with_complexity(mut self, score: f64) -> Self {
        self.complexity_score = score;
        self
    }

    /// Sets the import list.
    pub fn with_imports(mut self, imports: Vec<String>) -> Self {
        self.imports = imports;
        self
    }

    /// Bare filename (last path segment).
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.relative_path)
    }

    /// Parent directory, or `None` for files at the repository root.
    pub fn parent_dir(&self) -> Option<&str> {
        let normalized = self.relative_path.trim_end_matches(['/', '\\']);
        normalized
            .rfind(['/', '\\'])
            .map(|idx| &normalized[..idx])
            .filter(|dir| !dir.is_empty())
    }

    /// Extension, falling back to the one derived from the path when the
    /// scanner left it empty.
    pub fn effective_extension(&self) -> String {
        if self.extension.is_empty() {
            extension_of(&self.relative_path)
        } else {
            self.extension.to_ascii_lowercase()
        }
    }
}

/// Lowercase extension of the last path segment, with the leading dot.
fn extension_of(path: &str) -> String {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[idx..].to_ascii_lowercase(),
        _ => String::new(),
    }
}

/// Repository summary sent by the scanner before streaming begins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanMetadata {
    /// Repository name.
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub total_files: u64,

    #[serde(default)]
    pub total_lines: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_bytes: Option<u64>,

    /// Line count per language.
    #[serde(default)]
    pub languages: BTreeMap<String, u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_complexity: Option<f64>,

    /// Most complex files, highest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hotspots: Vec<Hotspot>,
}

impl ScanMetadata {
    /// Language with the most lines, if any.
    pub fn dominant_language(&self) -> Option<&str> {
        self.languages
            .iter()
            .max_by_key(|(_, lines)| **lines)
            .map(|(language, _)| language.as_str())
    }
}

/// A high-complexity file reported by the scanner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub file: String,
    #[serde(default)]
    pub complexity: f64,
    #[serde(default)]
    pub lines: u64,
    #[serde(default)]
    pub language: String,
}
