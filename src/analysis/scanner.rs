//! Source file discovery for analysis.

use crate::error::{ApiError, StorageError};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Directory names and file globs skipped on every scan
const DEFAULT_EXCLUDES: &[&str] = &[
    "node_modules",
    ".git",
    "build",
    "dist",
    "vendor",
    ".next",
    "coverage",
    "*.log",
    "*.lock",
];

/// Files larger than this are skipped
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Bytes inspected for a NUL when deciding whether a file is text
const BINARY_SNIFF_LEN: usize = 512;

/// A text file selected for analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
    pub language: String,
    pub size: u64,
}

/// Scanner configuration
#[derive(Debug, Clone, Default)]
pub struct ScannerConfig {
    pub paths: Vec<PathBuf>,
    /// Only files whose path matches this glob are kept
    pub include: Option<String>,
    /// Extra exclude glob, applied to entry names
    pub exclude: Option<String>,
}

pub struct Scanner {
    config: ScannerConfig,
}

impl Scanner {
    pub fn new(config: ScannerConfig) -> Self {
        Self { config }
    }

    /// Collect readable text files under every configured path.
    ///
    /// Unreadable entries are skipped; malformed globs are configuration errors.
    pub fn scan(&self) -> Result<Vec<SourceFile>, ApiError> {
        let include = match &self.config.include {
            Some(pattern) => Some(compile_glob(pattern)?),
            None => None,
        };

        let mut files = Vec::new();
        for root in &self.config.paths {
            let excludes = self.exclude_set(root)?;
            let walker = WalkDir::new(root)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry, &excludes));

            for entry in walker.filter_map(Result::ok) {
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                if let Some(include) = &include {
                    if !include.is_match(path) {
                        continue;
                    }
                }
                let Ok(metadata) = entry.metadata() else {
                    continue;
                };
                if metadata.len() > MAX_FILE_SIZE {
                    debug!(path = %path.display(), size = metadata.len(), "Skipping large file");
                    continue;
                }
                match read_text_file(path) {
                    Ok(Some(content)) => files.push(SourceFile {
                        path: path.to_path_buf(),
                        content,
                        language: detect_language(path).to_string(),
                        size: metadata.len(),
                    }),
                    Ok(None) => debug!(path = %path.display(), "Skipping binary file"),
                    Err(e) => {
                        debug!(path = %path.display(), error = %e, "Skipping unreadable file")
                    }
                }
            }
        }

        debug!(files = files.len(), "Scan complete");
        Ok(files)
    }

    fn exclude_set(&self, root: &Path) -> Result<GlobSet, ApiError> {
        let mut patterns: Vec<String> = DEFAULT_EXCLUDES.iter().map(|p| p.to_string()).collect();
        patterns.extend(read_gitignore_patterns(root));
        if let Some(exclude) = &self.config.exclude {
            patterns.push(exclude.clone());
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            builder.add(compile_pattern(pattern)?);
        }
        builder
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Invalid exclude patterns: {}", e)))
    }
}

fn compile_pattern(pattern: &str) -> Result<Glob, ApiError> {
    Glob::new(pattern)
        .map_err(|e| ApiError::ConfigError(format!("Invalid glob '{}': {}", pattern, e)))
}

fn compile_glob(pattern: &str) -> Result<GlobSet, ApiError> {
    GlobSetBuilder::new()
        .add(compile_pattern(pattern)?)
        .build()
        .map_err(|e| ApiError::ConfigError(format!("Invalid glob '{}': {}", pattern, e)))
}

/// An entry is excluded when its name matches any exclude pattern
fn is_excluded(entry: &DirEntry, excludes: &GlobSet) -> bool {
    excludes.is_match(Path::new(entry.file_name()))
}

/// Read `.gitignore` under `root` (trim, skip empty and comment lines, drop anchoring slashes)
fn read_gitignore_patterns(root: &Path) -> Vec<String> {
    let Ok(contents) = fs::read_to_string(root.join(".gitignore")) else {
        return Vec::new();
    };
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .map(|line| line.trim_matches('/').to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Returns `None` for binary files (NUL byte in the leading bytes)
fn read_text_file(path: &Path) -> Result<Option<String>, StorageError> {
    let mut file = fs::File::open(path).map_err(|source| StorageError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|source| StorageError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let sniff = &bytes[..bytes.len().min(BINARY_SNIFF_LEN)];
    if sniff.contains(&0) {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}

pub fn detect_language(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let language = match extension.as_str() {
        "go" => Some("go"),
        "ts" | "tsx" => Some("typescript"),
        "js" | "jsx" => Some("javascript"),
        "py" => Some("python"),
        "java" => Some("java"),
        "c" => Some("c"),
        "cpp" => Some("cpp"),
        "rs" => Some("rust"),
        "rb" => Some("ruby"),
        "php" => Some("php"),
        "cs" => Some("csharp"),
        "swift" => Some("swift"),
        "kt" => Some("kotlin"),
        "scala" => Some("scala"),
        "r" => Some("r"),
        "sql" => Some("sql"),
        "sh" => Some("shell"),
        "yaml" | "yml" => Some("yaml"),
        "json" => Some("json"),
        "xml" => Some("xml"),
        "html" => Some("html"),
        "css" => Some("css"),
        "scss" => Some("scss"),
        "md" => Some("markdown"),
        _ => None,
    };
    if let Some(language) = language {
        return language;
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    match name.as_ref() {
        "Dockerfile" => "dockerfile",
        "Makefile" => "makefile",
        n if n.starts_with('.') => "config",
        _ => "text",
    }
}
