// crates/perf-gate-cli/src/files.rs
// ============================================================================
// Module: Filesystem File Provider
// Description: Resolves report file patterns against the local filesystem.
// Purpose: Feed report inputs to batch parsing with bounded reads.
// Dependencies: globset, perf-gate-core, tracing
// ============================================================================

//! ## Overview
//! [`FsFileProvider`] resolves glob patterns such as `results/*.jtl` or the
//! Ant-style `**/*.jtl`. The leading components without glob syntax form a
//! literal base directory; the remainder is compiled with `globset`, where
//! `*` and `?` stay inside one path component and `**` spans directories.
//!
//! Matches are walked from the base directory and returned sorted by their
//! path relative to that base, which is also the report name. A pattern
//! without glob syntax names one file and reports it under its file name.
//!
//! A pattern that matches nothing yields an empty list; a missing base
//! directory is treated the same way.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use globset::GlobBuilder;
use globset::GlobMatcher;
use perf_gate_core::FileProvider;
use perf_gate_core::FileProviderError;
use perf_gate_core::ReportInput;
use tracing::debug;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default maximum size of one report file.
pub const DEFAULT_MAX_REPORT_BYTES: u64 = 512 * 1024 * 1024;

/// Characters that start glob syntax in a path component.
const GLOB_META: [char; 4] = ['*', '?', '[', '{'];

// ============================================================================
// SECTION: Provider
// ============================================================================

/// File provider reading from a root directory.
#[derive(Debug, Clone)]
pub struct FsFileProvider {
    /// Directory relative patterns are resolved against.
    root: PathBuf,
    /// Maximum size of one report file.
    max_file_bytes: u64,
}

impl FsFileProvider {
    /// Creates a provider rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), max_file_bytes: DEFAULT_MAX_REPORT_BYTES }
    }

    /// Returns the provider with a different per-file size limit.
    #[must_use]
    pub const fn with_max_file_bytes(mut self, max_file_bytes: u64) -> Self {
        self.max_file_bytes = max_file_bytes;
        self
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads one matched file.
    fn read_input(&self, path: &Path, name: &str) -> Result<ReportInput, FileProviderError> {
        let metadata = fs::metadata(path).map_err(|err| io_error(path, &err))?;
        if metadata.len() > self.max_file_bytes {
            return Err(FileProviderError::Io(format!(
                "{} exceeds the {} byte report limit",
                path.display(),
                self.max_file_bytes
            )));
        }
        let bytes = fs::read(path).map_err(|err| io_error(path, &err))?;
        Ok(ReportInput::new(name, bytes))
    }
}

impl FileProvider for FsFileProvider {
    fn resolve(&self, pattern: &str) -> Result<Vec<ReportInput>, FileProviderError> {
        let trimmed = pattern.trim();
        let invalid = |reason: String| FileProviderError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };
        if trimmed.is_empty() {
            return Err(invalid("pattern is empty".to_string()));
        }
        let split = SplitPattern::new(trimmed);
        let base = self.root.join(&split.base);

        let Some(glob) = split.glob else {
            if !base.is_file() {
                debug!(pattern = trimmed, "pattern matched no file");
                return Ok(Vec::new());
            }
            let name = base
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| invalid("pattern must end in a utf-8 file name".to_string()))?
                .to_string();
            return Ok(vec![self.read_input(&base, &name)?]);
        };

        let matcher = GlobBuilder::new(&glob)
            .literal_separator(true)
            .build()
            .map_err(|err| invalid(err.to_string()))?
            .compile_matcher();
        let walk = Walk { matcher: &matcher, max_depth: split.max_depth };
        let mut matches = Vec::new();
        walk.visit(&base, "", 1, &mut matches)?;
        matches.sort();
        debug!(pattern = trimmed, matches = matches.len(), "pattern resolved");
        matches.iter().map(|(name, path)| self.read_input(path, name)).collect()
    }
}

// ============================================================================
// SECTION: Patterns
// ============================================================================

/// A pattern split into its literal base directory and glob remainder.
#[derive(Debug)]
struct SplitPattern {
    /// Literal leading components.
    base: PathBuf,
    /// Glob over paths relative to `base`; `None` for a literal file.
    glob: Option<String>,
    /// Deepest component count a match can have; `None` when `**` is used.
    max_depth: Option<usize>,
}

impl SplitPattern {
    /// Splits `pattern` at its first component containing glob syntax.
    fn new(pattern: &str) -> Self {
        let mut base = PathBuf::new();
        if pattern.starts_with('/') {
            base.push("/");
        }
        let mut rest: Vec<&str> = Vec::new();
        for part in pattern.split('/').filter(|part| !part.is_empty()) {
            if rest.is_empty() && !part.contains(GLOB_META) {
                base.push(part);
            } else {
                rest.push(part);
            }
        }
        if rest.is_empty() {
            return Self { base, glob: None, max_depth: None };
        }
        let max_depth = if rest.iter().any(|part| part.contains("**")) {
            None
        } else {
            Some(rest.len())
        };
        Self { base, glob: Some(rest.join("/")), max_depth }
    }
}

// ============================================================================
// SECTION: Directory Walk
// ============================================================================

/// Recursive walk collecting files whose relative path matches a glob.
struct Walk<'a> {
    /// Compiled glob over relative paths.
    matcher: &'a GlobMatcher,
    /// Deepest component count worth visiting.
    max_depth: Option<usize>,
}

impl Walk<'_> {
    /// Visits `dir`, whose path relative to the base is `prefix`.
    fn visit(
        &self,
        dir: &Path,
        prefix: &str,
        depth: usize,
        matches: &mut Vec<(String, PathBuf)>,
    ) -> Result<(), FileProviderError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(dir = %dir.display(), "pattern directory does not exist");
                return Ok(());
            }
            Err(err) => return Err(io_error(dir, &err)),
        };
        for entry in entries {
            let entry = entry.map_err(|err| io_error(dir, &err))?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let relative = if prefix.is_empty() { name } else { format!("{prefix}/{name}") };
            let path = entry.path();
            let kind = entry.file_type().map_err(|err| io_error(&path, &err))?;
            if kind.is_dir() {
                if self.max_depth.is_none_or(|max| depth < max) {
                    self.visit(&path, &relative, depth + 1, matches)?;
                }
            } else if path.is_file() && self.matcher.is_match(&relative) {
                matches.push((relative, path));
            }
        }
        Ok(())
    }
}

/// Formats an I/O error with its path.
fn io_error(path: &Path, err: &std::io::Error) -> FileProviderError {
    FileProviderError::Io(format!("{}: {err}", path.display()))
}
