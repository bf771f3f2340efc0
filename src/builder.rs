//! Template expansion module
//!
//! Flattens a root template into the output document by splicing in
//! included fragments. An inclusion directive is a line starting with
//! `%% ` followed by a path relative to the include base (the parent of
//! the serving root). Expansion is depth-first in document order; every
//! other line is copied through byte-for-byte.

use crate::config::{BuildConfig, SiteConfig};
use crate::logger;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Marker introducing an inclusion directive.
const INCLUDE_MARKER: &str = "%% ";

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write output '{}': {source}", .path.display())]
    Sink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("inclusion directive without a path in '{}', line {line}", .path.display())]
    MissingPath { path: PathBuf, line: usize },
    #[error("cyclic inclusion of '{}'", .path.display())]
    CyclicInclusion { path: PathBuf },
}

/// Resolved filesystem layout for one build target.
#[derive(Debug, Clone)]
pub struct Builder {
    include_base: PathBuf,
    root_template: PathBuf,
    output_path: PathBuf,
    detect_cycles: bool,
}

impl Builder {
    pub fn new(
        include_base: PathBuf,
        root_template: PathBuf,
        output_path: PathBuf,
        detect_cycles: bool,
    ) -> Self {
        Self {
            include_base,
            root_template,
            output_path,
            detect_cycles,
        }
    }

    pub fn from_config(site: &SiteConfig, build: &BuildConfig) -> Self {
        Self::new(
            site.include_base(),
            site.root_template_path(),
            site.output_path(),
            build.detect_cycles,
        )
    }

    /// Rebuild the output document from the root template.
    ///
    /// The output file is opened (truncating) before expansion starts, so a
    /// failure mid-expansion can leave it empty or truncated. That matches
    /// the no-partial-output-guarantee contract: the next successful build
    /// overwrites it anyway.
    pub fn build(&self) -> Result<(), BuildError> {
        let started = Instant::now();
        let file = File::create(&self.output_path).map_err(|e| BuildError::Sink {
            path: self.output_path.clone(),
            source: e,
        })?;
        let mut sink = BufWriter::new(file);
        let mut stack = Vec::new();
        self.expand(&self.root_template, &mut sink, &mut stack)?;
        sink.flush().map_err(|e| BuildError::Sink {
            path: self.output_path.clone(),
            source: e,
        })?;

        let bytes = std::fs::metadata(&self.output_path).map_or(0, |m| m.len());
        logger::log_build_completed(&self.output_path, bytes, started.elapsed());
        Ok(())
    }

    /// Expand one template file into `sink`, recursing into inclusions.
    ///
    /// `stack` is the chain of templates currently being expanded; it is
    /// only consulted when cycle detection is enabled. With detection off a
    /// cyclic inclusion graph recurses until resource exhaustion, which is
    /// the documented behavior of this tool.
    fn expand(
        &self,
        path: &Path,
        sink: &mut impl Write,
        stack: &mut Vec<PathBuf>,
    ) -> Result<(), BuildError> {
        if self.detect_cycles && stack.iter().any(|p| p == path) {
            return Err(BuildError::CyclicInclusion {
                path: path.to_path_buf(),
            });
        }
        stack.push(path.to_path_buf());

        let text = std::fs::read_to_string(path).map_err(|e| BuildError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        // split_inclusive keeps line terminators, so ordinary lines round-trip
        // verbatim (including a final line with no trailing newline).
        for (idx, line) in text.split_inclusive('\n').enumerate() {
            if let Some(rest) = line.strip_prefix(INCLUDE_MARKER) {
                let token =
                    rest.split_whitespace()
                        .next()
                        .ok_or_else(|| BuildError::MissingPath {
                            path: path.to_path_buf(),
                            line: idx + 1,
                        })?;
                let resolved = self.include_base.join(token);
                self.expand(&resolved, sink, stack)?;
            } else {
                sink.write_all(line.as_bytes())
                    .map_err(|e| BuildError::Sink {
                        path: self.output_path.clone(),
                        source: e,
                    })?;
            }
        }

        stack.pop();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) {
        fs::write(dir.path().join(name), content).unwrap();
    }

    fn builder(dir: &TempDir, detect_cycles: bool) -> Builder {
        Builder::new(
            dir.path().to_path_buf(),
            dir.path().join("root.html"),
            dir.path().join("out.html"),
            detect_cycles,
        )
    }

    fn output(dir: &TempDir) -> String {
        fs::read_to_string(dir.path().join("out.html")).unwrap()
    }

    #[test]
    fn test_plain_template_roundtrips_verbatim() {
        let dir = TempDir::new().unwrap();
        write(&dir, "root.html", "<html>\n<body>hi</body>\n</html>");
        builder(&dir, false).build().unwrap();
        // No trailing newline in the source, none in the output.
        assert_eq!(output(&dir), "<html>\n<body>hi</body>\n</html>");
    }

    #[test]
    fn test_recursive_inclusion() {
        let dir = TempDir::new().unwrap();
        write(&dir, "root.html", "%% a.html\n");
        write(&dir, "a.html", "%% b.html\n");
        write(&dir, "b.html", "hello\n");
        builder(&dir, false).build().unwrap();
        let out = output(&dir);
        assert_eq!(out, "hello\n");
        assert!(!out.contains("%%"));
    }

    #[test]
    fn test_order_preserved() {
        let dir = TempDir::new().unwrap();
        write(&dir, "root.html", "x\n%% a.html\ny\n");
        write(&dir, "a.html", "a\n");
        builder(&dir, false).build().unwrap();
        assert_eq!(output(&dir), "x\na\ny\n");
    }

    #[test]
    fn test_trailing_tokens_after_path_ignored() {
        let dir = TempDir::new().unwrap();
        write(&dir, "root.html", "%% a.html ignored comment\n");
        write(&dir, "a.html", "included\n");
        builder(&dir, false).build().unwrap();
        assert_eq!(output(&dir), "included\n");
    }

    #[test]
    fn test_marker_without_space_passes_through() {
        let dir = TempDir::new().unwrap();
        write(&dir, "root.html", "%%not-a-directive\n");
        builder(&dir, false).build().unwrap();
        assert_eq!(output(&dir), "%%not-a-directive\n");
    }

    #[test]
    fn test_idempotent() {
        let dir = TempDir::new().unwrap();
        write(&dir, "root.html", "x\n%% a.html\n");
        write(&dir, "a.html", "a\n");
        let b = builder(&dir, false);
        b.build().unwrap();
        let first = output(&dir);
        b.build().unwrap();
        assert_eq!(output(&dir), first);
    }

    #[test]
    fn test_missing_include_fails() {
        let dir = TempDir::new().unwrap();
        write(&dir, "root.html", "%% nope.html\n");
        let err = builder(&dir, false).build().unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }), "got {err:?}");
    }

    #[test]
    fn test_malformed_directive_fails() {
        let dir = TempDir::new().unwrap();
        write(&dir, "root.html", "ok\n%% \nrest\n");
        let err = builder(&dir, false).build().unwrap_err();
        match err {
            BuildError::MissingPath { line, .. } => assert_eq!(line, 2),
            other => panic!("expected MissingPath, got {other:?}"),
        }
    }

    #[test]
    fn test_self_inclusion_detected() {
        let dir = TempDir::new().unwrap();
        write(&dir, "root.html", "%% root.html\n");
        let err = builder(&dir, true).build().unwrap_err();
        assert!(matches!(err, BuildError::CyclicInclusion { .. }));
    }

    #[test]
    fn test_mutual_inclusion_detected() {
        let dir = TempDir::new().unwrap();
        write(&dir, "root.html", "%% a.html\n");
        write(&dir, "a.html", "%% root.html\n");
        let err = builder(&dir, true).build().unwrap_err();
        assert!(matches!(err, BuildError::CyclicInclusion { .. }));
    }

    #[test]
    fn test_repeated_noncyclic_inclusion_allowed() {
        // The same fragment twice is not a cycle; it is spliced twice.
        let dir = TempDir::new().unwrap();
        write(&dir, "root.html", "%% a.html\n%% a.html\n");
        write(&dir, "a.html", "a\n");
        builder(&dir, true).build().unwrap();
        assert_eq!(output(&dir), "a\na\n");
    }
}
