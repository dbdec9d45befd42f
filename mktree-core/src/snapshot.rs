use std::cmp::Ordering;
use std::path::Path;

use walkdir::{DirEntry, WalkDir};

use crate::parser::PathNode;
use crate::render::TreeRenderer;

/// Captures an existing directory as path nodes, directories before files,
/// each group sorted by name.
pub struct Snapshot {
    exclude_patterns: Vec<glob::Pattern>,
    max_depth: Option<usize>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self {
            exclude_patterns: vec![],
            max_depth: None,
        }
    }

    /// Invalid patterns are reported and dropped.
    pub fn with_excludes<S: AsRef<str>>(mut self, patterns: &[S]) -> Self {
        for p in patterns {
            match glob::Pattern::new(p.as_ref()) {
                Ok(gp) => self.exclude_patterns.push(gp),
                Err(e) => tracing::warn!("ignoring exclude pattern {:?}: {}", p.as_ref(), e),
            }
        }
        self
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        if entry.depth() > 0 && name == ".git" {
            return true;
        }
        self.exclude_patterns.iter().any(|gp| gp.matches(&name))
    }

    pub fn capture(&self, start_path: &Path) -> Vec<PathNode> {
        let mut walker = WalkDir::new(start_path).min_depth(1).sort_by(|a, b| {
            let a_is_dir = a.file_type().is_dir();
            let b_is_dir = b.file_type().is_dir();
            if a_is_dir && !b_is_dir {
                Ordering::Less
            } else if !a_is_dir && b_is_dir {
                Ordering::Greater
            } else {
                a.file_name().cmp(b.file_name())
            }
        });
        if let Some(md) = self.max_depth {
            walker = walker.max_depth(md);
        }

        let mut nodes = vec![];
        for entry in walker.into_iter().filter_entry(|e| !self.is_excluded(e)) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let rel_path = match entry.path().strip_prefix(start_path) {
                Ok(r) => r,
                Err(_) => continue,
            };
            let rel = rel_path
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if entry.file_type().is_dir() {
                nodes.push(PathNode::directory(rel));
            } else {
                nodes.push(PathNode::file(rel));
            }
        }
        nodes
    }

    /// Tree text for `start_path`, labelled with its directory name.
    pub fn capture_text(&self, start_path: &Path) -> String {
        let root_display_name = start_path
            .canonicalize()
            .unwrap_or(start_path.to_path_buf())
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("."))
            .to_string_lossy()
            .to_string();
        TreeRenderer::new()
            .with_root_label(root_display_name)
            .render(&self.capture(start_path))
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}
