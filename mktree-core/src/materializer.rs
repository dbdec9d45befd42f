use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{MaterializeError, MaterializeResult};
use crate::parser::{parse_structure, NodeKind, PathNode};
use crate::templates::TemplateRegistry;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentMode {
    Empty,
    #[default]
    Template,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    pub dirs_created: Vec<PathBuf>,
    pub dirs_existing: usize,
    pub files_created: Vec<PathBuf>,
    pub files_skipped: Vec<PathBuf>,
}

impl MaterializeReport {
    pub fn summary(&self) -> String {
        format!(
            "{} directories created ({} already present), {} files created, {} files left untouched",
            self.dirs_created.len(),
            self.dirs_existing,
            self.files_created.len(),
            self.files_skipped.len()
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanAction {
    Mkdir,
    Touch,
    Exists,
    /// An entry of the other kind is in the way.
    Conflict,
}

impl PlanAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mkdir => "mkdir",
            Self::Touch => "touch",
            Self::Exists => "exists",
            Self::Conflict => "conflict",
        }
    }
}

pub struct Materializer {
    root: PathBuf,
    mode: ContentMode,
    templates: TemplateRegistry,
}

impl Materializer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            mode: ContentMode::Empty,
            templates: TemplateRegistry::empty(),
        }
    }

    pub fn with_content(mut self, mode: ContentMode) -> Self {
        self.mode = mode;
        if mode == ContentMode::Template {
            self.templates = TemplateRegistry::default();
        }
        self
    }

    pub fn with_templates(mut self, templates: TemplateRegistry) -> Self {
        self.mode = ContentMode::Template;
        self.templates = templates;
        self
    }

    /// Resolves a `/`-joined relative path under the root with the platform
    /// separator.
    pub fn target_path(&self, rel: &str) -> PathBuf {
        rel.split('/')
            .filter(|s| !s.is_empty())
            .fold(self.root.clone(), |acc, seg| acc.join(seg))
    }

    /// What `materialize` would do for each node, without touching the disk.
    pub fn plan(&self, nodes: &[PathNode]) -> Vec<(PlanAction, PathBuf)> {
        nodes
            .iter()
            .map(|node| {
                let target = self.target_path(&node.path);
                let action = match (node.kind, fs::metadata(&target)) {
                    (NodeKind::Directory, Err(_)) => PlanAction::Mkdir,
                    (NodeKind::File, Err(_)) => PlanAction::Touch,
                    (NodeKind::Directory, Ok(m)) if m.is_dir() => PlanAction::Exists,
                    (NodeKind::File, Ok(m)) if !m.is_dir() => PlanAction::Exists,
                    (_, Ok(_)) => PlanAction::Conflict,
                };
                (action, target)
            })
            .collect()
    }

    pub fn materialize(&self, nodes: &[PathNode]) -> MaterializeResult<MaterializeReport> {
        let mut report = MaterializeReport::default();
        for node in nodes {
            let target = self.target_path(&node.path);
            match node.kind {
                NodeKind::Directory => self.create_dir(&target, &mut report)?,
                NodeKind::File => self.create_file(node, &target, &mut report)?,
            }
        }
        tracing::info!("{} under {}", report.summary(), self.root.display());
        Ok(report)
    }

    fn create_dir(&self, target: &Path, report: &mut MaterializeReport) -> MaterializeResult<()> {
        if target.is_dir() {
            report.dirs_existing += 1;
            return Ok(());
        }
        fs::create_dir_all(target).map_err(|e| MaterializeError::CreateDir {
            path: target.to_path_buf(),
            source: e,
        })?;
        tracing::debug!("created directory {}", target.display());
        report.dirs_created.push(target.to_path_buf());
        Ok(())
    }

    fn create_file(
        &self,
        node: &PathNode,
        target: &Path,
        report: &mut MaterializeReport,
    ) -> MaterializeResult<()> {
        if let Some(parent) = target.parent() {
            if !parent.is_dir() {
                self.create_dir(parent, report)?;
            }
        }

        let file_error = |e| MaterializeError::CreateFile {
            path: target.to_path_buf(),
            source: e,
        };
        // create_new refuses to clobber a file that appeared after the check.
        let mut file = match OpenOptions::new().write(true).create_new(true).open(target) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                tracing::debug!("keeping existing file {}", target.display());
                report.files_skipped.push(target.to_path_buf());
                return Ok(());
            }
            Err(e) => return Err(file_error(e)),
        };

        if self.mode == ContentMode::Template {
            let content = self.templates.render(&node.path);
            if !content.is_empty() {
                file.write_all(content.as_bytes()).map_err(file_error)?;
            }
        }
        tracing::debug!("created file {}", target.display());
        report.files_created.push(target.to_path_buf());
        Ok(())
    }
}

/// Parses `structure_text` and creates empty files and directories under
/// `root`.
pub fn build_structure(structure_text: &str, root: &Path) -> MaterializeResult<MaterializeReport> {
    let nodes = parse_structure(structure_text);
    Materializer::new(root).materialize(&nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn target_path_uses_platform_joins() {
        let m = Materializer::new("/base");
        assert_eq!(
            m.target_path("a/b/c.txt"),
            Path::new("/base").join("a").join("b").join("c.txt")
        );
    }

    #[test]
    fn file_node_creates_missing_parents() {
        let tmp = TempDir::new().unwrap();
        let report = Materializer::new(tmp.path())
            .materialize(&[PathNode::file("x/y/z.txt")])
            .unwrap();
        assert!(tmp.path().join("x/y").is_dir());
        assert!(tmp.path().join("x/y/z.txt").is_file());
        assert_eq!(report.dirs_created.len(), 1);
        assert_eq!(report.files_created.len(), 1);
    }

    #[test]
    fn empty_mode_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        Materializer::new(tmp.path())
            .materialize(&[PathNode::file("main.py")])
            .unwrap();
        assert_eq!(fs::read_to_string(tmp.path().join("main.py")).unwrap(), "");
    }
}
