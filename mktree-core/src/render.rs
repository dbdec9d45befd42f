use std::fmt::Write;

use crate::parser::{NodeKind, PathNode};

#[derive(Debug, Default)]
struct Entry {
    name: String,
    is_dir: bool,
    children: Vec<Entry>,
}

impl Entry {
    fn insert(&mut self, segments: &[&str], kind: NodeKind) {
        let Some((first, rest)) = segments.split_first() else {
            return;
        };
        let idx = match self.children.iter().position(|c| c.name == *first) {
            Some(i) => i,
            None => {
                self.children.push(Entry {
                    name: first.to_string(),
                    ..Entry::default()
                });
                self.children.len() - 1
            }
        };
        let child = &mut self.children[idx];
        if rest.is_empty() {
            child.is_dir |= kind == NodeKind::Directory;
        } else {
            child.is_dir = true;
            child.insert(rest, kind);
        }
    }
}

pub struct TreeRenderer {
    root_label: Option<String>,
}

impl TreeRenderer {
    pub fn new() -> Self {
        Self { root_label: None }
    }

    pub fn with_root_label(mut self, label: impl Into<String>) -> Self {
        self.root_label = Some(label.into());
        self
    }

    /// Draws the structure with `├── `/`└── ` connectors, in input order.
    pub fn render(&self, nodes: &[PathNode]) -> String {
        let mut root = Entry::default();
        for node in nodes {
            let segments: Vec<&str> = node.path.split('/').filter(|s| !s.is_empty()).collect();
            root.insert(&segments, node.kind);
        }

        let mut out = String::new();
        match &self.root_label {
            Some(label) => {
                let _ = writeln!(out, "{}/", label.trim_end_matches('/'));
                Self::write_children(&root, &mut out, "");
            }
            None => {
                for child in &root.children {
                    let _ = writeln!(out, "{}{}", child.name, if child.is_dir { "/" } else { "" });
                    Self::write_children(child, &mut out, "");
                }
            }
        }
        out
    }

    fn write_children(entry: &Entry, out: &mut String, prefix: &str) {
        let num_items = entry.children.len();
        for (i, child) in entry.children.iter().enumerate() {
            let is_last = i == num_items - 1;
            let connector = if is_last { "└── " } else { "├── " };
            let _ = writeln!(
                out,
                "{}{}{}{}",
                prefix,
                connector,
                child.name,
                if child.is_dir { "/" } else { "" }
            );
            if child.is_dir {
                let new_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
                Self::write_children(child, out, &new_prefix);
            }
        }
    }
}

impl Default for TreeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_connectors_under_root_label() {
        let nodes = vec![
            PathNode::directory("src"),
            PathNode::file("src/main.rs"),
            PathNode::file("src/lib.rs"),
            PathNode::file("README.md"),
        ];
        let text = TreeRenderer::new().with_root_label("demo").render(&nodes);
        assert_eq!(
            text,
            "demo/\n├── src/\n│   ├── main.rs\n│   └── lib.rs\n└── README.md\n"
        );
    }

    #[test]
    fn implicit_parents_become_directories() {
        let text = TreeRenderer::new().render(&[PathNode::file("a/b/c.txt")]);
        assert_eq!(text, "a/\n└── b/\n    └── c.txt\n");
    }
}
