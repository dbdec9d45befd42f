use std::fmt;

const TAB_WIDTH: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Directory,
    File,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathNode {
    pub path: String,
    pub kind: NodeKind,
}

impl PathNode {
    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: NodeKind::Directory,
        }
    }

    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: NodeKind::File,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// Last path segment.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Number of `/`-separated segments above this node.
    pub fn depth(&self) -> usize {
        self.path.matches('/').count()
    }
}

impl fmt::Display for PathNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NodeKind::Directory => write!(f, "{}/", self.path),
            NodeKind::File => write!(f, "{}", self.path),
        }
    }
}

/// Ancestor chain of open directories as (indent width, accumulated path).
/// Widths strictly increase from bottom to top.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectoryStack {
    entries: Vec<(usize, String)>,
}

impl DirectoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every entry at least as indented as `indent` and returns the
    /// path of the nearest remaining ancestor.
    pub fn parent_for(&mut self, indent: usize) -> Option<&str> {
        while self.entries.last().is_some_and(|(w, _)| *w >= indent) {
            self.entries.pop();
        }
        self.entries.last().map(|(_, p)| p.as_str())
    }

    pub fn push(&mut self, indent: usize, path: String) {
        self.entries.push((indent, path));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeLine<'a> {
    pub indent: usize,
    pub name: &'a str,
    pub is_dir: bool,
}

fn is_branch_glyph(c: char) -> bool {
    matches!(c, '│' | '├' | '└' | '─' | '┃' | '┣' | '┗' | '━' | '|' | '`')
}

fn is_decoration(c: char, prev: Option<char>) -> bool {
    match c {
        ' ' | '\t' | '\u{a0}' => true,
        '-' => prev.is_some_and(|p| is_branch_glyph(p) || p == '-'),
        _ => is_branch_glyph(c),
    }
}

/// Cuts the line at the first unescaped `#`, turning `\#` into a literal `#`.
pub fn strip_comment(line: &str) -> std::borrow::Cow<'_, str> {
    if !line.contains('#') {
        return line.into();
    }
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'#') => {
                out.push('#');
                chars.next();
            }
            '#' => break,
            _ => out.push(c),
        }
    }
    out.into()
}

/// Splits a comment-free line into indent width and name.
pub fn split_indent(line: &str) -> (usize, &str) {
    let mut width = 0;
    let mut offset = line.len();
    let mut prev = None;
    for (i, c) in line.char_indices() {
        if !is_decoration(c, prev) {
            offset = i;
            break;
        }
        width += if c == '\t' { TAB_WIDTH } else { 1 };
        prev = Some(c);
    }
    (width, line[offset..].trim())
}

pub fn classify_line(line: &str) -> Option<TreeLine<'_>> {
    let (indent, name) = split_indent(line);
    if name.is_empty() {
        return None;
    }
    let is_dir = name.ends_with('/');
    let name = name.trim_end_matches('/').trim_end().trim_start_matches('/').trim_start();
    if name.is_empty() {
        return None;
    }
    Some(TreeLine {
        indent,
        name,
        is_dir,
    })
}

pub fn parse_structure(text: &str) -> Vec<PathNode> {
    let mut nodes = vec![];
    let mut stack = DirectoryStack::new();

    for raw_line in text.lines() {
        let line = strip_comment(raw_line);
        let line = line.trim_end();
        if line.trim().is_empty() {
            continue;
        }
        let tree_line = match classify_line(line) {
            Some(l) => l,
            None => continue,
        };

        let path = match stack.parent_for(tree_line.indent) {
            Some(parent) => format!("{}/{}", parent, tree_line.name),
            None => tree_line.name.to_string(),
        };

        if tree_line.is_dir {
            stack.push(tree_line.indent, path.clone());
            nodes.push(PathNode::directory(path));
        } else {
            nodes.push(PathNode::file(path));
        }
    }

    tracing::debug!("parsed {} path nodes", nodes.len());
    nodes
}
