//! The document tree and its structural edits.
//!
//! Edits that target something that isn't there (an unknown id, a move past
//! either end of a sibling list, a subsection under a non-section) leave the
//! tree untouched and report it through their return value instead of an
//! error.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::{Config, Placeholders};
use crate::error::Error;
use crate::node::{DocNode, Equation, EquationMode, Figure, NodeId, NodeKind};
use crate::table::Table;

/// Id of every document root.
pub const ROOT_ID: &str = "root";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocClass {
    #[default]
    Article,
    Report,
}

impl DocClass {
    pub fn name(self) -> &'static str {
        match self {
            DocClass::Article => "article",
            DocClass::Report => "report",
        }
    }

    /// Whether the class offers chapter-level headings.
    pub fn has_chapters(self) -> bool {
        matches!(self, DocClass::Report)
    }
}

/// Root of the document tree, carrying the document-wide settings.
///
/// Deserializing rejects trees that repeat an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawDocument")]
pub struct DocumentRoot {
    pub id: NodeId,
    pub title: String,
    pub author: String,
    pub doc_class: DocClass,
    pub include_toc: bool,
    #[serde(default)]
    pub children: Vec<DocNode>,
    #[serde(skip)]
    next_id: u64,
    #[serde(skip)]
    placeholders: Placeholders,
}

/// Documents compare by content; the id counter and placeholders are not part of it.
impl PartialEq for DocumentRoot {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.author == other.author
            && self.doc_class == other.doc_class
            && self.include_toc == other.include_toc
            && self.children == other.children
    }
}

/// Deserialized form of [`DocumentRoot`]; ids are checked when converting.
#[derive(Deserialize)]
struct RawDocument {
    id: NodeId,
    title: String,
    author: String,
    doc_class: DocClass,
    include_toc: bool,
    #[serde(default)]
    children: Vec<DocNode>,
}

impl TryFrom<RawDocument> for DocumentRoot {
    type Error = Error;

    fn try_from(raw: RawDocument) -> Result<Self, Self::Error> {
        let doc = Self {
            id: raw.id,
            title: raw.title,
            author: raw.author,
            doc_class: raw.doc_class,
            include_toc: raw.include_toc,
            children: raw.children,
            next_id: 0,
            placeholders: Placeholders::default(),
        };

        let mut seen = HashSet::new();
        seen.insert(doc.id.as_str());
        if let Some(dup) = doc.flatten().into_iter().find(|n| !seen.insert(n.id.as_str())) {
            return Err(Error::DuplicateId(dup.id.clone()));
        }
        Ok(doc)
    }
}

/// The container holding a node: the document root or another node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParentRef<'a> {
    Root,
    Node(&'a DocNode),
}

impl ParentRef<'_> {
    pub fn id<'d>(&'d self, doc: &'d DocumentRoot) -> &'d str {
        match self {
            ParentRef::Root => &doc.id,
            ParentRef::Node(node) => &node.id,
        }
    }
}

/// A node in outline order together with its nesting depth (0 for children of the root).
#[derive(Debug, Clone, Copy)]
pub struct OutlineEntry<'a> {
    pub depth: usize,
    pub node: &'a DocNode,
}

impl Default for DocumentRoot {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentRoot {
    /// An empty article titled "My Report" with a table of contents.
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            id: ROOT_ID.to_string(),
            title: config.document.title.clone(),
            author: config.document.author.clone(),
            doc_class: config.document.doc_class,
            include_toc: config.document.include_toc,
            children: Vec::new(),
            next_id: 0,
            placeholders: config.placeholders.clone(),
        }
    }

    pub fn placeholders(&self) -> &Placeholders {
        &self.placeholders
    }

    // Lookup

    /// Whether `id` names the document root rather than a node.
    pub fn is_root(&self, id: &str) -> bool {
        self.id == id
    }

    /// Breadth-first search for a node by id.
    ///
    /// The root is not a [`DocNode`], so its id is never found here; see
    /// [`is_root`](Self::is_root) and [`ParentRef::Root`].
    pub fn find_by_id(&self, id: &str) -> Option<&DocNode> {
        let mut queue: VecDeque<&DocNode> = self.children.iter().collect();
        while let Some(node) = queue.pop_front() {
            if node.id == id {
                return Some(node);
            }
            queue.extend(node.children.iter());
        }
        None
    }

    /// Breadth-first search for a node by id, for in-place field edits.
    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut DocNode> {
        let mut queue: VecDeque<&mut DocNode> = self.children.iter_mut().collect();
        while let Some(node) = queue.pop_front() {
            if node.id == id {
                return Some(node);
            }
            queue.extend(node.children.iter_mut());
        }
        None
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find_by_id(id).is_some()
    }

    /// The container holding `id` and the position of `id` among its children.
    pub fn find_parent_and_index(&self, id: &str) -> Option<(ParentRef<'_>, usize)> {
        fn search<'a>(
            parent: ParentRef<'a>,
            children: &'a [DocNode],
            id: &str,
        ) -> Option<(ParentRef<'a>, usize)> {
            if let Some(index) = children.iter().position(|n| n.id == id) {
                return Some((parent, index));
            }
            children
                .iter()
                .find_map(|child| search(ParentRef::Node(child), &child.children, id))
        }

        search(ParentRef::Root, &self.children, id)
    }

    /// Every node in pre-order: each node before its children, siblings in order.
    pub fn flatten(&self) -> Vec<&DocNode> {
        self.outline().into_iter().map(|entry| entry.node).collect()
    }

    /// Pre-order walk with nesting depth, as shown in an outline view.
    pub fn outline(&self) -> Vec<OutlineEntry<'_>> {
        fn walk<'a>(nodes: &'a [DocNode], depth: usize, out: &mut Vec<OutlineEntry<'a>>) {
            for node in nodes {
                out.push(OutlineEntry { depth, node });
                walk(&node.children, depth + 1, out);
            }
        }

        let mut out = Vec::new();
        walk(&self.children, 0, &mut out);
        out
    }

    pub fn table(&self, id: &str) -> Option<&Table> {
        self.find_by_id(id)?.as_table()
    }

    pub fn table_mut(&mut self, id: &str) -> Option<&mut Table> {
        self.find_by_id_mut(id)?.as_table_mut()
    }

    // Insertion

    /// Append a chapter to the root. Allowed for every document class.
    pub fn add_chapter(&mut self) -> Option<NodeId> {
        let title = self.placeholders.chapter_title.clone();
        self.insert(None, |_| NodeKind::Chapter { title })
    }

    /// Append a section under the selected heading, or to the root when the
    /// selection is anything other than a heading.
    pub fn add_section(&mut self, selected: Option<&str>) -> Option<NodeId> {
        let parent = selected.filter(|id| self.find_by_id(id).is_some_and(DocNode::is_heading));
        let title = self.placeholders.section_title.clone();
        self.insert(parent, |_| NodeKind::Section { title })
    }

    /// Append a subsection under the selected section or subsection.
    pub fn add_subsection(&mut self, selected: &str) -> Option<NodeId> {
        if !self
            .find_by_id(selected)
            .is_some_and(DocNode::accepts_subsection)
        {
            trace!(selected, "subsection needs a section parent");
            return None;
        }
        let title = self.placeholders.subsection_title.clone();
        self.insert(Some(selected), |_| NodeKind::Subsection { title })
    }

    pub fn add_text(&mut self, selected: Option<&str>) -> Option<NodeId> {
        let content = self.placeholders.text.clone();
        self.insert(selected, |_| NodeKind::Text { content })
    }

    /// Append an empty 3x3 table with a header row, labelled with its id.
    pub fn add_table(&mut self, selected: Option<&str>) -> Option<NodeId> {
        self.insert(selected, |id| {
            let mut table = Table::new(3, 3);
            table.label = id.to_string();
            NodeKind::Table(table)
        })
    }

    /// Append a figure at 0.8 text width, labelled with its id.
    pub fn add_figure(&mut self, selected: Option<&str>) -> Option<NodeId> {
        let image_path = self.placeholders.figure_path.clone();
        let caption = self.placeholders.figure_caption.clone();
        self.insert(selected, |id| {
            NodeKind::Figure(Figure {
                image_path,
                caption,
                label: id.to_string(),
                width: 0.8,
            })
        })
    }

    /// Append a numbered display equation.
    pub fn add_equation(&mut self, selected: Option<&str>) -> Option<NodeId> {
        let equation = Equation {
            mode: EquationMode::Display,
            latex: self.placeholders.equation.clone(),
            numbered: true,
        };
        self.insert(selected, |_| NodeKind::Equation(equation))
    }

    pub fn add_page_break(&mut self, selected: Option<&str>) -> Option<NodeId> {
        self.insert(selected, |_| NodeKind::PageBreak)
    }

    fn insert(
        &mut self,
        parent: Option<&str>,
        make: impl FnOnce(&str) -> NodeKind,
    ) -> Option<NodeId> {
        if let Some(parent) = parent {
            if !self.is_root(parent) && !self.contains(parent) {
                trace!(parent, "insert under unknown node");
                return None;
            }
        }

        let id = self.fresh_id();
        let node = DocNode::new(id.clone(), make(id.as_str()));
        debug!(id = %id, kind = node.kind.label(), parent = parent.unwrap_or(ROOT_ID), "added node");
        self.children_mut(parent)?.push(node);
        Some(id)
    }

    fn fresh_id(&mut self) -> NodeId {
        loop {
            self.next_id += 1;
            let id = format!("node-{}", self.next_id);
            if !self.is_root(&id) && !self.contains(&id) {
                return id;
            }
        }
    }

    fn children_mut(&mut self, parent: Option<&str>) -> Option<&mut Vec<DocNode>> {
        match parent {
            None => Some(&mut self.children),
            Some(id) if self.is_root(id) => Some(&mut self.children),
            Some(id) => self.find_by_id_mut(id).map(|node| &mut node.children),
        }
    }

    fn siblings_mut(&mut self, id: &str) -> Option<(&mut Vec<DocNode>, usize)> {
        fn search<'a>(
            children: &'a mut Vec<DocNode>,
            id: &str,
        ) -> Option<(&'a mut Vec<DocNode>, usize)> {
            if let Some(index) = children.iter().position(|n| n.id == id) {
                return Some((children, index));
            }
            for child in children.iter_mut() {
                if let Some(found) = search(&mut child.children, id) {
                    return Some(found);
                }
            }
            None
        }

        search(&mut self.children, id)
    }

    // Reordering and removal

    /// Move a node `delta` places among its siblings. Moves that would leave
    /// the sibling list are ignored.
    pub fn move_sibling(&mut self, id: &str, delta: isize) -> bool {
        let Some((siblings, index)) = self.siblings_mut(id) else {
            trace!(id, "move of unknown node");
            return false;
        };
        let target = match index.checked_add_signed(delta) {
            Some(target) if target < siblings.len() && delta != 0 => target,
            _ => {
                trace!(id, delta, "move out of bounds");
                return false;
            }
        };
        let node = siblings.remove(index);
        siblings.insert(target, node);
        debug!(id, from = index, to = target, "moved node");
        true
    }

    /// Remove a node together with all of its descendants, returning it.
    pub fn delete_subtree(&mut self, id: &str) -> Option<DocNode> {
        let Some((siblings, index)) = self.siblings_mut(id) else {
            trace!(id, "delete of unknown node");
            return None;
        };
        let node = siblings.remove(index);
        debug!(id, "deleted subtree");
        Some(node)
    }

    /// Remove a node and splice its children into its former position.
    pub fn delete_promoting_children(&mut self, id: &str) -> bool {
        let Some((siblings, index)) = self.siblings_mut(id) else {
            trace!(id, "delete of unknown node");
            return false;
        };
        let node = siblings.remove(index);
        let promoted = node.children.len();
        siblings.splice(index..index, node.children);
        debug!(id, promoted, "deleted node, kept children");
        true
    }

    // Table grids

    pub fn add_table_row(&mut self, id: &str) -> bool {
        self.with_table(id, |table| {
            table.add_row();
            true
        })
    }

    pub fn remove_table_row(&mut self, id: &str) -> bool {
        self.with_table(id, Table::remove_row)
    }

    pub fn add_table_column(&mut self, id: &str) -> bool {
        self.with_table(id, |table| {
            table.add_column();
            true
        })
    }

    pub fn remove_table_column(&mut self, id: &str) -> bool {
        self.with_table(id, Table::remove_column)
    }

    /// Set or clear (`None`) the background color of one table cell.
    pub fn set_cell_color(&mut self, id: &str, row: usize, col: usize, color: Option<String>) -> bool {
        self.with_table(id, |table| table.set_cell_color(row, col, color))
    }

    fn with_table(&mut self, id: &str, f: impl FnOnce(&mut Table) -> bool) -> bool {
        let Some(table) = self.table_mut(id) else {
            trace!(id, "not a table");
            return false;
        };
        let changed = f(&mut *table);
        if changed {
            debug!(id, rows = table.rows(), cols = table.cols(), "edited table");
        } else {
            trace!(id, "table edit had no effect");
        }
        changed
    }
}
