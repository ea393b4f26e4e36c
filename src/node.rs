use serde::{Deserialize, Serialize};

use crate::table::Table;

/// Identifier of a node, unique within its document.
pub type NodeId = String;

/// A single addressable unit of document content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocNode {
    pub id: NodeId,
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DocNode>,
}

/// The payload of a node. Heading level is implied by the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Chapter { title: String },
    Section { title: String },
    Subsection { title: String },
    Text { content: String },
    Table(Table),
    Figure(Figure),
    PageBreak,
    Equation(Equation),
}

/// An included image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub image_path: String,
    pub caption: String,
    pub label: String,
    /// Fraction of the text width, 0 to 1.
    pub width: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquationMode {
    Inline,
    #[default]
    Display,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equation {
    pub mode: EquationMode,
    /// Raw math markup, emitted without escaping.
    pub latex: String,
    /// Only meaningful in display mode.
    pub numbered: bool,
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Chapter { .. } => "Chapter",
            NodeKind::Section { .. } => "Section",
            NodeKind::Subsection { .. } => "Subsection",
            NodeKind::Text { .. } => "Text",
            NodeKind::Table(_) => "Table",
            NodeKind::Figure(_) => "Figure",
            NodeKind::PageBreak => "Page Break",
            NodeKind::Equation(_) => "Equation",
        }
    }
}

const SUMMARY_CHARS: usize = 40;

impl DocNode {
    pub fn new(id: impl Into<NodeId>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            children: Vec::new(),
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Chapter { .. } | NodeKind::Section { .. } | NodeKind::Subsection { .. }
        )
    }

    /// Subsections may only be added under sections and other subsections.
    pub fn accepts_subsection(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Section { .. } | NodeKind::Subsection { .. }
        )
    }

    pub fn title(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Chapter { title }
            | NodeKind::Section { title }
            | NodeKind::Subsection { title } => Some(title),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match &self.kind {
            NodeKind::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match &mut self.kind {
            NodeKind::Table(table) => Some(table),
            _ => None,
        }
    }

    /// One-line caption for outline views, e.g. `Section: Results`.
    pub fn summary(&self) -> String {
        let detail = match &self.kind {
            NodeKind::Chapter { title }
            | NodeKind::Section { title }
            | NodeKind::Subsection { title } => truncate(title),
            NodeKind::Text { content } => truncate(content),
            NodeKind::Table(table) => format!("{}x{} {}", table.rows(), table.cols(), table.caption),
            NodeKind::Figure(figure) => truncate(&figure.caption),
            NodeKind::PageBreak => return self.kind.label().to_string(),
            NodeKind::Equation(eq) => truncate(&eq.latex),
        };
        format!("{}: {}", self.kind.label(), detail)
    }
}

fn truncate(text: &str) -> String {
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() > SUMMARY_CHARS {
        let head: String = line.chars().take(SUMMARY_CHARS).collect();
        format!("{head}...")
    } else {
        line.to_string()
    }
}
