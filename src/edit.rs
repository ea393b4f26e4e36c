//! Scripted edits
//!
//! Every operation a front end can perform on a document, as plain data.
//! A script is a TOML file of `[[edit]]` tables applied in order:
//!
//! ```toml
//! [[edit]]
//! op = "add_section"
//!
//! [[edit]]
//! op = "set_title"
//! id = "node-1"
//! title = "Results"
//! ```

use serde::Deserialize;
use tracing::debug;

use crate::document::{DocClass, DocumentRoot};
use crate::error::{Error, Result};
use crate::node::{EquationMode, NodeId, NodeKind};
use crate::table::{Align, TableStyle, WidthMode};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Edit {
    AddChapter,
    AddSection {
        #[serde(default)]
        parent: Option<NodeId>,
    },
    AddSubsection {
        parent: NodeId,
    },
    AddText {
        #[serde(default)]
        parent: Option<NodeId>,
    },
    AddTable {
        #[serde(default)]
        parent: Option<NodeId>,
    },
    AddFigure {
        #[serde(default)]
        parent: Option<NodeId>,
    },
    AddEquation {
        #[serde(default)]
        parent: Option<NodeId>,
    },
    AddPageBreak {
        #[serde(default)]
        parent: Option<NodeId>,
    },
    Move {
        id: NodeId,
        delta: isize,
    },
    Delete {
        id: NodeId,
    },
    DeleteKeepChildren {
        id: NodeId,
    },
    AddRow {
        id: NodeId,
    },
    RemoveRow {
        id: NodeId,
    },
    AddColumn {
        id: NodeId,
    },
    RemoveColumn {
        id: NodeId,
    },
    SetCell {
        id: NodeId,
        row: usize,
        col: usize,
        text: String,
    },
    /// Omitting `color` clears the cell color.
    SetCellColor {
        id: NodeId,
        row: usize,
        col: usize,
        #[serde(default)]
        color: Option<String>,
    },
    SetColumn {
        id: NodeId,
        col: usize,
        #[serde(default)]
        align: Option<Align>,
        /// An empty string clears a fixed width.
        #[serde(default)]
        width: Option<String>,
    },
    SetTable {
        id: NodeId,
        #[serde(default)]
        style: Option<TableStyle>,
        #[serde(default)]
        width_mode: Option<WidthMode>,
        #[serde(default)]
        max_width_factor: Option<f64>,
        #[serde(default)]
        h_padding: Option<String>,
        #[serde(default)]
        has_header: Option<bool>,
        #[serde(default)]
        caption: Option<String>,
        #[serde(default)]
        label: Option<String>,
    },
    SetTitle {
        id: NodeId,
        title: String,
    },
    SetText {
        id: NodeId,
        content: String,
    },
    SetFigure {
        id: NodeId,
        #[serde(default)]
        image_path: Option<String>,
        #[serde(default)]
        caption: Option<String>,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        width: Option<f64>,
    },
    SetEquation {
        id: NodeId,
        #[serde(default)]
        mode: Option<EquationMode>,
        #[serde(default)]
        latex: Option<String>,
        #[serde(default)]
        numbered: Option<bool>,
    },
    SetDocument {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        author: Option<String>,
        #[serde(default)]
        doc_class: Option<DocClass>,
        #[serde(default)]
        include_toc: Option<bool>,
    },
}

/// What an [`Edit`] did to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// The document changed; insertions carry the new node's id.
    Changed(Option<NodeId>),
    /// The edit targeted something that isn't there, or set nothing.
    NoEffect,
}

impl Applied {
    pub fn changed(&self) -> bool {
        matches!(self, Applied::Changed(_))
    }
}

impl From<bool> for Applied {
    fn from(changed: bool) -> Self {
        if changed {
            Applied::Changed(None)
        } else {
            Applied::NoEffect
        }
    }
}

impl From<Option<NodeId>> for Applied {
    fn from(inserted: Option<NodeId>) -> Self {
        match inserted {
            Some(id) => Applied::Changed(Some(id)),
            None => Applied::NoEffect,
        }
    }
}

fn assign<T>(slot: &mut T, value: &Option<T>)
where
    T: Clone,
{
    if let Some(value) = value {
        *slot = value.clone();
    }
}

impl Edit {
    pub fn apply(&self, doc: &mut DocumentRoot) -> Applied {
        match self {
            Edit::AddChapter => doc.add_chapter().into(),
            Edit::AddSection { parent } => doc.add_section(parent.as_deref()).into(),
            Edit::AddSubsection { parent } => doc.add_subsection(parent).into(),
            Edit::AddText { parent } => doc.add_text(parent.as_deref()).into(),
            Edit::AddTable { parent } => doc.add_table(parent.as_deref()).into(),
            Edit::AddFigure { parent } => doc.add_figure(parent.as_deref()).into(),
            Edit::AddEquation { parent } => doc.add_equation(parent.as_deref()).into(),
            Edit::AddPageBreak { parent } => doc.add_page_break(parent.as_deref()).into(),
            Edit::Move { id, delta } => doc.move_sibling(id, *delta).into(),
            Edit::Delete { id } => doc.delete_subtree(id).is_some().into(),
            Edit::DeleteKeepChildren { id } => doc.delete_promoting_children(id).into(),
            Edit::AddRow { id } => doc.add_table_row(id).into(),
            Edit::RemoveRow { id } => doc.remove_table_row(id).into(),
            Edit::AddColumn { id } => doc.add_table_column(id).into(),
            Edit::RemoveColumn { id } => doc.remove_table_column(id).into(),
            Edit::SetCell { id, row, col, text } => doc
                .table_mut(id)
                .is_some_and(|table| table.set_cell(*row, *col, text.clone()))
                .into(),
            Edit::SetCellColor {
                id,
                row,
                col,
                color,
            } => doc.set_cell_color(id, *row, *col, color.clone()).into(),
            Edit::SetColumn {
                id,
                col,
                align,
                width,
            } => {
                let Some(column) = doc.table_mut(id).and_then(|t| t.column_mut(*col)) else {
                    return Applied::NoEffect;
                };
                assign(&mut column.align, align);
                if let Some(width) = width {
                    column.width = Some(width.clone()).filter(|w| !w.is_empty());
                }
                Applied::Changed(None)
            }
            Edit::SetTable {
                id,
                style,
                width_mode,
                max_width_factor,
                h_padding,
                has_header,
                caption,
                label,
            } => {
                let Some(table) = doc.table_mut(id) else {
                    return Applied::NoEffect;
                };
                assign(&mut table.style, style);
                assign(&mut table.width_mode, width_mode);
                assign(&mut table.max_width_factor, max_width_factor);
                assign(&mut table.h_padding, h_padding);
                assign(&mut table.has_header, has_header);
                assign(&mut table.caption, caption);
                assign(&mut table.label, label);
                Applied::Changed(None)
            }
            Edit::SetTitle { id, title } => {
                match doc.find_by_id_mut(id).map(|node| &mut node.kind) {
                    Some(
                        NodeKind::Chapter { title: slot }
                        | NodeKind::Section { title: slot }
                        | NodeKind::Subsection { title: slot },
                    ) => {
                        *slot = title.clone();
                        Applied::Changed(None)
                    }
                    _ => Applied::NoEffect,
                }
            }
            Edit::SetText { id, content } => {
                match doc.find_by_id_mut(id).map(|node| &mut node.kind) {
                    Some(NodeKind::Text { content: slot }) => {
                        *slot = content.clone();
                        Applied::Changed(None)
                    }
                    _ => Applied::NoEffect,
                }
            }
            Edit::SetFigure {
                id,
                image_path,
                caption,
                label,
                width,
            } => match doc.find_by_id_mut(id).map(|node| &mut node.kind) {
                Some(NodeKind::Figure(figure)) => {
                    assign(&mut figure.image_path, image_path);
                    assign(&mut figure.caption, caption);
                    assign(&mut figure.label, label);
                    assign(&mut figure.width, width);
                    Applied::Changed(None)
                }
                _ => Applied::NoEffect,
            },
            Edit::SetEquation {
                id,
                mode,
                latex,
                numbered,
            } => match doc.find_by_id_mut(id).map(|node| &mut node.kind) {
                Some(NodeKind::Equation(equation)) => {
                    assign(&mut equation.mode, mode);
                    assign(&mut equation.latex, latex);
                    assign(&mut equation.numbered, numbered);
                    Applied::Changed(None)
                }
                _ => Applied::NoEffect,
            },
            Edit::SetDocument {
                title,
                author,
                doc_class,
                include_toc,
            } => {
                if title.is_none() && author.is_none() && doc_class.is_none() && include_toc.is_none() {
                    return Applied::NoEffect;
                }
                assign(&mut doc.title, title);
                assign(&mut doc.author, author);
                assign(&mut doc.doc_class, doc_class);
                assign(&mut doc.include_toc, include_toc);
                Applied::Changed(None)
            }
        }
    }
}

/// An ordered list of edits, read from TOML.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EditScript {
    #[serde(default, rename = "edit")]
    pub edits: Vec<Edit>,
}

impl EditScript {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(Error::Script)
    }

    /// Apply every edit in order, returning how many changed the document.
    pub fn apply(&self, doc: &mut DocumentRoot) -> usize {
        let mut changed = 0;
        for (index, edit) in self.edits.iter().enumerate() {
            let applied = edit.apply(doc);
            if applied.changed() {
                changed += 1;
            } else {
                debug!(index, ?edit, "edit had no effect");
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latex::generate;

    #[test]
    fn parse_script() {
        let script = EditScript::from_toml(
            r#"
            [[edit]]
            op = "add_chapter"

            [[edit]]
            op = "add_section"
            parent = "node-1"

            [[edit]]
            op = "set_cell_color"
            id = "node-3"
            row = 0
            col = 1
            color = "yellow!20"

            [[edit]]
            op = "move"
            id = "node-2"
            delta = -1
            "#,
        )
        .unwrap();

        assert_eq!(
            script.edits,
            vec![
                Edit::AddChapter,
                Edit::AddSection {
                    parent: Some("node-1".into())
                },
                Edit::SetCellColor {
                    id: "node-3".into(),
                    row: 0,
                    col: 1,
                    color: Some("yellow!20".into()),
                },
                Edit::Move {
                    id: "node-2".into(),
                    delta: -1
                },
            ]
        );
    }

    #[test]
    fn unknown_op_is_an_error() {
        let err = EditScript::from_toml("[[edit]]\nop = \"explode\"\n").unwrap_err();
        assert!(matches!(err, Error::Script(_)));
    }

    #[test]
    fn empty_script() {
        let script = EditScript::from_toml("").unwrap();
        assert!(script.edits.is_empty());
    }

    #[test]
    fn insertions_report_new_ids() {
        let mut doc = DocumentRoot::new();
        assert_eq!(
            Edit::AddTable { parent: None }.apply(&mut doc),
            Applied::Changed(Some("node-1".into()))
        );
        assert_eq!(
            Edit::AddSubsection {
                parent: "node-1".into()
            }
            .apply(&mut doc),
            Applied::NoEffect
        );
    }

    #[test]
    fn field_edits_check_node_kind() {
        let mut doc = DocumentRoot::new();
        let text = doc.add_text(None).unwrap();
        let section = doc.add_section(None).unwrap();

        let set_title = Edit::SetTitle {
            id: text.clone(),
            title: "Nope".into(),
        };
        assert_eq!(set_title.apply(&mut doc), Applied::NoEffect);

        let set_title = Edit::SetTitle {
            id: section.clone(),
            title: "Results".into(),
        };
        assert!(set_title.apply(&mut doc).changed());
        assert_eq!(doc.find_by_id(&section).unwrap().title(), Some("Results"));

        let set_text = Edit::SetText {
            id: text.clone(),
            content: "Body".into(),
        };
        assert!(set_text.apply(&mut doc).changed());
    }

    #[test]
    fn empty_document_edit_changes_nothing() {
        let mut doc = DocumentRoot::new();
        let empty = Edit::SetDocument {
            title: None,
            author: None,
            doc_class: None,
            include_toc: None,
        };
        assert_eq!(empty.apply(&mut doc), Applied::NoEffect);

        let script = EditScript::from_toml(
            "[[edit]]\nop = \"set_document\"\n\n[[edit]]\nop = \"set_document\"\nauthor = \"B\"\n",
        )
        .unwrap();
        assert_eq!(script.apply(&mut doc), 1);
        assert_eq!(doc.author, "B");
    }

    #[test]
    fn column_width_can_be_cleared() {
        let mut doc = DocumentRoot::new();
        let id = doc.add_table(None).unwrap();

        let edit = Edit::SetColumn {
            id: id.clone(),
            col: 1,
            align: Some(Align::Right),
            width: Some("2cm".into()),
        };
        assert!(edit.apply(&mut doc).changed());
        assert_eq!(doc.table(&id).unwrap().columns()[1].width.as_deref(), Some("2cm"));

        let edit = Edit::SetColumn {
            id: id.clone(),
            col: 1,
            align: None,
            width: Some(String::new()),
        };
        assert!(edit.apply(&mut doc).changed());
        let column = &doc.table(&id).unwrap().columns()[1];
        assert_eq!(column.width, None);
        assert_eq!(column.align, Align::Right);

        let edit = Edit::SetColumn {
            id,
            col: 7,
            align: Some(Align::Left),
            width: None,
        };
        assert_eq!(edit.apply(&mut doc), Applied::NoEffect);
    }

    #[test]
    fn script_builds_a_document() {
        let script = EditScript::from_toml(
            r#"
            [[edit]]
            op = "set_document"
            title = "Lab_Notes"
            doc_class = "report"
            include_toc = false

            [[edit]]
            op = "add_section"

            [[edit]]
            op = "set_title"
            id = "node-1"
            title = "Method"

            [[edit]]
            op = "add_equation"
            parent = "node-1"

            [[edit]]
            op = "set_equation"
            id = "node-2"
            mode = "inline"
            latex = "x^2"

            [[edit]]
            op = "delete"
            id = "missing"
            "#,
        )
        .unwrap();

        let mut doc = DocumentRoot::new();
        assert_eq!(script.apply(&mut doc), 5);

        let out = generate(&doc);
        assert!(out.contains(r"\title{Lab\_Notes}"));
        assert!(out.contains("\\chapter{Introduction}\n\n\\section{Method}\n\n$x^2$\n\n"));
        assert!(!out.contains(r"\tableofcontents"));
    }
}
