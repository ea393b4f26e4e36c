mod config;
mod document;
mod edit;
mod error;
mod latex;
mod node;
mod shared;
mod table;

pub use config::{Config, DocumentConfig, Placeholders};
pub use document::{DocClass, DocumentRoot, OutlineEntry, ParentRef, ROOT_ID};
pub use edit::{Applied, Edit, EditScript};
pub use error::{Error, Result};
pub use latex::{escape, generate};
pub use node::{DocNode, Equation, EquationMode, Figure, NodeId, NodeKind};
pub use shared::SharedDocument;
pub use table::{Align, ColumnSpec, Table, TableStyle, WidthMode};

/// Create an empty document using the bundled defaults.
pub fn create_empty_document() -> DocumentRoot {
    DocumentRoot::from_config(&Config::compiled_default())
}

/// Build a document from an edit script and render it to LaTeX.
pub fn script_to_latex(script: &str) -> Result<String> {
    script_to_latex_with_config(script, &Config::compiled_default())
}

/// Build a document from an edit script, starting from `config`, and render it to LaTeX.
pub fn script_to_latex_with_config(script: &str, config: &Config) -> Result<String> {
    let script = EditScript::from_toml(script)?;
    let mut doc = DocumentRoot::from_config(config);
    script.apply(&mut doc);
    Ok(generate(&doc))
}
