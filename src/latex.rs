use std::borrow::Cow;

use crate::document::DocumentRoot;
use crate::node::{DocNode, Equation, EquationMode, Figure, NodeKind};
use crate::table::{Table, TableStyle, WidthMode};

const PACKAGES: &[&str] = &[
    r"\usepackage[margin=1in]{geometry}",
    r"\usepackage{graphicx}",
    r"\usepackage{booktabs}",
    r"\usepackage{array}",
    r"\usepackage{tabularx}",
    r"\usepackage{amsmath}",
    r"\usepackage[table]{xcolor}",
    r"\usepackage{hyperref}",
];

const STRIPE_COLORS: &str = r"\rowcolors{2}{gray!10}{white}";

/// Escape user text for LaTeX. Only underscores are escaped.
pub fn escape(text: &str) -> Cow<'_, str> {
    if text.contains('_') {
        Cow::Owned(text.replace('_', r"\_"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Render the whole document as LaTeX source.
pub fn generate(doc: &DocumentRoot) -> String {
    let mut out = Vec::new();

    out.push(format!(r"\documentclass{{{}}}", doc.doc_class.name()));
    out.extend(PACKAGES.iter().map(|p| p.to_string()));
    out.push(String::new());

    out.push(format!(r"\title{{{}}}", escape(&doc.title)));
    out.push(format!(r"\author{{{}}}", escape(&doc.author)));
    out.push(r"\date{\today}".to_string());
    out.push(String::new());
    out.push(r"\begin{document}".to_string());
    out.push(r"\maketitle".to_string());
    out.push(String::new());

    if doc.include_toc {
        for list in [r"\tableofcontents", r"\listoffigures", r"\listoftables"] {
            out.push(list.to_string());
            out.push(r"\newpage".to_string());
        }
        out.push(String::new());
    }

    if doc.doc_class.has_chapters() {
        out.push(r"\chapter{Introduction}".to_string());
        out.push(String::new());
    }

    for node in &doc.children {
        emit_node(node, &mut out);
    }

    out.push(r"\end{document}".to_string());
    out.join("\n")
}

fn emit_node(node: &DocNode, out: &mut Vec<String>) {
    match &node.kind {
        NodeKind::Chapter { title } => emit_heading("chapter", title, out),
        NodeKind::Section { title } => emit_heading("section", title, out),
        NodeKind::Subsection { title } => emit_heading("subsection", title, out),
        NodeKind::Text { content } => {
            if !content.is_empty() {
                out.push(escape(content).into_owned());
                out.push(String::new());
            }
        }
        NodeKind::Table(table) => emit_table(table, out),
        NodeKind::Figure(figure) => emit_figure(figure, out),
        NodeKind::PageBreak => {
            out.push(r"\newpage".to_string());
            out.push(String::new());
        }
        NodeKind::Equation(equation) => emit_equation(equation, out),
    }

    for child in &node.children {
        emit_node(child, out);
    }
}

fn emit_heading(command: &str, title: &str, out: &mut Vec<String>) {
    out.push(format!(r"\{}{{{}}}", command, escape(title)));
    out.push(String::new());
}

fn emit_equation(equation: &Equation, out: &mut Vec<String>) {
    match equation.mode {
        EquationMode::Inline => {
            out.push(format!("${}$", equation.latex));
        }
        EquationMode::Display => {
            let env = if equation.numbered { "equation" } else { "equation*" };
            out.push(format!(r"\begin{{{}}}", env));
            out.push(equation.latex.clone());
            out.push(format!(r"\end{{{}}}", env));
        }
    }
    out.push(String::new());
}

fn emit_figure(figure: &Figure, out: &mut Vec<String>) {
    out.push(r"\begin{figure}[h]".to_string());
    out.push(r"\centering".to_string());
    out.push(format!(
        r"\includegraphics[width={:.2}\textwidth]{{{}}}",
        figure.width, figure.image_path
    ));
    out.push(format!(r"\caption{{{}}}", escape(&figure.caption)));
    // Figure labels go out verbatim; table labels are escaped.
    out.push(format!(r"\label{{figure:{}}}", figure.label));
    out.push(r"\end{figure}".to_string());
    out.push(String::new());
}

/// Top, header and bottom rules for a table style.
fn rules(style: TableStyle) -> [Option<&'static str>; 3] {
    match style {
        TableStyle::Booktabs => [Some(r"\toprule"), Some(r"\midrule"), Some(r"\bottomrule")],
        TableStyle::Minimal => [None, None, None],
        TableStyle::Default | TableStyle::Striped => {
            [Some(r"\hline"), Some(r"\hline"), Some(r"\hline")]
        }
    }
}

/// Column spec for the tabular environment, e.g. `|l|c|p{3cm}|`.
fn column_spec(table: &Table) -> String {
    let inner = table
        .columns()
        .iter()
        .map(|col| match col.width.as_deref().map(str::trim) {
            Some(width) if !width.is_empty() => format!("p{{{}}}", width),
            _ => col.align.letter().to_string(),
        })
        .collect::<Vec<_>>()
        .join("|");

    match table.style {
        TableStyle::Booktabs | TableStyle::Minimal => inner,
        TableStyle::Default | TableStyle::Striped if inner.is_empty() => "|c|".to_string(),
        TableStyle::Default | TableStyle::Striped => format!("|{}|", inner),
    }
}

fn emit_table(table: &Table, out: &mut Vec<String>) {
    let [top, mid, bottom] = rules(table.style);

    out.push(r"\begin{table}[h]".to_string());
    out.push(r"\centering".to_string());
    out.push(format!(r"\caption{{{}}}", escape(&table.caption)));
    out.push(format!(r"\label{{tab:{}}}", escape(&table.label)));
    out.push(format!(r"\setlength{{\tabcolsep}}{{{}}}", table.h_padding));
    if table.style == TableStyle::Striped {
        out.push(STRIPE_COLORS.to_string());
    }

    let wrapper = match table.width_mode {
        WidthMode::Natural => None,
        WidthMode::FitToPage => Some(r"\resizebox{\textwidth}{!}{%".to_string()),
        WidthMode::CustomScale => Some(format!(
            r"\resizebox{{{:.2}\textwidth}}{{!}}{{%",
            table.max_width_factor
        )),
    };
    let wrapped = wrapper.is_some();
    out.extend(wrapper);

    out.push(format!(r"\begin{{tabular}}{{{}}}", column_spec(table)));
    out.extend(top.map(str::to_string));

    for (i, (cells, colors)) in table.rows_iter().enumerate() {
        let row = cells
            .iter()
            .zip(colors)
            .map(|(text, color)| match color {
                Some(color) => format!(r"\cellcolor{{{}}} {}", color, escape(text)),
                None => escape(text).into_owned(),
            })
            .collect::<Vec<_>>()
            .join(" & ");
        out.push(format!(r"{} \\", row));

        if i == 0 && table.has_header {
            out.extend(mid.map(str::to_string));
        }
    }

    out.extend(bottom.map(str::to_string));
    out.push(r"\end{tabular}".to_string());
    if wrapped {
        out.push("}".to_string());
    }
    out.push(r"\end{table}".to_string());
    out.push(String::new());
}
