use crate::model::{Catalog, Entry};
use crate::surface::ScanFailure;

/// Printable report columns, in their fixed left-to-right order. The model
/// also tracks the declaring type per entry, but that never becomes a column.
struct Column {
    header: &'static str,
    cell: fn(&Entry) -> &str,
}

fn cell_category(entry: &Entry) -> &str {
    entry.category.as_str()
}

fn cell_name(entry: &Entry) -> &str {
    &entry.name
}

fn cell_member_type(entry: &Entry) -> &str {
    entry.member_type.as_deref().unwrap_or("")
}

fn cell_tested(entry: &Entry) -> &str {
    &entry.tested
}

const COLUMNS: &[Column] = &[
    Column { header: "Category", cell: cell_category },
    Column { header: "Name", cell: cell_name },
    Column { header: "Type", cell: cell_member_type },
    Column { header: "Tested", cell: cell_tested },
];

/// Renders the finalized catalogue as a pipe-delimited text document, one
/// section per type, diagnostics inline, attribution footer last.
pub struct ReportRenderer {
    module_name: String,
}

impl ReportRenderer {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self { module_name: module_name.into() }
    }

    pub fn render(&self, catalog: &Catalog, failures: &[ScanFailure]) -> String {
        let widths = column_widths(catalog);
        let mut lines: Vec<String> = Vec::new();

        lines.push(format!("# Public type surface of {}", self.module_name));

        if !failures.is_empty() {
            lines.push(String::new());
            lines.push("Module load diagnostics:".to_string());
            lines.push(String::new());
            for failure in failures {
                lines.push(format!("- {}", failure.message));
                for probe in &failure.resolution_log {
                    lines.push(format!("    {}", probe));
                }
            }
        }

        for (id, type_entry) in catalog.types() {
            lines.push(String::new());
            lines.push(format!("## {}", type_entry.name));
            lines.push(String::new());

            let members: Vec<&Entry> = catalog.members_of(id).collect();
            if members.is_empty() {
                lines.push("No newly defined public members.".to_string());
                continue;
            }

            lines.push(header_row(&widths));
            lines.push(separator_row(&widths));
            for member in members {
                lines.push(entry_row(member, &widths));
            }
        }

        lines.push(String::new());
        lines.push("---".to_string());
        lines.push(format!("*Generated by {}*", env!("CARGO_PKG_NAME")));

        let mut document = lines.join("\n");
        document.push('\n');
        document
    }
}

/// Width per column: the header and every cell in the whole catalogue count,
/// type-level entries included, so columns align across all sections.
fn column_widths(catalog: &Catalog) -> Vec<usize> {
    COLUMNS
        .iter()
        .map(|column| {
            catalog
                .entries()
                .iter()
                .map(|entry| display_width((column.cell)(entry)))
                .fold(display_width(column.header), usize::max)
        })
        .collect()
}

fn display_width(text: &str) -> usize {
    // Character count, not bytes: padding must be locale-independent and
    // stable for non-ASCII identifiers.
    text.chars().count()
}

fn pad(text: &str, width: usize) -> String {
    let mut cell = String::from(text);
    for _ in display_width(text)..width {
        cell.push(' ');
    }
    cell
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let mut row = String::new();
    for (cell, width) in cells.iter().zip(widths) {
        row.push_str("| ");
        row.push_str(&pad(cell, *width));
        row.push(' ');
    }
    row.push('|');
    row
}

fn header_row(widths: &[usize]) -> String {
    let cells: Vec<String> = COLUMNS.iter().map(|c| c.header.to_string()).collect();
    format_row(&cells, widths)
}

fn separator_row(widths: &[usize]) -> String {
    let cells: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    format_row(&cells, widths)
}

fn entry_row(entry: &Entry, widths: &[usize]) -> String {
    let cells: Vec<String> = COLUMNS.iter().map(|c| (c.cell)(entry).to_string()).collect();
    format_row(&cells, widths)
}
