use super::Table;

/// Render a span-free table in the pipe-delimited grammar.
///
/// The first row becomes the header. Short rows are padded to the widest row.
pub fn to_pipe_table(table: &Table) -> String {
    let width = table.rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return String::new();
    }

    let mut lines = Vec::with_capacity(table.rows.len() + 1);
    for (i, row) in table.rows.iter().enumerate() {
        let cells: Vec<String> = (0..width)
            .map(|col| row.get(col).map(|c| escape_cell(&c.text)).unwrap_or_default())
            .collect();
        lines.push(format_row(&cells));
        if i == 0 {
            lines.push(format_row(&vec!["---".to_string(); width]));
        }
    }
    lines.join("\n")
}

fn format_row(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}

fn escape_cell(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}
