//! Per-table choice of serialization grammar.
//!
//! Tables with merged cells cannot be expressed in the pipe grammar without
//! losing structure, so they stay as their HTML markup. Everything else is
//! converted to pipe rows, which are far easier to correct by hand. The
//! decision is made once, when content is generated.

pub mod html;
pub mod pipe;

pub use html::{parse_html_table, table_spans};
pub use pipe::to_pipe_table;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableCell {
    pub text: String,
    pub header: bool,
    pub colspan: Option<u32>,
    pub rowspan: Option<u32>,
}

impl TableCell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_spans(mut self, colspan: Option<u32>, rowspan: Option<u32>) -> Self {
        self.colspan = colspan;
        self.rowspan = rowspan;
        self
    }

    pub fn col_span(&self) -> u32 {
        self.colspan.filter(|n| *n >= 1).unwrap_or(1)
    }

    pub fn row_span(&self) -> u32 {
        self.rowspan.filter(|n| *n >= 1).unwrap_or(1)
    }

    pub fn is_merged(&self) -> bool {
        self.col_span() > 1 || self.row_span() > 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub rows: Vec<Vec<TableCell>>,
}

/// Grammar a table is written in inside the content buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Native markup kept verbatim.
    Html,
    /// Pipe-delimited rows.
    Pipe,
}

/// True when any cell spans more than one row or column.
pub fn is_complex(table: &Table) -> bool {
    table.rows.iter().flatten().any(TableCell::is_merged)
}

pub fn classify(table: &Table) -> TableFormat {
    if is_complex(table) {
        TableFormat::Html
    } else {
        TableFormat::Pipe
    }
}

/// Content-buffer text for a table block whose extracted text is `source`.
///
/// Each `<table>` element is classified on its own and replaced in place.
/// Text around the tables, such as a caption or a source line, is kept
/// verbatim. Sources with no HTML table are passed through untouched.
pub fn serialize_table(source: &str) -> String {
    let spans = table_spans(source);
    if spans.is_empty() {
        return source.trim().to_string();
    }

    let mut out = String::with_capacity(source.len());
    let mut after_pipe = false;
    let mut cursor = 0;
    for span in spans {
        let gap = &source[cursor..span.start];
        if cursor > 0 && gap.trim().is_empty() {
            out.push_str("\n\n");
        } else {
            push_text(&mut out, gap, after_pipe);
        }

        let markup = &source[span.clone()];
        after_pipe = match parse_html_table(markup).map(|table| (classify(&table), table)) {
            Some((TableFormat::Pipe, table)) => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str(&to_pipe_table(&table));
                true
            }
            _ => {
                out.push_str(markup);
                false
            }
        };
        cursor = span.end;
    }
    push_text(&mut out, &source[cursor..], after_pipe);
    out.trim().to_string()
}

/// Pipe rows end at a line break, so text following them starts a new line.
fn push_text(out: &mut String, text: &str, after_pipe: bool) {
    if after_pipe && !text.is_empty() && !text.starts_with('\n') {
        out.push('\n');
    }
    out.push_str(text);
}
