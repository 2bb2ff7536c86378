use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use super::{Table, TableCell};

fn table_regex() -> &'static Regex {
    static TABLE_REGEX: OnceLock<Regex> = OnceLock::new();
    TABLE_REGEX.get_or_init(|| Regex::new(r"(?i)<table\b").expect("Invalid table regex"))
}

fn table_close_regex() -> &'static Regex {
    static TABLE_CLOSE_REGEX: OnceLock<Regex> = OnceLock::new();
    TABLE_CLOSE_REGEX
        .get_or_init(|| Regex::new(r"(?i)</table\s*>").expect("Invalid table close regex"))
}

fn row_regex() -> &'static Regex {
    static ROW_REGEX: OnceLock<Regex> = OnceLock::new();
    ROW_REGEX
        .get_or_init(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr\s*>").expect("Invalid row regex"))
}

fn cell_regex() -> &'static Regex {
    static CELL_REGEX: OnceLock<Regex> = OnceLock::new();
    CELL_REGEX.get_or_init(|| {
        Regex::new(r"(?is)<(td|th)\b([^>]*)>(.*?)</(?:td|th)\s*>").expect("Invalid cell regex")
    })
}

fn span_attr_regex() -> &'static Regex {
    static SPAN_ATTR_REGEX: OnceLock<Regex> = OnceLock::new();
    SPAN_ATTR_REGEX.get_or_init(|| {
        Regex::new(r#"(?i)\b(colspan|rowspan)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>"']+))"#)
            .expect("Invalid span attribute regex")
    })
}

fn tag_regex() -> &'static Regex {
    static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    TAG_REGEX.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("Invalid tag regex"))
}

fn whitespace_regex() -> &'static Regex {
    static WS_REGEX: OnceLock<Regex> = OnceLock::new();
    WS_REGEX.get_or_init(|| Regex::new(r"\s+").expect("Invalid whitespace regex"))
}

/// Byte ranges of each `<table>...</table>` element in `source`.
///
/// An unclosed table runs to the end of the input.
pub fn table_spans(source: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut from = 0;
    while let Some(open) = table_regex().find_at(source, from) {
        let end = table_close_regex()
            .find_at(source, open.end())
            .map_or(source.len(), |close| close.end());
        spans.push(open.start()..end);
        from = end;
    }
    spans
}

/// Parse the first HTML table in `html` into rows of cells.
///
/// Rows after the first `</table>` are not part of it. Returns `None` when
/// there is no `<table>` or it has no rows. Span attributes that are
/// missing, zero or not an integer are left unset.
pub fn parse_html_table(html: &str) -> Option<Table> {
    let span = table_spans(html).into_iter().next()?;
    let body = &html[span];

    let rows: Vec<Vec<TableCell>> = row_regex()
        .captures_iter(body)
        .map(|row| {
            cell_regex()
                .captures_iter(&row[1])
                .map(|cell| parse_cell(&cell[1], &cell[2], &cell[3]))
                .collect()
        })
        .collect();

    if rows.is_empty() {
        return None;
    }
    Some(Table { rows })
}

fn parse_cell(tag: &str, attrs: &str, inner: &str) -> TableCell {
    let mut cell = TableCell {
        text: cell_text(inner),
        header: tag.eq_ignore_ascii_case("th"),
        colspan: None,
        rowspan: None,
    };

    for caps in span_attr_regex().captures_iter(attrs) {
        let raw = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str())
            .unwrap_or("");
        let value = parse_span(raw);
        if caps[1].eq_ignore_ascii_case("colspan") {
            cell.colspan = value;
        } else {
            cell.rowspan = value;
        }
    }
    cell
}

fn parse_span(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|n| *n >= 1)
}

fn cell_text(inner: &str) -> String {
    let without_tags = tag_regex().replace_all(inner, " ");
    let decoded = html_escape::decode_html_entities(&without_tags);
    whitespace_regex()
        .replace_all(decoded.trim(), " ")
        .into_owned()
}
