//! Marker grammar for anchors embedded in editable content.
//!
//! A marker is an HTML comment of the exact shape
//! `<!-- @block:<id> <x>,<y>,<width>,<height> -->`. Only this shape is
//! recognised; older `<div data-block-id=...>` and prefix-less comment
//! markers are ignored and decode to nothing.

use std::sync::OnceLock;

use regex::Regex;

use super::{Anchor, AnchorError};
use crate::models::BBox;

const MARKER_OPEN: &str = "<!-- @block:";
const MARKER_CLOSE: &str = " -->";

fn marker_regex() -> &'static Regex {
    static MARKER_REGEX: OnceLock<Regex> = OnceLock::new();
    MARKER_REGEX.get_or_init(|| {
        Regex::new(r"<!-- @block:(\S+) +([0-9]+),([0-9]+),([0-9]+),([0-9]+)\s*-->")
            .expect("Invalid anchor marker regex")
    })
}

fn blank_run_regex() -> &'static Regex {
    static BLANK_RUN_REGEX: OnceLock<Regex> = OnceLock::new();
    BLANK_RUN_REGEX.get_or_init(|| Regex::new(r"\n{3,}").expect("Invalid blank run regex"))
}

/// Render the marker for `block_id` at `coords`.
///
/// The id must be non-empty and free of whitespace, otherwise the marker
/// could not be read back.
pub fn encode(block_id: &str, coords: BBox) -> Result<String, AnchorError> {
    if block_id.is_empty() || block_id.chars().any(char::is_whitespace) {
        return Err(AnchorError::InvalidBlockId(block_id.to_string()));
    }
    Ok(format!(
        "{MARKER_OPEN}{block_id} {},{},{},{}{MARKER_CLOSE}",
        coords.x, coords.y, coords.width, coords.height
    ))
}

/// Extract every well-formed marker from `content`, ordered by position.
///
/// Positions are character offsets of the marker start. Markers whose
/// coordinates overflow are skipped, and a repeated block id keeps only its
/// first occurrence.
pub fn decode(content: &str) -> Vec<Anchor> {
    let mut anchors: Vec<Anchor> = Vec::new();
    let mut scanned_bytes = 0;
    let mut scanned_chars = 0;

    for caps in marker_regex().captures_iter(content) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        scanned_chars += content[scanned_bytes..whole.start()].chars().count();
        scanned_bytes = whole.start();

        let Some(coords) = parse_coords(&caps) else {
            log::debug!("skipping marker with out-of-range coordinates at {scanned_chars}");
            continue;
        };
        let block_id = &caps[1];
        if anchors.iter().any(|a| a.block_id == block_id) {
            log::debug!("skipping duplicate marker for block {block_id}");
            continue;
        }

        anchors.push(Anchor {
            block_id: block_id.to_string(),
            coords,
            position: scanned_chars,
        });
    }

    // Matches come out in scan order already; keep the invariant explicit.
    anchors.sort_by_key(|a| a.position);
    anchors
}

fn parse_coords(caps: &regex::Captures<'_>) -> Option<BBox> {
    let x = caps[2].parse().ok()?;
    let y = caps[3].parse().ok()?;
    let width = caps[4].parse().ok()?;
    let height = caps[5].parse().ok()?;
    Some(BBox::new(x, y, width, height))
}

/// Byte ranges of every marker `decode` would accept, in scan order.
pub fn marker_spans(content: &str) -> Vec<std::ops::Range<usize>> {
    marker_regex()
        .captures_iter(content)
        .filter(|caps| parse_coords(caps).is_some())
        .filter_map(|caps| caps.get(0).map(|m| m.range()))
        .collect()
}

/// Remove markers and normalise the surrounding whitespace.
///
/// Only markers that decode are removed; anything else is human text.
/// Runs of three or more newlines collapse to a single blank line and the
/// result is trimmed.
pub fn strip(content: &str) -> String {
    let mut text = content.to_string();
    // Removing one marker can splice a new one together from its neighbours.
    loop {
        let next = marker_regex().replace_all(&text, |caps: &regex::Captures<'_>| {
            if parse_coords(caps).is_some() {
                String::new()
            } else {
                caps[0].to_string()
            }
        });
        if next == text {
            break;
        }
        text = next.into_owned();
    }
    blank_run_regex()
        .replace_all(&text, "\n\n")
        .trim()
        .to_string()
}
