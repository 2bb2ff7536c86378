use docsync_engine::anchors::{Anchor, PositionIndex, decode, encode, strip};
use docsync_engine::models::BBox;
use docsync_engine::tables::{Table, TableCell, is_complex};
use proptest::prelude::*;

/// Any id `encode` accepts: one or more non-whitespace characters.
fn arb_block_id() -> impl Strategy<Value = String> {
    "\\S{1,24}"
}

fn arb_bbox() -> impl Strategy<Value = BBox> {
    (any::<u32>(), any::<u32>(), any::<u32>(), any::<u32>())
        .prop_map(|(x, y, w, h)| BBox::new(x, y, w, h))
}

/// Text that cannot contain a marker: no `<` at all.
fn arb_plain_text() -> impl Strategy<Value = String> {
    "[^<]{0,80}"
}

fn arb_anchor_list() -> impl Strategy<Value = Vec<Anchor>> {
    prop::collection::vec(0usize..5_000, 0..60).prop_map(|mut positions| {
        positions.sort_unstable();
        positions
            .into_iter()
            .enumerate()
            .map(|(i, position)| Anchor {
                block_id: format!("b{i}"),
                coords: BBox::default(),
                position,
            })
            .collect()
    })
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

proptest! {
    #![proptest_config(config())]

    #[test]
    fn marker_round_trips_through_arbitrary_text(
        id in arb_block_id(),
        bbox in arb_bbox(),
        prefix in arb_plain_text(),
        suffix in arb_plain_text(),
    ) {
        let marker = encode(&id, bbox).expect("valid id");
        let content = format!("{prefix}{marker}{suffix}");

        let anchors = decode(&content);

        prop_assert_eq!(anchors.len(), 1);
        prop_assert_eq!(&anchors[0].block_id, &id);
        prop_assert_eq!(anchors[0].coords, bbox);
        prop_assert_eq!(anchors[0].position, prefix.chars().count());
        prop_assert_eq!(encode(&anchors[0].block_id, anchors[0].coords).unwrap(), marker);
    }

    #[test]
    fn legacy_markers_never_decode(id in arb_block_id(), bbox in arb_bbox(), body in arb_plain_text()) {
        let coords = format!("{},{},{},{}", bbox.x, bbox.y, bbox.width, bbox.height);
        let div = format!(r#"<div data-block-id="{id}" data-bbox="{coords}"></div>{body}"#);
        let comment = format!("<!-- block:{id} {coords} -->\n{body}");

        prop_assert!(decode(&div).is_empty());
        prop_assert!(decode(&comment).is_empty());
    }

    #[test]
    fn nearest_anchor_is_monotonic(anchors in arb_anchor_list(), a in 0usize..6_000, b in 0usize..6_000) {
        let index = PositionIndex::new(anchors);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

        if let (Some(first), Some(second)) =
            (index.nearest_at_or_before(lo), index.nearest_at_or_before(hi))
        {
            prop_assert!(second.position >= first.position);
        }
        if let Some(found) = index.nearest_at_or_before(lo) {
            prop_assert!(found.position <= lo);
        }
    }

    #[test]
    fn nearest_anchor_boundaries(anchors in arb_anchor_list()) {
        let index = PositionIndex::new(anchors.clone());
        if let (Some(first), Some(last)) = (anchors.first(), anchors.last()) {
            if first.position > 0 {
                prop_assert!(index.nearest_at_or_before(first.position - 1).is_none());
            }
            prop_assert_eq!(
                index.nearest_at_or_before(last.position + 10).map(|a| &a.block_id),
                Some(&last.block_id)
            );
            for anchor in &anchors {
                let found = index.nearest_at_or_before(anchor.position).expect("anchor at position");
                prop_assert_eq!(found.position, anchor.position);
            }
        } else {
            prop_assert!(index.nearest_at_or_before(0).is_none());
        }
    }

    #[test]
    fn strip_is_idempotent(
        parts in prop::collection::vec((arb_plain_text(), arb_block_id(), arb_bbox()), 0..8),
        tail in "[^<]{0,40}",
    ) {
        let mut content = String::new();
        for (text, id, bbox) in &parts {
            content.push_str(text);
            content.push_str(&encode(id, *bbox).unwrap());
            content.push('\n');
        }
        content.push_str(&tail);

        let once = strip(&content);
        prop_assert_eq!(strip(&once), once.clone());
        prop_assert!(decode(&once).is_empty());
    }

    #[test]
    fn any_merged_cell_makes_a_table_complex(
        width in 1usize..6,
        height in 1usize..6,
        span in 2u32..8,
        pick in any::<prop::sample::Index>(),
        use_rowspan in any::<bool>(),
    ) {
        let mut table = Table {
            rows: (0..height)
                .map(|r| (0..width).map(|c| TableCell::new(format!("{r}:{c}"))
                    .with_spans(Some(1), None)).collect())
                .collect(),
        };
        prop_assert!(!is_complex(&table));

        let cell = pick.index(width * height);
        let target = &mut table.rows[cell / width][cell % width];
        if use_rowspan {
            target.rowspan = Some(span);
        } else {
            target.colspan = Some(span);
        }
        prop_assert!(is_complex(&table));
    }
}
