#![no_main]

use galley_break::{
    ConstantLineLengths, Distance, Item, ItemList, TexOptimalityCriteria, search, set_line,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    // First byte picks the measure (60..1080), the rest drive the stream.
    let measure = 60 + i64::from(data[0]) * 4;
    let mut items = Vec::new();
    for chunk in data[1..].chunks_exact(3) {
        match chunk[0] % 4 {
            0 | 1 => items.push(Item::boxed(1 + i64::from(chunk[1]))),
            2 => items.push(Item::glue(
                i64::from(chunk[1]),
                i64::from(chunk[2] % 16),
                i64::from(chunk[2] / 8),
            )),
            _ => items.push(Item::penalty(
                0,
                i32::from(chunk[1]) * 100 - 12_800,
                chunk[2] & 1 == 1,
            )),
        }
    }
    items.push(Item::glue(0, 0, 100_000));
    items.push(Item::forced_break());
    let items = ItemList::new(items);

    let lengths = ConstantLineLengths::new(measure);
    let Ok(breaks) = search(&items, &lengths, &TexOptimalityCriteria::PERMISSIVE) else {
        return;
    };

    // Post-conditions that must always hold for a successful search:
    assert!(!breaks.is_empty(), "empty breakpoint sequence");
    assert_eq!(
        breaks.last().copied(),
        Some(items.len() - 1),
        "terminated paragraph must end at its forced break"
    );
    let mut start = 0;
    for &b in &breaks {
        assert!(b >= start, "breakpoints must be strictly increasing");
        let preceding = if b == 0 { None } else { items.get(b - 1) };
        assert!(
            items
                .get(b)
                .is_some_and(|item| item.is_valid_breakpoint(preceding)),
            "illegal breakpoint {b}"
        );

        let line = items.slice(start, b + 1);
        let result = set_line(&line, Distance::from_sp(measure));
        assert_eq!(result.items.len(), line.len(), "setting changed arity");
        if result.is_clean() {
            assert_eq!(
                result.visible_width(),
                Distance::from_sp(measure),
                "clean line must hit its target"
            );
        }
        start = b + 1;
    }
});
