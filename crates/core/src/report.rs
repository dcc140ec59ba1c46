//! Summary of a font map run.

use std::collections::HashSet;

use crate::{config::PREVIEW_LIMIT, pipeline::font_map::FontMap};

/// Aggregate counts over a font map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    /// Distinct non-blank recognized texts.
    pub distinct_texts: usize,
}

pub fn summarize(map: &FontMap) -> Summary {
    let distinct: HashSet<&str> = map
        .values()
        .map(|record| record.text.as_str())
        .filter(|text| !text.trim().is_empty())
        .collect();
    Summary { total: map.len(), distinct_texts: distinct.len() }
}

/// Printable form of a code point; supplementary planes show as `?`.
fn display_char(code_point: u32) -> char {
    if code_point < 0x10000 { char::from_u32(code_point).unwrap_or('?') } else { '?' }
}

/// One line per record, for the first `limit` records.
pub fn preview_lines(map: &FontMap, limit: usize) -> Vec<String> {
    map.iter()
        .take(limit)
        .enumerate()
        .map(|(i, (glyph_name, record))| {
            format!(
                "{:2}. {glyph_name:15} {} ({}) -> '{}'",
                i + 1,
                record.unicode,
                display_char(record.code_point),
                record.text
            )
        })
        .collect()
}

pub fn print_summary(map: &FontMap) {
    let summary = summarize(map);

    println!("\nStatistics");
    println!("  Total glyphs:    {}", summary.total);
    println!("  Distinct texts:  {}", summary.distinct_texts);

    println!("\nFirst {PREVIEW_LIMIT} results:");
    for line in preview_lines(map, PREVIEW_LIMIT) {
        println!("  {line}");
    }
}
