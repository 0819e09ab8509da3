//! Utilities on sets of orthogonal lines, treated as sets of lattice points.

use super::line::{Direction, OrthogonalLine};
use super::point::Point;

/// Merges collinear lines whose point ranges overlap or are adjacent.
///
/// Output lines are normalized (`Right`/`Top`), horizontal ones first, sorted
/// by fixed coordinate and then by start.
pub fn merge_lines(lines: &[OrthogonalLine]) -> Vec<OrthogonalLine> {
    let mut spans: Vec<(bool, i32, i32, i32)> = lines
        .iter()
        .map(|l| {
            let (c, lo, hi) = l.span();
            (!l.direction.is_horizontal(), c, lo, hi)
        })
        .collect();
    spans.sort_unstable();

    let mut merged: Vec<(bool, i32, i32, i32)> = Vec::with_capacity(spans.len());
    for s in spans {
        match merged.last_mut() {
            Some(last) if last.0 == s.0 && last.1 == s.1 && s.2 <= last.3 + 1 => {
                last.3 = last.3.max(s.3);
            }
            _ => merged.push(s),
        }
    }
    merged.into_iter().map(span_to_line).collect()
}

/// Rewrites a set of lines so every lattice point is covered exactly once:
/// collinear lines are merged, and points where a vertical line crosses a
/// horizontal one are cut out of the vertical line.
pub fn remove_intersections(lines: &[OrthogonalLine]) -> Vec<OrthogonalLine> {
    let merged = merge_lines(lines);
    let (horizontal, vertical): (Vec<_>, Vec<_>) = merged
        .into_iter()
        .partition(|l| l.direction.is_horizontal());

    let mut result = horizontal.clone();
    for v in vertical {
        let (x, lo, hi) = v.span();
        let mut cuts: Vec<i32> = horizontal
            .iter()
            .filter_map(|h| {
                let (y, hlo, hhi) = h.span();
                (hlo <= x && x <= hhi && lo <= y && y <= hi).then_some(y)
            })
            .collect();
        cuts.sort_unstable();
        cuts.dedup();

        let mut start = lo;
        for cut in cuts {
            if cut > start {
                result.push(span_to_line((true, x, start, cut - 1)));
            }
            start = cut + 1;
        }
        if start <= hi {
            result.push(span_to_line((true, x, start, hi)));
        }
    }
    result
}

/// Points common to both sets, each covered once.
pub fn intersect_sets(a: &[OrthogonalLine], b: &[OrthogonalLine]) -> Vec<OrthogonalLine> {
    let common: Vec<OrthogonalLine> = a
        .iter()
        .flat_map(|x| b.iter().filter_map(move |y| x.intersection(y)))
        .collect();
    if common.is_empty() {
        return common;
    }
    remove_intersections(&common)
}

/// Total number of lattice points; assumes the set has no duplicates.
pub fn point_count(lines: &[OrthogonalLine]) -> i64 {
    lines.iter().map(|l| i64::from(l.length()) + 1).sum()
}

/// Whether some line of the set contains `p`.
pub fn set_contains(lines: &[OrthogonalLine], p: Point) -> bool {
    lines.iter().any(|l| l.contains(p).is_some())
}

fn span_to_line((vertical, c, lo, hi): (bool, i32, i32, i32)) -> OrthogonalLine {
    if vertical {
        OrthogonalLine::new(Point::new(c, lo), Point::new(c, hi), Direction::Top)
    } else {
        OrthogonalLine::new(Point::new(lo, c), Point::new(hi, c), Direction::Right)
    }
}
