//! Overlap, touch and sweep queries between translated polygons.
//!
//! Every query reduces to pairs of rectangles from the polygons' cached
//! partitions. Interiors are open, so contact along a boundary never counts
//! as overlap.

use super::line::{Direction, OrthogonalLine};
use super::lines::merge_lines;
use super::point::Point;
use super::polygon::{GridRectangle, Polygon};

/// Whether the interiors of `a + pos_a` and `b + pos_b` intersect.
pub fn overlap(a: &Polygon, pos_a: Point, b: &Polygon, pos_b: Point) -> bool {
    let (ra, rb) = (a.bounding_rectangle(), b.bounding_rectangle());
    if ra.shift(pos_a).overlap_area(&rb.shift(pos_b)) == 0 {
        return false;
    }
    rect_pairs(a, pos_a, b, pos_b).any(|(x, y)| x.overlap_area(&y) > 0)
}

/// Area of the common interior of `a + pos_a` and `b + pos_b`.
pub fn overlap_area(a: &Polygon, pos_a: Point, b: &Polygon, pos_b: Point) -> i64 {
    let (ra, rb) = (a.bounding_rectangle(), b.bounding_rectangle());
    if ra.shift(pos_a).overlap_area(&rb.shift(pos_b)) == 0 {
        return 0;
    }
    rect_pairs(a, pos_a, b, pos_b)
        .map(|(x, y)| x.overlap_area(&y))
        .sum()
}

/// Boundaries meet (along a segment or in a single point) while interiors
/// stay disjoint.
pub fn touch(a: &Polygon, pos_a: Point, b: &Polygon, pos_b: Point) -> bool {
    if overlap(a, pos_a, b, pos_b) {
        return false;
    }
    rect_pairs(a, pos_a, b, pos_b).any(|(x, y)| x.intersection(&y).is_some())
}

/// Like `touch`, but the shared boundary must contain a segment of at least
/// `min_length` units. `touch_with_min_length(.., 0)` equals `touch`.
pub fn touch_with_min_length(
    a: &Polygon,
    pos_a: Point,
    b: &Polygon,
    pos_b: Point,
    min_length: i32,
) -> bool {
    if overlap(a, pos_a, b, pos_b) {
        return false;
    }
    let contacts: Vec<OrthogonalLine> = rect_pairs(a, pos_a, b, pos_b)
        .filter_map(|(x, y)| x.intersection(&y))
        .map(|r| {
            let dir = if r.width() >= r.height() {
                Direction::Right
            } else {
                Direction::Top
            };
            OrthogonalLine::new(r.a, r.b, dir)
        })
        .collect();
    if contacts.is_empty() {
        return false;
    }
    merge_lines(&contacts)
        .iter()
        .any(|l| l.length() >= min_length)
}

/// Sweeps `moving` along `line` (its translation is each point of the line)
/// against `fixed` placed at the origin.
///
/// Returns the ordered transitions `(point, overlapping)`. The sweep starts in
/// the non-overlapping state and every event flips it, so the first event is
/// `(line.from, true)` exactly when the sweep starts inside an overlap. An
/// empty list means no overlap anywhere.
pub fn overlap_along_line(
    moving: &Polygon,
    fixed: &Polygon,
    line: &OrthogonalLine,
) -> Vec<(Point, bool)> {
    let len = line.length();
    let d = line.direction_vector();
    let horizontal = line.direction.is_horizontal();
    let sign = if horizontal { d.x } else { d.y };
    let (fixed_c, start_c) = if horizontal {
        (line.from.y, line.from.x)
    } else {
        (line.from.x, line.from.y)
    };

    let mut ranges: Vec<(i32, i32)> = Vec::new();
    for m in moving.rectangles() {
        for f in fixed.rectangles() {
            // Perpendicular axis is constant along the sweep.
            let (m_lo, m_hi, f_lo, f_hi) = if horizontal {
                (m.a.y, m.b.y, f.a.y, f.b.y)
            } else {
                (m.a.x, m.b.x, f.a.x, f.b.x)
            };
            if !(m_lo + fixed_c < f_hi && m_hi + fixed_c > f_lo) {
                continue;
            }
            // Open interval of the sweep coordinate c where the pair overlaps.
            let (m_lo, m_hi, f_lo, f_hi) = if horizontal {
                (m.a.x, m.b.x, f.a.x, f.b.x)
            } else {
                (m.a.y, m.b.y, f.a.y, f.b.y)
            };
            let (c_lo, c_hi) = (f_lo - m_hi, f_hi - m_lo);
            // c = start_c + t * sign
            let (t_lo, t_hi) = if sign > 0 {
                (c_lo - start_c + 1, c_hi - start_c - 1)
            } else {
                (start_c - c_hi + 1, start_c - c_lo - 1)
            };
            let (t_lo, t_hi) = (t_lo.max(0), t_hi.min(len));
            if t_lo <= t_hi {
                ranges.push((t_lo, t_hi));
            }
        }
    }
    if ranges.is_empty() {
        return Vec::new();
    }

    ranges.sort_unstable();
    let mut merged: Vec<(i32, i32)> = Vec::with_capacity(ranges.len());
    for (lo, hi) in ranges {
        match merged.last_mut() {
            Some(last) if lo <= last.1 + 1 => last.1 = last.1.max(hi),
            _ => merged.push((lo, hi)),
        }
    }

    let mut events = Vec::with_capacity(merged.len() * 2);
    for (lo, hi) in merged {
        events.push((line.nth_point(lo), true));
        if hi < len {
            events.push((line.nth_point(hi + 1), false));
        }
    }
    events
}

fn rect_pairs<'a>(
    a: &'a Polygon,
    pos_a: Point,
    b: &'a Polygon,
    pos_b: Point,
) -> impl Iterator<Item = (GridRectangle, GridRectangle)> + 'a {
    a.rectangles().iter().flat_map(move |x| {
        b.rectangles()
            .iter()
            .map(move |y| (x.shift(pos_a), y.shift(pos_b)))
    })
}
