//! Geometry kernel tests: polygon invariants, overlap fixtures, sweeps and
//! line-set utilities.

use super::*;
use proptest::prelude::*;

fn p(x: i32, y: i32) -> Point {
    Point::new(x, y)
}

fn l_shape() -> Polygon {
    Polygon::new(vec![p(0, 0), p(0, 6), p(3, 6), p(3, 3), p(6, 3), p(6, 0)]).unwrap()
}

#[test]
fn polygon_rejects_malformed_input() {
    assert!(Polygon::new(vec![p(0, 0), p(0, 1), p(1, 1)]).is_err());
    // counter-clockwise
    assert!(Polygon::new(vec![p(0, 0), p(2, 0), p(2, 2), p(0, 2)]).is_err());
    // diagonal edge
    assert!(Polygon::new(vec![p(0, 0), p(0, 2), p(2, 3), p(2, 0)]).is_err());
    // two collinear edges in a row
    assert!(Polygon::new(vec![p(0, 0), p(0, 1), p(0, 2), p(2, 2), p(2, 0)]).is_err());
    // repeated point
    assert!(Polygon::new(vec![p(0, 0), p(0, 0), p(0, 2), p(2, 2), p(2, 0)]).is_err());
    assert!(Polygon::rectangle(0, 3).is_err());
    assert!(Polygon::square(-1).is_err());
}

#[test]
fn polygon_area_and_bounds() {
    let l = l_shape();
    assert_eq!(l.area(), 27);
    assert_eq!(l.rectangles().len(), 2);
    let b = l.bounding_rectangle();
    assert_eq!((b.a, b.b), (p(0, 0), p(6, 6)));
    assert_eq!(Polygon::rectangle(3, 5).unwrap().area(), 15);
}

#[test]
fn polygon_rotate_and_scale() {
    let r = Polygon::rectangle(3, 5).unwrap();
    let rot = r.rotate(90).unwrap();
    assert_eq!(rot.points(), &[p(0, 0), p(5, 0), p(5, -3), p(0, -3)]);
    assert!(r.rotate(45).is_err());
    assert_eq!(r.rotate(360).unwrap(), r);
    let s = r.scale(p(2, 3)).unwrap();
    assert_eq!(s.bounding_rectangle().b, p(6, 15));
    assert!(r.scale(p(0, 1)).is_err());
}

#[test]
fn all_transformations_stay_valid_and_keep_first_point() {
    let l = l_shape();
    for t in Transformation::ALL {
        let out = l.transform(t).unwrap();
        assert_eq!(out.points()[0], l.points()[0].transform(t));
        assert_eq!(out.area(), l.area());
    }
}

#[test]
fn normalized_touches_both_axes() {
    let l = l_shape().transform(Transformation::Rotate180).unwrap();
    let n = l.normalized();
    assert_eq!(n.bounding_rectangle().a, p(0, 0));
    // The notch sits in the lower-left corner after a half turn.
    assert_eq!(n.points()[0], p(0, 3));
    assert_eq!(n.area(), 27);
}

#[test]
fn equality_is_sequence_equality() {
    let a = Polygon::rectangle(2, 4).unwrap();
    let b = Polygon::new(vec![p(0, 0), p(0, 4), p(2, 4), p(2, 0)]).unwrap();
    let c = Polygon::new(vec![p(0, 4), p(2, 4), p(2, 0), p(0, 0)]).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.hash_value(), b.hash_value());
    assert_ne!(a, c);
}

#[test]
fn overlap_area_fixtures() {
    let sq6 = Polygon::square(6).unwrap();
    let r28 = Polygon::rectangle(2, 8).unwrap();
    let sq3 = Polygon::square(3).unwrap();
    assert_eq!(overlap_area(&sq6, p(0, 0), &r28, p(7, 2)), 0);
    assert_eq!(overlap_area(&sq6, p(0, 0), &sq3, p(2, -1)), 6);
    let r46 = Polygon::rectangle(4, 6).unwrap();
    let r53 = Polygon::rectangle(5, 3).unwrap();
    assert_eq!(overlap_area(&r46, p(0, 0), &r53, p(1, 2)), 9);
    assert_eq!(overlap_area(&r53, p(1, 2), &r46, p(0, 0)), 9);
}

#[test]
fn overlap_with_l_shape_notch() {
    let l = l_shape();
    let sq = Polygon::square(3).unwrap();
    // Fits exactly into the notch.
    assert!(!overlap(&l, p(0, 0), &sq, p(3, 3)));
    assert!(touch(&l, p(0, 0), &sq, p(3, 3)));
    assert_eq!(overlap_area(&l, p(0, 0), &sq, p(2, 3)), 3);
}

#[test]
fn touch_fixtures() {
    let sq6 = Polygon::square(6).unwrap();
    let sq3 = Polygon::square(3).unwrap();
    assert!(touch(&sq6, p(0, 0), &sq3, p(6, 0)));
    assert!(!overlap(&sq6, p(0, 0), &sq3, p(6, 0)));

    // vertex contact
    assert!(touch(&sq6, p(0, 0), &sq3, p(6, -3)));
    assert!(!touch_with_min_length(&sq6, p(0, 0), &sq3, p(6, -3), 1));
    assert!(!overlap(&sq6, p(0, 0), &sq3, p(6, -3)));

    assert!(touch_with_min_length(&sq6, p(0, 0), &sq3, p(6, -2), 1));
    assert!(!touch(&sq6, p(0, 0), &sq3, p(7, 0)));
    assert!(!touch(&sq6, p(0, 0), &sq3, p(2, 2)));
}

#[test]
fn sweep_reports_overlap_window() {
    let sq = Polygon::square(2).unwrap();
    let right = OrthogonalLine::between(p(-5, 0), p(5, 0)).unwrap();
    assert_eq!(
        overlap_along_line(&sq, &sq, &right),
        vec![(p(-1, 0), true), (p(2, 0), false)]
    );
    let left = right.reversed();
    assert_eq!(
        overlap_along_line(&sq, &sq, &left),
        vec![(p(1, 0), true), (p(-2, 0), false)]
    );
    let starts_inside = OrthogonalLine::between(p(0, 0), p(0, 6)).unwrap();
    assert_eq!(
        overlap_along_line(&sq, &sq, &starts_inside),
        vec![(p(0, 0), true), (p(0, 2), false)]
    );
    let clear = OrthogonalLine::between(p(-5, 2), p(5, 2)).unwrap();
    assert!(overlap_along_line(&sq, &sq, &clear).is_empty());
}

#[test]
fn sweep_over_l_shape_has_two_windows() {
    let l = l_shape();
    let bar = Polygon::rectangle(1, 1).unwrap();
    // y = 4 crosses only the left arm, y = 1 crosses the whole base.
    let upper = OrthogonalLine::between(p(-3, 4), p(8, 4)).unwrap();
    assert_eq!(
        overlap_along_line(&bar, &l, &upper),
        vec![(p(0, 4), true), (p(3, 4), false)]
    );
    let lower = OrthogonalLine::between(p(-3, 1), p(8, 1)).unwrap();
    assert_eq!(
        overlap_along_line(&bar, &l, &lower),
        vec![(p(0, 1), true), (p(6, 1), false)]
    );
}

#[test]
fn remove_intersections_cuts_crossings() {
    let h = OrthogonalLine::between(p(-2, 0), p(2, 0)).unwrap();
    let v = OrthogonalLine::between(p(0, 2), p(0, -2)).unwrap();
    let dup = OrthogonalLine::between(p(1, 0), p(2, 0)).unwrap();
    let out = remove_intersections(&[h, v, dup]);
    assert_eq!(point_count(&out), 9);
    for q in [p(-2, 0), p(0, 0), p(0, 2), p(0, -2), p(2, 0)] {
        assert_eq!(out.iter().filter(|l| l.contains(q).is_some()).count(), 1);
    }
}

#[test]
fn merge_joins_adjacent_runs() {
    let a = OrthogonalLine::between(p(0, 3), p(4, 3)).unwrap();
    let b = OrthogonalLine::between(p(7, 3), p(5, 3)).unwrap();
    let c = OrthogonalLine::between(p(9, 3), p(12, 3)).unwrap();
    let out = merge_lines(&[c, a, b]);
    assert_eq!(out.len(), 2);
    assert_eq!((out[0].from, out[0].to), (p(0, 3), p(7, 3)));
}

#[test]
fn intersect_sets_returns_common_points() {
    let a = vec![
        OrthogonalLine::between(p(0, 0), p(10, 0)).unwrap(),
        OrthogonalLine::between(p(5, -5), p(5, 5)).unwrap(),
    ];
    let b = vec![OrthogonalLine::between(p(3, 0), p(3, 9)).unwrap()];
    let out = intersect_sets(&a, &b);
    assert_eq!(out.len(), 1);
    assert_eq!((out[0].from, out[0].to), (p(3, 0), p(3, 0)));
    assert!(intersect_sets(&a, &[]).is_empty());
}

proptest! {
    #[test]
    fn overlap_area_is_symmetric(
        w1 in 1i32..8, h1 in 1i32..8, w2 in 1i32..8, h2 in 1i32..8,
        x in -10i32..10, y in -10i32..10, t in 0usize..8,
    ) {
        let a = l_shape().scale(p(w1, h1)).unwrap();
        let b = Polygon::rectangle(w2, h2).unwrap().transform(Transformation::ALL[t]).unwrap();
        let ab = overlap_area(&a, p(0, 0), &b, p(x, y));
        let ba = overlap_area(&b, p(x, y), &a, p(0, 0));
        prop_assert_eq!(ab, ba);
        prop_assert_eq!(ab > 0, overlap(&a, p(0, 0), &b, p(x, y)));
        prop_assert!(!(touch(&a, p(0, 0), &b, p(x, y)) && ab > 0));
    }

    #[test]
    fn every_polygon_overlaps_itself(w in 1i32..20, h in 1i32..20, x in -5i32..5, y in -5i32..5) {
        let r = Polygon::rectangle(w, h).unwrap();
        prop_assert!(overlap(&r, p(x, y), &r, p(x, y)));
        prop_assert_eq!(overlap_area(&r, p(x, y), &r, p(x, y)), i64::from(w) * i64::from(h));
    }

    #[test]
    fn sweep_matches_pointwise_overlap(
        w in 1i32..5, h in 1i32..5, y in -6i32..8, left in any::<bool>(),
    ) {
        let moving = Polygon::rectangle(w, h).unwrap();
        let fixed = l_shape();
        let mut line = OrthogonalLine::between(p(-8, y), p(10, y)).unwrap();
        if left {
            line = line.reversed();
        }
        let events = overlap_along_line(&moving, &fixed, &line);
        let mut state = false;
        let mut next = 0;
        for (i, q) in line.points().enumerate() {
            if next < events.len() && events[next].0 == q {
                state = events[next].1;
                next += 1;
            }
            prop_assert_eq!(state, overlap(&moving, q, &fixed, p(0, 0)), "index {}", i);
        }
    }
}
