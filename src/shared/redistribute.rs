//! Neuverteilung entlang der Bogenlänge.
//!
//! Form-erhaltend: neue Punkte liegen immer auf der bisherigen Polyline.

use crate::shared::options::DEDUP_EPSILON;
use crate::shared::polyline::{dedup_with_map, ArcLengthTable};
use crate::Point2;

/// Mindestanzahl verschiedener Punkte für eine Neuverteilung.
pub fn min_points(closed: bool) -> usize {
    if closed {
        3
    } else {
        2
    }
}

/// Ergebnis einer Neuverteilung.
#[derive(Debug, Clone, PartialEq)]
pub struct Redistributed {
    /// Neue Punkte, einer pro deduplizierter Position
    pub points: Vec<Point2>,
    /// Eingabe-Index → Index in `points`
    pub index_map: Vec<usize>,
    /// Gesamtlänge war null: `points` ist die unveränderte Eingabe
    pub degenerate: bool,
}

impl Redistributed {
    /// Ein Ausgabepunkt pro Eingabe-Index.
    pub fn scatter(&self) -> Vec<Point2> {
        self.index_map.iter().map(|&i| self.points[i]).collect()
    }
}

/// Verteilt die Punkte gleichmäßig über die Bogenlänge.
///
/// Offen: `n` Punkte bei `k · L/(n-1)`; mit `preserve_ends` bleiben erster
/// und letzter Punkt exakt erhalten. Geschlossen: `n` Punkte bei `k · L/n`,
/// beginnend am ersten Punkt.
///
/// Gibt `None` zurück, wenn nach Deduplizierung zu wenige Punkte bleiben.
pub fn redistribute_evenly(
    points: &[Point2],
    closed: bool,
    preserve_ends: bool,
) -> Option<Redistributed> {
    let deduped = dedup_with_map(points, closed, DEDUP_EPSILON);
    let n = deduped.points.len();
    if n < min_points(closed) {
        return None;
    }

    let table = ArcLengthTable::new(&deduped.points, closed);
    if table.is_degenerate() {
        return Some(Redistributed {
            points: deduped.points.clone(),
            index_map: deduped.index_map,
            degenerate: true,
        });
    }

    let total = table.total();
    let new_points: Vec<Point2> = if closed {
        let step = total / n as f64;
        (0..n).map(|i| table.sample_at(i as f64 * step)).collect()
    } else {
        let step = total / (n - 1) as f64;
        (0..n)
            .map(|i| match i {
                0 if preserve_ends => deduped.points[0],
                i if i == n - 1 && preserve_ends => deduped.points[n - 1],
                i => table.sample_at(i as f64 * step),
            })
            .collect()
    };

    Some(Redistributed {
        points: new_points,
        index_map: deduped.index_map,
        degenerate: false,
    })
}

/// Tastet eine Polyline bei den gegebenen Längenanteilen ab.
///
/// Geschlossen: Anteile modulo 1. Offen: auf `[0, 1]` geklemmt.
pub fn resample_at_fractions(points: &[Point2], fractions: &[f64], closed: bool) -> Vec<Point2> {
    if points.len() < min_points(closed) {
        return points.to_vec();
    }
    let table = ArcLengthTable::new(points, closed);
    if table.is_degenerate() {
        return points.to_vec();
    }
    fractions
        .iter()
        .map(|&f| table.point_at_fraction(f))
        .collect()
}

/// Punkte auf der Strecke `a → b` bei den gegebenen Anteilen.
pub fn straight_at_fractions(a: Point2, b: Point2, fractions: &[f64]) -> Vec<Point2> {
    fractions
        .iter()
        .map(|&f| a.lerp(b, f.clamp(0.0, 1.0)))
        .collect()
}

/// `count` gleichabständige Punkte von `a` nach `b` (beide inklusive).
pub fn straight_evenly(a: Point2, b: Point2, count: usize) -> Vec<Point2> {
    match count {
        0 => Vec::new(),
        1 => vec![a],
        _ => {
            let last = (count - 1) as f64;
            (0..count).map(|i| a.lerp(b, i as f64 / last)).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::polyline::{segment_lengths, spacing_cv};
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn open_line_gets_equal_steps_with_fixed_ends() {
        let pts = [p(0.0, 0.0), p(0.1, 0.0), p(0.2, 0.0), p(0.9, 0.0), p(1.0, 0.0)];
        let r = redistribute_evenly(&pts, false, true).expect("Ergebnis erwartet");
        let xs: Vec<f64> = r.points.iter().map(|q| q.x).collect();
        for (x, expected) in xs.iter().zip([0.0, 0.25, 0.5, 0.75, 1.0]) {
            assert_relative_eq!(*x, expected, epsilon = 1e-12);
        }
        assert_eq!(r.points[0], pts[0]);
        assert_eq!(r.points[4], pts[4]);
    }

    #[test]
    fn closed_loop_samples_at_equal_arc_steps() {
        // Ungleich verteilte Punkte auf einem Dreieck
        let pts = [p(0.0, 0.0), p(1.0, 0.0), p(1.0, 0.5), p(1.0, 1.0)];
        let r = redistribute_evenly(&pts, true, true).expect("Ergebnis erwartet");
        assert_eq!(r.points.len(), 4);
        let table = ArcLengthTable::new(&pts, true);
        let step = table.total() / 4.0;
        for (i, q) in r.points.iter().enumerate() {
            let expected = table.sample_at(i as f64 * step);
            assert_relative_eq!(q.x, expected.x, epsilon = 1e-12);
            assert_relative_eq!(q.y, expected.y, epsilon = 1e-12);
        }
        assert!(spacing_cv(&r.points, true) < spacing_cv(&pts, true));
    }

    #[test]
    fn unit_square_outline_gets_equal_perimeter_steps() {
        let corners = [p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)];
        let r = redistribute_evenly(&corners, true, true).expect("Ergebnis erwartet");
        for l in segment_lengths(&r.points, true) {
            assert_relative_eq!(l, 1.0, epsilon = 1e-12);
        }

        // Ungleich verteilte Punkte auf demselben Umriss
        let uneven = [
            p(0.0, 0.0),
            p(0.3, 0.0),
            p(1.0, 0.0),
            p(1.0, 0.8),
            p(1.0, 1.0),
            p(0.5, 1.0),
            p(0.0, 1.0),
            p(0.0, 0.2),
        ];
        let r = redistribute_evenly(&uneven, true, true).expect("Ergebnis erwartet");
        let expected = [
            p(0.0, 0.0),
            p(0.5, 0.0),
            p(1.0, 0.0),
            p(1.0, 0.5),
            p(1.0, 1.0),
            p(0.5, 1.0),
            p(0.0, 1.0),
            p(0.0, 0.5),
        ];
        for (q, e) in r.points.iter().zip(&expected) {
            assert_relative_eq!(q.x, e.x, epsilon = 1e-12);
            assert_relative_eq!(q.y, e.y, epsilon = 1e-12);
        }
        for l in segment_lengths(&r.points, true) {
            assert_relative_eq!(l, 4.0 / 8.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn second_pass_on_uniform_ring_moves_nothing() {
        let ring: Vec<Point2> = (0..8)
            .map(|i| {
                let a = std::f64::consts::TAU * i as f64 / 8.0;
                p(0.5 + 0.2 * a.cos(), 0.5 + 0.2 * a.sin())
            })
            .collect();
        let first = redistribute_evenly(&ring, true, true).expect("Ergebnis erwartet").scatter();
        let second = redistribute_evenly(&first, true, true).expect("Ergebnis erwartet").scatter();
        for ((a, b), c) in ring.iter().zip(&first).zip(&second) {
            assert!(a.distance(*b) < DEDUP_EPSILON);
            assert!(b.distance(*c) < DEDUP_EPSILON);
        }
    }

    #[test]
    fn duplicates_share_output_position() {
        let pts = [p(0.0, 0.0), p(0.0, 0.0), p(0.3, 0.0), p(1.0, 0.0)];
        let r = redistribute_evenly(&pts, false, true).expect("Ergebnis erwartet");
        let scattered = r.scatter();
        assert_eq!(scattered.len(), 4);
        assert_eq!(scattered[0], scattered[1]);
        assert_relative_eq!(scattered[2].x, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn too_few_points_after_dedup_is_rejected() {
        let pts = [p(0.0, 0.0), p(0.0, 0.0), p(1.0, 0.0)];
        assert!(redistribute_evenly(&pts, true, true).is_none());
        assert!(redistribute_evenly(&pts, false, true).is_some());
    }

    #[test]
    fn resample_at_fractions_open_and_closed() {
        let line = [p(0.0, 0.0), p(2.0, 0.0)];
        let out = resample_at_fractions(&line, &[0.0, 0.25, 1.0], false);
        assert_relative_eq!(out[1].x, 0.5, epsilon = 1e-12);
        assert_eq!(out[2], p(2.0, 0.0));

        let tri = [p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0)];
        let wrapped = resample_at_fractions(&tri, &[1.0], true);
        assert_relative_eq!(wrapped[0].x, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn straight_evenly_includes_both_ends() {
        let pts = straight_evenly(p(0.0, 0.0), p(1.0, 1.0), 3);
        assert_eq!(pts, vec![p(0.0, 0.0), p(0.5, 0.5), p(1.0, 1.0)]);
    }
}
