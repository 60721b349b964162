//! UV-Naht: geschlossene Schleifen über die 0/1-Grenze temporär entrollen.
//!
//! Nur geschlossene Schleifen werden entrollt. Offene Schleifen bleiben
//! unverändert.

use crate::Point2;

/// Sprung, ab dem ein Schritt als Naht-Überquerung gilt.
const SEAM_JUMP: f64 = 0.5;

/// `true` wenn eine geschlossene Folge (inkl. letzter→erster) eine Naht kreuzt.
pub fn needs_unwrap(points: &[Point2], closed: bool) -> bool {
    let n = points.len();
    if !closed || n < 3 {
        return false;
    }
    (0..n).any(|i| {
        let d = points[(i + 1) % n] - points[i];
        d.x.abs() > SEAM_JUMP || d.y.abs() > SEAM_JUMP
    })
}

/// Entrollt die Folge in einen stetigen Koordinatenraum.
///
/// Pro Achse wird ein ganzzahliger Versatz mitgeführt, der sich bei jedem
/// Schritt > 0.5 um ±1 ändert.
pub fn unwrap_cycle01(points: &[Point2]) -> Vec<Point2> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(points.len());
    out.push(first);
    let mut offset = Point2::ZERO;
    for w in points.windows(2) {
        let d = w[1] - w[0];
        offset.x += axis_step(d.x);
        offset.y += axis_step(d.y);
        out.push(w[1] + offset);
    }
    out
}

fn axis_step(delta: f64) -> f64 {
    if delta > SEAM_JUMP {
        -1.0
    } else if delta < -SEAM_JUMP {
        1.0
    } else {
        0.0
    }
}

/// Bringt entrollte Koordinaten pro Achse zurück nach `[0, 1)`.
pub fn wrap01(points: &[Point2]) -> Vec<Point2> {
    points
        .iter()
        .map(|p| Point2::new(p.x - p.x.floor(), p.y - p.y.floor()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn open_loops_never_need_unwrap() {
        let pts = [Point2::new(0.9, 0.5), Point2::new(0.1, 0.5), Point2::new(0.2, 0.5)];
        assert!(!needs_unwrap(&pts, false));
        assert!(needs_unwrap(&pts, true));
    }

    #[test]
    fn crossing_loop_becomes_continuous() {
        let pts = [
            Point2::new(0.9, 0.4),
            Point2::new(0.1, 0.4),
            Point2::new(0.1, 0.6),
            Point2::new(0.9, 0.6),
        ];
        let unwrapped = unwrap_cycle01(&pts);
        assert_relative_eq!(unwrapped[1].x, 1.1);
        assert_relative_eq!(unwrapped[2].x, 1.1);
        assert_relative_eq!(unwrapped[3].x, 0.9);

        let back = wrap01(&unwrapped);
        for (a, b) in back.iter().zip(&pts) {
            assert_relative_eq!(a.x, b.x, epsilon = 1e-12);
            assert_relative_eq!(a.y, b.y, epsilon = 1e-12);
        }
    }

    #[test]
    fn unwrap_then_wrap_is_identity_without_crossing() {
        let pts = [
            Point2::new(0.2, 0.2),
            Point2::new(0.4, 0.25),
            Point2::new(0.3, 0.45),
        ];
        assert!(!needs_unwrap(&pts, true));
        assert_eq!(wrap01(&unwrap_cycle01(&pts)), pts.to_vec());
    }
}
