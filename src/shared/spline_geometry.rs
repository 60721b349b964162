//! Reine Geometrie-Funktionen für Catmull-Rom-Splines.
//!
//! Layer-neutral: wird von der Spline-Sitzung und den Benchmarks genutzt.

use crate::shared::polyline::ArcLengthTable;
use crate::Point2;

/// Abstand, unter dem ein wiederholter Startpunkt am Ende entfernt wird.
const CLOSING_DUPLICATE_EPSILON: f64 = 1e-7;

/// Berechnet einen Punkt auf einem Catmull-Rom-Segment (t ∈ [0, 1]).
///
/// p0, p1, p2, p3: vier aufeinanderfolgende Kontrollpunkte.
/// Die Kurve verläuft von p1 nach p2.
pub fn catmull_rom_point(p0: Point2, p1: Point2, p2: Point2, p3: Point2, t: f64) -> Point2 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}

/// Entfernt einen letzten Punkt, der den ersten wiederholt.
pub fn strip_closing_duplicate(points: &[Point2]) -> &[Point2] {
    match points {
        [first, .., last] if points.len() >= 3 && first.distance(*last) <= CLOSING_DUPLICATE_EPSILON => {
            &points[..points.len() - 1]
        }
        _ => points,
    }
}

/// Dicht abgetastete Kurve mit Bogenlängen-Parametern.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseCurve {
    pub samples: Vec<Point2>,
    /// Kumulierter Längenanteil pro Sample (0 für das erste)
    pub params: Vec<f64>,
    pub closed: bool,
}

impl DenseCurve {
    /// Punkt beim Längenanteil `fraction` (geschlossen: modulo 1).
    pub fn point_at_fraction(&self, fraction: f64) -> Point2 {
        ArcLengthTable::new(&self.samples, self.closed).point_at_fraction(fraction)
    }

    /// Abstand eines Punkts zur Kurve.
    pub fn distance_to(&self, p: Point2) -> f64 {
        crate::shared::polyline::closest_point_on_polyline(&self.samples, p, self.closed)
            .map_or_else(
                || self.samples.first().map_or(f64::INFINITY, |s| s.distance(p)),
                |hit| hit.distance,
            )
    }
}

/// Tastet eine Catmull-Rom-Kurve durch `points` dicht ab.
///
/// Pro Segment `max(2, resolution / Segmente)` Schritte. Offen: Randindizes
/// werden geklemmt und der Endpunkt exakt angehängt. Geschlossen: Indizes
/// laufen zyklisch, das Schluss-Segment gehört dazu.
pub fn sample_polyline(points: &[Point2], resolution: usize, closed: bool) -> DenseCurve {
    if points.len() < 2 {
        return DenseCurve {
            samples: points.to_vec(),
            params: vec![0.0; points.len().max(1)],
            closed,
        };
    }
    let control = if closed {
        strip_closing_duplicate(points)
    } else {
        points
    };
    let n = control.len();
    let seg_count = if closed { n } else { n - 1 };
    let steps = (resolution / seg_count.max(1)).max(2);

    let mut samples = Vec::with_capacity(seg_count * steps + 1);
    for i in 0..seg_count {
        let (im1, i1, i2) = if closed {
            ((i + n - 1) % n, (i + 1) % n, (i + 2) % n)
        } else {
            (i.saturating_sub(1), i + 1, (i + 2).min(n - 1))
        };
        let (p0, p1, p2, p3) = (control[im1], control[i], control[i1], control[i2]);
        for s in 0..steps {
            let t = s as f64 / steps as f64;
            samples.push(catmull_rom_point(p0, p1, p2, p3, t));
        }
    }
    if !closed {
        samples.push(control[n - 1]);
    }

    let table = ArcLengthTable::new(&samples, closed);
    let total = table.total();
    let params = if table.is_degenerate() {
        vec![0.0; samples.len()]
    } else {
        table
            .cumulative()
            .into_iter()
            .take(samples.len())
            .map(|c| c / total)
            .collect()
    };
    let params = pad_params(params, samples.len());

    DenseCurve {
        samples,
        params,
        closed,
    }
}

/// Offene Kurven haben ein Segment weniger als Samples: letzten Parameter ergänzen.
fn pad_params(mut params: Vec<f64>, len: usize) -> Vec<f64> {
    while params.len() < len {
        params.push(1.0);
    }
    params
}

/// Erzeugt genau `count` Punkte in gleichen Bogenlängen-Anteilen.
///
/// Offen: Anteile `j / (count-1)`, erster und letzter Punkt exakt.
/// Geschlossen: Anteile `j / count`, beginnend beim ersten Punkt.
pub fn resample_by_length(points: &[Point2], count: usize, closed: bool) -> Vec<Point2> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    let source = if closed {
        strip_closing_duplicate(points)
    } else {
        points
    };
    let table = ArcLengthTable::new(source, closed);
    if table.is_degenerate() {
        return vec![first; count];
    }
    let denominator = if closed {
        count as f64
    } else {
        count.saturating_sub(1).max(1) as f64
    };
    (0..count)
        .map(|j| table.point_at_fraction(j as f64 / denominator))
        .collect()
}
