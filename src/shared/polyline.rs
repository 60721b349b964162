//! Polyline-Grundfunktionen: Deduplizierung, Segmentlängen, Abstände.
//!
//! Alle Funktionen arbeiten auf geordneten `Point2`-Listen; `closed`
//! bedeutet, dass das Segment letzter→erster Punkt dazugehört.

use crate::shared::options::ARC_LENGTH_FLOOR;
use crate::Point2;

/// Ergebnis von [`dedup_with_map`].
#[derive(Debug, Clone, PartialEq)]
pub struct Deduped {
    /// Punkte ohne aufeinanderfolgende Duplikate
    pub points: Vec<Point2>,
    /// Für jeden Eingabe-Index der Index in `points`
    pub index_map: Vec<usize>,
}

/// Entfernt aufeinanderfolgende Punkte mit Abstand ≤ `epsilon`.
///
/// Bei geschlossenen Folgen wird ein letzter Punkt, der mit dem ersten
/// zusammenfällt, ebenfalls entfernt; seine Eingabe-Indizes zeigen dann
/// auf Index 0.
pub fn dedup_with_map(points: &[Point2], closed: bool, epsilon: f64) -> Deduped {
    let mut out: Vec<Point2> = Vec::with_capacity(points.len());
    let mut index_map = Vec::with_capacity(points.len());

    for &p in points {
        match out.last() {
            Some(&last) if last.distance(p) <= epsilon => {}
            _ => out.push(p),
        }
        index_map.push(out.len() - 1);
    }

    if closed && out.len() >= 2 && out[0].distance(out[out.len() - 1]) <= epsilon {
        let removed = out.len() - 1;
        out.pop();
        for idx in &mut index_map {
            if *idx == removed {
                *idx = 0;
            }
        }
    }

    Deduped {
        points: out,
        index_map,
    }
}

/// Segmentlängen in Reihenfolge (bei `closed` inkl. Schluss-Segment).
pub fn segment_lengths(points: &[Point2], closed: bool) -> Vec<f64> {
    let mut lengths: Vec<f64> = points.windows(2).map(|w| w[0].distance(w[1])).collect();
    if closed && points.len() >= 2 {
        lengths.push(points[points.len() - 1].distance(points[0]));
    }
    lengths
}

/// Gesamtlänge einer Polyline.
pub fn polyline_length(points: &[Point2], closed: bool) -> f64 {
    segment_lengths(points, closed).iter().sum()
}

/// Variationskoeffizient (Standardabweichung / Mittelwert) der Segmentlängen.
///
/// Weniger als zwei Segmente → 0. Mittelwert unter der Längen-Untergrenze → 0.
pub fn spacing_cv(points: &[Point2], closed: bool) -> f64 {
    let lengths = segment_lengths(points, closed);
    if lengths.len() < 2 {
        return 0.0;
    }
    let n = lengths.len() as f64;
    let mean = lengths.iter().sum::<f64>() / n;
    if mean <= ARC_LENGTH_FLOOR {
        return 0.0;
    }
    let variance = lengths.iter().map(|l| (l - mean) * (l - mean)).sum::<f64>() / n;
    variance.sqrt() / mean
}

/// Größte Verschiebung über die beweglichen Indizes.
pub fn max_displacement(before: &[Point2], after: &[Point2], movable: &[bool]) -> f64 {
    before
        .iter()
        .zip(after)
        .zip(movable)
        .filter(|&(_, &m)| m)
        .map(|((a, b), _)| a.distance(*b))
        .fold(0.0, f64::max)
}

/// Nächster Punkt auf einer Polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPoint {
    /// Index des Segment-Startpunkts
    pub segment: usize,
    /// Parameter innerhalb des Segments (0..=1)
    pub t: f64,
    /// Projizierter Punkt
    pub point: Point2,
    /// Abstand zum Anfragepunkt
    pub distance: f64,
}

/// Sucht den nächsten Punkt auf `points` (bei `closed` inkl. Schluss-Segment).
///
/// Gibt `None` zurück für weniger als 2 Punkte.
pub fn closest_point_on_polyline(points: &[Point2], p: Point2, closed: bool) -> Option<ClosestPoint> {
    let n = points.len();
    if n < 2 {
        return None;
    }
    let segments = if closed { n } else { n - 1 };
    let mut best: Option<ClosestPoint> = None;

    for i in 0..segments {
        let a = points[i];
        let b = points[(i + 1) % n];
        let ab = b - a;
        let len_sq = ab.length_squared();
        let t = if len_sq > ARC_LENGTH_FLOOR {
            ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let q = a + ab * t;
        let distance = q.distance(p);
        if best.map_or(true, |b| distance < b.distance) {
            best = Some(ClosestPoint {
                segment: i,
                t,
                point: q,
                distance,
            });
        }
    }
    best
}

/// Bogenlängen-Tabelle einer Polyline für Abfragen per Distanz oder Anteil.
#[derive(Debug, Clone)]
pub struct ArcLengthTable<'a> {
    points: &'a [Point2],
    lengths: Vec<f64>,
    closed: bool,
    total: f64,
}

impl<'a> ArcLengthTable<'a> {
    pub fn new(points: &'a [Point2], closed: bool) -> Self {
        let lengths = segment_lengths(points, closed);
        let total = lengths.iter().sum();
        Self {
            points,
            lengths,
            closed,
            total,
        }
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn is_degenerate(&self) -> bool {
        self.total <= ARC_LENGTH_FLOOR
    }

    /// Kumulierte Bogenlänge bis zum Start jedes Segments.
    pub fn cumulative(&self) -> Vec<f64> {
        let mut acc = 0.0;
        self.lengths
            .iter()
            .map(|l| {
                let start = acc;
                acc += l;
                start
            })
            .collect()
    }

    /// Punkt bei Bogenlänge `distance` ab dem ersten Punkt.
    ///
    /// Offen: auf `[0, total)` geklemmt. Geschlossen: modulo `total`.
    pub fn sample_at(&self, distance: f64) -> Point2 {
        let n = self.points.len();
        if n == 0 {
            return Point2::ZERO;
        }
        if self.is_degenerate() || n == 1 {
            return self.points[0];
        }
        let target = if self.closed {
            distance.rem_euclid(self.total)
        } else {
            distance.clamp(0.0, (self.total - 1e-12).max(0.0))
        };

        let mut acc = 0.0;
        for (i, &len) in self.lengths.iter().enumerate() {
            if acc + len >= target - 1e-15 {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                let t = if len > ARC_LENGTH_FLOOR {
                    ((target - acc) / len).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                return a.lerp(b, t);
            }
            acc += len;
        }
        if self.closed {
            self.points[0]
        } else {
            self.points[n - 1]
        }
    }

    /// Punkt beim Längenanteil `fraction`.
    ///
    /// Geschlossen: Anteil modulo 1. Offen: auf `[0, 1]` geklemmt, 1 liefert
    /// exakt den Endpunkt.
    pub fn point_at_fraction(&self, fraction: f64) -> Point2 {
        if self.closed {
            return self.sample_at(fraction.rem_euclid(1.0) * self.total);
        }
        let f = fraction.clamp(0.0, 1.0);
        match self.points.last() {
            Some(&last) if f >= 1.0 && !self.is_degenerate() => last,
            _ => self.sample_at(f * self.total),
        }
    }

    /// Längenanteil eines Punkts auf der Polyline (über den nächsten Punkt).
    pub fn fraction_of(&self, p: Point2) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        let Some(hit) = closest_point_on_polyline(self.points, p, self.closed) else {
            return 0.0;
        };
        let cum = self.cumulative();
        let along = cum[hit.segment] + hit.t * self.lengths[hit.segment];
        let fraction = along / self.total;
        if self.closed {
            fraction.rem_euclid(1.0)
        } else {
            fraction.clamp(0.0, 1.0)
        }
    }
}
