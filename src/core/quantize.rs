//! Quantisierte UV-Schlüssel und die beiden abgeleiteten Toleranzen.
//!
//! Aus einer einzigen Benutzer-Toleranz (Weld) wird die feinere
//! Graph-Toleranz abgeleitet. So gilt überall `graph <= weld` und
//! weld-gleiche Punkte landen nie in verschiedenen Graph-Knoten.

use crate::shared::options::{GRAPH_TOLERANCE_CAP, QUANTIZE_SCALE_FLOOR};
use crate::Point2;
use serde::{Deserialize, Serialize};

/// Ganzzahliger Schlüssel eines gerundeten UV-Punkts.
///
/// Dient als Knoten-Identität im Topologie-Graph und als Hash-Schlüssel
/// für das Weld-Matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuantizedKey {
    pub x: i64,
    pub y: i64,
}

impl QuantizedKey {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Eine Rundungsstufe: `round(coord * scale)` mit ganzzahliger Skala.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantizer {
    tolerance: f64,
    scale: f64,
}

impl Quantizer {
    /// Erstellt einen Quantisierer für `tolerance`.
    ///
    /// Die Skala ist `round(1 / max(tolerance, 1e-12))`.
    pub fn new(tolerance: f64) -> Self {
        let scale = (1.0 / tolerance.max(QUANTIZE_SCALE_FLOOR)).round();
        Self { tolerance, scale }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Rundet einen Punkt auf seinen Schlüssel.
    pub fn key(&self, p: Point2) -> QuantizedKey {
        QuantizedKey {
            x: (p.x * self.scale).round() as i64,
            y: (p.y * self.scale).round() as i64,
        }
    }
}

/// Graph- und Weld-Toleranz, beide aus der Weld-Toleranz abgeleitet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    /// Feine Stufe für den Topologie-Graph
    pub graph: Quantizer,
    /// Grobe Stufe: was gemeinsam bewegt wird
    pub weld: Quantizer,
}

impl Tolerances {
    /// `graph = min(weld * 0.25, 5e-7)`.
    pub fn from_weld(weld_tolerance: f64) -> Self {
        let graph_tolerance = (weld_tolerance * 0.25).min(GRAPH_TOLERANCE_CAP);
        Self {
            graph: Quantizer::new(graph_tolerance),
            weld: Quantizer::new(weld_tolerance),
        }
    }

    /// Graph-Schlüssel eines Punkts.
    pub fn graph_key(&self, p: Point2) -> QuantizedKey {
        self.graph.key(p)
    }

    /// Weld-Schlüssel eines Punkts.
    pub fn weld_key(&self, p: Point2) -> QuantizedKey {
        self.weld.key(p)
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self::from_weld(crate::shared::options::WELD_TOLERANCE_DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_tolerance_never_exceeds_weld() {
        for weld in [1e-8, 1e-7, 1e-6, 2e-6, 1e-4, 1e-2] {
            let tol = Tolerances::from_weld(weld);
            assert!(
                tol.graph.tolerance() <= tol.weld.tolerance(),
                "graph {} > weld {}",
                tol.graph.tolerance(),
                weld
            );
        }
    }

    #[test]
    fn default_weld_gives_quarter_graph_tolerance() {
        let tol = Tolerances::from_weld(1e-6);
        assert_eq!(tol.graph.tolerance(), 2.5e-7);
        let coarse = Tolerances::from_weld(1e-3);
        assert_eq!(coarse.graph.tolerance(), 5e-7);
    }

    #[test]
    fn near_points_collapse_to_one_key() {
        let q = Quantizer::new(1e-6);
        let a = Point2::new(0.25, 0.75);
        let b = Point2::new(0.25 + 2e-7, 0.75 - 3e-7);
        assert_eq!(q.key(a), q.key(b));
        assert_ne!(q.key(a), q.key(Point2::new(0.25 + 4e-6, 0.75)));
    }

    #[test]
    fn negative_coordinates_round_symmetrically() {
        let q = Quantizer::new(0.5);
        assert_eq!(q.key(Point2::new(-1.2, 1.2)), QuantizedKey::new(-2, 2));
    }
}
