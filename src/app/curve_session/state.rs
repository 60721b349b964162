//! State-Definitionen der interaktiven Spline-Sitzung.

use crate::core::{Tolerances, UvHandle, UvWorkspace};
use crate::shared::options::CurveOptions;
use crate::shared::spline_geometry::{sample_polyline, DenseCurve};
use crate::Point2;
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Eine reale UV-Ecke, die per Längenanteil an einer Kurve hängt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttachedCorner {
    /// Index des Containers in der Eingabe-Liste
    pub container: usize,
    pub handle: UvHandle,
    /// Position beim Start der Sitzung
    pub original_uv: Point2,
    /// Längenanteil auf dem Original-Pfad (0..1)
    pub fraction: f64,
}

/// Eine editierbare Kurve.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveState {
    /// Index des Containers in der Eingabe-Liste
    pub container: usize,
    /// Fest beim Start bestimmt
    pub closed: bool,
    /// Pfad beim Start (Quelle für "aus Original neu verteilen")
    pub original_path: Vec<Point2>,
    pub control_points: Vec<Point2>,
    pub selected: BTreeSet<usize>,
    pub active: Option<usize>,
    pub corners: Vec<AttachedCorner>,
}

impl CurveState {
    pub fn new(container: usize, original_path: Vec<Point2>, closed: bool) -> Self {
        Self {
            container,
            closed,
            original_path,
            control_points: Vec::new(),
            selected: BTreeSet::new(),
            active: None,
            corners: Vec::new(),
        }
    }

    /// Mindestanzahl Kontrollpunkte (2 offen, 3 geschlossen).
    pub fn min_points(&self) -> usize {
        if self.closed {
            3
        } else {
            2
        }
    }

    /// Dichte Auswertung der aktuellen Kontrollpunkte.
    pub fn dense(&self, resolution: usize) -> DenseCurve {
        sample_polyline(&self.control_points, resolution, self.closed)
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
        self.active = None;
    }

    /// Entfernt Selektion außerhalb der aktuellen Punktanzahl.
    pub(crate) fn prune_selection(&mut self) {
        let len = self.control_points.len();
        self.selected.retain(|&i| i < len);
        if self.active.is_some_and(|a| a >= len) {
            self.active = self.selected.iter().next().copied();
        }
    }

    /// Index-Pflege nach dem Löschen von `index`.
    pub(crate) fn shift_selection_after_delete(&mut self, index: usize) {
        self.selected = self
            .selected
            .iter()
            .filter(|&&i| i != index)
            .map(|&i| if i > index { i - 1 } else { i })
            .collect();
        self.active = match self.active {
            Some(a) if a == index => self.selected.iter().next().copied(),
            Some(a) if a > index => Some(a - 1),
            other => other,
        };
    }
}

/// Arbeitsstand eines Containers während der Sitzung.
#[derive(Debug, Clone)]
pub(crate) struct SessionContainer {
    pub workspace: UvWorkspace,
    /// Erster gesehener Wert jeder berührten Ecke
    pub backup: IndexMap<UvHandle, Point2>,
}

/// Neue Position für eine Ecke eines Containers der Sitzung.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionUpdate {
    /// Index des Containers in der Eingabe-Liste
    pub container: usize,
    pub handle: UvHandle,
    pub uv: Point2,
}

/// Ergebnis von `commit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCommit {
    /// Kontrollpunkt-Anzahl, die als nächster Standard gespeichert wird
    pub control_point_count: usize,
}

/// Interaktive Sitzung über alle Kurven aller Container.
#[derive(Debug, Clone)]
pub struct CurveSession {
    pub(crate) curves: Vec<CurveState>,
    /// Eingabe-Index → Arbeitsstand
    pub(crate) containers: IndexMap<usize, SessionContainer>,
    pub(crate) active_curve: Option<usize>,
    /// Globale Kontrollpunkt-Anzahl
    pub(crate) control_point_count: usize,
    pub(crate) options: CurveOptions,
    pub(crate) tolerances: Tolerances,
}

impl CurveSession {
    pub fn curves(&self) -> &[CurveState] {
        &self.curves
    }

    pub fn curve(&self, index: usize) -> Option<&CurveState> {
        self.curves.get(index)
    }

    pub fn active_curve(&self) -> Option<usize> {
        self.active_curve
    }

    pub fn control_point_count(&self) -> usize {
        self.control_point_count
    }

    /// Eingabe-Indizes der beteiligten Container.
    pub fn container_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.containers.keys().copied()
    }

    /// Aktuelle Position einer Ecke im Sitzungs-Arbeitsstand.
    pub fn corner_position(&self, container: usize, handle: UvHandle) -> Option<Point2> {
        self.containers
            .get(&container)
            .and_then(|c| c.workspace.position(handle).ok())
    }

    /// 3 sobald eine Kurve geschlossen ist, sonst 2.
    pub(crate) fn global_min_points(&self) -> usize {
        self.curves.iter().map(CurveState::min_points).max().unwrap_or(2)
    }

    pub(crate) fn clamp_count(&self, count: usize) -> usize {
        count.clamp(self.global_min_points(), self.options.max_control_points.max(3))
    }
}
