//! Bearbeitungs-Schritte der Spline-Sitzung.

use super::state::{CurveSession, CurveState, SessionUpdate};
use crate::error::EngineError;
use crate::shared::polyline::closest_point_on_polyline;
use crate::shared::spline_geometry::resample_by_length;
use crate::Point2;
use indexmap::IndexMap;

/// Wo ein neuer Kontrollpunkt entsteht.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InsertAnchor {
    /// Freie Position (wird nach dem nächsten Segment des Kontrollpolygons eingefügt)
    Position(Point2),
    /// Längenanteil auf der aktuellen Kurve
    Fraction(f64),
}

/// Ein Bearbeitungs-Schritt.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEdit {
    Select { curve: usize, index: usize },
    ToggleSelect { curve: usize, index: usize },
    ClearSelection,
    /// Rechteck-Selektion über alle Kurven
    SelectInRect { min: Point2, max: Point2, extend: bool },
    MoveSelected { delta: Point2 },
    MovePoints { curve: usize, indices: Vec<usize>, delta: Point2 },
    Insert { curve: usize, anchor: InsertAnchor },
    Delete { curve: usize, index: usize },
    ResampleFromCurrent { count: usize },
    ResampleFromOriginal { count: usize },
    ResetToOriginal,
}

impl CurveSession {
    /// Wendet einen Schritt an und liefert die neue Vorschau.
    ///
    /// Reine Selektions-Schritte liefern keine Updates.
    pub fn apply_edit(&mut self, edit: SessionEdit) -> Result<Vec<SessionUpdate>, EngineError> {
        match edit {
            SessionEdit::Select { curve, index } => {
                self.check_index(curve, index)?;
                for c in &mut self.curves {
                    c.clear_selection();
                }
                let c = &mut self.curves[curve];
                c.selected.insert(index);
                c.active = Some(index);
                self.active_curve = Some(curve);
                Ok(Vec::new())
            }
            SessionEdit::ToggleSelect { curve, index } => {
                self.check_index(curve, index)?;
                let c = &mut self.curves[curve];
                if c.selected.remove(&index) {
                    if c.active == Some(index) {
                        c.active = c.selected.iter().next().copied();
                    }
                } else {
                    c.selected.insert(index);
                    c.active = Some(index);
                }
                self.active_curve = Some(curve);
                Ok(Vec::new())
            }
            SessionEdit::ClearSelection => {
                for c in &mut self.curves {
                    c.clear_selection();
                }
                Ok(Vec::new())
            }
            SessionEdit::SelectInRect { min, max, extend } => {
                self.select_in_rect(min, max, extend);
                Ok(Vec::new())
            }
            SessionEdit::MoveSelected { delta } => {
                let mut any = false;
                for c in &mut self.curves {
                    for &i in &c.selected {
                        c.control_points[i] += delta;
                        any = true;
                    }
                }
                if !any {
                    return Ok(Vec::new());
                }
                self.preview()
            }
            SessionEdit::MovePoints {
                curve,
                indices,
                delta,
            } => {
                self.check_curve(curve)?;
                for &i in &indices {
                    self.check_index(curve, i)?;
                }
                let c = &mut self.curves[curve];
                let mut unique = indices;
                unique.sort_unstable();
                unique.dedup();
                for i in unique {
                    c.control_points[i] += delta;
                }
                self.preview()
            }
            SessionEdit::Insert { curve, anchor } => {
                self.insert_point(curve, anchor)?;
                self.preview()
            }
            SessionEdit::Delete { curve, index } => {
                self.check_index(curve, index)?;
                let c = &mut self.curves[curve];
                if c.control_points.len() <= c.min_points() {
                    return Err(EngineError::InvalidEdit(format!(
                        "Kurve {curve}: mindestens {} Kontrollpunkte nötig",
                        c.min_points()
                    )));
                }
                c.control_points.remove(index);
                c.shift_selection_after_delete(index);
                self.preview()
            }
            SessionEdit::ResampleFromCurrent { count } => {
                let count = self.clamp_count(count);
                let resolution = self.options.resolution;
                for c in &mut self.curves {
                    let dense = c.dense(resolution);
                    c.control_points = resample_by_length(&dense.samples, count, c.closed);
                    c.prune_selection();
                }
                self.control_point_count = count;
                self.preview()
            }
            SessionEdit::ResampleFromOriginal { count } => {
                let count = self.clamp_count(count);
                self.resample_all_from_original(count);
                self.control_point_count = count;
                self.preview()
            }
            SessionEdit::ResetToOriginal => self.reset_to_original(),
        }
    }

    /// Index der Kurve, die `position` am nächsten liegt (höchstens `max_distance`).
    pub fn nearest_curve(&self, position: Point2, max_distance: f64) -> Option<usize> {
        let resolution = self.options.resolution;
        self.curves
            .iter()
            .enumerate()
            .map(|(i, c)| (i, c.dense(resolution).distance_to(position)))
            .filter(|&(_, d)| d <= max_distance)
            .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
                Some((_, bd)) if bd <= d => best,
                _ => Some((i, d)),
            })
            .map(|(i, _)| i)
    }

    /// `(Kurve, Index)` des nächsten Kontrollpunkts innerhalb `max_distance`.
    pub fn nearest_control(&self, position: Point2, max_distance: f64) -> Option<(usize, usize)> {
        let mut best: Option<((usize, usize), f64)> = None;
        for (ci, c) in self.curves.iter().enumerate() {
            for (pi, p) in c.control_points.iter().enumerate() {
                let d = p.distance(position);
                if d <= max_distance && best.map_or(true, |(_, bd)| d < bd) {
                    best = Some(((ci, pi), d));
                }
            }
        }
        best.map(|(hit, _)| hit)
    }

    fn check_curve(&self, curve: usize) -> Result<&CurveState, EngineError> {
        self.curves
            .get(curve)
            .ok_or_else(|| EngineError::InvalidEdit(format!("Kurve {curve} existiert nicht")))
    }

    fn check_index(&self, curve: usize, index: usize) -> Result<(), EngineError> {
        if index >= self.check_curve(curve)?.control_points.len() {
            return Err(EngineError::InvalidEdit(format!(
                "Kurve {curve}: Kontrollpunkt {index} existiert nicht"
            )));
        }
        Ok(())
    }

    fn select_in_rect(&mut self, min: Point2, max: Point2, extend: bool) {
        let lo = min.min(max);
        let hi = min.max(max);
        let mut first_hit = None;
        for (ci, c) in self.curves.iter_mut().enumerate() {
            if !extend {
                c.clear_selection();
            }
            for (pi, p) in c.control_points.iter().enumerate() {
                if p.cmpge(lo).all() && p.cmple(hi).all() {
                    c.selected.insert(pi);
                    c.active.get_or_insert(pi);
                    first_hit.get_or_insert(ci);
                }
            }
        }
        if first_hit.is_some() {
            self.active_curve = first_hit;
        }
    }

    fn insert_point(&mut self, curve: usize, anchor: InsertAnchor) -> Result<(), EngineError> {
        let resolution = self.options.resolution;
        let max = self.options.max_control_points;
        let c = self.check_curve(curve)?;
        if c.control_points.len() >= max {
            return Err(EngineError::InvalidEdit(format!(
                "Kurve {curve}: höchstens {max} Kontrollpunkte"
            )));
        }

        let position = match anchor {
            InsertAnchor::Position(p) => p,
            InsertAnchor::Fraction(f) => c.dense(resolution).point_at_fraction(f),
        };
        let index = closest_point_on_polyline(&c.control_points, position, c.closed)
            .map_or(c.control_points.len(), |hit| hit.segment + 1);

        for other in &mut self.curves {
            other.clear_selection();
        }
        let c = &mut self.curves[curve];
        c.control_points.insert(index, position);
        c.selected.insert(index);
        c.active = Some(index);
        self.active_curve = Some(curve);
        Ok(())
    }

    fn reset_to_original(&mut self) -> Result<Vec<SessionUpdate>, EngineError> {
        let mut out: IndexMap<(usize, crate::core::UvHandle), Point2> = IndexMap::new();
        for corner in self.curves.iter().flat_map(|c| &c.corners) {
            if let Some(container) = self.containers.get_mut(&corner.container) {
                container.workspace.set_exact(corner.handle, corner.original_uv)?;
                out.insert((corner.container, corner.handle), corner.original_uv);
            }
        }
        self.resample_all_from_original(self.control_point_count);
        for u in self.preview()? {
            out.insert((u.container, u.handle), u.uv);
        }
        Ok(out
            .into_iter()
            .map(|((container, handle), uv)| SessionUpdate { container, handle, uv })
            .collect())
    }
}
