//! Use-Case: UV-Abstände an die 3D-Kantenlängen anpassen.

use super::path_job::PathJob;
use super::PathOutcome;
use crate::core::UvWorkspace;
use crate::error::{EngineError, SkipReason};
use crate::shared::options::DEDUP_EPSILON;
use crate::shared::polyline::dedup_with_map;
use crate::shared::redistribute::{min_points, resample_at_fractions, straight_at_fractions};
use crate::shared::seam::{needs_unwrap, unwrap_cycle01, wrap01};
use crate::Point2;
use std::collections::HashSet;

/// Faktor auf die Weld-Toleranz, unter dem Anfang und Ende als geschlossen gelten.
const CLOSED_ENDS_FACTOR: f64 = 10.0;
/// Untergrenze für den Endpunkt-Abstand.
const CLOSED_ENDS_FLOOR: f64 = 1e-6;

/// Form-erhaltend: neue Punkte entlang der aktuellen UV-Polyline bei den
/// kumulierten 3D-Längenanteilen. Alle Punkte werden geschrieben; die
/// Enden offener Pfade landen auf sich selbst.
pub(crate) fn match_ratio_path(job: &PathJob<'_>, ws: &mut UvWorkspace) -> Result<PathOutcome, EngineError> {
    let current = job.read_points(ws)?;
    let unwrap = needs_unwrap(&current, job.closed);
    let working = if unwrap {
        unwrap_cycle01(&current)
    } else {
        current.clone()
    };

    let deduped = dedup_with_map(&working, job.closed, DEDUP_EPSILON);
    if deduped.points.len() < min_points(job.closed) {
        return Ok(PathOutcome::Skipped(SkipReason::TooFewPoints));
    }
    let fractions = match job.fractions_3d(ws, &deduped.index_map, deduped.points.len()) {
        Ok(f) => f,
        Err(reason) => return Ok(PathOutcome::Skipped(reason)),
    };

    let resampled = resample_at_fractions(&deduped.points, &fractions, job.closed);
    let mut new_points: Vec<Point2> = deduped.index_map.iter().map(|&j| resampled[j]).collect();
    if unwrap {
        new_points = wrap01(&new_points);
    }

    let mut moved = HashSet::new();
    job.write(ws, &new_points, None, &mut moved)?;
    log::debug!("3D-Verhältnis: {} Punkte, {} bewegt", job.keys.len(), moved.len());
    Ok(PathOutcome::Processed {
        moved_points: moved.len(),
        iterations: None,
    })
}

/// Wie [`match_ratio_path`], aber entlang der Strecke zwischen den Enden.
///
/// Nur offene Pfade. Liegen Anfang und Ende innerhalb von
/// `max(weld · 10, 1e-6)`, gilt der Pfad ebenfalls als geschlossen.
pub(crate) fn match_ratio_straight_path(
    job: &PathJob<'_>,
    ws: &mut UvWorkspace,
) -> Result<PathOutcome, EngineError> {
    let current = job.read_points(ws)?;
    let ends_threshold = (job.tolerances.weld.tolerance() * CLOSED_ENDS_FACTOR).max(CLOSED_ENDS_FLOOR);
    let ends_touch = match (current.first(), current.last()) {
        (Some(a), Some(b)) => a.distance(*b) <= ends_threshold,
        _ => false,
    };
    if job.closed || ends_touch {
        return Ok(PathOutcome::Skipped(SkipReason::ClosedLoop));
    }

    let deduped = dedup_with_map(&current, false, DEDUP_EPSILON);
    if deduped.points.len() < min_points(false) {
        return Ok(PathOutcome::Skipped(SkipReason::TooFewPoints));
    }
    let fractions = match job.fractions_3d(ws, &deduped.index_map, deduped.points.len()) {
        Ok(f) => f,
        Err(reason) => return Ok(PathOutcome::Skipped(reason)),
    };

    let first = deduped.points[0];
    let last = deduped.points[deduped.points.len() - 1];
    let line = straight_at_fractions(first, last, &fractions);
    let new_points: Vec<Point2> = deduped.index_map.iter().map(|&j| line[j]).collect();

    let mut moved = HashSet::new();
    job.write(ws, &new_points, None, &mut moved)?;
    log::debug!("3D-Verhältnis gerade: {} Punkte, {} bewegt", job.keys.len(), moved.len());
    Ok(PathOutcome::Processed {
        moved_points: moved.len(),
        iterations: None,
    })
}
