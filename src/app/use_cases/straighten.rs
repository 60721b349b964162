//! Use-Case: offene Schleifen auf die Strecke zwischen ihren Enden legen.

use super::path_job::PathJob;
use super::PathOutcome;
use crate::core::UvWorkspace;
use crate::error::{EngineError, SkipReason};
use crate::shared::options::DEDUP_EPSILON;
use crate::shared::polyline::dedup_with_map;
use crate::shared::redistribute::straight_evenly;
use std::collections::HashSet;

/// Verteilt die beweglichen Punkte in gleichen Schritten zwischen erstem
/// und letztem (dedupliziertem) Punkt. Geschlossene Pfade werden übersprungen.
pub(crate) fn straighten_path(job: &PathJob<'_>, ws: &mut UvWorkspace) -> Result<PathOutcome, EngineError> {
    if job.closed {
        return Ok(PathOutcome::Skipped(SkipReason::ClosedLoop));
    }

    let current = job.read_points(ws)?;
    let deduped = dedup_with_map(&current, false, DEDUP_EPSILON);
    let (Some(&first), Some(&last)) = (deduped.points.first(), deduped.points.last()) else {
        return Ok(PathOutcome::Skipped(SkipReason::TooFewPoints));
    };
    if deduped.points.len() < 2 {
        return Ok(PathOutcome::Skipped(SkipReason::TooFewPoints));
    }

    let line = straight_evenly(first, last, deduped.points.len());
    let new_points: Vec<_> = deduped.index_map.iter().map(|&j| line[j]).collect();

    let movable = job.movable_mask();
    let mut moved = HashSet::new();
    job.write(ws, &new_points, Some(&movable), &mut moved)?;

    log::debug!("Gerade: {} Punkte, {} bewegt", job.keys.len(), moved.len());
    Ok(PathOutcome::Processed {
        moved_points: moved.len(),
        iterations: None,
    })
}
