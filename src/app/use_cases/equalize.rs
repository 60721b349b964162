//! Use-Case: Punktabstände entlang einer Schleife angleichen (Form bleibt).

use super::path_job::PathJob;
use super::PathOutcome;
use crate::app::convergence::{ConvergencePolicy, ConvergenceReport};
use crate::core::UvWorkspace;
use crate::error::{EngineError, SkipReason};
use crate::shared::options::EngineOptions;
use crate::shared::polyline::{max_displacement, spacing_cv};
use crate::shared::redistribute::redistribute_evenly;
use crate::shared::seam::{needs_unwrap, unwrap_cycle01, wrap01};
use std::collections::HashSet;

/// Gleicht einen Pfad iterativ an.
///
/// Jeder Durchlauf liest die Positionen neu (Welds können sie geändert
/// haben), verteilt entlang der Bogenlänge neu und schreibt nur bewegliche
/// Punkte. Enden offener Pfade und Knoten mit Grad ≠ 2 bleiben stehen.
pub(crate) fn equalize_path(
    job: &PathJob<'_>,
    ws: &mut UvWorkspace,
    options: &EngineOptions,
) -> Result<PathOutcome, EngineError> {
    equalize_path_with_report(job, ws, options).map(|(outcome, _)| outcome)
}

/// Wie [`equalize_path`], liefert zusätzlich den Verlauf aller Durchläufe.
pub(crate) fn equalize_path_with_report(
    job: &PathJob<'_>,
    ws: &mut UvWorkspace,
    options: &EngineOptions,
) -> Result<(PathOutcome, ConvergenceReport), EngineError> {
    let policy = ConvergencePolicy::for_path(options, job.closed);
    let movable = job.movable_mask();
    let mut moved = HashSet::new();
    let mut report = ConvergenceReport::default();

    for _ in 0..policy.max_iterations {
        let current = job.read_points(ws)?;
        let unwrap = needs_unwrap(&current, job.closed);
        let working = if unwrap {
            unwrap_cycle01(&current)
        } else {
            current.clone()
        };

        let Some(result) = redistribute_evenly(&working, job.closed, true) else {
            if report.iterations == 0 {
                return Ok((PathOutcome::Skipped(SkipReason::TooFewPoints), report));
            }
            break;
        };
        if result.degenerate {
            report.push(0.0, 0.0);
            report.converged = true;
            break;
        }

        let cv = spacing_cv(&result.points, job.closed);
        let scattered = result.scatter();
        let displacement = max_displacement(&working, &scattered, &movable);
        let new_points = if unwrap {
            wrap01(&scattered)
        } else {
            scattered
        };

        job.write(ws, &new_points, Some(&movable), &mut moved)?;
        report.push(displacement, cv);

        if policy.should_stop(displacement, cv) {
            report.converged = true;
            break;
        }
    }

    log::debug!(
        "Equalize: {} Punkte, {} ({} Iterationen, konvergiert: {}, CV {:?})",
        job.keys.len(),
        if job.closed { "geschlossen" } else { "offen" },
        report.iterations,
        report.converged,
        report.spacing_cv.last()
    );

    let outcome = PathOutcome::Processed {
        moved_points: moved.len(),
        iterations: Some(report.iterations),
    };
    Ok((outcome, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::container::{UvContainer, UvMesh};
    use crate::core::{extract_paths_from_component, LoopTypeOverride, Tolerances, TopologyGraph};
    use crate::shared::options::IterationMode;
    use crate::Point2;
    use glam::DVec3;

    fn uneven_ring() -> UvMesh {
        let uv: Vec<Point2> = [0.0_f64, 10.0, 30.0, 100.0, 150.0, 200.0, 260.0, 300.0]
            .iter()
            .map(|a| {
                let r = a.to_radians();
                Point2::new(0.5 + 0.2 * r.cos(), 0.5 + 0.2 * r.sin())
            })
            .collect();
        let pos: Vec<DVec3> = uv.iter().map(|q| DVec3::new(q.x, q.y, 0.0)).collect();
        UvMesh::strip("Ring", &uv, &pos, true)
    }

    #[test]
    fn test_spacing_cv_never_rises_between_passes_on_ring() {
        let snapshot = uneven_ring().read_snapshot().expect("Snapshot erwartet");
        let options = EngineOptions {
            iteration_mode: IterationMode::Fixed,
            iteration_count: 5,
            ..EngineOptions::default()
        };
        let tolerances = Tolerances::from_weld(options.weld_tolerance);
        let graph = TopologyGraph::build(&snapshot.edges, &tolerances.graph);
        let mut ws = UvWorkspace::from_snapshot(&snapshot);

        let components = graph.connected_components();
        assert_eq!(components.len(), 1);
        let sub = graph.adjacency().restricted_to(&components[0]);
        let paths = extract_paths_from_component(&sub);
        assert_eq!(paths.len(), 1);
        let closed = paths[0].classify(&sub, LoopTypeOverride::Auto);
        assert!(closed);
        let job = PathJob {
            graph: &graph,
            sub: &sub,
            keys: &paths[0].keys,
            closed,
            tolerances,
        };

        let (outcome, report) =
            equalize_path_with_report(&job, &mut ws, &options).expect("Equalize erwartet");
        assert!(matches!(outcome, PathOutcome::Processed { iterations: Some(5), .. }));
        assert_eq!(report.spacing_cv.len(), 5);
        assert_eq!(report.displacement.len(), 5);
        for w in report.spacing_cv.windows(2) {
            assert!(w[1] <= w[0] + 1e-12, "CV gestiegen: {:?}", report.spacing_cv);
        }
        assert!(report.spacing_cv[0] < 0.06);
        assert!(report.spacing_cv[4] < 0.001);
    }
}
