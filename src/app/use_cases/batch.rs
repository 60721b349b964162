//! Use-Case: eine Operation über alle Container ausführen.
//!
//! Container werden nacheinander verarbeitet. Lese- und Schreibfehler
//! überspringen nur den betroffenen Container; bereits geschriebene
//! Container bleiben geschrieben. Interne Inkonsistenzen brechen ab.

use super::equalize::equalize_path;
use super::match3d::{match_ratio_path, match_ratio_straight_path};
use super::path_job::PathJob;
use super::straighten::straighten_path;
use super::{Operation, PathOutcome};
use crate::app::container::UvContainer;
use crate::app::summary::OperationSummary;
use crate::core::{
    extract_paths_from_component, ContainerSnapshot, LoopTypeOverride, PositionUpdate, Tolerances,
    TopologyGraph, UvWorkspace,
};
use crate::error::{EngineError, SkipReason};
use crate::shared::options::EngineOptions;

/// Führt `operation` auf allen Containern aus.
///
/// Optionen und Selektions-Sync werden geprüft, bevor irgendetwas gelesen
/// oder geschrieben wird.
pub fn run_operation<C: UvContainer>(
    containers: &mut [C],
    operation: Operation,
    options: &EngineOptions,
) -> Result<OperationSummary, EngineError> {
    options.validate()?;
    if containers.iter().any(|c| c.sync_selection()) {
        return Err(EngineError::SyncSelectionActive);
    }

    let mut summary = OperationSummary::default();
    for container in containers.iter_mut() {
        let snapshot = match container.read_snapshot() {
            Ok(s) => s,
            Err(e) => {
                let err = EngineError::ContainerRead {
                    label: container.label().to_string(),
                    reason: format!("{e:#}"),
                };
                log::warn!("{err}, übersprungen");
                summary.failed_containers += 1;
                summary.record_skip(SkipReason::ContainerFailed);
                continue;
            }
        };
        if snapshot.is_empty() {
            continue;
        }
        summary.containers_with_selection += 1;

        let updates = process_snapshot(&snapshot, operation, options, &mut summary)?;
        if updates.is_empty() {
            continue;
        }
        if let Err(e) = container.write_positions(&updates) {
            let err = EngineError::ContainerWrite {
                label: container.label().to_string(),
                reason: format!("{e:#}"),
            };
            log::warn!("{err}");
            summary.failed_containers += 1;
            summary.record_skip(SkipReason::ContainerFailed);
            continue;
        }
        log::debug!(
            "Container `{}`: {} UV-Ecken geschrieben",
            container.label(),
            updates.len()
        );
    }

    log::info!("{}: {}", operation.label(), summary.message());
    Ok(summary)
}

/// Verarbeitet einen einzelnen Snapshot und liefert die geänderten Positionen.
pub fn process_snapshot(
    snapshot: &ContainerSnapshot,
    operation: Operation,
    options: &EngineOptions,
    summary: &mut OperationSummary,
) -> Result<Vec<PositionUpdate>, EngineError> {
    let tolerances = Tolerances::from_weld(options.weld_tolerance);
    let graph = TopologyGraph::build(&snapshot.edges, &tolerances.graph);
    let mut ws = UvWorkspace::from_snapshot(snapshot);

    let loop_type = match operation {
        Operation::Equalize | Operation::Match3dRatio => options.loop_type,
        Operation::StraightenOpen | Operation::Match3dStraighten => LoopTypeOverride::Auto,
    };

    for component in graph.connected_components() {
        let sub = graph.adjacency().restricted_to(&component);
        let paths = extract_paths_from_component(&sub);
        if paths.is_empty() {
            summary.record_skip(SkipReason::NoPaths);
            continue;
        }

        for path in &paths {
            if path.is_degenerate() {
                summary.record_skip(SkipReason::DegeneratePath);
                continue;
            }
            let closed = path.classify(&sub, loop_type);
            let job = PathJob {
                graph: &graph,
                sub: &sub,
                keys: &path.keys,
                closed,
                tolerances,
            };

            let outcome = match operation {
                Operation::Equalize => equalize_path(&job, &mut ws, options)?,
                Operation::StraightenOpen => straighten_path(&job, &mut ws)?,
                Operation::Match3dRatio => match_ratio_path(&job, &mut ws)?,
                Operation::Match3dStraighten => match_ratio_straight_path(&job, &mut ws)?,
            };

            match outcome {
                PathOutcome::Processed {
                    moved_points,
                    iterations,
                } => {
                    summary.record_processed(closed, moved_points);
                    if let Some(n) = iterations {
                        summary.record_iterations(n);
                    }
                }
                PathOutcome::Skipped(reason) => {
                    log::debug!("Pfad übersprungen: {}", reason);
                    if reason == SkipReason::ClosedLoop {
                        summary.closed += 1;
                    }
                    summary.record_skip(reason);
                }
            }
        }
    }

    Ok(ws.changes())
}
