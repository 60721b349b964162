//! Lifecycle der Spline-Sitzung: Start, Vorschau, Übernehmen, Abbrechen.

use super::state::{AttachedCorner, CurveSession, CurveState, SessionCommit, SessionContainer, SessionUpdate};
use crate::app::container::UvContainer;
use crate::core::{
    extract_paths_from_component, ContainerSnapshot, LoopTypeOverride, Tolerances, TopologyGraph,
    UvHandle, UvWorkspace,
};
use crate::error::EngineError;
use crate::shared::options::EngineOptions;
use crate::shared::polyline::{closest_point_on_polyline, ArcLengthTable};
use crate::shared::spline_geometry::resample_by_length;
use crate::Point2;
use indexmap::IndexMap;

/// Ergebnis eines erfolgreichen Sitzungsstarts.
#[derive(Debug, Clone)]
pub struct SessionStart {
    pub session: CurveSession,
    /// Erste Vorschau, direkt anzuwenden
    pub updates: Vec<SessionUpdate>,
}

/// Kurven eines einzelnen Containers vor dem Zusammenführen.
struct ContainerCurves {
    workspace: UvWorkspace,
    curves: Vec<CurveState>,
}

impl CurveSession {
    /// Startet eine Sitzung über bereits gelesene Snapshots.
    ///
    /// Der Index in `snapshots` ist der Container-Index aller Updates.
    /// Liefert `None`, wenn keine Kurve mit angehängten Ecken entsteht.
    pub fn begin(
        snapshots: &[ContainerSnapshot],
        initial_count: usize,
        options: &EngineOptions,
    ) -> Result<Option<SessionStart>, EngineError> {
        options.validate()?;
        let tolerances = Tolerances::from_weld(options.weld_tolerance);

        let mut curves = Vec::new();
        let mut containers = IndexMap::new();
        for (index, snapshot) in snapshots.iter().enumerate() {
            let Some(found) = collect_container_curves(index, snapshot, &tolerances)? else {
                continue;
            };
            if found.curves.is_empty() {
                continue;
            }
            curves.extend(found.curves);
            containers.insert(
                index,
                SessionContainer {
                    workspace: found.workspace,
                    backup: IndexMap::new(),
                },
            );
        }

        if curves.is_empty() {
            log::info!("Spline-Sitzung: keine Kurve mit Ecken gefunden");
            return Ok(None);
        }

        let mut session = CurveSession {
            curves,
            containers,
            active_curve: None,
            control_point_count: 0,
            options: options.curve.clone(),
            tolerances,
        };
        session.control_point_count = session.clamp_count(initial_count);
        session.resample_all_from_original(session.control_point_count);
        session.active_curve = session
            .curves
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, usize)>, (i, c)| match best {
                Some((_, n)) if n >= c.corners.len() => best,
                _ => Some((i, c.corners.len())),
            })
            .map(|(i, _)| i);

        let updates = session.preview()?;
        log::info!(
            "Spline-Sitzung gestartet: {} Kurven, {} Kontrollpunkte",
            session.curves.len(),
            session.control_point_count
        );
        Ok(Some(SessionStart { session, updates }))
    }

    /// Liest alle Container und startet die Sitzung.
    ///
    /// Aktiver Selektions-Sync bricht ab. Nicht lesbare Container werden
    /// mit einer Warnung ausgelassen.
    pub fn begin_with<C: UvContainer>(
        containers: &[C],
        initial_count: usize,
        options: &EngineOptions,
    ) -> Result<Option<SessionStart>, EngineError> {
        if containers.iter().any(|c| c.sync_selection()) {
            return Err(EngineError::SyncSelectionActive);
        }
        let snapshots: Vec<ContainerSnapshot> = containers
            .iter()
            .map(|c| {
                c.read_snapshot().unwrap_or_else(|e| {
                    let err = EngineError::ContainerRead {
                        label: c.label().to_string(),
                        reason: format!("{e:#}"),
                    };
                    log::warn!("{err}, übersprungen");
                    ContainerSnapshot::default()
                })
            })
            .collect();
        Self::begin(&snapshots, initial_count, options)
    }

    /// Verteilt alle Kurven neu aus ihrem Original-Pfad.
    pub(crate) fn resample_all_from_original(&mut self, count: usize) {
        for curve in &mut self.curves {
            curve.control_points = resample_by_length(&curve.original_path, count, curve.closed);
            curve.prune_selection();
        }
    }

    /// Projiziert alle angehängten Ecken auf die aktuellen Kurven.
    ///
    /// Jede Ecke landet beim gespeicherten Längenanteil, verschweißte Ecken
    /// folgen. Kurven mit weniger als 2 Kontrollpunkten stellen ihre Ecken
    /// auf die Original-Position zurück.
    pub fn preview(&mut self) -> Result<Vec<SessionUpdate>, EngineError> {
        let resolution = self.options.resolution;
        let weld = self.tolerances.weld;
        let mut out: IndexMap<(usize, UvHandle), Point2> = IndexMap::new();

        for curve in &self.curves {
            let dense = curve.dense(resolution);
            let table = ArcLengthTable::new(&dense.samples, curve.closed);
            let restore = curve.control_points.len() < 2 || dense.samples.len() < 2;

            for corner in &curve.corners {
                let Some(container) = self.containers.get_mut(&corner.container) else {
                    continue;
                };
                if restore {
                    remember(container, corner.handle)?;
                    container.workspace.set_exact(corner.handle, corner.original_uv)?;
                    out.insert((corner.container, corner.handle), corner.original_uv);
                    continue;
                }

                let uv = table.point_at_fraction(corner.fraction);
                for handle in container.workspace.welded_with(corner.handle, &weld)? {
                    remember(container, handle)?;
                    container.workspace.set_exact(handle, uv)?;
                    out.insert((corner.container, handle), uv);
                }
            }
        }

        Ok(into_updates(out))
    }

    /// Beendet die Sitzung. Die Positionen sind bereits per Vorschau gesetzt.
    ///
    /// Gespeichert wird die gemeinsame Anzahl, bei abweichenden Anzahlen
    /// die der aktiven Kurve.
    pub fn commit(self) -> SessionCommit {
        let first = self.curves.first().map(|c| c.control_points.len());
        let uniform = self
            .curves
            .iter()
            .all(|c| Some(c.control_points.len()) == first);
        let count = if uniform {
            first
        } else {
            self.active_curve
                .and_then(|i| self.curves.get(i))
                .map(|c| c.control_points.len())
        };
        let control_point_count = count.unwrap_or(self.control_point_count);
        log::info!("Spline-Sitzung übernommen: {} Kontrollpunkte", control_point_count);
        SessionCommit { control_point_count }
    }

    /// Bricht die Sitzung ab und liefert die Positionen vor dem Start.
    pub fn cancel(self) -> Vec<SessionUpdate> {
        let mut out: IndexMap<(usize, UvHandle), Point2> = IndexMap::new();
        for (&index, container) in &self.containers {
            for (&handle, &uv) in &container.backup {
                out.insert((index, handle), uv);
            }
        }
        for corner in self.curves.iter().flat_map(|c| &c.corners) {
            out.insert((corner.container, corner.handle), corner.original_uv);
        }
        log::info!("Spline-Sitzung abgebrochen: {} Ecken zurückgesetzt", out.len());
        into_updates(out)
    }
}

/// Schreibt Sitzungs-Updates in die passenden Container.
pub fn write_session_updates<C: UvContainer>(
    containers: &mut [C],
    updates: &[SessionUpdate],
) -> Result<(), EngineError> {
    let mut grouped: IndexMap<usize, Vec<crate::core::PositionUpdate>> = IndexMap::new();
    for u in updates {
        grouped
            .entry(u.container)
            .or_default()
            .push(crate::core::PositionUpdate {
                handle: u.handle,
                uv: u.uv,
            });
    }
    for (index, batch) in grouped {
        let Some(container) = containers.get_mut(index) else {
            return Err(EngineError::ContainerWrite {
                label: format!("#{index}"),
                reason: "Container-Index außerhalb der Liste".to_string(),
            });
        };
        container
            .write_positions(&batch)
            .map_err(|e| EngineError::ContainerWrite {
                label: container.label().to_string(),
                reason: format!("{e:#}"),
            })?;
    }
    Ok(())
}

fn remember(container: &mut SessionContainer, handle: UvHandle) -> Result<(), EngineError> {
    if !container.backup.contains_key(&handle) {
        let uv = container.workspace.position(handle)?;
        container.backup.insert(handle, uv);
    }
    Ok(())
}

fn into_updates(map: IndexMap<(usize, UvHandle), Point2>) -> Vec<SessionUpdate> {
    map.into_iter()
        .map(|((container, handle), uv)| SessionUpdate { container, handle, uv })
        .collect()
}

/// Baut die Kurven eines Containers und hängt die selektierten Ecken an.
///
/// `None` bei höchstens 2 selektierten Ecken.
fn collect_container_curves(
    index: usize,
    snapshot: &ContainerSnapshot,
    tolerances: &Tolerances,
) -> Result<Option<ContainerCurves>, EngineError> {
    let mut corners: IndexMap<UvHandle, Point2> = IndexMap::new();
    for edge in &snapshot.edges {
        corners.entry(edge.handle_a).or_insert(edge.uv_a);
        corners.entry(edge.handle_b).or_insert(edge.uv_b);
    }
    if corners.len() <= 2 {
        return Ok(None);
    }

    let workspace = UvWorkspace::from_snapshot(snapshot);
    let graph = TopologyGraph::build(&snapshot.edges, &tolerances.graph);

    let mut curves = Vec::new();
    let mut on_path = std::collections::HashSet::new();
    for component in graph.connected_components() {
        let sub = graph.adjacency().restricted_to(&component);
        for path in extract_paths_from_component(&sub) {
            if path.is_degenerate() {
                continue;
            }
            let closed = path.classify(&sub, LoopTypeOverride::Auto);
            let points = path
                .keys
                .iter()
                .map(|&k| {
                    let handle = graph
                        .handles(k)
                        .first()
                        .copied()
                        .ok_or(EngineError::MissingHandles(k))?;
                    workspace.position(handle)
                })
                .collect::<Result<Vec<_>, _>>()?;
            on_path.extend(path.keys.iter().copied());
            curves.push(CurveState::new(index, points, closed));
        }
    }

    for (&handle, &uv) in &corners {
        if !on_path.contains(&tolerances.graph_key(uv)) {
            continue;
        }
        let nearest = curves
            .iter()
            .enumerate()
            .filter_map(|(i, c)| {
                closest_point_on_polyline(&c.original_path, uv, c.closed).map(|hit| (i, hit.distance))
            })
            .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
                Some((_, bd)) if bd <= d => best,
                _ => Some((i, d)),
            });
        let Some((ci, _)) = nearest else {
            continue;
        };
        let curve = &mut curves[ci];
        let fraction = ArcLengthTable::new(&curve.original_path, curve.closed).fraction_of(uv);
        curve.corners.push(AttachedCorner {
            container: index,
            handle,
            original_uv: uv,
            fraction,
        });
    }

    curves.retain(|c| !c.corners.is_empty());
    log::debug!("Container #{}: {} Kurven mit Ecken", index, curves.len());
    Ok(Some(ContainerCurves { workspace, curves }))
}
