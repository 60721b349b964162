//! Schnittstelle zum Mesh-Editor und eine serialisierbare Referenz-Implementierung.

use crate::core::{ContainerSnapshot, LoopRecord, PositionUpdate, SelectedEdge, UvHandle, VertexId};
use crate::Point2;
use anyhow::{bail, Context};
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Ein editierbares Objekt mit UV-Ecken (ein Mesh im Editor).
pub trait UvContainer {
    /// Anzeigename für Logs und Meldungen.
    fn label(&self) -> &str;

    /// Ist die UV/Mesh-Selektions-Synchronisation aktiv?
    fn sync_selection(&self) -> bool {
        false
    }

    /// Liest selektierte Kanten und alle Ecken.
    fn read_snapshot(&self) -> anyhow::Result<ContainerSnapshot>;

    /// Schreibt neue Positionen. Unbekannte Handles sind ein Fehler.
    fn write_positions(&mut self, updates: &[PositionUpdate]) -> anyhow::Result<()>;
}

/// Eine Ecke einer Fläche.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceCorner {
    /// Index in `UvMesh::vertices`
    pub vertex: usize,
    pub uv: Point2,
    /// Kante von dieser Ecke zur nächsten Ecke der Fläche ist selektiert
    #[serde(default)]
    pub edge_selected: bool,
}

impl FaceCorner {
    pub fn new(vertex: usize, uv: Point2) -> Self {
        Self {
            vertex,
            uv,
            edge_selected: false,
        }
    }

    pub fn selected(mut self) -> Self {
        self.edge_selected = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshFace {
    pub corners: Vec<FaceCorner>,
}

/// Minimales Mesh mit UV-Ecken, als JSON les- und schreibbar.
///
/// Handles sind die fortlaufenden Ecken-Indizes über alle Flächen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UvMesh {
    pub name: String,
    #[serde(default)]
    pub sync_selection: bool,
    pub vertices: Vec<DVec3>,
    pub faces: Vec<MeshFace>,
}

impl UvMesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add_vertex(&mut self, position: DVec3) -> usize {
        self.vertices.push(position);
        self.vertices.len() - 1
    }

    pub fn add_face(&mut self, corners: Vec<FaceCorner>) -> usize {
        self.faces.push(MeshFace { corners });
        self.faces.len() - 1
    }

    /// Baut einen Streifen aus Vierecken entlang `uv`/`positions`.
    ///
    /// Die Unterkante jedes Vierecks liegt auf der Polyline und ist
    /// selektiert; die Oberkante ist um `(0, 0.05)` bzw. `z + 1` versetzt.
    /// Bei `closed` schließt ein letztes Viereck den Ring.
    pub fn strip(name: impl Into<String>, uv: &[Point2], positions: &[DVec3], closed: bool) -> Self {
        let mut mesh = Self::new(name);
        let n = uv.len().min(positions.len());
        let bottom: Vec<usize> = (0..n).map(|i| mesh.add_vertex(positions[i])).collect();
        let top: Vec<usize> = (0..n)
            .map(|i| mesh.add_vertex(positions[i] + DVec3::Z))
            .collect();
        let lift = Point2::new(0.0, 0.05);
        let segments = if closed { n } else { n.saturating_sub(1) };
        for i in 0..segments {
            let j = (i + 1) % n;
            mesh.add_face(vec![
                FaceCorner::new(bottom[i], uv[i]).selected(),
                FaceCorner::new(bottom[j], uv[j]),
                FaceCorner::new(top[j], uv[j] + lift),
                FaceCorner::new(top[i], uv[i] + lift),
            ]);
        }
        mesh
    }

    pub fn load_json(path: &std::path::Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Mesh-Datei nicht lesbar: {}", path.display()))?;
        let mesh: Self = serde_json::from_str(&text)
            .with_context(|| format!("Mesh-Datei fehlerhaft: {}", path.display()))?;
        log::info!(
            "Mesh geladen: {} ({} Flächen, {} Ecken)",
            mesh.name,
            mesh.faces.len(),
            mesh.corner_count()
        );
        Ok(mesh)
    }

    pub fn save_json(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)
            .with_context(|| format!("Mesh-Datei nicht schreibbar: {}", path.display()))?;
        Ok(())
    }

    pub fn corner_count(&self) -> usize {
        self.faces.iter().map(|f| f.corners.len()).sum()
    }

    /// Alle Ecken mit Handle, in Flächen-Reihenfolge.
    pub fn corners(&self) -> impl Iterator<Item = (UvHandle, &FaceCorner)> + '_ {
        self.faces
            .iter()
            .flat_map(|f| f.corners.iter())
            .enumerate()
            .map(|(i, c)| (UvHandle(i as u64), c))
    }

    /// Aktuelle UV einer Ecke.
    pub fn corner_uv(&self, handle: UvHandle) -> Option<Point2> {
        self.corners().find(|(h, _)| *h == handle).map(|(_, c)| c.uv)
    }

    fn corner_mut(&mut self, handle: UvHandle) -> Option<&mut FaceCorner> {
        self.faces
            .iter_mut()
            .flat_map(|f| f.corners.iter_mut())
            .nth(usize::try_from(handle.0).ok()?)
    }
}

impl UvContainer for UvMesh {
    fn label(&self) -> &str {
        &self.name
    }

    fn sync_selection(&self) -> bool {
        self.sync_selection
    }

    fn read_snapshot(&self) -> anyhow::Result<ContainerSnapshot> {
        let mut snapshot = ContainerSnapshot::default();
        let mut base = 0u64;

        for (face_index, face) in self.faces.iter().enumerate() {
            let count = face.corners.len();
            for (i, corner) in face.corners.iter().enumerate() {
                let Some(&position) = self.vertices.get(corner.vertex) else {
                    bail!(
                        "Fläche {} verweist auf unbekannten Vertex {}",
                        face_index,
                        corner.vertex
                    );
                };
                let handle = UvHandle(base + i as u64);
                snapshot.loops.push(LoopRecord {
                    handle,
                    vertex: VertexId(corner.vertex as u64),
                    uv: corner.uv,
                    position: Some(position),
                });

                if corner.edge_selected && count >= 2 {
                    let j = (i + 1) % count;
                    let next = face.corners[j];
                    let Some(&next_position) = self.vertices.get(next.vertex) else {
                        bail!(
                            "Fläche {} verweist auf unbekannten Vertex {}",
                            face_index,
                            next.vertex
                        );
                    };
                    snapshot.edges.push(
                        SelectedEdge::new(corner.uv, next.uv, handle, UvHandle(base + j as u64))
                            .with_length_3d(position.distance(next_position)),
                    );
                }
            }
            base += count as u64;
        }
        Ok(snapshot)
    }

    fn write_positions(&mut self, updates: &[PositionUpdate]) -> anyhow::Result<()> {
        let total = self.corner_count() as u64;
        if let Some(bad) = updates.iter().find(|u| u.handle.0 >= total) {
            bail!("unbekannter UV-Handle {} in `{}`", bad.handle.0, self.name);
        }
        for update in updates {
            if let Some(corner) = self.corner_mut(update.handle) {
                corner.uv = update.uv;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_mesh() -> UvMesh {
        let uv = [Point2::new(0.1, 0.1), Point2::new(0.3, 0.1), Point2::new(0.5, 0.1)];
        let pos = [DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0), DVec3::new(3.0, 0.0, 0.0)];
        UvMesh::strip("Linie", &uv, &pos, false)
    }

    #[test]
    fn strip_selects_bottom_edges_with_3d_length() {
        let mesh = line_mesh();
        let snapshot = mesh.read_snapshot().expect("Snapshot erwartet");
        assert_eq!(snapshot.edges.len(), 2);
        assert_eq!(snapshot.loops.len(), 8);
        assert_eq!(snapshot.edges[0].length_3d, Some(2.0));
        assert_eq!(snapshot.edges[1].length_3d, Some(1.0));
        assert_eq!(snapshot.edges[0].handle_b, UvHandle(1));
        assert_eq!(snapshot.edges[1].handle_a, UvHandle(4));
    }

    #[test]
    fn write_positions_updates_corners() {
        let mut mesh = line_mesh();
        let target = Point2::new(0.25, 0.2);
        mesh.write_positions(&[PositionUpdate {
            handle: UvHandle(5),
            uv: target,
        }])
        .expect("Schreiben erwartet");
        assert_eq!(mesh.corner_uv(UvHandle(5)), Some(target));
    }

    #[test]
    fn write_rejects_unknown_handles_without_partial_write() {
        let mut mesh = line_mesh();
        let before = mesh.clone();
        let result = mesh.write_positions(&[
            PositionUpdate {
                handle: UvHandle(0),
                uv: Point2::ZERO,
            },
            PositionUpdate {
                handle: UvHandle(100),
                uv: Point2::ZERO,
            },
        ]);
        assert!(result.is_err());
        assert_eq!(mesh, before);
    }

    #[test]
    fn invalid_vertex_index_fails_to_read() {
        let mut mesh = UvMesh::new("kaputt");
        mesh.add_face(vec![FaceCorner::new(7, Point2::ZERO).selected()]);
        assert!(mesh.read_snapshot().is_err());
    }

    #[test]
    fn json_roundtrip_keeps_selection() {
        let mesh = line_mesh();
        let text = serde_json::to_string(&mesh).expect("JSON erwartet");
        let back: UvMesh = serde_json::from_str(&text).expect("Parse erwartet");
        assert_eq!(back, mesh);
    }
}
