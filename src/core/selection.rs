//! Eingabe- und Ausgabe-Datensätze an der Grenze zum Mesh-Editor.

use crate::Point2;
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Opaker Handle einer UV-Ecke (eine Face-Ecke im Mesh).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UvHandle(pub u64);

/// Identität des topologischen Punkts (Mesh-Vertex), dem eine Ecke gehört.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub u64);

/// Eine selektierte, gerichtete UV-Kante.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectedEdge {
    pub uv_a: Point2,
    pub uv_b: Point2,
    pub handle_a: UvHandle,
    pub handle_b: UvHandle,
    /// 3D-Länge der zugehörigen Mesh-Kante (nur für 3D-Verhältnis-Operationen)
    #[serde(default)]
    pub length_3d: Option<f64>,
}

impl SelectedEdge {
    pub fn new(uv_a: Point2, uv_b: Point2, handle_a: UvHandle, handle_b: UvHandle) -> Self {
        Self {
            uv_a,
            uv_b,
            handle_a,
            handle_b,
            length_3d: None,
        }
    }

    /// Setzt die 3D-Länge (Builder-Stil).
    pub fn with_length_3d(mut self, length: f64) -> Self {
        self.length_3d = Some(length);
        self
    }
}

/// Eine beliebige UV-Ecke des Containers, selektiert oder nicht.
///
/// Quelle für die Weld-Suche: alle Ecken desselben Vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopRecord {
    pub handle: UvHandle,
    pub vertex: VertexId,
    pub uv: Point2,
    /// 3D-Position des Vertex (Schluss-Spanne bei erzwungen geschlossenen Pfaden)
    #[serde(default)]
    pub position: Option<DVec3>,
}

/// Vollständig materialisierter Eingabezustand eines Containers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerSnapshot {
    /// Selektierte Kanten (keine Reihenfolge garantiert)
    pub edges: Vec<SelectedEdge>,
    /// Alle Ecken inklusive Vertex-Zugehörigkeit
    pub loops: Vec<LoopRecord>,
}

impl ContainerSnapshot {
    /// `true` wenn keine Kante selektiert ist (→ "nichts zu tun").
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Neue Position für einen Handle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub handle: UvHandle,
    pub uv: Point2,
}
