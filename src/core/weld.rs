//! Weld-Propagation über einen Arbeitsstand aller UV-Ecken eines Containers.
//!
//! Zwei Ecken gelten als verschweißt, wenn sie zum selben Vertex gehören
//! und ihre aktuellen Positionen denselben Weld-Schlüssel haben. Eine
//! Änderung an einer Ecke wird auf alle verschweißten Ecken übertragen.

use super::quantize::Quantizer;
use super::selection::{ContainerSnapshot, PositionUpdate, UvHandle, VertexId};
use crate::error::EngineError;
use crate::Point2;
use glam::DVec3;
use indexmap::IndexMap;
use std::collections::HashSet;

/// Vertex → Ecken, Ecke → Vertex.
#[derive(Debug, Clone, Default)]
pub struct WeldIndex {
    by_vertex: IndexMap<VertexId, Vec<UvHandle>>,
    vertex_of: IndexMap<UvHandle, VertexId>,
}

impl WeldIndex {
    pub fn insert(&mut self, handle: UvHandle, vertex: VertexId) {
        if self.vertex_of.insert(handle, vertex).is_none() {
            self.by_vertex.entry(vertex).or_default().push(handle);
        }
    }

    pub fn vertex_of(&self, handle: UvHandle) -> Option<VertexId> {
        self.vertex_of.get(&handle).copied()
    }

    /// Alle Ecken desselben Vertex (inklusive `handle`).
    pub fn siblings(&self, handle: UvHandle) -> &[UvHandle] {
        self.vertex_of(handle)
            .and_then(|v| self.by_vertex.get(&v))
            .map_or(&[], Vec::as_slice)
    }
}

/// Veränderbarer Spiegel der UV-Positionen eines Containers.
///
/// Iterationen lesen und schreiben hier. Erst am Ende werden die
/// geänderten Positionen gesammelt an den Container gegeben.
#[derive(Debug, Clone, Default)]
pub struct UvWorkspace {
    current: IndexMap<UvHandle, Point2>,
    original: IndexMap<UvHandle, Point2>,
    positions_3d: IndexMap<UvHandle, DVec3>,
    welds: WeldIndex,
}

impl UvWorkspace {
    /// Übernimmt alle Ecken des Snapshots. Handles, die nur in Kanten
    /// vorkommen, bekommen die Kanten-Position und keinen Vertex.
    pub fn from_snapshot(snapshot: &ContainerSnapshot) -> Self {
        let mut ws = Self::default();
        for record in &snapshot.loops {
            ws.track(record.handle, record.uv);
            ws.welds.insert(record.handle, record.vertex);
            if let Some(position) = record.position {
                ws.positions_3d.insert(record.handle, position);
            }
        }
        for edge in &snapshot.edges {
            ws.track(edge.handle_a, edge.uv_a);
            ws.track(edge.handle_b, edge.uv_b);
        }
        ws
    }

    fn track(&mut self, handle: UvHandle, uv: Point2) {
        if !self.current.contains_key(&handle) {
            self.current.insert(handle, uv);
            self.original.insert(handle, uv);
        }
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn position(&self, handle: UvHandle) -> Result<Point2, EngineError> {
        self.current
            .get(&handle)
            .copied()
            .ok_or(EngineError::UnknownHandle(handle))
    }

    /// 3D-Position des Vertex hinter `handle`, falls geliefert.
    pub fn position_3d(&self, handle: UvHandle) -> Option<DVec3> {
        self.positions_3d.get(&handle).copied()
    }

    /// Ecken, die mit `handle` verschweißt sind (inklusive `handle`).
    pub fn welded_with(&self, handle: UvHandle, weld: &Quantizer) -> Result<Vec<UvHandle>, EngineError> {
        let key = weld.key(self.position(handle)?);
        let siblings = self.welds.siblings(handle);
        if siblings.is_empty() {
            return Ok(vec![handle]);
        }
        Ok(siblings
            .iter()
            .copied()
            .filter(|&h| self.current.get(&h).is_some_and(|&p| weld.key(p) == key))
            .collect())
    }

    /// Setzt `uv` für `handle` und alle verschweißten Ecken.
    ///
    /// Bereits in `applied` enthaltene Ecken werden übersprungen, damit
    /// eine Ecke pro Durchlauf nur einmal geschrieben wird. Gibt die Anzahl
    /// tatsächlich geschriebener Ecken zurück.
    pub fn set_welded(
        &mut self,
        handle: UvHandle,
        uv: Point2,
        weld: &Quantizer,
        applied: &mut HashSet<UvHandle>,
    ) -> Result<usize, EngineError> {
        let group = self.welded_with(handle, weld)?;
        let mut written = 0;
        for h in group {
            if applied.insert(h) {
                self.current.insert(h, uv);
                written += 1;
            }
        }
        Ok(written)
    }

    /// Setzt eine einzelne Ecke ohne Weld-Suche.
    pub fn set_exact(&mut self, handle: UvHandle, uv: Point2) -> Result<(), EngineError> {
        match self.current.get_mut(&handle) {
            Some(slot) => {
                *slot = uv;
                Ok(())
            }
            None => Err(EngineError::UnknownHandle(handle)),
        }
    }

    /// Alle Ecken, deren Position sich gegenüber dem Snapshot geändert hat.
    pub fn changes(&self) -> Vec<PositionUpdate> {
        self.current
            .iter()
            .filter(|(h, uv)| self.original.get(*h) != Some(*uv))
            .map(|(&handle, &uv)| PositionUpdate { handle, uv })
            .collect()
    }
}
