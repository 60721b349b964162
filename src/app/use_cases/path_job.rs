//! Lesen und Schreiben eines Pfads über den Weld-Arbeitsstand.

use crate::core::{pinned_keys, Adjacency, QuantizedKey, Tolerances, TopologyGraph, UvHandle, UvWorkspace};
use crate::error::{EngineError, SkipReason};
use crate::shared::options::ARC_LENGTH_FLOOR;
use crate::Point2;
use std::collections::HashSet;

/// Ein klassifizierter Pfad innerhalb eines Containers.
pub(crate) struct PathJob<'a> {
    pub graph: &'a TopologyGraph,
    pub sub: &'a Adjacency,
    pub keys: &'a [QuantizedKey],
    pub closed: bool,
    pub tolerances: Tolerances,
}

impl<'a> PathJob<'a> {
    /// Erster Handle eines Schlüssels; dessen Position gilt für den Knoten.
    fn representative(&self, key: QuantizedKey) -> Result<UvHandle, EngineError> {
        self.graph
            .handles(key)
            .first()
            .copied()
            .ok_or(EngineError::MissingHandles(key))
    }

    /// Aktuelle Positionen entlang des Pfads.
    pub fn read_points(&self, ws: &UvWorkspace) -> Result<Vec<Point2>, EngineError> {
        self.keys
            .iter()
            .map(|&k| ws.position(self.representative(k)?))
            .collect()
    }

    /// `true` für Schlüssel, die bewegt werden dürfen.
    pub fn movable_mask(&self) -> Vec<bool> {
        let pinned = pinned_keys(self.keys, self.closed, self.sub);
        self.keys.iter().map(|k| !pinned.contains(k)).collect()
    }

    /// Schreibt neue Positionen (eine pro Pfad-Index) inklusive Weld-Propagation.
    ///
    /// Mit `mask` werden nur markierte Indizes geschrieben. Jeder Weld-Schlüssel,
    /// dessen gerundete Position sich ändert, landet in `moved`.
    pub fn write(
        &self,
        ws: &mut UvWorkspace,
        new_points: &[Point2],
        mask: Option<&[bool]>,
        moved: &mut HashSet<QuantizedKey>,
    ) -> Result<(), EngineError> {
        let weld = self.tolerances.weld;
        let before = self.read_points(ws)?;
        let mut applied = HashSet::new();

        for (i, (&key, &uv)) in self.keys.iter().zip(new_points).enumerate() {
            if mask.is_some_and(|m| !m[i]) {
                continue;
            }
            let old_key = weld.key(before[i]);
            if old_key != weld.key(uv) {
                moved.insert(old_key);
            }
            for &handle in self.graph.handles(key) {
                ws.set_welded(handle, uv, &weld, &mut applied)?;
            }
        }
        Ok(())
    }

    /// 3D-Abstand zweier Pfad-Knoten über die Vertex-Positionen.
    fn span_from_positions(&self, ws: &UvWorkspace, a: QuantizedKey, b: QuantizedKey) -> Option<f64> {
        let pa = ws.position_3d(*self.graph.handles(a).first()?)?;
        let pb = ws.position_3d(*self.graph.handles(b).first()?)?;
        Some(pa.distance(pb))
    }

    /// Kumulierte 3D-Längenanteile für jeden deduplizierten Punkt.
    ///
    /// `index_map` ordnet Pfad-Index → deduplizierter Index; jeder
    /// deduplizierte Punkt nimmt den Anteil seines ersten Pfad-Index.
    /// Offene Pfade enden immer exakt bei 1. Fehlt bei geschlossenen Pfaden
    /// die Schluss-Kante, zählt der Abstand der Vertex-Positionen.
    pub fn fractions_3d(
        &self,
        ws: &UvWorkspace,
        index_map: &[usize],
        dedup_len: usize,
    ) -> Result<Vec<f64>, SkipReason> {
        let n = self.keys.len();
        let mut cumulative = Vec::with_capacity(n);
        let mut acc = 0.0;
        cumulative.push(acc);
        for w in self.keys.windows(2) {
            acc += self
                .graph
                .length_3d(w[0], w[1])
                .ok_or(SkipReason::MissingLength3d)?;
            cumulative.push(acc);
        }
        let total = if self.closed && n >= 2 {
            let (last, first) = (self.keys[n - 1], self.keys[0]);
            acc + self
                .graph
                .length_3d(last, first)
                .or_else(|| self.span_from_positions(ws, last, first))
                .ok_or(SkipReason::MissingLength3d)?
        } else {
            acc
        };
        if total <= ARC_LENGTH_FLOOR {
            return Err(SkipReason::ZeroLength3d);
        }

        let mut first_index: Vec<Option<usize>> = vec![None; dedup_len];
        for (i, &j) in index_map.iter().enumerate() {
            if let Some(slot) = first_index.get_mut(j) {
                slot.get_or_insert(i);
            }
        }
        let mut fractions: Vec<f64> = first_index
            .iter()
            .map(|i| cumulative[i.unwrap_or(0)] / total)
            .collect();
        if !self.closed {
            if let Some(last) = fractions.last_mut() {
                *last = 1.0;
            }
        }
        Ok(fractions)
    }
}
