//! Ungerichteter Topologie-Graph über quantisierte UV-Schlüssel.
//!
//! Knoten sind Graph-Schlüssel, Kanten die selektierten UV-Kanten.
//! Alle Maps sind `IndexMap`/`IndexSet`, damit die Pfad-Extraktion der
//! Einfügereihenfolge folgt und reproduzierbar bleibt.

use super::quantize::{QuantizedKey, Quantizer};
use super::selection::{SelectedEdge, UvHandle};
use indexmap::{IndexMap, IndexSet};

/// Kanonisches Schlüsselpaar einer ungerichteten Kante.
pub(crate) fn edge_key(a: QuantizedKey, b: QuantizedKey) -> (QuantizedKey, QuantizedKey) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Adjazenzliste: Schlüssel → Nachbarn in Einfügereihenfolge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Adjacency {
    nodes: IndexMap<QuantizedKey, IndexSet<QuantizedKey>>,
}

impl Adjacency {
    /// Fügt eine ungerichtete Kante ein. Selbst-Kanten werden ignoriert.
    pub fn connect(&mut self, a: QuantizedKey, b: QuantizedKey) -> bool {
        if a == b {
            return false;
        }
        self.nodes.entry(a).or_default().insert(b);
        self.nodes.entry(b).or_default().insert(a);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(IndexSet::len).sum::<usize>() / 2
    }

    pub fn contains(&self, key: QuantizedKey) -> bool {
        self.nodes.contains_key(&key)
    }

    /// Alle Knoten in Einfügereihenfolge.
    pub fn keys(&self) -> impl Iterator<Item = QuantizedKey> + '_ {
        self.nodes.keys().copied()
    }

    /// Nachbarn eines Knotens (leer für unbekannte Knoten).
    pub fn neighbors(&self, key: QuantizedKey) -> impl Iterator<Item = QuantizedKey> + '_ {
        self.nodes.get(&key).into_iter().flatten().copied()
    }

    pub fn degree(&self, key: QuantizedKey) -> usize {
        self.nodes.get(&key).map_or(0, IndexSet::len)
    }

    pub fn are_adjacent(&self, a: QuantizedKey, b: QuantizedKey) -> bool {
        self.nodes.get(&a).is_some_and(|ns| ns.contains(&b))
    }

    /// Zusammenhangskomponenten, Startknoten in Einfügereihenfolge.
    pub fn connected_components(&self) -> Vec<IndexSet<QuantizedKey>> {
        let mut seen: IndexSet<QuantizedKey> = IndexSet::new();
        let mut components = Vec::new();

        for start in self.keys() {
            if seen.contains(&start) {
                continue;
            }
            let mut component = IndexSet::new();
            let mut stack = vec![start];
            seen.insert(start);
            while let Some(current) = stack.pop() {
                component.insert(current);
                for next in self.neighbors(current) {
                    if seen.insert(next) {
                        stack.push(next);
                    }
                }
            }
            components.push(component);
        }
        components
    }

    /// Teilgraph auf den Knoten von `component`.
    ///
    /// Die Knotenreihenfolge bleibt die des Gesamtgraphen.
    pub fn restricted_to(&self, component: &IndexSet<QuantizedKey>) -> Adjacency {
        let nodes = self
            .nodes
            .iter()
            .filter(|(key, _)| component.contains(*key))
            .map(|(&key, ns)| {
                let inner: IndexSet<QuantizedKey> =
                    ns.iter().copied().filter(|n| component.contains(n)).collect();
                (key, inner)
            })
            .collect();
        Adjacency { nodes }
    }
}

/// Topologie-Graph eines Containers.
#[derive(Debug, Clone, Default)]
pub struct TopologyGraph {
    adjacency: Adjacency,
    /// Schlüssel → alle Handles, die auf diesen Schlüssel fallen
    handles: IndexMap<QuantizedKey, Vec<UvHandle>>,
    /// Kanonisches Schlüsselpaar → 3D-Länge (erste gelieferte gewinnt)
    lengths_3d: IndexMap<(QuantizedKey, QuantizedKey), f64>,
    ignored_self_loops: usize,
}

impl TopologyGraph {
    /// Baut den Graph aus den selektierten Kanten.
    ///
    /// Eine Kante, deren Endpunkte auf denselben Schlüssel fallen, trägt
    /// keine Topologie bei; ihre Handles werden trotzdem zugeordnet.
    pub fn build(edges: &[SelectedEdge], graph: &Quantizer) -> Self {
        let mut result = Self::default();

        for edge in edges {
            let ka = graph.key(edge.uv_a);
            let kb = graph.key(edge.uv_b);
            result.push_handle(ka, edge.handle_a);
            result.push_handle(kb, edge.handle_b);

            if !result.adjacency.connect(ka, kb) {
                result.ignored_self_loops += 1;
                continue;
            }
            if let Some(length) = edge.length_3d {
                result.lengths_3d.entry(edge_key(ka, kb)).or_insert(length);
            }
        }

        log::debug!(
            "Topologie-Graph: {} Knoten, {} Kanten, {} Selbst-Kanten ignoriert",
            result.adjacency.node_count(),
            result.adjacency.edge_count(),
            result.ignored_self_loops
        );
        result
    }

    fn push_handle(&mut self, key: QuantizedKey, handle: UvHandle) {
        let list = self.handles.entry(key).or_default();
        if !list.contains(&handle) {
            list.push(handle);
        }
    }

    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Handles eines Schlüssels (leer, wenn keiner zugeordnet ist).
    pub fn handles(&self, key: QuantizedKey) -> &[UvHandle] {
        self.handles.get(&key).map_or(&[], Vec::as_slice)
    }

    /// 3D-Länge der Kante `a–b`, falls geliefert.
    pub fn length_3d(&self, a: QuantizedKey, b: QuantizedKey) -> Option<f64> {
        self.lengths_3d.get(&edge_key(a, b)).copied()
    }

    pub fn ignored_self_loops(&self) -> usize {
        self.ignored_self_loops
    }

    pub fn connected_components(&self) -> Vec<IndexSet<QuantizedKey>> {
        self.adjacency.connected_components()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point2;

    fn edge(a: (f64, f64), b: (f64, f64), ha: u64, hb: u64) -> SelectedEdge {
        SelectedEdge::new(
            Point2::new(a.0, a.1),
            Point2::new(b.0, b.1),
            UvHandle(ha),
            UvHandle(hb),
        )
    }

    #[test]
    fn shared_endpoints_merge_into_one_node() {
        let q = Quantizer::new(1e-6);
        let edges = [
            edge((0.0, 0.0), (0.5, 0.0), 1, 2),
            edge((0.5, 1e-8), (1.0, 0.0), 3, 4),
        ];
        let graph = TopologyGraph::build(&edges, &q);
        assert_eq!(graph.adjacency().node_count(), 3);
        assert_eq!(graph.adjacency().edge_count(), 2);
        let mid = q.key(Point2::new(0.5, 0.0));
        assert_eq!(graph.adjacency().degree(mid), 2);
        assert_eq!(graph.handles(mid), &[UvHandle(2), UvHandle(3)]);
    }

    #[test]
    fn self_loop_adds_no_topology() {
        let q = Quantizer::new(1e-3);
        let edges = [edge((0.1, 0.1), (0.1001, 0.1), 1, 2)];
        let graph = TopologyGraph::build(&edges, &q);
        assert!(graph.is_empty());
        assert_eq!(graph.ignored_self_loops(), 1);
        assert_eq!(graph.handles(q.key(Point2::new(0.1, 0.1))).len(), 2);
    }

    #[test]
    fn duplicate_edges_collapse_and_keep_first_length() {
        let q = Quantizer::new(1e-6);
        let edges = [
            edge((0.0, 0.0), (1.0, 0.0), 1, 2).with_length_3d(2.0),
            edge((1.0, 0.0), (0.0, 0.0), 3, 4).with_length_3d(5.0),
        ];
        let graph = TopologyGraph::build(&edges, &q);
        assert_eq!(graph.adjacency().edge_count(), 1);
        let a = q.key(Point2::new(0.0, 0.0));
        let b = q.key(Point2::new(1.0, 0.0));
        assert_eq!(graph.length_3d(b, a), Some(2.0));
    }

    #[test]
    fn components_are_separated() {
        let q = Quantizer::new(1e-6);
        let edges = [
            edge((0.0, 0.0), (0.1, 0.0), 1, 2),
            edge((0.1, 0.0), (0.2, 0.0), 3, 4),
            edge((0.5, 0.5), (0.6, 0.5), 5, 6),
        ];
        let graph = TopologyGraph::build(&edges, &q);
        let comps = graph.connected_components();
        assert_eq!(comps.len(), 2);
        assert_eq!(comps[0].len(), 3);
        assert_eq!(comps[1].len(), 2);

        let sub = graph.adjacency().restricted_to(&comps[1]);
        assert_eq!(sub.node_count(), 2);
        assert_eq!(sub.edge_count(), 1);
    }
}
