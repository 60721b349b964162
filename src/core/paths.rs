//! Zerlegung einer Komponente in Ketten und Zyklen.
//!
//! Jede Kante wird genau einmal besucht. Offene Ketten starten an Knoten
//! mit Grad 1, alles Übrige wird von der ersten unbesuchten Kante aus in
//! beide Richtungen gelaufen und zusammengesetzt.

use super::quantize::QuantizedKey;
use super::topology::{edge_key, Adjacency};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Benutzer-Vorgabe für den Schleifentyp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopTypeOverride {
    /// Aus der Topologie bestimmen
    #[default]
    Auto,
    /// Immer als offen behandeln
    Open,
    /// Immer als geschlossen behandeln
    Closed,
}

/// Geordnete Schlüsselfolge einer Kette oder eines Zyklus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub keys: Vec<QuantizedKey>,
    /// Laut Lauf geschlossen (erster und letzter Schlüssel benachbart)
    pub closed: bool,
}

impl Path {
    /// Anzahl verschiedener Schlüssel.
    pub fn distinct_count(&self) -> usize {
        self.keys.iter().collect::<HashSet<_>>().len()
    }

    /// Pfade mit höchstens 2 verschiedenen Knoten sind nicht verwendbar.
    pub fn is_degenerate(&self) -> bool {
        self.distinct_count() <= 2
    }

    /// Endgültiger Schleifentyp.
    ///
    /// Bei `Auto` wird ein laut Lauf geschlossener Pfad übernommen; ein
    /// offener wird zu geschlossen hochgestuft, wenn jeder Knoten Grad 2
    /// hat und es mindestens 3 verschiedene Knoten gibt. Die Rückrichtung
    /// (geschlossen → offen) gibt es nicht.
    pub fn classify(&self, sub: &Adjacency, mode: LoopTypeOverride) -> bool {
        match mode {
            LoopTypeOverride::Open => false,
            LoopTypeOverride::Closed => true,
            LoopTypeOverride::Auto => self.closed || self.is_simple_cycle(sub),
        }
    }

    /// Alle Knoten mit Grad 2 und mindestens 3 verschiedene Knoten.
    pub fn is_simple_cycle(&self, sub: &Adjacency) -> bool {
        self.distinct_count() >= 3 && self.keys.iter().all(|&k| sub.degree(k) == 2)
    }
}

struct Walker<'a> {
    sub: &'a Adjacency,
    visited: HashSet<(QuantizedKey, QuantizedKey)>,
}

impl<'a> Walker<'a> {
    /// Markiert die Kante; `false` wenn sie schon besucht war.
    fn visit(&mut self, a: QuantizedKey, b: QuantizedKey) -> bool {
        self.visited.insert(edge_key(a, b))
    }

    fn is_visited(&self, a: QuantizedKey, b: QuantizedKey) -> bool {
        self.visited.contains(&edge_key(a, b))
    }

    /// Läuft von `current` weg (nicht zurück nach `previous`), jeweils über
    /// den ersten Nachbarn mit unbesuchter Kante. Liefert die Knoten nach
    /// `current`.
    fn walk(&mut self, mut current: QuantizedKey, mut previous: QuantizedKey) -> Vec<QuantizedKey> {
        let mut order = Vec::new();
        loop {
            let next = self
                .sub
                .neighbors(current)
                .find(|&n| n != previous && !self.is_visited(current, n));
            let Some(next) = next else {
                break;
            };
            self.visit(current, next);
            order.push(next);
            previous = current;
            current = next;
        }
        order
    }
}

/// Zerlegt eine Komponente in Pfade.
///
/// 1. Für jeden Knoten mit Grad 1 (Einfügereihenfolge) über die einzige
///    Kante vorwärts laufen → offener Pfad.
/// 2. Für jede noch unbesuchte Kante `a–b`: von `b` vorwärts und von `a`
///    rückwärts laufen, zusammensetzen. Endet der Lauf wieder am Start,
///    wird der doppelte Schlüssel entfernt. Geschlossen, wenn erster und
///    letzter Schlüssel benachbart sind.
pub fn extract_paths_from_component(sub: &Adjacency) -> Vec<Path> {
    let mut walker = Walker {
        sub,
        visited: HashSet::new(),
    };
    let mut paths = Vec::new();

    let endpoints: Vec<QuantizedKey> = sub.keys().filter(|&k| sub.degree(k) == 1).collect();
    for start in endpoints {
        let Some(next) = sub.neighbors(start).next() else {
            continue;
        };
        if !walker.visit(start, next) {
            continue;
        }
        let mut keys = vec![start, next];
        keys.extend(walker.walk(next, start));
        paths.push(Path {
            keys,
            closed: false,
        });
    }

    let all_keys: Vec<QuantizedKey> = sub.keys().collect();
    for a in all_keys {
        let neighbors: Vec<QuantizedKey> = sub.neighbors(a).collect();
        for b in neighbors {
            if !walker.visit(a, b) {
                continue;
            }
            let right = walker.walk(b, a);
            let left = walker.walk(a, b);

            let mut keys: Vec<QuantizedKey> = left.into_iter().rev().collect();
            keys.push(a);
            keys.push(b);
            keys.extend(right);
            if keys.len() > 1 && keys.first() == keys.last() {
                keys.pop();
            }
            let closed = match (keys.first(), keys.last()) {
                (Some(&first), Some(&last)) if keys.len() >= 3 => sub.are_adjacent(last, first),
                _ => false,
            };
            paths.push(Path { keys, closed });
        }
    }

    log::debug!("Komponente zerlegt: {} Pfad(e)", paths.len());
    paths
}

/// Schlüssel, die entlang eines Pfads nicht bewegt werden dürfen:
/// Enden offener Pfade und alle Knoten mit Grad ≠ 2.
pub fn pinned_keys(path: &[QuantizedKey], closed: bool, sub: &Adjacency) -> IndexSet<QuantizedKey> {
    let mut pinned: IndexSet<QuantizedKey> = IndexSet::new();
    if !closed {
        if let (Some(&first), Some(&last)) = (path.first(), path.last()) {
            pinned.insert(first);
            pinned.insert(last);
        }
    }
    pinned.extend(path.iter().copied().filter(|&k| sub.degree(k) != 2));
    pinned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k(i: i64) -> QuantizedKey {
        QuantizedKey::new(i, 0)
    }

    fn graph(edges: &[(i64, i64)]) -> Adjacency {
        let mut adj = Adjacency::default();
        for &(a, b) in edges {
            adj.connect(k(a), k(b));
        }
        adj
    }

    #[test]
    fn chain_of_three_is_one_open_path() {
        let sub = graph(&[(1, 2), (2, 3)]);
        let paths = extract_paths_from_component(&sub);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].keys, vec![k(1), k(2), k(3)]);
        assert!(!paths[0].closed);
        assert!(!paths[0].is_degenerate());
    }

    #[test]
    fn triangle_is_one_closed_path() {
        let sub = graph(&[(1, 2), (2, 3), (3, 1)]);
        let paths = extract_paths_from_component(&sub);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].keys.len(), 3);
        assert!(paths[0].closed);
        assert!(paths[0].classify(&sub, LoopTypeOverride::Auto));
    }

    #[test]
    fn every_edge_is_used_exactly_once() {
        // Zwei Dreiecke mit gemeinsamem Knoten 3 plus ein Ast
        let sub = graph(&[(1, 2), (2, 3), (3, 1), (3, 4), (4, 5), (5, 3), (5, 6)]);
        let paths = extract_paths_from_component(&sub);
        let mut used = HashSet::new();
        for path in &paths {
            for w in path.keys.windows(2) {
                assert!(used.insert(edge_key(w[0], w[1])), "Kante doppelt");
            }
            if path.closed {
                let closing = edge_key(path.keys[path.keys.len() - 1], path.keys[0]);
                assert!(used.insert(closing), "Schlusskante doppelt");
            }
        }
        assert_eq!(used.len(), sub.edge_count());
    }

    #[test]
    fn single_edge_is_degenerate() {
        let sub = graph(&[(1, 2)]);
        let paths = extract_paths_from_component(&sub);
        assert_eq!(paths.len(), 1);
        assert!(paths[0].is_degenerate());
    }

    #[test]
    fn override_wins_and_auto_never_downgrades() {
        let sub = graph(&[(1, 2), (2, 3), (3, 1)]);
        let path = Path {
            keys: vec![k(1), k(2), k(3)],
            closed: true,
        };
        assert!(!path.classify(&sub, LoopTypeOverride::Open));
        // Offen markiert, aber reiner Zyklus → hochgestuft
        let flagged_open = Path {
            closed: false,
            ..path.clone()
        };
        assert!(flagged_open.classify(&sub, LoopTypeOverride::Auto));

        let chain = graph(&[(1, 2), (2, 3)]);
        assert!(path.classify(&chain, LoopTypeOverride::Auto));
        let open_chain = Path {
            closed: false,
            ..path
        };
        assert!(!open_chain.classify(&chain, LoopTypeOverride::Auto));
        assert!(open_chain.classify(&chain, LoopTypeOverride::Closed));
    }

    #[test]
    fn pinned_keys_include_ends_and_junctions() {
        let sub = graph(&[(1, 2), (2, 3), (2, 4)]);
        let pinned = pinned_keys(&[k(1), k(2), k(3)], false, &sub);
        assert!(pinned.contains(&k(1)));
        assert!(pinned.contains(&k(2)));
        assert!(pinned.contains(&k(3)));

        let ring = graph(&[(1, 2), (2, 3), (3, 1)]);
        assert!(pinned_keys(&[k(1), k(2), k(3)], true, &ring).is_empty());
    }
}
