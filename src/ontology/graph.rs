use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::value_objects::Iri;
use crate::errors::{Error, Result};

/// Directed graph over ontology node ids.
///
/// An edge `from -> to` states that `from` is a subclass of `to` (or, for a
/// property node, that `to` is its domain). The edge target is the ancestor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyGraph {
    nodes: BTreeSet<Iri>,
    edges: BTreeMap<Iri, BTreeSet<Iri>>,
}

impl OntologyGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node without edges. Returns `false` if it was already known.
    pub fn add_node(&mut self, id: Iri) -> bool {
        self.nodes.insert(id)
    }

    /// Adds an edge from a descendant to its ancestor, registering both ends.
    ///
    /// Returns `false` if the edge already existed.
    pub fn add_edge(&mut self, from: Iri, to: Iri) -> bool {
        self.nodes.insert(from.clone());
        self.nodes.insert(to.clone());
        self.edges.entry(from).or_default().insert(to)
    }

    /// Builder variant of [`Self::add_edge`].
    #[must_use]
    pub fn with_edge(mut self, from: Iri, to: Iri) -> Self {
        self.add_edge(from, to);
        self
    }

    /// Whether `id` is a node of the graph.
    #[must_use]
    pub fn contains(&self, id: &Iri) -> bool {
        self.nodes.contains(id)
    }

    /// Direct ancestors of `id` in ascending identifier order.
    pub fn parents<'a>(&'a self, id: &Iri) -> impl Iterator<Item = &'a Iri> + 'a {
        self.edges.get(id).into_iter().flatten()
    }

    /// All nodes in ascending identifier order.
    pub fn nodes(&self) -> impl Iterator<Item = &Iri> {
        self.nodes.iter()
    }

    /// All edges as `(descendant, ancestor)` pairs, sorted.
    pub fn edges(&self) -> impl Iterator<Item = (&Iri, &Iri)> {
        self.edges
            .iter()
            .flat_map(|(from, targets)| targets.iter().map(move |to| (from, to)))
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of distinct edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// Orders every node so that ancestors precede their descendants.
    ///
    /// Among nodes that are ready at the same time the lexically smallest goes
    /// first, so the order is a pure function of the graph.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cycle`] with one offending path when the graph is not
    /// acyclic.
    pub fn topological_order(&self) -> Result<Vec<Iri>> {
        let mut pending: BTreeMap<&Iri, usize> =
            self.nodes.iter().map(|node| (node, 0)).collect();
        let mut children: BTreeMap<&Iri, Vec<&Iri>> = BTreeMap::new();
        for (from, to) in self.edges() {
            *pending.entry(from).or_default() += 1;
            children.entry(to).or_default().push(from);
        }

        let mut ready: BTreeSet<&Iri> = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(node, _)| *node)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(node) = ready.pop_first() {
            order.push(node.clone());
            for child in children.get(node).into_iter().flatten() {
                if let Some(count) = pending.get_mut(child) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(*child);
                    }
                }
            }
        }

        if order.len() < self.nodes.len() {
            let blocked: BTreeSet<&Iri> = pending
                .into_iter()
                .filter(|(_, count)| *count > 0)
                .map(|(node, _)| node)
                .collect();
            return Err(Error::Cycle {
                path: self.cycle_through(&blocked),
            });
        }

        Ok(order)
    }

    /// Walks ancestor edges inside `blocked` until a node repeats.
    ///
    /// Every blocked node still waits on at least one blocked parent, so the
    /// walk always closes a loop.
    fn cycle_through(&self, blocked: &BTreeSet<&Iri>) -> Vec<Iri> {
        let Some(start) = blocked.first() else {
            return Vec::new();
        };

        let mut path: Vec<&Iri> = Vec::new();
        let mut seen: BTreeMap<&Iri, usize> = BTreeMap::new();
        let mut current: &Iri = start;
        loop {
            if let Some(&position) = seen.get(current) {
                let mut cycle: Vec<Iri> = path[position..].iter().map(|&iri| iri.clone()).collect();
                cycle.push(current.clone());
                return cycle;
            }
            seen.insert(current, path.len());
            path.push(current);

            match self.parents(current).find(|parent| blocked.contains(parent)) {
                Some(parent) => current = parent,
                None => return path.into_iter().cloned().collect(),
            }
        }
    }
}
