//! Directed graph of legal status changes.

use super::{Status, StatusId, Transition};
use std::collections::BTreeSet;

/// In-memory view of a project's transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusGraph {
    edges: BTreeSet<Transition>,
}

/// Edits needed to replace a status's destination set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationChange {
    /// Transitions to delete.
    pub removed: Vec<Transition>,
    /// Transitions to create.
    pub added: Vec<Transition>,
}

impl DestinationChange {
    /// Returns `true` when nothing changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

impl StatusGraph {
    /// Builds a graph from stored transitions.
    #[must_use]
    pub fn new(transitions: impl IntoIterator<Item = Transition>) -> Self {
        Self {
            edges: transitions.into_iter().collect(),
        }
    }

    /// Returns every ordered pair of `statuses`, self loops included.
    #[must_use]
    pub fn complete(statuses: &[Status]) -> Vec<Transition> {
        statuses
            .iter()
            .flat_map(|source| {
                statuses
                    .iter()
                    .map(move |destination| Transition::new(source.id, destination.id))
            })
            .collect()
    }

    /// Returns `true` iff a transition `from -> to` exists.
    #[must_use]
    pub fn can_change_to(&self, from: StatusId, to: StatusId) -> bool {
        self.edges.contains(&Transition::new(from, to))
    }

    /// Returns the statuses reachable from `source` in one move.
    #[must_use]
    pub fn destinations(&self, source: StatusId) -> BTreeSet<StatusId> {
        self.edges
            .iter()
            .filter(|edge| edge.source == source)
            .map(|edge| edge.destination)
            .collect()
    }

    /// Plans replacing the destinations of `source` with `wanted`.
    ///
    /// Only the set difference is touched: destinations no longer wanted are
    /// removed and new ones are added.
    #[must_use]
    pub fn plan_destinations(
        &self,
        source: StatusId,
        wanted: &BTreeSet<StatusId>,
    ) -> DestinationChange {
        let current = self.destinations(source);
        DestinationChange {
            removed: current
                .difference(wanted)
                .map(|destination| Transition::new(source, *destination))
                .collect(),
            added: wanted
                .difference(&current)
                .map(|destination| Transition::new(source, *destination))
                .collect(),
        }
    }

    /// Applies a planned change.
    pub fn apply(&mut self, change: &DestinationChange) {
        for edge in &change.removed {
            self.edges.remove(edge);
        }
        self.edges.extend(change.added.iter().copied());
    }

    /// Returns the number of transitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` when the graph has no transitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
