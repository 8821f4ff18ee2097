use crate::discovery::scan_descriptors;
use crate::types::NodeId;
use dspw_common::{ProposalError, Result};
use std::collections::BTreeSet;
use std::path::Path;

/// Two disjoint, ordered sets of nodes: those that may be added and those
/// that have been.
///
/// Both sets iterate in ascending order. A node is never in both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeContainer {
    available: BTreeSet<NodeId>,
    assigned: BTreeSet<NodeId>,
}

impl NodeContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a container from raw parts; anything in `assigned` is dropped
    /// from `available`.
    pub fn from_parts(available: BTreeSet<NodeId>, assigned: BTreeSet<NodeId>) -> Self {
        let available = available.difference(&assigned).cloned().collect();
        Self { available, assigned }
    }

    /// Nodes discovered but not yet assigned
    pub fn available(&self) -> &BTreeSet<NodeId> {
        &self.available
    }

    /// Nodes assigned to this container
    pub fn assigned(&self) -> &BTreeSet<NodeId> {
        &self.assigned
    }

    pub fn is_available(&self, node: &str) -> bool {
        self.available.contains(node)
    }

    pub fn is_assigned(&self, node: &str) -> bool {
        self.assigned.contains(node)
    }

    pub fn contains(&self, node: &str) -> bool {
        self.is_available(node) || self.is_assigned(node)
    }

    pub fn len(&self) -> usize {
        self.available.len() + self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty() && self.assigned.is_empty()
    }

    /// State after a fresh scan: `snapshot` replaces the available set,
    /// assignments are kept as they are.
    pub fn rediscovered(&self, snapshot: BTreeSet<NodeId>) -> Self {
        Self::from_parts(snapshot, self.assigned.clone())
    }

    /// Replace the available set with the `*.<extension>` descriptors in `dir`
    pub fn discover(&mut self, dir: &Path, extension: &str) -> Result<()> {
        let snapshot = scan_descriptors(dir, extension)?;
        *self = self.rediscovered(snapshot);
        Ok(())
    }

    /// Move an available node to the assigned set
    pub fn add(&mut self, node: &NodeId) -> Result<()> {
        if !self.available.remove(node) {
            return Err(ProposalError::NotAvailable {
                node: node.to_string(),
            });
        }

        self.assigned.insert(node.clone());
        Ok(())
    }

    /// Move an assigned node back to the available set
    pub fn remove(&mut self, node: &NodeId) -> Result<()> {
        if !self.assigned.remove(node) {
            return Err(ProposalError::NotAssigned {
                node: node.to_string(),
            });
        }

        self.available.insert(node.clone());
        Ok(())
    }
}
