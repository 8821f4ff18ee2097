use crate::discovery::scan_role_dirs;
use crate::node::NodeContainer;
use crate::registry::RoleRegistry;
use crate::role::Role;
use crate::types::*;
use crate::ClusterConfig;
use dspw_common::{ProposalError, Result};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Outcome of a role discovery pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleDiscovery {
    /// Roles instantiated, in token order
    pub discovered: Vec<RoleKind>,

    /// `role-*` directories the registry does not know
    pub unsupported: Vec<String>,
}

/// A proposal's cluster: the nodes it may contain, the nodes it does
/// contain, and the roles those nodes can take.
///
/// Every role's nodes are kept a subset of the cluster's assigned nodes.
#[derive(Debug, Clone)]
pub struct Cluster {
    config: ClusterConfig,
    registry: RoleRegistry,
    nodes: NodeContainer,
    roles: BTreeMap<RoleKind, Role>,
    unsupported_roles: Vec<String>,
}

impl Cluster {
    /// Open the proposal tree described by `config` and discover its nodes
    /// and roles
    pub fn open(config: ClusterConfig, registry: RoleRegistry) -> Result<Self> {
        config.validate()?;

        info!("Opening proposal: {}", config.proposal_dir.display());

        let mut cluster = Self {
            config,
            registry,
            nodes: NodeContainer::new(),
            roles: BTreeMap::new(),
            unsupported_roles: Vec::new(),
        };

        cluster.discover_nodes()?;
        cluster.discover_roles()?;

        info!(
            "Proposal opened: nodes={}, roles={}",
            cluster.nodes.available().len(),
            cluster.roles.len()
        );

        Ok(cluster)
    }

    /// Rescan cluster node descriptors. Assigned nodes stay assigned.
    pub fn discover_nodes(&mut self) -> Result<()> {
        self.nodes.discover(
            &self.config.cluster_descriptor_dir(),
            &self.config.descriptor_extension,
        )?;

        debug!("Discovered {} available node(s)", self.nodes.available().len());

        Ok(())
    }

    /// Rebuild the role collection from the `role-*` directories of the
    /// proposal tree.
    ///
    /// Unknown tokens are reported and skipped. Role assignments made before
    /// the call are discarded.
    pub fn discover_roles(&mut self) -> Result<RoleDiscovery> {
        let dirs = scan_role_dirs(&self.config.proposal_dir, ROLE_PREFIX)?;

        let mut roles = BTreeMap::new();
        let mut report = RoleDiscovery::default();

        for (token, path) in dirs {
            let kind = match self.registry.lookup(&token) {
                Ok(kind) => kind,
                Err(e) => {
                    warn!("{}", e);
                    report.unsupported.push(token);
                    continue;
                }
            };

            let mut role = Role::new(kind, path);
            role.discover_nodes(self.nodes.assigned(), &self.config)?;
            roles.insert(kind, role);
            report.discovered.push(kind);
        }

        self.roles = roles;
        self.unsupported_roles = report.unsupported.clone();

        debug!(
            "Discovered {} role(s), {} unsupported",
            report.discovered.len(),
            report.unsupported.len()
        );

        Ok(report)
    }

    /// Rescan nodes, then roles
    pub fn discover(&mut self) -> Result<RoleDiscovery> {
        self.discover_nodes()?;
        self.discover_roles()
    }

    /// Assign an available node to the cluster and resync every role
    pub fn add(&mut self, node: &NodeId) -> Result<()> {
        let mut nodes = self.nodes.clone();
        nodes.add(node)?;
        self.commit(nodes)?;

        info!("Added node to cluster: {}", node);
        Ok(())
    }

    /// Return an assigned node to the available set and resync every role
    pub fn remove(&mut self, node: &NodeId) -> Result<()> {
        let mut nodes = self.nodes.clone();
        nodes.remove(node)?;
        self.commit(nodes)?;

        info!("Removed node from cluster: {}", node);
        Ok(())
    }

    /// Reapply a saved cluster assignment. All nodes must be available;
    /// otherwise nothing changes.
    pub fn restore<'a, I>(&mut self, assigned: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a NodeId>,
    {
        let mut nodes = self.nodes.clone();
        for node in assigned {
            nodes.add(node)?;
        }
        self.commit(nodes)?;

        info!("Restored {} assigned node(s)", self.nodes.assigned().len());
        Ok(())
    }

    /// Give `node` the role `kind`. The node must be offered by that role.
    pub fn assign_role(&mut self, kind: RoleKind, node: &NodeId) -> Result<()> {
        self.role_mut(kind)?.add(node)?;
        info!("Assigned {} to {}", node, kind);
        Ok(())
    }

    /// Take the role `kind` away from `node`
    pub fn unassign_role(&mut self, kind: RoleKind, node: &NodeId) -> Result<()> {
        self.role_mut(kind)?.remove(node)?;
        info!("Unassigned {} from {}", node, kind);
        Ok(())
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    pub fn registry(&self) -> &RoleRegistry {
        &self.registry
    }

    pub fn nodes(&self) -> &NodeContainer {
        &self.nodes
    }

    pub fn available(&self) -> &BTreeSet<NodeId> {
        self.nodes.available()
    }

    pub fn assigned(&self) -> &BTreeSet<NodeId> {
        self.nodes.assigned()
    }

    /// Roles in token order
    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }

    pub fn role(&self, kind: RoleKind) -> Option<&Role> {
        self.roles.get(&kind)
    }

    pub fn role_kinds(&self) -> Vec<RoleKind> {
        self.roles.keys().copied().collect()
    }

    /// `role-*` directories skipped by the last role discovery
    pub fn unsupported_roles(&self) -> &[String] {
        &self.unsupported_roles
    }

    pub fn snapshot(&self) -> ClusterSnapshot {
        ClusterSnapshot {
            proposal_dir: self.config.proposal_dir.clone(),
            available: self.nodes.available().iter().cloned().collect(),
            assigned: self.nodes.assigned().iter().cloned().collect(),
            roles: self.roles.values().map(Role::snapshot).collect(),
            unsupported_roles: self.unsupported_roles.clone(),
        }
    }

    fn role_mut(&mut self, kind: RoleKind) -> Result<&mut Role> {
        self.roles
            .get_mut(&kind)
            .ok_or_else(|| ProposalError::RoleNotFound {
                role: kind.token(),
            })
    }

    /// Install new cluster membership and the role membership it implies.
    /// Roles are rescanned first so a failed scan changes nothing.
    fn commit(&mut self, nodes: NodeContainer) -> Result<()> {
        let synced = self
            .roles
            .values()
            .map(|role| -> Result<(RoleKind, NodeContainer)> {
                Ok((role.kind(), role.synced(nodes.assigned(), &self.config)?))
            })
            .collect::<Result<Vec<_>>>()?;

        self.nodes = nodes;
        for (kind, role_nodes) in synced {
            if let Some(role) = self.roles.get_mut(&kind) {
                role.set_nodes(role_nodes);
            }
        }

        Ok(())
    }
}
