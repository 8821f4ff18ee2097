use crate::discovery::{descriptor_exists, scan_descriptors};
use crate::node::NodeContainer;
use crate::types::{NodeId, RoleKind, RoleSnapshot};
use crate::ClusterConfig;
use dspw_common::Result;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Extra artifact a node needs before a role may offer it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prerequisite {
    /// `<role>/stack/default/ceph/minions/<node>.yml` must exist
    MinionDescriptor,
}

impl Prerequisite {
    pub fn is_met(self, role_dir: &Path, node: &NodeId, config: &ClusterConfig) -> bool {
        match self {
            Prerequisite::MinionDescriptor => descriptor_exists(
                &config.minion_descriptor_dir(role_dir),
                node,
                &config.minion_extension,
            ),
        }
    }
}

/// Per-kind prerequisites. Kinds not listed only need cluster membership.
const PREREQUISITES: &[(RoleKind, Prerequisite)] =
    &[(RoleKind::Mon, Prerequisite::MinionDescriptor)];

impl RoleKind {
    pub fn prerequisites(self) -> impl Iterator<Item = Prerequisite> {
        PREREQUISITES
            .iter()
            .filter(move |(kind, _)| *kind == self)
            .map(|(_, prerequisite)| *prerequisite)
    }
}

/// A role discovered in the proposal tree, holding the cluster nodes that
/// may take it (available) and those that do (assigned).
#[derive(Debug, Clone)]
pub struct Role {
    kind: RoleKind,
    path: PathBuf,
    nodes: NodeContainer,
}

impl Role {
    pub fn new<P: Into<PathBuf>>(kind: RoleKind, path: P) -> Self {
        Self {
            kind,
            path: path.into(),
            nodes: NodeContainer::new(),
        }
    }

    pub fn kind(&self) -> RoleKind {
        self.kind
    }

    /// Role directory this role was discovered from
    pub fn path(&self) -> &Path {
        &self.path
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

    /// Whether `node` may be in this role at all, given the cluster's members
    pub fn is_eligible(
        &self,
        node: &NodeId,
        cluster_assigned: &BTreeSet<NodeId>,
        config: &ClusterConfig,
    ) -> bool {
        cluster_assigned.contains(node)
            && self
                .kind
                .prerequisites()
                .all(|prerequisite| prerequisite.is_met(&self.path, node, config))
    }

    /// Role membership recomputed from `scanned` role descriptors.
    ///
    /// Assigned nodes that left the cluster (or lost their prerequisite)
    /// silently drop out; everything else scanned and eligible is offered.
    pub fn resynced(
        &self,
        scanned: &BTreeSet<NodeId>,
        cluster_assigned: &BTreeSet<NodeId>,
        config: &ClusterConfig,
    ) -> NodeContainer {
        let assigned: BTreeSet<NodeId> = self
            .nodes
            .assigned()
            .iter()
            .filter(|node| self.is_eligible(node, cluster_assigned, config))
            .cloned()
            .collect();

        let available: BTreeSet<NodeId> = scanned
            .iter()
            .filter(|node| self.is_eligible(node, cluster_assigned, config))
            .cloned()
            .collect();

        NodeContainer::from_parts(available, assigned)
    }

    /// Scan this role's descriptors and return the membership it would have
    /// against `cluster_assigned`, without applying it.
    pub fn synced(
        &self,
        cluster_assigned: &BTreeSet<NodeId>,
        config: &ClusterConfig,
    ) -> Result<NodeContainer> {
        let scanned = scan_descriptors(
            &config.role_descriptor_dir(&self.path),
            &config.descriptor_extension,
        )?;

        Ok(self.resynced(&scanned, cluster_assigned, config))
    }

    /// Rescan this role's descriptors and intersect them with the cluster's
    /// assigned nodes
    pub fn discover_nodes(
        &mut self,
        cluster_assigned: &BTreeSet<NodeId>,
        config: &ClusterConfig,
    ) -> Result<()> {
        self.nodes = self.synced(cluster_assigned, config)?;

        tracing::debug!(
            "Synced {}: available={}, assigned={}",
            self.kind,
            self.nodes.available().len(),
            self.nodes.assigned().len()
        );

        Ok(())
    }

    pub(crate) fn set_nodes(&mut self, nodes: NodeContainer) {
        self.nodes = nodes;
    }

    pub fn add(&mut self, node: &NodeId) -> Result<()> {
        self.nodes.add(node)
    }

    pub fn remove(&mut self, node: &NodeId) -> Result<()> {
        self.nodes.remove(node)
    }

    pub fn snapshot(&self) -> RoleSnapshot {
        RoleSnapshot {
            role: self.kind,
            path: self.path.clone(),
            available: self.nodes.available().iter().cloned().collect(),
            assigned: self.nodes.assigned().iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn ids(names: &[&str]) -> BTreeSet<NodeId> {
        names.iter().map(|n| NodeId::new(*n).unwrap()).collect()
    }

    fn role_dir(root: &Path, token: &str, nodes: &[&str]) -> PathBuf {
        let dir = root.join(token);
        fs::create_dir_all(dir.join("cluster")).unwrap();
        for node in nodes {
            fs::write(dir.join("cluster").join(format!("{}.sls", node)), b"").unwrap();
        }
        dir
    }

    #[test]
    fn test_prerequisite_table() {
        assert_eq!(
            RoleKind::Mon.prerequisites().collect::<Vec<_>>(),
            vec![Prerequisite::MinionDescriptor]
        );
        for kind in RoleKind::ALL.into_iter().filter(|k| *k != RoleKind::Mon) {
            assert_eq!(kind.prerequisites().count(), 0, "{} has no prerequisite", kind);
        }
    }

    #[test]
    fn test_role_only_offers_cluster_members() {
        let temp_dir = tempdir().unwrap();
        let config = ClusterConfig::with_proposal_dir(temp_dir.path());
        let dir = role_dir(temp_dir.path(), "role-admin", &["node1", "node2"]);

        let mut role = Role::new(RoleKind::Admin, dir);

        role.discover_nodes(&BTreeSet::new(), &config).unwrap();
        assert!(role.available().is_empty());

        role.discover_nodes(&ids(&["node2", "node3"]), &config).unwrap();
        assert_eq!(role.available(), &ids(&["node2"]));
        assert!(role.assigned().is_empty());
    }

    #[test]
    fn test_assigned_node_falls_out_when_it_leaves_the_cluster() {
        let temp_dir = tempdir().unwrap();
        let config = ClusterConfig::with_proposal_dir(temp_dir.path());
        let dir = role_dir(temp_dir.path(), "role-storage", &["node1", "node2"]);

        let mut role = Role::new(RoleKind::Storage, dir);
        role.discover_nodes(&ids(&["node1", "node2"]), &config).unwrap();
        role.add(&NodeId::new("node1").unwrap()).unwrap();

        role.discover_nodes(&ids(&["node1", "node2"]), &config).unwrap();
        assert_eq!(role.assigned(), &ids(&["node1"]));
        assert_eq!(role.available(), &ids(&["node2"]));

        role.discover_nodes(&ids(&["node2"]), &config).unwrap();
        assert!(role.assigned().is_empty());
        assert_eq!(role.available(), &ids(&["node2"]));
    }

    #[test]
    fn test_mon_requires_minion_descriptor() {
        let temp_dir = tempdir().unwrap();
        let config = ClusterConfig::with_proposal_dir(temp_dir.path());
        let dir = role_dir(temp_dir.path(), "role-mon", &["node1", "nodeX"]);
        let minions = config.minion_descriptor_dir(&dir);
        fs::create_dir_all(&minions).unwrap();
        fs::write(minions.join("node1.yml"), b"").unwrap();

        let mut role = Role::new(RoleKind::Mon, dir);
        role.discover_nodes(&ids(&["node1", "nodeX"]), &config).unwrap();

        assert_eq!(role.available(), &ids(&["node1"]));
        assert!(!role.nodes().contains("nodeX"));
    }

    #[test]
    fn test_missing_role_descriptor_dir_is_an_error() {
        let temp_dir = tempdir().unwrap();
        let config = ClusterConfig::with_proposal_dir(temp_dir.path());
        let dir = temp_dir.path().join("role-rgw");
        fs::create_dir_all(&dir).unwrap();

        let mut role = Role::new(RoleKind::Rgw, dir);
        assert!(role.discover_nodes(&ids(&["node1"]), &config).is_err());
    }
}
