use crate::model::{Group, GroupRef, GroupSummary, GroupView};
use crate::ConfigError;
use serde::{Deserialize, Serialize};

/// Hierarchical grouping of panorama nodes for macro-navigation and
/// aggregated metadata. Read-only after `build`; the root is group id 0 by
/// convention.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GroupSystem {
    groups: Vec<Option<Group>>,    // id is index, sparse
    node_group: Vec<Option<u32>>,  // node id -> owning group, built once
    root: u32,
}

pub const ROOT_GROUP: u32 = 0;

impl GroupSystem {
    /// Build the hierarchy from parsed group records, validating every
    /// group/node reference and every start-group chain. `node_exists`
    /// answers against the node store; `node_capacity` sizes the inverted
    /// index.
    pub fn build(
        records: Vec<Group>,
        node_capacity: usize,
        node_exists: impl Fn(u32) -> bool,
    ) -> Result<GroupSystem, ConfigError> {
        let max_id = records.iter().map(|g| g.id).max().unwrap_or(0);
        let mut groups: Vec<Option<Group>> = vec![None; max_id as usize + 1];
        for g in records {
            let slot = &mut groups[g.id as usize];
            if slot.is_some() {
                return Err(ConfigError::DuplicateGroup { group: g.id });
            }
            *slot = Some(g);
        }

        let mut sys = GroupSystem {
            groups,
            node_group: vec![None; node_capacity],
            root: ROOT_GROUP,
        };
        if sys.get(sys.root).is_none() {
            return Err(ConfigError::UnknownGroup {
                group: sys.root,
                referenced_by: "root",
            });
        }

        for slot in sys.groups.iter().flatten() {
            if sys.groups.get(slot.parent as usize).map_or(true, |s| s.is_none()) {
                return Err(ConfigError::UnknownGroup {
                    group: slot.parent,
                    referenced_by: "parent",
                });
            }
            for &c in &slot.children {
                if sys.groups.get(c as usize).map_or(true, |s| s.is_none()) {
                    return Err(ConfigError::UnknownGroup {
                        group: c,
                        referenced_by: "children",
                    });
                }
            }
            if sys.groups.get(slot.start_group as usize).map_or(true, |s| s.is_none()) {
                return Err(ConfigError::UnknownGroup {
                    group: slot.start_group,
                    referenced_by: "start_group",
                });
            }
            for &m in &slot.members {
                if !node_exists(m) {
                    return Err(ConfigError::UnknownNode {
                        node: m,
                        referenced_by: "members",
                    });
                }
            }
            if let Some(n) = slot.start_node {
                if !node_exists(n) {
                    return Err(ConfigError::UnknownNode {
                        node: n,
                        referenced_by: "start_node",
                    });
                }
            }
        }

        // every start-group chain must terminate; surface cycles at load
        for id in 0..sys.groups.len() as u32 {
            if sys.get(id).is_some() {
                sys.resolve_start_group(id)?;
            }
        }

        // inverted member index; a node listed by several groups keeps the
        // last declaration
        let assignments: Vec<(u32, u32)> = sys
            .groups
            .iter()
            .flatten()
            .flat_map(|g| g.members.iter().map(move |&m| (m, g.id)))
            .collect();
        for (node, group) in assignments {
            sys.node_group[node as usize] = Some(group);
        }

        Ok(sys)
    }

    pub fn root(&self) -> u32 {
        self.root
    }

    pub fn is_valid_group(&self, id: u32) -> bool {
        self.groups.get(id as usize).map_or(false, |s| s.is_some())
    }

    pub fn get(&self, id: u32) -> Option<&Group> {
        self.groups.get(id as usize).and_then(|s| s.as_ref())
    }

    pub fn group_count(&self) -> usize {
        self.groups.iter().filter(|s| s.is_some()).count()
    }

    /// Owning group of a node, recovered from the member index.
    pub fn group_of_node(&self, node: u32) -> Option<u32> {
        self.node_group.get(node as usize).copied().flatten()
    }

    /// Follow `start_group` links until a group with a real start node is
    /// reached. Chains longer than the hierarchy indicate a cycle, which is
    /// a fatal configuration error.
    pub fn resolve_start_group(&self, id: u32) -> Result<u32, ConfigError> {
        let mut gid = id;
        let mut steps = 0usize;
        loop {
            let g = self.get(gid).ok_or(ConfigError::UnknownGroup {
                group: gid,
                referenced_by: "start_group",
            })?;
            if g.start_node.is_some() {
                return Ok(gid);
            }
            gid = g.start_group;
            steps += 1;
            if steps > self.group_count() {
                return Err(ConfigError::StartGroupCycle { group: id });
            }
        }
    }

    /// Child groups in declaration order.
    pub fn children_of(&self, id: u32) -> Vec<GroupRef> {
        let Some(g) = self.get(id) else { return Vec::new() };
        g.children
            .iter()
            .filter_map(|&c| self.get(c))
            .map(|c| GroupRef { id: c.id, title: c.title.clone() })
            .collect()
    }

    /// Sibling groups (including the group itself), in the parent's
    /// declaration order.
    pub fn siblings_of(&self, id: u32) -> Vec<GroupRef> {
        let Some(g) = self.get(id) else { return Vec::new() };
        self.children_of(g.parent)
    }

    /// The navigable group list: children if any, else siblings.
    pub fn next_display_refs(&self, id: u32) -> Vec<GroupRef> {
        let refs = self.children_of(id);
        if refs.is_empty() { self.siblings_of(id) } else { refs }
    }

    pub fn summary(&self, id: u32) -> Option<GroupSummary> {
        self.get(id).map(|g| GroupSummary {
            title: g.title.clone(),
            description: g.description.clone(),
            tags: g.tags.clone(),
        })
    }

    /// Metadata view for the given current group: root summary as primary,
    /// the group's own as secondary, plus the navigable refs.
    pub fn view(&self, current: u32) -> Option<GroupView> {
        Some(GroupView {
            primary: self.summary(self.root)?,
            secondary: self.summary(current)?,
            current_group: current,
            nav_refs: self.next_display_refs(current),
        })
    }
}
