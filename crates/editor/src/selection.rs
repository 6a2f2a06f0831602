//! Ordered selection set with change reporting.

use html::NodeId;

/// One membership change produced by a selection call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SelectionChange {
    Selected(NodeId),
    Deselected(NodeId),
}

impl SelectionChange {
    #[must_use]
    pub const fn node(self) -> NodeId {
        match self {
            Self::Selected(node) | Self::Deselected(node) => node,
        }
    }
}

/// Deduplicate `targets`, keeping first occurrences in call order.
fn unique(targets: &[NodeId]) -> Vec<NodeId> {
    let mut seen = Vec::with_capacity(targets.len());
    for target in targets {
        if !seen.contains(target) {
            seen.push(*target);
        }
    }
    seen
}

/// Selected components in insertion order; the last member is the primary one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    members: Vec<NodeId>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn all(&self) -> &[NodeId] {
        &self.members
    }

    /// The most recently selected member.
    #[must_use]
    pub fn primary(&self) -> Option<NodeId> {
        self.members.last().copied()
    }

    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.members.contains(&node)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Replace the set. Members that stay keep their position and report nothing.
    pub fn set(&mut self, targets: &[NodeId]) -> Vec<SelectionChange> {
        let targets = unique(targets);
        let mut changes = Vec::new();
        self.members.retain(|member| {
            let keep = targets.contains(member);
            if !keep {
                changes.push(SelectionChange::Deselected(*member));
            }
            keep
        });
        for target in targets {
            if !self.members.contains(&target) {
                self.members.push(target);
                changes.push(SelectionChange::Selected(target));
            }
        }
        changes
    }

    /// Append targets that are not selected yet.
    pub fn add(&mut self, targets: &[NodeId]) -> Vec<SelectionChange> {
        let mut changes = Vec::new();
        for target in unique(targets) {
            if !self.members.contains(&target) {
                self.members.push(target);
                changes.push(SelectionChange::Selected(target));
            }
        }
        changes
    }

    /// Drop targets that are selected.
    pub fn remove(&mut self, targets: &[NodeId]) -> Vec<SelectionChange> {
        unique(targets)
            .into_iter()
            .filter_map(|target| {
                let index = self.members.iter().position(|member| *member == target)?;
                self.members.remove(index);
                Some(SelectionChange::Deselected(target))
            })
            .collect()
    }

    /// Flip membership of every target, in call order.
    pub fn toggle(&mut self, targets: &[NodeId]) -> Vec<SelectionChange> {
        unique(targets)
            .into_iter()
            .map(|target| {
                if let Some(index) = self.members.iter().position(|member| *member == target) {
                    self.members.remove(index);
                    SelectionChange::Deselected(target)
                } else {
                    self.members.push(target);
                    SelectionChange::Selected(target)
                }
            })
            .collect()
    }

    /// Drop every member for which `alive` is false.
    pub fn retain_alive(&mut self, alive: impl Fn(NodeId) -> bool) -> Vec<SelectionChange> {
        let mut changes = Vec::new();
        self.members.retain(|member| {
            let keep = alive(*member);
            if !keep {
                changes.push(SelectionChange::Deselected(*member));
            }
            keep
        });
        changes
    }
}
