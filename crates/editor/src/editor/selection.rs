use super::Editor;
use crate::events::{EventData, EventKey};
use crate::selection::SelectionChange;
use html::NodeId;

impl Editor {
    fn alive(&self, targets: &[NodeId]) -> Vec<NodeId> {
        targets
            .iter()
            .copied()
            .filter(|node| *node != self.components.wrapper() && self.components.contains(*node))
            .collect()
    }

    pub(super) fn emit_selection_changes(&self, changes: &[SelectionChange]) {
        for change in changes {
            let key = match change {
                SelectionChange::Selected(_) => EventKey::ComponentSelected,
                SelectionChange::Deselected(_) => EventKey::ComponentDeselected,
            };
            self.emit(&key, &mut EventData::Component(change.node()));
            self.emit(&EventKey::ComponentToggled, &mut EventData::Component(change.node()));
        }
    }

    /// Replace the selection; an empty slice clears it.
    pub fn select(&mut self, targets: &[NodeId]) {
        let targets = self.alive(targets);
        let changes = self.selection.set(&targets);
        self.emit_selection_changes(&changes);
    }

    /// Add components that are not selected yet.
    pub fn select_add(&mut self, targets: &[NodeId]) {
        let targets = self.alive(targets);
        let changes = self.selection.add(&targets);
        self.emit_selection_changes(&changes);
    }

    /// Remove components from the selection.
    pub fn select_remove(&mut self, targets: &[NodeId]) {
        let changes = self.selection.remove(targets);
        self.emit_selection_changes(&changes);
    }

    /// Flip the selection state of each component.
    pub fn select_toggle(&mut self, targets: &[NodeId]) {
        let targets = self.alive(targets);
        let changes = self.selection.toggle(&targets);
        self.emit_selection_changes(&changes);
    }

    /// The primary selected component: the last one selected.
    #[must_use]
    pub fn get_selected(&self) -> Option<NodeId> {
        self.selection.primary()
    }

    /// Every selected component in selection order.
    #[must_use]
    pub fn get_selected_all(&self) -> Vec<NodeId> {
        self.selection.all().to_vec()
    }

    #[must_use]
    pub fn is_selected(&self, node: NodeId) -> bool {
        self.selection.contains(node)
    }
}
