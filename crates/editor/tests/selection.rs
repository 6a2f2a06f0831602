//! Selection set semantics and selection events.

use editor::{Editor, EditorConfig, EventData, Selection, SelectionChange, StorageSetting};
use html::NodeId;
use std::cell::RefCell;
use std::rc::Rc;

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[derive(Default)]
    struct Counts {
        selected: Vec<NodeId>,
        deselected: Vec<NodeId>,
        toggled: usize,
    }

    fn editor_with_three() -> (Editor, [NodeId; 3]) {
        let editor = Editor::init(
            EditorConfig {
                storage_manager: StorageSetting::Enabled(false),
                ..EditorConfig::default()
            }
            .with_components(r#"<div id="el1"></div><div id="el2"></div><div id="el3"></div>"#),
        )
        .expect("valid config");
        let [first, second, third] = editor.tree().components()[..] else {
            panic!("expected three components");
        };
        (editor, [first, second, third])
    }

    fn count_events(editor: &mut Editor) -> Rc<RefCell<Counts>> {
        let counts = Rc::new(RefCell::new(Counts::default()));
        let selected = Rc::clone(&counts);
        editor.on("component:selected", move |_, data| {
            if let EventData::Component(node) = data {
                selected.borrow_mut().selected.push(*node);
            }
        });
        let deselected = Rc::clone(&counts);
        editor.on("component:deselected", move |_, data| {
            if let EventData::Component(node) = data {
                deselected.borrow_mut().deselected.push(*node);
            }
        });
        let toggled = Rc::clone(&counts);
        editor.on("component:toggled", move |_, _| {
            toggled.borrow_mut().toggled += 1;
        });
        counts
    }

    /// The reference six-call sequence fires 4 selected, 3 deselected and 7 toggled events.
    ///
    /// # Panics
    /// Panics if the event counts or the final set differ.
    #[test]
    fn reference_trace() {
        init_logging();
        let (mut editor, [el1, el2, el3]) = editor_with_three();
        let counts = count_events(&mut editor);

        editor.select(&[el1]);
        editor.select_add(&[el1]);
        editor.select_add(&[el2, el3]);
        assert_eq!(editor.get_selected(), Some(el3));
        editor.select_toggle(&[el1, el3]);
        assert_eq!(editor.get_selected_all(), [el2]);
        editor.select_remove(&[el2]);
        assert_eq!(editor.get_selected(), None);
        editor.select(&[el1]);

        let counts = counts.borrow();
        assert_eq!(counts.selected.len(), 4);
        assert_eq!(counts.deselected.len(), 3);
        assert_eq!(counts.toggled, 7);
        assert_eq!(counts.deselected, [el1, el3, el2]);
        assert_eq!(editor.get_selected_all(), [el1]);
    }

    /// Cardinality: select, add, remove and toggle keep the primary member consistent.
    ///
    /// # Panics
    /// Panics if the primary member is wrong.
    #[test]
    fn primary_follows_changes() {
        init_logging();
        let (mut editor, [el1, el2, el3]) = editor_with_three();
        editor.select(&[el1]);
        assert_eq!(editor.get_selected_all().len(), 1);
        editor.select_add(&[el2]);
        assert_eq!(editor.get_selected_all().len(), 2);
        assert_eq!(editor.get_selected(), Some(el2));
        editor.select_remove(&[el1]);
        assert_eq!(editor.get_selected_all().len(), 1);
        assert_eq!(editor.get_selected(), Some(el2));
        editor.select_toggle(&[el1, el3]);
        assert_eq!(editor.get_selected_all(), [el2, el1, el3]);
        assert_eq!(editor.get_selected(), Some(el3));
        editor.select(&[]);
        assert!(editor.get_selected_all().is_empty());
    }

    /// Replacing the set keeps shared members silent.
    ///
    /// # Panics
    /// Panics if kept members fire events.
    #[test]
    fn select_reports_only_changes() {
        init_logging();
        let (mut editor, [el1, el2, el3]) = editor_with_three();
        editor.select(&[el1, el2]);
        let counts = count_events(&mut editor);
        editor.select(&[el2, el3, el3]);
        let counts = counts.borrow();
        assert_eq!(counts.selected, [el3]);
        assert_eq!(counts.deselected, [el1]);
        assert_eq!(counts.toggled, 2);
        assert_eq!(editor.get_selected_all(), [el2, el3]);
    }

    /// Removed components leave the selection with a deselected event; dead ids are ignored.
    ///
    /// # Panics
    /// Panics if a removed component stays selected.
    #[test]
    fn removal_prunes_selection() {
        init_logging();
        let (mut editor, [el1, el2, _]) = editor_with_three();
        editor.select(&[el1, el2]);
        let counts = count_events(&mut editor);
        editor.remove_component(el1).expect("live node");
        assert_eq!(editor.get_selected_all(), [el2]);
        assert_eq!(counts.borrow().deselected, [el1]);
        editor.select_add(&[el1, editor.tree().wrapper()]);
        assert_eq!(editor.get_selected_all(), [el2]);
    }

    /// The plain set reports changes in call order.
    ///
    /// # Panics
    /// Panics if the reported changes differ.
    #[test]
    fn selection_set_changes() {
        init_logging();
        let (_editor, [el1, el2, _]) = editor_with_three();
        let mut selection = Selection::new();
        assert_eq!(selection.add(&[el1, el1]), [SelectionChange::Selected(el1)]);
        assert_eq!(
            selection.toggle(&[el2, el1]),
            [SelectionChange::Selected(el2), SelectionChange::Deselected(el1)]
        );
        assert_eq!(selection.primary(), Some(el2));
        assert!(selection.remove(&[el1]).is_empty());
        assert_eq!(selection.len(), 1);
    }
}
