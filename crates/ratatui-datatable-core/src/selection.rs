use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::keymap;
use crate::keymap::Binding;
use crate::record::RecordId;
use crate::record::Row;
use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Callback receiving the full selection, in selection order, after every change.
pub type SelectObserver = Box<dyn FnMut(&[Row])>;

/// Tracks which sanitized rows are selected.
///
/// The tracker only accepts rows it has been told about via [`SelectionTracker::set_rows`] or
/// [`SelectionTracker::toggle_all`], so the selection is always a subset of the current rows.
#[derive(Default)]
pub struct SelectionTracker {
    selected: Vec<Row>,
    selected_ids: HashSet<RecordId>,
    known: HashMap<RecordId, Row>,
    observer: Option<SelectObserver>,
}

impl fmt::Debug for SelectionTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionTracker")
            .field("selected", &self.selected)
            .field("known", &self.known.len())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_observer<F>(&mut self, observer: F)
    where
        F: FnMut(&[Row]) + 'static,
    {
        self.observer = Some(Box::new(observer));
    }

    pub fn selected(&self) -> &[Row] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_selected(&self, id: &RecordId) -> bool {
        self.selected_ids.contains(id)
    }

    /// `true` when every current row is selected (and there is at least one).
    pub fn all_selected(&self) -> bool {
        !self.known.is_empty() && self.selected.len() == self.known.len()
    }

    /// Rebases the tracker on a new sanitized sequence.
    ///
    /// Selected rows whose identity is gone are dropped; the rest take the new row contents.
    /// The observer is notified only if the selection changed.
    pub fn set_rows(&mut self, rows: &[Row]) -> bool {
        self.set_known(rows);
        let rebuilt: Vec<Row> = self
            .selected
            .iter()
            .filter_map(|r| self.known.get(r.id()).cloned())
            .collect();
        if rebuilt == self.selected {
            return false;
        }
        self.replace(rebuilt);
        true
    }

    /// Selects `row` if it is not selected, deselects it otherwise.
    ///
    /// Only the identity of `row` is used: a selected row always carries the contents last passed
    /// to [`SelectionTracker::set_rows`]. Rows unknown to the tracker are ignored and `false` is
    /// returned.
    pub fn toggle_one(&mut self, row: &Row) -> bool {
        let Some(current) = self.known.get(row.id()) else {
            return false;
        };
        if self.selected_ids.remove(row.id()) {
            self.selected.retain(|r| r.id() != row.id());
        } else {
            self.selected_ids.insert(current.id().clone());
            self.selected.push(current.clone());
        }
        self.notify();
        true
    }

    /// Selects exactly `rows` when `checked`, nothing otherwise.
    pub fn toggle_all(&mut self, checked: bool, rows: &[Row]) {
        self.set_known(rows);
        if checked {
            self.replace(rows.to_vec());
        } else {
            self.replace(Vec::new());
        }
    }

    /// Selects nothing.
    pub fn clear(&mut self) {
        self.replace(Vec::new());
    }

    fn set_known(&mut self, rows: &[Row]) {
        self.known = rows.iter().map(|r| (r.id().clone(), r.clone())).collect();
    }

    fn replace(&mut self, selected: Vec<Row>) {
        self.selected_ids = selected.iter().map(|r| r.id().clone()).collect();
        self.selected = selected;
        self.notify();
    }

    fn notify(&mut self) {
        debug!(
            selected = ?self.selected.iter().map(|r| r.id().to_string()).collect::<Vec<_>>(),
            "row selection changed"
        );
        if let Some(observer) = self.observer.as_mut() {
            observer(&self.selected);
        }
    }
}

/// Key bindings for row selection.
///
/// - `Space`/`Enter` toggles the row under the cursor
/// - `a` toggles every row
/// - `Esc` selects nothing
#[derive(Clone, Debug)]
pub struct SelectionBindings {
    pub toggle: Binding,
    pub toggle_all: Binding,
    pub clear: Binding,
}

impl Default for SelectionBindings {
    fn default() -> Self {
        Self {
            toggle: Binding::new(
                "space",
                "select",
                vec![keymap::key_char(' '), KeyEvent::new(KeyCode::Enter)],
            ),
            toggle_all: Binding::new("a", "select all", vec![keymap::key_char('a')]),
            clear: Binding::new("esc", "select none", vec![KeyEvent::new(KeyCode::Esc)]),
        }
    }
}

impl SelectionBindings {
    pub fn is_toggle(&self, key: &KeyEvent) -> bool {
        self.toggle.matches(key)
    }

    pub fn is_toggle_all(&self, key: &KeyEvent) -> bool {
        self.toggle_all.matches(key)
    }

    pub fn is_clear(&self, key: &KeyEvent) -> bool {
        self.clear.matches(key)
    }

    pub fn help(&self) -> Vec<Binding> {
        vec![
            self.toggle.clone(),
            self.toggle_all.clone(),
            self.clear.clone(),
        ]
    }
}
