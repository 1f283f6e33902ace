use crate::config::DataTableConfig;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::keymap;
use crate::keymap::Binding;
use crate::selection::SelectionBindings;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableCommand {
    Up,
    Down,
    Left,
    Right,
    PrevPage,
    NextPage,
    FirstPage,
    LastPage,
    ShorterPages,
    LongerPages,
    Search,
    Filter,
    Sort,
    Toggle,
    ToggleAll,
    SelectNone,
}

/// Key bindings of [`crate::datatable::view::DataTableView`] in normal mode.
///
/// Commands whose feature is switched off in [`DataTableConfig`] never match.
#[derive(Clone, Debug)]
pub struct DataTableBindings {
    pub up: Binding,
    pub down: Binding,
    pub left: Binding,
    pub right: Binding,
    pub prev_page: Binding,
    pub next_page: Binding,
    pub first_page: Binding,
    pub last_page: Binding,
    pub shorter_pages: Binding,
    pub longer_pages: Binding,
    pub search: Binding,
    pub filter: Binding,
    pub sort: Binding,
    pub selection: SelectionBindings,
}

impl Default for DataTableBindings {
    fn default() -> Self {
        Self {
            up: Binding::new(
                "↑/k",
                "up",
                vec![keymap::key(KeyCode::Up), keymap::key_char('k')],
            ),
            down: Binding::new(
                "↓/j",
                "down",
                vec![keymap::key(KeyCode::Down), keymap::key_char('j')],
            ),
            left: Binding::new(
                "←/h",
                "column",
                vec![keymap::key(KeyCode::Left), keymap::key_char('h')],
            ),
            right: Binding::new(
                "→/l",
                "column",
                vec![keymap::key(KeyCode::Right), keymap::key_char('l')],
            ),
            prev_page: Binding::new(
                "p",
                "prev page",
                vec![keymap::key(KeyCode::PageUp), keymap::key_char('p')],
            ),
            next_page: Binding::new(
                "n",
                "next page",
                vec![keymap::key(KeyCode::PageDown), keymap::key_char('n')],
            ),
            first_page: Binding::new(
                "g",
                "first",
                vec![keymap::key(KeyCode::Home), keymap::key_char('g')],
            ),
            last_page: Binding::new(
                "G",
                "last",
                vec![keymap::key(KeyCode::End), keymap::key_char('G')],
            ),
            shorter_pages: Binding::new("<", "fewer rows", vec![keymap::key_char('<')]),
            longer_pages: Binding::new(">", "more rows", vec![keymap::key_char('>')]),
            search: Binding::new("/", "search", vec![keymap::key_char('/')]),
            filter: Binding::new("f", "filter", vec![keymap::key_char('f')]),
            sort: Binding::new("s", "sort", vec![keymap::key_char('s')]),
            selection: SelectionBindings::default(),
        }
    }
}

impl DataTableBindings {
    pub fn command_for(&self, key: &KeyEvent, config: &DataTableConfig) -> Option<TableCommand> {
        if config.selectable {
            if self.selection.is_toggle(key) {
                return Some(TableCommand::Toggle);
            }
            if self.selection.is_toggle_all(key) {
                return Some(TableCommand::ToggleAll);
            }
            if self.selection.is_clear(key) {
                return Some(TableCommand::SelectNone);
            }
        }
        if config.searching && self.search.matches(key) {
            return Some(TableCommand::Search);
        }
        if config.column_filter && self.filter.matches(key) {
            return Some(TableCommand::Filter);
        }
        if config.ordering && self.sort.matches(key) {
            return Some(TableCommand::Sort);
        }
        if config.paging && config.length_change {
            if self.shorter_pages.matches(key) {
                return Some(TableCommand::ShorterPages);
            }
            if self.longer_pages.matches(key) {
                return Some(TableCommand::LongerPages);
            }
        }

        let moves = [
            (&self.up, TableCommand::Up),
            (&self.down, TableCommand::Down),
            (&self.left, TableCommand::Left),
            (&self.right, TableCommand::Right),
            (&self.prev_page, TableCommand::PrevPage),
            (&self.next_page, TableCommand::NextPage),
            (&self.first_page, TableCommand::FirstPage),
            (&self.last_page, TableCommand::LastPage),
        ];
        moves
            .into_iter()
            .find(|(binding, _)| binding.matches(key))
            .map(|(_, command)| command)
    }

    /// Bindings worth listing in a help bar for `config`.
    pub fn help(&self, config: &DataTableConfig) -> Vec<Binding> {
        let mut out = Vec::new();
        if config.selectable {
            out.extend(self.selection.help());
        }
        if config.paging {
            out.push(self.prev_page.clone());
            out.push(self.next_page.clone());
        }
        if config.searching {
            out.push(self.search.clone());
        }
        if config.column_filter {
            out.push(self.filter.clone());
        }
        if config.ordering {
            out.push(self.sort.clone());
        }
        out
    }
}
