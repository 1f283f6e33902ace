use crate::config::DataTableConfig;
use crate::datatable::bindings::DataTableBindings;
use crate::datatable::bindings::TableCommand;
use crate::datatable::filter::ALL_LABEL;
use crate::datatable::filter::FilterAction;
use crate::datatable::filter::FilterDropdown;
use crate::datatable::query;
use crate::datatable::query::PageInfo;
use crate::datatable::query::SortDir;
use crate::datatable::query::TableQuery;
use crate::input::InputEvent;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::input::MouseButton;
use crate::input::MouseEvent;
use crate::input::MouseEventKind;
use crate::keymap::Binding;
use crate::record::Record;
use crate::record::Row;
use crate::render;
use crate::sanitize::Sanitizer;
use crate::schema::Column;
use crate::schema::ColumnSchema;
use crate::selection::SelectionTracker;
use crate::store;
use crate::store::KeyValueStore;
use crate::theme::Theme;
use crate::viewport::ViewportState;
use ratatui::buffer::Buffer;
use ratatui::layout::Position;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Span;
use tracing::trace;
use tracing::warn;

const CHECKBOX_W: u16 = 3;
const SORT_MARK_W: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataTableAction {
    None,
    Redraw,
    SelectionChanged,
}

/// Presentation options for [`DataTableView`].
///
/// Row styles are layered: stripe, then selected, then cursor.
#[derive(Clone, Debug)]
pub struct DataTableOptions {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub col_gap: u16,
    pub show_scrollbar: bool,
    pub style: Style,
    pub title_style: Style,
    pub header_style: Style,
    pub filter_style: Style,
    pub cursor_style: Style,
    pub selected_style: Style,
    pub stripe_style: Style,
    pub grid_line_style: Style,
    pub scrollbar_style: Style,
    pub popup_style: Style,
}

impl Default for DataTableOptions {
    fn default() -> Self {
        Self {
            title: Some("Data Table with Column Wise Drop Down Filters".to_string()),
            subtitle: Some(
                "Reusable data table component enabled with custom configuration".to_string(),
            ),
            col_gap: 1,
            show_scrollbar: true,
            style: Style::default(),
            title_style: Style::default().add_modifier(Modifier::BOLD),
            header_style: Style::default().add_modifier(Modifier::BOLD),
            filter_style: Style::default(),
            cursor_style: Style::default().add_modifier(Modifier::REVERSED),
            selected_style: Style::default(),
            stripe_style: Style::default().bg(Color::Indexed(235)),
            grid_line_style: Style::default(),
            scrollbar_style: Style::default(),
            popup_style: Style::default(),
        }
    }
}

/// Context passed to the `render_cell` callback in [`DataTableView::render_with`].
#[derive(Clone, Debug)]
pub struct DataTableCellContext<'a> {
    pub row: &'a Row,
    pub column: &'a Column,
    pub col_index: usize,
    /// Position of the row among the rows passing search and filters.
    pub position: usize,
    pub clip_left: u32,
    pub is_cursor: bool,
    pub is_selected: bool,
}

enum Mode {
    Normal,
    Search,
    Filter(FilterDropdown),
}

#[derive(Clone, Copy, Debug)]
struct ColumnSlot {
    index: usize,
    start: u32,
    width: u16,
}

// Screen geometry of the last render, for mouse hit testing.
#[derive(Clone, Debug, Default)]
struct HitLayout {
    select_all: Option<Rect>,
    header: Option<Rect>,
    filter_row: Option<Rect>,
    body: Rect,
    body_positions: Vec<usize>,
    columns: Vec<(usize, Rect)>,
}

/// An interactive table over sanitized records.
///
/// Records are sanitized against the schema whenever records, schema, or config change. The
/// widget keeps search, filter, sort, and page state plus the row selection, and is driven from
/// the app loop with [`DataTableView::handle_event`] and [`DataTableView::render`].
///
/// With no records set (`None`), the widget renders nothing.
pub struct DataTableView {
    pub state: ViewportState,
    schema: ColumnSchema,
    config: DataTableConfig,
    options: DataTableOptions,
    bindings: DataTableBindings,
    records: Option<Vec<Record>>,
    rows: Vec<Row>,
    natural_widths: Vec<u16>,
    matching: Vec<usize>,
    query: TableQuery,
    selection: SelectionTracker,
    store: Option<Box<dyn KeyValueStore>>,
    mode: Mode,
    cursor: usize,
    cursor_col: usize,
    hit: HitLayout,
}

impl Default for DataTableView {
    fn default() -> Self {
        Self::new(ColumnSchema::default(), DataTableConfig::default())
    }
}

impl DataTableView {
    pub fn new(schema: ColumnSchema, config: DataTableConfig) -> Self {
        let mut v = Self {
            state: ViewportState::default(),
            schema,
            query: TableQuery::new(config.paging, config.effective_page_length()),
            config,
            options: DataTableOptions::default(),
            bindings: DataTableBindings::default(),
            records: None,
            rows: Vec::new(),
            natural_widths: Vec::new(),
            matching: Vec::new(),
            selection: SelectionTracker::new(),
            store: None,
            mode: Mode::Normal,
            cursor: 0,
            cursor_col: 0,
            hit: HitLayout::default(),
        };
        v.apply_initial_order();
        v.resanitize();
        v
    }

    pub fn with_options(mut self, options: DataTableOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &DataTableOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: DataTableOptions) {
        self.options = options;
    }

    pub fn bindings(&self) -> &DataTableBindings {
        &self.bindings
    }

    pub fn set_bindings(&mut self, bindings: DataTableBindings) {
        self.bindings = bindings;
    }

    /// Bindings for a help bar, filtered by the current config.
    pub fn help_bindings(&self) -> Vec<Binding> {
        self.bindings.help(&self.config)
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub fn config(&self) -> &DataTableConfig {
        &self.config
    }

    /// Replaces the records. `None` means there is no data and nothing is rendered.
    pub fn set_records(&mut self, records: Option<Vec<Record>>) {
        self.records = records;
        self.resanitize();
    }

    pub fn set_schema(&mut self, schema: ColumnSchema) {
        self.schema = schema;
        self.cursor_col = self.cursor_col.min(self.schema.len().saturating_sub(1));
        self.query.clear_filters();
        self.query.set_sort(None);
        self.apply_initial_order();
        self.restore_filters();
        self.resanitize();
    }

    /// Replaces the config. Search, filters, sort, and paging start over.
    pub fn set_config(&mut self, config: DataTableConfig) {
        self.query = TableQuery::new(config.paging, config.effective_page_length());
        self.config = config;
        self.mode = Mode::Normal;
        self.apply_initial_order();
        self.restore_filters();
        self.resanitize();
    }

    /// Attaches the store column filters are saved to when `state_save` is on.
    pub fn set_store<S>(&mut self, store: S)
    where
        S: KeyValueStore + 'static,
    {
        self.store = Some(Box::new(store));
        self.restore_filters();
        self.refresh();
    }

    /// Registers the callback receiving the selection after every change.
    pub fn on_select<F>(&mut self, observer: F)
    where
        F: FnMut(&[Row]) + 'static,
    {
        self.selection.set_observer(observer);
    }

    pub fn has_data(&self) -> bool {
        self.records.is_some()
    }

    /// The sanitized rows, in input order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn selected(&self) -> &[Row] {
        self.selection.selected()
    }

    pub fn query(&self) -> &TableQuery {
        &self.query
    }

    pub fn is_searching(&self) -> bool {
        matches!(self.mode, Mode::Search)
    }

    pub fn is_filter_open(&self) -> bool {
        matches!(self.mode, Mode::Filter(_))
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.set_search(search);
        self.refresh();
    }

    /// Filters `column` (schema index) to cells equal to `value`, saving it if `state_save` is on.
    pub fn set_filter(&mut self, column: usize, value: Option<String>) {
        let value = value.filter(|v| !v.is_empty());
        self.query.set_filter(column, value.clone());
        if self.config.state_save {
            if let Some(store) = self.store.as_mut() {
                let key = store::column_filter_key(column);
                if let Err(err) = store.set(&key, value.as_deref().unwrap_or("")) {
                    warn!(%err, column, "failed to save column filter");
                }
            }
        }
        self.refresh();
    }

    /// Rows passing search and filters, in display order.
    pub fn matching_rows(&self) -> impl Iterator<Item = &Row> {
        self.matching.iter().map(|&i| &self.rows[i])
    }

    /// Rows on the current page.
    pub fn page_rows(&self) -> impl Iterator<Item = &Row> {
        self.matching[self.query.page_range(self.matching.len())]
            .iter()
            .map(|&i| &self.rows[i])
    }

    pub fn page_info(&self) -> PageInfo {
        PageInfo::new(&self.query, self.matching.len(), self.rows.len())
    }

    pub fn cursor_row(&self) -> Option<&Row> {
        self.matching.get(self.cursor).map(|&i| &self.rows[i])
    }

    pub fn cursor_column(&self) -> usize {
        self.cursor_col
    }

    pub fn handle_event(&mut self, event: InputEvent) -> DataTableAction {
        if self.records.is_none() {
            return DataTableAction::None;
        }
        match event {
            InputEvent::Key(key) => self.handle_key(key),
            InputEvent::Paste(text) => {
                if matches!(self.mode, Mode::Search) {
                    let search = format!("{}{}", self.query.search(), text.replace('\n', " "));
                    self.set_search(search);
                    DataTableAction::Redraw
                } else {
                    DataTableAction::None
                }
            }
            InputEvent::Mouse(mouse) => self.handle_mouse(mouse),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> DataTableAction {
        if let Mode::Filter(dropdown) = &mut self.mode {
            let column = dropdown.column();
            return match dropdown.handle_key(&key) {
                FilterAction::None => DataTableAction::None,
                FilterAction::Redraw => DataTableAction::Redraw,
                FilterAction::Apply(value) => {
                    self.mode = Mode::Normal;
                    self.set_filter(column, value);
                    DataTableAction::Redraw
                }
                FilterAction::Cancel => {
                    self.mode = Mode::Normal;
                    DataTableAction::Redraw
                }
            };
        }
        if matches!(self.mode, Mode::Search) {
            return self.handle_search_key(key);
        }

        let Some(command) = self.bindings.command_for(&key, &self.config) else {
            return DataTableAction::None;
        };
        self.run(command)
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> DataTableAction {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.mode = Mode::Normal;
                DataTableAction::Redraw
            }
            KeyCode::Backspace => {
                let mut search = self.query.search().to_string();
                if search.pop().is_none() {
                    return DataTableAction::None;
                }
                self.set_search(search);
                DataTableAction::Redraw
            }
            KeyCode::Char(c) if !key.modifiers.ctrl && !key.modifiers.alt => {
                let mut search = self.query.search().to_string();
                search.push(c);
                self.set_search(search);
                DataTableAction::Redraw
            }
            _ => DataTableAction::None,
        }
    }

    fn run(&mut self, command: TableCommand) -> DataTableAction {
        let redraw = |changed: bool| {
            if changed {
                DataTableAction::Redraw
            } else {
                DataTableAction::None
            }
        };
        match command {
            TableCommand::Up => redraw(self.move_cursor_by(-1)),
            TableCommand::Down => redraw(self.move_cursor_by(1)),
            TableCommand::Left => redraw(self.move_column_by(-1)),
            TableCommand::Right => redraw(self.move_column_by(1)),
            TableCommand::PrevPage => redraw(self.turn_page(-1)),
            TableCommand::NextPage => redraw(self.turn_page(1)),
            TableCommand::FirstPage => redraw(self.move_cursor_to(0)),
            TableCommand::LastPage => {
                redraw(self.move_cursor_to(self.matching.len().saturating_sub(1)))
            }
            TableCommand::ShorterPages => redraw(self.step_page_length(-1)),
            TableCommand::LongerPages => redraw(self.step_page_length(1)),
            TableCommand::Search => {
                self.mode = Mode::Search;
                DataTableAction::Redraw
            }
            TableCommand::Filter => redraw(self.open_filter(self.cursor_col)),
            TableCommand::Sort => redraw(self.cycle_sort(self.cursor_col)),
            TableCommand::Toggle => self.toggle_cursor_row(),
            TableCommand::ToggleAll => self.toggle_all(),
            TableCommand::SelectNone => {
                if self.selection.is_empty() {
                    return DataTableAction::None;
                }
                self.selection.clear();
                DataTableAction::SelectionChanged
            }
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> DataTableAction {
        if let Mode::Filter(dropdown) = &mut self.mode {
            let delta = match mouse.kind {
                MouseEventKind::ScrollUp => -1,
                MouseEventKind::ScrollDown => 1,
                MouseEventKind::Down(_) => 0,
            };
            if delta != 0 {
                let before = dropdown.cursor();
                dropdown.move_by(delta);
                return if dropdown.cursor() == before {
                    DataTableAction::None
                } else {
                    DataTableAction::Redraw
                };
            }
        }
        match mouse.kind {
            MouseEventKind::ScrollUp => return self.run(TableCommand::Up),
            MouseEventKind::ScrollDown => return self.run(TableCommand::Down),
            MouseEventKind::Down(MouseButton::Left) => {}
            MouseEventKind::Down(_) => return DataTableAction::None,
        }
        let pos = Position::new(mouse.x, mouse.y);

        if let Mode::Filter(_) = self.mode {
            self.mode = Mode::Normal;
            return DataTableAction::Redraw;
        }
        if self.hit.select_all.is_some_and(|r| r.contains(pos)) {
            return self.toggle_all();
        }
        let column_at = |hit: &HitLayout| {
            hit.columns
                .iter()
                .find(|(_, r)| pos.x >= r.x && pos.x < r.right())
                .map(|(i, _)| *i)
        };
        if self.hit.header.is_some_and(|r| r.contains(pos)) {
            let Some(col) = column_at(&self.hit) else {
                return DataTableAction::None;
            };
            self.cursor_col = col;
            if self.config.ordering {
                self.cycle_sort(col);
            }
            return DataTableAction::Redraw;
        }
        if self.hit.filter_row.is_some_and(|r| r.contains(pos)) {
            let Some(col) = column_at(&self.hit) else {
                return DataTableAction::None;
            };
            self.cursor_col = col;
            self.open_filter(col);
            return DataTableAction::Redraw;
        }
        if self.hit.body.contains(pos) {
            let line = (pos.y - self.hit.body.y) as usize;
            if let Some(&position) = self.hit.body_positions.get(line) {
                self.cursor = position;
                if let Some(col) = column_at(&self.hit) {
                    self.cursor_col = col;
                }
                if self.config.selectable {
                    return self.toggle_cursor_row();
                }
                return DataTableAction::Redraw;
            }
        }
        DataTableAction::None
    }

    fn toggle_cursor_row(&mut self) -> DataTableAction {
        let Some(&index) = self.matching.get(self.cursor) else {
            return DataTableAction::None;
        };
        if self.selection.toggle_one(&self.rows[index]) {
            DataTableAction::SelectionChanged
        } else {
            DataTableAction::None
        }
    }

    fn toggle_all(&mut self) -> DataTableAction {
        if self.rows.is_empty() {
            return DataTableAction::None;
        }
        let checked = !self.selection.all_selected();
        self.selection.toggle_all(checked, &self.rows);
        DataTableAction::SelectionChanged
    }

    fn move_cursor_by(&mut self, delta: i64) -> bool {
        let last = self.matching.len() as i64 - 1;
        if last < 0 {
            return false;
        }
        let next = (self.cursor as i64 + delta).clamp(0, last) as usize;
        self.move_cursor_to(next)
    }

    fn move_cursor_to(&mut self, position: usize) -> bool {
        let total = self.matching.len();
        if total == 0 {
            return false;
        }
        let position = position.min(total - 1);
        if position == self.cursor {
            return false;
        }
        self.cursor = position;
        if self.query.paging() {
            let page = position / self.query.page_length();
            self.query.set_page(page, total);
        }
        true
    }

    fn turn_page(&mut self, delta: i64) -> bool {
        let total = self.matching.len();
        if total == 0 {
            return false;
        }
        if !self.query.paging() {
            let step = self.state.viewport_h.saturating_sub(1).max(1) as i64;
            return self.move_cursor_by(delta * step);
        }
        let last = self.query.page_count(total) as i64 - 1;
        let page = (self.query.page() as i64 + delta).clamp(0, last) as usize;
        if page == self.query.page() {
            return false;
        }
        self.query.set_page(page, total);
        self.cursor = self.query.page_range(total).start;
        true
    }

    fn step_page_length(&mut self, delta: i64) -> bool {
        let menu: Vec<usize> = self
            .config
            .length_menu
            .options()
            .iter()
            .map(|o| o.rows)
            .collect();
        if menu.is_empty() {
            return false;
        }
        let current = self.query.page_length();
        let idx = menu.iter().position(|&n| n == current);
        let next = match (idx, delta > 0) {
            (Some(i), true) => menu.get(i + 1).copied(),
            (Some(i), false) => i.checked_sub(1).and_then(|i| menu.get(i).copied()),
            (None, true) => menu.iter().copied().find(|&n| n > current),
            (None, false) => menu.iter().rev().copied().find(|&n| n < current),
        };
        let Some(next) = next else {
            return false;
        };
        self.query.set_page_length(next);
        if self.query.paging() {
            let page = self.cursor / self.query.page_length();
            self.query.set_page(page, self.matching.len());
        }
        trace!(page_length = next, "page length changed");
        true
    }

    fn move_column_by(&mut self, delta: i64) -> bool {
        if self.schema.is_empty() {
            return false;
        }
        let last = self.schema.len() as i64 - 1;
        let next = (self.cursor_col as i64 + delta).clamp(0, last) as usize;
        if next == self.cursor_col {
            return false;
        }
        self.cursor_col = next;
        true
    }

    fn open_filter(&mut self, column: usize) -> bool {
        let Some(col) = self.schema.get(column) else {
            return false;
        };
        let values = query::distinct_values(&self.rows, &col.key);
        self.mode = Mode::Filter(FilterDropdown::new(
            column,
            values,
            self.query.filter(column),
        ));
        true
    }

    fn cycle_sort(&mut self, column: usize) -> bool {
        if column >= self.schema.len() {
            return false;
        }
        self.query.cycle_sort(column);
        self.refresh();
        true
    }

    fn apply_initial_order(&mut self) {
        let initial = self
            .config
            .order
            .first()
            .copied()
            .filter(|s| s.column < self.schema.len());
        self.query.set_sort(initial);
    }

    fn restore_filters(&mut self) {
        if !self.config.state_save {
            return;
        }
        let Some(store) = self.store.as_ref() else {
            return;
        };
        for column in 0..self.schema.len() {
            match store.get(&store::column_filter_key(column)) {
                Some(value) if !value.is_empty() => {
                    trace!(column, %value, "restoring column filter");
                    self.query.set_filter(column, Some(value));
                }
                _ => {}
            }
        }
    }

    fn resanitize(&mut self) {
        self.rows = match &self.records {
            Some(records) => Sanitizer::new(self.config.key_match).sanitize(records, &self.schema),
            None => Vec::new(),
        };
        self.selection.set_rows(&self.rows);
        self.natural_widths = self.compute_natural_widths();
        self.refresh();
    }

    fn refresh(&mut self) {
        self.matching = self.query.matching(&self.rows, &self.schema);
        let total = self.matching.len();
        self.query.set_page(self.query.page(), total);
        let range = self.query.page_range(total);
        if !range.contains(&self.cursor) {
            self.cursor = range.start;
        }
    }

    fn compute_natural_widths(&self) -> Vec<u16> {
        self.schema
            .columns()
            .iter()
            .map(|col| {
                let header = render::display_width(&col.name) + SORT_MARK_W;
                let filter = if self.config.column_filter {
                    render::display_width(ALL_LABEL) + 2
                } else {
                    0
                };
                let cells = self
                    .rows
                    .iter()
                    .filter_map(|r| r.get(&col.key))
                    .map(|v| render::display_width(&v.to_string()))
                    .max()
                    .unwrap_or(0);
                header.max(filter).max(cells).clamp(1, u16::MAX as usize) as u16
            })
            .collect()
    }

    fn column_slots(&self, width: u16) -> Vec<ColumnSlot> {
        let n = self.schema.len();
        if n == 0 {
            return Vec::new();
        }
        let gap = self.options.col_gap as u32;
        let widths: Vec<u16> = if self.config.responsive {
            let avail = (width as u32).saturating_sub(gap * (n as u32 - 1));
            let base = avail / n as u32;
            let extra = (avail % n as u32) as usize;
            (0..n)
                .map(|i| (base + u32::from(i < extra)).max(1) as u16)
                .collect()
        } else {
            self.natural_widths.clone()
        };
        let mut start = 0u32;
        widths
            .into_iter()
            .enumerate()
            .map(|(index, width)| {
                let slot = ColumnSlot {
                    index,
                    start,
                    width,
                };
                start += width as u32 + gap;
                slot
            })
            .collect()
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        self.render_with(area, buf, theme, |cell_area, ctx, buf, theme| {
            let text = ctx
                .row
                .get(&ctx.column.key)
                .map(ToString::to_string)
                .unwrap_or_default();
            let style = buf
                .cell((cell_area.x, cell_area.y))
                .map(|c| c.style())
                .unwrap_or(theme.text_primary);
            draw_cell_text(buf, cell_area, ctx.clip_left, &text, style);
        });
    }

    pub fn render_with<F>(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme, mut render_cell: F)
    where
        F: FnMut(Rect, DataTableCellContext<'_>, &mut Buffer, &Theme),
    {
        self.hit = HitLayout::default();
        if self.records.is_none() || area.width == 0 || area.height == 0 {
            return;
        }

        let base = if self.options.style == Style::default() {
            theme.text_primary
        } else {
            self.options.style
        };
        let muted = theme.text_muted;
        buf.set_style(area, base);

        let mut lines = LineAllocator::new(area);

        if let Some(title) = self.options.title.as_deref().filter(|t| !t.is_empty()) {
            if let Some(r) = lines.take_top() {
                let style = base.patch(theme.accent).patch(self.options.title_style);
                render::render_str_truncated(r.x, r.y, r.width, buf, title, style);
            }
        }
        if let Some(subtitle) = self.options.subtitle.as_deref().filter(|t| !t.is_empty()) {
            if let Some(r) = lines.take_top() {
                render::render_str_truncated(r.x, r.y, r.width, buf, subtitle, base.patch(muted));
            }
        }
        let show_length = self.config.paging && self.config.length_change;
        if self.config.searching || show_length {
            if let Some(r) = lines.take_top() {
                self.render_toolbar(r, buf, base, theme);
            }
        }
        if self.config.selectable && !self.rows.is_empty() {
            if let Some(r) = lines.take_top() {
                let mark = if self.selection.all_selected() { "[x]" } else { "[ ]" };
                let text = format!("{mark} Select all");
                render::render_str_truncated(r.x, r.y, r.width, buf, &text, base);
                self.hit.select_all = Some(r);
            }
        }

        let footer = self.config.footer && !self.config.language.footer_text.is_empty();
        let footer_area = if footer { lines.take_bottom() } else { None };
        let info_area = lines.take_bottom();
        let header_area = lines.take_top();
        let filter_area = if self.config.column_filter && !self.schema.is_empty() {
            lines.take_top()
        } else {
            None
        };
        let body = lines.rest();

        let (content, scrollbar_x) = if self.options.show_scrollbar && body.width >= 2 {
            (
                Rect::new(body.x, body.y, body.width - 1, body.height),
                Some(body.x + body.width - 1),
            )
        } else {
            (body, None)
        };
        let check_w = if self.config.selectable {
            CHECKBOX_W.min(content.width)
        } else {
            0
        };
        let lead = if check_w > 0 {
            (check_w + self.options.col_gap).min(content.width)
        } else {
            0
        };
        let data_x = content.x + lead;
        let data_w = content.width - lead;

        let total = self.matching.len();
        let range = self.query.page_range(total);
        let slots = self.column_slots(data_w);
        let content_w = slots
            .last()
            .map(|s| s.start + s.width as u32)
            .unwrap_or(0);
        self.state.set_viewport(data_w, content.height);
        self.state.set_content(content_w, range.len() as u32);
        if let Some(slot) = slots.get(self.cursor_col) {
            self.state.ensure_visible_x(slot.start, slot.width as u32);
        }
        if range.contains(&self.cursor) {
            self.state
                .ensure_visible_y((self.cursor - range.start) as u32, 1);
        }
        let scroll_x = self.state.x as u64;

        let grid_style = if self.options.grid_line_style == Style::default() {
            muted
        } else {
            self.options.grid_line_style
        };
        let header_style = base.patch(theme.accent).patch(self.options.header_style);

        if let Some(header) = header_area {
            buf.set_style(header, header_style);
            self.hit.header = Some(header);
            let row = Rect::new(data_x, header.y, data_w, 1);
            for slot in &slots {
                let (r, clip_left) = clipped_rect_x(row, scroll_x, slot.start as u64, slot.width as u32);
                if r.width == 0 {
                    continue;
                }
                let col = &self.schema.columns()[slot.index];
                let mark = match self.query.sort() {
                    Some(s) if s.column == slot.index && s.dir == SortDir::Asc => " ▲",
                    Some(s) if s.column == slot.index => " ▼",
                    _ => "",
                };
                let mut style = header_style;
                if slot.index == self.cursor_col {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                let label = format!("{}{mark}", col.name);
                draw_cell_text(buf, r, clip_left, &label, style);
                self.hit.columns.push((slot.index, r));
                self.draw_separator(buf, row, scroll_x, slot, grid_style);
            }
        }

        if let Some(filter_row) = filter_area {
            let style = base.patch(muted).patch(self.options.filter_style);
            buf.set_style(filter_row, style);
            self.hit.filter_row = Some(filter_row);
            let row = Rect::new(data_x, filter_row.y, data_w, 1);
            for slot in &slots {
                let (r, clip_left) = clipped_rect_x(row, scroll_x, slot.start as u64, slot.width as u32);
                if r.width == 0 {
                    continue;
                }
                let label = self.query.filter(slot.index).unwrap_or(ALL_LABEL);
                let label = format!("{label} ▾");
                draw_cell_text(buf, r, clip_left, &label, style);
                self.draw_separator(buf, row, scroll_x, slot, grid_style);
            }
        }

        self.hit.body = content;
        if total == 0 {
            if content.height > 0 {
                let message = if self.rows.is_empty() {
                    &self.config.language.empty_table
                } else {
                    &self.config.language.zero_records
                };
                render::render_str_truncated(
                    content.x,
                    content.y,
                    content.width,
                    buf,
                    message,
                    base.patch(muted),
                );
            }
        } else {
            let row_styles = RowStyles {
                base,
                stripe: self.options.stripe_style,
                selected: theme.highlight.patch(self.options.selected_style),
                cursor: self.options.cursor_style,
            };
            for line in 0..content.height {
                let position = range.start + self.state.y as usize + line as usize;
                if position >= range.end {
                    break;
                }
                let row = &self.rows[self.matching[position]];
                let y = content.y + line;
                let is_cursor = position == self.cursor;
                let is_selected = self.selection.is_selected(row.id());
                let style = row_styles.resolve((position - range.start) % 2 == 1, is_selected, is_cursor);
                let line_rect = Rect::new(content.x, y, content.width, 1);
                buf.set_style(line_rect, style);
                self.hit.body_positions.push(position);

                if check_w > 0 {
                    let mark = if is_selected { "[x]" } else { "[ ]" };
                    render::render_str_clipped(content.x, y, 0, check_w, buf, mark, style);
                }

                let row_rect = Rect::new(data_x, y, data_w, 1);
                for slot in &slots {
                    let (r, clip_left) =
                        clipped_rect_x(row_rect, scroll_x, slot.start as u64, slot.width as u32);
                    if r.width == 0 {
                        continue;
                    }
                    let ctx = DataTableCellContext {
                        row,
                        column: &self.schema.columns()[slot.index],
                        col_index: slot.index,
                        position,
                        clip_left,
                        is_cursor,
                        is_selected,
                    };
                    render_cell(r, ctx, buf, theme);
                    self.draw_separator(buf, row_rect, scroll_x, slot, grid_style);
                }
            }
        }

        if let Some(sb_x) = scrollbar_x {
            render::render_scrollbar(
                Rect::new(sb_x, body.y, 1, body.height),
                buf,
                &self.state,
                self.options.scrollbar_style,
            );
        }

        if let Some(r) = info_area {
            let info = self.page_info();
            let text = info.text(&self.config.language);
            render::render_str_truncated(r.x, r.y, r.width, buf, &text, base.patch(muted));
            if self.config.paging {
                let pages = format!("Page {}/{}", info.page + 1, info.pages);
                render_right(buf, r, &pages, base.patch(muted));
            }
        }
        if let Some(r) = footer_area {
            let text = &self.config.language.footer_text;
            let w = render::display_width(text).min(r.width as usize) as u16;
            let x = r.x + (r.width - w) / 2;
            render::render_str_truncated(x, r.y, w, buf, text, base.patch(muted));
        }

        if let Mode::Filter(dropdown) = &mut self.mode {
            let anchor = self
                .hit
                .columns
                .iter()
                .find(|(i, _)| *i == dropdown.column())
                .map(|(_, r)| r.x)
                .unwrap_or(data_x);
            let top = filter_area
                .or(header_area)
                .map(|r| r.y + 1)
                .unwrap_or(area.y);
            let max_h = area.bottom().saturating_sub(top);
            let (w, h) = dropdown.size_hint(max_h);
            let w = w.min(area.width);
            let x = anchor.min(area.right().saturating_sub(w));
            let popup_style = base.patch(self.options.popup_style);
            let cursor_style = popup_style.patch(self.options.cursor_style);
            dropdown.render(Rect::new(x, top, w, h), buf, popup_style, cursor_style);
        }
    }

    fn render_toolbar(&self, r: Rect, buf: &mut Buffer, base: Style, theme: &Theme) {
        let mut spans: Vec<Span<'static>> = Vec::new();
        if self.config.searching {
            let language = &self.config.language;
            let label = if language.search.is_empty() {
                "Search: ".to_string()
            } else {
                format!("{} ", language.search)
            };
            spans.push(Span::styled(label, base));
            let term = self.query.search();
            if term.is_empty() && !self.is_searching() {
                spans.push(Span::styled(
                    language.search_placeholder.clone(),
                    base.patch(theme.text_muted),
                ));
            } else {
                spans.push(Span::styled(term.to_string(), base.patch(theme.accent)));
            }
            if self.is_searching() {
                spans.push(Span::styled("▏", base.patch(theme.accent)));
            }
        }
        render::render_spans_clipped(r.x, r.y, 0, r.width, buf, &spans, base);

        if self.config.paging && self.config.length_change {
            let label = self.config.length_menu.label_for(self.query.page_length());
            let text = self.config.language.length_menu.replace("_MENU_", &label);
            render_right(buf, r, &text, base.patch(theme.text_muted));
        }
    }

    fn draw_separator(
        &self,
        buf: &mut Buffer,
        row: Rect,
        scroll_x: u64,
        slot: &ColumnSlot,
        style: Style,
    ) {
        if self.options.col_gap == 0 || slot.index + 1 >= self.schema.len() {
            return;
        }
        let sep_x_rel = (slot.start as u64 + slot.width as u64) as i64 - scroll_x as i64;
        if sep_x_rel < 0 || sep_x_rel >= row.width as i64 {
            return;
        }
        buf.set_span(
            row.x + sep_x_rel as u16,
            row.y,
            &Span::styled("│", style),
            1,
        );
    }
}

#[derive(Clone, Copy)]
struct RowStyles {
    base: Style,
    stripe: Style,
    selected: Style,
    cursor: Style,
}

impl RowStyles {
    fn resolve(&self, odd: bool, selected: bool, cursor: bool) -> Style {
        let mut style = self.base;
        if odd {
            style = style.patch(self.stripe);
        }
        if selected {
            style = style.patch(self.selected);
        }
        if cursor {
            style = style.patch(self.cursor);
        }
        style
    }
}

// Hands out single lines from the top and bottom of an area; whatever is left is the body.
struct LineAllocator {
    area: Rect,
}

impl LineAllocator {
    fn new(area: Rect) -> Self {
        Self { area }
    }

    fn take_top(&mut self) -> Option<Rect> {
        if self.area.height == 0 {
            return None;
        }
        let line = Rect::new(self.area.x, self.area.y, self.area.width, 1);
        self.area.y += 1;
        self.area.height -= 1;
        Some(line)
    }

    fn take_bottom(&mut self) -> Option<Rect> {
        if self.area.height == 0 {
            return None;
        }
        self.area.height -= 1;
        Some(Rect::new(
            self.area.x,
            self.area.y + self.area.height,
            self.area.width,
            1,
        ))
    }

    fn rest(&self) -> Rect {
        self.area
    }
}

fn clipped_rect_x(area: Rect, scroll_x: u64, start: u64, size: u32) -> (Rect, u32) {
    let rel = start as i64 - scroll_x as i64;
    let clip_left = (-rel).max(0) as u32;
    let x = rel.max(0).min(area.width as i64) as u16;
    let max_w = area.width.saturating_sub(x);
    let visible_w = size.saturating_sub(clip_left).min(max_w as u32) as u16;
    (
        Rect::new(area.x + x, area.y, visible_w, area.height),
        clip_left,
    )
}

fn draw_cell_text(buf: &mut Buffer, r: Rect, clip_left: u32, text: &str, style: Style) {
    if clip_left == 0 {
        render::render_str_truncated(r.x, r.y, r.width, buf, text, style);
    } else {
        render::render_str_clipped(r.x, r.y, clip_left, r.width, buf, text, style);
    }
}

fn render_right(buf: &mut Buffer, r: Rect, text: &str, style: Style) {
    let w = render::display_width(text) as u16;
    if w >= r.width {
        return;
    }
    render::render_str_clipped(r.x + r.width - w, r.y, 0, w, buf, text, style);
}
