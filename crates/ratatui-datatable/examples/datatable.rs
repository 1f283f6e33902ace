use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableMouseCapture;
use crossterm::event::Event;
use crossterm::event::KeyCode;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui_datatable::ColumnSchema;
use ratatui_datatable::DataTableConfig;
use ratatui_datatable::Record;
use ratatui_datatable::crossterm_input::input_event_from_crossterm;
use ratatui_datatable::datatable::DataTableAction;
use ratatui_datatable::datatable::DataTableView;
use ratatui_datatable::help::HelpBar;
use ratatui_datatable::keymap;
use ratatui_datatable::store::JsonFileStore;
use ratatui_datatable::theme::Theme;
use std::cell::RefCell;
use std::fs::File;
use std::io;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_FILE: &str = "datatable.log";
const STATE_FILE: &str = "datatable-state.json";

fn main() -> io::Result<()> {
    init_logging()?;

    let config_json = std::env::args().nth(1);
    let config = match config_json.as_deref() {
        Some(json) => DataTableConfig::from_json(json)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?,
        None => DataTableConfig {
            state_save: true,
            ..Default::default()
        },
    };

    let mut table = DataTableView::new(sample_columns(), config);
    table.set_records(Some(sample_data()));
    if table.config().state_save {
        match JsonFileStore::open(STATE_FILE) {
            Ok(store) => table.set_store(store),
            Err(err) => tracing::warn!(%err, "column filters will not be saved"),
        }
    }

    let last_selection = Rc::new(RefCell::new(String::from("-")));
    let sink = last_selection.clone();
    table.on_select(move |rows| {
        let names: Vec<String> = rows
            .iter()
            .map(|r| r.get("name").map(ToString::to_string).unwrap_or_default())
            .collect();
        tracing::info!(count = rows.len(), ?names, "selection changed");
        *sink.borrow_mut() = if names.is_empty() {
            "-".to_string()
        } else {
            names.join(", ")
        };
    });

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    crossterm::execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let theme = Theme::default();
    let res = run(&mut terminal, &theme, &mut table, &last_selection);

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    res
}

fn init_logging() -> io::Result<()> {
    let file = File::create(LOG_FILE)?;
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ratatui_datatable_core=debug,info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(io::Error::other)
}

fn run<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    theme: &Theme,
    table: &mut DataTableView,
    last_selection: &RefCell<String>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| {
            let area = f.area();
            let block = Block::default()
                .title("ratatui-datatable (q to quit)")
                .borders(Borders::ALL);
            let inner = block.inner(area);
            f.render_widget(block, area);

            let buf = f.buffer_mut();
            let table_area = Rect::new(
                inner.x,
                inner.y,
                inner.width,
                inner.height.saturating_sub(2),
            );
            let status_area = Rect::new(inner.x, inner.y + table_area.height, inner.width, 1);
            let help_area = Rect::new(inner.x, status_area.y + 1, inner.width, 1);

            table.render(table_area, buf, theme);

            let status = format!("selected: {}", last_selection.borrow());
            buf.set_span(
                status_area.x,
                status_area.y,
                &Span::styled(status, theme.text_primary),
                status_area.width,
            );

            let mut help = HelpBar::for_table(table, theme);
            help.push(keymap::Binding::new(
                "q",
                "quit",
                vec![keymap::key_char('q')],
            ));
            help.render_ref(help_area, buf);
        })?;

        if !crossterm::event::poll(Duration::from_millis(50))? {
            continue;
        }
        let ev = crossterm::event::read()?;
        if let Event::Key(key) = &ev {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let typing = table.is_searching() || table.is_filter_open();
            let ctrl_c =
                key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
            if ctrl_c || (!typing && key.code == KeyCode::Char('q')) {
                return Ok(());
            }
        }

        if let Some(ev) = input_event_from_crossterm(ev) {
            match table.handle_event(ev) {
                DataTableAction::SelectionChanged => {
                    tracing::debug!(selected = table.selected().len(), "selection updated");
                }
                DataTableAction::Redraw | DataTableAction::None => {}
            }
        }
    }
}

fn sample_columns() -> ColumnSchema {
    [("id", "ID"), ("name", "Name"), ("age", "Age"), ("city", "City")]
        .into_iter()
        .collect()
}

fn sample_data() -> Vec<Record> {
    let people = [
        (1, "John Doe", 28, "New York"),
        (2, "Jane Smith", 32, "Los Angeles"),
        (3, "Sam Wilson", 25, "Chicago"),
        (4, "Chris Evans", 35, "Houston"),
        (5, "Chris Evans", 35, "Houston"),
        (6, "Alice Brown", 29, "Seattle"),
    ];
    let mut records: Vec<Record> = people
        .iter()
        .map(|&(id, name, age, city)| {
            Record::new()
                .with("id", id)
                .with("name", name)
                .with("age", age)
                .with("city", city)
        })
        .collect();
    // No id, so it does not match the columns and is dropped.
    records.push(
        Record::new()
            .with("name", "Jane Doe")
            .with("age", 29)
            .with("city", "Seattle"),
    );
    records
}
