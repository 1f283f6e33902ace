use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui_datatable::ColumnSchema;
use ratatui_datatable::DataTableConfig;
use ratatui_datatable::Record;
use ratatui_datatable::RecordId;
use ratatui_datatable::datatable::DataTableAction;
use ratatui_datatable::datatable::DataTableView;
use ratatui_datatable::input::InputEvent;
use ratatui_datatable::input::KeyCode;
use ratatui_datatable::input::KeyEvent;
use ratatui_datatable::store::JsonFileStore;
use ratatui_datatable::theme::Theme;
use std::cell::RefCell;
use std::rc::Rc;

fn schema() -> ColumnSchema {
    [("id", "ID"), ("name", "Name"), ("age", "Age"), ("city", "City")]
        .into_iter()
        .collect()
}

fn person(id: i64, name: &str, age: i64, city: &str) -> Record {
    Record::new()
        .with("id", id)
        .with("name", name)
        .with("age", age)
        .with("city", city)
}

fn records() -> Vec<Record> {
    vec![
        person(1, "John Doe", 28, "New York"),
        person(2, "Jane Smith", 32, "Los Angeles"),
        person(3, "Sam Wilson", 25, "Chicago"),
        person(4, "Chris Evans", 35, "Houston"),
        person(5, "Chris Evans", 35, "Houston"),
        person(6, "Alice Brown", 29, "Seattle"),
        Record::new()
            .with("name", "Jane Doe")
            .with("age", 29)
            .with("city", "Seattle"),
    ]
}

fn press(table: &mut DataTableView, code: KeyCode) -> DataTableAction {
    table.handle_event(InputEvent::Key(KeyEvent::new(code)))
}

fn ids(table: &DataTableView) -> Vec<RecordId> {
    table.selected().iter().map(|r| r.id().clone()).collect()
}

#[test]
fn duplicates_and_malformed_records_never_reach_the_table() {
    let mut records = records();
    records.push(person(1, "Someone Else", 40, "Boston"));
    let mut table = DataTableView::new(schema(), DataTableConfig::default());
    table.set_records(Some(records));
    let names: Vec<String> = table
        .rows()
        .iter()
        .map(|r| r.get("name").map(ToString::to_string).unwrap_or_default())
        .collect();
    assert_eq!(
        names,
        vec![
            "John Doe",
            "Jane Smith",
            "Sam Wilson",
            "Chris Evans",
            "Chris Evans",
            "Alice Brown"
        ]
    );
}

#[test]
fn selection_callback_gets_full_selection_in_order() {
    let seen: Rc<RefCell<Vec<Vec<RecordId>>>> = Rc::default();
    let sink = seen.clone();
    let mut table = DataTableView::new(schema(), DataTableConfig::default());
    table.set_records(Some(records()));
    table.on_select(move |rows| sink.borrow_mut().push(rows.iter().map(|r| r.id().clone()).collect()));

    press(&mut table, KeyCode::Down);
    press(&mut table, KeyCode::Down);
    press(&mut table, KeyCode::Char(' '));
    press(&mut table, KeyCode::Up);
    press(&mut table, KeyCode::Enter);
    assert_eq!(ids(&table), vec![RecordId::Int(3), RecordId::Int(2)]);

    press(&mut table, KeyCode::Char('a'));
    assert_eq!(table.selected().len(), 6);
    press(&mut table, KeyCode::Char('a'));

    assert_eq!(
        *seen.borrow(),
        vec![
            vec![RecordId::Int(3)],
            vec![RecordId::Int(3), RecordId::Int(2)],
            (1..=6).map(RecordId::Int).collect(),
            vec![],
        ]
    );
}

#[test]
fn new_records_keep_surviving_selection() {
    let mut table = DataTableView::new(schema(), DataTableConfig::default());
    table.set_records(Some(records()));
    press(&mut table, KeyCode::Char(' '));
    press(&mut table, KeyCode::Char('G'));
    press(&mut table, KeyCode::Char(' '));
    assert_eq!(ids(&table), vec![RecordId::Int(1), RecordId::Int(6)]);

    let mut next = records();
    next.remove(0);
    table.set_records(Some(next));
    assert_eq!(ids(&table), vec![RecordId::Int(6)]);

    table.set_records(None);
    assert!(table.selected().is_empty());
    assert!(!table.has_data());
}

#[test]
fn absent_data_renders_nothing() {
    let mut table = DataTableView::new(schema(), DataTableConfig::default());
    let area = Rect::new(0, 0, 50, 12);
    let mut buf = Buffer::empty(area);
    table.render(area, &mut buf, &Theme::default());
    assert_eq!(buf, Buffer::empty(area));
}

#[test]
fn config_json_turns_features_off() {
    let config = DataTableConfig::from_json(r#"{"selectable": false, "searching": false}"#)
        .expect("config");
    let mut table = DataTableView::new(schema(), config);
    table.set_records(Some(records()));
    assert_eq!(press(&mut table, KeyCode::Char(' ')), DataTableAction::None);
    assert_eq!(press(&mut table, KeyCode::Char('/')), DataTableAction::None);
    assert!(!table.is_searching());
    assert!(table.selected().is_empty());
}

#[test]
fn invalid_config_json_is_an_error() {
    let err = DataTableConfig::from_json(r#"{"pageLength": "ten"}"#).unwrap_err();
    assert!(err.to_string().starts_with("invalid table configuration"));
}

#[test]
fn column_filters_survive_a_restart_with_state_save() {
    let path = std::env::temp_dir().join(format!(
        "ratatui-datatable-state-{}.json",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    let config = DataTableConfig {
        state_save: true,
        ..Default::default()
    };

    {
        let mut table = DataTableView::new(schema(), config.clone());
        table.set_records(Some(records()));
        table.set_store(JsonFileStore::open(&path).expect("open store"));
        table.set_filter(1, Some("Chris Evans".to_string()));
        assert_eq!(table.matching_rows().count(), 2);
    }

    let mut table = DataTableView::new(schema(), config);
    table.set_records(Some(records()));
    table.set_store(JsonFileStore::open(&path).expect("reopen store"));
    assert_eq!(table.query().filter(1), Some("Chris Evans"));
    assert_eq!(table.matching_rows().count(), 2);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn records_from_json_keep_field_order() {
    let records: Vec<Record> = serde_json::from_str(
        r#"[
            {"id": 1, "name": "John Doe", "age": 28, "city": "New York"},
            {"name": "Jane Smith", "id": 2, "age": 32, "city": "Los Angeles"},
            {"id": "", "name": "No Id", "age": 1, "city": "Nowhere"}
        ]"#,
    )
    .expect("records");
    let mut table = DataTableView::new(schema(), DataTableConfig::default());
    table.set_records(Some(records.clone()));
    assert_eq!(table.rows().len(), 2);
    assert_eq!(table.rows()[0].id(), &RecordId::Int(1));
    // Empty text is no identity, so the third record gets a generated one.
    assert!(table.rows()[1].id().is_generated());

    let config = DataTableConfig::from_json(r#"{"keyMatch": "anyOrder"}"#).expect("config");
    let mut table = DataTableView::new(schema(), config);
    table.set_records(Some(records));
    assert_eq!(table.rows().len(), 3);
    assert_eq!(
        table.rows()[1].record().keys().collect::<Vec<_>>(),
        vec!["id", "name", "age", "city"]
    );
}
