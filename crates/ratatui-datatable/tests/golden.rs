use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui_datatable::ColumnSchema;
use ratatui_datatable::DataTableConfig;
use ratatui_datatable::Record;
use ratatui_datatable::datatable::DataTableView;
use ratatui_datatable::theme::Theme;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

#[derive(Clone, Debug)]
struct GoldenCase {
    name: &'static str,
    width: u16,
    height: u16,
    config: DataTableConfig,
}

fn repo_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .canonicalize()
        .expect("repo root")
}

fn golden_path(case: &GoldenCase) -> PathBuf {
    repo_root()
        .join("docs/fixtures/golden/datatable")
        .join(format!("{}__{}x{}.txt", case.name, case.width, case.height))
}

fn normalize(s: &str) -> String {
    let mut out = String::new();
    for (i, line) in s.replace("\r\n", "\n").split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(line.trim_end());
    }
    out.trim_end_matches('\n').to_string()
}

fn sample_records() -> Vec<Record> {
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
    records.push(
        Record::new()
            .with("name", "Jane Doe")
            .with("age", 29)
            .with("city", "Seattle"),
    );
    records
}

fn buffer_to_text(buf: &Buffer) -> String {
    let area = buf.area;
    (area.y..area.bottom())
        .map(|y| {
            (area.x..area.right())
                .map(|x| buf.cell((x, y)).map(|c| c.symbol()).unwrap_or(" "))
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render(case: &GoldenCase) -> String {
    let schema: ColumnSchema = [("id", "ID"), ("name", "Name"), ("age", "Age"), ("city", "City")]
        .into_iter()
        .collect();
    let mut table = DataTableView::new(schema, case.config.clone());
    table.set_records(Some(sample_records()));
    let area = Rect::new(0, 0, case.width, case.height);
    let mut buf = Buffer::empty(area);
    table.render(area, &mut buf, &Theme::default());
    normalize(&buffer_to_text(&buf))
}

fn update_goldens_enabled() -> bool {
    matches!(
        std::env::var("UPDATE_GOLDENS").as_deref(),
        Ok("1" | "true" | "yes")
    )
}

fn check_golden(case: GoldenCase) {
    let got = render(&case);
    let path = golden_path(&case);

    if update_goldens_enabled() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create golden dir");
        }
        fs::write(&path, format!("{got}\n")).expect("write golden");
        return;
    }

    let expected = fs::read_to_string(&path).unwrap_or_else(|_| {
        panic!(
            "missing golden file: {}\nRun: UPDATE_GOLDENS=1 cargo test -p ratatui-datatable golden",
            path.display()
        )
    });
    let expected = normalize(&expected);
    assert_eq!(
        got,
        expected,
        "golden mismatch: {}\nRun: UPDATE_GOLDENS=1 cargo test -p ratatui-datatable golden",
        path.display()
    );
}

#[test]
fn golden_sample_default_config() {
    check_golden(GoldenCase {
        name: "sample",
        width: 60,
        height: 14,
        config: DataTableConfig::default(),
    });
}
