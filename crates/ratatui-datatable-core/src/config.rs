//! Table behaviour configuration.
//!
//! [`DataTableConfig`] deserializes from partial JSON: every missing option keeps its default, so
//! a host can pass `{"pageLength": 10, "selectable": false}` and get the rest of the defaults.
use crate::datatable::query::ALL_ROWS;
use crate::datatable::query::SortSpec;
use crate::record::Value;
use crate::sanitize::KeyMatch;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid table configuration: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataTableConfig {
    pub paging: bool,
    pub searching: bool,
    /// Per-column dropdown filters.
    pub column_filter: bool,
    pub ordering: bool,
    /// Lets the user cycle the page length through `length_menu`.
    pub length_change: bool,
    pub length_menu: LengthMenu,
    /// Rows per page. A negative length shows every row on one page.
    pub page_length: i64,
    /// Initial sort. Only the first entry is applied.
    pub order: Vec<SortSpec>,
    pub footer: bool,
    pub selectable: bool,
    /// Share the available width between columns instead of scrolling horizontally.
    pub responsive: bool,
    /// Persist column filter values in the attached key-value store.
    pub state_save: bool,
    pub key_match: KeyMatch,
    pub language: Language,
}

impl Default for DataTableConfig {
    fn default() -> Self {
        Self {
            paging: true,
            searching: true,
            column_filter: true,
            ordering: true,
            length_change: true,
            length_menu: LengthMenu::default(),
            page_length: 5,
            order: Vec::new(),
            footer: true,
            selectable: true,
            responsive: true,
            state_save: false,
            key_match: KeyMatch::Exact,
            language: Language::default(),
        }
    }
}

impl DataTableConfig {
    /// Parses a partial JSON override on top of the defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Page length used for paging, never zero.
    pub fn effective_page_length(&self) -> usize {
        page_rows(self.page_length).unwrap_or(1)
    }
}

fn page_rows(length: i64) -> Option<usize> {
    match length {
        0 => None,
        n if n < 0 => Some(ALL_ROWS),
        n => usize::try_from(n).ok(),
    }
}

/// Page length choices, as a flat list (`[5, 10, 25]`) or as lengths plus labels
/// (`[[5, 10, -1], [5, 10, "All"]]`). A negative length stands for all rows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LengthMenu {
    Labeled(Vec<i64>, Vec<Value>),
    Lengths(Vec<i64>),
}

impl Default for LengthMenu {
    fn default() -> Self {
        LengthMenu::Lengths(vec![5, 10, 25, 50, 100])
    }
}

/// A usable [`LengthMenu`] entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LengthOption {
    /// Rows per page, [`ALL_ROWS`] for the all-rows entry.
    pub rows: usize,
    pub label: String,
}

impl LengthMenu {
    /// Entries in menu order. Zero lengths are skipped.
    pub fn options(&self) -> Vec<LengthOption> {
        let (lengths, labels): (&[i64], &[Value]) = match self {
            LengthMenu::Labeled(lengths, labels) => (lengths.as_slice(), labels.as_slice()),
            LengthMenu::Lengths(lengths) => (lengths.as_slice(), &[]),
        };
        lengths
            .iter()
            .enumerate()
            .filter_map(|(i, &length)| {
                let rows = page_rows(length)?;
                let label = labels
                    .get(i)
                    .map(ToString::to_string)
                    .unwrap_or_else(|| default_label(rows));
                Some(LengthOption { rows, label })
            })
            .collect()
    }

    /// What the toolbar shows for `rows` per page.
    pub fn label_for(&self, rows: usize) -> String {
        self.options()
            .into_iter()
            .find(|o| o.rows == rows)
            .map(|o| o.label)
            .unwrap_or_else(|| default_label(rows))
    }
}

fn default_label(rows: usize) -> String {
    if rows == ALL_ROWS {
        "All".to_string()
    } else {
        rows.to_string()
    }
}

/// User-facing messages. `info`, `info_empty` and `info_filtered` understand the `_START_`,
/// `_END_`, `_TOTAL_` and `_MAX_` placeholders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Language {
    pub search_placeholder: String,
    pub search: String,
    pub info: String,
    pub info_empty: String,
    pub info_filtered: String,
    pub empty_table: String,
    pub zero_records: String,
    pub length_menu: String,
    pub footer_text: String,
}

impl Default for Language {
    fn default() -> Self {
        Self {
            search_placeholder: "Search...".to_string(),
            search: String::new(),
            info: "Showing _START_ to _END_ of _TOTAL_ entries".to_string(),
            info_empty: "Showing 0 to 0 of 0 entries".to_string(),
            info_filtered: "(filtered from _MAX_ total entries)".to_string(),
            empty_table: "No data available in the table".to_string(),
            zero_records: "No matching records found".to_string(),
            length_menu: "Show _MENU_ entries".to_string(),
            footer_text: "Powered by ratatui".to_string(),
        }
    }
}
