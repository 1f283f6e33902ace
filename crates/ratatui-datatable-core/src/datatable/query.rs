//! Search, column filters, sorting, and paging over sanitized rows.
use crate::config::Language;
use crate::record::Row;
use crate::schema::ColumnSchema;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::ops::Range;

/// Page length that puts every matching row on one page.
pub const ALL_ROWS: usize = usize::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

/// Sort by the column at schema index `column`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: usize,
    pub dir: SortDir,
}

/// The view state of the table engine: what is searched, filtered, sorted, and which page shows.
#[derive(Clone, Debug)]
pub struct TableQuery {
    search: String,
    filters: BTreeMap<usize, String>,
    sort: Option<SortSpec>,
    page: usize,
    page_length: usize,
    paging: bool,
}

impl Default for TableQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            filters: BTreeMap::new(),
            sort: None,
            page: 0,
            page_length: 5,
            paging: true,
        }
    }
}

impl TableQuery {
    pub fn new(paging: bool, page_length: usize) -> Self {
        Self {
            paging,
            page_length: page_length.max(1),
            ..Default::default()
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 0;
    }

    pub fn filter(&self, column: usize) -> Option<&str> {
        self.filters.get(&column).map(String::as_str)
    }

    /// Restricts `column` to cells equal to `value`; `None` or an empty value removes the filter.
    pub fn set_filter(&mut self, column: usize, value: Option<String>) {
        match value {
            Some(v) if !v.is_empty() => {
                self.filters.insert(column, v);
            }
            _ => {
                self.filters.remove(&column);
            }
        }
        self.page = 0;
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.page = 0;
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.sort = sort;
    }

    /// Ascending, then descending, then unsorted.
    pub fn cycle_sort(&mut self, column: usize) {
        self.sort = match self.sort {
            Some(SortSpec {
                column: c,
                dir: SortDir::Asc,
            }) if c == column => Some(SortSpec {
                column,
                dir: SortDir::Desc,
            }),
            Some(SortSpec {
                column: c,
                dir: SortDir::Desc,
            }) if c == column => None,
            _ => Some(SortSpec {
                column,
                dir: SortDir::Asc,
            }),
        };
    }

    pub fn paging(&self) -> bool {
        self.paging
    }

    pub fn set_paging(&mut self, paging: bool) {
        self.paging = paging;
        self.page = 0;
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_length(&self) -> usize {
        self.page_length
    }

    pub fn set_page_length(&mut self, page_length: usize) {
        self.page_length = page_length.max(1);
        self.page = 0;
    }

    pub fn page_count(&self, total: usize) -> usize {
        if !self.paging {
            return 1;
        }
        total.div_ceil(self.page_length).max(1)
    }

    pub fn set_page(&mut self, page: usize, total: usize) {
        self.page = page.min(self.page_count(total) - 1);
    }

    /// Positions (into the matching list) shown on the current page.
    pub fn page_range(&self, total: usize) -> Range<usize> {
        if !self.paging {
            return 0..total;
        }
        let page = self.page.min(self.page_count(total) - 1);
        let start = page.saturating_mul(self.page_length);
        start.min(total)..start.saturating_add(self.page_length).min(total)
    }

    /// Indices into `rows` that pass search and filters, in display order.
    pub fn matching(&self, rows: &[Row], schema: &ColumnSchema) -> Vec<usize> {
        let words: Vec<String> = self
            .search
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        let filters: Vec<(&str, &str)> = self
            .filters
            .iter()
            .filter_map(|(&col, value)| schema.get(col).map(|c| (c.key.as_str(), value.as_str())))
            .collect();

        let mut out: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                filters
                    .iter()
                    .all(|(key, value)| cell_text(row, key) == *value)
            })
            .filter(|(_, row)| words.is_empty() || matches_words(row, schema, &words))
            .map(|(i, _)| i)
            .collect();

        let sort = self
            .sort
            .and_then(|s| schema.get(s.column).map(|c| (s.dir, c.key.as_str())));
        if let Some((dir, key)) = sort {
            out.sort_by(|&a, &b| {
                let ord = match (rows[a].get(key), rows[b].get(key)) {
                    (Some(x), Some(y)) => x.compare(y),
                    (None, Some(_)) => std::cmp::Ordering::Less,
                    (Some(_), None) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                };
                match dir {
                    SortDir::Asc => ord,
                    SortDir::Desc => ord.reverse(),
                }
            });
        }
        out
    }
}

fn cell_text(row: &Row, key: &str) -> String {
    row.get(key).map(ToString::to_string).unwrap_or_default()
}

// Every word has to occur in at least one cell.
fn matches_words(row: &Row, schema: &ColumnSchema, words: &[String]) -> bool {
    let cells: Vec<String> = schema
        .keys()
        .map(|k| cell_text(row, k).to_lowercase())
        .collect();
    words
        .iter()
        .all(|w| cells.iter().any(|cell| cell.contains(w.as_str())))
}

/// Sorted distinct display values of `key` across `rows`, for filter dropdowns.
pub fn distinct_values(rows: &[Row], key: &str) -> Vec<String> {
    rows.iter()
        .filter_map(|r| r.get(key).map(ToString::to_string))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Counts for the "Showing x to y of z entries" line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageInfo {
    /// 1-based index of the first shown entry, 0 when nothing is shown.
    pub start: usize,
    pub end: usize,
    /// Entries passing search and filters.
    pub total: usize,
    /// All sanitized entries.
    pub max: usize,
    pub page: usize,
    pub pages: usize,
}

impl PageInfo {
    pub fn new(query: &TableQuery, total: usize, max: usize) -> Self {
        let range = query.page_range(total);
        Self {
            start: if range.is_empty() { 0 } else { range.start + 1 },
            end: range.end,
            total,
            max,
            page: query.page().min(query.page_count(total) - 1),
            pages: query.page_count(total),
        }
    }

    pub fn text(&self, language: &Language) -> String {
        let template = if self.total == 0 {
            &language.info_empty
        } else {
            &language.info
        };
        let mut out = self.fill(template);
        if self.total < self.max && !language.info_filtered.is_empty() {
            out.push(' ');
            out.push_str(&self.fill(&language.info_filtered));
        }
        out
    }

    fn fill(&self, template: &str) -> String {
        template
            .replace("_START_", &self.start.to_string())
            .replace("_END_", &self.end.to_string())
            .replace("_TOTAL_", &self.total.to_string())
            .replace("_MAX_", &self.max.to_string())
    }
}
