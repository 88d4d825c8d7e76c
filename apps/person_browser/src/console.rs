//! Terminal output: notifications and the person table.

use std::fmt::Write as _;

use client_core::{
    form::FormMode,
    notify::{NotificationSink, Severity},
    query::QueryDescriptor,
    sort::{sort_meta, SortDirection},
    store::ResultSnapshot,
};
use shared::domain::Person;
use tracing::debug;

pub struct ConsoleNotificationSink;

impl NotificationSink for ConsoleNotificationSink {
    fn notify(&self, message: &str, severity: Severity) {
        print_notification(message, severity);
    }
}

pub fn print_notification(message: &str, severity: Severity) {
    debug!(target: "notifications", ?severity, "{message}");
    match severity {
        Severity::Info => eprintln!("{message}"),
        Severity::Error => eprintln!("error: {message}"),
    }
}

/// Table columns as `(column key, header)`; keys are what `sort` and `filter` accept.
pub const COLUMNS: &[(&str, &str)] = &[
    ("id", "ID"),
    ("name", "Name"),
    ("height", "Height"),
    ("weight", "Weight"),
    ("birthday", "Birthday"),
    ("nationality", "Nationality"),
    ("coordinatesX", "X"),
    ("coordinatesY", "Y"),
    ("locationName", "Location"),
];

fn cell(person: &Person, column: &str) -> String {
    match column {
        "id" => person.id.to_string(),
        "name" => person.name.clone(),
        "height" => person.height.to_string(),
        "weight" => person.weight.map(|w| w.to_string()).unwrap_or_default(),
        "birthday" => person.birthday.to_string(),
        "nationality" => person.nationality.to_string(),
        "coordinatesX" => person.coordinates.x.to_string(),
        "coordinatesY" => person.coordinates.y.to_string(),
        "locationName" => person.location.name.clone(),
        _ => String::new(),
    }
}

/// Header label with the column's sort direction and precedence, e.g. `Name ▲1`.
pub fn header_label(descriptor: &QueryDescriptor, column: &str, title: &str) -> String {
    let meta = sort_meta(&descriptor.sort, column);
    match (meta.direction, meta.index) {
        (Some(SortDirection::Asc), Some(idx)) => format!("{title} ▲{idx}"),
        (Some(SortDirection::Desc), Some(idx)) => format!("{title} ▼{idx}"),
        _ => title.to_string(),
    }
}

pub fn page_count(total: u64, page_size: u32) -> u64 {
    total.div_ceil(u64::from(page_size.max(1))).max(1)
}

pub fn render_page(snapshot: &ResultSnapshot<Person>, descriptor: &QueryDescriptor) -> String {
    let headers: Vec<String> = COLUMNS
        .iter()
        .map(|(key, title)| header_label(descriptor, key, title))
        .collect();
    let rows: Vec<Vec<String>> = snapshot
        .data()
        .iter()
        .map(|p| COLUMNS.iter().map(|(key, _)| cell(p, key)).collect())
        .collect();

    let widths: Vec<usize> = (0..COLUMNS.len())
        .map(|i| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(headers[i].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_row(&mut out, &headers, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    if rows.is_empty() {
        out.push_str("(no persons)\n");
    }

    let pagination = descriptor.pagination;
    let _ = writeln!(
        out,
        "page {} of {}, {} persons total",
        pagination.page() + 1,
        page_count(snapshot.total(), pagination.page_size()),
        snapshot.total()
    );
    out
}

/// Table for the accepted page, drawn under the query that produced it.
/// `None` while no fetch has succeeded yet.
pub fn render_accepted(snapshot: &ResultSnapshot<Person>) -> Option<String> {
    snapshot
        .query
        .as_deref()
        .map(|query| render_page(snapshot, query))
}

/// Redraws only when a new page has been accepted.
#[derive(Default)]
pub struct PageRenderer {
    last: Option<ResultSnapshot<Person>>,
}

impl PageRenderer {
    /// A failed fetch clears loading but leaves the old page, which is not drawn again.
    pub fn on_update(&mut self, snapshot: &ResultSnapshot<Person>) -> Option<String> {
        if snapshot.loading || self.last.as_ref().is_some_and(|last| last.same_page(snapshot)) {
            return None;
        }
        let table = render_accepted(snapshot)?;
        self.last = Some(snapshot.clone());
        Some(table)
    }
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(c, w)| format!("{c:<w$}", w = *w))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

pub fn render_person(mode: FormMode, person: &Person) -> String {
    let mut out = format!("{} #{}\n", mode.title(), person.id);
    let fields = [
        ("name", person.name.clone()),
        ("coordinates", person.coordinates.to_string()),
        ("created", person.creation_date.to_rfc3339()),
        ("height", person.height.to_string()),
        ("birthday", person.birthday.to_string()),
        (
            "weight",
            person.weight.map(|w| w.to_string()).unwrap_or_else(|| "-".into()),
        ),
        ("nationality", person.nationality.to_string()),
        ("location", person.location.to_string()),
        (
            "hair color",
            person
                .hair_color
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".into()),
        ),
        (
            "eye color",
            person
                .eye_color
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".into()),
        ),
    ];
    for (label, value) in fields {
        let _ = writeln!(out, "  {label:<12} {value}");
    }
    if !mode.is_editable() {
        out.push_str("  (read only)\n");
    }
    out
}

#[cfg(test)]
#[path = "tests/console_tests.rs"]
mod tests;
