//! Multi-column sort state and its toggle state machine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::filters::backend_field;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortClause {
    pub field: String,
    pub direction: SortDirection,
}

impl SortClause {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    /// `field,direction`, the form the list endpoint expects for each `sort` parameter.
    pub fn to_param(&self) -> String {
        format!("{},{}", self.field, self.direction)
    }
}

/// Rendering hint for a column header. `index` is the 1-based precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortMeta {
    pub direction: Option<SortDirection>,
    pub index: Option<usize>,
}

/// Looks up `column` (a UI column name) in an existing list of sort clauses.
pub fn sort_meta(clauses: &[SortClause], column: &str) -> SortMeta {
    let field = backend_field(column);
    clauses
        .iter()
        .position(|c| c.field == field)
        .map(|idx| SortMeta {
            direction: Some(clauses[idx].direction),
            index: Some(idx + 1),
        })
        .unwrap_or_default()
}

/// Ordered, field-unique list of sort clauses. The first clause is the primary key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortController {
    clauses: Vec<SortClause>,
}

impl SortController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a controller from arbitrary clauses; later duplicates of a field are dropped.
    pub fn from_clauses(clauses: impl IntoIterator<Item = SortClause>) -> Self {
        let mut out: Vec<SortClause> = Vec::new();
        for clause in clauses {
            let field = backend_field(&clause.field).to_string();
            if out.iter().all(|c| c.field != field) {
                out.push(SortClause::new(field, clause.direction));
            }
        }
        Self { clauses: out }
    }

    pub fn clauses(&self) -> &[SortClause] {
        &self.clauses
    }

    /// Advances the state machine for a click on `column`.
    ///
    /// Single mode collapses the clause list to at most one clause
    /// (`absent -> asc -> desc -> unsorted`). Multi mode edits only the clicked
    /// clause: appended as `asc`, flipped in place to `desc`, then removed.
    pub fn toggle(&mut self, column: &str, multi: bool) {
        let field = backend_field(column);
        let existing = self.clauses.iter().position(|c| c.field == field);

        if !multi {
            self.clauses = match existing.map(|idx| self.clauses[idx].direction) {
                None => vec![SortClause::asc(field)],
                Some(SortDirection::Asc) => vec![SortClause::desc(field)],
                Some(SortDirection::Desc) => Vec::new(),
            };
            return;
        }

        match existing {
            None => self.clauses.push(SortClause::asc(field)),
            Some(idx) if self.clauses[idx].direction == SortDirection::Asc => {
                self.clauses[idx].direction = SortDirection::Desc;
            }
            Some(idx) => {
                self.clauses.remove(idx);
            }
        }
    }

    pub fn sort_meta(&self, column: &str) -> SortMeta {
        sort_meta(&self.clauses, column)
    }
}

#[cfg(test)]
#[path = "tests/sort_tests.rs"]
mod tests;
