//! Command-line syntax for list filters and sort clauses.
//!
//! Filters are `FIELD=VALUE`, `FIELD>VALUE` or `FIELD<VALUE`. A field may carry
//! both bounds, but not a bound and an exact value. Sort clauses are
//! `FIELD` or `FIELD:asc|desc`.

use client_core::{
    filters::{build_filters, FieldFilter, FilterMap, FilterMode},
    sort::{SortClause, SortDirection},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Gt,
    Lt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterExpr {
    pub field: String,
    pub comparison: Comparison,
    pub value: String,
}

pub fn parse_filter(raw: &str) -> Result<FilterExpr, String> {
    let Some(pos) = raw.find(|c: char| matches!(c, '=' | '>' | '<')) else {
        return Err(format!(
            "expected FIELD=VALUE, FIELD>VALUE or FIELD<VALUE, got '{raw}'"
        ));
    };
    let field = raw[..pos].trim();
    let value = raw[pos + 1..].trim();
    if field.is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }
    if value.is_empty() {
        return Err(format!("missing value for '{field}'"));
    }
    let comparison = match &raw[pos..pos + 1] {
        "=" => Comparison::Eq,
        ">" => Comparison::Gt,
        _ => Comparison::Lt,
    };
    Ok(FilterExpr {
        field: field.to_string(),
        comparison,
        value: value.to_string(),
    })
}

/// Folds expressions into per-field inputs and builds the request parameters.
pub fn collect_filters(exprs: &[FilterExpr]) -> Result<FilterMap, String> {
    let mut fields: Vec<FieldFilter> = Vec::new();
    for expr in exprs {
        let mode = match expr.comparison {
            Comparison::Eq => FilterMode::Eq,
            Comparison::Gt | Comparison::Lt => FilterMode::Range,
        };
        let idx = match fields.iter().position(|f| f.field == expr.field) {
            Some(idx) => idx,
            None => {
                fields.push(FieldFilter {
                    field: expr.field.clone(),
                    mode,
                    ..FieldFilter::default()
                });
                fields.len() - 1
            }
        };
        let slot = &mut fields[idx];
        if slot.mode != mode {
            return Err(format!(
                "'{}' cannot be both an exact match and a range",
                expr.field
            ));
        }
        let value = Some(expr.value.clone());
        match expr.comparison {
            Comparison::Eq => slot.eq_value = value,
            Comparison::Gt => slot.gt_value = value,
            Comparison::Lt => slot.lt_value = value,
        }
    }
    Ok(build_filters(&fields))
}

pub fn parse_sort(raw: &str) -> Result<SortClause, String> {
    let (field, direction) = match raw.split_once(':') {
        Some((field, dir)) => {
            let direction = match dir.trim().to_ascii_lowercase().as_str() {
                "asc" => SortDirection::Asc,
                "desc" => SortDirection::Desc,
                other => return Err(format!("unknown sort direction '{other}'")),
            };
            (field.trim(), direction)
        }
        None => (raw.trim(), SortDirection::Asc),
    };
    if field.is_empty() {
        return Err(format!("missing sort field in '{raw}'"));
    }
    Ok(SortClause::new(field, direction))
}

#[cfg(test)]
#[path = "tests/args_tests.rs"]
mod tests;
