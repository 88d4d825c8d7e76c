//! Per-field filter inputs and their translation into query parameters.
//!
//! `eq` fields become `field=value`; `range` fields become `field[gt]=..` and/or
//! `field[lt]=..`. Empty inputs never produce a parameter: absence means "no
//! constraint", not "match the empty string".

use std::collections::BTreeMap;

/// Flat `parameter name -> value` mapping sent with the list request.
pub type FilterMap = BTreeMap<String, String>;

/// Translates a UI column name into the backend's (possibly dotted) field path.
pub fn backend_field(column: &str) -> &str {
    match column {
        "coordinatesX" => "coordinates.x",
        "coordinatesY" => "coordinates.y",
        "locationX" => "location.x",
        "locationY" => "location.y",
        "locationName" => "location.name",
        other => other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    #[default]
    Eq,
    Range,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldFilter {
    pub field: String,
    pub mode: FilterMode,
    pub eq_value: Option<String>,
    pub gt_value: Option<String>,
    pub lt_value: Option<String>,
}

impl FieldFilter {
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            mode: FilterMode::Eq,
            eq_value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn range(field: impl Into<String>, gt: Option<String>, lt: Option<String>) -> Self {
        Self {
            field: field.into(),
            mode: FilterMode::Range,
            gt_value: gt,
            lt_value: lt,
            ..Self::default()
        }
    }

    fn emit_into(&self, out: &mut FilterMap) {
        let field = backend_field(&self.field);
        match self.mode {
            FilterMode::Eq => {
                if let Some(value) = non_empty(&self.eq_value) {
                    out.insert(field.to_string(), value.to_string());
                }
            }
            FilterMode::Range => {
                if let Some(value) = non_empty(&self.gt_value) {
                    out.insert(format!("{field}[gt]"), value.to_string());
                }
                if let Some(value) = non_empty(&self.lt_value) {
                    out.insert(format!("{field}[lt]"), value.to_string());
                }
            }
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

pub fn build_filters<'a>(fields: impl IntoIterator<Item = &'a FieldFilter>) -> FilterMap {
    let mut out = FilterMap::new();
    for field in fields {
        field.emit_into(&mut out);
    }
    out
}

/// Mode plus the three raw inputs of one comparable column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComparableInput {
    pub mode: FilterMode,
    pub eq: String,
    pub gt: String,
    pub lt: String,
}

impl ComparableInput {
    fn to_filter(&self, field: &str) -> FieldFilter {
        FieldFilter {
            field: field.to_string(),
            mode: self.mode,
            eq_value: Some(self.eq.clone()),
            gt_value: Some(self.gt.clone()),
            lt_value: Some(self.lt.clone()),
        }
    }
}

/// The person table's filter form: comparable columns plus two plain text columns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersonFilterForm {
    pub id: ComparableInput,
    pub name: String,
    pub height: ComparableInput,
    pub weight: ComparableInput,
    pub nationality: String,
    pub birthday: ComparableInput,
}

impl PersonFilterForm {
    pub fn fields(&self) -> Vec<FieldFilter> {
        vec![
            self.id.to_filter("id"),
            FieldFilter::eq("name", self.name.clone()),
            self.height.to_filter("height"),
            self.weight.to_filter("weight"),
            FieldFilter::eq("nationality", self.nationality.clone()),
            self.birthday.to_filter("birthday"),
        ]
    }

    pub fn to_filters(&self) -> FilterMap {
        build_filters(&self.fields())
    }
}

#[cfg(test)]
#[path = "tests/filters_tests.rs"]
mod tests;
