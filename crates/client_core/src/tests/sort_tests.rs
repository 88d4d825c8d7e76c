use super::*;

fn asc(field: &str) -> SortClause {
    SortClause::asc(field)
}

fn desc(field: &str) -> SortClause {
    SortClause::desc(field)
}

#[test]
fn single_toggle_cycles_back_to_unsorted() {
    let mut sort = SortController::new();
    let initial = sort.clone();

    sort.toggle("name", false);
    assert_eq!(sort.clauses(), &[asc("name")]);
    sort.toggle("name", false);
    assert_eq!(sort.clauses(), &[desc("name")]);
    sort.toggle("name", false);
    assert_eq!(sort, initial);
    sort.toggle("name", false);
    assert_eq!(sort.clauses(), &[asc("name")]);
}

#[test]
fn multi_toggle_appends_in_click_order() {
    let mut sort = SortController::new();
    sort.toggle("a", true);
    sort.toggle("b", true);

    assert_eq!(sort.clauses(), &[asc("a"), asc("b")]);
    assert_eq!(
        sort.sort_meta("b"),
        SortMeta {
            direction: Some(SortDirection::Asc),
            index: Some(2),
        }
    );
}

#[test]
fn single_toggle_collapses_multi_sort() {
    let mut sort = SortController::from_clauses([asc("a"), asc("b")]);
    sort.toggle("c", false);
    assert_eq!(sort.clauses(), &[asc("c")]);
}

#[test]
fn single_toggle_on_secondary_clause_keeps_only_it() {
    let mut sort = SortController::from_clauses([asc("a"), asc("b")]);
    sort.toggle("b", false);
    assert_eq!(sort.clauses(), &[desc("b")]);
}

#[test]
fn multi_toggle_flips_in_place_then_removes() {
    let mut sort = SortController::from_clauses([asc("a"), asc("b"), asc("c")]);

    sort.toggle("b", true);
    assert_eq!(sort.clauses(), &[asc("a"), desc("b"), asc("c")]);

    sort.toggle("b", true);
    assert_eq!(sort.clauses(), &[asc("a"), asc("c")]);
    assert_eq!(sort.sort_meta("c").index, Some(2));
}

#[test]
fn toggle_translates_nested_columns() {
    let mut sort = SortController::new();
    sort.toggle("coordinatesX", true);
    sort.toggle("locationName", true);

    assert_eq!(
        sort.clauses(),
        &[asc("coordinates.x"), asc("location.name")]
    );
    assert_eq!(sort.sort_meta("locationName").index, Some(2));
    assert_eq!(sort.clauses()[0].to_param(), "coordinates.x,asc");
}

#[test]
fn meta_for_absent_column_is_empty() {
    let sort = SortController::from_clauses([desc("height")]);
    assert_eq!(sort.sort_meta("weight"), SortMeta::default());
    assert_eq!(
        sort.sort_meta("height").direction,
        Some(SortDirection::Desc)
    );
}

#[test]
fn from_clauses_keeps_first_occurrence_of_a_field() {
    let sort = SortController::from_clauses([asc("a"), desc("a"), desc("b")]);
    assert_eq!(sort.clauses(), &[asc("a"), desc("b")]);
}

#[test]
fn every_transition_preserves_field_uniqueness() {
    let columns = ["a", "b", "c"];
    let mut sort = SortController::new();
    for step in 0..60 {
        let column = columns[(step * 7 + step / 3) % columns.len()];
        sort.toggle(column, step % 4 != 0);
        let mut fields = sort
            .clauses()
            .iter()
            .map(|c| c.field.clone())
            .collect::<Vec<_>>();
        let before = fields.len();
        fields.sort();
        fields.dedup();
        assert_eq!(before, fields.len(), "duplicate field after step {step}");
    }
}
