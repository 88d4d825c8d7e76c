use std::str::FromStr;

use crate::{
    domain::{Country, EyeColor, HairColor, Person, PersonDraft, PersonId},
    error::ErrorResponse,
    protocol::{CountByLocationQuery, PersonsApiResponse},
};

const PERSON_JSON: &str = r#"{
    "id": 4,
    "name": "Ivan",
    "coordinates": {"id": 1, "x": 1.5, "y": 2},
    "creationDate": "2025-09-26T10:30:00Z",
    "height": 175.5,
    "birthday": "1990-05-15",
    "weight": 70,
    "nationality": "SOUTH_KOREA",
    "location": {"id": 9, "x": 3, "y": 4, "name": "Seoul"},
    "hairColor": "BROWN"
}"#;

#[test]
fn decodes_person_from_service_json() {
    let person: Person = serde_json::from_str(PERSON_JSON).expect("person");
    assert_eq!(person.id, PersonId(4));
    assert_eq!(person.nationality, Country::SouthKorea);
    assert_eq!(person.hair_color, Some(HairColor::Brown));
    assert_eq!(person.eye_color, None);
    assert_eq!(person.birthday.to_string(), "1990-05-15");
    assert_eq!(person.location.to_string(), "Seoul (3; 4)");
}

#[test]
fn list_response_tolerates_missing_weight() {
    let raw = PERSON_JSON.replace("\"weight\": 70,", "");
    let body = format!(r#"{{"persons": [{raw}], "size": 41}}"#);
    let response: PersonsApiResponse = serde_json::from_str(&body).expect("response");
    assert_eq!(response.size, 41);
    assert_eq!(response.persons[0].weight, None);
}

#[test]
fn draft_drops_nested_ids_and_uses_camel_case() {
    let person: Person = serde_json::from_str(PERSON_JSON).expect("person");
    let draft = PersonDraft::from(&person);
    let value = serde_json::to_value(&draft).expect("json");
    assert!(value["coordinates"].get("id").is_none());
    assert!(value["location"].get("id").is_none());
    assert_eq!(value["hairColor"], "BROWN");
    assert_eq!(value["birthday"], "1990-05-15");
    assert!(value.get("eyeColor").is_none());
}

#[test]
fn wire_enums_parse_loosely() {
    assert_eq!(Country::from_str("south korea").expect("country"), Country::SouthKorea);
    assert_eq!(EyeColor::from_str("hazel").expect("eye"), EyeColor::Hazel);
    let err = HairColor::from_str("purple").expect_err("must fail");
    assert_eq!(err.to_string(), "unknown HairColor value 'purple'");
}

#[test]
fn error_summary_lists_field_violations() {
    let body = r#"{
        "error": "Validation Error",
        "message": "Invalid person",
        "status": 422,
        "validationErrors": [{"field": "name", "rejectedValue": null, "message": "must not be blank"}]
    }"#;
    let response: ErrorResponse = serde_json::from_str(body).expect("error body");
    assert_eq!(response.status, 422);
    assert_eq!(response.summary(), "Invalid person (name: must not be blank)");

    let bare: ErrorResponse =
        serde_json::from_str(r#"{"error": "Internal Server Error", "status": 500}"#).expect("bare");
    assert_eq!(bare.summary(), "Internal Server Error");
}

#[test]
fn count_by_location_query_skips_unset_parts() {
    let query = CountByLocationQuery {
        x: Some(1.0),
        y: None,
        name: Some("Rome".into()),
    };
    let value = serde_json::to_value(&query).expect("json");
    assert!(value.get("y").is_none());
    assert_eq!(value["name"], "Rome");
}
