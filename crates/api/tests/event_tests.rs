mod common;

use async_graphql::Variables;
use chrono::{Duration, Utc};
use common::*;
use serde_json::{json, Value};
use uuid::Uuid;

const CREATE_EVENT: &str = r#"
    mutation Create($input: CreateEventInput!) {
        createEvent(input: $input) {
            id
            title
            time
            dressCode
            club { id name }
        }
    }
"#;

fn event_input(club_id: Uuid, title: &str, date: chrono::DateTime<Utc>) -> Value {
    json!({
        "title": title,
        "description": "An afternoon of friendly matches",
        "date": date.to_rfc3339(),
        "location": "Main Hall",
        "time": "15:30",
        "dressCode": "SMART_CASUAL",
        "clubId": club_id.to_string()
    })
}

fn vars(input: Value) -> Option<Variables> {
    Some(Variables::from_json(json!({ "input": input })))
}

async fn create_event(schema: &api::gql::AppSchema, admin: &api::auth::Identity, input: Value) -> String {
    let response = execute_graphql(schema, CREATE_EVENT, vars(input), Some(admin.clone())).await;
    assert!(response.errors.is_empty(), "createEvent failed: {:?}", response.errors);
    response.data.into_json().unwrap()["createEvent"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_create_event() {
    let (state, schema) = setup();
    let admin = create_admin(&state).await;
    let club_id = create_test_club(&state, &admin, "Chess", 10).await;

    let input = event_input(club_id, "Chess Open", Utc::now() + Duration::days(2));
    let response = execute_graphql(&schema, CREATE_EVENT, vars(input), Some(admin)).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let data = response.data.into_json().unwrap();
    let event = &data["createEvent"];
    assert_eq!(event["title"], "Chess Open");
    assert_eq!(event["dressCode"], "SMART_CASUAL");
    assert_eq!(event["club"]["id"], club_id.to_string());
    assert_eq!(event["club"]["name"], "Chess");
}

#[tokio::test]
async fn test_event_date_must_not_be_in_the_past() {
    let (state, schema) = setup();
    let admin = create_admin(&state).await;
    let club_id = create_test_club(&state, &admin, "Chess", 10).await;

    let past = event_input(club_id, "Last year", Utc::now() - Duration::days(1));
    let response = execute_graphql(&schema, CREATE_EVENT, vars(past), Some(admin.clone())).await;
    assert_eq!(error_code(&response).as_deref(), Some("VALIDATION_ERROR"));

    let soon = event_input(club_id, "Right away", Utc::now() + Duration::seconds(1));
    let response = execute_graphql(&schema, CREATE_EVENT, vars(soon), Some(admin)).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
}

#[tokio::test]
async fn test_create_event_validation_and_missing_club() {
    let (state, schema) = setup();
    let admin = create_admin(&state).await;
    let club_id = create_test_club(&state, &admin, "Chess", 10).await;

    let mut input = event_input(club_id, "Go", Utc::now() + Duration::days(1));
    input["time"] = json!("25:00");
    input["location"] = json!("X");
    let response = execute_graphql(&schema, CREATE_EVENT, vars(input), Some(admin.clone())).await;
    assert_eq!(error_code(&response).as_deref(), Some("VALIDATION_ERROR"));
    let body = serde_json::to_value(&response).unwrap();
    let mut fields: Vec<String> = body["errors"][0]["extensions"]["validationErrors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["field"].as_str().unwrap().to_string())
        .collect();
    fields.sort_unstable();
    assert_eq!(fields, vec!["location", "time", "title"]);

    let orphan = event_input(Uuid::new_v4(), "Chess Open", Utc::now() + Duration::days(1));
    let response = execute_graphql(&schema, CREATE_EVENT, vars(orphan), Some(admin.clone())).await;
    assert_eq!(error_code(&response).as_deref(), Some("NOT_FOUND"));

    let student = create_student(&state).await;
    let input = event_input(club_id, "Chess Open", Utc::now() + Duration::days(1));
    let response = execute_graphql(&schema, CREATE_EVENT, vars(input), Some(student)).await;
    assert_eq!(error_code(&response).as_deref(), Some("FORBIDDEN"));
}

#[tokio::test]
async fn test_event_queries_are_ordered_by_date() {
    let (state, schema) = setup();
    let admin = create_admin(&state).await;
    let chess = create_test_club(&state, &admin, "Chess", 10).await;
    let drama = create_test_club(&state, &admin, "Drama", 10).await;

    let later = create_event(&schema, &admin, event_input(chess, "Later", Utc::now() + Duration::days(9))).await;
    let sooner = create_event(&schema, &admin, event_input(chess, "Sooner", Utc::now() + Duration::days(1))).await;
    let other = create_event(&schema, &admin, event_input(drama, "Rehearsal", Utc::now() + Duration::days(5))).await;

    let all = execute_graphql(&schema, "query { events { id } }", None, None).await;
    let all = all.data.into_json().unwrap();
    let ids: Vec<&str> = all["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![sooner.as_str(), other.as_str(), later.as_str()]);

    let by_club = execute_graphql(
        &schema,
        "query ByClub($clubId: ID!) { eventsByClub(clubId: $clubId) { title } }",
        Some(club_vars(chess)),
        None,
    )
    .await;
    assert_eq!(
        by_club.data.into_json().unwrap()["eventsByClub"],
        json!([{ "title": "Sooner" }, { "title": "Later" }])
    );

    let missing_club = execute_graphql(
        &schema,
        "query ByClub($clubId: ID!) { eventsByClub(clubId: $clubId) { title } }",
        Some(club_vars(Uuid::new_v4())),
        None,
    )
    .await;
    assert_eq!(error_code(&missing_club).as_deref(), Some("NOT_FOUND"));

    let one = execute_graphql(
        &schema,
        "query One($id: ID!) { event(id: $id) { title club { name } } }",
        Some(Variables::from_json(json!({ "id": other }))),
        None,
    )
    .await;
    assert_eq!(
        one.data.into_json().unwrap()["event"],
        json!({ "title": "Rehearsal", "club": { "name": "Drama" } })
    );
}

#[tokio::test]
async fn test_update_and_delete_event() {
    let (state, schema) = setup();
    let admin = create_admin(&state).await;
    let club_id = create_test_club(&state, &admin, "Chess", 10).await;
    let event_id = create_event(&schema, &admin, event_input(club_id, "Chess Open", Utc::now() + Duration::days(3))).await;

    let update = r#"
        mutation Update($id: ID!, $input: UpdateEventInput!) {
            updateEvent(id: $id, input: $input) { title location date }
        }
    "#;
    let past = (Utc::now() - Duration::days(30)).to_rfc3339();
    let response = execute_graphql(
        &schema,
        update,
        Some(Variables::from_json(json!({
            "id": event_id,
            "input": { "location": "  Library  ", "date": past }
        }))),
        Some(admin.clone()),
    )
    .await;
    assert!(response.errors.is_empty(), "past dates are allowed on update: {:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["updateEvent"]["title"], "Chess Open");
    assert_eq!(data["updateEvent"]["location"], "Library");

    let delete = "mutation Delete($id: ID!) { deleteEvent(id: $id) }";
    let id_vars = || Some(Variables::from_json(json!({ "id": event_id })));
    let response = execute_graphql(&schema, delete, id_vars(), Some(admin.clone())).await;
    assert_eq!(response.data.into_json().unwrap()["deleteEvent"], true);

    let again = execute_graphql(&schema, delete, id_vars(), Some(admin)).await;
    assert_eq!(error_code(&again).as_deref(), Some("NOT_FOUND"));
    assert_eq!(again.errors[0].message, "Event not found");

    let gone = execute_graphql(&schema, "query One($id: ID!) { event(id: $id) { id } }", id_vars(), None).await;
    assert_eq!(error_code(&gone).as_deref(), Some("NOT_FOUND"));
}
