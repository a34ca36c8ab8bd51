mod common;

use async_graphql::Variables;
use common::*;
use serde_json::json;

const CREATE_CLUB: &str = r#"
    mutation Create($input: CreateClubInput!) {
        createClub(input: $input) {
            id
            name
            description
            category
            capacity
            memberCount
            createdBy { id email role }
        }
    }
"#;

fn club_input(name: &str, capacity: i32) -> Variables {
    Variables::from_json(json!({
        "input": {
            "name": name,
            "description": "Weekly meetings for curious students",
            "category": "SCIENCE",
            "capacity": capacity
        }
    }))
}

#[tokio::test]
async fn test_admin_creates_club() {
    let (state, schema) = setup();
    let admin = create_admin(&state).await;

    let response = execute_graphql(
        &schema,
        CREATE_CLUB,
        Some(club_input("  Robotics  ", 12)),
        Some(admin.clone()),
    )
    .await;

    assert!(
        response.errors.is_empty(),
        "createClub should succeed: {:?}",
        response.errors
    );

    let data = response.data.into_json().unwrap();
    let club = &data["createClub"];
    assert_eq!(club["name"], "Robotics", "name should be trimmed");
    assert_eq!(club["category"], "SCIENCE");
    assert_eq!(club["capacity"], 12);
    assert_eq!(club["memberCount"], 0);
    assert_eq!(club["createdBy"]["id"], user_id(&admin).to_string());
    assert_eq!(club["createdBy"]["role"], "ADMIN");
}

#[tokio::test]
async fn test_student_cannot_create_club() {
    let (state, schema) = setup();
    let student = create_student(&state).await;

    let response = execute_graphql(
        &schema,
        CREATE_CLUB,
        Some(club_input("Robotics", 12)),
        Some(student),
    )
    .await;
    assert_eq!(error_code(&response).as_deref(), Some("FORBIDDEN"));

    let anonymous = execute_graphql(&schema, CREATE_CLUB, Some(club_input("Robotics", 12)), None).await;
    assert_eq!(error_code(&anonymous).as_deref(), Some("UNAUTHORIZED"));
}

#[tokio::test]
async fn test_create_club_reports_every_violation() {
    let (state, schema) = setup();
    let admin = create_admin(&state).await;

    let variables = Variables::from_json(json!({
        "input": {
            "name": "ab",
            "description": "short",
            "category": "ARTS",
            "capacity": 501
        }
    }));
    let response = execute_graphql(&schema, CREATE_CLUB, Some(variables), Some(admin)).await;

    assert_eq!(error_code(&response).as_deref(), Some("VALIDATION_ERROR"));
    let body = serde_json::to_value(&response).unwrap();
    let violations = body["errors"][0]["extensions"]["validationErrors"]
        .as_array()
        .unwrap();
    let mut fields: Vec<&str> = violations
        .iter()
        .map(|v| v["field"].as_str().unwrap())
        .collect();
    fields.sort_unstable();
    assert_eq!(fields, vec!["capacity", "description", "name"]);
}

#[tokio::test]
async fn test_get_clubs_query() {
    let (state, schema) = setup();
    let admin = create_admin(&state).await;
    let b = create_test_club(&state, &admin, "Basketball", 10).await;
    let a = create_test_club(&state, &admin, "Archery", 10).await;

    let query = r#"
        query {
            clubs {
                id
                name
            }
        }
    "#;

    let response = execute_graphql(&schema, query, None, None).await;
    assert!(
        response.errors.is_empty(),
        "Clubs query should succeed: {:?}",
        response.errors
    );

    let data = response.data.into_json().unwrap();
    let ids: Vec<&str> = data["clubs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![a.to_string(), b.to_string()], "ordered by name");

    let paged = execute_graphql(
        &schema,
        "query { clubs(limit: 1, offset: 1) { name } }",
        None,
        None,
    )
    .await;
    let data = paged.data.into_json().unwrap();
    assert_eq!(data["clubs"], json!([{ "name": "Basketball" }]));
}

#[tokio::test]
async fn test_get_club_by_id() {
    let (state, schema) = setup();
    let admin = create_admin(&state).await;
    let club_id = create_test_club(&state, &admin, "Specific Test Club", 5).await;

    let query = r#"
        query GetClub($clubId: ID!) {
            club(id: $clubId) {
                id
                name
                members { id }
            }
        }
    "#;

    let response = execute_graphql(&schema, query, Some(club_vars(club_id)), None).await;
    assert!(
        response.errors.is_empty(),
        "Club query should succeed: {:?}",
        response.errors
    );

    let data = response.data.into_json().unwrap();
    assert_eq!(data["club"]["id"], club_id.to_string());
    assert_eq!(data["club"]["name"], "Specific Test Club");
    assert_eq!(data["club"]["members"], json!([]));

    let missing = execute_graphql(
        &schema,
        query,
        Some(club_vars(uuid::Uuid::new_v4())),
        None,
    )
    .await;
    assert_eq!(error_code(&missing).as_deref(), Some("NOT_FOUND"));
    assert_eq!(missing.errors[0].message, "Club not found");
}

#[tokio::test]
async fn test_update_club_applies_only_supplied_fields() {
    let (state, schema) = setup();
    let admin = create_admin(&state).await;
    let club_id = create_test_club(&state, &admin, "Chess", 5).await;

    let query = r#"
        mutation Update($id: ID!, $input: UpdateClubInput!) {
            updateClub(id: $id, input: $input) { name capacity category }
        }
    "#;
    let variables = Variables::from_json(json!({
        "id": club_id.to_string(),
        "input": { "capacity": 8 }
    }));
    let response = execute_graphql(&schema, query, Some(variables), Some(admin)).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    let data = response.data.into_json().unwrap();
    assert_eq!(
        data["updateClub"],
        json!({ "name": "Chess", "capacity": 8, "category": "OTHER" })
    );
}

#[tokio::test]
async fn test_capacity_cannot_drop_below_active_members() {
    let (state, schema) = setup();
    let admin = create_admin(&state).await;
    let club_id = create_test_club(&state, &admin, "Drama", 3).await;

    for _ in 0..2 {
        let student = create_student(&state).await;
        let joined = execute_graphql(&schema, JOIN_CLUB, Some(club_vars(club_id)), Some(student)).await;
        assert!(joined.errors.is_empty(), "{:?}", joined.errors);
    }

    let query = r#"
        mutation Update($id: ID!, $input: UpdateClubInput!) {
            updateClub(id: $id, input: $input) { capacity }
        }
    "#;
    let variables = Variables::from_json(json!({
        "id": club_id.to_string(),
        "input": { "capacity": 1 }
    }));
    let response = execute_graphql(&schema, query, Some(variables), Some(admin)).await;
    assert_eq!(error_code(&response).as_deref(), Some("VALIDATION_ERROR"));
}

#[tokio::test]
async fn test_delete_club_removes_memberships_and_events() {
    let (state, schema) = setup();
    let admin = create_admin(&state).await;
    let student = create_student(&state).await;
    let club_id = create_test_club(&state, &admin, "Gardening", 4).await;

    let joined = execute_graphql(&schema, JOIN_CLUB, Some(club_vars(club_id)), Some(student.clone())).await;
    assert!(joined.errors.is_empty(), "{:?}", joined.errors);

    let create_event = r#"
        mutation Create($input: CreateEventInput!) { createEvent(input: $input) { id } }
    "#;
    let variables = Variables::from_json(json!({
        "input": {
            "title": "Planting day",
            "description": "Bring gloves and a water bottle",
            "date": (chrono::Utc::now() + chrono::Duration::days(3)).to_rfc3339(),
            "location": "Courtyard",
            "time": "9:30",
            "dressCode": "CASUAL",
            "clubId": club_id.to_string()
        }
    }));
    let created = execute_graphql(&schema, create_event, Some(variables), Some(admin.clone())).await;
    assert!(created.errors.is_empty(), "{:?}", created.errors);

    let deleted = execute_graphql(
        &schema,
        "mutation Delete($id: ID!) { deleteClub(id: $id) }",
        Some(Variables::from_json(json!({ "id": club_id.to_string() }))),
        Some(admin),
    )
    .await;
    assert!(deleted.errors.is_empty(), "{:?}", deleted.errors);
    assert_eq!(deleted.data.into_json().unwrap()["deleteClub"], true);

    let mine = execute_graphql(&schema, "query { myMemberships { id } }", None, Some(student)).await;
    assert_eq!(mine.data.into_json().unwrap()["myMemberships"], json!([]));

    let events = execute_graphql(&schema, "query { events { id } }", None, None).await;
    assert_eq!(events.data.into_json().unwrap()["events"], json!([]));

    assert_eq!(
        state.repos().memberships().count_by_club(club_id).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_club_name_limit_counts_characters() {
    let (state, schema) = setup();
    let admin = create_admin(&state).await;
    let name = "Ш".repeat(60);

    let response = execute_graphql(&schema, CREATE_CLUB, Some(club_input(&name, 20)), Some(admin.clone())).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(response.data.into_json().unwrap()["createClub"]["name"], name);

    let too_long = execute_graphql(
        &schema,
        CREATE_CLUB,
        Some(club_input(&"Ш".repeat(101), 20)),
        Some(admin),
    )
    .await;
    assert_eq!(error_code(&too_long).as_deref(), Some("VALIDATION_ERROR"));
}
