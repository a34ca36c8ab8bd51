mod common;

use std::time::Duration;

use async_graphql::{Request, Variables};
use chrono::Utc;
use common::*;
use futures_util::StreamExt;
use serde_json::json;

const MEMBERSHIP_CHANGED: &str = r#"
    subscription Changes($clubId: ID) {
        clubMembershipChanged(clubId: $clubId) {
            status
            user { id }
            club { id memberCount }
        }
    }
"#;

/// Give the subscription a moment to register before triggering it.
async fn after_subscribe() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn test_membership_changes_are_scoped_to_the_club() {
    let (state, schema) = setup();
    let admin = create_admin(&state).await;
    let student = create_student(&state).await;
    let watched = create_test_club(&state, &admin, "Watched", 10).await;
    let other = create_test_club(&state, &admin, "Other", 10).await;

    let mut stream = schema.execute_stream(
        Request::new(MEMBERSHIP_CHANGED).variables(club_vars(watched)),
    );

    let (first, _) = tokio::join!(
        tokio::time::timeout(Duration::from_secs(2), stream.next()),
        async {
            after_subscribe().await;
            execute_graphql(&schema, JOIN_CLUB, Some(club_vars(other)), Some(student.clone())).await;
            execute_graphql(&schema, JOIN_CLUB, Some(club_vars(watched)), Some(student.clone())).await;
        }
    );
    let first = first.expect("no notification").expect("stream ended");
    assert!(first.errors.is_empty(), "{:?}", first.errors);
    let data = first.data.into_json().unwrap();
    assert_eq!(data["clubMembershipChanged"]["club"]["id"], watched.to_string());
    assert_eq!(data["clubMembershipChanged"]["status"], "ACTIVE");
    assert_eq!(data["clubMembershipChanged"]["club"]["memberCount"], 1);

    let (left, _) = tokio::join!(
        tokio::time::timeout(Duration::from_secs(2), stream.next()),
        execute_graphql(&schema, LEAVE_CLUB, Some(club_vars(watched)), Some(student.clone()))
    );
    let data = left.unwrap().unwrap().data.into_json().unwrap();
    assert_eq!(data["clubMembershipChanged"]["status"], "INACTIVE");
    assert_eq!(data["clubMembershipChanged"]["user"]["id"], user_id(&student).to_string());
}

#[tokio::test]
async fn test_unfiltered_membership_subscription_sees_every_club() {
    let (state, schema) = setup();
    let admin = create_admin(&state).await;
    let student = create_student(&state).await;
    let club_id = create_test_club(&state, &admin, "Any", 10).await;

    let mut stream = schema.execute_stream(Request::new(MEMBERSHIP_CHANGED));
    let (received, _) = tokio::join!(
        tokio::time::timeout(Duration::from_secs(2), stream.next()),
        async {
            after_subscribe().await;
            execute_graphql(&schema, JOIN_CLUB, Some(club_vars(club_id)), Some(student)).await
        }
    );
    let data = received.unwrap().unwrap().data.into_json().unwrap();
    assert_eq!(data["clubMembershipChanged"]["club"]["id"], club_id.to_string());
}

#[tokio::test]
async fn test_event_created_update_and_delete_notifications() {
    let (state, schema) = setup();
    let admin = create_admin(&state).await;
    let club_id = create_test_club(&state, &admin, "Chess", 10).await;

    let mut created = schema.execute_stream(
        Request::new("subscription Created($clubId: ID) { eventCreated(clubId: $clubId) { id title } }")
            .variables(club_vars(club_id)),
    );
    let create = r#"
        mutation Create($input: CreateEventInput!) { createEvent(input: $input) { id } }
    "#;
    let input = Variables::from_json(json!({
        "input": {
            "title": "Blitz night",
            "description": "Five minute games all evening",
            "date": (Utc::now() + chrono::Duration::days(1)).to_rfc3339(),
            "location": "Room 12",
            "time": "18:00",
            "dressCode": "CASUAL",
            "clubId": club_id.to_string()
        }
    }));
    let (received, response) = tokio::join!(
        tokio::time::timeout(Duration::from_secs(2), created.next()),
        async {
            after_subscribe().await;
            execute_graphql(&schema, create, Some(input), Some(admin.clone())).await
        }
    );
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let event_id = response.data.into_json().unwrap()["createEvent"]["id"]
        .as_str()
        .unwrap()
        .to_string();
    let data = received.unwrap().unwrap().data.into_json().unwrap();
    assert_eq!(data["eventCreated"]["id"], event_id.as_str());

    let event_vars = || Variables::from_json(json!({ "eventId": event_id }));
    let mut updated = schema.execute_stream(
        Request::new("subscription Updated($eventId: ID!) { eventUpdated(eventId: $eventId) { title } }")
            .variables(event_vars()),
    );
    let (received, _) = tokio::join!(
        tokio::time::timeout(Duration::from_secs(2), updated.next()),
        async {
            after_subscribe().await;
            execute_graphql(
                &schema,
                "mutation U($id: ID!) { updateEvent(id: $id, input: { title: \"Rapid night\" }) { id } }",
                Some(Variables::from_json(json!({ "id": event_id }))),
                Some(admin.clone()),
            )
            .await
        }
    );
    let data = received.unwrap().unwrap().data.into_json().unwrap();
    assert_eq!(data["eventUpdated"]["title"], "Rapid night");

    let mut deleted = schema.execute_stream(
        Request::new("subscription Deleted($eventId: ID!) { eventDeleted(eventId: $eventId) }")
            .variables(event_vars()),
    );
    // Removing the club removes the event with it.
    let (received, _) = tokio::join!(
        tokio::time::timeout(Duration::from_secs(2), deleted.next()),
        async {
            after_subscribe().await;
            execute_graphql(
                &schema,
                "mutation D($id: ID!) { deleteClub(id: $id) }",
                Some(Variables::from_json(json!({ "id": club_id.to_string() }))),
                Some(admin.clone()),
            )
            .await
        }
    );
    let data = received.unwrap().unwrap().data.into_json().unwrap();
    assert_eq!(data["eventDeleted"], event_id.as_str());
}

#[tokio::test]
async fn test_event_updates_for_other_events_are_filtered_out() {
    let (state, schema) = setup();
    let admin = create_admin(&state).await;
    let club_id = create_test_club(&state, &admin, "Chess", 10).await;
    state
        .repos()
        .events()
        .create(infra::models::CreateEvent {
            club_id,
            title: "Simul".to_string(),
            description: "One master against twenty boards".to_string(),
            date: Utc::now() + chrono::Duration::days(1),
            location: "Hall".to_string(),
            time: "12:00".to_string(),
            dress_code: infra::models::DressCode::Casual,
        })
        .await
        .unwrap();

    let mut stream = schema.execute_stream(
        Request::new("subscription Deleted($eventId: ID!) { eventDeleted(eventId: $eventId) }")
            .variables(Variables::from_json(json!({ "eventId": uuid::Uuid::new_v4().to_string() }))),
    );

    let (received, _) = tokio::join!(
        tokio::time::timeout(Duration::from_millis(300), stream.next()),
        async {
            after_subscribe().await;
            execute_graphql(
                &schema,
                "mutation D($id: ID!) { deleteClub(id: $id) }",
                Some(Variables::from_json(json!({ "id": club_id.to_string() }))),
                Some(admin.clone()),
            )
            .await
        }
    );
    assert!(received.is_err(), "no notification for an unrelated event");
}
