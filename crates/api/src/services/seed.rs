//! Demo data for local runs (`SEED_DEMO_DATA=true`).

use chrono::{Duration, Utc};

use crate::error::AppResult;
use crate::state::AppState;
use infra::models::{ClubCategory, CreateClub, CreateEvent, DressCode, Role};
use infra::repos::JoinOutcome;

pub const ADMIN_EMAIL: &str = "admin@admin.com";

const CLUBS: [(&str, &str, ClubCategory, i32); 5] = [
    (
        "Basketball Club",
        "Pickup games and school tournaments. Practice is every Tuesday and Thursday after class.",
        ClubCategory::Sports,
        30,
    ),
    (
        "Art & Design Club",
        "Painting, drawing and digital art sessions for every skill level.",
        ClubCategory::Arts,
        25,
    ),
    (
        "Science Club",
        "Experiments, projects and competitions across physics, chemistry and biology.",
        ClubCategory::Science,
        40,
    ),
    (
        "Music Club",
        "Play instruments together and perform at school events.",
        ClubCategory::Music,
        35,
    ),
    (
        "Debate Club",
        "Build public speaking and critical thinking skills through weekly debates.",
        ClubCategory::Academic,
        20,
    ),
];

/// Seed users, clubs, memberships and upcoming events unless the demo admin
/// already exists. Returns whether anything was written.
pub async fn seed_demo_data(state: &AppState) -> AppResult<bool> {
    let repos = state.repos();
    if repos.users().get_by_email(ADMIN_EMAIL).await?.is_some() {
        tracing::info!("demo data already present, skipping seed");
        return Ok(false);
    }

    let accounts = state.accounts();
    let admin = accounts
        .ensure_user(ADMIN_EMAIL, "admin123", "Admin User", Role::Admin)
        .await?;
    let mut students = Vec::new();
    for (email, name) in [
        ("test@student.com", "Test Student"),
        ("student2@student.com", "Second Student"),
        ("student3@student.com", "Third Student"),
    ] {
        students.push(
            accounts
                .ensure_user(email, "password123", name, Role::Student)
                .await?,
        );
    }

    let mut clubs = Vec::new();
    for (name, description, category, capacity) in CLUBS {
        let club = repos
            .clubs()
            .create(CreateClub {
                name: name.to_string(),
                description: description.to_string(),
                category,
                capacity,
                created_by: admin.id,
            })
            .await?;
        clubs.push(club);
    }

    for (student, club) in [(0, 0), (0, 1), (1, 0), (1, 2), (2, 3)] {
        let outcome = repos
            .memberships()
            .join(students[student].id, clubs[club].id)
            .await?;
        if !matches!(outcome, JoinOutcome::Created(_) | JoinOutcome::Reactivated(_)) {
            tracing::warn!(?outcome, "unexpected seed membership outcome");
        }
    }

    let now = Utc::now();
    let events = [
        (
            0,
            "Basketball Tournament",
            "Annual school basketball tournament. All teams welcome!",
            7,
            "School Gymnasium",
            "15:00",
            DressCode::Sports,
        ),
        (
            1,
            "Art Exhibition",
            "Show your work at our yearly art exhibition.",
            14,
            "Art Gallery",
            "14:00",
            DressCode::SmartCasual,
        ),
        (
            2,
            "Science Fair",
            "Present your science projects and compete for prizes.",
            21,
            "Science Lab",
            "13:00",
            DressCode::Formal,
        ),
        (
            3,
            "Spring Concert",
            "Join us for a musical performance by our members.",
            7,
            "Auditorium",
            "18:00",
            DressCode::Formal,
        ),
    ];
    for (club, title, description, days, location, time, dress_code) in events {
        repos
            .events()
            .create(CreateEvent {
                club_id: clubs[club].id,
                title: title.to_string(),
                description: description.to_string(),
                date: now + Duration::days(days),
                location: location.to_string(),
                time: time.to_string(),
                dress_code,
            })
            .await?;
    }

    tracing::info!(
        users = students.len() + 1,
        clubs = clubs.len(),
        "seeded demo data"
    );
    Ok(true)
}
