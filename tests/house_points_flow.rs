mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http::{Method, StatusCode};
use serde_json::json;

use common::{TODAY, memory_app};
use house_points::app::create_app;
use house_points::entities::Platform;
use house_points::services::social::{FollowerSource, SocialError, SocialTracker};

#[tokio::test]
async fn completing_a_daily_goal_scores_for_the_house() {
    let app = memory_app();
    let admin = app.admin_token();

    let (status, body) = app
        .request(
            Method::POST,
            "/api/admin/groups",
            Some(&admin),
            Some(json!({"name": "Red House", "color": "#ff0000"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["group"]["id"], "1");
    assert_eq!(body["group"]["color"], "#FF0000");

    let (status, body) = app
        .request(
            Method::POST,
            "/api/admin/add-student",
            Some(&admin),
            Some(json!({"firstName": "Ada", "lastName": "Lovelace"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["student"]["id"], 1);
    assert_eq!(body["student"]["email"], "ada.lovelace@alpha.school");
    assert!(body["student"].get("password").is_none());

    let (status, body) = app
        .request(
            Method::POST,
            "/api/admin/groups/assign-students",
            Some(&admin),
            Some(json!({"groupId": 1, "studentIds": [1], "action": "assign"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updatedCount"], 1);
    assert_eq!(body["errors"], json!([]));

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "Ada.Lovelace@alpha.school", "password": "password"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "student");
    assert_eq!(body["user"]["groupId"], "1");
    let student = body["token"].as_str().unwrap().to_string();

    let (status, body) = app
        .request(
            Method::POST,
            "/api/goals/daily/1",
            Some(&student),
            Some(json!({"goalText": "Record the intro"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["goal"]["status"], "set");
    assert!(body.get("notice").is_none());

    let (status, body) = app
        .request(
            Method::POST,
            "/api/goals/complete",
            Some(&student),
            Some(json!({"studentId": "1", "type": "dailyGoal"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pointsAwarded"], 5);
    assert_eq!(body["totalPoints"], 5);
    assert_eq!(body["queuedForSync"], false);

    let (_, body) = app
        .request(
            Method::GET,
            "/api/goals/complete?studentId=1&type=dailyGoal",
            Some(&student),
            None,
        )
        .await;
    assert_eq!(body["pointsAwarded"], 0);
    assert_eq!(body["alreadyCompleted"], true);

    let (status, body) = app
        .request(
            Method::GET,
            "/api/leaderboard?type=daily&period=today",
            Some(&student),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["from"], TODAY);
    assert_eq!(body["houses"][0]["groupId"], "1");
    assert_eq!(body["houses"][0]["points"], 10);
    assert_eq!(body["houses"][0]["studentsCompleted"], 1);
    assert!(body.get("notice").is_none());

    let (_, body) = app
        .request(Method::GET, "/api/goals/check/1", Some(&student), None)
        .await;
    assert_eq!(body["dailyGoalCompleted"], true);
    assert_eq!(body["brainliftCompleted"], false);
    assert_eq!(body["goalStatus"], "completed");
    assert_eq!(body["pointsToday"], 5);
}

#[tokio::test]
async fn daily_goal_round_trip() {
    let app = memory_app();
    let admin = app.admin_token();
    app.request(
        Method::POST,
        "/api/admin/add-student",
        Some(&admin),
        Some(json!({"firstName": "Grace", "lastName": "Hopper"})),
    )
    .await;
    let token = app.student_token(1, "grace.hopper@alpha.school");

    let (status, _) = app
        .request(
            Method::POST,
            "/api/goals/daily/1",
            Some(&token),
            Some(json!({"goalText": "Draft outline", "date": "2026-10-15"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app
        .request(Method::GET, "/api/goals/daily/1?date=2026-10-15", Some(&token), None)
        .await;
    assert_eq!(body["goal"]["goalText"], "Draft outline");

    let (status, body) = app
        .request(
            Method::PUT,
            "/api/goals/daily/1",
            Some(&token),
            Some(json!({"status": "completed", "date": "2026-10-15"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["goal"]["status"], "completed");
    assert_eq!(body["goal"]["completed"], true);

    let (_, body) = app
        .request(Method::GET, "/api/goals/daily/1?range=7", Some(&token), None)
        .await;
    assert_eq!(body["count"], 1);

    let (_, body) = app
        .request(Method::GET, "/api/goals/history/1?days=7", Some(&token), None)
        .await;
    assert_eq!(body["goalsCompleted"], 1);
    assert_eq!(body["currentStreak"], 1);

    let (status, body) = app
        .request(
            Method::POST,
            "/api/goals/daily/1",
            Some(&token),
            Some(json!({"goalText": "x", "status": "done"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .request(Method::DELETE, "/api/goals/daily/1?date=2026-10-15", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app
        .request(Method::GET, "/api/goals/daily/1?date=2026-10-15", Some(&token), None)
        .await;
    assert!(body["goal"].is_null());
}

#[tokio::test]
async fn header_copy_of_todays_completions_wins() {
    let app = memory_app();
    let admin = app.admin_token();
    app.request(
        Method::POST,
        "/api/admin/add-student",
        Some(&admin),
        Some(json!({"firstName": "Alan", "lastName": "Turing"})),
    )
    .await;

    let (_, body) = app
        .request(Method::GET, "/api/profile/1", Some(&admin), None)
        .await;
    assert_eq!(body["profile"]["brainliftCompleted"], false);

    let header = format!(r#"{{"brainliftCompleted":true,"lastBrainliftDate":"{}"}}"#, TODAY);
    let (status, body) = app
        .request_with_headers(
            Method::GET,
            "/api/profile/1",
            Some(&admin),
            None,
            &[("x-local-goals", &header)],
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["brainliftCompleted"], true);
    assert_eq!(body["profile"]["lastBrainliftDate"], TODAY);

    let stale = r#"{"brainliftCompleted":true,"lastBrainliftDate":"2026-10-01"}"#;
    let (_, body) = app
        .request_with_headers(
            Method::GET,
            "/api/profile/1",
            Some(&admin),
            None,
            &[("x-local-goals", stale)],
        )
        .await;
    assert_eq!(body["profile"]["brainliftCompleted"], false);
}

#[tokio::test]
async fn access_rules_and_json_errors() {
    let app = memory_app();
    let student = app.student_token(1, "emma.johnson@alpha.school");

    let (status, body) = app
        .request(Method::GET, "/api/admin/groups", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, body) = app
        .request(Method::GET, "/api/admin/groups", Some(&student), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin access required");

    let (status, body) = app
        .request(Method::GET, "/api/profile/2", Some(&student), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You can only access your own data");

    let (status, body) = app
        .request(Method::DELETE, "/api/students", None, None)
        .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["success"], false);

    let (status, body) = app
        .request(Method::GET, "/api/nowhere", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "admin@alpha.school", "password": "wrong"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn check_chart_points_are_awarded_once() {
    let app = memory_app();
    let admin = app.admin_token();
    app.request(
        Method::POST,
        "/api/admin/add-student",
        Some(&admin),
        Some(json!({"firstName": "Ada", "lastName": "Lovelace", "honors": true})),
    )
    .await;

    let (_, chart) = app
        .request(Method::GET, "/api/admin/checkchart?type=honors", Some(&admin), None)
        .await;
    let stages = chart["chart"]["stages"].clone();
    let (status, body) = app
        .request(
            Method::PUT,
            "/api/admin/checkchart?type=honors",
            Some(&admin),
            Some(json!({"stages": stages})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tasksWritten"], 6);

    let task = json!({"studentId": 1, "taskId": "h-k1", "completed": true});
    let (status, first) = app
        .request(Method::POST, "/api/admin/checkprogress", Some(&admin), Some(task.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    let awarded = first["pointsAwarded"].as_i64().unwrap();
    assert!(awarded > 0);

    let (_, second) = app
        .request(Method::POST, "/api/admin/checkprogress", Some(&admin), Some(task))
        .await;
    assert_eq!(second["pointsAwarded"], 0);

    let (_, body) = app
        .request(Method::GET, "/api/admin/checkprogress?studentId=1", Some(&admin), None)
        .await;
    assert_eq!(body["progress"]["completedCount"], 1);

    let (_, body) = app
        .request(Method::GET, "/api/student/checkchart", Some(&admin), None)
        .await;
    assert_eq!(body["students"][0]["points"], awarded);

    let reopen = json!({"studentId": 1, "taskId": "h-k1", "completed": false});
    let (status, body) = app
        .request(Method::POST, "/api/admin/checkprogress", Some(&admin), Some(reopen))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed"], false);
    assert_eq!(body["pointsAwarded"], 0);

    let (_, body) = app
        .request(Method::GET, "/api/admin/checkprogress?studentId=1", Some(&admin), None)
        .await;
    assert_eq!(body["progress"]["completedCount"], 0);

    let (_, body) = app
        .request(Method::GET, "/api/admin/student/1", Some(&admin), None)
        .await;
    assert_eq!(body["student"]["points"], awarded);
}

async fn create_group(app: &common::TestApp, admin: &str, name: &str) -> String {
    let (status, body) = app
        .request(
            Method::POST,
            "/api/admin/groups",
            Some(admin),
            Some(json!({"name": name})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body["group"]["id"].as_str().unwrap().to_string()
}

async fn add_student(app: &common::TestApp, admin: &str, first: &str, last: &str, group: &str) {
    let (status, _) = app
        .request(
            Method::POST,
            "/api/admin/add-student",
            Some(admin),
            Some(json!({"firstName": first, "lastName": last, "groupId": group})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn rewording_a_completed_goal_keeps_the_house_credit() {
    let app = memory_app();
    let admin = app.admin_token();
    let group = create_group(&app, &admin, "Red House").await;
    add_student(&app, &admin, "Ada", "Lovelace", &group).await;
    let student = app.student_token(1, "ada.lovelace@alpha.school");

    app.request(
        Method::POST,
        "/api/goals/daily/1",
        Some(&student),
        Some(json!({"goalText": "Ship v1", "status": "set"})),
    )
    .await;
    let (_, body) = app
        .request(
            Method::POST,
            "/api/goals/complete",
            Some(&student),
            Some(json!({"studentId": 1, "type": "dailyGoal"})),
        )
        .await;
    assert_eq!(body["pointsAwarded"], 5);

    let (status, body) = app
        .request(
            Method::POST,
            "/api/goals/daily/1",
            Some(&student),
            Some(json!({"goalText": "Ship v1 (edited)"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["goal"]["goalText"], "Ship v1 (edited)");
    assert_eq!(body["goal"]["status"], "completed");
    assert_eq!(body["goal"]["completed"], true);

    let (_, body) = app
        .request(
            Method::GET,
            "/api/leaderboard?type=daily&period=today",
            Some(&student),
            None,
        )
        .await;
    assert_eq!(body["houses"][0]["points"], 10);
    assert_eq!(body["students"][0]["score"], 1);

    let (_, body) = app
        .request(
            Method::POST,
            "/api/goals/daily/1",
            Some(&student),
            Some(json!({"goalText": "Ship v1", "status": "set"})),
        )
        .await;
    assert_eq!(body["goal"]["completed"], false);
}

#[tokio::test]
async fn unassign_only_touches_members_of_the_group() {
    let app = memory_app();
    let admin = app.admin_token();
    let red = create_group(&app, &admin, "Red House").await;
    let blue = create_group(&app, &admin, "Blue House").await;
    add_student(&app, &admin, "Ada", "Lovelace", &blue).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/admin/groups/assign-students",
            Some(&admin),
            Some(json!({"groupId": red, "studentIds": [1], "action": "unassign"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updatedCount"], 0);
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);

    let (_, body) = app
        .request(Method::GET, "/api/admin/student/1", Some(&admin), None)
        .await;
    assert_eq!(body["student"]["groupId"], blue.as_str());

    let (_, body) = app
        .request(
            Method::POST,
            "/api/admin/groups/assign-students",
            Some(&admin),
            Some(json!({"groupId": blue, "studentIds": [1], "action": "unassign"})),
        )
        .await;
    assert_eq!(body["updatedCount"], 1);
    assert_eq!(body["errors"], json!([]));
}

#[tokio::test]
async fn a_recreated_group_id_starts_without_members() {
    let app = memory_app();
    let admin = app.admin_token();
    create_group(&app, &admin, "Red House").await;
    let blue = create_group(&app, &admin, "Blue House").await;
    add_student(&app, &admin, "Ada", "Lovelace", &blue).await;

    let (status, body) = app
        .request(
            Method::DELETE,
            "/api/admin/groups",
            Some(&admin),
            Some(json!({"id": blue})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unassignedCount"], 1);

    let green = create_group(&app, &admin, "Green House").await;
    let (_, body) = app
        .request(Method::GET, "/api/admin/student/1", Some(&admin), None)
        .await;
    assert!(body["student"]["groupId"].is_null());

    let (_, body) = app
        .request(Method::GET, "/api/leaderboard?period=all", Some(&admin), None)
        .await;
    let houses = body["houses"].as_array().unwrap();
    let green_house = houses.iter().find(|h| h["groupId"] == green.as_str()).unwrap();
    assert_eq!(green_house["studentCount"], 0);
}

#[tokio::test]
async fn students_cannot_change_their_session_goal() {
    let app = memory_app();
    let admin = app.admin_token();
    let group = create_group(&app, &admin, "Red House").await;
    add_student(&app, &admin, "Ada", "Lovelace", &group).await;
    let student = app.student_token(1, "ada.lovelace@alpha.school");

    let (status, _) = app
        .request(
            Method::POST,
            "/api/admin/student/1",
            Some(&admin),
            Some(json!({"sessionGoal": "Launch the channel"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request(
            Method::PUT,
            "/api/profile/1",
            Some(&student),
            Some(json!({"sessionGoal": "Nothing much"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request(
            Method::PUT,
            "/api/profile/1",
            Some(&student),
            Some(json!({"sessionGoal": "Nothing much", "dailyGoal": "Film the intro"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["dailyGoal"], "Film the intro");
    assert_eq!(body["profile"]["sessionGoal"], "Launch the channel");
}

struct FixedFollowers;

#[async_trait]
impl FollowerSource for FixedFollowers {
    async fn followers(&self, platform: Platform, _handle: &str) -> Result<i64, SocialError> {
        match platform {
            Platform::X => Ok(1200),
            _ => Err(SocialError::Transport("timed out".to_string())),
        }
    }
}

#[tokio::test]
async fn live_audience_folds_follower_counts_into_today() {
    let mut app = memory_app();
    let social = SocialTracker::new(Some(Arc::new(FixedFollowers)), Duration::from_secs(300));
    app.state = app.state.clone().with_social(social);
    app.router = create_app(app.state.clone());

    let admin = app.admin_token();
    let group = create_group(&app, &admin, "Red House").await;
    add_student(&app, &admin, "Ada", "Lovelace", &group).await;
    let student = app.student_token(1, "ada.lovelace@alpha.school");

    let (status, _) = app
        .request(
            Method::PUT,
            "/api/profile/1",
            Some(&student),
            Some(json!({"platforms": {"x": "@ada", "youtube": "adalovelace"}})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(Method::GET, "/api/goals/audience/1", Some(&student), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["live"], true);
    assert_eq!(body["date"], TODAY);
    assert_eq!(body["audience"]["x"], 1200);
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);
    assert_eq!(app.state.social.lookups(), 2);

    let (_, body) = app
        .request(Method::GET, "/api/goals/check/1", Some(&student), None)
        .await;
    assert_eq!(body["audience"]["x"], 1200);
}
