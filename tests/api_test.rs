use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use schedule_assistant::{
    api::router,
    clock::FixedClock,
    services::{AssistantService, Responder},
    state::AppState,
    store::{CsvScheduleStore, InMemoryScheduleStore, ScheduleRepository, codec},
};
use serde_json::Value;
use tower::ServiceExt;

const TABLE: &str = "\
day,period,start_time,end_time,course_name,location,teacher
Monday,1,09:00,10:30,高等数学,A101,王老师
Monday,3,14:00,15:30,大学英语,B202,Smith
Friday,2,10:00,11:30,大学物理,C303,李老师
Friday,5,19:00,20:30,数据结构,D404,张老师
";

fn app_with(store: Arc<dyn ScheduleRepository>, h: u32, m: u32) -> Router {
    // 2023-10-23 は月曜日
    let now = NaiveDate::from_ymd_opt(2023, 10, 23)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap();
    let assistant = AssistantService::new(store, Arc::new(FixedClock(now)), Arc::new(Responder::seeded(1)));
    router(AppState {
        assistant: Arc::new(assistant),
    })
}

fn seeded_store() -> Arc<dyn ScheduleRepository> {
    let schedule = codec::parse_schedule(TABLE.as_bytes()).expect("Failed to parse table");
    Arc::new(InMemoryScheduleStore::new(schedule))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .expect("request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response is not json")
    };
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let (status, _) = get_json(app_with(seeded_store(), 9, 0), "/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_status_in_class() {
    let (status, body) = get_json(app_with(seeded_store(), 9, 30), "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "in_class");
    assert_eq!(body["current"]["course_name"], "高等数学");
    assert_eq!(body["next"]["course_name"], "大学英语");
}

#[tokio::test]
async fn test_status_upcoming() {
    let (_, body) = get_json(app_with(seeded_store(), 8, 0), "/status").await;
    assert_eq!(body["status"], "upcoming");
    assert_eq!(body["minutes_until_next"], 60);
}

#[tokio::test]
async fn test_status_without_table_is_free() {
    let store: Arc<dyn ScheduleRepository> = Arc::new(InMemoryScheduleStore::missing());
    let (status, body) = get_json(app_with(store.clone(), 9, 30), "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "free");

    let (_, body) = get_json(app_with(store, 9, 30), "/schedule").await;
    assert_eq!(body["found"], false);
    assert_eq!(body["sessions"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_query_by_weekday() {
    // "周五的课"
    let (status, body) = get_json(
        app_with(seeded_store(), 9, 0),
        "/query?q=%E5%91%A8%E4%BA%94%E7%9A%84%E8%AF%BE",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"], "day_filter");
    assert_eq!(body["target_day"], "Friday");
    let sessions = body["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 2);
    assert!(sessions.iter().all(|s| s["day"] == "Friday"));
    assert!(!body["reply"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_query_fuzzy_course() {
    // "高数"
    let (_, body) = get_json(app_with(seeded_store(), 9, 0), "/query?q=%E9%AB%98%E6%95%B0").await;
    assert_eq!(body["stage"], "fuzzy_course");
    assert_eq!(body["sessions"][0]["course_name"], "高等数学");
    assert_eq!(body["case"], "busy_morning");
}

#[tokio::test]
async fn test_query_empty() {
    let (_, body) = get_json(app_with(seeded_store(), 9, 0), "/query?q=").await;
    assert_eq!(body["stage"], "no_match");
    assert_eq!(body["case"], "free_generic");
    assert!(body["sessions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_replaces_schedule() {
    let store = seeded_store();
    let app = app_with(store.clone(), 9, 0);

    let csv = "day,period,start_time,end_time,course_name,location,teacher\nTuesday,1,08:00,09:30,线性代数,E505,周老师\n";
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/schedule")
                .header("content-type", "text/csv")
                .body(Body::from(csv))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (_, body) = get_json(app, "/schedule").await;
    assert_eq!(body["found"], true);
    let sessions = body["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["course_name"], "线性代数");
}

#[tokio::test]
async fn test_upload_with_missing_columns_is_rejected() {
    let store = seeded_store();
    let app = app_with(store.clone(), 9, 0);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/schedule")
                .body(Body::from("day,course_name\nMonday,Math\n"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["message"].as_str().unwrap().contains("missing columns"));

    // 既存の時間割はそのまま
    let (_, body) = get_json(app, "/schedule").await;
    assert_eq!(body["sessions"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_week_and_stats() {
    let app = app_with(seeded_store(), 9, 0);

    let (_, week) = get_json(app.clone(), "/week").await;
    let days: Vec<&str> = week
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["day"].as_str().unwrap())
        .collect();
    assert_eq!(days, vec!["Monday", "Friday"]);

    let (_, stats) = get_json(app, "/stats").await;
    assert_eq!(stats["total_sessions"], 4);
    assert_eq!(stats["busiest_day"]["day"], "Monday");
    assert_eq!(stats["course_counts"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_reload() {
    let app = app_with(seeded_store(), 9, 0);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/schedule/reload")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_corrupt_file_on_disk_is_server_error() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("schedule_data.csv");
    std::fs::write(&path, "day,course_name\nMonday,Math\n").unwrap();
    let store: Arc<dyn ScheduleRepository> = Arc::new(CsvScheduleStore::new(&path));

    let (status, body) = get_json(app_with(store, 9, 0), "/status").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Storage error occurred");
}
