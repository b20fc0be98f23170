use crate::fixtures::test_app::TestApp;
use chrono::{Duration, Utc};
use serde_json::Value;

async fn list(app: &TestApp, query: &str) -> Value {
    let resp = app
        .client
        .get(app.url(&format!("/api/activities{}", query)))
        .send()
        .await
        .expect("List request failed");
    assert_eq!(resp.status().as_u16(), 200);
    resp.json().await.expect("Failed to parse list response")
}

fn titles(json: &Value) -> Vec<String> {
    json["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn drafts_and_cancelled_are_hidden_from_the_public_list() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("owner@list.test", "Owner", "Password123!")
        .await;

    app.create_activity(&owner.access_token, "Hidden Draft", serde_json::json!({}))
        .await;
    app.create_open_activity(&owner.access_token, "Visible Open", serde_json::json!({}))
        .await;

    let closed = app
        .create_open_activity(&owner.access_token, "Visible Closed", serde_json::json!({}))
        .await;
    let resp = app
        .auth_post(
            &format!("/api/activities/{}/state", closed["id"].as_str().unwrap()),
            &owner.access_token,
        )
        .json(&serde_json::json!({ "state": "closed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let cancelled = app
        .create_open_activity(&owner.access_token, "Gone Cancelled", serde_json::json!({}))
        .await;
    let resp = app
        .auth_post(
            &format!("/api/activities/{}/state", cancelled["id"].as_str().unwrap()),
            &owner.access_token,
        )
        .json(&serde_json::json!({ "state": "cancelled" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let json = list(&app, "").await;
    let mut found = titles(&json);
    found.sort();
    assert_eq!(found, vec!["Visible Closed", "Visible Open"]);
    assert_eq!(json["total"], 2);
}

#[tokio::test]
async fn tag_filter_matches_exactly() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("owner2@list.test", "Owner", "Password123!")
        .await;

    app.create_open_activity(
        &owner.access_token,
        "Park Day",
        serde_json::json!({ "tags": ["outdoor", "family"] }),
    )
    .await;
    app.create_open_activity(
        &owner.access_token,
        "Soup Kitchen",
        serde_json::json!({ "tags": ["food"] }),
    )
    .await;

    let json = list(&app, "?tag=outdoor").await;
    assert_eq!(titles(&json), vec!["Park Day"]);

    // Tag matching is exact, not substring
    let json = list(&app, "?tag=out").await;
    assert_eq!(json["total"], 0);
}

#[tokio::test]
async fn search_is_case_insensitive_over_title_and_description() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("owner3@list.test", "Owner", "Password123!")
        .await;

    app.create_open_activity(&owner.access_token, "River Cleanup", serde_json::json!({}))
        .await;
    app.create_open_activity(
        &owner.access_token,
        "Food Drive",
        serde_json::json!({ "description": "Cleanup of the pantry shelves" }),
    )
    .await;
    app.create_open_activity(&owner.access_token, "Book Sale", serde_json::json!({}))
        .await;

    let json = list(&app, "?search=CLEANUP").await;
    let mut found = titles(&json);
    found.sort();
    assert_eq!(found, vec!["Food Drive", "River Cleanup"]);
}

#[tokio::test]
async fn search_with_regex_metacharacters_is_literal() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("owner4@list.test", "Owner", "Password123!")
        .await;

    app.create_open_activity(&owner.access_token, "Bake Sale (Spring)", serde_json::json!({}))
        .await;
    app.create_open_activity(&owner.access_token, "Bake Sale Spring", serde_json::json!({}))
        .await;

    let json = list(&app, "?search=%28Spring%29").await;
    assert_eq!(titles(&json), vec!["Bake Sale (Spring)"]);
}

#[tokio::test]
async fn date_range_bounds_are_inclusive() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("owner5@list.test", "Owner", "Password123!")
        .await;

    let now = Utc::now();
    app.create_open_activity(
        &owner.access_token,
        "Soon",
        serde_json::json!({ "date": (now + Duration::days(2)).to_rfc3339() }),
    )
    .await;
    app.create_open_activity(
        &owner.access_token,
        "Later",
        serde_json::json!({ "date": (now + Duration::days(30)).to_rfc3339() }),
    )
    .await;

    let from = (now + Duration::days(1)).to_rfc3339();
    let to = (now + Duration::days(10)).to_rfc3339();
    let json = list(
        &app,
        &format!(
            "?from={}&to={}",
            urlencode(&from),
            urlencode(&to)
        ),
    )
    .await;
    assert_eq!(titles(&json), vec!["Soon"]);

    let json = list(&app, &format!("?from={}", urlencode(&to))).await;
    assert_eq!(titles(&json), vec!["Later"]);
}

#[tokio::test]
async fn pagination_reports_totals_and_pages() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("owner6@list.test", "Owner", "Password123!")
        .await;

    for i in 0..5 {
        app.create_open_activity(
            &owner.access_token,
            &format!("Shift {}", i),
            serde_json::json!({}),
        )
        .await;
    }

    let json = list(&app, "?page=1&limit=2").await;
    assert_eq!(json["items"].as_array().unwrap().len(), 2);
    assert_eq!(json["total"], 5);
    assert_eq!(json["total_pages"], 3);
    assert_eq!(json["page"], 1);
    assert_eq!(json["limit"], 2);

    let json = list(&app, "?page=3&limit=2").await;
    assert_eq!(json["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn pagination_survives_absurd_page_values() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("owner8@list.test", "Owner", "Password123!")
        .await;

    app.create_open_activity(&owner.access_token, "Lone Event", serde_json::json!({}))
        .await;

    // u64::MAX as a page number must not blow up the skip computation
    let json = list(&app, "?page=18446744073709551615&limit=20").await;
    assert!(json["items"].as_array().unwrap().is_empty());
    assert_eq!(json["total"], 1);

    // Oversized limits are capped server-side
    let json = list(&app, "?limit=999999").await;
    assert_eq!(json["limit"], 100);
    assert_eq!(json["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn sort_by_date_ascending_and_descending() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("owner7@list.test", "Owner", "Password123!")
        .await;

    let now = Utc::now();
    app.create_open_activity(
        &owner.access_token,
        "Third",
        serde_json::json!({ "date": (now + Duration::days(21)).to_rfc3339() }),
    )
    .await;
    app.create_open_activity(
        &owner.access_token,
        "First",
        serde_json::json!({ "date": (now + Duration::days(1)).to_rfc3339() }),
    )
    .await;
    app.create_open_activity(
        &owner.access_token,
        "Second",
        serde_json::json!({ "date": (now + Duration::days(7)).to_rfc3339() }),
    )
    .await;

    let json = list(&app, "?sort=date").await;
    assert_eq!(titles(&json), vec!["First", "Second", "Third"]);

    let json = list(&app, "?sort=-date").await;
    assert_eq!(titles(&json), vec!["Third", "Second", "First"]);
}

/// Minimal percent-encoding for query values used in these tests.
fn urlencode(s: &str) -> String {
    s.replace('+', "%2B").replace(':', "%3A")
}
