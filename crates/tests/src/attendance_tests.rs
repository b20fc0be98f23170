use crate::fixtures::test_app::TestApp;
use serde_json::Value;

#[tokio::test]
async fn owner_records_attendance_for_participant() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("owner@att.test", "Owner", "Password123!")
        .await;
    let volunteer = app
        .register_user("vol@att.test", "Volunteer", "Password123!")
        .await;

    let activity = app
        .create_open_activity(&owner.access_token, "Garden Day", serde_json::json!({}))
        .await;
    let id = activity["id"].as_str().unwrap();

    app.auth_post(&format!("/api/activities/{}/join", id), &volunteer.access_token)
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();

    let resp = app
        .auth_post(&format!("/api/activities/{}/attendance", id), &owner.access_token)
        .json(&serde_json::json!({
            "user_id": volunteer.id,
            "status": "present",
            "notes": "arrived early",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "present");
    assert_eq!(json["recorded_by"], owner.id);
    assert_eq!(json["notes"], "arrived early");
}

#[tokio::test]
async fn recording_again_overwrites_instead_of_duplicating() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("owner2@att.test", "Owner", "Password123!")
        .await;
    let volunteer = app
        .register_user("vol2@att.test", "Volunteer", "Password123!")
        .await;

    let activity = app
        .create_open_activity(&owner.access_token, "Cooking Class", serde_json::json!({}))
        .await;
    let id = activity["id"].as_str().unwrap();

    app.auth_post(&format!("/api/activities/{}/join", id), &volunteer.access_token)
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();

    for status in ["present", "absent"] {
        let resp = app
            .auth_post(&format!("/api/activities/{}/attendance", id), &owner.access_token)
            .json(&serde_json::json!({ "user_id": volunteer.id, "status": status }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
    }

    let aid = bson::oid::ObjectId::parse_str(id).unwrap();
    let uid = bson::oid::ObjectId::parse_str(&volunteer.id).unwrap();
    let rows: Vec<bson::Document> = {
        use futures::TryStreamExt;
        app.db
            .collection::<bson::Document>("attendance")
            .find(bson::doc! { "activity_id": aid, "user_id": uid })
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap()
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_str("status").unwrap(), "absent");
}

#[tokio::test]
async fn attendance_requires_participation() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("owner3@att.test", "Owner", "Password123!")
        .await;
    let outsider = app
        .register_user("out@att.test", "Outsider", "Password123!")
        .await;

    let activity = app
        .create_open_activity(&owner.access_token, "Litter Pickup", serde_json::json!({}))
        .await;
    let id = activity["id"].as_str().unwrap();

    let resp = app
        .auth_post(&format!("/api/activities/{}/attendance", id), &owner.access_token)
        .json(&serde_json::json!({ "user_id": outsider.id, "status": "present" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn attendance_status_must_be_valid() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("owner4@att.test", "Owner", "Password123!")
        .await;
    let volunteer = app
        .register_user("vol4@att.test", "Volunteer", "Password123!")
        .await;

    let activity = app
        .create_open_activity(&owner.access_token, "Bake Sale", serde_json::json!({}))
        .await;
    let id = activity["id"].as_str().unwrap();

    app.auth_post(&format!("/api/activities/{}/join", id), &volunteer.access_token)
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();

    let resp = app
        .auth_post(&format!("/api/activities/{}/attendance", id), &owner.access_token)
        .json(&serde_json::json!({ "user_id": volunteer.id, "status": "late" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn attendance_requires_moderator() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("owner5@att.test", "Owner", "Password123!")
        .await;
    let volunteer = app
        .register_user("vol5@att.test", "Volunteer", "Password123!")
        .await;

    let activity = app
        .create_open_activity(&owner.access_token, "Charity Run", serde_json::json!({}))
        .await;
    let id = activity["id"].as_str().unwrap();

    app.auth_post(&format!("/api/activities/{}/join", id), &volunteer.access_token)
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();

    // A plain volunteer cannot record attendance, even their own
    let resp = app
        .auth_post(&format!("/api/activities/{}/attendance", id), &volunteer.access_token)
        .json(&serde_json::json!({ "user_id": volunteer.id, "status": "present" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}
