use crate::fixtures::test_app::TestApp;
use serde_json::Value;

#[tokio::test]
async fn register_and_login() {
    let app = TestApp::spawn().await;

    let user = app
        .register_user("alice@voluntry.test", "Alice", "Password123!")
        .await;
    assert!(!user.access_token.is_empty());
    assert!(!user.refresh_token.is_empty());

    let resp = app
        .auth_get("/api/auth/me", &user.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["email"], "alice@voluntry.test");
    assert_eq!(json["display_name"], "Alice");
    assert_eq!(json["role"], "volunteer");
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = TestApp::spawn().await;

    app.register_user("bob@voluntry.test", "Bob", "Password123!")
        .await;

    let resp = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&serde_json::json!({
            "email": "bob@voluntry.test",
            "display_name": "Bob Again",
            "password": "Password123!",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);
}

#[tokio::test]
async fn login_with_wrong_password_fails() {
    let app = TestApp::spawn().await;

    app.register_user("carol@voluntry.test", "Carol", "Password123!")
        .await;

    let resp = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&serde_json::json!({
            "email": "carol@voluntry.test",
            "password": "wrong-password",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn login_with_unknown_email_fails() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&serde_json::json!({
            "email": "nobody@voluntry.test",
            "password": "Password123!",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["message"], "Invalid credentials");
}

#[tokio::test]
async fn refresh_issues_new_tokens() {
    let app = TestApp::spawn().await;

    let user = app
        .register_user("dave@voluntry.test", "Dave", "Password123!")
        .await;

    let resp = app
        .client
        .post(app.url("/api/auth/refresh"))
        .json(&serde_json::json!({ "refresh_token": user.refresh_token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert!(json["access_token"].as_str().unwrap().len() > 0);
}

#[tokio::test]
async fn protected_route_requires_token() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .get(app.url("/api/auth/me"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn update_profile() {
    let app = TestApp::spawn().await;

    let user = app
        .register_user("erin@voluntry.test", "Erin", "Password123!")
        .await;

    let resp = app
        .auth_put("/api/auth/me", &user.access_token)
        .json(&serde_json::json!({ "display_name": "Erin Updated" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["display_name"], "Erin Updated");
}
