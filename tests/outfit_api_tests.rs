mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_create_then_fetch_round_trips_fields() {
    let app = TestApp::new().await;
    let cookie = app.login_as("alice@example.com").await;

    let created = app
        .post(
            "/api/outfits",
            Some(&cookie),
            json!({
                "name": "Test API Outfit",
                "description": "Created through the API",
                "isPrivate": false,
                "tags": ["test", "api"]
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.body["id"].as_i64().unwrap();

    let fetched = app.get(&format!("/api/outfits/{}", id), None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["name"], "Test API Outfit");
    assert_eq!(fetched.body["description"], "Created through the API");
    assert_eq!(fetched.body["tags"], json!(["test", "api"]));
    assert_eq!(fetched.body["user"]["name"], "Test User");
    assert_eq!(fetched.body["items"], json!([]));
}

#[tokio::test]
async fn test_create_requires_name() {
    let app = TestApp::new().await;
    let cookie = app.login_as("alice@example.com").await;

    let response = app
        .post(
            "/api/outfits",
            Some(&cookie),
            json!({ "description": "nameless" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Name is required");
}

#[tokio::test]
async fn test_create_rejects_unknown_fields_and_bad_json() {
    let app = TestApp::new().await;
    let cookie = app.login_as("alice@example.com").await;

    let response = app
        .post(
            "/api/outfits",
            Some(&cookie),
            json!({ "name": "Ok", "userId": 99 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string());

    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/outfits")
        .header("cookie", &cookie)
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string());
}

#[tokio::test]
async fn test_mutations_require_session() {
    let app = TestApp::new().await;

    let response = app
        .post("/api/outfits", None, json!({ "name": "Anonymous" }))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "Unauthorized");

    let response = app.get("/api/my-outfits", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_private_outfit_is_hidden_from_other_users() {
    let app = TestApp::new().await;
    let owner = app.login_as("owner@example.com").await;
    let stranger = app.login_as("stranger@example.com").await;

    let id = app
        .create_outfit(&owner, json!({ "name": "Secret", "isPrivate": true }))
        .await;
    let uri = format!("/api/outfits/{}", id);

    assert_eq!(app.get(&uri, Some(&owner)).await.status, StatusCode::OK);
    assert_eq!(
        app.get(&uri, Some(&stranger)).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(app.get(&uri, None).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_owner_delete_is_not_found() {
    let app = TestApp::new().await;
    let owner = app.login_as("owner@example.com").await;
    let stranger = app.login_as("stranger@example.com").await;

    let id = app
        .create_outfit(&owner, json!({ "name": "Keep Me" }))
        .await;
    let uri = format!("/api/outfits/{}", id);

    let response = app.json(Method::DELETE, &uri, Some(&stranger), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.get(&uri, Some(&owner)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], "Keep Me");

    let response = app.json(Method::DELETE, &uri, Some(&owner), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Outfit deleted successfully");
    assert_eq!(app.get(&uri, Some(&owner)).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_replaces_items_for_owner_only() {
    let app = TestApp::new().await;
    let owner = app.login_as("owner@example.com").await;
    let stranger = app.login_as("stranger@example.com").await;

    let id = app
        .create_outfit(
            &owner,
            json!({
                "name": "Weekend",
                "items": [
                    { "name": "Hoodie", "category": "UPPERWEAR" },
                    { "name": "Sneakers", "category": "FOOTWEAR" }
                ]
            }),
        )
        .await;
    let uri = format!("/api/outfits/{}", id);

    let response = app
        .json(
            Method::PUT,
            &uri,
            Some(&stranger),
            Some(json!({ "name": "Hijacked" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .json(
            Method::PUT,
            &uri,
            Some(&owner),
            Some(json!({
                "name": "Weekend Rework",
                "isPrivate": true,
                "items": [{ "name": "Cap", "category": "ACCESSORIES" }]
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], "Weekend Rework");
    assert_eq!(response.body["isPrivate"], true);
    assert_eq!(response.body["items"].as_array().unwrap().len(), 1);
    assert_eq!(response.body["items"][0]["category"], "ACCESSORIES");

    let response = app
        .json(Method::PUT, &uri, Some(&owner), Some(json!({})))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Name is required");
}

#[tokio::test]
async fn test_invalid_outfit_id() {
    let app = TestApp::new().await;
    let cookie = app.login_as("alice@example.com").await;

    let response = app.get("/api/outfits/not-a-number", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Invalid outfit ID");

    let response = app
        .post("/api/outfits/abc/save", Some(&cookie), json!({}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_save_rules() {
    let app = TestApp::new().await;
    let owner = app.login_as("owner@example.com").await;
    let fan = app.login_as("fan@example.com").await;

    let public_id = app
        .create_outfit(
            &owner,
            json!({
                "name": "Street Style",
                "items": [{ "name": "Bomber", "category": "OUTERWEAR" }]
            }),
        )
        .await;
    let private_id = app
        .create_outfit(&owner, json!({ "name": "Closet", "isPrivate": true }))
        .await;

    // Saving your own outfit
    let response = app
        .json(
            Method::POST,
            &format!("/api/outfits/{}/save", public_id),
            Some(&owner),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "You already have this outfit");

    // Private outfits, for owner and stranger alike
    for cookie in [&owner, &fan] {
        let response = app
            .json(
                Method::POST,
                &format!("/api/outfits/{}/save", private_id),
                Some(cookie),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert_eq!(response.body["error"], "Cannot save private outfits");
    }

    let response = app
        .json(
            Method::POST,
            &format!("/api/outfits/{}/save", public_id),
            Some(&fan),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["message"], "Outfit saved successfully");
    assert_eq!(response.body["outfit"]["savedFromId"], public_id);
    assert_eq!(response.body["outfit"]["isPrivate"], true);
    assert_eq!(response.body["outfit"]["items"][0]["name"], "Bomber");

    let response = app
        .json(
            Method::POST,
            &format!("/api/outfits/{}/save", public_id),
            Some(&fan),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let source = app.get(&format!("/api/outfits/{}", public_id), None).await;
    assert_eq!(source.body["saveCount"], 1);
}

#[tokio::test]
async fn test_public_feed_and_my_outfits() {
    let app = TestApp::new().await;
    let alice = app.login_as("alice@example.com").await;
    let bob = app.login_as("bob@example.com").await;

    for i in 0..13 {
        app.create_outfit(&alice, json!({ "name": format!("Look {}", i) }))
            .await;
    }
    app.create_outfit(&bob, json!({ "name": "Bob Private", "isPrivate": true }))
        .await;

    let page = app.get("/api/outfits", None).await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.body["page"], 1);
    assert_eq!(page.body["total"], 13);
    assert_eq!(page.body["totalPages"], 2);
    assert_eq!(page.body["outfits"].as_array().unwrap().len(), 12);

    let page = app.get("/api/outfits?page=2", None).await;
    let outfits = page.body["outfits"].as_array().unwrap();
    assert_eq!(outfits.len(), 1);
    assert!(outfits.iter().all(|o| o["isPrivate"] == false));

    let page = app.get("/api/outfits?page=0", None).await;
    assert_eq!(page.body["page"], 1);

    let mine = app.get("/api/my-outfits", Some(&bob)).await;
    assert_eq!(mine.status, StatusCode::OK);
    assert_eq!(mine.body["total"], 1);
    assert_eq!(mine.body["outfits"][0]["name"], "Bob Private");
}

#[tokio::test]
async fn test_huge_page_number_returns_empty_page() {
    let app = TestApp::new().await;
    let cookie = app.login_as("alice@example.com").await;
    app.create_outfit(&cookie, json!({ "name": "Only Look" }))
        .await;

    for uri in [
        "/api/outfits?page=9223372036854775807",
        "/api/my-outfits?page=9223372036854775807",
    ] {
        let page = app.get(uri, Some(&cookie)).await;
        assert_eq!(page.status, StatusCode::OK);
        assert_eq!(page.body["total"], 1);
        assert_eq!(page.body["outfits"], json!([]));
        assert!(page.body["page"].as_i64().unwrap() > 1);
    }
}

#[tokio::test]
async fn test_my_items_are_distinct() {
    let app = TestApp::new().await;
    let cookie = app.login_as("alice@example.com").await;

    app.create_outfit(
        &cookie,
        json!({
            "name": "Monday",
            "items": [
                { "name": "White Tee", "category": "UPPERWEAR" },
                { "name": "Jeans", "category": "LOWERWEAR" }
            ]
        }),
    )
    .await;
    app.create_outfit(
        &cookie,
        json!({
            "name": "Tuesday",
            "items": [{ "name": "white tee", "category": "UPPERWEAR" }]
        }),
    )
    .await;

    let items = app.get("/api/my-items", Some(&cookie)).await;
    assert_eq!(items.status, StatusCode::OK);
    assert_eq!(items.body.as_array().unwrap().len(), 2);
}
