use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::Utc;
use http_body_util::BodyExt;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use student_awards_backend::config::AppConfig;
use student_awards_backend::entities::users::{Role, Status};
use student_awards_backend::entities::{profiles, users};
use student_awards_backend::infrastructure::{database, seed};
use student_awards_backend::services::cleanup::{CleanupQueue, CleanupWorker};
use student_awards_backend::services::image_lifecycle::ImageLifecycle;
use student_awards_backend::services::image_store::{DeleteOutcome, ImageStore, UploadError};
use student_awards_backend::utils::auth::{create_jwt, hash_password};
use student_awards_backend::{AppState, create_app};
use tower::ServiceExt;
use uuid::Uuid;

const HOSTED_PREFIX: &str = "https://img.test/student-awards/";

struct MockImageStore {
    uploads: Mutex<Vec<String>>,
    deletes: Mutex<Vec<String>>,
}

impl MockImageStore {
    fn new() -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
        }
    }

    fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    fn deleted(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageStore for MockImageStore {
    async fn upload(&self, source: &str) -> Result<String, UploadError> {
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(source.to_string());
        Ok(format!("{}{}", HOSTED_PREFIX, uploads.len()))
    }

    async fn delete(&self, hosted_url: &str) -> anyhow::Result<DeleteOutcome> {
        self.deletes.lock().unwrap().push(hosted_url.to_string());
        Ok(DeleteOutcome::Deleted)
    }
}

struct TestApp {
    app: Router,
    db: DatabaseConnection,
    store: Arc<MockImageStore>,
    config: AppConfig,
    // Keeps the cleanup worker alive for the duration of the test
    _shutdown_tx: tokio::sync::watch::Sender<bool>,
}

impl TestApp {
    async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Waits until the cleanup worker has deleted the given hosted URL.
    async fn wait_for_delete(&self, url: &str) {
        for _ in 0..100 {
            if self.store.deleted().iter().any(|u| u == url) {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("cleanup delete for {url} was not observed");
    }

    /// Inserts a user row directly and returns (id, bearer token).
    async fn insert_user(&self, email: &str, role: Role, verified: bool) -> (String, String) {
        let now = Utc::now();
        let user = users::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            email: Set(email.to_string()),
            first_name: Set("Test".to_string()),
            last_name: Set(None),
            password_hash: Set(Some(hash_password("Umuhungu@123").unwrap())),
            role: Set(role),
            status: Set(Status::Active),
            verified: Set(verified),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .unwrap();

        let token = create_jwt(&user.id, role, &self.config.jwt_secret, 24).unwrap();
        (user.id, token)
    }

    async fn insert_profile(&self, user_id: &str, pic: Option<&str>) -> String {
        let now = Utc::now();
        let profile = profiles::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            user_id: Set(user_id.to_string()),
            username: Set(format!("user{}", &user_id[..8])),
            bio: Set("A student worth watching".to_string()),
            profile_pic: Set(pic.map(|p| p.to_string())),
            phone_number: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .unwrap();
        profile.id
    }
}

async fn setup() -> (TestApp, String, String) {
    // A single connection keeps every query on the same in-memory database
    let mut opt = sea_orm::ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1);
    let db = Database::connect(opt).await.unwrap();
    database::run_migrations(&db).await.unwrap();
    seed::seed_initial_data(&db).await.unwrap();

    let config = AppConfig::development();
    let store = Arc::new(MockImageStore::new());
    let (queue, events) = CleanupQueue::new();
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let worker = CleanupWorker::new(store.clone(), events, shutdown_rx);
    tokio::spawn(worker.run());

    let images = ImageLifecycle::new(store.clone(), queue);
    let state = AppState::new(db.clone(), images, config.clone());
    let app = create_app(state);

    let test_app = TestApp {
        app,
        db,
        store,
        config,
        _shutdown_tx: shutdown_tx,
    };

    // Log in as the seeded super admin
    let (status, body) = test_app
        .request(
            "POST",
            "/api/v1/users/login",
            None,
            Some(json!({
                "email": "admin@student-awards.local",
                "password": "ChangeMe@123",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "seed admin login failed: {body}");
    let token = body["token"].as_str().unwrap().to_string();
    let profile_id = body["data"]["profile"]["id"].as_str().unwrap().to_string();

    (test_app, token, profile_id)
}

fn raw_images(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!("https://cdn.example.com/raw/photo-{i}.jpg"))
        .collect()
}

#[tokio::test]
async fn test_health() {
    let (app, _token, _profile) = setup().await;
    let (status, body) = app.request("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_auth_and_user_crud() {
    let (app, admin_token, _profile) = setup().await;

    // Guarded route without a token
    let (status, _) = app.request("GET", "/api/v1/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Guarded route with a USER-role token
    let (_, user_token) = app.insert_user("plain@test.local", Role::User, true).await;
    let (status, _) = app
        .request("GET", "/api/v1/users", Some(&user_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admin creates a user
    let (status, body) = app
        .request(
            "POST",
            "/api/v1/users",
            Some(&admin_token),
            Some(json!({
                "firstName": "Aline",
                "lastName": "Uwase",
                "email": "aline@test.local",
                "password": "Umuhungu@123",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "create user failed: {body}");
    let created_id = body["data"]["id"].as_str().unwrap().to_string();
    assert!(body["data"].get("passwordHash").is_none());

    // Duplicate email is a conflict
    let (status, body) = app
        .request(
            "POST",
            "/api/v1/users",
            Some(&admin_token),
            Some(json!({
                "firstName": "Aline",
                "email": "aline@test.local",
                "password": "Umuhungu@123",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], 409);

    // Fresh accounts are unverified and can not log in yet
    let (status, _) = app
        .request(
            "POST",
            "/api/v1/users/login",
            None,
            Some(json!({
                "email": "aline@test.local",
                "password": "Umuhungu@123",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Listing includes the created account with its count
    let (status, body) = app
        .request("GET", "/api/v1/users", Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["_count"].as_u64().unwrap() >= 2);

    // Empty update payloads are rejected before touching the database
    let (status, _) = app
        .request(
            "PATCH",
            &format!("/api/v1/users/{created_id}"),
            Some(&admin_token),
            Some(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request(
            "PATCH",
            &format!("/api/v1/users/{created_id}"),
            Some(&admin_token),
            Some(json!({ "verified": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["verified"], true);
}

#[tokio::test]
async fn test_super_admin_fields_are_immutable() {
    let (app, admin_token, _profile) = setup().await;

    let (status, body) = app
        .request("GET", "/api/v1/users", Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let super_admin_id = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["role"] == "SUPER_ADMIN")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    for payload in [
        json!({ "role": "ADMIN" }),
        json!({ "status": "INACTIVE" }),
        json!({ "email": "other@test.local" }),
    ] {
        let (status, _) = app
            .request(
                "PATCH",
                &format!("/api/v1/users/{super_admin_id}"),
                Some(&admin_token),
                Some(payload),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    // A verified admin account can not be deleted either
    let (status, _) = app
        .request(
            "DELETE",
            &format!("/api/v1/users/{super_admin_id}"),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_activity_image_flow() {
    let (app, admin_token, profile_id) = setup().await;

    // Too few images fail validation before anything is uploaded
    let (status, _) = app
        .request(
            "POST",
            "/api/v1/activities",
            Some(&admin_token),
            Some(json!({
                "images": raw_images(2),
                "title": "Street dance battle finals",
                "caption": "The annual street dance battle held downtown this spring",
                "userProfileId": profile_id,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.store.upload_count(), 0);

    // Create with three unique images
    let (status, body) = app
        .request(
            "POST",
            "/api/v1/activities",
            Some(&admin_token),
            Some(json!({
                "images": raw_images(3),
                "title": "Street dance battle finals",
                "caption": "The annual street dance battle held downtown this spring",
                "userProfileId": profile_id,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "create activity failed: {body}");
    let activity_id = body["data"]["id"].as_str().unwrap().to_string();
    let images = body["data"]["images"].as_array().unwrap();
    assert_eq!(images.len(), 3);
    // Only hosted URLs are persisted, never the raw sources
    for url in images {
        assert!(url.as_str().unwrap().starts_with(HOSTED_PREFIX));
    }

    // Add a fourth image
    let (status, body) = app
        .request(
            "PATCH",
            &format!("/api/v1/activities/addImage/{activity_id}"),
            Some(&admin_token),
            Some(json!({ "image": "https://cdn.example.com/raw/extra.jpg" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let images = body["data"]["images"].as_array().unwrap();
    assert_eq!(images.len(), 4);
    let added = images[3].as_str().unwrap().to_string();

    // Remove the image we just added; it must be cleaned up
    let (status, body) = app
        .request(
            "PATCH",
            &format!("/api/v1/activities/removeImage/{activity_id}"),
            Some(&admin_token),
            Some(json!({ "image": added })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["images"].as_array().unwrap().len(), 3);
    app.wait_for_delete(&added).await;

    // Removing an unknown image changes nothing
    let (status, _) = app
        .request(
            "PATCH",
            &format!("/api/v1/activities/removeImage/{activity_id}"),
            Some(&admin_token),
            Some(json!({ "image": "https://img.test/student-awards/nope" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // At the minimum of three, removal is refused
    let (_, body) = app
        .request(
            "GET",
            &format!("/api/v1/activities/{activity_id}"),
            None,
            None,
        )
        .await;
    let images: Vec<String> = body["data"]["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u.as_str().unwrap().to_string())
        .collect();
    assert_eq!(images.len(), 3);
    let (status, _) = app
        .request(
            "PATCH",
            &format!("/api/v1/activities/removeImage/{activity_id}"),
            Some(&admin_token),
            Some(json!({ "image": images[0] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Fill up to five, then the sixth is refused without uploading
    for i in 0..2 {
        let (status, _) = app
            .request(
                "PATCH",
                &format!("/api/v1/activities/addImage/{activity_id}"),
                Some(&admin_token),
                Some(json!({ "image": format!("https://cdn.example.com/raw/fill-{i}.jpg") })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }
    let uploads_before = app.store.upload_count();
    let (status, _) = app
        .request(
            "PATCH",
            &format!("/api/v1/activities/addImage/{activity_id}"),
            Some(&admin_token),
            Some(json!({ "image": "https://cdn.example.com/raw/sixth.jpg" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.store.upload_count(), uploads_before);
    let (_, body) = app
        .request(
            "GET",
            &format!("/api/v1/activities/{activity_id}"),
            None,
            None,
        )
        .await;
    assert_eq!(body["data"]["images"].as_array().unwrap().len(), 5);

    // Deleting the activity queues every owned image for cleanup
    let (status, body) = app
        .request(
            "DELETE",
            &format!("/api/v1/activities/{activity_id}"),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let owned: Vec<String> = body["data"]["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u.as_str().unwrap().to_string())
        .collect();
    assert_eq!(owned.len(), 5);
    for url in &owned {
        app.wait_for_delete(url).await;
    }
}

#[tokio::test]
async fn test_activity_create_with_missing_profile_cleans_up() {
    let (app, admin_token, _profile) = setup().await;

    let (status, _) = app
        .request(
            "POST",
            "/api/v1/activities",
            Some(&admin_token),
            Some(json!({
                "images": raw_images(3),
                "title": "Street dance battle finals",
                "caption": "The annual street dance battle held downtown this spring",
                "userProfileId": Uuid::new_v4().to_string(),
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // All three uploads happened and all three must be queued for deletion
    assert_eq!(app.store.upload_count(), 3);
    for i in 1..=3 {
        app.wait_for_delete(&format!("{HOSTED_PREFIX}{i}")).await;
    }

    // Nothing was persisted
    let (_, body) = app.request("GET", "/api/v1/activities", None, None).await;
    assert_eq!(body["_count"], 0);
}

#[tokio::test]
async fn test_award_flow_and_certificate_quota() {
    let (app, admin_token, profile_id) = setup().await;

    // SEASON_1 is not seeded, so creation aborts and the uploaded photo
    // is queued for deletion
    let (status, _) = app
        .request(
            "POST",
            "/api/v1/awards",
            Some(&admin_token),
            Some(json!({
                "title": "Best newcomer performance of the year",
                "caption": "Awarded for an outstanding debut on the main stage this season",
                "category": "Singer",
                "userProfileId": profile_id,
                "seasonName": "SEASON_1",
                "image": "https://cdn.example.com/raw/award.jpg",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.store.upload_count(), 1);
    app.wait_for_delete(&format!("{HOSTED_PREFIX}1")).await;
    let (_, body) = app.request("GET", "/api/v1/awards", None, None).await;
    assert_eq!(body["_count"], 0);

    // SEASON_3 is seeded
    let (status, body) = app
        .request(
            "POST",
            "/api/v1/awards",
            Some(&admin_token),
            Some(json!({
                "title": "Best newcomer performance of the year",
                "caption": "Awarded for an outstanding debut on the main stage this season",
                "category": "Singer",
                "userProfileId": profile_id,
                "seasonName": "SEASON_3",
                "image": "https://cdn.example.com/raw/award.jpg",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "create award failed: {body}");
    let award_id = body["data"]["id"].as_str().unwrap().to_string();
    let featured = body["data"]["featuredPhoto"].as_str().unwrap().to_string();
    assert!(featured.starts_with(HOSTED_PREFIX));
    assert_eq!(body["data"]["certificateDownloads"], 5);

    // Five downloads drain the quota, the sixth is refused
    for remaining in (0..5).rev() {
        let (status, body) = app
            .request(
                "GET",
                &format!("/api/v1/awards/certificate/{award_id}"),
                None,
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["certificateDownloads"], remaining);
        assert!(body["data"]["certificateLastDownloadedAt"].is_string());
    }
    let (status, _) = app
        .request(
            "GET",
            &format!("/api/v1/awards/certificate/{award_id}"),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Only a super admin may delete; the featured photo is cleaned up
    let (status, _) = app
        .request(
            "DELETE",
            &format!("/api/v1/awards/{award_id}"),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    app.wait_for_delete(&featured).await;
}

#[tokio::test]
async fn test_season_guards_and_conflicts() {
    let (app, super_token, _profile) = setup().await;

    // A plain ADMIN may not manage seasons
    let (_, admin_token) = app
        .insert_user("justadmin@test.local", Role::Admin, true)
        .await;
    let (status, _) = app
        .request(
            "POST",
            "/api/v1/seasons",
            Some(&admin_token),
            Some(json!({ "name": "SEASON_1", "date": "2021-05-21T16:30:00Z" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(
            "POST",
            "/api/v1/seasons",
            Some(&super_token),
            Some(json!({ "name": "SEASON_1", "date": "2021-05-21T16:30:00Z" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Duplicate season name
    let (status, _) = app
        .request(
            "POST",
            "/api/v1/seasons",
            Some(&super_token),
            Some(json!({ "name": "SEASON_1", "date": "2022-05-21T16:30:00Z" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Season detail is public and carries its collections
    let (status, body) = app
        .request("GET", "/api/v1/seasons/SEASON_3", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["performances"].as_array().is_some());
    assert!(body["data"]["awards"].as_array().is_some());

    // Unknown season names are rejected at the path level
    let (status, _) = app
        .request("GET", "/api/v1/seasons/SEASON_9", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_user_delete_cascades_profile_and_picture() {
    let (app, admin_token, _profile) = setup().await;

    let (user_id, _) = app
        .insert_user("student@test.local", Role::User, true)
        .await;

    // Create the profile through the API so the picture goes through the
    // upload-then-persist path
    let (status, body) = app
        .request(
            "POST",
            &format!("/api/v1/profile/{user_id}"),
            Some(&admin_token),
            Some(json!({
                "username": "student250",
                "bio": "The best rapper you should know",
                "image": "https://cdn.example.com/raw/me.jpg",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "create profile failed: {body}");
    let pic = body["data"]["profilePic"].as_str().unwrap().to_string();
    assert!(pic.starts_with(HOSTED_PREFIX));

    // A second profile for the same user is a conflict, and its uploaded
    // picture is queued for cleanup
    let (status, _) = app
        .request(
            "POST",
            &format!("/api/v1/profile/{user_id}"),
            Some(&admin_token),
            Some(json!({
                "username": "student251",
                "bio": "The best rapper you should know",
                "image": "https://cdn.example.com/raw/me-again.jpg",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    app.wait_for_delete(&format!("{HOSTED_PREFIX}2")).await;

    // Deleting the user removes the profile and queues the picture
    let (status, _) = app
        .request(
            "DELETE",
            &format!("/api/v1/users/{user_id}"),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    app.wait_for_delete(&pic).await;

    let (status, _) = app
        .request("GET", &format!("/api/v1/profile/user/{user_id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_profile_picture_replacement_retires_old_image() {
    let (app, admin_token, _profile) = setup().await;

    let (user_id, _) = app
        .insert_user("model@test.local", Role::User, true)
        .await;
    app.insert_profile(&user_id, Some("https://img.test/student-awards/old-pic"))
        .await;

    let (status, body) = app
        .request(
            "PATCH",
            &format!("/api/v1/profile/{user_id}"),
            Some(&admin_token),
            Some(json!({ "image": "https://cdn.example.com/raw/new-pic.jpg" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "profile update failed: {body}");
    let new_pic = body["data"]["profilePic"].as_str().unwrap();
    assert!(new_pic.starts_with(HOSTED_PREFIX));

    // Old hosted object is retired once the swap persisted
    app.wait_for_delete("https://img.test/student-awards/old-pic")
        .await;
}
