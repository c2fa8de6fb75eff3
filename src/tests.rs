//! Integration tests for the studio backend.

use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;

use crate::config::Config;
use crate::db::{init_database, Repository};
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_psk(Some("test-api-key".to_string())).await
    }

    async fn with_psk(psk: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        // Initialize database
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool.clone()));

        // Create config
        let config = Config {
            api_psk: psk.clone(),
            db_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
        };

        let state = AppState {
            repo,
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let mut client_builder = Client::builder();
        if let Some(key) = psk {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert("x-api-key", key.parse().unwrap());
            client_builder = client_builder.default_headers(headers);
        }

        TestFixture {
            client: client_builder.build().unwrap(),
            base_url,
            pool,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Create a staff member and return its id.
    async fn create_staff(&self, name: &str) -> String {
        let resp = self
            .client
            .post(self.url("/api/staff"))
            .json(&json!({ "name": name }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Create a booking and return its id.
    async fn create_booking(&self, title: &str, date: &str, revenue: f64, assignments: Value) -> String {
        let resp = self
            .client
            .post(self.url("/api/bookings"))
            .json(&json!({
                "title": title,
                "date": date,
                "startTime": "09:00",
                "endTime": "12:00",
                "revenue": revenue,
                "assignments": assignments
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"]["id"].as_str().unwrap().to_string()
    }

    async fn get_json(&self, path: &str) -> Value {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), 200);
        resp.json().await.unwrap()
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_auth_missing_psk() {
    let fixture = TestFixture::new().await;

    // Request without API key
    let client = Client::new();
    let resp = client
        .get(fixture.url("/api/bookings"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_auth_invalid_psk() {
    let fixture = TestFixture::new().await;

    let client = Client::new();
    let resp = client
        .get(fixture.url("/api/bookings"))
        .header("x-api-key", "wrong-key")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_auth_valid_psk() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/bookings"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_booking_crud() {
    let fixture = TestFixture::new().await;

    // Create booking
    let create_resp = fixture
        .client
        .post(fixture.url("/api/bookings"))
        .json(&json!({
            "title": "Wedding Shoot",
            "date": "2024-06-15",
            "startTime": "10:00",
            "endTime": "16:00",
            "revenue": 2500.0,
            "assignments": []
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(create_resp.status(), 200);
    let create_body: Value = create_resp.json().await.unwrap();
    assert_eq!(create_body["success"], true);
    let booking_id = create_body["data"]["id"].as_str().unwrap();
    assert_eq!(create_body["data"]["title"], "Wedding Shoot");
    let revision_after_create = create_body["revisionId"].as_i64().unwrap();

    // Get booking
    let get_body = fixture
        .get_json(&format!("/api/bookings/{}", booking_id))
        .await;
    assert_eq!(get_body["data"]["title"], "Wedding Shoot");
    assert_eq!(get_body["data"]["startTime"], "10:00");

    // Update booking
    let update_resp = fixture
        .client
        .put(fixture.url(&format!("/api/bookings/{}", booking_id)))
        .json(&json!({ "title": "Wedding Shoot (rescheduled)", "date": "2024-06-22" }))
        .send()
        .await
        .unwrap();

    assert_eq!(update_resp.status(), 200);
    let update_body: Value = update_resp.json().await.unwrap();
    assert_eq!(update_body["data"]["title"], "Wedding Shoot (rescheduled)");
    assert_eq!(update_body["data"]["date"], "2024-06-22");
    let revision_after_update = update_body["revisionId"].as_i64().unwrap();
    assert!(revision_after_update > revision_after_create);

    // List bookings
    let list_body = fixture.get_json("/api/bookings").await;
    assert_eq!(list_body["data"].as_array().unwrap().len(), 1);

    // Delete booking
    let delete_resp = fixture
        .client
        .delete(fixture.url(&format!("/api/bookings/{}", booking_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(delete_resp.status(), 200);

    // Verify deleted
    let get_deleted_resp = fixture
        .client
        .get(fixture.url(&format!("/api/bookings/{}", booking_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(get_deleted_resp.status(), 404);
}

#[tokio::test]
async fn test_booking_validation_errors() {
    let fixture = TestFixture::new().await;

    // Empty title
    let resp = fixture
        .client
        .post(fixture.url("/api/bookings"))
        .json(&json!({
            "title": "",
            "date": "2024-06-15",
            "startTime": "10:00",
            "endTime": "16:00",
            "revenue": 100.0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    // Bad date
    let resp = fixture
        .client
        .post(fixture.url("/api/bookings"))
        .json(&json!({
            "title": "Session",
            "date": "15/06/2024",
            "startTime": "10:00",
            "endTime": "16:00",
            "revenue": 100.0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Negative revenue
    let resp = fixture
        .client
        .post(fixture.url("/api/bookings"))
        .json(&json!({
            "title": "Session",
            "date": "2024-06-15",
            "startTime": "10:00",
            "endTime": "16:00",
            "revenue": -5.0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Negative assignment fee
    let resp = fixture
        .client
        .post(fixture.url("/api/bookings"))
        .json(&json!({
            "title": "Session",
            "date": "2024-06-15",
            "startTime": "10:00",
            "endTime": "16:00",
            "revenue": 100.0,
            "assignments": [{ "staffId": "x", "fee": -1.0, "isPaid": false }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_staff_init_flow() {
    let fixture = TestFixture::new().await;

    // First init creates an admin-flagged record
    let init_resp = fixture
        .client
        .post(fixture.url("/api/staff/init"))
        .json(&json!({ "name": "Kean" }))
        .send()
        .await
        .unwrap();

    assert_eq!(init_resp.status(), 200);
    let init_body: Value = init_resp.json().await.unwrap();
    assert_eq!(init_body["data"]["name"], "Kean");
    assert_eq!(init_body["data"]["isAdmin"], true);
    assert_eq!(init_body["data"]["baseDesignation"], "Studio Owner");

    // Second init is rejected
    let again_resp = fixture
        .client
        .post(fixture.url("/api/staff/init"))
        .json(&json!({ "name": "Impostor" }))
        .send()
        .await
        .unwrap();

    assert_eq!(again_resp.status(), 409);
    let again_body: Value = again_resp.json().await.unwrap();
    assert_eq!(again_body["success"], false);
    assert_eq!(again_body["error"]["code"], "CONFLICT");

    // Still exactly one staff record
    let list_body = fixture.get_json("/api/staff").await;
    assert_eq!(list_body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_staff_crud() {
    let fixture = TestFixture::new().await;

    let staff_id = fixture.create_staff("Alex").await;

    // Update
    let update_resp = fixture
        .client
        .put(fixture.url(&format!("/api/staff/{}", staff_id)))
        .json(&json!({ "baseDesignation": "Editor", "isAdmin": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(update_resp.status(), 200);
    let update_body: Value = update_resp.json().await.unwrap();
    assert_eq!(update_body["data"]["baseDesignation"], "Editor");
    assert_eq!(update_body["data"]["isAdmin"], true);

    // Delete
    let delete_resp = fixture
        .client
        .delete(fixture.url(&format!("/api/staff/{}", staff_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(delete_resp.status(), 200);

    let list_body = fixture.get_json("/api/staff").await;
    assert_eq!(list_body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_collection_round_trip() {
    let fixture = TestFixture::new().await;

    let bookings = json!([
        {
            "id": "b-1",
            "title": "Morning Session",
            "date": "2024-05-01",
            "startTime": "08:00",
            "endTime": "10:00",
            "revenue": 300.0,
            "assignments": [{ "staffId": "s-1", "fee": 80.0, "isPaid": true }]
        },
        {
            "id": "b-2",
            "title": "Evening Session",
            "date": "2024-05-02",
            "startTime": "18:00",
            "endTime": "21:00",
            "revenue": 450.0,
            "assignments": []
        }
    ]);

    let put_resp = fixture
        .client
        .put(fixture.url("/api/bookings"))
        .json(&json!({ "bookings": bookings }))
        .send()
        .await
        .unwrap();
    assert_eq!(put_resp.status(), 200);

    // A subsequent list returns exactly what was written
    let list_body = fixture.get_json("/api/bookings").await;
    assert_eq!(list_body["data"], bookings);
}

#[tokio::test]
async fn test_collection_version_conflict() {
    let fixture = TestFixture::new().await;

    // First write, no expectation
    let first_resp = fixture
        .client
        .put(fixture.url("/api/bookings"))
        .json(&json!({ "bookings": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(first_resp.status(), 200);
    let first_body: Value = first_resp.json().await.unwrap();
    let version = first_body["data"]["version"].as_i64().unwrap();

    // Write with the current version succeeds
    let second_resp = fixture
        .client
        .put(fixture.url("/api/bookings"))
        .json(&json!({ "bookings": [], "expectedVersion": version }))
        .send()
        .await
        .unwrap();
    assert_eq!(second_resp.status(), 200);
    let second_body: Value = second_resp.json().await.unwrap();
    let new_version = second_body["data"]["version"].as_i64().unwrap();
    assert_eq!(new_version, version + 1);

    // Re-using the stale version is rejected with the current one attached
    let stale_resp = fixture
        .client
        .put(fixture.url("/api/bookings"))
        .json(&json!({ "bookings": [], "expectedVersion": version }))
        .send()
        .await
        .unwrap();
    assert_eq!(stale_resp.status(), 409);
    let stale_body: Value = stale_resp.json().await.unwrap();
    assert_eq!(stale_body["success"], false);
    assert_eq!(stale_body["error"]["code"], "VERSION_MISMATCH");
    assert_eq!(
        stale_body["error"]["details"]["currentVersion"].as_i64(),
        Some(new_version)
    );
}

#[tokio::test]
async fn test_export_import_round_trip() {
    let fixture = TestFixture::new().await;

    let staff_id = fixture.create_staff("Robin").await;
    let booking_id = fixture
        .create_booking(
            "Portrait Day",
            "2024-07-04",
            600.0,
            json!([{ "staffId": staff_id, "fee": 120.0, "isPaid": false }]),
        )
        .await;
    fixture
        .client
        .post(fixture.url("/api/logs"))
        .json(&json!({
            "action": "Note",
            "details": "pre-export entry",
            "userId": "tester",
            "userName": "Tester"
        }))
        .send()
        .await
        .unwrap();

    // Export, remember the exact state
    let export_body = fixture.get_json("/api/snapshot/export").await;
    let bundle = export_body["data"].clone();
    let bookings_before = fixture.get_json("/api/bookings").await["data"].clone();
    let staff_before = fixture.get_json("/api/staff").await["data"].clone();
    let logs_before = fixture.get_json("/api/logs").await["data"].clone();

    // Mutate everything
    fixture
        .client
        .delete(fixture.url(&format!("/api/bookings/{}", booking_id)))
        .send()
        .await
        .unwrap();
    fixture.create_staff("Interloper").await;

    // Import the exported bundle
    let import_resp = fixture
        .client
        .post(fixture.url("/api/snapshot/import"))
        .body(serde_json::to_string(&bundle).unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(import_resp.status(), 200);

    // All three collections are back to the pre-export state
    assert_eq!(fixture.get_json("/api/bookings").await["data"], bookings_before);
    assert_eq!(fixture.get_json("/api/staff").await["data"], staff_before);
    assert_eq!(fixture.get_json("/api/logs").await["data"], logs_before);
}

#[tokio::test]
async fn test_partial_bundle_import_leaves_missing_collections_untouched() {
    let fixture = TestFixture::new().await;

    let staff_id = fixture.create_staff("Sam").await;

    // Bundle with bookings and logs but no staff
    let import_resp = fixture
        .client
        .post(fixture.url("/api/snapshot/import"))
        .body(
            json!({
                "bookings": [{
                    "id": "b-import",
                    "title": "Imported Session",
                    "date": "2024-09-09",
                    "startTime": "13:00",
                    "endTime": "15:00",
                    "revenue": 200.0,
                    "assignments": []
                }],
                "logs": []
            })
            .to_string(),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(import_resp.status(), 200);

    // Bookings and logs were replaced, staff kept
    let bookings = fixture.get_json("/api/bookings").await;
    assert_eq!(bookings["data"][0]["id"], "b-import");

    let logs = fixture.get_json("/api/logs").await;
    assert_eq!(logs["data"].as_array().unwrap().len(), 0);

    let staff = fixture.get_json("/api/staff").await;
    assert_eq!(staff["data"][0]["id"].as_str(), Some(staff_id.as_str()));
}

#[tokio::test]
async fn test_import_rejects_malformed_bundle() {
    let fixture = TestFixture::new().await;

    fixture.create_staff("Kept").await;

    let import_resp = fixture
        .client
        .post(fixture.url("/api/snapshot/import"))
        .body("this is not a snapshot")
        .send()
        .await
        .unwrap();

    assert_eq!(import_resp.status(), 400);
    let body: Value = import_resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    // Nothing was overwritten
    let staff = fixture.get_json("/api/staff").await;
    assert_eq!(staff["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_restore_without_backup_fails() {
    let fixture = TestFixture::new().await;

    // Nothing has ever been written, so there is no backup to restore
    let restore_resp = fixture
        .client
        .post(fixture.url("/api/snapshot/restore"))
        .send()
        .await
        .unwrap();

    assert_eq!(restore_resp.status(), 200);
    let body: Value = restore_resp.json().await.unwrap();
    assert_eq!(body["data"]["restored"], false);

    // Collections are untouched (still empty)
    let bookings = fixture.get_json("/api/bookings").await;
    assert_eq!(bookings["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_restore_after_write() {
    let fixture = TestFixture::new().await;

    fixture
        .create_booking("Persisted Session", "2024-08-01", 150.0, json!([]))
        .await;

    let restore_resp = fixture
        .client
        .post(fixture.url("/api/snapshot/restore"))
        .send()
        .await
        .unwrap();

    assert_eq!(restore_resp.status(), 200);
    let body: Value = restore_resp.json().await.unwrap();
    assert_eq!(body["data"]["restored"], true);

    // The backup mirrors the latest write, so the booking survives
    let bookings = fixture.get_json("/api/bookings").await;
    assert_eq!(bookings["data"][0]["title"], "Persisted Session");
}

#[tokio::test]
async fn test_log_cap_keeps_most_recent_hundred() {
    let fixture = TestFixture::new().await;

    for i in 0..105 {
        let resp = fixture
            .client
            .post(fixture.url("/api/logs"))
            .json(&json!({
                "action": "Counter",
                "details": format!("entry {}", i),
                "userId": "tester",
                "userName": "Tester"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    let logs = fixture.get_json("/api/logs").await;
    let entries = logs["data"].as_array().unwrap();
    assert_eq!(entries.len(), 100);

    // Most recent first; the five oldest entries were evicted
    assert_eq!(entries[0]["details"], "entry 104");
    assert_eq!(entries[99]["details"], "entry 5");
}

#[tokio::test]
async fn test_financial_summary() {
    let fixture = TestFixture::new().await;

    let staff_a = fixture.create_staff("A").await;
    let staff_b = fixture.create_staff("B").await;

    fixture
        .create_booking(
            "Session One",
            "2024-02-01",
            1000.0,
            json!([{ "staffId": staff_a, "fee": 200.0, "isPaid": true }]),
        )
        .await;
    fixture
        .create_booking(
            "Session Two",
            "2024-02-08",
            500.0,
            json!([{ "staffId": staff_b, "fee": 100.0, "isPaid": false }]),
        )
        .await;

    let summary = fixture.get_json("/api/reports/summary").await;
    assert_eq!(summary["data"]["grossRevenue"], 1500.0);
    assert_eq!(summary["data"]["payrollCost"], 300.0);
    assert_eq!(summary["data"]["netProfit"], 1200.0);

    let ledger = summary["data"]["staffLedger"].as_array().unwrap();
    let entry_a = ledger
        .iter()
        .find(|e| e["staffId"] == staff_a.as_str())
        .unwrap();
    assert_eq!(entry_a["earned"], 200.0);
    assert_eq!(entry_a["paid"], 200.0);

    let entry_b = ledger
        .iter()
        .find(|e| e["staffId"] == staff_b.as_str())
        .unwrap();
    assert_eq!(entry_b["earned"], 100.0);
    assert_eq!(entry_b["paid"], 0.0);
}

#[tokio::test]
async fn test_monthly_series() {
    let fixture = TestFixture::new().await;

    let staff_id = fixture.create_staff("March Hand").await;
    fixture
        .create_booking(
            "March Session",
            "2024-03-12",
            400.0,
            json!([{ "staffId": staff_id, "fee": 150.0, "isPaid": false }]),
        )
        .await;

    let series = fixture.get_json("/api/reports/monthly?year=2024").await;
    let points = series["data"].as_array().unwrap();
    assert_eq!(points.len(), 12);

    assert_eq!(points[2]["month"], 3);
    assert_eq!(points[2]["revenue"], 400.0);
    assert_eq!(points[2]["profit"], 250.0);

    for (idx, point) in points.iter().enumerate() {
        if idx != 2 {
            assert_eq!(point["revenue"], 0.0);
            assert_eq!(point["profit"], 0.0);
        }
    }
}

#[tokio::test]
async fn test_dangling_staff_reference() {
    let fixture = TestFixture::new().await;

    let known = fixture.create_staff("Known").await;
    fixture
        .create_booking(
            "Mixed Crew",
            "2024-04-20",
            800.0,
            json!([
                { "staffId": known, "fee": 150.0, "isPaid": true },
                { "staffId": "ghost-id", "fee": 50.0, "isPaid": true }
            ]),
        )
        .await;

    // Payroll counts the dangling fee, the ledger does not
    let summary = fixture.get_json("/api/reports/summary").await;
    assert_eq!(summary["data"]["payrollCost"], 200.0);
    assert_eq!(summary["data"]["netProfit"], 600.0);
    let ledger = summary["data"]["staffLedger"].as_array().unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0]["staffId"].as_str(), Some(known.as_str()));
    assert_eq!(ledger[0]["earned"], 150.0);

    // Monthly profit subtracts both fees
    let series = fixture.get_json("/api/reports/monthly?year=2024").await;
    assert_eq!(series["data"][3]["revenue"], 800.0);
    assert_eq!(series["data"][3]["profit"], 600.0);
}

#[tokio::test]
async fn test_session_flow_and_activity_attribution() {
    let fixture = TestFixture::new().await;

    // No session yet
    let session = fixture.get_json("/api/session").await;
    assert!(session["data"].is_null());

    // Initialize the studio, sign in
    let init_resp = fixture
        .client
        .post(fixture.url("/api/staff/init"))
        .json(&json!({ "name": "Kean" }))
        .send()
        .await
        .unwrap();
    let init_body: Value = init_resp.json().await.unwrap();
    let admin_id = init_body["data"]["id"].as_str().unwrap().to_string();

    let set_resp = fixture
        .client
        .put(fixture.url("/api/session"))
        .json(&json!({ "staffId": admin_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(set_resp.status(), 200);

    let session = fixture.get_json("/api/session").await;
    assert_eq!(session["data"]["name"], "Kean");

    // Signing in was logged
    let logs = fixture.get_json("/api/logs").await;
    assert_eq!(logs["data"][0]["action"], "Login");
    assert_eq!(logs["data"][0]["userName"], "Kean");

    // Mutations are attributed to the session user
    fixture
        .create_booking("Attributed Session", "2024-10-10", 100.0, json!([]))
        .await;
    let logs = fixture.get_json("/api/logs").await;
    assert_eq!(logs["data"][0]["action"], "Added Booking");
    assert_eq!(logs["data"][0]["details"], "Created: Attributed Session");
    assert_eq!(logs["data"][0]["userId"].as_str(), Some(admin_id.as_str()));

    // Sign out
    let clear_resp = fixture
        .client
        .delete(fixture.url("/api/session"))
        .send()
        .await
        .unwrap();
    assert_eq!(clear_resp.status(), 200);

    let session = fixture.get_json("/api/session").await;
    assert!(session["data"].is_null());

    let logs = fixture.get_json("/api/logs").await;
    assert_eq!(logs["data"][0]["action"], "Logout");

    // Unknown staff id cannot become the session user
    let bad_resp = fixture
        .client
        .put(fixture.url("/api/session"))
        .json(&json!({ "staffId": "nobody" }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_resp.status(), 404);
}

#[tokio::test]
async fn test_corrupt_collection_fails_closed() {
    let fixture = TestFixture::new().await;

    fixture
        .create_booking("Doomed Session", "2024-11-11", 100.0, json!([]))
        .await;

    // Corrupt the stored blob behind the facade's back
    sqlx::query("UPDATE collections SET value = '{not json' WHERE key = 'bookings'")
        .execute(&fixture.pool)
        .await
        .unwrap();

    // Reads degrade to an empty collection instead of an error
    let bookings = fixture.get_json("/api/bookings").await;
    assert_eq!(bookings["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_revision_increments_on_writes() {
    let fixture = TestFixture::new().await;

    let initial_body = fixture.get_json("/api/snapshot/revision").await;
    let initial_revision = initial_body["data"]["revisionId"].as_i64().unwrap();

    // Create staff
    let create_resp = fixture
        .client
        .post(fixture.url("/api/staff"))
        .json(&json!({ "name": "Revision Test" }))
        .send()
        .await
        .unwrap();
    let create_body: Value = create_resp.json().await.unwrap();
    let after_create = create_body["revisionId"].as_i64().unwrap();
    assert_eq!(after_create, initial_revision + 1);

    let staff_id = create_body["data"]["id"].as_str().unwrap();

    // Update staff
    let update_resp = fixture
        .client
        .put(fixture.url(&format!("/api/staff/{}", staff_id)))
        .json(&json!({ "name": "Updated" }))
        .send()
        .await
        .unwrap();
    let update_body: Value = update_resp.json().await.unwrap();
    let after_update = update_body["revisionId"].as_i64().unwrap();
    assert_eq!(after_update, initial_revision + 2);

    // Delete staff
    let delete_resp = fixture
        .client
        .delete(fixture.url(&format!("/api/staff/{}", staff_id)))
        .send()
        .await
        .unwrap();
    let delete_body: Value = delete_resp.json().await.unwrap();
    let after_delete = delete_body["revisionId"].as_i64().unwrap();
    assert_eq!(after_delete, initial_revision + 3);
}

#[tokio::test]
async fn test_migrations_recorded() {
    let fixture = TestFixture::new().await;

    let body = fixture.get_json("/api/migrations").await;
    let records = body["data"].as_array().unwrap();
    assert!(!records.is_empty());

    let names: Vec<&str> = records
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"0001_create_collections"));
    assert!(names.contains(&"0002_create_meta"));

    for record in records {
        assert!(record["appliedAt"].is_string());
    }
}

#[tokio::test]
async fn test_not_found_errors() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/bookings/non-existent-id"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let resp2 = fixture
        .client
        .get(fixture.url("/api/staff/non-existent-id"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp2.status(), 404);
}
