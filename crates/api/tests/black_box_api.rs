use reqwest::StatusCode;
use serde_json::{Value, json};

const PLANT_ID: &str = "0190a4f0-0000-7000-8000-000000000101";
const HOUSE_ID: &str = "0190a4f0-0000-7000-8000-000000000102";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let seed = json!([
            {
                "id": PLANT_ID,
                "system_name": "Planta Quilicura",
                "system_type": "commercial",
                "client": { "name": "Logística Norte" },
                "installer": { "name": "Sol Andino", "company": "Sol Andino SpA" },
                "location": { "address": "Av. Industrial 300", "commune": "Quilicura", "region": "RM" },
                "components": { "panels": { "quantity": 10 }, "inverters": { "quantity": 2 } },
                "status": "active",
                "created_at": "2024-01-15T09:00:00Z"
            },
            {
                "id": HOUSE_ID,
                "system_name": "Casa Peñalolén",
                "system_type": "residential",
                "client": { "name": "Pedro Rojas" },
                "installer": { "name": "Sol Andino" },
                "location": { "address": "Las Perdices 10", "commune": "Peñalolén", "region": "RM" },
                "components": { "panels": { "quantity": 6 } },
                "status": "pending_engraving",
                "created_at": "2024-02-20T15:30:00Z"
            }
        ]);

        let path = std::env::temp_dir().join(format!("pvtrack-api-seed-{}.json", uuid::Uuid::now_v7()));
        std::fs::write(&path, seed.to_string()).expect("failed to write seed file");

        let services = pvtrack_api::app::services::build_services(Some(&path)).expect("seed load failed");
        std::fs::remove_file(&path).ok();

        // Same router as prod, bound to an ephemeral port.
        let app = pvtrack_api::app::build_app(services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn post_status(client: &reqwest::Client, server: &TestServer, id: &str, body: Value) -> (StatusCode, Value) {
    let res = client
        .post(server.url(&format!("/installations/{id}/status")))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = res.status();
    (status, res.json().await.unwrap())
}

#[tokio::test]
async fn health_and_listing() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));

    let all: Value = client
        .get(server.url("/installations"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all["count"], 2);
    assert_eq!(all["installations"][0]["system_name"], "Planta Quilicura");

    let pending: Value = client
        .get(server.url("/installations?status=pending_engraving"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(pending["count"], 1);
    assert_eq!(pending["installations"][0]["id"], HOUSE_ID);

    let res = client
        .get(server.url("/installations?status=relocating"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_unknown_or_malformed_id() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/installations/not-a-uuid")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");

    let res = client
        .get(server.url("/installations/0190a4f0-0000-7000-8000-0000000000ff"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn theft_then_recovery_over_http() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Two codes for a quantity of three: rejected, nothing changes.
    let (status, body) = post_status(
        &client,
        &server,
        PLANT_ID,
        json!({
            "choice": "stolen",
            "payload": {
                "mode": "partial",
                "lines": [{ "type_key": "panels", "quantity": 3, "codes": "PV-1,PV-2" }]
            }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["kind"], "code_count_mismatch");

    let (status, body) = post_status(
        &client,
        &server,
        PLANT_ID,
        json!({
            "choice": "stolen",
            "payload": {
                "mode": "partial",
                "note": "cerco cortado",
                "lines": [{ "type_key": "panels", "quantity": "3", "codes": "PV-1,PV-2\nPV-3" }]
            },
            "expected_version": 0
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "stolen_components");
    assert_eq!(body["components"]["panels"]["quantity"], 7);
    assert_eq!(body["theft_outstanding"]["panels"], json!(["PV-1", "PV-2", "PV-3"]));
    assert_eq!(body["version"], 1);

    // Stale version.
    let (status, body) = post_status(
        &client,
        &server,
        PLANT_ID,
        json!({ "choice": "active", "payload": {}, "expected_version": 0 }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    // Partial selection.
    let (status, body) = post_status(
        &client,
        &server,
        PLANT_ID,
        json!({
            "choice": "active",
            "payload": { "recovered_selection": { "panels": ["PV-1", "PV-2"] } }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "incomplete_recovery");

    let (status, body) = post_status(
        &client,
        &server,
        PLANT_ID,
        json!({
            "choice": "active",
            "payload": { "recovered_selection": { "panels": ["PV-1", "PV-2", "PV-3"] } },
            "expected_version": 1
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");
    assert_eq!(body["components"]["panels"]["quantity"], 10);
    assert!(body.get("theft_outstanding").is_none());
    assert!(body["recovered_at"].is_string());
}

#[tokio::test]
async fn dismantle_and_relocate_over_http() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = post_status(
        &client,
        &server,
        HOUSE_ID,
        json!({
            "choice": "dismantled",
            "payload": {
                "destination": "reuse",
                "lines": [{ "type_key": "panels", "quantity": 1, "codes": "CP-1" }]
            }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "ownership_required");

    let (status, body) = post_status(
        &client,
        &server,
        HOUSE_ID,
        json!({
            "choice": "relocating",
            "payload": { "address": "Nueva 1", "commune": "La Reina", "region": "RM", "lat": "95", "lng": "-70.5" }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "invalid_coordinates");

    let (status, body) = post_status(
        &client,
        &server,
        HOUSE_ID,
        json!({
            "choice": "relocating",
            "payload": { "address": "Nueva 1", "commune": "La Reina", "region": "RM", "lat": -33.44, "lng": "-70.53" }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");
    assert_eq!(body["location"]["commune"], "La Reina");
    assert_eq!(body["location"]["coordinates"]["lat"], -33.44);

    let (status, body) = post_status(
        &client,
        &server,
        HOUSE_ID,
        json!({
            "choice": "dismantled",
            "payload": { "destination": "for_sale", "selected_types": { "panels": true } }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "inactive");
    assert_eq!(body["decommission"]["destination"], "for_sale");
    assert_eq!(body["decommission"]["listed_types"], json!(["panels"]));
    assert_eq!(body["components"]["panels"]["quantity"], 6);
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let (status, body) = post_status(
        &client,
        &server,
        PLANT_ID,
        json!({ "choice": "teleported", "payload": {} }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_body");
}
