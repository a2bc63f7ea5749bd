//! HTTP tests for the API router over the in-memory ledger

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use axum_test::{TestResponse, TestServer};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use core_kernel::HealthCheckable;
use interface_api::{config::ApiConfig, create_router, AppState};
use test_utils::MemoryLedger;

async fn app() -> (TestServer, MemoryLedger) {
    let memory = MemoryLedger::standard().await;
    let settings = memory.ledger.settings().await.unwrap();
    let health: Vec<Arc<dyn HealthCheckable>> = vec![
        Arc::new(memory.currency_store.clone()) as Arc<dyn HealthCheckable>,
        Arc::new(memory.store.clone()) as Arc<dyn HealthCheckable>,
    ];
    let state = AppState::new(
        memory.ledger.clone(),
        memory.currencies.clone(),
        settings,
        health,
        ApiConfig::default(),
    );
    (TestServer::new(create_router(state)).unwrap(), memory)
}

fn read(response: TestResponse) -> (StatusCode, Value) {
    let text = response.text();
    let body = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap()
    };
    (response.status_code(), body)
}

async fn send(app: &TestServer, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = app.method(method, uri);
    let response = match body {
        Some(json) => request.json(&json).await,
        None => request.await,
    };
    read(response)
}

async fn get(app: &TestServer, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().unwrap(),
        other => other.to_string().parse().unwrap(),
    }
}

async fn create_vehicle(app: &TestServer) -> Value {
    let (status, vehicle) = send(app, Method::POST, "/api/v1/vehicles", Some(json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    vehicle
}

mod health {
    use super::*;

    #[tokio::test]
    async fn test_health_is_public() {
        let (app, _) = app().await;
        let (status, body) = get(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_readiness_reports_each_adapter() {
        let (app, _) = app().await;
        let (status, body) = get(&app, "/health/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
        assert_eq!(body["adapters"].as_array().unwrap().len(), 2);
    }
}

mod currencies {
    use super::*;

    #[tokio::test]
    async fn test_create_and_convert() {
        let (app, _) = app().await;
        let (status, afn) = send(
            &app,
            Method::POST,
            "/api/v1/currencies",
            Some(json!({ "code": "afn", "name": "Afghani", "exchange_rate": "0.014" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(afn["code"], "AFN");
        assert_eq!(afn["is_base"], false);

        let (status, body) = get(&app, "/api/v1/currencies/convert?amount=1000&currency=AFN").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(decimal(&body["amount_in_base"]), dec!(14));
        assert_eq!(body["base_currency"], "USD");
    }

    #[tokio::test]
    async fn test_convert_uses_rate_effective_on_date() {
        let (app, _) = app().await;
        let (_, body) =
            get(&app, "/api/v1/currencies/convert?amount=100&currency=AED&date=2024-02-01").await;
        assert_eq!(decimal(&body["amount_in_base"]), dec!(27));
    }

    #[tokio::test]
    async fn test_convert_without_currency_is_base() {
        let (app, _) = app().await;
        let (_, body) = get(&app, "/api/v1/currencies/convert?amount=250").await;
        assert_eq!(decimal(&body["amount_in_base"]), dec!(250));
        assert!(body["currency"].is_null());
    }

    #[tokio::test]
    async fn test_malformed_code_is_rejected() {
        let (app, _) = app().await;
        let (status, body) = get(&app, "/api/v1/currencies/convert?amount=1&currency=A1").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["details"][0]["field"], "currency");
    }

    #[tokio::test]
    async fn test_duplicate_code_conflicts() {
        let (app, _) = app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/currencies",
            Some(json!({ "code": "AED", "name": "Dirham again", "exchange_rate": "0.3" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "conflict");
    }

    #[tokio::test]
    async fn test_request_validation_lists_fields() {
        let (app, _) = app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/currencies",
            Some(json!({ "code": "EURO", "name": "", "exchange_rate": "1" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let fields: Vec<&str> = body["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["code", "name"]);
    }

    #[tokio::test]
    async fn test_base_currency_cannot_be_deleted() {
        let (app, _) = app().await;
        let (_, base) = get(&app, "/api/v1/currencies/base").await;
        assert_eq!(base["code"], "USD");

        let uri = format!("/api/v1/currencies/{}", base["id"].as_str().unwrap());
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_currency_used_by_a_stage_cannot_be_deleted() {
        let (app, memory) = app().await;
        let vehicle = create_vehicle(&app).await;
        let id = vehicle["id"].as_str().unwrap();
        let (status, _) = send(
            &app,
            Method::PUT,
            &format!("/api/v1/vehicles/{id}/repair-expenses"),
            Some(json!({
                "repair_cost": { "amount": "1000", "currency": "AED", "date": "2024-03-01" }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let aed = memory
            .currencies
            .list()
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.code.as_str() == "AED")
            .unwrap();
        let (status, body) =
            send(&app, Method::DELETE, &format!("/api/v1/currencies/{}", aed.id), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "conflict");

        let (_, report) = get(&app, &format!("/api/v1/vehicles/{id}/report")).await;
        assert_eq!(decimal(&report["final_cost"]), dec!(270));
    }

    #[tokio::test]
    async fn test_rate_change_is_recorded() {
        let (app, _) = app().await;
        let (_, list) = get(&app, "/api/v1/currencies").await;
        let aed = list
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["code"] == "AED")
            .unwrap()
            .clone();
        let id = aed["id"].as_str().unwrap();

        let (status, updated) = send(
            &app,
            Method::PUT,
            &format!("/api/v1/currencies/{id}"),
            Some(json!({ "exchange_rate": "0.29" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(decimal(&updated["exchange_rate"]), dec!(0.29));

        let (_, history) = get(&app, &format!("/api/v1/currencies/{id}/history")).await;
        assert_eq!(decimal(&history[0]["rate"]), dec!(0.29));
    }
}

mod vehicles {
    use super::*;

    #[tokio::test]
    async fn test_vehicle_gets_lot_number() {
        let (app, _) = app().await;
        let vehicle = create_vehicle(&app).await;
        let lot = vehicle["lot_number"].as_str().unwrap();
        assert!(!lot.is_empty());

        let (status, found) =
            get(&app, &format!("/api/v1/vehicles/lot/{}", lot.to_lowercase())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found["id"], vehicle["id"]);
    }

    #[tokio::test]
    async fn test_unknown_vehicle_is_404() {
        let (app, _) = app().await;
        let uri = format!("/api/v1/vehicles/{}", uuid::Uuid::new_v4());
        let (status, body) = get(&app, &uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_purchase_flows_into_report() {
        let (app, _) = app().await;
        let vehicle = create_vehicle(&app).await;
        let id = vehicle["id"].as_str().unwrap();

        let (status, purchase) = send(
            &app,
            Method::PUT,
            &format!("/api/v1/vehicles/{id}/purchase"),
            Some(json!({
                "purchase_price": { "amount": "1000", "currency": "USD" },
                "paid_amount": { "amount": "400", "currency": "USD" },
                "buy_date": "2024-03-01",
                "payment_date": "2024-04-01"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(decimal(&purchase["remain_purchase"]), dec!(600));

        let (status, report) = get(&app, &format!("/api/v1/vehicles/{id}/report")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["payment_status"], "partially_paid");
        assert_eq!(decimal(&report["purchase_price"]), dec!(1000));

        let (status, detail) = get(&app, &format!("/api/v1/vehicles/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["report"]["lot_number"], vehicle["lot_number"]);
        assert!(detail["images"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_stage_is_404() {
        let (app, _) = app().await;
        let vehicle = create_vehicle(&app).await;
        let id = vehicle["id"].as_str().unwrap();
        let (status, _) = get(&app, &format!("/api/v1/vehicles/{id}/shipping")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stage_for_unknown_vehicle_is_404() {
        let (app, _) = app().await;
        let uri = format!("/api/v1/vehicles/{}/repair-expenses", uuid::Uuid::new_v4());
        let (status, _) = send(&app, Method::PUT, &uri, Some(json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_vehicle() {
        let (app, memory) = app().await;
        let vehicle = create_vehicle(&app).await;
        let uri = format!("/api/v1/vehicles/{}", vehicle["id"].as_str().unwrap());
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(memory.ledger.list_vehicles().await.unwrap().is_empty());
    }
}

mod sales {
    use super::*;

    #[tokio::test]
    async fn test_sold_without_details_is_422() {
        let (app, _) = app().await;
        let vehicle = create_vehicle(&app).await;
        let uri = format!("/api/v1/vehicles/{}/sale", vehicle["id"].as_str().unwrap());

        let (status, body) = send(&app, Method::PUT, &uri, Some(json!({ "status": "sold" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let fields: Vec<&str> = body["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["field"].as_str().unwrap())
            .collect();
        assert!(fields.contains(&"sale_price"));
        assert!(fields.contains(&"sale_date"));
        assert!(fields.contains(&"buyer_id"));
    }

    #[tokio::test]
    async fn test_unsold_vehicle_priced_in_base() {
        let (app, _) = app().await;
        let vehicle = create_vehicle(&app).await;
        let uri = format!("/api/v1/vehicles/{}/sale", vehicle["id"].as_str().unwrap());

        let (status, sale) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({ "status": "in_transit", "sale_price": { "amount": "9999", "currency": "AED" } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sale["sale_price"]["currency"], "USD");
        assert_eq!(decimal(&sale["sale_price"]["amount"]), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_sale_to_buyer_counts_on_dashboard() {
        let (app, _) = app().await;
        let vehicle = create_vehicle(&app).await;
        let (status, buyer) = send(
            &app,
            Method::POST,
            "/api/v1/buyers",
            Some(json!({ "name": "Ahmad Karimi", "national_id": "1402-55" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let uri = format!("/api/v1/vehicles/{}/sale", vehicle["id"].as_str().unwrap());
        let (status, sale) = send(
            &app,
            Method::PUT,
            &uri,
            Some(json!({
                "status": "sold",
                "buyer_id": buyer["id"],
                "sale_price": { "amount": "5000", "currency": "USD" },
                "sale_date": "2024-08-01"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sale["status"], "sold");

        let (_, dashboard) = get(&app, "/api/v1/dashboard").await;
        assert_eq!(dashboard["vehicle_count"], 1);
        assert_eq!(dashboard["sold_count"], 1);
        assert_eq!(decimal(&dashboard["total_sales"]), dec!(5000));
    }
}

mod catalog {
    use super::*;

    #[tokio::test]
    async fn test_buyer_search_is_case_insensitive() {
        let (app, _) = app().await;
        for name in ["Ahmad Karimi", "Zahra Noori"] {
            send(&app, Method::POST, "/api/v1/buyers", Some(json!({ "name": name }))).await;
        }
        let (status, found) = get(&app, "/api/v1/buyers?name=karim").await;
        assert_eq!(status, StatusCode::OK);
        let found = found.as_array().unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["name"], "Ahmad Karimi");
    }

    #[tokio::test]
    async fn test_car_type_belongs_to_mark() {
        let (app, _) = app().await;
        let (status, mark) = send(
            &app,
            Method::POST,
            "/api/v1/references/mark",
            Some(json!({ "name": "Toyota" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, car_type) = send(
            &app,
            Method::POST,
            "/api/v1/references/car_type",
            Some(json!({ "name": "Corolla", "parent_id": mark["id"] })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(car_type["parent_id"], mark["id"]);

        let (_, types) = get(&app, "/api/v1/references/car_type").await;
        assert_eq!(types.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reference_under_wrong_kind_is_404() {
        let (app, _) = app().await;
        let (_, color) = send(
            &app,
            Method::POST,
            "/api/v1/references/color",
            Some(json!({ "name": "White" })),
        )
        .await;
        let uri = format!("/api/v1/references/mark/{}", color["id"].as_str().unwrap());
        let (status, _) = get(&app, &uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

mod images {
    use super::*;
    use axum_test::multipart::{MultipartForm, Part};

    async fn upload(app: &TestServer, vehicle_id: &str, form: MultipartForm) -> (StatusCode, Value) {
        let uri = format!("/api/v1/vehicles/{vehicle_id}/images");
        read(app.post(&uri).multipart(form).await)
    }

    #[tokio::test]
    async fn test_upload_list_and_delete() {
        let (app, memory) = app().await;
        let vehicle = create_vehicle(&app).await;
        let id = vehicle["id"].as_str().unwrap();

        let form = MultipartForm::new().add_text("description", "front view").add_part(
            "file",
            Part::bytes(b"\xff\xd8\xff\xe0jpeg".to_vec())
                .file_name("front.jpg")
                .mime_type("image/jpeg"),
        );
        let (status, image) = upload(&app, id, form).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(image["description"], "front view");
        assert_eq!(memory.images.len().await, 1);

        let (_, listed) = get(&app, &format!("/api/v1/vehicles/{id}/images")).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let uri = format!("/api/v1/images/{}", image["id"].as_str().unwrap());
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(memory.images.len().await, 0);
    }

    #[tokio::test]
    async fn test_upload_without_file_is_422() {
        let (app, _) = app().await;
        let vehicle = create_vehicle(&app).await;
        let form = MultipartForm::new().add_text("description", "no file");
        let (status, body) = upload(&app, vehicle["id"].as_str().unwrap(), form).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["details"][0]["field"], "file");
    }
}

mod settings {
    use super::*;

    #[tokio::test]
    async fn test_defaults_then_update() {
        let (app, _) = app().await;
        let (status, settings) = get(&app, "/api/v1/settings").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(settings["site_name"], "Vehicle Ledger");

        let (status, updated) = send(
            &app,
            Method::PUT,
            "/api/v1/settings",
            Some(json!({ "site_name": "Herat Motors", "email": "desk@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["site_name"], "Herat Motors");

        let (_, settings) = get(&app, "/api/v1/settings").await;
        assert_eq!(settings["site_name"], "Herat Motors");
    }

    #[tokio::test]
    async fn test_bad_email_is_422() {
        let (app, _) = app().await;
        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/v1/settings",
            Some(json!({ "email": "not-an-email" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_reload_picks_up_stored_changes() {
        let (app, memory) = app().await;
        memory
            .ledger
            .update_settings(domain_vehicle::SettingsUpdate {
                site_name: Some("Kabul Auto".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let (_, cached) = get(&app, "/api/v1/settings").await;
        assert_eq!(cached["site_name"], "Vehicle Ledger");

        let (status, reloaded) = send(&app, Method::POST, "/api/v1/settings/reload", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reloaded["site_name"], "Kabul Auto");
    }
}
