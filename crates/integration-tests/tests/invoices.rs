//! Invoice aggregation and numbering, over real HTTP.

#![allow(clippy::unwrap_used)]

use std::str::FromStr;

use ledgerline_integration_tests::{TestServer, id_of};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::{Value, json};

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        other => Decimal::from_str(&other.to_string()).unwrap(),
    }
}

#[tokio::test]
async fn test_invoice_totals_follow_billables() {
    let server = TestServer::logged_in().await;
    let client = server.client("Acme").await;
    let project = server.project(&client, "Website").await;
    let first = server.billable(&client, &project, "3.5").await;
    let second = server.billable(&client, &project, "4.25").await;

    let invoice = server
        .create(
            "/api/invoices",
            json!({"billables": [first, second], "hourlyRate": "80"}),
        )
        .await;
    assert_eq!(invoice["client"], client.as_str());
    assert_eq!(decimal(&invoice["totalHours"]), Decimal::new(775, 2));
    assert_eq!(decimal(&invoice["amount"]), Decimal::new(620, 0));

    let id = id_of(&invoice);
    let response = server
        .patch(&format!("/api/invoice/{id}"), json!({"hourlyRate": "100"}))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(decimal(&updated["amount"]), Decimal::new(775, 0));

    let response = server
        .patch(&format!("/api/invoice/{id}"), json!({"billables": [first]}))
        .await;
    let updated: Value = response.json().await.unwrap();
    assert_eq!(decimal(&updated["totalHours"]), Decimal::new(35, 1));
    assert_eq!(
        decimal(&updated["amount"]),
        decimal(&updated["totalHours"]) * decimal(&updated["hourlyRate"])
    );

    let response = server
        .patch(&format!("/api/invoice/{id}"), json!({"status": "sent"}))
        .await;
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["status"], "sent");
    assert_eq!(decimal(&updated["amount"]), Decimal::new(350, 0));
}

#[tokio::test]
async fn test_mixed_clients_rejected() {
    let server = TestServer::logged_in().await;
    let acme = server.client("Acme").await;
    let globex = server.client("Globex").await;
    let acme_site = server.project(&acme, "Website").await;
    let globex_site = server.project(&globex, "Website").await;
    let a = server.billable(&acme, &acme_site, "2").await;
    let g = server.billable(&globex, &globex_site, "2").await;

    let response = server
        .post(
            "/api/invoices",
            json!({"billables": [a, g], "hourlyRate": "50"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("same client")
    );

    let invoices: Value = server.get("/api/invoices").await.json().await.unwrap();
    assert!(invoices.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invoice_numbers_increase() {
    let server = TestServer::logged_in().await;
    let client = server.client("Acme").await;
    let project = server.project(&client, "Website").await;

    let mut numbers = Vec::new();
    for _ in 0..3 {
        let billable = server.billable(&client, &project, "1").await;
        let invoice = server
            .create(
                "/api/invoices",
                json!({"billables": [billable], "hourlyRate": "10"}),
            )
            .await;
        numbers.push(invoice["invoiceNumber"].as_str().unwrap().to_string());
    }

    let prefix = numbers[0].rsplit_once('-').unwrap().0.to_string();
    assert!(prefix.starts_with("INV-"));
    let sequences: Vec<u32> = numbers
        .iter()
        .map(|n| {
            let (p, seq) = n.rsplit_once('-').unwrap();
            assert_eq!(p, prefix);
            assert_eq!(seq.len(), 4);
            seq.parse().unwrap()
        })
        .collect();
    assert_eq!(sequences, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_unknown_billable_rejected() {
    let server = TestServer::logged_in().await;
    let response = server
        .post(
            "/api/invoices",
            json!({
                "billables": ["00000000-0000-4000-8000-000000000000"],
                "hourlyRate": "50",
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_timer_produces_billable_hours() {
    let server = TestServer::logged_in().await;
    let client = server.client("Acme").await;
    let project = server.project(&client, "Website").await;

    let session = server
        .create(
            "/api/timer/start",
            json!({"client": client, "project": project, "description": "Pairing"}),
        )
        .await;
    let running: Value = server.get("/api/timer").await.json().await.unwrap();
    assert_eq!(running.as_array().unwrap().len(), 1);

    let billable = server
        .create(&format!("/api/timer/{}/stop", id_of(&session)), json!({}))
        .await;
    assert_eq!(billable["client"], client.as_str());
    assert!(decimal(&billable["totalHours"]) >= Decimal::ZERO);

    let running: Value = server.get("/api/timer").await.json().await.unwrap();
    assert!(running.as_array().unwrap().is_empty());

    let response = server
        .get(&format!("/api/billable/{}", id_of(&billable)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}
