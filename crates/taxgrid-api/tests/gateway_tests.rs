// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use std::io::Read;
use std::thread;
use std::time::Duration;
use taxgrid_api::HttpGateway;
use taxgrid_app::{RecordGateway, RecordId, TransportError};
use tiny_http::{Header, Method, Response, Server};

fn json_response(body: String, status: u16) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body)
        .with_status_code(status)
        .with_header(
            Header::from_bytes("Content-Type", "application/json")
                .expect("valid content type header"),
        )
}

fn start_server() -> Result<(Server, String)> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let base = format!("http://{}", server.server_addr());
    Ok((server, base))
}

#[test]
fn list_calls_decode_collections() -> Result<()> {
    let (server, base) = start_server()?;
    let records = serde_json::to_string(&taxgrid_testkit::records(3))?;
    let countries = serde_json::to_string(&taxgrid_testkit::countries())?;

    let handle = thread::spawn(move || {
        for _ in 0..2 {
            let request = server.recv().expect("request expected");
            assert_eq!(request.method(), &Method::Get);
            let body = match request.url() {
                "/taxes" => records.clone(),
                "/countries" => countries.clone(),
                other => panic!("unexpected path {other}"),
            };
            request
                .respond(json_response(body, 200))
                .expect("response should succeed");
        }
    });

    let gateway = HttpGateway::new(
        &format!("{base}/taxes"),
        &format!("{base}/countries"),
        Some(Duration::from_secs(2)),
    )?;
    let listed = gateway.list_records()?;
    assert_eq!(listed, taxgrid_testkit::records(3));
    let countries = gateway.list_reference_values()?;
    assert_eq!(countries.len(), 8);

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn non_success_status_is_a_transport_error() -> Result<()> {
    let (server, base) = start_server()?;
    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(json_response(r#"{"message":"boom"}"#.to_owned(), 500))
            .expect("response should succeed");
    });

    let gateway = HttpGateway::new(
        &format!("{base}/taxes"),
        &format!("{base}/countries"),
        Some(Duration::from_secs(2)),
    )?;
    let error = gateway.list_records().expect_err("500 should fail");
    assert_eq!(error.status(), Some(500));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn unreachable_server_is_a_network_error() -> Result<()> {
    let gateway = HttpGateway::new(
        "http://127.0.0.1:1/taxes",
        "http://127.0.0.1:1/countries",
        Some(Duration::from_millis(200)),
    )?;
    let error = gateway
        .list_reference_values()
        .expect_err("closed port should fail");
    assert!(matches!(error, TransportError::Network { .. }));
    Ok(())
}

#[test]
fn malformed_body_is_a_decode_error() -> Result<()> {
    let (server, base) = start_server()?;
    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        request
            .respond(json_response("{not json".to_owned(), 200))
            .expect("response should succeed");
    });

    let gateway = HttpGateway::new(
        &format!("{base}/taxes"),
        &format!("{base}/countries"),
        Some(Duration::from_secs(2)),
    )?;
    let error = gateway.list_records().expect_err("bad JSON should fail");
    assert!(matches!(error, TransportError::Decode { .. }));

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn update_puts_full_merged_record_to_item_url() -> Result<()> {
    let (server, base) = start_server()?;

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("request expected");
        assert_eq!(request.method(), &Method::Put);
        assert_eq!(request.url(), "/taxes/5");
        let content_type = request
            .headers()
            .iter()
            .find(|header| header.field.equiv("Content-Type"))
            .map(|header| header.value.as_str().to_owned());
        assert_eq!(content_type.as_deref(), Some("application/json"));

        let mut body = String::new();
        request
            .as_reader()
            .read_to_string(&mut body)
            .expect("body should read");
        let mut sent: serde_json::Value = serde_json::from_str(&body).expect("JSON body");
        assert_eq!(sent["name"], "New");
        assert_eq!(sent["country"], "Germany");
        assert_eq!(sent["tax"], 120);
        assert!(sent["normalizedCountry"].is_null());

        sent["updatedAt"] = serde_json::Value::from("2025-06-17T00:00:00.000Z");
        request
            .respond(json_response(sent.to_string(), 200))
            .expect("response should succeed");
    });

    let gateway = HttpGateway::new(
        &format!("{base}/taxes"),
        &format!("{base}/countries"),
        Some(Duration::from_secs(2)),
    )?;

    let mut original = taxgrid_testkit::record("5", "Old", "France");
    original
        .attributes
        .insert("tax".to_owned(), serde_json::Value::from(120));
    original
        .attributes
        .insert("normalizedCountry".to_owned(), serde_json::Value::Null);
    let edited = original.with_edits("New", "Germany");

    let saved = gateway.update_record(&RecordId::new("5"), &edited)?;
    assert_eq!(saved.name, "New");
    assert_eq!(
        saved.attributes.get("updatedAt"),
        Some(&serde_json::Value::from("2025-06-17T00:00:00.000Z"))
    );

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn fetch_record_reads_single_item() -> Result<()> {
    let (server, base) = start_server()?;
    let handle = thread::spawn(move || {
        let request = server.recv().expect("request expected");
        assert_eq!(request.url(), "/taxes/2");
        request
            .respond(json_response(
                r#"{"id":"2","name":"Test Update","country":"India"}"#.to_owned(),
                200,
            ))
            .expect("response should succeed");
    });

    let gateway = HttpGateway::new(
        &format!("{base}/taxes"),
        &format!("{base}/countries"),
        Some(Duration::from_secs(2)),
    )?;
    let record = gateway.fetch_record(&RecordId::new("2"))?;
    assert_eq!(record.name, "Test Update");

    handle.join().expect("server thread should join");
    Ok(())
}
