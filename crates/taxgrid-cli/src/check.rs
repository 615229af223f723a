// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::fmt;
use taxgrid_api::HttpGateway;
use taxgrid_app::RecordGateway;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub records_url: String,
    pub records: usize,
    pub countries: usize,
    pub sampled: Option<String>,
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ok: {} records, {} countries from {}",
            self.records, self.countries, self.records_url
        )?;
        if let Some(id) = &self.sampled {
            write!(f, "; record {id} readable")?;
        }
        Ok(())
    }
}

/// Hit both collections and read back the first record by id.
pub fn probe(gateway: &HttpGateway) -> Result<CheckReport> {
    let countries = gateway
        .list_reference_values()
        .with_context(|| format!("probe {}", gateway.countries_url()))?;
    let records = gateway
        .list_records()
        .with_context(|| format!("probe {}", gateway.records_url()))?;

    let sampled = match records.first() {
        Some(first) => {
            let record = gateway
                .fetch_record(&first.id)
                .with_context(|| format!("read record {} back", first.id))?;
            Some(record.id.to_string())
        }
        None => None,
    };

    tracing::info!(
        records = records.len(),
        countries = countries.len(),
        "api check passed"
    );
    Ok(CheckReport {
        records_url: gateway.records_url().to_owned(),
        records: records.len(),
        countries: countries.len(),
        sampled,
    })
}

#[cfg(test)]
mod tests {
    use super::probe;
    use anyhow::{Result, anyhow};
    use std::thread;
    use std::time::Duration;
    use taxgrid_api::HttpGateway;
    use tiny_http::{Header, Response, Server};

    type Canned = (&'static str, u16, String);

    fn serve(responses: Vec<Canned>) -> Result<(String, thread::JoinHandle<()>)> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let base = format!("http://{}", server.server_addr());
        let handle = thread::spawn(move || {
            for (path, status, body) in responses {
                let request = server.recv().expect("request expected");
                assert_eq!(request.url(), path);
                let response = Response::from_string(body)
                    .with_status_code(status)
                    .with_header(
                        Header::from_bytes("Content-Type", "application/json")
                            .expect("valid header"),
                    );
                request.respond(response).expect("response should succeed");
            }
        });
        Ok((base, handle))
    }

    #[test]
    fn probe_reports_counts_and_sampled_record() -> Result<()> {
        let records = taxgrid_testkit::records(2);
        let first = serde_json::to_string(&records[0])?;
        let (base, handle) = serve(vec![
            (
                "/countries",
                200,
                serde_json::to_string(&taxgrid_testkit::countries())?,
            ),
            ("/taxes", 200, serde_json::to_string(&records)?),
            ("/taxes/1", 200, first),
        ])?;

        let gateway = HttpGateway::new(
            &format!("{base}/taxes"),
            &format!("{base}/countries"),
            Some(Duration::from_secs(2)),
        )?;
        let report = probe(&gateway)?;
        assert_eq!(report.records, 2);
        assert_eq!(report.countries, 8);
        assert_eq!(report.sampled.as_deref(), Some("1"));
        assert!(report.to_string().starts_with("ok: 2 records, 8 countries"));

        handle.join().expect("server thread should join");
        Ok(())
    }

    #[test]
    fn probe_names_the_failing_endpoint() -> Result<()> {
        let (base, handle) = serve(vec![("/countries", 503, "{}".to_owned())])?;
        let gateway = HttpGateway::new(
            &format!("{base}/taxes"),
            &format!("{base}/countries"),
            Some(Duration::from_secs(2)),
        )?;

        let error = probe(&gateway).expect_err("503 should fail the check");
        let message = format!("{error:#}");
        assert!(message.contains("/countries"), "unexpected: {message}");
        assert!(message.contains("503"), "unexpected: {message}");

        handle.join().expect("server thread should join");
        Ok(())
    }
}
