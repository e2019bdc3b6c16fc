//! Exercises the reqwest transport against a throwaway local HTTP server.

use rcx_rs::{Client, FailureKind, FetchConfig, FetchError};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

/// Serve one raw HTTP reply per incoming connection, closing it afterwards.
fn serve_raw(replies: Vec<String>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        for reply in replies {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).is_ok() {
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                line.clear();
            }
            let _ = stream.write_all(reply.as_bytes());
        }
    });
    format!("http://{addr}/all")
}

/// Serve one canned `(status, body)` per incoming connection, then stop.
fn serve(replies: Vec<(u16, &'static str)>) -> String {
    serve_raw(
        replies
            .into_iter()
            .map(|(status, body)| head(status, body.len(), body))
            .collect(),
    )
}

fn head(status: u16, content_length: usize, body: &str) -> String {
    format!(
        "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\n\
         Content-Length: {content_length}\r\nConnection: close\r\n\r\n{body}"
    )
}

/// Announces a long body but hangs up after a few bytes.
fn cut_short() -> String {
    head(200, 1000, r#"[{"name":{"#)
}

const ONE_COUNTRY: &str = r#"[{"name":{"common":"Chile"},"borders":["ARG","BOL","PER"]}]"#;

fn config(url: &str, retries: u32) -> FetchConfig {
    FetchConfig::default()
        .with_url(url)
        .with_max_retries(retries)
        .with_backoff_factor(0.01)
        .with_timeout(Duration::from_secs(5))
}

#[test]
fn recovers_after_service_unavailable() {
    let url = serve(vec![
        (503, ""),
        (503, ""),
        (503, ""),
        (200, ONE_COUNTRY),
    ]);
    let client = Client::new(config(&url, 5)).unwrap();
    let records = client.fetch().unwrap();
    assert_eq!(records.len(), 1);
}

#[test]
fn recovers_after_interrupted_transfer() {
    let url = serve_raw(vec![cut_short(), head(200, ONE_COUNTRY.len(), ONE_COUNTRY)]);
    let client = Client::new(config(&url, 2)).unwrap();
    let outcome = client.fetch_or_empty();
    assert_eq!(outcome.error, None);
    assert_eq!(outcome.records.len(), 1);
}

#[test]
fn interrupted_transfer_without_retries_is_a_network_failure() {
    let url = serve_raw(vec![cut_short()]);
    let client = Client::new(config(&url, 0)).unwrap();
    let outcome = client.fetch_or_empty();
    assert!(outcome.records.is_empty());
    let err = outcome.error.unwrap();
    assert!(matches!(err, FetchError::Connection(_)), "{err:?}");
    assert_eq!(err.kind(), FailureKind::NetworkFailure);
}

#[test]
fn not_found_fails_without_retry() {
    let url = serve(vec![(404, "")]);
    let client = Client::new(config(&url, 5)).unwrap();
    assert_eq!(
        client.fetch().unwrap_err(),
        FetchError::HttpStatus {
            status: 404,
            attempts: 1
        }
    );
}

#[test]
fn refused_connection_is_a_network_failure() {
    // Grab a free port, then release it so nothing is listening there.
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let client = Client::new(config(&format!("http://127.0.0.1:{port}/all"), 1)).unwrap();
    let outcome = client.fetch_or_empty();
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.error.unwrap().kind(), FailureKind::NetworkFailure);
}
