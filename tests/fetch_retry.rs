use rcx_rs::api::{HttpResponse, Transport, decode_records};
use rcx_rs::session::{CollectingNotifier, Session};
use rcx_rs::{Client, FailureKind, FetchConfig, FetchError};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Replays canned responses and counts requests.
struct Scripted {
    replies: Mutex<VecDeque<Result<HttpResponse, FetchError>>>,
    calls: Mutex<u32>,
}

impl Scripted {
    fn new(replies: Vec<Result<HttpResponse, FetchError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

impl Transport for Scripted {
    fn get(&self, _url: &str) -> Result<HttpResponse, FetchError> {
        *self.calls.lock().unwrap() += 1;
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Connection("script exhausted".into())))
    }
}

fn status(code: u16) -> Result<HttpResponse, FetchError> {
    Ok(HttpResponse {
        status: code,
        body: Vec::new(),
    })
}

fn ok(body: &str) -> Result<HttpResponse, FetchError> {
    Ok(HttpResponse {
        status: 200,
        body: body.as_bytes().to_vec(),
    })
}

const TWO_COUNTRIES: &str =
    r#"[{"name":{"common":"Chile"},"population":19116209},{"name":{"common":"Peru"}}]"#;

fn client(retries: u32, replies: Vec<Result<HttpResponse, FetchError>>) -> Client<Scripted> {
    let config = FetchConfig::default()
        .with_url("http://stub.invalid/all")
        .with_max_retries(retries)
        .with_backoff_factor(0.0);
    Client::with_transport(config, Scripted::new(replies))
}

#[test]
fn transient_statuses_are_retried_until_success() {
    let c = client(5, vec![status(503), status(503), status(503), ok(TWO_COUNTRIES)]);
    let records = c.fetch().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(c.transport().calls(), 4);
}

#[test]
fn client_errors_are_not_retried() {
    let c = client(5, vec![status(404), ok(TWO_COUNTRIES)]);
    let err = c.fetch().unwrap_err();
    assert_eq!(
        err,
        FetchError::HttpStatus {
            status: 404,
            attempts: 1
        }
    );
    assert_eq!(err.kind(), FailureKind::HttpStatusFailure);
    assert_eq!(c.transport().calls(), 1);
}

#[test]
fn retries_are_bounded() {
    let c = client(2, vec![status(502), status(502), status(502), ok(TWO_COUNTRIES)]);
    let err = c.fetch().unwrap_err();
    assert_eq!(
        err,
        FetchError::HttpStatus {
            status: 502,
            attempts: 3
        }
    );
    assert_eq!(c.transport().calls(), 3);
}

#[test]
fn connection_failures_are_retried() {
    let c = client(
        3,
        vec![
            Err(FetchError::Connection("refused".into())),
            Err(FetchError::Timeout {
                after: Duration::from_secs(10),
            }),
            ok(TWO_COUNTRIES),
        ],
    );
    assert_eq!(c.fetch().unwrap().len(), 2);
    assert_eq!(c.transport().calls(), 3);
}

#[test]
fn unreachable_source_yields_empty_outcome() {
    let c = client(0, vec![Err(FetchError::Connection("refused".into()))]);
    let outcome = c.fetch_or_empty();
    assert!(outcome.records.is_empty());
    let err = outcome.error.unwrap();
    assert_eq!(err.kind(), FailureKind::NetworkFailure);
    assert_eq!(c.transport().calls(), 1);
}

#[test]
fn empty_array_is_an_empty_result() {
    let c = client(3, vec![ok("[]")]);
    let err = c.fetch().unwrap_err();
    assert_eq!(err, FetchError::EmptyResult);
    assert_eq!(err.kind(), FailureKind::EmptyResultFailure);
    assert_eq!(c.transport().calls(), 1);
}

#[test]
fn non_array_body_is_a_decode_failure() {
    let c = client(3, vec![ok(r#"{"status":404,"message":"Not Found"}"#)]);
    let err = c.fetch().unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)));
    assert_eq!(err.kind(), FailureKind::NetworkFailure);
}

#[test]
fn non_object_elements_are_skipped() {
    let records = decode_records(br#"[{"region":"Europe"}, 3, "x", null, {}]"#).unwrap();
    assert_eq!(records.len(), 2);
    assert!(decode_records(b"not json").is_err());
}

#[test]
fn session_notifies_exactly_once_on_failure() {
    let c = client(2, vec![status(500), status(500), status(500)]);
    let mut notes = CollectingNotifier::default();
    let session = Session::load(&c, &mut notes);
    assert!(session.is_empty());
    assert_eq!(notes.messages.len(), 1);
    assert_eq!(
        session.error().map(FetchError::kind),
        Some(FailureKind::HttpStatusFailure)
    );
}

#[test]
fn session_loads_and_normalizes() {
    let c = client(0, vec![ok(TWO_COUNTRIES)]);
    let mut notes = CollectingNotifier::default();
    let session = Session::load(&c, &mut notes);
    assert!(notes.messages.is_empty());
    assert!(session.error().is_none());
    assert_eq!(session.table().len(), 2);
    assert_eq!(session.table().rows()[0].population, 19_116_209);
    assert_eq!(session.table().rows()[1].population, 0);
}

#[test]
fn out_of_range_backoff_factor_does_not_abort_the_fetch() {
    for factor in [-3.0, f64::NAN, f64::NEG_INFINITY] {
        let mut config = FetchConfig::default()
            .with_url("http://stub.invalid/all")
            .with_max_retries(1);
        config.backoff_factor = factor;
        let c = Client::with_transport(config, Scripted::new(vec![status(503), ok(TWO_COUNTRIES)]));
        let outcome = c.fetch_or_empty();
        assert!(outcome.error.is_none(), "factor {factor}");
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(c.transport().calls(), 2);
    }
}

#[test]
fn huge_backoff_factor_is_capped() {
    let config = FetchConfig::default().with_backoff_factor(1e300);
    assert_eq!(
        config.backoff_for(3),
        Duration::from_secs(rcx_rs::config::MAX_BACKOFF_SECS)
    );
}
