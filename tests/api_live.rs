//! Live source tests. Run with: `cargo test --features online -- --nocapture`
#![cfg(feature = "online")]

use rcx_rs::session::{CollectingNotifier, Session};
use rcx_rs::{Client, FetchConfig, Field, SortOrder};

#[test]
fn mirror_has_chile() {
    let client = Client::new(FetchConfig::mirror()).unwrap();
    let mut notes = CollectingNotifier::default();
    let session = Session::load(&client, &mut notes);
    assert!(notes.messages.is_empty(), "{:?}", notes.messages);
    let chile = session
        .table()
        .iter()
        .find(|r| r.common_name.as_deref() == Some("Chile"))
        .expect("Chile in dataset");
    assert!(chile.population > 10_000_000);
    assert_eq!(chile.border_count, 3);
}

#[test]
fn live_api_returns_rows() {
    let client = Client::new(FetchConfig::live()).unwrap();
    let records = client.fetch().unwrap();
    assert!(records.len() > 200);
    let table = rcx_rs::normalize::normalize(&records)
        .sorted_by(Field::Population, SortOrder::Descending);
    assert!(table.rows()[0].population > 1_000_000_000);
}
