//! One explicit fetch → normalize run and the table it produced.
//!
//! There is no process-wide cache: whoever calls [`Session::load`] owns the
//! resulting table and replaces it by loading again.

use crate::api::{Client, Transport};
use crate::error::FetchError;
use crate::models::RawRecord;
use crate::normalize::normalize;
use crate::table::Table;

/// Receives the single user-facing diagnostic of a failed load.
pub trait Notifier {
    fn notify_error(&mut self, message: &str);
}

/// Collects messages in memory; handy for surfaces that render later.
#[derive(Debug, Default, Clone)]
pub struct CollectingNotifier {
    pub messages: Vec<String>,
}

impl Notifier for CollectingNotifier {
    fn notify_error(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    table: Table,
    error: Option<FetchError>,
}

impl Session {
    /// Fetch and normalize. Failures end up as an empty table plus exactly one notification.
    pub fn load<T: Transport>(client: &Client<T>, notifier: &mut dyn Notifier) -> Session {
        let outcome = client.fetch_or_empty();
        if let Some(err) = &outcome.error {
            log::error!("loading countries failed: {err}");
            notifier.notify_error(&err.user_message());
        }
        Session {
            table: normalize(&outcome.records),
            error: outcome.error,
        }
    }

    pub fn from_records(records: &[RawRecord]) -> Session {
        Session {
            table: normalize(records),
            error: None,
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
