//! rcx_rs
//!
//! A lightweight Rust library for retrieving, normalizing, exploring, charting,
//! and exporting country records from the REST Countries dataset. Pairs with
//! the `rcx` CLI and the `rcx-gui` desktop app.
//!
//! ### Features
//! - Fetch the dataset from the live API or a static mirror, with bounded retries
//! - Normalize loosely shaped JSON into fixed-shape rows with explicit defaults
//! - Sort, filter by population, and summarize any column
//! - Generate PNG/SVG scatter, line, bar, and pie charts
//! - Save tables as CSV or JSON
//!
//! ### Example
//! ```no_run
//! use rcx_rs::{Client, FetchConfig, Field, SortOrder};
//! use rcx_rs::session::{CollectingNotifier, Session};
//!
//! let client = Client::new(FetchConfig::mirror())?;
//! let mut notes = CollectingNotifier::default();
//! let session = Session::load(&client, &mut notes);
//! let big = session
//!     .table()
//!     .filter_population(10_000_000, i64::MAX)
//!     .sorted_by(Field::Population, SortOrder::Descending);
//! rcx_rs::storage::save_csv(&big, rcx_rs::storage::FILTERED_CSV_FILENAME)?;
//! let spec = rcx_rs::viz::ChartSpec::new(
//!     Field::Area,
//!     Field::Population,
//!     rcx_rs::viz::ChartKind::Scatter,
//! );
//! rcx_rs::viz::render_chart(&big, &spec, "chart.png", 1000, 600)?;
//! println!("{:#?}", rcx_rs::stats::summarize(&big, Field::Population));
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod session;
pub mod stats;
pub mod storage;
pub mod table;
pub mod viz;

pub use api::Client;
pub use config::{FetchConfig, Source};
pub use error::{FailureKind, FetchError};
pub use models::{Cell, Field, RawRecord, Row};
pub use table::{SortOrder, Table};
