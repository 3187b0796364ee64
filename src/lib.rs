//! Streaming per-station averages over HTTP.
//!
//! Clients `POST` a (possibly compressed) JSON array of measurements to
//! `/temperatures`:
//!
//! ```json
//! [{"station": "Oslo", "temperature": -3.2}, {"station": "Lima", "temperature": 18.9}]
//! ```
//!
//! and get back the mean temperature of every station, sorted by station name,
//! each mean formatted with five fractional digits:
//!
//! ```json
//! {"racerId": "...", "averages": [{"station": "Lima", "temperature": "18.90000"}, ...]}
//! ```
//!
//! The body is never buffered as a whole. Records are pulled off the stream
//! one by one and folded into a running mean per station, so memory grows with
//! the number of stations, not with the number of records.
//!
//! Means are computed in 64-bit floats by default, or in 32-bit floats when
//! configured with `RACER_PRECISION=32`. The width is fixed per aggregation
//! and also used for the final formatting.
//!
//! The engine can be used without the server:
//!
//! ```
//! use brc_racer::{Driver, MeanTable};
//!
//! let mut table = MeanTable::<f32>::new();
//! table.fold("Oslo", -3.0);
//! table.fold("Oslo", -5.0);
//! assert_eq!(Some(-4.0), table.get("Oslo").map(|avg| avg.mean()));
//!
//! let input = r#"[{"station": "Oslo", "temperature": -3.0}]"#;
//! let report = Driver::new("my-racer").run::<f32, _>(input.as_bytes())?;
//! assert_eq!("-3.00000", report.averages[0].temperature);
//! #
//! # Ok::<(), brc_racer::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all, missing_docs)]
#![deny(clippy::unwrap_used)]
#![warn(clippy::indexing_slicing)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]
#![warn(clippy::multiple_crate_versions)]
#![warn(clippy::result_unit_err)]

mod agg;
mod body;
mod config;
mod driver;
mod error;
pub mod notify;
mod reader;
mod registry;
mod report;
mod server;
mod value;

type HashMap<K, V> = std::collections::HashMap<K, V, rustc_hash::FxBuildHasher>;

pub use agg::{avg::RunningAverage, table::MeanTable};
pub use body::ChannelReader;
pub use config::{Builder as ConfigBuilder, Config, DEFAULT_PORT, DEFAULT_RACER_ID};
pub use driver::{Driver, DEFAULT_PROGRESS_INTERVAL};
pub use error::{Error, Result};
pub use reader::ArrayReader;
pub use registry::RaceRegistry;
pub use report::{Average, Measurement, Report};
pub use server::{router, serve, AppState, RaceMessage};
pub use value::{Precision, Value, FRACTION_DIGITS};
