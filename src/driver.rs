use crate::{
    agg::table::MeanTable,
    reader::ArrayReader,
    report::{Average, Measurement, Report},
    Precision, Value,
};
use std::{
    io::{BufRead, BufReader, Read},
    time::Instant,
};

const READ_BUFFER_SIZE: usize = 64 * 1_024;

/// Default number of records between two progress log lines
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1_000_000;

/// Streams a JSON array of measurements into per-station averages.
///
/// Every run owns a fresh [`MeanTable`], nothing is shared between runs.
///
/// ```
/// use brc_racer::Driver;
///
/// let input = r#"[
///     {"station": "A", "temperature": 10.0},
///     {"station": "B", "temperature": 20.0},
///     {"station": "A", "temperature": 30.0}
/// ]"#;
///
/// let report = Driver::new("racer-1").run::<f64, _>(input.as_bytes())?;
///
/// assert_eq!("A", report.averages[0].station);
/// assert_eq!("20.00000", report.averages[0].temperature);
/// # Ok::<(), brc_racer::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Driver {
    racer_id: String,
    progress_interval: u64,
}

impl Driver {
    /// Creates a driver that signs its reports with `racer_id`.
    pub fn new<S: Into<String>>(racer_id: S) -> Self {
        Self {
            racer_id: racer_id.into(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Logs progress every `n` records, `0` disables progress logging.
    ///
    /// Default = 1,000,000
    #[must_use]
    pub fn progress_interval(mut self, n: u64) -> Self {
        self.progress_interval = n;
        self
    }

    /// Runs an aggregation in the given precision.
    ///
    /// # Errors
    ///
    /// Returns error if the input could not be read or decoded.
    pub fn run_with<R: Read>(&self, precision: Precision, reader: R) -> crate::Result<Report> {
        match precision {
            Precision::Single => self.run::<f32, R>(reader),
            Precision::Double => self.run::<f64, R>(reader),
        }
    }

    /// Runs an aggregation, computing in `F`.
    ///
    /// # Errors
    ///
    /// Returns error if the input could not be read or decoded.
    /// No partial report is produced in that case.
    pub fn run<F: Value, R: Read>(&self, reader: R) -> crate::Result<Report> {
        let start = Instant::now();

        let mut records = ArrayReader::new(BufReader::with_capacity(READ_BUFFER_SIZE, reader));
        let mut table = MeanTable::<F>::new();
        let mut rows = 0;

        if let Err(e) = self.fold_all(&mut records, &mut table, &mut rows) {
            log::error!("error reading request data at record {rows}: {e}");
            return Err(e);
        }

        let mut averages = table
            .snapshot()
            .map(|(station, mean)| Average {
                station: station.to_owned(),
                temperature: mean.format_rounded(),
            })
            .collect::<Vec<_>>();

        // NOTE: Keys are unique, so the unstable sort is deterministic
        averages.sort_unstable_by(|a, b| a.station.cmp(&b.station));

        log::info!(
            "finished aggregation of {rows} records over {} stations (f{}) in {:?}",
            averages.len(),
            F::BITS,
            start.elapsed(),
        );

        Ok(Report {
            racer_id: self.racer_id.clone(),
            averages,
        })
    }

    fn fold_all<F: Value, R: BufRead>(
        &self,
        records: &mut ArrayReader<R>,
        table: &mut MeanTable<F>,
        rows: &mut u64,
    ) -> crate::Result<()> {
        records.open()?;

        while records.has_next()? {
            let measurement: Measurement<F> = records.decode()?;
            table.fold(&measurement.station, measurement.temperature);

            *rows += 1;

            if self.progress_interval > 0 && *rows % self.progress_interval == 0 {
                log::info!("processed {rows} records");
            }
        }

        records.close()
    }
}
