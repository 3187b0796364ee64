use brc_racer::{Driver, Precision};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::io::{Read, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

/// Records rendered per refill of the generator buffer
const BATCH_SIZE: u64 = 1_000;

/// Lazily renders a JSON array of random measurements.
///
/// Only one batch of records exists in memory at any time.
struct Measurements {
    rng: SmallRng,
    stations: Vec<(String, f64)>,
    remaining: u64,
    opened: bool,
    closed: bool,
    buf: Vec<u8>,
    pos: usize,
}

impl Measurements {
    /// Returns `None` if there are no stations to draw records from.
    fn new(records: u64, stations: usize) -> Option<Self> {
        if stations == 0 {
            return None;
        }

        let mut rng = SmallRng::seed_from_u64(1_000_000_000);

        let stations = (0..stations)
            .map(|idx| (format!("station-{idx:05}"), rng.gen_range(-20.0..35.0)))
            .collect();

        Some(Self {
            rng,
            stations,
            remaining: records,
            opened: false,
            closed: false,
            buf: Vec::with_capacity(64 * 1_024),
            pos: 0,
        })
    }

    fn refill(&mut self) -> std::io::Result<()> {
        self.buf.clear();
        self.pos = 0;

        if !self.opened {
            self.buf.push(b'[');
            self.opened = true;
        } else if self.remaining > 0 {
            // NOTE: Not the first batch, continue after the last record
            self.buf.push(b',');
        }

        let batch = self.remaining.min(BATCH_SIZE);

        for idx in 0..batch {
            if idx > 0 {
                self.buf.push(b',');
            }

            let (station, mean) = &self.stations[self.rng.gen_range(0..self.stations.len())];
            let temperature = mean + self.rng.gen_range(-10.0..10.0);

            write!(
                self.buf,
                r#"{{"station":"{station}","temperature":{temperature:.1}}}"#
            )?;
        }

        self.remaining -= batch;

        if self.remaining == 0 && !self.closed {
            self.buf.push(b']');
            self.closed = true;
        }

        Ok(())
    }
}

impl Read for Measurements {
    fn read(&mut self, out: &mut [u8]) -> std::io::Result<usize> {
        if self.pos == self.buf.len() {
            if self.closed {
                return Ok(0);
            }
            self.refill()?;
        }

        let n = out.len().min(self.buf.len() - self.pos);
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;

        Ok(n)
    }
}

fn arg<T: std::str::FromStr>(idx: usize, default: T) -> T {
    std::env::args()
        .nth(idx)
        .and_then(|x| x.parse().ok())
        .unwrap_or(default)
}

/// Samples the resident memory of this process every 100ms, keeping the peak.
fn spawn_memory_sampler() -> Arc<AtomicU64> {
    let max_memory_bytes = Arc::new(AtomicU64::new(0));

    std::thread::spawn({
        let max_memory_bytes = max_memory_bytes.clone();

        let mut sys = sysinfo::System::new();
        let pid = sysinfo::Pid::from(std::process::id() as usize);

        move || loop {
            sys.refresh_processes_specifics(
                sysinfo::ProcessesToUpdate::Some(&[pid]),
                true,
                sysinfo::ProcessRefreshKind::new().with_memory(),
            );

            if let Some(process) = sys.process(pid) {
                max_memory_bytes.fetch_max(process.memory(), Ordering::Relaxed);
            }

            std::thread::sleep(Duration::from_millis(100));
        }
    });

    max_memory_bytes
}

fn main() -> brc_racer::Result<()> {
    env_logger::builder()
        .filter_module("brc_racer", log::LevelFilter::Info)
        .filter_module("billion", log::LevelFilter::Trace)
        .parse_default_env()
        .init();

    let records: u64 = arg(1, 1_000_000_000);
    let stations: usize = arg(2, 413);
    let precision: Precision = arg(3, Precision::Double);

    let Some(input) = Measurements::new(records, stations) else {
        log::error!("need at least one station");
        std::process::exit(1);
    };

    let max_memory_bytes = spawn_memory_sampler();

    log::info!("aggregating {records} records over {stations} stations ({precision})");

    let start = Instant::now();

    let report = Driver::new("billion")
        .progress_interval(50_000_000)
        .run_with(precision, input)?;

    let elapsed = start.elapsed();
    let elapsed_ns = elapsed.as_nanos().max(1);
    let records_per_second = u128::from(records) * 1_000_000_000 / elapsed_ns;

    let max_memory = max_memory_bytes.load(Ordering::Relaxed);

    log::info!("aggregated {records} records in {elapsed:?}");
    log::info!("throughput: {records_per_second} records/s");
    log::info!("peak mem: {} MiB", max_memory / 1_024 / 1_024);
    log::info!("stations: {}", report.averages.len());

    for avg in report.averages.iter().take(5) {
        log::info!("{} = {}", avg.station, avg.temperature);
    }

    Ok(())
}
