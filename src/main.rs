use brc_racer::Config;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[tokio::main]
async fn main() -> brc_racer::Result<()> {
    env_logger::builder()
        .filter_module("hyper", log::LevelFilter::Warn)
        .filter_module("tower_http", log::LevelFilter::Warn)
        .filter_module("brc_racer", log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            return Err(e);
        }
    };

    brc_racer::serve(config).await
}
