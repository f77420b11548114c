mod cli;
mod sources;
mod summary;

use std::sync::Arc;

use anyhow::Context;
use cbz_engine::{write_stats_report, LogSink, Pipeline, ReqwestFetcher};
use clap::Parser;
use engine_logging::{engine_error, engine_info};

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    engine_logging::init_run_logger(args.verbose, &args.error_log);

    if let Err(err) = run(&args) {
        engine_error!("{:#}", err);
        return Err(err);
    }
    Ok(())
}

fn run(args: &cli::Args) -> anyhow::Result<()> {
    let config = args.run_config();
    config.validate().context("invalid configuration")?;

    let urls = sources::load_url_list(&args.url_list)?;
    engine_info!("Loaded {} URL(s) from {:?}", urls.len(), args.url_list);

    let fetcher = ReqwestFetcher::new(args.fetch_settings()).context("building HTTP client")?;
    let pipeline = Pipeline::new(config, Arc::new(fetcher), Arc::new(LogSink));

    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    let stats = runtime.block_on(pipeline.run(&urls));

    println!("{}", summary::render(&stats));
    if let Some(path) = &args.stats_json {
        let written = write_stats_report(path, &stats).context("writing statistics report")?;
        engine_info!("Statistics written to {:?}", written);
    }
    Ok(())
}
