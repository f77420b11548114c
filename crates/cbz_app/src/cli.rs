use std::path::PathBuf;
use std::time::Duration;

use cbz_core::{RunConfig, DEFAULT_QUALITY, DEFAULT_RETRIES, DEFAULT_WORKERS};
use cbz_engine::FetchSettings;
use clap::Parser;

/// Download the images of each listed web page and pack them into `<title>.cbz`.
#[derive(Debug, Parser)]
#[command(name = "cbz-harvest", version, about)]
pub struct Args {
    /// Newline-delimited list of page URLs.
    #[arg(long = "web", value_name = "PATH", default_value = "web.txt")]
    pub url_list: PathBuf,

    /// Concurrent image downloads per page.
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Download attempts per image.
    #[arg(long = "retry", default_value_t = DEFAULT_RETRIES)]
    pub retries: u32,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = DEFAULT_QUALITY)]
    pub quality: u8,

    /// Skip pages whose archive already exists.
    #[arg(long)]
    pub skip_existing: bool,

    /// Where archives and working directories go.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Append-only log of errors.
    #[arg(long, value_name = "PATH", default_value = "error.log")]
    pub error_log: PathBuf,

    /// Per-request timeout in seconds.
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    pub timeout: u64,

    /// Pause between download attempts in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 1000)]
    pub retry_delay_ms: u64,

    /// Reject invalid TLS certificates.
    #[arg(long)]
    pub verify_tls: bool,

    /// Write the final statistics as JSON to this file.
    #[arg(long, value_name = "PATH")]
    pub stats_json: Option<PathBuf>,

    /// Debug-level terminal output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            workers: self.workers,
            retries: self.retries,
            quality: self.quality,
            skip_existing: self.skip_existing,
            output_dir: self.output_dir.clone(),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        let timeout = Duration::from_secs(self.timeout);
        FetchSettings {
            connect_timeout: timeout,
            request_timeout: timeout,
            accept_invalid_certs: !self.verify_tls,
            ..FetchSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_run_config_defaults() {
        let args = Args::try_parse_from(["cbz-harvest"]).unwrap();
        assert_eq!(args.url_list, PathBuf::from("web.txt"));
        assert_eq!(args.error_log, PathBuf::from("error.log"));
        assert!(args.stats_json.is_none());
        assert_eq!(args.run_config(), RunConfig::default());
        assert!(args.fetch_settings().accept_invalid_certs);
    }

    #[test]
    fn flags_flow_into_config_and_settings() {
        let args = Args::try_parse_from([
            "cbz-harvest",
            "--web",
            "list.txt",
            "--workers",
            "3",
            "--retry",
            "0",
            "--quality",
            "70",
            "--skip-existing",
            "--output-dir",
            "out",
            "--timeout",
            "30",
            "--retry-delay-ms",
            "250",
            "--verify-tls",
        ])
        .unwrap();

        let config = args.run_config();
        assert_eq!(config.workers, 3);
        assert_eq!(config.retries, 0);
        assert_eq!(config.quality, 70);
        assert!(config.skip_existing);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.retry_delay, Duration::from_millis(250));

        let settings = args.fetch_settings();
        assert_eq!(settings.request_timeout, Duration::from_secs(30));
        assert!(!settings.accept_invalid_certs);
    }

    #[test]
    fn zero_workers_parse_but_fail_validation() {
        let args = Args::try_parse_from(["cbz-harvest", "--workers", "0"]).unwrap();
        assert!(args.run_config().validate().is_err());
    }

    #[test]
    fn quality_above_byte_range_is_rejected_by_parser() {
        assert!(Args::try_parse_from(["cbz-harvest", "--quality", "300"]).is_err());
    }
}
