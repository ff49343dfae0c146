use log::LevelFilter;

/// Logs to stderr, `warn` and above unless `RUST_LOG` says otherwise.
pub fn init() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Warn)
        .parse_default_env()
        .format_target(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize logger: {err}"))
}
