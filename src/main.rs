use anyhow::Result;
use clap::Parser;
use glyphcache::cli::{self, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI --log-level takes precedence over GLYPHCACHE_LOG
    glyphcache::debug::init_log_bridge(cli.log_level.map(|l| l.to_level_filter()));

    log::info!("Starting glyphcache {}", glyphcache::VERSION);

    cli::run(cli)
}
