use anyhow::Result;
use clap::Parser;
use env_logger::init;
use scrapekit_cli::smart_install::Cli;

fn main() -> Result<()> {
    init();
    Cli::parse().run()
}
