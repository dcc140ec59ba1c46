use anyhow::Result;
use clap::Parser;
use env_logger::init;
use scrapekit_cli::font_decode::Cli;

fn main() -> Result<()> {
    init();
    Cli::parse().run()
}
