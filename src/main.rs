mod animation;
mod app;
mod cli;
mod cli_cmds;
mod ingest;
mod logging;
mod preview;
mod slideshow;
mod storage;
mod thumbnail;
mod ui;
mod utils;
mod wall;
mod wallpaper;

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
