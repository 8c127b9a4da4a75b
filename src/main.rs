mod filter;
mod modes;
mod report;
mod store;
mod timestamp;

use anyhow::Result;
use dotenvy::dotenv;

fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt().with_target(false).init();

    modes::run_from_env()
}
