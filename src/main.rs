use anyhow::Result;
use tracing::info;
use zugzwang_uci::UciEngine;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    info!("zugzwang starting");
    UciEngine::new().run()?;
    Ok(())
}
