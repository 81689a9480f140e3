//! `qna publish` command

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::utils::Session;
use super::GlobalArgs;

/// Publish the test knowledge base to production
#[derive(Args, Debug)]
pub struct PublishArgs {}

pub async fn run(_args: PublishArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    session.service.publish().await?;
    println!(
        "{} Published knowledge base: {}",
        "✓".green(),
        session.service.kb_id()?.cyan()
    );
    Ok(())
}
