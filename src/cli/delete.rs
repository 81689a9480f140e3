//! `qna delete` and `qna delete-entries` commands
//!
//! # Usage
//! ```bash
//! qna delete            # asks for confirmation
//! qna delete --force
//! qna delete-entries 12 13
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use dialoguer::Confirm;

use super::utils::{print_mutation, Session};
use super::GlobalArgs;

/// Delete the whole knowledge base
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Skip confirmation
    #[arg(short, long)]
    pub force: bool,
}

/// Delete entries by id
#[derive(Args, Debug)]
pub struct DeleteEntriesArgs {
    /// Entry ids as shown by `qna ask`
    #[arg(required = true)]
    pub ids: Vec<i32>,
}

pub async fn run(args: DeleteArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    let kb_id = session.service.kb_id()?.to_string();

    if !args.force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete knowledge base '{}'? This cannot be undone.",
                kb_id.red()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    session.service.delete_knowledge_base().await?;
    println!("{} Deleted knowledge base: {}", "✓".green(), kb_id);
    Ok(())
}

pub async fn run_entries(args: DeleteEntriesArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    let report = session.service.delete_entries(args.ids).await?;
    print_mutation("Deleted", &report);
    Ok(())
}
