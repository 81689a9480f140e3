//! `qna add` command
//!
//! Adds entries from a file. Answers already in the knowledge base keep
//! their questions and get the new ones appended.
//!
//! # Usage
//! ```bash
//! qna add more-faq.csv
//! qna add more-faq.csv --production   # reconcile against the published copy
//! ```

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use super::utils::{print_mutation, Session};
use super::{GlobalArgs, SliceArgs};

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Answer/question file
    pub file: PathBuf,

    #[command(flatten)]
    pub slice: SliceArgs,
}

pub async fn run(args: AddArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    let records = session.load_records(&args.file)?;
    if records.is_empty() {
        bail!("No valid rows in {}", args.file.display());
    }

    let report = session.service.add(&records, args.slice.slice()).await?;
    print_mutation("Added", &report);
    Ok(())
}
