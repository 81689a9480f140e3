//! `qna update` command
//!
//! Like `qna add`, but answers already in the knowledge base have their
//! questions replaced by the ones in the file.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use super::utils::{print_mutation, Session};
use super::{GlobalArgs, SliceArgs};

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Answer/question file
    pub file: PathBuf,

    #[command(flatten)]
    pub slice: SliceArgs,
}

pub async fn run(args: UpdateArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    let records = session.load_records(&args.file)?;
    if records.is_empty() {
        bail!("No valid rows in {}", args.file.display());
    }

    let report = session.service.update(&records, args.slice.slice()).await?;
    print_mutation("Updated", &report);
    Ok(())
}
