//! `qna train` command
//!
//! Reinforces known question/answer pairs. Each question is asked and every
//! returned answer that matches the file's answer exactly is sent back as
//! feedback.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::utils::Session;
use super::{GlobalArgs, SliceArgs};

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Answer/question file
    pub file: PathBuf,

    #[command(flatten)]
    pub slice: SliceArgs,
}

pub async fn run(args: TrainArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    let records = session.load_records(&args.file)?;

    let report = session.service.train(&records, args.slice.slice()).await?;

    if report.feedback_sent == 0 {
        println!(
            "No exact matches for {} question(s); nothing to train.",
            report.questions_asked
        );
    } else {
        println!(
            "{} Sent {} feedback record(s) for {} question(s)",
            "✓".green(),
            report.feedback_sent,
            report.questions_asked
        );
    }
    Ok(())
}
