//! `qna ask` command
//!
//! Asks one question and prints the ranked answers.
//!
//! # Usage
//! ```bash
//! qna ask "When do you open?"
//! qna ask "When do you open?" --top 3 --production
//! qna ask "When do you open?" --format json
//! ```

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::utils::Session;
use super::{GlobalArgs, SliceArgs};
use crate::core::query::DEFAULT_TOP;
use crate::remote::Candidate;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Question to ask
    pub question: String,

    /// Maximum number of answers
    #[arg(
        short = 'n',
        long,
        default_value_t = DEFAULT_TOP,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub top: usize,

    /// Output format (pretty, json)
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    #[command(flatten)]
    pub slice: SliceArgs,
}

#[derive(Tabled)]
struct AnswerRow {
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Id")]
    id: i32,
    #[tabled(rename = "Answer")]
    answer: String,
}

impl From<&Candidate> for AnswerRow {
    fn from(c: &Candidate) -> Self {
        Self {
            score: format!("{:.1}", c.score),
            id: c.id,
            answer: c.answer.clone(),
        }
    }
}

pub async fn run(args: AskArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    let answers = session
        .service
        .ask(&args.question, args.slice.slice(), args.top)
        .await?;

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&answers)?),
        "pretty" => print_pretty(&answers),
        other => bail!("Unknown format: {}. Use 'pretty' or 'json'.", other),
    }
    Ok(())
}

fn print_pretty(answers: &[Candidate]) {
    if answers.is_empty() {
        println!("{}", "No answers found.".dimmed());
        return;
    }

    let rows: Vec<AnswerRow> = answers.iter().map(AnswerRow::from).collect();
    println!("{}", Table::new(rows).with(Style::rounded()));
}
