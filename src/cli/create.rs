//! `qna create` command
//!
//! Creates a knowledge base seeded from a file and prints its identity.
//!
//! # Usage
//! ```bash
//! qna create faq.csv --name "Support FAQ"
//! qna create faq.csv --save   # write the id and query key into the config
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::utils::Session;
use crate::config::Config;
use super::GlobalArgs;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Answer/question file
    pub file: PathBuf,

    /// Knowledge base name
    #[arg(short, long, default_value = "QnA")]
    pub name: String,

    /// Store the new id and query key in the config file
    #[arg(long)]
    pub save: bool,
}

pub async fn run(args: CreateArgs, global: &GlobalArgs) -> Result<()> {
    let mut session = Session::open(global)?;
    let records = session.load_records(&args.file)?;

    eprintln!("Creating knowledge base '{}' with {} entries...", args.name, records.len());
    let identity = session.service.create(&args.name, &records).await?;

    println!(
        "{} Created knowledge base: {}",
        "✓".green(),
        identity.id.cyan().bold()
    );
    println!("  Query endpoint: {}", identity.query_endpoint);
    println!("  Query key:      {}", identity.query_key.dimmed());

    if args.save {
        let path = session.save_path();
        Config::save_identity(&path, &identity.id, &identity.query_key)?;
        println!("  Saved to: {}", path.display());
    } else {
        println!("\nTo use this knowledge base, set in config:");
        println!("  [knowledge_base]");
        println!("  id = \"{}\"", identity.id);
    }

    Ok(())
}
