//! CLI module - Command definitions and handlers
//!
//! One subcommand per public operation. Every command loads the config,
//! builds a [`crate::QnaService`] over HTTP and prints the outcome.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod add;
pub mod ask;
pub mod create;
pub mod delete;
pub mod publish;
pub mod train;
pub mod update;
pub mod utils;

/// qna - Question-answering knowledge base client
///
/// Create, load, update, publish, query and train a hosted knowledge base
/// from delimited answer/question files.
#[derive(Parser, Debug)]
#[command(name = "qna")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, env = "QNA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Give up after this many seconds, as if interrupted
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a knowledge base from a file
    Create(create::CreateArgs),

    /// Add entries; questions of existing answers are appended
    Add(add::AddArgs),

    /// Add entries; questions of existing answers are replaced
    Update(update::UpdateArgs),

    /// Train the knowledge base with known question/answer pairs
    Train(train::TrainArgs),

    /// Ask a question
    Ask(ask::AskArgs),

    /// Publish the test knowledge base to production
    Publish(publish::PublishArgs),

    /// Delete the knowledge base
    Delete(delete::DeleteArgs),

    /// Delete individual entries by id
    DeleteEntries(delete::DeleteEntriesArgs),
}

/// `--production` flag shared by file commands
#[derive(Args, Debug, Clone)]
pub struct SliceArgs {
    /// Work on the published knowledge base instead of the test one
    #[arg(short, long)]
    pub production: bool,
}

impl SliceArgs {
    pub fn slice(&self) -> crate::remote::Slice {
        crate::remote::Slice::from_production_flag(self.production)
    }
}
