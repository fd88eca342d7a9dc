use crate::config::toml_config::DEFAULT_CONFIG_FILE;
use clap::{ArgGroup, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "household")]
#[command(about = "Chores, shopping list and shared expenses for a small household")]
#[command(version)]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Create the tables that do not exist yet
    Init,
    #[command(subcommand)]
    Chores(ChoresCommand),
    #[command(subcommand)]
    Shopping(ShoppingCommand),
    #[command(subcommand)]
    Debts(DebtsCommand),
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum ChoresCommand {
    /// Ranking by points
    Standings,
    /// Recent completions
    History,
    /// Completion counts per chore and member
    Table,
    /// Record chores done by a member
    Done {
        #[arg(long = "as")]
        member: String,
        #[arg(required = true)]
        chores: Vec<String>,
    },
    /// Delete a history entry and the points it gave (1 = most recent)
    Undo { position: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum ShoppingCommand {
    List,
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Remove items by text, or by their number in `shopping list`
    #[command(group(ArgGroup::new("target").required(true).args(["items", "positions"])))]
    Remove {
        items: Vec<String>,
        #[arg(short, long = "position", conflicts_with = "items")]
        positions: Vec<usize>,
    },
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum DebtsCommand {
    Balances,
    History,
    /// Record a payment made on behalf of other members
    Pay {
        #[arg(long = "as")]
        payer: String,
        #[arg(long)]
        amount: String,
        #[arg(long = "for", num_args = 1..)]
        beneficiaries: Vec<String>,
        /// Split among the whole household
        #[arg(long, conflicts_with = "beneficiaries")]
        everyone: bool,
        #[arg(long, default_value = "")]
        reason: String,
    },
}
