pub mod registry;

use clap::{Parser, Subcommand};

use crate::account::Amount;
use self::registry::parse_amount;

#[derive(Parser)]
#[command(name = "person_registry")]
#[command(about = "Single-owner person registry", long_about = None)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, default_value = "registry.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Amounts are base units, or whole units with a `u` suffix (`1u`, `0.5u`).
#[derive(Subcommand)]
pub enum Commands {
    /// Deploy the registry, owned by the given account
    Deploy {
        #[arg(long)]
        owner: String,
    },
    /// Credit native value to an account (dev faucet)
    Mint {
        #[arg(long)]
        account: String,
        #[arg(long, value_parser = parse_amount)]
        amount: Amount,
    },
    /// Store the person, paying the registry
    CreatePerson {
        #[arg(long)]
        from: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: u32,
        #[arg(long)]
        height: u32,
        #[arg(long, value_parser = parse_amount)]
        value: Amount,
    },
    /// Show the stored person
    GetPerson {
        #[arg(long)]
        json: bool,
    },
    /// Clear the stored person (owner only)
    DeletePerson {
        #[arg(long)]
        from: String,
        #[arg(long)]
        target: String,
    },
    /// Move all custodied funds to the owner (owner only)
    WithdrawAll {
        #[arg(long)]
        from: String,
    },
    /// Show an account's native balance
    Balance {
        #[arg(long)]
        account: String,
    },
    /// Show registry owner, address and balance
    Info,
    /// List emitted events
    Events {
        #[arg(long)]
        json: bool,
    },
}
