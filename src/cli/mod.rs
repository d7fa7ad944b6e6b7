// CLI module for kale-pool

mod commands;

pub use commands::{run, run_until};

use crate::config::AppConfig;
use crate::models::{ContractStatus, OutcomeFilter, TimeWindow};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// kale-pool - command-line client for the KALE pool coordination backend
#[derive(Parser, Debug)]
#[command(name = "kale-pool", version, about, long_about = None)]
pub struct Args {
    /// Config file (default: ~/.kale-pool/config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    /// Primary backend base URL
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    /// Pooler service base URL
    #[arg(long, global = true)]
    pub pooler_url: Option<String>,

    /// Per-attempt timeout in milliseconds
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Retries after the first attempt for transient failures
    #[arg(long, global = true)]
    pub retries: Option<u32>,

    /// Print client metrics (Prometheus text format) to stderr on exit
    #[arg(long, global = true)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(url) = &self.backend_url {
            config.api.backend_base_url = url.clone();
        }
        if let Some(url) = &self.pooler_url {
            config.api.pooler_base_url = url.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.api.timeout_ms = timeout_ms;
        }
        if let Some(retries) = self.retries {
            config.api.max_retries = retries;
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backend health
    Health,
    /// Backend network and pool settings
    Info,
    /// Log in and store the session token
    Login {
        email: String,
        #[arg(long, env = "KALE_POOL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the session and erase stored credentials
    Logout,
    /// Re-validate the stored session and show the current user
    Whoami,
    /// Register a farmer account with an external wallet
    Register {
        email: String,
        external_wallet: String,
        #[arg(long, env = "KALE_POOL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Check whether a user's custodial wallet is funded
    Funding { user_id: String },
    /// Registration, contract and funding status of a user
    Status { user_id: String },
    /// Browse poolers
    Poolers {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        page: Option<u64>,
        #[arg(long)]
        limit: Option<u64>,
        #[arg(long)]
        user_id: Option<String>,
    },
    /// Details of one pooler
    Pooler {
        pooler_id: String,
        #[arg(long)]
        user_id: Option<String>,
    },
    /// Status reported by the pooler service
    PoolerStatus,
    /// Ask to join a pool
    Join {
        user_id: String,
        pooler_id: String,
        #[arg(long)]
        stake_percentage: f64,
        #[arg(long)]
        harvest_interval: u64,
    },
    /// Confirm (or reject) a pending pool join
    Confirm {
        contract_id: String,
        #[arg(long)]
        reject: bool,
    },
    /// Submit a plant request (JSON from FILE or stdin)
    Plant { input: Option<PathBuf> },
    /// Submit work (JSON from FILE or stdin)
    Work { input: Option<PathBuf> },
    /// Submit a harvest request (JSON from FILE or stdin)
    Harvest { input: Option<PathBuf> },
    /// Notify the backend of a newly discovered block (JSON from FILE or stdin)
    BlockDiscovered { input: Option<PathBuf> },
    /// Farmer summary (defaults to the logged-in farmer)
    Summary {
        #[arg(long)]
        farmer_id: Option<String>,
        #[arg(long)]
        window: Option<TimeWindow>,
    },
    /// Planting or harvest history of a farmer
    History {
        #[arg(value_enum)]
        kind: HistoryKind,
        #[arg(long)]
        farmer_id: Option<String>,
        #[arg(long)]
        pooler_id: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        page: Option<u64>,
        #[arg(long)]
        limit: Option<u64>,
        #[arg(long, value_enum)]
        status: Option<OutcomeArg>,
    },
    /// Contracts, optionally filtered
    Contracts {
        #[arg(long)]
        farmer_id: Option<String>,
        #[arg(long)]
        active: bool,
        #[arg(long, value_enum)]
        status: Option<ContractStatusArg>,
        #[arg(long)]
        page: Option<u64>,
        #[arg(long)]
        limit: Option<u64>,
    },
    /// One contract by id
    Contract { contract_id: String },
    /// Leave a contract
    ExitContract { contract_id: String },
    /// Wallet balance (own custodial wallet when no address is given)
    Balance {
        address: Option<String>,
        /// Show XLM balance only
        #[arg(long)]
        xlm: bool,
        /// Show full wallet info instead of the balance
        #[arg(long, conflicts_with = "xlm")]
        info: bool,
    },
    /// Control the backend harvest service
    HarvestService {
        #[arg(value_enum)]
        action: HarvestAction,
    },
    /// Print the effective configuration
    Config,
    /// Poll an endpoint at a fixed interval until interrupted
    Watch {
        #[arg(value_enum)]
        target: WatchTarget,
        /// Seconds between polls
        #[arg(long, default_value_t = 60)]
        interval: u64,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryKind {
    Plantings,
    Harvests,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeArg {
    Success,
    Failed,
    All,
}

impl From<OutcomeArg> for OutcomeFilter {
    fn from(arg: OutcomeArg) -> Self {
        match arg {
            OutcomeArg::Success => OutcomeFilter::Success,
            OutcomeArg::Failed => OutcomeFilter::Failed,
            OutcomeArg::All => OutcomeFilter::All,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractStatusArg {
    Pending,
    Active,
    Exiting,
    Completed,
    All,
}

impl From<ContractStatusArg> for ContractStatus {
    fn from(arg: ContractStatusArg) -> Self {
        match arg {
            ContractStatusArg::Pending => ContractStatus::Pending,
            ContractStatusArg::Active => ContractStatus::Active,
            ContractStatusArg::Exiting => ContractStatus::Exiting,
            ContractStatusArg::Completed => ContractStatus::Completed,
            ContractStatusArg::All => ContractStatus::All,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestAction {
    Start,
    Stop,
    Status,
    Trigger,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchTarget {
    Health,
    PoolerStatus,
    Balance,
    BlockchainData,
}
