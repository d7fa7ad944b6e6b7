// Subcommand dispatch for the kale-pool binary

use super::{Command, HarvestAction, HistoryKind, WatchTarget};
use crate::client::ApiClient;
use crate::config::AppConfig;
use crate::models::*;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

/// Run one subcommand to completion, printing its result as JSON on stdout.
pub async fn run(command: Command, client: &ApiClient, config: &AppConfig) -> Result<()> {
    match command {
        Command::Health => print_json(&client.health().await?),
        Command::Info => print_json(&client.info().await?),

        Command::Login { email, password } => {
            let response = client.login(&email, &password).await?;
            match client.stored_profile() {
                Some(profile) => info!(
                    "Session stored for {}",
                    profile.email.as_deref().unwrap_or(&email)
                ),
                None if client.stored_token().is_none() => warn!("Login succeeded but no token was returned"),
                None => {}
            }
            print_json(&response)
        }
        Command::Logout => {
            client.logout().await?;
            info!("Logged out");
            Ok(())
        }
        Command::Whoami => match client.refresh_user().await? {
            Some(user) => print_json(&user),
            None => anyhow::bail!("Not logged in"),
        },
        Command::Register {
            email,
            external_wallet,
            password,
        } => print_json(&client.register_farmer(&email, &password, &external_wallet).await?),
        Command::Funding { user_id } => {
            print_json(&client.check_funding(&CheckFundingRequest { user_id }).await?)
        }
        Command::Status { user_id } => print_json(&client.user_status(&user_id).await?),

        Command::Poolers {
            search,
            page,
            limit,
            user_id,
        } => {
            let filters = FilterParams {
                page,
                limit,
                search,
                ..Default::default()
            };
            print_json(&client.poolers(user_id.as_deref(), &filters).await?)
        }
        Command::Pooler { pooler_id, user_id } => {
            print_json(&client.pooler_details(&pooler_id, user_id.as_deref()).await?)
        }
        Command::PoolerStatus => print_json(&client.pooler_status().await?),
        Command::Join {
            user_id,
            pooler_id,
            stake_percentage,
            harvest_interval,
        } => {
            let request = JoinPoolRequest {
                user_id,
                pooler_id,
                stake_percentage,
                harvest_interval,
            };
            print_json(&client.join_pool(&request).await?)
        }
        Command::Confirm { contract_id, reject } => {
            let request = ConfirmJoinRequest {
                contract_id,
                confirmed: !reject,
            };
            print_json(&client.confirm_join(&request).await?)
        }

        Command::Plant { input } => {
            let request: PlantRequest = read_json(input.as_deref()).await?;
            print_json(&client.plant(&request).await?)
        }
        Command::Work { input } => {
            let request: WorkRequest = read_json(input.as_deref()).await?;
            print_json(&client.work(&request).await?)
        }
        Command::Harvest { input } => {
            let request: HarvestRequest = read_json(input.as_deref()).await?;
            print_json(&client.harvest(&request).await?)
        }
        Command::BlockDiscovered { input } => {
            let event: BlockDiscoveredEvent = read_json(input.as_deref()).await?;
            print_json(&client.notify_block_discovered(&event).await?)
        }

        Command::Summary { farmer_id, window } => {
            print_json(&client.farmer_summary(farmer_id.as_deref(), window).await?)
        }
        Command::History {
            kind,
            farmer_id,
            pooler_id,
            from,
            to,
            page,
            limit,
            status,
        } => {
            let filters = ActivityFilters {
                pooler_id,
                from,
                to,
                page,
                limit,
                status: status.map(Into::into),
            };
            let history = match kind {
                HistoryKind::Plantings => client.farmer_plantings(farmer_id.as_deref(), &filters).await?,
                HistoryKind::Harvests => client.farmer_harvests(farmer_id.as_deref(), &filters).await?,
            };
            print_json(&history)
        }
        Command::Contracts {
            farmer_id,
            active,
            status,
            page,
            limit,
        } => {
            if active {
                return print_json(&client.farmer_active_contract(farmer_id.as_deref()).await?);
            }
            let filters = ContractFilters {
                status: status.map(Into::into),
                page,
                limit,
            };
            print_json(&client.farmer_contracts(farmer_id.as_deref(), &filters).await?)
        }
        Command::Contract { contract_id } => print_json(&client.contract(&contract_id).await?),
        Command::ExitContract { contract_id } => print_json(&client.exit_contract(&contract_id).await?),

        Command::Balance { address, xlm, info } => {
            let value = match address.as_deref() {
                None if xlm || info => anyhow::bail!("--xlm and --info need a wallet address"),
                None => client.my_wallet_balance().await?,
                Some(address) if xlm => client.xlm_balance(address).await?,
                Some(address) if info => client.wallet_info(address).await?,
                Some(address) => client.wallet_balance(address).await?,
            };
            print_json(&value)
        }
        Command::HarvestService { action } => {
            let value = match action {
                HarvestAction::Start => client.start_harvest_service().await?,
                HarvestAction::Stop => client.stop_harvest_service().await?,
                HarvestAction::Status => client.harvest_status().await?,
                HarvestAction::Trigger => client.trigger_harvest().await?,
            };
            print_json(&value)
        }

        Command::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
        Command::Watch { target, interval } => watch(client, target, interval).await,
    }
}

/// Drive `command` unless `shutdown` resolves first.
///
/// An interrupted command is an error so the process exits non-zero.
pub async fn run_until<C, S>(command: C, shutdown: S) -> Result<()>
where
    C: Future<Output = Result<()>>,
    S: Future<Output = ()>,
{
    tokio::select! {
        result = command => result,
        _ = shutdown => {
            info!("Interrupted; request abandoned");
            anyhow::bail!("Interrupted before the command finished")
        }
    }
}

/// Poll `target` every `interval_secs` until the future is dropped.
///
/// Failed polls are logged and the loop keeps going; the executor has
/// already spent its retries by the time an error reaches here.
async fn watch(client: &ApiClient, target: WatchTarget, interval_secs: u64) -> Result<()> {
    if interval_secs == 0 {
        anyhow::bail!("--interval must be at least 1 second");
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    info!("Watching {:?} every {}s (Ctrl+C to stop)", target, interval_secs);

    loop {
        ticker.tick().await;

        match poll(client, target).await {
            Ok(value) => {
                let stamped = serde_json::json!({
                    "at": chrono::Utc::now().to_rfc3339(),
                    "data": value,
                });
                println!("{}", serde_json::to_string(&stamped)?);
            }
            Err(e) => warn!("{:?} poll failed: {:#}", target, e),
        }
    }
}

/// One poll of `target` as JSON.
async fn poll(client: &ApiClient, target: WatchTarget) -> Result<Value> {
    let value = match target {
        WatchTarget::Health => to_value(client.health().await?)?,
        WatchTarget::PoolerStatus => to_value(client.pooler_status().await?)?,
        WatchTarget::Balance => client.my_wallet_balance().await?,
        WatchTarget::BlockchainData => client.farmer_blockchain_data().await?,
    };
    Ok(value)
}

fn to_value<T: Serialize>(value: T) -> Result<Value> {
    serde_json::to_value(value).context("Response could not be re-encoded as JSON")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Read a JSON request body from `path`, or stdin when `path` is absent or `-`.
async fn read_json<T: DeserializeOwned>(path: Option<&Path>) -> Result<T> {
    let raw = match path {
        Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        _ => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context("Failed to read request body from stdin")?;
            raw
        }
    };

    serde_json::from_str(&raw).context("Request body is not valid JSON for this command")
}
