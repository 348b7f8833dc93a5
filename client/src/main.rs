use anyhow::{format_err, Result};
use clap::Parser;
use configparser::ini::Ini;
use solana_client::rpc_client::RpcClient;
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};
use stake_ledger::states::{GlobalConfig, StakePool, StakePosition};
use std::str::FromStr;

mod instructions;
use instructions::ledger_instructions::*;
use instructions::rpc::*;
use instructions::utils::*;

#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    http_url: String,
    ws_url: String,
    payer_path: String,
    admin_path: String,
    stake_ledger_program: Pubkey,
}

fn required(config: &Ini, key: &str) -> Result<String> {
    match config.get("Global", key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(format_err!("{} must not be empty", key)),
    }
}

fn load_cfg(client_config: &str) -> Result<ClientConfig> {
    let mut config = Ini::new();
    config
        .load(client_config)
        .map_err(|e| format_err!("failed to load {}: {}", client_config, e))?;

    let stake_ledger_program = Pubkey::from_str(&required(&config, "stake_ledger_program")?)?;
    Ok(ClientConfig {
        http_url: required(&config, "http_url")?,
        ws_url: required(&config, "ws_url")?,
        payer_path: required(&config, "payer_path")?,
        admin_path: required(&config, "admin_path")?,
        stake_ledger_program,
    })
}

fn read_keypair_file(s: &str) -> Result<Keypair> {
    solana_sdk::signature::read_keypair_file(s)
        .map_err(|_| format_err!("failed to read keypair from {}", s))
}

#[derive(Debug, Parser)]
pub struct Opts {
    #[clap(subcommand)]
    pub command: StakeLedgerCommands,
}

#[derive(Debug, Parser)]
pub enum StakeLedgerCommands {
    InitialiseLedger {
        #[arg(long)]
        admin: Pubkey,
        #[arg(long)]
        treasury: Pubkey,
        #[arg(long)]
        base_mint: Pubkey,
        #[arg(long)]
        receipt_mint: Pubkey,
        /// Seconds per vesting window.
        #[arg(long, default_value_t = 604_800)]
        window_duration: u64,
        #[arg(long, default_value_t = 8)]
        max_reward_tokens: u64,
        #[arg(long, default_value_t = 86_400)]
        voting_power_divisor: u64,
    },
    UpdateConfig {
        #[arg(long)]
        param: u8,
        #[arg(long, default_value_t = 0)]
        value: u64,
        /// New admin (param 0) or treasury (param 1).
        #[arg(long)]
        key: Option<Pubkey>,
    },
    UpdateWhitelist {
        #[arg(long)]
        mint: Pubkey,
        #[arg(long)]
        remove: bool,
    },
    Stake {
        #[arg(long)]
        amount: u64,
    },
    Unstake {
        #[arg(long)]
        amount: u64,
        /// Base-token account receiving the withdrawal; defaults to the payer's ATA.
        #[arg(long)]
        destination: Option<Pubkey>,
    },
    CreditRewards {
        #[arg(long)]
        mint: Pubkey,
        #[arg(long)]
        amount: u64,
    },
    SyncRewards {
        #[arg(long)]
        mint: Pubkey,
    },
    ClaimRewards {
        /// Reward mints to claim; all must share one token program.
        #[arg(long, num_args = 1.., required = true)]
        mints: Vec<Pubkey>,
    },
    RemoveRewardStream {
        #[arg(long)]
        mint: Pubkey,
    },
    ShowPool {},
    ShowPosition {
        /// Defaults to the payer.
        #[arg(long)]
        owner: Option<Pubkey>,
    },
}

fn send(
    rpc_client: &RpcClient,
    payer: &Keypair,
    extra_signer: Option<&Keypair>,
    instructions: &[Instruction],
) -> Result<()> {
    let mut signers = vec![payer];
    if let Some(signer) = extra_signer {
        if signer.pubkey() != payer.pubkey() {
            signers.push(signer);
        }
    }
    let recent_hash = rpc_client.get_latest_blockhash()?;
    let txn = Transaction::new_signed_with_payer(
        instructions,
        Some(&payer.pubkey()),
        &signers,
        recent_hash,
    );
    let signature = send_txn(rpc_client, &txn, true)?;
    println!("{}", signature);
    Ok(())
}

fn load_global_config(rpc_client: &RpcClient, program_id: &Pubkey) -> Result<GlobalConfig> {
    get_anchor_account::<GlobalConfig>(rpc_client, &get_global_config_address(program_id))?
        .ok_or_else(|| format_err!("ledger is not initialised"))
}

fn main() -> Result<()> {
    let client_config = "client_config.ini";
    let ledger_config = load_cfg(client_config)?;
    let payer = read_keypair_file(&ledger_config.payer_path)?;
    let admin = read_keypair_file(&ledger_config.admin_path)?;
    let rpc_client = RpcClient::new(ledger_config.http_url.to_string());
    let program_id = ledger_config.stake_ledger_program;

    let opts = Opts::parse();
    match opts.command {
        StakeLedgerCommands::InitialiseLedger {
            admin: ledger_admin,
            treasury,
            base_mint,
            receipt_mint,
            window_duration,
            max_reward_tokens,
            voting_power_divisor,
        } => {
            let base_token_program = get_required_account(&rpc_client, &base_mint)?.owner;
            let ixs = initialise_ledger_instr(
                &ledger_config,
                admin.pubkey(),
                ledger_admin,
                treasury,
                base_mint,
                base_token_program,
                receipt_mint,
                window_duration,
                max_reward_tokens,
                voting_power_divisor,
            )?;
            send(&rpc_client, &payer, Some(&admin), &ixs)?;
        }
        StakeLedgerCommands::UpdateConfig { param, value, key } => {
            let ixs = update_config_instr(&ledger_config, admin.pubkey(), param, value, key)?;
            send(&rpc_client, &payer, Some(&admin), &ixs)?;
        }
        StakeLedgerCommands::UpdateWhitelist { mint, remove } => {
            let ixs = update_whitelist_instr(&ledger_config, admin.pubkey(), mint, !remove)?;
            send(&rpc_client, &payer, Some(&admin), &ixs)?;
        }
        StakeLedgerCommands::Stake { amount } => {
            let global_config = load_global_config(&rpc_client, &program_id)?;
            let base_token_program =
                get_required_account(&rpc_client, &global_config.base_mint)?.owner;
            let ixs = stake_instr(
                &ledger_config,
                global_config.base_mint,
                base_token_program,
                global_config.receipt_mint,
                amount,
            )?;
            send(&rpc_client, &payer, None, &ixs)?;
        }
        StakeLedgerCommands::Unstake {
            amount,
            destination,
        } => {
            let global_config = load_global_config(&rpc_client, &program_id)?;
            let base_token_program =
                get_required_account(&rpc_client, &global_config.base_mint)?.owner;
            let ixs = unstake_instr(
                &ledger_config,
                global_config.base_mint,
                base_token_program,
                global_config.receipt_mint,
                destination,
                amount,
            )?;
            send(&rpc_client, &payer, None, &ixs)?;
        }
        StakeLedgerCommands::CreditRewards { mint, amount } => {
            let token_program = get_required_account(&rpc_client, &mint)?.owner;
            let ixs = credit_rewards_instr(&ledger_config, mint, token_program, amount)?;
            send(&rpc_client, &payer, None, &ixs)?;
        }
        StakeLedgerCommands::SyncRewards { mint } => {
            let token_program = get_required_account(&rpc_client, &mint)?.owner;
            let ixs = sync_rewards_instr(&ledger_config, mint, token_program)?;
            send(&rpc_client, &payer, None, &ixs)?;
        }
        StakeLedgerCommands::ClaimRewards { mints } => {
            let token_program = get_required_account(&rpc_client, &mints[0])?.owner;
            for mint in &mints[1..] {
                let owner = get_required_account(&rpc_client, mint)?.owner;
                if owner != token_program {
                    return Err(format_err!(
                        "{} belongs to {}, expected {}; claim it separately",
                        mint,
                        owner,
                        token_program
                    ));
                }
            }
            let ixs = claim_rewards_instr(&ledger_config, &mints, token_program)?;
            send(&rpc_client, &payer, None, &ixs)?;
        }
        StakeLedgerCommands::RemoveRewardStream { mint } => {
            let ixs = remove_reward_stream_instr(&ledger_config, admin.pubkey(), mint)?;
            send(&rpc_client, &payer, Some(&admin), &ixs)?;
        }
        StakeLedgerCommands::ShowPool {} => {
            let global_config = load_global_config(&rpc_client, &program_id)?;
            let stake_pool: StakePool =
                get_anchor_account(&rpc_client, &get_stake_pool_address(&program_id))?
                    .ok_or_else(|| format_err!("stake pool not found"))?;
            let escrow = get_required_account(&rpc_client, &global_config.escrow_vault)?;
            let receipt = get_required_account(&rpc_client, &global_config.receipt_mint)?;

            println!("{:#?}", global_config);
            println!("total_staked: {}", stake_pool.total_staked);
            println!("escrow_balance: {}", stake_pool.escrow_balance);
            println!("escrow_vault_amount: {}", token_amount(&escrow)?);
            println!("receipt_decimals: {}", mint_decimals(&receipt)?);
            for (slot, stream) in stake_pool.registered_streams() {
                println!("slot {}: {:#?}", slot, stream);
            }
        }
        StakeLedgerCommands::ShowPosition { owner } => {
            let owner = owner.unwrap_or_else(|| payer.pubkey());
            let global_config = load_global_config(&rpc_client, &program_id)?;
            let stake_pool: StakePool =
                get_anchor_account(&rpc_client, &get_stake_pool_address(&program_id))?
                    .ok_or_else(|| format_err!("stake pool not found"))?;
            let Some(position) = get_anchor_account::<StakePosition>(
                &rpc_client,
                &get_stake_position_address(&owner, &program_id),
            )?
            else {
                println!("{} has no position", owner);
                return Ok(());
            };

            let now = cluster_time(&rpc_client)?;
            println!("owner: {}", owner);
            println!("staked_balance: {}", position.staked_balance);
            println!("stake_start_time: {}", position.stake_start_time);
            println!(
                "voting_power: {}",
                position.voting_power(now, global_config.voting_power_divisor)
            );
            for (slot, stream) in stake_pool.registered_streams() {
                let mut settled = *stream;
                settled
                    .settle(now, stake_pool.total_staked)
                    .map_err(|e| format_err!("settle {}: {}", stream.mint, e))?;
                let claimable = position
                    .claimable(slot, &settled)
                    .map_err(|e| format_err!("claimable {}: {}", stream.mint, e))?;
                println!("claimable {}: {}", stream.mint, claimable);
            }
        }
    }
    Ok(())
}
