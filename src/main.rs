// Entry point for the asset-chain CLI
use asset_chain::{
    default_seed, AssetStore, AuditOutcome, AuditedAssetStore, Blockchain, CancelToken,
    ChainStore, Command, Config, MiningOutcome, Opt, SledState, GLOBAL_CONFIG,
};
use clap::Parser;
use log::error;
use std::process;
use std::time::Duration;

// Payloads the demo mines after genesis
const DEMO_PAYLOADS: [&str; 2] = ["First Block after Genesis", "Second Block after Genesis"];

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
    let opt = Opt::parse();
    let config = resolve_config(&opt);

    let level = config
        .as_ref()
        .map(Config::level_filter)
        .unwrap_or(log::LevelFilter::Info);
    env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .init();

    let result = config.and_then(|config| run_command(&opt, &config));
    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

// Defaults and environment, then the config file, then command-line flags
fn resolve_config(opt: &Opt) -> CliResult<Config> {
    let mut config = match &opt.config {
        Some(path) => Config::load(path)?,
        None => GLOBAL_CONFIG.clone(),
    };
    if let Some(difficulty) = opt.difficulty {
        config.set_difficulty(difficulty)?;
    }
    if let Some(dir) = &opt.data_dir {
        config.data_dir = dir.clone();
    }
    Ok(config)
}

fn cancel_token(opt: &Opt) -> CancelToken {
    match opt.timeout_secs {
        Some(secs) => CancelToken::with_timeout(Duration::from_secs(secs)),
        None => CancelToken::new(),
    }
}

fn run_command(opt: &Opt, config: &Config) -> CliResult<()> {
    match &opt.command {
        Command::Demo => {
            let mut blockchain = Blockchain::new(config.difficulty)?;
            let cancel = cancel_token(opt);
            for payload in DEMO_PAYLOADS {
                mine(&mut blockchain, payload, &cancel)?;
            }
            print_chain(&blockchain);
            println!("Chain valid: {}", blockchain.validate());
        }
        Command::Append { payload } => {
            let store = ChainStore::open(&config.chain_path())?;
            let mut blockchain = store.load_or_create(config.difficulty)?;
            let block = mine(&mut blockchain, payload, &cancel_token(opt))?;
            store.save_chain(&blockchain)?;
            println!("{block}");
        }
        Command::Printchain => {
            let store = ChainStore::open(&config.chain_path())?;
            let blockchain = store
                .load()?
                .ok_or("No chain found. Append a block first.")?;
            print_chain(&blockchain);
        }
        Command::Validate => {
            // loading verifies every block, so reaching here means the chain is intact
            let store = ChainStore::open(&config.chain_path())?;
            match store.load()? {
                Some(blockchain) => println!(
                    "Chain is valid: {} blocks at difficulty {}",
                    blockchain.len(),
                    blockchain.difficulty()
                ),
                None => println!("No chain found."),
            }
        }
        Command::CreateProduct { id, description } => {
            let audited = open_audited(config)?;
            let outcome = audited.create(id, description, &cancel_token(opt))?;
            recorded(outcome)?;
            println!("Created product {id}");
        }
        Command::ReadProduct { id } => {
            let asset = open_assets(config)?.read(id)?;
            println!("{}", serde_json::to_string_pretty(&asset)?);
        }
        Command::TransferProduct { id, owner, status } => {
            let audited = open_audited(config)?;
            let outcome = audited.transfer(id, owner, status, &cancel_token(opt))?;
            recorded(outcome)?;
            println!("Transferred product {id} to {owner} ({status})");
        }
        Command::ProductExists { id } => {
            println!("{}", open_assets(config)?.exists(id)?);
        }
        Command::Seed => {
            let audited = open_audited(config)?;
            let outcome = audited.init_ledger(&default_seed(), &cancel_token(opt))?;
            recorded(outcome)?;
            println!("Done!");
        }
    }
    Ok(())
}

fn mine(
    blockchain: &mut Blockchain,
    payload: &str,
    cancel: &CancelToken,
) -> CliResult<asset_chain::Block> {
    match blockchain.append_cancellable(payload, cancel)? {
        MiningOutcome::Sealed(block) => Ok(block),
        MiningOutcome::Cancelled { attempts } => {
            Err(format!("Mining cancelled after {attempts} attempts").into())
        }
        MiningOutcome::Exhausted => Err("Nonce space exhausted".into()),
    }
}

fn open_assets(config: &Config) -> CliResult<AssetStore<SledState>> {
    let state = SledState::open(&config.state_path())?;
    Ok(AssetStore::new(state))
}

// A chain store that cannot be opened or loaded fails here, before any asset is written
fn open_audited(config: &Config) -> CliResult<AuditedAssetStore<SledState>> {
    let chain_store = ChainStore::open(&config.chain_path())?;
    let assets = open_assets(config)?;
    let audited = AuditedAssetStore::open(assets, chain_store, config.difficulty)?;
    Ok(audited)
}

fn recorded<T>(outcome: AuditOutcome<T>) -> CliResult<T> {
    match outcome {
        AuditOutcome::Recorded { value, .. } => Ok(value),
        AuditOutcome::Cancelled { attempts } => Err(format!(
            "Mining cancelled after {attempts} attempts; no change was made"
        )
        .into()),
        AuditOutcome::Exhausted => Err("Nonce space exhausted; no change was made".into()),
    }
}

fn print_chain(blockchain: &Blockchain) {
    for block in blockchain.blocks() {
        println!("{block}");
        println!("-------------------------------");
    }
}
