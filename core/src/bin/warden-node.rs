//  Copyright 2024. The Warden Project. See LICENSE for terms.

use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use warden_core::cli::Cli;
use warden_core::collab::{BroadcastEventBus, NoCheckpoints};
use warden_core::config::WardenConfig;
use warden_hashing::EpochKeyedHasher;

/// Exit codes match the collaborator interface documented for `warden-node`: `0` clean shutdown,
/// `1` initialization failure (hasher or storage), `2` corrupted state.
#[repr(i32)]
enum ExitCode {
    Clean = 0,
    InitFailure = 1,
    CorruptedState = 2,
}

fn main() {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    match main_inner() {
        Ok(()) => process::exit(ExitCode::Clean as i32),
        Err(code) => {
            error!(exit_code = code as i32, "warden-node exiting with a non-zero status");
            process::exit(code as i32);
        },
    }
}

fn main_inner() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    let config = WardenConfig::load(cli.config.as_deref()).map_err(|e| {
        error!(error = %e, "failed to load configuration");
        ExitCode::InitFailure
    })?;
    let config = cli.apply_overrides(config);

    info!(db_path = %config.db_path, "starting warden-node");

    let genesis_seed = warden_hashing::genesis_seed_from_key(&config.randomx.genesis_key);
    let hasher = EpochKeyedHasher::new(config.randomx.epoch_length, genesis_seed, config.randomx.mining_enabled);

    let _checkpoints = NoCheckpoints;
    let event_bus = Arc::new(BroadcastEventBus::new(1024));
    let _subscriber = event_bus.subscribe();

    // Storage (`ChainQuery`/`WorldState` persistence) and the P2P layer are out-of-scope
    // collaborators per the component design: this binary stands up the subsystems this crate
    // owns (the hasher, the mempool/validation pipeline scaffolding) and hands control to
    // whichever storage/network crate is wired in above it. With neither wired in here, there is
    // nothing further to run.
    info!("hasher and event bus initialized; awaiting storage/P2P collaborator wiring");

    hasher.shutdown();

    Ok(())
}
