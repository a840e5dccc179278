//! Mechwar Battle Server
//!
//! Runs a demo battle on the real-time authority loop with scripted
//! clients, then replays the recorded command log to verify determinism.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mechwar::{
    BUNDLED_CATALOG, TICK_RATE, VERSION,
    core::TickRate,
    game::{
        command::TriggerFrame,
        config::{ArenaLayout, SimConfig},
        definitions::DefinitionCatalog,
        state::{BattleState, PlayerId},
    },
    network::{
        protocol::{ClientMessage, EffectEvent, ServerMessage},
        runner::{channels, run_authority, Inbound, RuntimeConfig},
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Mechwar Server v{}", VERSION);
    info!("Default Tick Rate: {} Hz", TICK_RATE);

    let runtime = RuntimeConfig::from_env().context("invalid runtime configuration")?;
    let sim = SimConfig {
        tick_rate: TickRate::new(runtime.tick_rate),
        ..SimConfig::from_env().context("invalid simulation configuration")?
    };

    let catalog = match &runtime.catalog_path {
        Some(path) => DefinitionCatalog::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => DefinitionCatalog::from_json(BUNDLED_CATALOG).context("bundled catalog")?,
    };
    let arena = match &runtime.arena_path {
        Some(path) => ArenaLayout::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => ArenaLayout::default(),
    };
    info!(
        "Catalog {} ({} mech types), arena '{}'",
        hex::encode(&catalog.fingerprint()[..8]),
        catalog.mech_ids().count(),
        arena.name
    );

    demo_battle(catalog, arena, sim, runtime).await
}

/// Run a scripted battle and verify it by replay.
async fn demo_battle(catalog: DefinitionCatalog, arena: ArenaLayout, sim: SimConfig, runtime: RuntimeConfig) -> Result<()> {
    info!("=== Starting Demo Battle ===");

    let battle_id = *uuid::Uuid::new_v4().as_bytes();
    let mech_types: Vec<u32> = catalog.mech_ids().collect();
    let mut state = BattleState::new(battle_id, catalog, arena);

    info!("Battle ID: {}", hex::encode(battle_id));
    info!("RNG Seed: {}", state.rng_seed);

    // Add players
    let players: Vec<PlayerId> = (0..4).map(|_| PlayerId::random()).collect();
    for (i, player) in players.iter().enumerate() {
        let mech_type = mech_types[i % mech_types.len()];
        let mech = state.spawn_player(*player, mech_type)?;
        let (x, y, z) = state.mech(mech).map(|m| m.position().to_floats()).unwrap_or_default();
        info!("Player {} in mech {} (type {}) at ({:.1}, {:.1}, {:.1})", &player.to_uuid_string()[..8], mech.0, mech_type, x, y, z);
    }
    state.take_events();

    let (inbound, inbound_rx, outbound) = channels(runtime.channel_capacity);
    let mut updates = outbound.subscribe();
    let max_ticks = runtime.max_ticks;
    let period = runtime.tick_period();
    let authority = tokio::spawn(run_authority(state, sim.clone(), runtime, inbound_rx, outbound));

    // Scripted clients: each player pulses its triggers on its own rhythm
    let clients = tokio::spawn(async move {
        for t in 0..max_ticks {
            for (i, player) in players.iter().enumerate() {
                let rhythm = 20 + 7 * i as u32;
                let mut flags = 0;
                if t % rhythm < rhythm / 2 {
                    flags |= TriggerFrame::FLAG_PRIMARY;
                }
                if (t / rhythm) % 3 == 1 {
                    flags |= TriggerFrame::FLAG_SECONDARY;
                }
                let message = ClientMessage::Triggers { tick: t, frame: TriggerFrame::held(flags) };
                if inbound.send(Inbound { player: *player, message }).await.is_err() {
                    return;
                }
            }
            tokio::time::sleep(period).await;
        }
    });

    // Observer: tally effects as a presentation client would
    let observer = tokio::spawn(async move {
        let (mut fires, mut impacts, mut deaths) = (0u32, 0u32, 0u32);
        loop {
            match updates.recv().await {
                Ok(ServerMessage::Effect(EffectEvent::WeaponFire { .. })) => fires += 1,
                Ok(ServerMessage::Effect(EffectEvent::ProjectileImpact { .. } | EffectEvent::BeamImpact { .. })) => impacts += 1,
                Ok(ServerMessage::Effect(EffectEvent::MechDeath { tick, mech })) => {
                    deaths += 1;
                    info!("Tick {}: mech {} destroyed", tick, mech);
                }
                Ok(_) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("observer lagged by {} messages", n);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
        (fires, impacts, deaths)
    });

    let record = authority.await.context("authority task")?;
    clients.abort();
    let (fires, impacts, deaths) = tokio::time::timeout(Duration::from_secs(5), observer)
        .await
        .context("observer did not finish")?
        .context("observer task")?;

    // Print final results
    info!("=== Battle Results ===");
    info!("Weapon fire effects: {}, impacts: {}, deaths: {}", fires, impacts, deaths);
    for mech in record.state.mechs.values() {
        info!(
            "Mech {} ({:?}): health {:.1}, heat {:.1}",
            mech.id().0,
            mech.state(),
            mechwar::core::fixed::to_float(mech.current_health()),
            mechwar::core::fixed::to_float(mech.current_heat()),
        );
    }
    let hash = record.state.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    if record.verify(&sim) {
        info!("DETERMINISM VERIFIED: replay of {} ticks matches", record.command_log.len());
        Ok(())
    } else {
        bail!("DETERMINISM FAILURE: replay hash differs");
    }
}
