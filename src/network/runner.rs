//! Authority Runner
//!
//! Drives the authoritative tick loop in real time. Client messages arrive
//! on an `mpsc` channel and are folded into the next tick's commands;
//! effects and snapshots go out on a `broadcast` channel. Every tick's
//! commands are recorded so the run can be replayed and verified.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::game::command::{trigger_commands, TriggerFrame};
use crate::game::config::{ConfigError, SimConfig};
use crate::game::state::{BattleState, PlayerId};
use crate::game::tick::{replay_battle, tick, TickCommands};
use crate::network::protocol::{ClientMessage, EffectEvent, ServerMessage, WelcomeInfo, WorldSnapshot};

/// Process-level settings for the server binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Definition catalog (bundled catalog when `None`).
    pub catalog_path: Option<PathBuf>,
    /// Arena layout (default arena when `None`).
    pub arena_path: Option<PathBuf>,
    /// Authoritative tick rate (Hz).
    pub tick_rate: u32,
    /// Ticks to run before stopping.
    pub max_ticks: u32,
    /// Broadcast a snapshot every N ticks.
    pub snapshot_interval: u32,
    /// Capacity of the inbound and outbound channels.
    pub channel_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            arena_path: None,
            tick_rate: crate::TICK_RATE,
            max_ticks: 600,
            snapshot_interval: 1,
            channel_capacity: 1024,
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by `MECH_CATALOG`, `MECH_ARENA`,
    /// `MECH_TICK_RATE`, `MECH_MAX_TICKS` and `MECH_SNAPSHOT_INTERVAL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        config.catalog_path = var("MECH_CATALOG").map(PathBuf::from);
        config.arena_path = var("MECH_ARENA").map(PathBuf::from);
        if let Some(value) = var("MECH_TICK_RATE") {
            config.tick_rate = parse_positive("MECH_TICK_RATE", value)?;
        }
        if let Some(value) = var("MECH_MAX_TICKS") {
            config.max_ticks = parse_positive("MECH_MAX_TICKS", value)?;
        }
        if let Some(value) = var("MECH_SNAPSHOT_INTERVAL") {
            config.snapshot_interval = parse_positive("MECH_SNAPSHOT_INTERVAL", value)?;
        }
        Ok(config)
    }

    /// Wall-clock duration of one tick.
    pub fn tick_period(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.tick_rate.max(1) as u64)
    }
}

fn parse_positive(key: &'static str, value: String) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidEnv { key, value }),
    }
}

/// A client message tagged with its authenticated sender.
#[derive(Debug, Clone)]
pub struct Inbound {
    /// Sender.
    pub player: PlayerId,
    /// Message.
    pub message: ClientMessage,
}

/// Outcome of an authority run.
#[derive(Debug, Clone)]
pub struct BattleRecord {
    /// State before the first tick.
    pub initial: BattleState,
    /// State after the last tick.
    pub state: BattleState,
    /// Commands applied on each tick, in order.
    pub command_log: Vec<TickCommands>,
}

impl BattleRecord {
    /// Replay the log from the initial state and compare final hashes.
    pub fn verify(&self, config: &SimConfig) -> bool {
        let (replayed, _) = replay_battle(self.initial.clone(), &self.command_log, config);
        replayed.compute_hash() == self.state.compute_hash()
    }
}

/// Create the channel pair for an authority run.
pub fn channels(capacity: usize) -> (mpsc::Sender<Inbound>, mpsc::Receiver<Inbound>, broadcast::Sender<ServerMessage>) {
    let (inbound_tx, inbound_rx) = mpsc::channel(capacity);
    let (outbound_tx, _) = broadcast::channel(capacity);
    (inbound_tx, inbound_rx, outbound_tx)
}

/// Run the authoritative loop for `runtime.max_ticks` ticks.
pub async fn run_authority(
    mut state: BattleState,
    sim: SimConfig,
    runtime: RuntimeConfig,
    mut inbound: mpsc::Receiver<Inbound>,
    outbound: broadcast::Sender<ServerMessage>,
) -> BattleRecord {
    let initial = state.clone();
    let mut command_log = Vec::with_capacity(runtime.max_ticks as usize);
    let mut triggers: BTreeMap<PlayerId, TriggerFrame> = BTreeMap::new();
    let snapshot_interval = runtime.snapshot_interval.max(1);

    info!(
        battle = %hex::encode(state.battle_id),
        tick_rate = runtime.tick_rate,
        max_ticks = runtime.max_ticks,
        mechs = state.mechs.len(),
        "authority started"
    );
    // Send errors only mean nobody is subscribed
    let _ = outbound.send(ServerMessage::Welcome(WelcomeInfo::for_battle(&state, runtime.tick_rate)));

    let mut tick_interval = interval(runtime.tick_period());
    tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut connected = true;

    for _ in 0..runtime.max_ticks {
        tick_interval.tick().await;

        // Gather everything received since the last tick
        let mut commands: TickCommands = BTreeMap::new();
        while connected {
            match inbound.try_recv() {
                Ok(Inbound { player, message }) => match message {
                    ClientMessage::Command(batch) => {
                        commands.entry(player).or_default().extend(batch.commands);
                    }
                    ClientMessage::Triggers { frame, .. } => {
                        let previous = triggers.insert(player, frame).unwrap_or_default();
                        commands.entry(player).or_default().extend(trigger_commands(previous, frame));
                    }
                    ClientMessage::SyncRequest => {
                        let _ = outbound.send(ServerMessage::Snapshot(WorldSnapshot::capture(&state)));
                    }
                    ClientMessage::Ping { timestamp } => {
                        let _ = outbound.send(ServerMessage::Pong { timestamp, server_tick: state.tick });
                    }
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("inbound channel closed");
                    connected = false;
                }
            }
        }
        commands.retain(|_, list| !list.is_empty());

        let result = tick(&mut state, &commands, &sim);
        command_log.push(commands);

        for effect in result.events.iter().filter_map(EffectEvent::from_game_event) {
            let _ = outbound.send(ServerMessage::Effect(effect));
        }
        if state.tick % snapshot_interval == 0 {
            let _ = outbound.send(ServerMessage::Snapshot(WorldSnapshot::capture(&state)));
        }
    }

    info!(
        tick = state.tick,
        hash = %hex::encode(state.compute_hash()),
        "authority stopped"
    );

    BattleRecord { initial, state, command_log }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::command::MechCommand;
    use crate::game::config::ArenaLayout;
    use crate::game::test_support::{test_catalog, HEAVY_MECH, SCOUT_MECH};
    use crate::network::mirror::MirrorWorld;
    use crate::network::protocol::CommandBatch;

    fn runtime(max_ticks: u32) -> RuntimeConfig {
        RuntimeConfig { tick_rate: 1000, max_ticks, channel_capacity: 256, ..RuntimeConfig::default() }
    }

    fn battle() -> (BattleState, PlayerId, PlayerId) {
        let mut state = BattleState::new([8; 16], test_catalog(), ArenaLayout::default());
        let a = PlayerId::new([1; 16]);
        let b = PlayerId::new([2; 16]);
        state.spawn_player(a, SCOUT_MECH).unwrap();
        state.spawn_player(b, HEAVY_MECH).unwrap();
        state.take_events();
        (state, a, b)
    }

    #[test]
    fn test_runtime_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.tick_rate, 60);
        assert_eq!(config.tick_period(), Duration::from_micros(16_666));
        assert!(parse_positive("X", "0".to_string()).is_err());
        assert_eq!(parse_positive("X", " 30 ".to_string()).unwrap(), 30);
    }

    #[tokio::test]
    async fn test_authority_run_is_replayable() {
        let (state, a, b) = battle();
        let (tx, rx, out) = channels(256);
        let mut updates = out.subscribe();

        tx.send(Inbound {
            player: a,
            message: ClientMessage::Command(CommandBatch {
                tick: 1,
                commands: vec![MechCommand::RequestFire { weapon_index: 0 }],
            }),
        })
        .await
        .unwrap();
        tx.send(Inbound {
            player: b,
            message: ClientMessage::Triggers { tick: 1, frame: TriggerFrame::held(TriggerFrame::FLAG_PRIMARY) },
        })
        .await
        .unwrap();
        tx.send(Inbound { player: a, message: ClientMessage::Ping { timestamp: 5 } }).await.unwrap();
        drop(tx);

        let record = run_authority(state, SimConfig::default(), runtime(10), rx, out).await;

        assert_eq!(record.state.tick, 10);
        assert_eq!(record.command_log.len(), 10);
        assert_eq!(record.command_log[0].len(), 2);
        assert!(record.command_log[1..].iter().all(|c| c.is_empty()));
        assert!(record.verify(&SimConfig::default()));

        let mut mirror = MirrorWorld::new();
        let mut fire_effects = 0;
        while let Ok(message) = updates.try_recv() {
            if let ServerMessage::Effect(EffectEvent::WeaponFire { .. }) = message {
                fire_effects += 1;
            }
            mirror.apply(message);
        }

        assert_eq!(fire_effects, 2);
        assert!(mirror.welcome().is_some());
        assert_eq!(mirror.last_pong(), Some(5));
        assert_eq!(mirror.tick(), 10);
        assert_eq!(mirror.state_hash(), Some(record.state.compute_hash()));
    }

    #[tokio::test]
    async fn test_sync_request_sends_snapshot() {
        let (state, a, _) = battle();
        let (tx, rx, out) = channels(64);
        let mut updates = out.subscribe();

        tx.send(Inbound { player: a, message: ClientMessage::SyncRequest }).await.unwrap();
        let runtime = RuntimeConfig { snapshot_interval: 1000, ..runtime(1) };
        run_authority(state, SimConfig::default(), runtime, rx, out).await;

        let mut snapshots = Vec::new();
        while let Ok(message) = updates.try_recv() {
            if let ServerMessage::Snapshot(snapshot) = message {
                snapshots.push(snapshot);
            }
        }
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].tick, 0);
        assert_eq!(snapshots[0].mechs.len(), 2);
    }
}
