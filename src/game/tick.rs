//! Authoritative Simulation Tick
//!
//! The single loop that mutates battle state. Everything it does is
//! deterministic: BTreeMap iteration, fixed-point math and the seeded RNG.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::game::collision::SceneProbe;
use crate::game::combat::{self, Payload};
use crate::game::command::MechCommand;
use crate::game::config::SimConfig;
use crate::game::events::{GameEvent, GameEventData};
use crate::game::mech::{MechId, MechState};
use crate::game::projectile::{ProjectileId, StepOutcome};
use crate::game::state::{mech_colliders, BattleState, PlayerId};
use crate::game::weapon::HitCheck;

/// Commands received for one tick, per player.
pub type TickCommands = BTreeMap<PlayerId, Vec<MechCommand>>;

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick, in emission order
    pub events: Vec<GameEvent>,
    /// Hits on mechs confirmed this tick (projectile and instant)
    pub hits_confirmed: u32,
    /// Mechs that entered `Dying` this tick
    pub deaths: Vec<MechId>,
}

impl TickResult {
    /// Effect events for presentation, in emission order.
    pub fn effects(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter().filter(|e| e.data.is_effect())
    }
}

/// Run one simulation tick.
///
/// # Order
///
/// 1. Apply commands (fire/cease/transform)
/// 2. Step projectiles launched on earlier ticks and deliver payloads
/// 3. Update mechs (cooling, weapons, dying/wreck timers)
/// 4. Resolve hit checks: shooter heat, projectile launch or instant ray
/// 5. Respawn dead player mechs, remove despawning wreckage
pub fn tick(state: &mut BattleState, commands: &TickCommands, config: &SimConfig) -> TickResult {
    let mut result = TickResult::default();

    // 0. Advance tick counter
    state.tick += 1;
    state.events.begin_tick(state.tick);

    // 1. Apply player commands
    apply_commands(state, commands);

    // 2. Step projectiles
    step_projectiles(state, config, &mut result);

    // 3. Update mechs
    let checks = update_mechs(state, config);

    // 4. Resolve hit checks
    resolve_hit_checks(state, checks, config, &mut result);

    // 5. Lifecycle
    process_respawns(state);
    remove_despawned(state);

    // Collect events
    result.events = state.take_events();
    result.deaths = result
        .events
        .iter()
        .filter_map(|e| match e.data {
            GameEventData::MechStateChanged { mech, to: MechState::Dying, .. } => Some(mech),
            _ => None,
        })
        .collect();

    result
}

/// Apply commands to each player's controlled mech.
fn apply_commands(state: &mut BattleState, commands: &TickCommands) {
    // BTreeMap iterates in sorted key order - DETERMINISTIC
    for (player, list) in commands {
        let Some(mech_id) = state.controllers.get(player).copied() else {
            debug!(player = %player.to_uuid_string(), "commands from player without a mech");
            continue;
        };
        let Some(mech) = state.mechs.get_mut(&mech_id) else {
            warn!(mech = mech_id.0, "controller points at a missing mech");
            continue;
        };

        for command in list {
            match *command {
                MechCommand::RequestFire { weapon_index } => {
                    mech.commence_fire(weapon_index, &mut state.events);
                }
                MechCommand::CeaseFire { weapon_index } => {
                    mech.cease_fire(weapon_index);
                }
                MechCommand::SetTransform { position, forward, speed, turn } => {
                    mech.set_transform(position, forward, speed, turn);
                }
            }
        }
    }
}

/// Step every projectile against a snapshot of the scene.
fn step_projectiles(state: &mut BattleState, config: &SimConfig, result: &mut TickResult) {
    let probe = SceneProbe::new(mech_colliders(&state.mechs), &state.arena.colliders);
    let mut payloads = Vec::new();
    let mut expired: Vec<ProjectileId> = Vec::new();

    for (id, projectile) in state.projectiles.iter_mut() {
        match projectile.step(config.tick_rate, &probe, &mut state.events) {
            StepOutcome::Impact(_) => {
                let Some(hit) = projectile.deliver_payload() else {
                    continue;
                };
                state.events.push(GameEventData::ProjectileHit { projectile: *id, target: hit.target });
                if let Some(shooter) = projectile.owner() {
                    payloads.push(Payload {
                        shooter,
                        weapon_index: projectile.weapon_index(),
                        definition: projectile.definition().clone(),
                        struck: Some(hit.target),
                        impact_point: hit.point,
                    });
                }
            }
            StepOutcome::Expired => expired.push(*id),
            StepOutcome::Inert
            | StepOutcome::InFlight
            | StepOutcome::MaxRange
            | StepOutcome::Lingering => {}
        }
    }

    for payload in payloads {
        if combat::deliver_payload(&mut state.mechs, &payload, config.splash_origin, &mut state.events) {
            result.hits_confirmed += 1;
        }
    }

    for id in expired {
        state.projectiles.remove(&id);
        state.events.push(GameEventData::ProjectileDespawned { projectile: id });
    }
}

/// Advance every mech, collecting requested hit checks in id order.
fn update_mechs(state: &mut BattleState, config: &SimConfig) -> Vec<(MechId, u8, HitCheck)> {
    let mut checks = Vec::new();
    for (id, mech) in state.mechs.iter_mut() {
        for (weapon_index, check) in mech.update(config, &mut state.events) {
            checks.push((*id, weapon_index, check));
        }
    }
    checks
}

fn resolve_hit_checks(
    state: &mut BattleState,
    checks: Vec<(MechId, u8, HitCheck)>,
    config: &SimConfig,
    result: &mut TickResult,
) {
    for (shooter, weapon_index, check) in checks {
        // An earlier check this tick may have killed the shooter
        let Some(mech) = state.mechs.get_mut(&shooter) else {
            continue;
        };
        if mech.state() != MechState::Alive {
            continue;
        }
        let Some(definition) = mech.weapon(weapon_index as usize).map(|w| w.definition().clone()) else {
            continue;
        };
        mech.apply_heat(definition.heat_generation, &mut state.events);

        match check {
            HitCheck::SpawnProjectile => {
                state.launch_projectile(shooter, weapon_index);
            }
            HitCheck::InstantRay => {
                let probe = SceneProbe::new(mech_colliders(&state.mechs), &state.arena.colliders);
                let hit = combat::resolve_instant(
                    &mut state.mechs,
                    shooter,
                    weapon_index,
                    &definition,
                    &probe,
                    config.splash_origin,
                    &mut state.events,
                );
                if hit {
                    result.hits_confirmed += 1;
                }
            }
        }
    }
}

/// Respawn every dead mech that still has a controller.
fn process_respawns(state: &mut BattleState) {
    let requests: Vec<(MechId, PlayerId)> = state
        .mechs
        .iter_mut()
        .filter_map(|(id, mech)| mech.take_respawn_request().map(|player| (*id, player)))
        .collect();

    for (old_mech, player) in requests {
        if let Err(e) = state.respawn(player, old_mech) {
            warn!(player = %player.to_uuid_string(), error = %e, "respawn failed, retrying next tick");
            if let Some(mech) = state.mechs.get_mut(&old_mech) {
                mech.restore_respawn_request(player);
            }
        }
    }
}

fn remove_despawned(state: &mut BattleState) {
    let despawning: Vec<MechId> = state
        .mechs
        .values()
        .filter(|m| m.state() == MechState::Despawning)
        .map(|m| m.id())
        .collect();

    for id in despawning {
        state.despawn_mech(id);
    }
}

/// Replay a battle from a recorded command log.
///
/// Returns the final state and every event emitted.
pub fn replay_battle(
    initial_state: BattleState,
    command_log: &[TickCommands],
    config: &SimConfig,
) -> (BattleState, Vec<GameEvent>) {
    let mut state = initial_state;
    let mut all_events = Vec::new();

    for commands in command_log {
        let result = tick(&mut state, commands, config);
        all_events.extend(result.events);
    }

    (state, all_events)
}

// =============================================================================
// TESTS
// =============================================================================
