//! Player Commands
//!
//! Commands a client may ask the authority to execute on its mech. Nothing
//! here mutates state; `tick()` validates and applies them.

use serde::{Serialize, Deserialize};

use crate::core::fixed::Fixed;
use crate::core::vec3::FixedVec3;
use crate::game::weapon::WEAPON_SLOTS;

/// A command against the sender's controlled mech.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MechCommand {
    /// Pull the trigger on a weapon slot
    RequestFire {
        /// Slot index; out-of-range values are logged and ignored
        weapon_index: i32,
    },
    /// Release the trigger on a weapon slot
    CeaseFire {
        /// Slot index
        weapon_index: i32,
    },
    /// Pose from the locomotion collaborator
    SetTransform {
        /// World position
        position: FixedVec3,
        /// Facing (normalized on apply)
        forward: FixedVec3,
        /// Current speed, clamped to the mech's maximum
        speed: Fixed,
        /// Current turn rate, clamped to the mech's maximum
        turn: Fixed,
    },
}

/// Trigger state for one input frame, one bit per weapon slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerFrame {
    /// Bit `n` set = trigger `n` held
    pub flags: u8,
}

impl TriggerFrame {
    /// Primary trigger bit (slot 0)
    pub const FLAG_PRIMARY: u8 = 0x01;

    /// Secondary trigger bit (slot 1)
    pub const FLAG_SECONDARY: u8 = 0x02;

    /// Nothing held.
    pub const fn released() -> Self {
        Self { flags: 0 }
    }

    /// Frame with the given bits held.
    pub const fn held(flags: u8) -> Self {
        Self { flags }
    }

    /// Check if the trigger for `slot` is held.
    #[inline]
    pub fn is_held(&self, slot: usize) -> bool {
        slot < 8 && self.flags & (1 << slot) != 0
    }
}

/// Convert a trigger transition into commands.
///
/// A held trigger requests fire every frame (repeat requests are no-ops
/// while the weapon is busy, and refire once it is ready again). A release
/// ceases fire.
pub fn trigger_commands(previous: TriggerFrame, current: TriggerFrame) -> Vec<MechCommand> {
    let mut commands = Vec::new();
    for slot in 0..WEAPON_SLOTS {
        let weapon_index = slot as i32;
        if current.is_held(slot) {
            commands.push(MechCommand::RequestFire { weapon_index });
        } else if previous.is_held(slot) {
            commands.push(MechCommand::CeaseFire { weapon_index });
        }
    }
    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_bits() {
        let frame = TriggerFrame::held(TriggerFrame::FLAG_SECONDARY);
        assert!(!frame.is_held(0));
        assert!(frame.is_held(1));
        assert!(!frame.is_held(9));
    }

    #[test]
    fn test_trigger_commands() {
        let idle = TriggerFrame::released();
        let primary = TriggerFrame::held(TriggerFrame::FLAG_PRIMARY);
        let both = TriggerFrame::held(TriggerFrame::FLAG_PRIMARY | TriggerFrame::FLAG_SECONDARY);

        assert!(trigger_commands(idle, idle).is_empty());
        assert_eq!(trigger_commands(idle, primary), vec![MechCommand::RequestFire { weapon_index: 0 }]);
        assert_eq!(
            trigger_commands(both, primary),
            vec![MechCommand::RequestFire { weapon_index: 0 }, MechCommand::CeaseFire { weapon_index: 1 }]
        );
        assert_eq!(trigger_commands(primary, idle), vec![MechCommand::CeaseFire { weapon_index: 0 }]);
    }

    #[test]
    fn test_command_wire_format() {
        let command = MechCommand::RequestFire { weapon_index: 1 };
        let bytes = bincode::serialize(&command).unwrap();
        assert_eq!(bincode::deserialize::<MechCommand>(&bytes).unwrap(), command);
    }
}
