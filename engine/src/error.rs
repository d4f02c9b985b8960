use thiserror::Error;

use crate::abilities::{Ability, Targeting};
use crate::dungeon::{Direction, RoomId};
use crate::equipment::Slot;
use crate::items::ItemId;
use crate::unit::UnitId;

/// Why a rules operation was refused. A refused call never changes state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("{item:?} cannot be placed in the {slot:?} slot")]
    InvalidSlot { item: ItemId, slot: Slot },

    #[error("{unit:?} does not hold {item:?}")]
    ItemNotOwned { unit: UnitId, item: ItemId },

    #[error("{0:?} has no weapon equipped")]
    NoWeaponEquipped(UnitId),

    #[error("weapon {0:?} is broken")]
    DurabilityExhausted(ItemId),

    #[error("{unit:?} has not learned {ability:?}")]
    AbilityNotOwned { unit: UnitId, ability: Ability },

    #[error("{target:?} is not a valid {rule:?} target for {actor:?}")]
    TargetingRuleViolation {
        actor: UnitId,
        target: UnitId,
        rule: Targeting,
    },

    #[error("{0:?} carries nothing that can be stolen")]
    NoStealableItem(UnitId),

    #[error("no exit {direction:?} from {room:?}")]
    NoExit { room: RoomId, direction: Direction },

    #[error("{0:?} is not in any room")]
    NotInRoom(UnitId),

    #[error("unknown unit {0:?}")]
    UnknownUnit(UnitId),

    #[error("unknown item {0:?}")]
    UnknownItem(ItemId),

    #[error("unknown room {0:?}")]
    UnknownRoom(RoomId),

    #[error("{0:?} is defeated")]
    UnitDefeated(UnitId),

    #[error("{0:?} cannot be used")]
    NotUsable(ItemId),
}

/// Failures while assembling a [`crate::World`].
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("unknown item key '{0}'")]
    UnknownItemKey(String),

    #[error("unknown room key '{0}'")]
    UnknownRoomKey(String),

    #[error("duplicate key '{0}'")]
    DuplicateKey(String),

    #[error("dungeon '{0}' has no rooms")]
    EmptyDungeon(String),

    #[error("{item:?} is already bound to {owner:?}")]
    SharedItem { item: ItemId, owner: UnitId },

    #[error("cannot place units: the world has no rooms")]
    NoRooms,

    #[error("unit '{unit}': {source}")]
    Rule {
        unit: String,
        #[source]
        source: RuleError,
    },

    #[error(transparent)]
    Invalid(#[from] RuleError),
}
