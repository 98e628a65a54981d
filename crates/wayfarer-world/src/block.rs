//! Block-state properties.
//!
//! The navigation core only needs four facts about a state id (plus a hazard
//! flag for cells that must never be entered). Unknown ids default to solid:
//! walking into an unmodeled block is cheaper than walking through one.

use std::collections::HashMap;
use std::ops::RangeInclusive;

/// Properties of one block state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockProps {
    pub solid: bool,
    pub climbable: bool,
    pub fluid: bool,
    pub transparent: bool,
    pub hazard: bool,
}

impl BlockProps {
    pub const AIR: Self = Self {
        solid: false,
        climbable: false,
        fluid: false,
        transparent: true,
        hazard: false,
    };

    pub const SOLID: Self = Self {
        solid: true,
        climbable: false,
        fluid: false,
        transparent: false,
        hazard: false,
    };

    pub const FLUID: Self = Self {
        solid: false,
        climbable: false,
        fluid: true,
        transparent: true,
        hazard: false,
    };

    pub const CLIMBABLE: Self = Self {
        solid: false,
        climbable: true,
        fluid: false,
        transparent: true,
        hazard: false,
    };

    pub const HAZARD: Self = Self {
        solid: false,
        climbable: false,
        fluid: true,
        transparent: true,
        hazard: true,
    };
}

// State-id ranges for the supported protocol's vanilla data set. Only the
// states the pathfinder must distinguish from plain terrain are listed.
const WATER_STATES: RangeInclusive<u32> = 86..=101;
const LAVA_STATES: RangeInclusive<u32> = 102..=117;
const LADDER_STATES: RangeInclusive<u32> = 4802..=4809;
const VINE_STATES: RangeInclusive<u32> = 6614..=6645;

/// Lookup from state id to properties. Ids not present resolve to
/// [`BlockProps::SOLID`]; id 0 is always air.
#[derive(Debug, Default)]
pub struct BlockRegistry {
    props: HashMap<u32, BlockProps>,
}

impl BlockRegistry {
    /// Empty registry: everything but air is solid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the vanilla states the navigation core cares
    /// about (water, lava, ladders, vines).
    pub fn vanilla() -> Self {
        let mut registry = Self::new();
        registry.insert_range(WATER_STATES, BlockProps::FLUID);
        registry.insert_range(LAVA_STATES, BlockProps::HAZARD);
        registry.insert_range(LADDER_STATES, BlockProps::CLIMBABLE);
        registry.insert_range(VINE_STATES, BlockProps::CLIMBABLE);
        registry
    }

    pub fn insert(&mut self, state_id: u32, props: BlockProps) {
        self.props.insert(state_id, props);
    }

    pub fn insert_range(&mut self, states: RangeInclusive<u32>, props: BlockProps) {
        for id in states {
            self.props.insert(id, props);
        }
    }

    /// Properties for a state id; fails closed for unknown ids.
    pub fn get(&self, state_id: u32) -> BlockProps {
        if state_id == 0 {
            return BlockProps::AIR;
        }
        self.props
            .get(&state_id)
            .copied()
            .unwrap_or(BlockProps::SOLID)
    }
}
