//! Block type registry: maps compact [`BlockId`] values to [`BlockDef`] metadata.
//!
//! Built once before generation starts. Air is always ID 0 so that a fresh
//! section represents empty space.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Compact block identifier stored in chunk sections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u16);

impl BlockId {
    /// The empty block.
    pub const AIR: BlockId = BlockId(0);
}

/// Descriptor for a block type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockDef {
    /// Name used by configuration (e.g. "stone", "water").
    pub name: String,
    /// Whether the block blocks motion.
    pub solid: bool,
    /// Whether the block is a fluid that needs a settle pass after placement.
    pub fluid: bool,
    /// Light emission level (0 = none, 15 = max).
    pub light_emission: u8,
}

impl BlockDef {
    /// An opaque, non-emitting solid.
    pub fn solid(name: &str) -> Self {
        Self {
            name: name.to_string(),
            solid: true,
            fluid: false,
            light_emission: 0,
        }
    }

    /// A non-emitting fluid.
    pub fn fluid(name: &str) -> Self {
        Self {
            name: name.to_string(),
            solid: false,
            fluid: true,
            light_emission: 0,
        }
    }
}

/// Errors from block registration and lookup.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A block with the same name has already been registered.
    #[error("duplicate block name: {0}")]
    DuplicateName(String),
    /// All 65 536 slots have been consumed.
    #[error("block registry is full (max 65536 types)")]
    RegistryFull,
    /// Configuration named a block that was never registered.
    #[error("unknown block: {0}")]
    UnknownBlock(String),
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Dense `BlockId -> BlockDef` table with reverse lookup by name.
#[derive(Debug)]
pub struct BlockRegistry {
    blocks: Vec<BlockDef>,
    by_name: HashMap<String, BlockId>,
}

impl BlockRegistry {
    /// A registry containing only air.
    pub fn new() -> Self {
        let air = BlockDef {
            name: "air".to_string(),
            solid: false,
            fluid: false,
            light_emission: 0,
        };
        let mut by_name = HashMap::new();
        by_name.insert(air.name.clone(), BlockId::AIR);
        Self {
            blocks: vec![air],
            by_name,
        }
    }

    /// Air, `stone` and `water`: the materials a dimension uses by default.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for def in [BlockDef::solid("stone"), BlockDef::fluid("water")] {
            // Names are distinct and the table is nearly empty.
            let _ = registry.register(def);
        }
        registry
    }

    /// Registers a block type and returns its ID.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateName`] if the name is taken,
    /// [`RegistryError::RegistryFull`] when no IDs remain.
    pub fn register(&mut self, def: BlockDef) -> Result<BlockId, RegistryError> {
        if self.by_name.contains_key(&def.name) {
            return Err(RegistryError::DuplicateName(def.name));
        }
        if self.blocks.len() > u16::MAX as usize {
            return Err(RegistryError::RegistryFull);
        }
        let id = BlockId(self.blocks.len() as u16);
        self.by_name.insert(def.name.clone(), id);
        self.blocks.push(def);
        Ok(id)
    }

    /// Definition for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this registry.
    pub fn get(&self, id: BlockId) -> &BlockDef {
        &self.blocks[id.0 as usize]
    }

    /// ID for a named block, or `None`.
    pub fn lookup_by_name(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }

    /// ID for a named block, or [`RegistryError::UnknownBlock`].
    pub fn require(&self, name: &str) -> Result<BlockId, RegistryError> {
        self.lookup_by_name(name)
            .ok_or_else(|| RegistryError::UnknownBlock(name.to_string()))
    }

    /// `true` if the block emits any light. Unknown IDs emit none.
    pub fn emits_light(&self, id: BlockId) -> bool {
        self.blocks
            .get(id.0 as usize)
            .is_some_and(|def| def.light_emission > 0)
    }

    /// Number of registered types, air included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// `true` if only air is registered.
    pub fn is_empty(&self) -> bool {
        self.blocks.len() <= 1
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
