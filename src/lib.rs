//! Turns a binary connection-state string and a position to address mapping
//! into pfSense `easyrule block` commands.

pub mod error;
pub mod generator;
pub mod mapping;
pub mod model;
pub mod report;

pub use error::BlockError;
pub use generator::{generate_commands, generate_plan};
pub use mapping::{load_mapping, PositionMap};
pub use model::{BinaryState, BlockAction, BlockCommand, BlockPlan};
