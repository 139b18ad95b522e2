use std::fmt;

use serde::Serialize;

use crate::error::BlockError;

pub const DEFAULT_INTERFACE: &str = "em0";

/// Number of leading "base node" characters that select the policy.
pub const PREFIX_LEN: usize = 2;

/// Which connection state gets blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlockAction {
    #[serde(rename = "1")]
    BlockOnes,
    #[serde(rename = "0")]
    BlockZeros,
}

impl BlockAction {
    /// "00" blocks the ones, "11" blocks the zeros.
    pub fn from_prefix(prefix: &str) -> Result<Self, BlockError> {
        match prefix {
            "00" => Ok(BlockAction::BlockOnes),
            "11" => Ok(BlockAction::BlockZeros),
            other => Err(BlockError::InvalidPrefix {
                prefix: other.to_string(),
            }),
        }
    }

    pub fn as_char(self) -> char {
        match self {
            BlockAction::BlockOnes => '1',
            BlockAction::BlockZeros => '0',
        }
    }

    pub fn matches(self, state: char) -> bool {
        state == self.as_char()
    }
}

/// A validated binary string split into its base nodes and connection states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryState<'a> {
    pub base_nodes: &'a str,
    pub connections: &'a str,
    pub action: BlockAction,
}

impl<'a> BinaryState<'a> {
    pub fn parse(binary: &'a str) -> Result<Self, BlockError> {
        let len = binary.chars().count();
        if len < PREFIX_LEN + 1 {
            return Err(BlockError::InvalidBinaryLength { len });
        }

        // char_indices keeps the split on a boundary even for non-ASCII input
        let split = binary
            .char_indices()
            .nth(PREFIX_LEN)
            .map(|(i, _)| i)
            .unwrap_or(binary.len());
        let (base_nodes, connections) = binary.split_at(split);
        let action = BlockAction::from_prefix(base_nodes)?;

        Ok(BinaryState {
            base_nodes,
            connections,
            action,
        })
    }

    /// Connection states paired with their position in the full string.
    pub fn positions(&self) -> impl Iterator<Item = (usize, char)> + 'a {
        self.connections
            .chars()
            .enumerate()
            .map(|(i, c)| (i + PREFIX_LEN, c))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockCommand {
    pub position: usize,
    pub interface: String,
    pub address: String,
}

impl fmt::Display for BlockCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "easyrule block {} {}", self.interface, self.address)
    }
}

/// Output of one generator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockPlan {
    pub action: BlockAction,
    pub commands: Vec<BlockCommand>,
    /// Positions that should have been blocked but had no address.
    pub missing_positions: Vec<usize>,
}

impl BlockPlan {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.commands.iter().map(ToString::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_selects_action() {
        assert_eq!(BlockAction::from_prefix("00").unwrap(), BlockAction::BlockOnes);
        assert_eq!(BlockAction::from_prefix("11").unwrap(), BlockAction::BlockZeros);
        for bad in ["01", "10", "ab", "0"] {
            assert!(matches!(
                BlockAction::from_prefix(bad),
                Err(BlockError::InvalidPrefix { .. })
            ));
        }
    }

    #[test]
    fn short_strings_are_rejected_before_the_prefix() {
        for binary in ["", "0", "01", "00"] {
            match BinaryState::parse(binary) {
                Err(BlockError::InvalidBinaryLength { len }) => {
                    assert_eq!(len, binary.len())
                }
                other => panic!("expected length error for {binary:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn positions_start_after_the_base_nodes() {
        let state = BinaryState::parse("00101").unwrap();
        assert_eq!(state.base_nodes, "00");
        assert_eq!(state.connections, "101");
        let positions: Vec<_> = state.positions().collect();
        assert_eq!(positions, vec![(2, '1'), (3, '0'), (4, '1')]);
    }

    #[test]
    fn non_ascii_prefix_is_an_invalid_prefix() {
        assert!(matches!(
            BinaryState::parse("é01"),
            Err(BlockError::InvalidPrefix { .. })
        ));
    }

    #[test]
    fn command_renders_easyrule_line() {
        let cmd = BlockCommand {
            position: 2,
            interface: DEFAULT_INTERFACE.to_string(),
            address: "10.0.0.2".to_string(),
        };
        assert_eq!(cmd.to_string(), "easyrule block em0 10.0.0.2");
    }
}
