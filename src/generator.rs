use tracing::warn;

use crate::error::BlockError;
use crate::mapping::PositionMap;
use crate::model::{BinaryState, BlockCommand, BlockPlan, DEFAULT_INTERFACE};

/// Works out which connections to block for `binary` and builds one command per
/// mapped address, in the order the positions appear in the string.
///
/// Positions that should be blocked but have no address are logged and left
/// out of the commands; they are listed in `missing_positions`.
pub fn generate_plan(
    binary: &str,
    mapping: &PositionMap,
    interface: &str,
) -> Result<BlockPlan, BlockError> {
    let state = BinaryState::parse(binary)?;
    let mut commands = Vec::new();
    let mut missing_positions = Vec::new();

    for (position, connection) in state.positions() {
        if !state.action.matches(connection) {
            continue;
        }

        match mapping.get(position) {
            Some(address) => commands.push(BlockCommand {
                position,
                interface: interface.to_string(),
                address: address.to_string(),
            }),
            None => {
                warn!("{}. Skipping.", BlockError::MissingAddress { position });
                missing_positions.push(position);
            }
        }
    }

    Ok(BlockPlan {
        action: state.action,
        commands,
        missing_positions,
    })
}

/// Command lines for `binary` against the default `em0` interface.
pub fn generate_commands(binary: &str, mapping: &PositionMap) -> Result<Vec<String>, BlockError> {
    generate_plan(binary, mapping, DEFAULT_INTERFACE).map(|plan| plan.command_lines())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BlockAction;

    fn mapping(entries: &[(usize, &str)]) -> PositionMap {
        entries
            .iter()
            .map(|(p, a)| (*p, a.to_string()))
            .collect()
    }

    #[test]
    fn zero_prefix_blocks_ones() {
        let map = mapping(&[(2, "10.0.0.2"), (3, "10.0.0.3"), (4, "10.0.0.4")]);
        let commands = generate_commands("00101", &map).unwrap();
        assert_eq!(
            commands,
            vec!["easyrule block em0 10.0.0.2", "easyrule block em0 10.0.0.4"]
        );
    }

    #[test]
    fn one_prefix_blocks_zeros() {
        let map = mapping(&[(2, "A"), (3, "B")]);
        let commands = generate_commands("1100", &map).unwrap();
        assert_eq!(commands, vec!["easyrule block em0 A", "easyrule block em0 B"]);
    }

    #[test]
    fn too_short_binary_fails() {
        let map = mapping(&[(2, "A")]);
        assert!(matches!(
            generate_commands("01", &map),
            Err(BlockError::InvalidBinaryLength { len: 2 })
        ));
    }

    #[test]
    fn bad_prefix_fails() {
        let map = mapping(&[(2, "A")]);
        match generate_commands("010", &map) {
            Err(BlockError::InvalidPrefix { prefix }) => assert_eq!(prefix, "01"),
            other => panic!("expected invalid prefix, got {other:?}"),
        }
    }

    #[test]
    fn unmapped_positions_are_skipped() {
        let map = mapping(&[(2, "10.0.0.2"), (4, "10.0.0.4")]);
        let plan = generate_plan("00111", &map, "em0").unwrap();
        assert_eq!(plan.action, BlockAction::BlockOnes);
        assert_eq!(
            plan.command_lines(),
            vec!["easyrule block em0 10.0.0.2", "easyrule block em0 10.0.0.4"]
        );
        assert_eq!(plan.missing_positions, vec![3]);
    }

    #[test]
    fn nothing_to_block_gives_an_empty_plan() {
        let map = mapping(&[(2, "A"), (3, "B")]);
        let plan = generate_plan("0000", &map, "em0").unwrap();
        assert!(plan.is_empty());
        assert!(plan.missing_positions.is_empty());
    }

    #[test]
    fn non_binary_characters_never_match() {
        let map = mapping(&[(2, "A"), (3, "B"), (4, "C")]);
        let commands = generate_commands("11x0?", &map).unwrap();
        assert_eq!(commands, vec!["easyrule block em0 B"]);
    }

    #[test]
    fn custom_interface_is_used() {
        let map = mapping(&[(2, "A")]);
        let plan = generate_plan("001", &map, "igb1").unwrap();
        assert_eq!(plan.command_lines(), vec!["easyrule block igb1 A"]);
        assert_eq!(plan.commands[0].position, 2);
    }

    #[test]
    fn generation_is_repeatable() {
        let map = mapping(&[(2, "A"), (5, "B"), (7, "C")]);
        let first = generate_commands("11010010", &map).unwrap();
        let second = generate_commands("11010010", &map).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn commands_follow_the_block_rule_for_every_position() {
        let map: PositionMap = (2..10).map(|p| (p, format!("10.0.0.{p}"))).collect();
        for binary in ["0010110100", "1101001011", "00000000", "11111111"] {
            let plan = generate_plan(binary, &map, "em0").unwrap();
            let action = plan.action.as_char();
            let expected: Vec<String> = binary
                .chars()
                .enumerate()
                .skip(2)
                .filter(|(_, c)| *c == action)
                .map(|(p, _)| format!("easyrule block em0 10.0.0.{p}"))
                .collect();
            assert_eq!(plan.command_lines(), expected, "binary {binary}");
        }
    }
}
