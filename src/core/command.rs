// Outbound command templates

use crate::core::constants::{EMPTY_SELECTION, PLACEHOLDER_INDEX, PLACEHOLDER_KIND, PLACEHOLDER_VALUE};
use crate::core::error::{ConsoleError, Result};
use std::collections::BTreeMap;

/// True when an operator field holds nothing usable.
pub fn is_empty_selection(field: &str) -> bool {
    field == EMPTY_SELECTION || field.trim().is_empty()
}

/// Turns a template such as `r <i> <val>` into the wire string for a node.
///
/// Substitution is purely textual: `<i>` first, then `<val>`, then `<x>`.
/// The result always ends with a single newline.
pub fn encode(template: &str, luminaire: &str, extra: &str) -> Result<String> {
    if is_empty_selection(luminaire) {
        return Err(ConsoleError::MissingLuminaire);
    }

    let needs_extra = template.contains(PLACEHOLDER_VALUE) || template.contains(PLACEHOLDER_KIND);
    if needs_extra && is_empty_selection(extra) {
        return Err(ConsoleError::MissingArgument {
            template: template.to_string(),
        });
    }

    let mut command = template
        .replace(PLACEHOLDER_INDEX, luminaire)
        .replace(PLACEHOLDER_VALUE, extra)
        .replace(PLACEHOLDER_KIND, extra);
    command.push('\n');
    Ok(command)
}

const STANDARD_COMMANDS: &[(&str, &str)] = &[
    ("d <i> <val>", "Set directly the duty cycle of luminaire <i>"),
    ("g d <i>", "Get current duty cycle of luminaire <i>"),
    ("r <i> <val>", "Set the illuminance reference of luminaire <i>"),
    ("g r <i>", "Get current illuminance reference of luminaire <i>"),
    ("g l <i>", "Measure the illuminance of luminaire <i>"),
    ("o <i> <val>", "Set the current occupancy state of desk <i>"),
    ("g o <i>", "Get the current occupancy state of desk <i>"),
    ("a <i> <val>", "Set anti-windup state of desk <i>"),
    ("g a <i>", "Get anti-windup state of desk <i>"),
    ("k <i> <val>", "Set feedback on/off of desk <i>"),
    ("g k <i>", "Get feedback state of desk <i>"),
    ("g x <i>", "Get current external illuminance of desk <i>"),
    ("g p <i>", "Get instantaneous power consumption of desk <i>"),
    ("g t <i>", "Get the elapsed time since the last restart"),
    (
        "s <x> <i>",
        "Start the stream of the real-time variable <x> of desk <i>. <x> can be 'l' or 'd'.",
    ),
    (
        "S <x> <i>",
        "Stop the stream of the real-time variable <x> of desk <i>. <x> can be 'l' or 'd'.",
    ),
    (
        "g b <x> <i>",
        "Get the last minute buffer of the variable <x> of the desk <i>. <x> can be 'l' or 'd'.",
    ),
    (
        "g e <i>",
        "Get the average energy consumption at the desk <i> since the last system restart.",
    ),
    (
        "g v <i>",
        "Get the average visibility error at desk <i> since the last system restart",
    ),
    (
        "g f <i>",
        "Get the average flicker error on desk <i> since the last system restart.",
    ),
    ("g O <i>", "Get the lower bound of illuminance for the occupied state on desk <i> in lux"),
    ("O <i> <val>", "Set lower bound on illuminance for the occupied state at desk <i>"),
    ("g U <i>", "Get lower bound for unoccupied desk <i>"),
    ("U <i> <val>", "Set lower bound on illuminance for the unoccupied state at desk <i>"),
    ("g L <i>", "Get current illuminance lower bound at desk <i>"),
    ("g c <i>", "Get the current cost of energy at desk <i>"),
    ("c <i> <val>", "Set the current cost of energy at desk <i>"),
    ("r", "Reset all values and recalibrate"),
];

/// Read-only table of command templates and what they do.
///
/// Listing order is the template text order.
#[derive(Debug, Clone)]
pub struct CommandCatalog {
    entries: BTreeMap<&'static str, &'static str>,
}

impl CommandCatalog {
    pub fn standard() -> Self {
        Self {
            entries: STANDARD_COMMANDS.iter().copied().collect(),
        }
    }

    pub fn describe(&self, template: &str) -> Option<&'static str> {
        self.entries.get(template).copied()
    }

    pub fn get(&self, index: usize) -> Result<&'static str> {
        self.entries
            .keys()
            .nth(index)
            .copied()
            .ok_or(ConsoleError::UnknownTemplate(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.entries.iter().map(|(t, d)| (*t, *d))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CommandCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_value_command() {
        assert_eq!(encode("r <i> <val>", "2", "300").unwrap(), "r 2 300\n");
    }

    #[test]
    fn test_encode_requires_luminaire() {
        let err = encode("r <i> <val>", "<empty>", "300").unwrap_err();
        assert!(matches!(err, ConsoleError::MissingLuminaire));
        assert!(encode("g d <i>", "  ", "<empty>").is_err());
    }

    #[test]
    fn test_encode_requires_argument_only_when_used() {
        let err = encode("o <i> <val>", "1", "<empty>").unwrap_err();
        assert!(matches!(err, ConsoleError::MissingArgument { .. }));
        assert!(encode("s <x> <i>", "1", "<empty>").is_err());
        assert_eq!(encode("g d <i>", "4", "<empty>").unwrap(), "g d 4\n");
    }

    #[test]
    fn test_encode_stream_template() {
        assert_eq!(encode("s <x> <i>", "3", "l").unwrap(), "s l 3\n");
        assert_eq!(encode("g b <x> <i>", "1", "d").unwrap(), "g b d 1\n");
    }

    #[test]
    fn test_encode_reset_all() {
        // "r" needs neither field beyond the luminaire selection
        assert_eq!(encode("r", "0", "<empty>").unwrap(), "r\n");
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = CommandCatalog::standard();
        assert_eq!(catalog.len(), STANDARD_COMMANDS.len());
        assert_eq!(
            catalog.describe("r"),
            Some("Reset all values and recalibrate")
        );
        assert!(catalog.describe("z <i>").is_none());

        let templates: Vec<&str> = catalog.iter().map(|(t, _)| t).collect();
        let mut sorted = templates.clone();
        sorted.sort();
        assert_eq!(templates, sorted);
        assert_eq!(catalog.get(0).unwrap(), templates[0]);
        assert!(matches!(
            catalog.get(catalog.len()),
            Err(ConsoleError::UnknownTemplate(_))
        ));
    }

    #[test]
    fn test_every_template_encodes() {
        let catalog = CommandCatalog::standard();
        for (template, _) in catalog.iter() {
            let wire = encode(template, "1", "5").unwrap();
            assert!(wire.ends_with('\n'));
            assert!(!wire.contains('<'), "unsubstituted placeholder in {wire:?}");
        }
    }
}
