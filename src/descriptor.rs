//! Typed model of a scenario's command-line surface.
//!
//! A descriptor set is built fresh for each invocation and discarded once the
//! argument vector has been assembled.
use serde::{Deserialize, Serialize};

/// Help text used when a declaration carries none.
pub const DEFAULT_HELP: &str = "No description available";

/// Option name of the well-known log-verbosity switch.
pub const LOGLEVEL_OPTION: &str = "-loglevel";

/// Fixed choice set of the log-verbosity switch, in display order.
pub const LOGLEVEL_CHOICES: [&str; 3] = ["quiet", "info", "verbose"];

/// Default of the log-verbosity switch.
pub const LOGLEVEL_DEFAULT: &str = "info";

/// How a declared option takes (or does not take) a value.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArgumentKind {
    /// Presence-only switch.
    Flag,
    /// Exactly one value out of an enumerated, ordered set.
    Choice { choices: Vec<String> },
    /// Free-form text.
    Value,
}

/// One option declared by a scenario program.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ArgumentDescriptor {
    pub name: String,
    #[serde(flatten)]
    pub kind: ArgumentKind,
    #[serde(default = "default_help")]
    pub help: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

fn default_help() -> String {
    DEFAULT_HELP.to_string()
}

impl ArgumentDescriptor {
    pub fn flag(name: impl Into<String>, help: Option<String>) -> Self {
        Self {
            name: name.into(),
            kind: ArgumentKind::Flag,
            help: help.unwrap_or_else(default_help),
            default: None,
        }
    }

    pub fn choice(
        name: impl Into<String>,
        help: Option<String>,
        choices: Vec<String>,
        default: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: ArgumentKind::Choice { choices },
            help: help.unwrap_or_else(default_help),
            default,
        }
    }

    pub fn value(name: impl Into<String>, help: Option<String>, default: Option<String>) -> Self {
        Self {
            name: name.into(),
            kind: ArgumentKind::Value,
            help: help.unwrap_or_else(default_help),
            default,
        }
    }

    /// The log-verbosity switch with its fixed choice set.
    pub fn loglevel() -> Self {
        Self::choice(
            LOGLEVEL_OPTION,
            Some("Set log level".to_string()),
            LOGLEVEL_CHOICES.iter().map(|c| c.to_string()).collect(),
            Some(LOGLEVEL_DEFAULT.to_string()),
        )
    }

    /// Allowed values; empty unless the descriptor is a choice.
    pub fn choices(&self) -> &[String] {
        match &self.kind {
            ArgumentKind::Choice { choices } => choices,
            ArgumentKind::Flag | ArgumentKind::Value => &[],
        }
    }

    /// The default, if it is usable for this kind.
    ///
    /// A choice default outside the choice set is treated as absent.
    pub fn effective_default(&self) -> Option<&str> {
        let default = self.default.as_deref()?;
        match &self.kind {
            ArgumentKind::Choice { choices } => {
                choices.iter().any(|c| c == default).then_some(default)
            }
            ArgumentKind::Value => Some(default),
            ArgumentKind::Flag => None,
        }
    }

    pub fn is_loglevel(&self) -> bool {
        self.name == LOGLEVEL_OPTION
    }
}

/// Descriptors partitioned by kind, each partition in declaration order.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct DescriptorSet {
    pub flags: Vec<ArgumentDescriptor>,
    pub choices: Vec<ArgumentDescriptor>,
    pub values: Vec<ArgumentDescriptor>,
}

impl DescriptorSet {
    /// Add a descriptor to its partition; the first descriptor for a name wins.
    ///
    /// Returns false when the name was already present.
    pub fn insert(&mut self, descriptor: ArgumentDescriptor) -> bool {
        if self.contains(&descriptor.name) {
            return false;
        }
        match descriptor.kind {
            ArgumentKind::Flag => self.flags.push(descriptor),
            ArgumentKind::Choice { .. } => self.choices.push(descriptor),
            ArgumentKind::Value => self.values.push(descriptor),
        }
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.iter().any(|d| d.name == name)
    }

    /// Flags, then choices, then values.
    pub fn iter(&self) -> impl Iterator<Item = &ArgumentDescriptor> {
        self.flags
            .iter()
            .chain(self.choices.iter())
            .chain(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.flags.len() + self.choices.len() + self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_default_outside_set_is_ignored() {
        let descriptor = ArgumentDescriptor::choice(
            "-mode",
            None,
            vec!["fast".to_string(), "slow".to_string()],
            Some("medium".to_string()),
        );
        assert_eq!(descriptor.effective_default(), None);
        assert_eq!(descriptor.help, DEFAULT_HELP);
    }

    #[test]
    fn insert_keeps_first_occurrence() {
        let mut set = DescriptorSet::default();
        assert!(set.insert(ArgumentDescriptor::flag("-json", None)));
        assert!(!set.insert(ArgumentDescriptor::value("-json", None, None)));
        assert_eq!(set.flags.len(), 1);
        assert!(set.values.is_empty());
    }

    #[test]
    fn manifest_entries_deserialize_by_kind() {
        let json = r#"[
            {"name": "-json", "kind": "flag", "help": "Write JSON"},
            {"name": "-loglevel", "kind": "choice", "choices": ["quiet", "info"], "default": "info"},
            {"name": "-query", "kind": "value"}
        ]"#;
        let parsed: Vec<ArgumentDescriptor> = serde_json::from_str(json).expect("parse");
        assert_eq!(parsed[0].kind, ArgumentKind::Flag);
        assert_eq!(parsed[1].choices(), ["quiet", "info"]);
        assert_eq!(parsed[1].effective_default(), Some("info"));
        assert_eq!(parsed[2].kind, ArgumentKind::Value);
        assert_eq!(parsed[2].help, DEFAULT_HELP);
    }
}
