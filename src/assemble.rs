//! Turn collected answers into the argument vector handed to a scenario.

/// One accepted answer.
///
/// `value` is `None` for a flag that was switched on; declined flags and
/// skipped values never become entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerEntry {
    pub name: String,
    pub value: Option<String>,
}

impl AnswerEntry {
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

/// Flatten answers into tokens, preserving answer order.
///
/// Flags contribute their name; valued answers contribute name then value.
pub fn assemble(entries: &[AnswerEntry]) -> Vec<String> {
    let mut argv = Vec::with_capacity(entries.len() * 2);
    for entry in entries {
        argv.push(entry.name.clone());
        if let Some(value) = &entry.value {
            argv.push(value.clone());
        }
    }
    argv
}

/// Render an argument vector for display, quoting tokens that need it.
pub fn render_command(argv: &[String]) -> String {
    shell_words::join(argv)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Regroup tokens using the kind sequence the answers were produced from.
    fn regroup(tokens: &[String], takes_value: &[bool]) -> Vec<AnswerEntry> {
        let mut entries = Vec::new();
        let mut iter = tokens.iter();
        for &valued in takes_value {
            let name = iter.next().expect("name token").clone();
            let value = valued.then(|| iter.next().expect("value token").clone());
            entries.push(AnswerEntry { name, value });
        }
        assert!(iter.next().is_none(), "leftover tokens");
        entries
    }

    #[test]
    fn flags_contribute_one_token_values_two() {
        let entries = vec![
            AnswerEntry::flag("-json"),
            AnswerEntry::with_value("-loglevel", "verbose"),
            AnswerEntry::with_value("-query", "foo"),
        ];
        assert_eq!(
            assemble(&entries),
            ["-json", "-loglevel", "verbose", "-query", "foo"]
        );
    }

    #[test]
    fn regrouping_recovers_answers() {
        let entries = vec![
            AnswerEntry::flag("-csv"),
            AnswerEntry::flag("-json"),
            AnswerEntry::with_value("-loglevel", "quiet"),
            AnswerEntry::with_value("-query", "-json"),
            AnswerEntry::with_value("-name", "two words"),
        ];
        let kinds: Vec<bool> = entries.iter().map(|e| e.value.is_some()).collect();
        let tokens = assemble(&entries);
        assert_eq!(tokens.len(), 8);
        assert_eq!(regroup(&tokens, &kinds), entries);
    }

    #[test]
    fn empty_answers_assemble_to_nothing() {
        assert!(assemble(&[]).is_empty());
    }

    #[test]
    fn rendering_quotes_whitespace() {
        let argv = vec!["-query".to_string(), "two words".to_string()];
        assert_eq!(render_command(&argv), "-query 'two words'");
    }
}
