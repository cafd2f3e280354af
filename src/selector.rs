use crate::catalog::Prefix;
use crate::errors::{BackupToolError, Result};
use crate::shared::constants::{FALLBACK_BACKUP_NAME, PREFIX_SEPARATOR};
use crate::shared::display::format_choice_label;
use crate::shared::ui::Prompter;
use chrono::{DateTime, Utc};

/// Anything that can be offered as a backup choice
pub trait BackupEntry {
    fn identity(&self) -> &str;
    fn size(&self) -> Option<u64>;
    fn last_modified(&self) -> Option<DateTime<Utc>>;
}

/// Newest first; entries without a timestamp go last. Stable for ties.
pub fn sort_newest_first<T: BackupEntry>(entries: &mut [T]) {
    entries.sort_by(|a, b| b.last_modified().cmp(&a.last_modified()));
}

/// One entry of a selection list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub identity: String,
    pub short: String,
}

/// Formats backups for selection and maps a choice back to a file name
#[derive(Debug, Clone, Default)]
pub struct BackupSelector {
    prefix: Option<Prefix>,
}

impl BackupSelector {
    /// Selector for remote keys, which carry the store prefix
    pub fn remote(prefix: Prefix) -> Self {
        Self {
            prefix: Some(prefix),
        }
    }

    /// Selector for local file names
    pub fn local() -> Self {
        Self { prefix: None }
    }

    /// Name without the prefix or trailing separator, never empty
    pub fn display_name(&self, identity: &str) -> String {
        let stripped = match &self.prefix {
            Some(prefix) => identity.strip_prefix(prefix.as_str()).unwrap_or(identity),
            None => identity,
        };
        let name = stripped.trim_end_matches(PREFIX_SEPARATOR);
        if name.is_empty() {
            FALLBACK_BACKUP_NAME.to_string()
        } else {
            name.to_string()
        }
    }

    pub fn present<T: BackupEntry>(&self, entries: &[T]) -> Vec<Choice> {
        entries
            .iter()
            .map(|entry| {
                let name = self.display_name(entry.identity());
                Choice {
                    label: format_choice_label(&name, entry.last_modified(), entry.size()),
                    identity: entry.identity().to_string(),
                    short: name,
                }
            })
            .collect()
    }

    /// Ask the operator to pick one choice
    pub fn select<'c>(
        &self,
        prompter: &dyn Prompter,
        prompt: &str,
        choices: &'c [Choice],
    ) -> Result<&'c Choice> {
        if choices.is_empty() {
            return Err(BackupToolError::InvalidSelection(
                "nothing to choose from".to_string(),
            ));
        }

        let labels: Vec<String> = choices.iter().map(|c| c.label.clone()).collect();
        let index = prompter.choose(prompt, &labels, 0)?;

        choices.get(index).ok_or_else(|| {
            BackupToolError::InvalidSelection(format!("choice {} out of range", index))
        })
    }

    /// Resolve a preselected identity, accepting either the full identity or its display name
    pub fn resolve<'c>(&self, choices: &'c [Choice], wanted: &str) -> Result<&'c Choice> {
        choices
            .iter()
            .find(|c| c.identity == wanted)
            .or_else(|| choices.iter().find(|c| c.short == wanted))
            .ok_or_else(|| BackupToolError::InvalidSelection(format!("{} is not an available backup", wanted)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::object;
    use crate::shared::ui::testing::{Answer, ScriptedPrompter};

    #[test]
    fn test_display_name_strips_prefix_and_trailing_separator() {
        let selector = BackupSelector::remote(Prefix::new("mysql-backup"));
        assert_eq!(selector.display_name("mysql-backup/a.stream"), "a.stream");
        assert_eq!(selector.display_name("mysql-backup/dir/"), "dir");
        assert_eq!(selector.display_name("other/a.stream"), "other/a.stream");
    }

    #[test]
    fn test_display_name_fallback() {
        let selector = BackupSelector::remote(Prefix::new("mysql-backup"));
        assert_eq!(selector.display_name("mysql-backup/"), "backup.stream");
        assert_eq!(BackupSelector::local().display_name(""), "backup.stream");
    }

    #[test]
    fn test_present_formats_entries() {
        let selector = BackupSelector::remote(Prefix::new("mysql-backup"));
        let choices = selector.present(&[
            object("mysql-backup/b.stream", Some(2 * 1024 * 1024), Some(0)),
            object("mysql-backup/a.stream", None, None),
        ]);

        assert_eq!(
            choices[0],
            Choice {
                label: "b.stream  (1970-01-01T00:00:00.000Z · 2.0 MB)".to_string(),
                identity: "mysql-backup/b.stream".to_string(),
                short: "b.stream".to_string(),
            }
        );
        assert_eq!(choices[1].label, "a.stream  (— · —)");
    }

    #[test]
    fn test_select_returns_chosen_identity() -> Result<()> {
        let selector = BackupSelector::remote(Prefix::new("p"));
        let choices = selector.present(&[
            object("p/new.stream", Some(1), Some(2)),
            object("p/old.stream", Some(1), Some(1)),
        ]);
        let prompter = ScriptedPrompter::new(vec![Answer::Choose(1)]);

        let chosen = selector.select(&prompter, "Choose a backup", &choices)?;
        assert_eq!(chosen.identity, "p/old.stream");
        assert_eq!(prompter.offered.borrow()[0].len(), 2);
        Ok(())
    }

    #[test]
    fn test_select_rejects_out_of_range() {
        let selector = BackupSelector::local();
        let choices = selector.present(&[object("x.stream", None, None)]);
        let prompter = ScriptedPrompter::new(vec![Answer::Choose(4)]);

        assert!(matches!(
            selector.select(&prompter, "Choose", &choices),
            Err(BackupToolError::InvalidSelection(_))
        ));
    }

    #[test]
    fn test_resolve_by_identity_or_short_name() -> Result<()> {
        let selector = BackupSelector::remote(Prefix::new("p"));
        let choices = selector.present(&[object("p/a.stream", None, None)]);

        assert_eq!(selector.resolve(&choices, "p/a.stream")?.short, "a.stream");
        assert_eq!(selector.resolve(&choices, "a.stream")?.identity, "p/a.stream");
        assert!(selector.resolve(&choices, "missing.stream").is_err());
        Ok(())
    }
}
