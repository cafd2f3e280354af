use crate::catalog::{BackupObject, ObjectCatalog, ObjectStore};
use crate::errors::Result;
use crate::selector::{BackupSelector, Choice};
use crate::shared::display::format_size;
use crate::shared::ui::{create_download_progress_bar, Prompter};
use crate::transfer::download;
use indicatif::ProgressBar;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Command-line choices for the listing tool
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Print the catalog as JSON and stop
    pub json: bool,
    /// Backup to download instead of prompting
    pub key: Option<String>,
    /// Destination instead of prompting
    pub output: Option<PathBuf>,
    pub show_progress: bool,
}

/// How a listing run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOutcome {
    NoBackups,
    Printed,
    Downloaded { path: PathBuf, bytes: u64 },
}

/// List remote backups, let the operator pick one and download it
pub async fn list_and_download<S: ObjectStore>(
    catalog: &ObjectCatalog<S>,
    prompter: &dyn Prompter,
    options: &ListOptions,
) -> Result<ListOutcome> {
    let selector = BackupSelector::remote(catalog.prefix().clone());

    if !options.json {
        info!(prefix = %catalog.prefix(), "Fetching backup list...");
    }
    let backups = catalog.list().await?;

    if options.json {
        println!("{}", catalog_json(&selector, &backups)?);
        return Ok(ListOutcome::Printed);
    }

    if backups.is_empty() {
        info!("No backups found.");
        return Ok(ListOutcome::NoBackups);
    }
    info!(count = backups.len(), "Found backups");

    let choices = selector.present(&backups);
    let chosen: &Choice = match &options.key {
        Some(key) => selector.resolve(&choices, key)?,
        None => selector.select(prompter, "Choose a backup to download", &choices)?,
    };

    let output = match &options.output {
        Some(path) => path.clone(),
        None => PathBuf::from(prompter.input("Save to path:", Some(&chosen.short))?),
    };

    let size = backups
        .iter()
        .find(|b| b.key == chosen.identity)
        .and_then(|b| b.size);
    let progress = if options.show_progress {
        create_download_progress_bar(size)?
    } else {
        ProgressBar::hidden()
    };

    info!(key = %chosen.identity, destination = %output.display(), "Downloading backup");
    let bytes = download(catalog.store(), &chosen.identity, &output, &progress).await?;
    info!(bytes, size = %format_size(Some(bytes)), "Done.");

    Ok(ListOutcome::Downloaded {
        path: output,
        bytes,
    })
}

/// `--json` document: the listed objects plus their display fields
#[derive(Serialize)]
struct CatalogListing<'a> {
    backups: Vec<CatalogEntry<'a>>,
}

#[derive(Serialize)]
struct CatalogEntry<'a> {
    #[serde(flatten)]
    object: &'a BackupObject,
    name: String,
    size_human: String,
}

fn catalog_json(selector: &BackupSelector, backups: &[BackupObject]) -> Result<String> {
    let listing = CatalogListing {
        backups: backups
            .iter()
            .map(|object| CatalogEntry {
                object,
                name: selector.display_name(&object.key),
                size_human: format_size(object.size),
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&listing)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::{object, FakeStore};
    use crate::catalog::Prefix;
    use crate::errors::BackupToolError;
    use crate::shared::ui::testing::{Answer, ScriptedPrompter};

    fn catalog(older_body: &[u8]) -> ObjectCatalog<FakeStore> {
        let store = FakeStore::with_pages(vec![
            vec![object("mysql-backup/a.stream", Some(1536), Some(100))],
            vec![
                object("mysql-backup/b.stream", Some(2 * 1024 * 1024), Some(200)),
                object("mysql-backup/readme.txt", Some(3), Some(300)),
            ],
        ])
        .with_body("mysql-backup/a.stream", older_body)
        .with_body("mysql-backup/b.stream", b"newest");
        ObjectCatalog::new(store, Prefix::new("mysql-backup"))
    }

    #[tokio::test]
    async fn test_interactive_download() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let dest = dir.path().join("restore-me.stream");
        let catalog = catalog(b"older");
        let prompter = ScriptedPrompter::new(vec![
            Answer::Choose(0),
            Answer::Input(dest.display().to_string()),
        ]);

        let outcome = list_and_download(&catalog, &prompter, &ListOptions::default()).await?;

        assert_eq!(
            outcome,
            ListOutcome::Downloaded {
                path: dest.clone(),
                bytes: 6
            }
        );
        assert_eq!(std::fs::read(&dest)?, b"newest");

        let offered = prompter.offered.borrow();
        assert_eq!(offered[0].len(), 2);
        assert!(offered[0][0].starts_with("b.stream  ("));
        assert!(offered[0][1].starts_with("a.stream  ("));
        Ok(())
    }

    #[tokio::test]
    async fn test_preselected_key_and_output_skip_prompts() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let dest = dir.path().join("a.stream");
        let catalog = catalog(b"older");
        let prompter = ScriptedPrompter::new(vec![]);
        let options = ListOptions {
            key: Some("a.stream".to_string()),
            output: Some(dest.clone()),
            ..Default::default()
        };

        let outcome = list_and_download(&catalog, &prompter, &options).await?;

        assert!(matches!(outcome, ListOutcome::Downloaded { bytes: 5, .. }));
        assert!(prompter.prompts.borrow().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_key_is_rejected() {
        let catalog = catalog(b"older");
        let prompter = ScriptedPrompter::new(vec![]);
        let options = ListOptions {
            key: Some("mysql-backup/readme.txt".to_string()),
            output: Some(PathBuf::from("unused")),
            ..Default::default()
        };

        assert!(matches!(
            list_and_download(&catalog, &prompter, &options).await,
            Err(BackupToolError::InvalidSelection(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_catalog() -> Result<()> {
        let catalog = ObjectCatalog::new(FakeStore::default(), Prefix::new("mysql-backup"));
        let prompter = ScriptedPrompter::new(vec![]);

        let outcome = list_and_download(&catalog, &prompter, &ListOptions::default()).await?;
        assert_eq!(outcome, ListOutcome::NoBackups);
        Ok(())
    }

    #[test]
    fn test_catalog_json_shape() -> Result<()> {
        let selector = BackupSelector::remote(Prefix::new("mysql-backup"));
        let rendered = catalog_json(
            &selector,
            &[
                object("mysql-backup/a.stream", Some(2048), None),
                object("mysql-backup/b.stream", None, Some(100)),
            ],
        )?;
        let value: serde_json::Value = serde_json::from_str(&rendered)?;

        let first = &value["backups"][0];
        assert_eq!(first["key"], "mysql-backup/a.stream");
        assert_eq!(first["name"], "a.stream");
        assert_eq!(first["size"], 2048);
        assert_eq!(first["size_human"], "2.0 KB");
        assert!(first["last_modified"].is_null());

        let second = &value["backups"][1];
        assert!(second["size"].is_null());
        assert_eq!(second["size_human"], "—");
        assert_eq!(second["last_modified"], "1970-01-01T00:01:40Z");
        Ok(())
    }
}
