use crate::connection::ConnectionTarget;
use crate::errors::Result;
use crate::selector::{sort_newest_first, BackupEntry, BackupSelector, Choice};
use crate::shared::commands::{ContainerInvocation, ContainerRunner, ExitOutcome, Mount, RestoreCommand};
use crate::shared::constants::{BACKUP_SUFFIX, CONTAINER_DUMP_DIR};
use crate::shared::ui::Prompter;
use chrono::{DateTime, Utc};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info, warn};

/// A backup file found in the local backup directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalBackupFile {
    pub name: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
}

impl BackupEntry for LocalBackupFile {
    fn identity(&self) -> &str {
        &self.name
    }

    fn size(&self) -> Option<u64> {
        Some(self.size)
    }

    fn last_modified(&self) -> Option<DateTime<Utc>> {
        Some(self.modified)
    }
}

/// Backup files directly inside `dir`, newest first.
///
/// Not recursive. Symlinks are followed; anything that does not end up at a
/// regular file, including dangling links, is skipped.
pub async fn find_local_backups(dir: &Path) -> Result<Vec<LocalBackupFile>> {
    let mut backups = Vec::new();
    let mut entries = fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.ends_with(BACKUP_SUFFIX) {
            continue;
        }

        let metadata = match fs::metadata(entry.path()).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(name = %name, "Skipping dangling link");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_file() {
            debug!(name = %name, "Skipping non-file entry");
            continue;
        }

        backups.push(LocalBackupFile {
            name,
            size: metadata.len(),
            modified: DateTime::<Utc>::from(metadata.modified()?),
        });
    }

    sort_newest_first(&mut backups);
    Ok(backups)
}

/// Settings for the isolated restore run
#[derive(Debug, Clone)]
pub struct RestoreSettings {
    pub backup_dir: PathBuf,
    pub image: String,
}

/// Terminal state of a restore attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Nothing to restore in the backup directory
    NoBackups,
    /// Operator declined the confirmation
    Aborted,
    Succeeded,
    /// Restore tool failed, `None` when its status is unknown
    Failed { code: Option<i32> },
}

impl RestoreOutcome {
    /// Process exit code mirroring the outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            RestoreOutcome::Aborted | RestoreOutcome::Succeeded => 0,
            RestoreOutcome::NoBackups => 1,
            RestoreOutcome::Failed { code } => match code {
                Some(c) if *c != 0 => *c,
                _ => 1,
            },
        }
    }
}

/// Drive one restore: discover, select, confirm, execute
pub struct RestoreOrchestrator<'a> {
    target: ConnectionTarget,
    settings: RestoreSettings,
    prompter: &'a dyn Prompter,
    runner: &'a dyn ContainerRunner,
    selector: BackupSelector,
}

impl<'a> RestoreOrchestrator<'a> {
    pub fn new(
        target: ConnectionTarget,
        settings: RestoreSettings,
        prompter: &'a dyn Prompter,
        runner: &'a dyn ContainerRunner,
    ) -> Self {
        Self {
            target,
            settings,
            prompter,
            runner,
            selector: BackupSelector::local(),
        }
    }

    /// Run the complete restore workflow.
    ///
    /// `preselected` names a backup file and replaces the selection prompt;
    /// the confirmation prompt is always shown.
    pub async fn execute(&self, preselected: Option<&str>) -> Result<RestoreOutcome> {
        info!(database = %self.target, "Restore target");

        // Phase 1: Discovery
        let backups = find_local_backups(&self.settings.backup_dir).await?;
        if backups.is_empty() {
            error!(
                directory = %self.settings.backup_dir.display(),
                "No {} backup files found in the directory", BACKUP_SUFFIX
            );
            return Ok(RestoreOutcome::NoBackups);
        }
        info!(count = backups.len(), "Found local backups");

        // Phase 2: Selection
        let choices = self.selector.present(&backups);
        let chosen = self.execute_selection_phase(&choices, preselected)?;
        info!(backup = %chosen.short, "Selected backup");

        // Phase 3: Confirmation
        if !self.execute_confirmation_phase(&chosen.identity)? {
            info!("Aborted.");
            return Ok(RestoreOutcome::Aborted);
        }

        // Phase 4: Execution
        self.execute_restoration_phase(&chosen.identity).await
    }

    fn execute_selection_phase<'c>(
        &self,
        choices: &'c [Choice],
        preselected: Option<&str>,
    ) -> Result<&'c Choice> {
        match preselected {
            Some(name) => self.selector.resolve(choices, name),
            None => self
                .selector
                .select(self.prompter, "Choose a backup to restore:", choices),
        }
    }

    fn execute_confirmation_phase(&self, backup_file: &str) -> Result<bool> {
        let prompt = format!(
            "This will DROP existing tables/database and restore from {}. Continue?",
            backup_file
        );
        self.prompter.confirm(&prompt, false)
    }

    /// Container invocation restoring `backup_file` from the mounted directory
    pub async fn build_invocation(&self, backup_file: &str) -> Result<ContainerInvocation> {
        let host_dir = fs::canonicalize(&self.settings.backup_dir).await?;
        let command = RestoreCommand::new(&self.target, backup_file);
        debug!(command = %command.to_redacted_line(), "Built restore command");

        Ok(ContainerInvocation {
            image: self.settings.image.clone(),
            mounts: vec![Mount {
                host_path: host_dir,
                container_path: CONTAINER_DUMP_DIR.to_string(),
            }],
            shell_command: command.to_shell_line(),
        })
    }

    async fn execute_restoration_phase(&self, backup_file: &str) -> Result<RestoreOutcome> {
        let invocation = self.build_invocation(backup_file).await?;

        info!(image = %invocation.image, "Running restore...");
        match self.runner.run(&invocation).await? {
            ExitOutcome::Success => {
                info!("Restore completed successfully.");
                Ok(RestoreOutcome::Succeeded)
            }
            ExitOutcome::Failure(code) => {
                let outcome = RestoreOutcome::Failed { code };
                error!(
                    exit_code = outcome.exit_code(),
                    raw_status = ?code,
                    "Restore failed (exit code {})",
                    outcome.exit_code()
                );
                warn!(
                    database = %self.target,
                    "Tables may have been dropped before the failure; the target database can be left partially loaded"
                );
                Ok(outcome)
            }
        }
    }
}
