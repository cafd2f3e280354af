use crate::errors::Result;
use crate::shared::constants::SELECTION_PAGE_SIZE;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};

/// Interactive operator input.
///
/// The terminal implementation is used by the binaries; tests drive the
/// workflows with a scripted implementation.
pub trait Prompter {
    /// Pick one of `items`, returning its index
    fn choose(&self, prompt: &str, items: &[String], default: usize) -> Result<usize>;

    /// Yes/no question
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;

    /// Free-text answer, `default` is offered when given
    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String>;
}

/// Prompter backed by the operator's terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn choose(&self, prompt: &str, items: &[String], default: usize) -> Result<usize> {
        let selection = Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .max_length(SELECTION_PAGE_SIZE)
            .interact()?;
        Ok(selection)
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        let result = Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(result)
    }

    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::new().with_prompt(prompt);
        if let Some(d) = default {
            input = input.default(d.to_string());
        }
        Ok(input.interact_text()?)
    }
}

/// Progress bar for a download, spinner when the size is unknown
pub fn create_download_progress_bar(total: Option<u64>) -> Result<ProgressBar> {
    let pb = match total {
        Some(len) => {
            let pb = ProgressBar::new(len);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")?
                    .progress_chars("#>-"),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {bytes} {msg}")?);
            pb
        }
    };
    Ok(pb)
}
