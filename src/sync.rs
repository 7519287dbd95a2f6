use tracing::debug;

use crate::config::{Config, FileEntry};
use crate::envfile::{self, EnvFile};
use crate::error::Result;
use crate::prompt::Prompter;
use crate::reconcile::{self, Answer};
use crate::ui;

/// What happened to one output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Output did not exist and was rendered from its template.
    Created { prompted: usize },
    /// Output existed and was missing variables; `appended` lines were added.
    Updated { appended: usize },
    /// Output already defines every template key; nothing was written.
    Synced,
}

/// Tally of outcomes across a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub created: usize,
    pub updated: usize,
    pub synced: usize,
    /// Variables written from answers across all entries.
    pub filled: usize,
}

impl Summary {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Created { prompted } => {
                self.created += 1;
                self.filled += prompted;
            }
            Outcome::Updated { appended } => {
                self.updated += 1;
                self.filled += appended;
            }
            Outcome::Synced => self.synced += 1,
        }
    }
}

/// Check every template up front, then process entries in file order.
pub fn sync_all<P: Prompter>(config: &Config, prompter: &mut P) -> Result<Summary> {
    config.check_templates()?;

    let mut summary = Summary::default();
    for entry in config.entries() {
        let outcome = sync_entry(config, entry, prompter)?;
        summary.record(&outcome);
    }
    Ok(summary)
}

/// Create or update the output of a single entry.
pub fn sync_entry<P: Prompter>(
    config: &Config,
    entry: &FileEntry,
    prompter: &mut P,
) -> Result<Outcome> {
    let output_path = config.output_path(entry);
    if output_path.is_file() {
        update(config, entry, prompter)
    } else {
        create(config, entry, prompter)
    }
}

fn create<P: Prompter>(config: &Config, entry: &FileEntry, prompter: &mut P) -> Result<Outcome> {
    let template = EnvFile::read(&config.template_path(entry))?;
    let output_path = config.output_path(entry);

    ui::status(
        "Configuring",
        format!("env from {}", ui::display_path(&template.path)),
    );

    let requests = reconcile::plan_create(entry, &template.vars);
    debug!(output = %output_path.display(), requests = requests.len(), "create plan");
    let answers = prompter.ask_all(&requests)?;

    let rendered = reconcile::render_create(&template.contents, &answers);
    envfile::write(&output_path, &rendered)?;
    ui::success(
        "Created",
        format!("Successfully created {}", ui::display_path(&output_path)),
    );

    Ok(Outcome::Created {
        prompted: requests.len(),
    })
}

fn update<P: Prompter>(config: &Config, entry: &FileEntry, prompter: &mut P) -> Result<Outcome> {
    let template = EnvFile::read(&config.template_path(entry))?;
    let output = EnvFile::read(&config.output_path(entry))?;
    let shown = ui::display_path(&output.path);

    let requests = reconcile::plan_update(entry, &template.vars, &output.vars);
    debug!(output = %output.path.display(), missing = requests.len(), "update plan");
    if requests.is_empty() {
        ui::muted("Synced", format!("{shown} is synced with its template"));
        return Ok(Outcome::Synced);
    }

    ui::status(
        "Updating",
        format!(
            "{shown} is missing {} environment variables.",
            requests.len()
        ),
    );
    let answers = prompter.ask_all(&requests)?;

    let rendered = reconcile::render_update(&output.contents, &answers);
    envfile::write(&output.path, &rendered)?;
    ui::success("Updated", format!("Successfully updated {shown}"));

    Ok(Outcome::Updated {
        appended: appended_lines(&answers),
    })
}

fn appended_lines(answers: &[Answer]) -> usize {
    answers
        .iter()
        .filter(|answer| answer.value != reconcile::AnswerValue::Flag(false))
        .count()
}
