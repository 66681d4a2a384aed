use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

use crate::config::{AccountConfig, AppConfig};
use crate::contacts::{ContactsManager, ContactsProvider, LookupOutcome};
use crate::export::{write_contacts, OutputFormat};

const GROUP_SEPARATOR: &str =
    "========================================================================";

/// contacts2bbdb - sync Google contacts into BBDB
#[derive(Parser, Debug, Default)]
#[command(name = "contacts2bbdb")]
#[command(about = "Download Google Contacts into BBDB")]
#[command(version)]
pub struct Cli {
    /// Display information on contact groups
    #[arg(short = 'g', long)]
    pub show_groups: bool,

    /// View the raw data returned by Google Contacts for a given contact ID
    #[arg(short = 'c', long, value_name = "ID")]
    pub contact: Option<String>,

    /// Write output in mutt alias format instead of BBDB
    #[arg(short = 'm', long, conflicts_with = "plain")]
    pub mutt: bool,

    /// Write a human-readable listing instead of BBDB
    #[arg(short = 'p', long)]
    pub plain: bool,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

/// What a single invocation does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Fetch contacts and write them in the given format
    Sync(OutputFormat),
    /// List groups of every account
    ShowGroups,
    /// Print the raw data of one contact
    Lookup(String),
}

impl Cli {
    /// Determine the run mode; groups listing takes precedence over lookup
    pub fn run_mode(&self) -> RunMode {
        if self.show_groups {
            RunMode::ShowGroups
        } else if let Some(id) = &self.contact {
            RunMode::Lookup(id.clone())
        } else {
            RunMode::Sync(self.output_format())
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        if self.mutt {
            OutputFormat::Mutt
        } else if self.plain {
            OutputFormat::Plain
        } else {
            OutputFormat::Bbdb
        }
    }
}

/// Command-line interface handler
pub struct CliHandler {
    config: AppConfig,
    manager: ContactsManager,
}

impl CliHandler {
    pub fn new(config: AppConfig, provider: Box<dyn ContactsProvider>) -> Self {
        let manager = ContactsManager::new(provider, config.max_results);
        Self { config, manager }
    }

    pub fn accounts(&self) -> &[AccountConfig] {
        &self.config.accounts
    }

    /// Run one mode, writing everything meant for the user to `out`
    pub async fn run<W: Write>(&self, mode: RunMode, out: &mut W) -> Result<()> {
        match mode {
            RunMode::Sync(format) => self.handle_sync(format, out).await,
            RunMode::ShowGroups => self.handle_show_groups(out).await,
            RunMode::Lookup(id) => self.handle_lookup(&id, out).await,
        }
    }

    async fn handle_sync<W: Write>(&self, format: OutputFormat, out: &mut W) -> Result<()> {
        tracing::info!(
            "Syncing {} account(s) from {}",
            self.accounts().len(),
            self.manager.provider_name()
        );

        let contacts = self
            .manager
            .sync(self.accounts())
            .await
            .context("Failed to fetch contacts")?;

        tracing::info!("Writing {} contact(s) as {:?}", contacts.len(), format);
        write_contacts(out, format, &contacts).context("Failed to write contacts")?;
        Ok(())
    }

    async fn handle_show_groups<W: Write>(&self, out: &mut W) -> Result<()> {
        for account in self.accounts() {
            let groups = self
                .manager
                .list_groups(account)
                .await
                .with_context(|| format!("Failed to fetch groups for account {}", account.name))?;

            writeln!(out, "{}", GROUP_SEPARATOR)?;
            writeln!(out, "Account: {}", account.name)?;
            for group in groups {
                writeln!(out, "Group Name: {}", group.name)?;
                writeln!(out, "Atom Id: {}\n", group.href)?;
            }
            writeln!(out, "{}", GROUP_SEPARATOR)?;
        }

        writeln!(
            out,
            "\nFor each group you wish to sync, copy the Atom Id (the entire URI) into the\n\
             groups list of the matching account in your configuration file."
        )?;
        Ok(())
    }

    async fn handle_lookup<W: Write>(&self, contact_id: &str, out: &mut W) -> Result<()> {
        let outcome = self
            .manager
            .lookup(self.accounts(), contact_id)
            .await
            .with_context(|| format!("Failed to look up contact {}", contact_id))?;

        match outcome {
            LookupOutcome::Found(raw) => writeln!(out, "{}", raw)?,
            LookupOutcome::NoAccount => {
                writeln!(out, "No matching account to query for contact: {}", contact_id)?
            }
        }
        Ok(())
    }
}
