//! Text output for fetched contacts.
//!
//! All writers share the same record policy: a contact id is written once,
//! whichever group produced it first.

pub mod bbdb;
pub mod mutt;
pub mod plain;

pub use bbdb::BbdbWriter;
pub use mutt::MuttWriter;
pub use plain::PlainWriter;

use crate::contacts::Contact;
use std::collections::HashSet;
use std::io::{self, Write};

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Bbdb,
    Mutt,
    Plain,
}

/// Contacts in order, each id once. Contacts without an id cannot be
/// matched against each other and are all kept.
pub fn unique_contacts(contacts: &[Contact]) -> impl Iterator<Item = &Contact> {
    let mut seen = HashSet::new();
    contacts
        .iter()
        .filter(move |contact| contact.id.is_empty() || seen.insert(contact.id.as_str()))
}

/// Contacts that can be written as BBDB records or aliases: each id once,
/// and only those with at least one email address
pub fn unique_with_email(contacts: &[Contact]) -> impl Iterator<Item = &Contact> {
    unique_contacts(contacts).filter(|contact| contact.has_email())
}

/// Write `contacts` to `out` in the requested format
pub fn write_contacts<W: Write>(
    out: W,
    format: OutputFormat,
    contacts: &[Contact],
) -> io::Result<()> {
    match format {
        OutputFormat::Bbdb => BbdbWriter::new(out).write_file(contacts),
        OutputFormat::Mutt => MuttWriter::new(out).write_aliases(contacts),
        OutputFormat::Plain => PlainWriter::new(out).write_listing(contacts),
    }
}
