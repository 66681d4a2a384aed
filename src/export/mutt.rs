use crate::contacts::Contact;
use crate::export::unique_with_email;
use std::collections::HashMap;
use std::io::{self, Write};

/// Writes `alias <nick> <full name> <<address>>` lines for mutt.
///
/// Nicks come from the first word of the lowercased first name. The first
/// use of a nick is bare, later ones get 1, 2, ... appended.
pub struct MuttWriter<W: Write> {
    out: W,
    nicks: HashMap<String, usize>,
}

impl<W: Write> MuttWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            nicks: HashMap::new(),
        }
    }

    /// One alias per email address of each distinct contact
    pub fn write_aliases(&mut self, contacts: &[Contact]) -> io::Result<()> {
        for contact in unique_with_email(contacts) {
            for email in &contact.email {
                let nick = self.next_nick(contact);
                writeln!(
                    self.out,
                    "{}",
                    format_alias(&nick, &contact.full_name(), &email.address)
                )?;
            }
        }
        self.out.flush()
    }

    fn next_nick(&mut self, contact: &Contact) -> String {
        let base = nick_base(contact);
        match self.nicks.get_mut(&base) {
            Some(count) => {
                let nick = format!("{}{}", base, count);
                *count += 1;
                nick
            }
            None => {
                self.nicks.insert(base.clone(), 1);
                base
            }
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// First word of the lowercased first name, falling back to the last name
/// for contacts that only have one
fn nick_base(contact: &Contact) -> String {
    contact
        .first_name
        .split_whitespace()
        .next()
        .or_else(|| contact.last_name.split_whitespace().next())
        .map(str::to_lowercase)
        .unwrap_or_else(|| "contact".to_string())
}

pub fn format_alias(nick: &str, full_name: &str, address: &str) -> String {
    format!("alias {} {} <{}>", nick, full_name, address)
}
