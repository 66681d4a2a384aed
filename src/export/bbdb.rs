//! BBDB (file-version 6) records.
//!
//! Each contact is one line:
//!
//! ```text
//! ["first" "last" nil "company" (["label" "number"] ...)
//!  (["label" ("street" ["neighborhood"]) "city" "region" "postcode" "country"] ...)
//!  ("address" ...) ((timestamp . "...") (google-id . "...") [(mail-alias . "...")]) nil]
//! ```

use crate::contacts::normalize::canonicalize_group_name;
use crate::contacts::{Contact, PhoneNumber, PostalAddress};
use crate::export::unique_with_email;
use std::io::{self, Write};

pub const BBDB_HEADER: [&str; 2] = [";; -*-coding: utf-8-emacs;-*-", ";;; file-version: 6"];

pub struct BbdbWriter<W: Write> {
    out: W,
}

impl<W: Write> BbdbWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write_header(&mut self) -> io::Result<()> {
        for line in BBDB_HEADER {
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }

    /// Header plus one record per distinct contact with an email address
    pub fn write_file(&mut self, contacts: &[Contact]) -> io::Result<()> {
        self.write_header()?;
        for contact in unique_with_email(contacts) {
            writeln!(self.out, "{}", format_record(contact))?;
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Render one contact as a single-line BBDB record
pub fn format_record(contact: &Contact) -> String {
    let mut notes = format!(
        "(timestamp . {}) (google-id . {})",
        quote(&contact.timestamp),
        quote(&contact.id)
    );
    if !contact.groups.is_empty() {
        let alias = contact
            .groups
            .iter()
            .map(|group| canonicalize_group_name(&group.name))
            .collect::<Vec<_>>()
            .join(", ");
        notes.push_str(" (mail-alias . ");
        notes.push_str(&quote(&alias));
        notes.push(')');
    }

    // Nicknames are not exported, hence the nil after the last name.
    // The trailing nil is the cache slot, always nil on disk.
    format!(
        "[{} {} nil {} {} {} {} ({}) nil]",
        quote(&contact.first_name),
        quote(&contact.last_name),
        quote(&contact.organization),
        list(contact.phone_numbers.iter().map(format_phone)),
        list(contact.addresses.iter().map(format_address)),
        list(contact.email.iter().map(|email| quote(&email.address))),
        notes
    )
}

fn format_phone(phone: &PhoneNumber) -> String {
    format!("[{} {}]", quote(&phone.label), quote(&phone.number))
}

fn format_address(addr: &PostalAddress) -> String {
    let streets = match &addr.neighborhood {
        Some(neighborhood) => format!("({} {})", quote(&addr.street), quote(neighborhood)),
        None => format!("({})", quote(&addr.street)),
    };

    format!(
        "[{} {} {} {} {} {}]",
        quote(&addr.label),
        streets,
        quote(&addr.city),
        quote(&addr.region),
        quote(&addr.postal_code),
        quote(&addr.country)
    )
}

/// `nil` for an empty list, `(a b c)` otherwise
fn list(items: impl Iterator<Item = String>) -> String {
    let items: Vec<String> = items.collect();
    if items.is_empty() {
        "nil".to_string()
    } else {
        format!("({})", items.join(" "))
    }
}

/// Quote a value as an Emacs Lisp string literal
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::{ContactGroup, EmailAddress};

    /// Bracket depth outside string literals never goes negative and ends at zero
    fn is_balanced(line: &str) -> bool {
        let mut depth: i32 = 0;
        let mut in_string = false;
        let mut escaped = false;

        for c in line.chars() {
            if in_string {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '[' | '(' => depth += 1,
                ']' | ')' => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }

        depth == 0 && !in_string
    }

    fn julia() -> Contact {
        Contact {
            first_name: "Julia".to_string(),
            last_name: "Smith".to_string(),
            organization: "Fiction Department".to_string(),
            timestamp: "2011-12-04".to_string(),
            email: vec![EmailAddress::primary("Home", "julia@example.com")],
            ..Contact::new("http://www.google.com/m8/feeds/contacts/me%40gmail.com/base/1")
        }
    }

    #[test]
    fn test_minimal_record() {
        assert_eq!(
            format_record(&julia()),
            "[\"Julia\" \"Smith\" nil \"Fiction Department\" nil nil (\"julia@example.com\") \
             ((timestamp . \"2011-12-04\") \
             (google-id . \"http://www.google.com/m8/feeds/contacts/me%40gmail.com/base/1\")) nil]"
        );
    }

    #[test]
    fn test_full_record() {
        let mut contact = julia();
        contact.phone_numbers = vec![
            PhoneNumber::new("Mobile", "555-0100"),
            PhoneNumber::new("Work", "555-0199"),
        ];
        contact.addresses = vec![
            PostalAddress {
                label: "Home".to_string(),
                street: "17 Victory Mansions".to_string(),
                neighborhood: Some("Camden".to_string()),
                city: "London".to_string(),
                region: "Airstrip One".to_string(),
                postal_code: "EC1".to_string(),
                country: "Oceania".to_string(),
            },
            PostalAddress {
                label: "Work".to_string(),
                street: "Ministry of Truth".to_string(),
                city: "London".to_string(),
                ..Default::default()
            },
        ];
        contact.email.push(EmailAddress::new("Work", "jsmith@minitrue.gov"));
        contact.groups = vec![
            ContactGroup::new("g/7", "Book Club"),
            ContactGroup::new("g/8", "Anti-Sex League"),
        ];

        let record = format_record(&contact);
        assert!(record.contains(
            "([\"Mobile\" \"555-0100\"] [\"Work\" \"555-0199\"])"
        ));
        assert!(record.contains(
            "([\"Home\" (\"17 Victory Mansions\" \"Camden\") \"London\" \"Airstrip One\" \
             \"EC1\" \"Oceania\"] [\"Work\" (\"Ministry of Truth\") \"London\" \"\" \"\" \"\"])"
        ));
        assert!(record.contains("(\"julia@example.com\" \"jsmith@minitrue.gov\")"));
        assert!(record.ends_with(
            "(google-id . \"http://www.google.com/m8/feeds/contacts/me%40gmail.com/base/1\") \
             (mail-alias . \"book_club, antisex_league\")) nil]"
        ));
        assert!(is_balanced(&record));
    }

    #[test]
    fn test_quotes_and_backslashes_are_escaped() {
        let mut contact = julia();
        contact.first_name = "Big \"Brother\"".to_string();
        contact.organization = "C:\\Ingsoc (Party)".to_string();
        contact.last_name = "line\nbreak".to_string();

        let record = format_record(&contact);
        assert!(record.starts_with(
            "[\"Big \\\"Brother\\\"\" \"line\\nbreak\" nil \"C:\\\\Ingsoc (Party)\""
        ));
        assert!(!record.contains('\n'));
        assert!(is_balanced(&record));
    }

    #[test]
    fn test_records_are_balanced() {
        let mut tricky = julia();
        tricky.first_name = "[(".to_string();
        tricky.last_name = "\\".to_string();
        tricky.phone_numbers = vec![PhoneNumber::new(")", "]]")];
        tricky.groups = vec![ContactGroup::new("g", "\"quoted\" [group]")];

        for contact in [julia(), tricky] {
            assert!(is_balanced(&format_record(&contact)));
        }
    }

    #[test]
    fn test_write_file() {
        let mut no_email = julia();
        no_email.id = "other".to_string();
        no_email.email.clear();

        let contacts = vec![julia(), no_email, julia()];
        let mut writer = BbdbWriter::new(Vec::new());
        writer.write_file(&contacts).unwrap();

        let output = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], BBDB_HEADER[0]);
        assert_eq!(lines[1], BBDB_HEADER[1]);
        assert!(lines[2].starts_with("[\"Julia\" \"Smith\""));
    }

    #[test]
    fn test_empty_file_has_header_only() {
        let mut writer = BbdbWriter::new(Vec::new());
        writer.write_file(&[]).unwrap();
        let output = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(output, ";; -*-coding: utf-8-emacs;-*-\n;;; file-version: 6\n");
    }
}
