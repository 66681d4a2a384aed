use crate::contacts::Contact;
use crate::export::unique_contacts;
use std::io::{self, Write};

/// Human-readable listing, mostly useful to eyeball what a sync would write
pub struct PlainWriter<W: Write> {
    out: W,
}

impl<W: Write> PlainWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write_listing(&mut self, contacts: &[Contact]) -> io::Result<()> {
        for contact in unique_contacts(contacts) {
            self.write_contact(contact)?;
        }
        self.out.flush()
    }

    pub fn write_contact(&mut self, contact: &Contact) -> io::Result<()> {
        if contact.nickname.is_empty() {
            writeln!(self.out, "{}", contact.full_name())?;
        } else {
            writeln!(
                self.out,
                "{} ({})",
                contact.full_name(),
                contact.nickname.join(", ")
            )?;
        }

        if !contact.organization.is_empty() {
            writeln!(self.out, "{}", contact.organization)?;
        }

        for phone in &contact.phone_numbers {
            writeln!(self.out, "{}: {}", phone.label, phone.number)?;
        }

        for addr in &contact.addresses {
            writeln!(self.out, "{}", addr.label)?;
            writeln!(self.out, "\t{}", addr.street)?;
            if let Some(neighborhood) = &addr.neighborhood {
                writeln!(self.out, "\t{}", neighborhood)?;
            }
            writeln!(
                self.out,
                "\t{}, {} {}",
                addr.city, addr.region, addr.postal_code
            )?;
            writeln!(self.out, "\t{}", addr.country)?;
        }

        for email in &contact.email {
            writeln!(
                self.out,
                "{}: {:30} {}",
                email.label,
                email.address,
                if email.is_primary { "*" } else { "" }
            )?;
        }

        writeln!(self.out)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::{EmailAddress, PhoneNumber, PostalAddress};

    #[test]
    fn test_write_contact() {
        let contact = Contact {
            first_name: "Julia".to_string(),
            last_name: "Smith".to_string(),
            nickname: vec!["Jules".to_string()],
            organization: "Fiction Department".to_string(),
            phone_numbers: vec![PhoneNumber::new("Mobile", "555-0100")],
            addresses: vec![PostalAddress {
                label: "Home".to_string(),
                street: "17 Victory Mansions".to_string(),
                neighborhood: Some("Camden".to_string()),
                city: "London".to_string(),
                region: "Airstrip One".to_string(),
                postal_code: "EC1".to_string(),
                country: "Oceania".to_string(),
            }],
            email: vec![EmailAddress::primary("Home", "julia@example.com")],
            ..Contact::new("1")
        };

        let mut writer = PlainWriter::new(Vec::new());
        writer.write_contact(&contact).unwrap();
        let output = String::from_utf8(writer.into_inner()).unwrap();

        let expected = format!(
            "Julia Smith (Jules)\n\
             Fiction Department\n\
             Mobile: 555-0100\n\
             Home\n\
             \t17 Victory Mansions\n\
             \tCamden\n\
             \tLondon, Airstrip One EC1\n\
             \tOceania\n\
             Home: {:30} *\n\n",
            "julia@example.com"
        );
        assert_eq!(output, expected);
    }

    #[test]
    fn test_listing_keeps_contacts_without_email() {
        let winston = Contact {
            first_name: "Winston".to_string(),
            ..Contact::new("2")
        };

        let mut writer = PlainWriter::new(Vec::new());
        writer
            .write_listing(&[winston.clone(), winston])
            .unwrap();
        let output = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(output, "Winston\n\n");
    }
}
