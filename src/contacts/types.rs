/// One address-book entry, normalized for BBDB output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contact {
    pub first_name: String,
    pub last_name: String,
    /// Carried through but not written to BBDB records
    pub nickname: Vec<String>,
    pub organization: String,
    pub phone_numbers: Vec<PhoneNumber>,
    pub addresses: Vec<PostalAddress>,
    pub email: Vec<EmailAddress>,
    /// `YYYY-MM-DD`, or the raw update string when it has another shape
    pub timestamp: String,
    /// Remote identifier, unique per contact across all accounts
    pub id: String,
    pub groups: Vec<ContactGroup>,
}

impl Contact {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (true, true) => String::new(),
        }
    }

    pub fn has_email(&self) -> bool {
        !self.email.is_empty()
    }
}

/// Contact phone number
#[derive(Debug, Clone, PartialEq)]
pub struct PhoneNumber {
    pub label: String, // "Mobile", "Work", "Home", ...
    pub number: String,
}

impl PhoneNumber {
    pub fn new(label: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            number: number.into(),
        }
    }
}

/// Postal address.
///
/// `neighborhood` is only set when the remote record had both a neighborhood
/// and a city; a lone neighborhood is stored as the city.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostalAddress {
    pub label: String,
    pub street: String,
    pub neighborhood: Option<String>,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
}

/// Contact email address
#[derive(Debug, Clone, PartialEq)]
pub struct EmailAddress {
    pub label: String,
    pub address: String,
    pub is_primary: bool,
}

impl EmailAddress {
    pub fn new(label: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            address: address.into(),
            is_primary: false,
        }
    }

    pub fn primary(label: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            is_primary: true,
            ..Self::new(label, address)
        }
    }
}

/// Contact group as listed by the remote service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactGroup {
    pub href: String,
    pub name: String,
    /// Built-in groups such as "My Contacts"; never used for aliases
    pub is_system: bool,
}

impl ContactGroup {
    pub fn new(href: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            name: name.into(),
            is_system: false,
        }
    }

    pub fn system(href: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            is_system: true,
            ..Self::new(href, name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        let mut contact = Contact::new("id-1");
        assert_eq!(contact.full_name(), "");

        contact.first_name = "Winston".to_string();
        assert_eq!(contact.full_name(), "Winston");

        contact.last_name = "Smith".to_string();
        assert_eq!(contact.full_name(), "Winston Smith");

        contact.first_name.clear();
        assert_eq!(contact.full_name(), "Smith");
    }

    #[test]
    fn test_has_email() {
        let mut contact = Contact::new("id-1");
        assert!(!contact.has_email());

        contact.email.push(EmailAddress::primary("Work", "b@example.com"));
        assert!(contact.has_email());
        assert!(contact.email[0].is_primary);
    }
}
