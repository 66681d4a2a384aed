use crate::contacts::feed::{AddressEntry, ContactEntry, EmailEntry, Marker, PhoneEntry};
use crate::contacts::groups::GroupCatalog;
use crate::contacts::normalize::{canonicalize_date, label_from_rel, safe_str, safe_text};
use crate::contacts::types::{Contact, EmailAddress, PhoneNumber, PostalAddress};

/// Turn one raw feed entry into a [`Contact`].
///
/// Entries without any name component are skipped and yield `None`.
/// BBDB only knows first and last names, so an additional (middle) name is
/// appended to the first name.
pub fn build_contact(entry: &ContactEntry, catalog: &GroupCatalog) -> Option<Contact> {
    let name = entry.name.as_ref().filter(|name| !name.is_empty())?;

    let mut contact = Contact::new(entry.id_text());

    contact.first_name = safe_text(name.given_name.as_ref());
    contact.last_name = safe_text(name.family_name.as_ref());
    let additional = safe_text(name.additional_name.as_ref());
    if !additional.is_empty() {
        if !contact.first_name.is_empty() {
            contact.first_name.push(' ');
        }
        contact.first_name.push_str(&additional);
    }

    let nickname = safe_text(entry.nickname.as_ref());
    if !nickname.is_empty() {
        contact.nickname.push(nickname);
    }

    contact.organization = entry
        .organization
        .first()
        .map(|org| safe_text(org.org_name.as_ref()))
        .unwrap_or_default();

    contact.phone_numbers = entry.phone_number.iter().map(parse_phone).collect();
    contact.addresses = entry
        .structured_postal_address
        .iter()
        .map(parse_address)
        .collect();
    contact.email = entry.email.iter().filter_map(parse_email).collect();

    contact.timestamp = canonicalize_date(&safe_text(entry.updated.as_ref()));

    for membership in &entry.group_membership_info {
        if membership.deleted {
            continue;
        }
        let Some(href) = membership.href.as_deref() else {
            continue;
        };
        if let Some(group) = catalog.resolve(href) {
            contact.groups.push(group.clone());
        }
    }

    Some(contact)
}

fn parse_phone(phone: &PhoneEntry) -> PhoneNumber {
    PhoneNumber::new(
        label_from_rel(phone.marker().as_deref()),
        safe_str(phone.number.as_deref()),
    )
}

/// Some address books file the city under "neighborhood". A lone
/// neighborhood is therefore treated as the city; when both exist the
/// neighborhood becomes the second street line.
fn parse_address(addr: &AddressEntry) -> PostalAddress {
    let street = if addr.po_box.is_some() {
        safe_text(addr.po_box.as_ref())
    } else {
        safe_text(addr.street.as_ref())
    };

    let neighborhood = safe_text(addr.neighborhood.as_ref());
    let city = safe_text(addr.city.as_ref());
    let (neighborhood, city) = match (neighborhood.is_empty(), city.is_empty()) {
        (false, true) => (None, neighborhood),
        (false, false) => (Some(neighborhood), city),
        (true, _) => (None, city),
    };

    PostalAddress {
        label: label_from_rel(addr.marker().as_deref()),
        street,
        neighborhood,
        city,
        region: safe_text(addr.region.as_ref()),
        postal_code: safe_text(addr.postcode.as_ref()),
        country: safe_text(addr.country.as_ref()),
    }
}

fn parse_email(email: &EmailEntry) -> Option<EmailAddress> {
    let address = match email.address.as_deref().map(str::trim) {
        Some(address) if !address.is_empty() => address.to_string(),
        _ => {
            tracing::debug!("Skipping email record without an address");
            return None;
        }
    };

    let label = label_from_rel(email.marker().as_deref());
    Some(if email.primary {
        EmailAddress::primary(label, address)
    } else {
        EmailAddress::new(label, address)
    })
}
