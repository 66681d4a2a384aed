//! Typed view of the Google Contacts (GData v3) JSON feeds.
//!
//! Every element of the feed may be missing, so every field here is optional.
//! Repeated sub-records are decoded leniently: an element that does not match
//! its expected shape is dropped on its own instead of failing the whole feed.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;

/// A GData text node, `{"$t": "..."}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TextField {
    #[serde(rename = "$t")]
    pub text: Option<String>,
}

impl TextField {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

impl From<&str> for TextField {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Contacts feed as returned by `/m8/feeds/contacts/.../full?alt=json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactFeed {
    #[serde(default)]
    pub feed: ContactFeedBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactFeedBody {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub entry: Vec<ContactEntry>,
}

impl ContactFeed {
    pub fn entries(&self) -> &[ContactEntry] {
        &self.feed.entry
    }
}

/// One raw contact entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactEntry {
    #[serde(default, deserialize_with = "lenient_opt")]
    pub id: Option<TextField>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub updated: Option<TextField>,
    #[serde(rename = "gd$name", default, deserialize_with = "lenient_opt")]
    pub name: Option<Name>,
    #[serde(rename = "gContact$nickname", default, deserialize_with = "lenient_opt")]
    pub nickname: Option<TextField>,
    #[serde(rename = "gd$organization", default, deserialize_with = "lenient_vec")]
    pub organization: Vec<Organization>,
    #[serde(rename = "gd$phoneNumber", default, deserialize_with = "lenient_vec")]
    pub phone_number: Vec<PhoneEntry>,
    #[serde(
        rename = "gd$structuredPostalAddress",
        default,
        deserialize_with = "lenient_vec"
    )]
    pub structured_postal_address: Vec<AddressEntry>,
    #[serde(rename = "gd$email", default, deserialize_with = "lenient_vec")]
    pub email: Vec<EmailEntry>,
    #[serde(
        rename = "gContact$groupMembershipInfo",
        default,
        deserialize_with = "lenient_vec"
    )]
    pub group_membership_info: Vec<GroupMembership>,
}

impl ContactEntry {
    /// The opaque entry id, empty when the feed left it out
    pub fn id_text(&self) -> &str {
        self.id
            .as_ref()
            .and_then(|id| id.text.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Name {
    #[serde(rename = "gd$givenName", default, deserialize_with = "lenient_opt")]
    pub given_name: Option<TextField>,
    #[serde(rename = "gd$familyName", default, deserialize_with = "lenient_opt")]
    pub family_name: Option<TextField>,
    #[serde(rename = "gd$additionalName", default, deserialize_with = "lenient_opt")]
    pub additional_name: Option<TextField>,
}

impl Name {
    pub fn is_empty(&self) -> bool {
        [&self.given_name, &self.family_name, &self.additional_name]
            .iter()
            .all(|part| part.as_ref().and_then(|t| t.text.as_deref()).is_none())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Organization {
    pub rel: Option<String>,
    #[serde(rename = "gd$orgName", default, deserialize_with = "lenient_opt")]
    pub org_name: Option<TextField>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhoneEntry {
    pub rel: Option<String>,
    pub label: Option<String>,
    #[serde(rename = "$t")]
    pub number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressEntry {
    pub rel: Option<String>,
    pub label: Option<String>,
    #[serde(rename = "gd$street", default, deserialize_with = "lenient_opt")]
    pub street: Option<TextField>,
    #[serde(rename = "gd$pobox", default, deserialize_with = "lenient_opt")]
    pub po_box: Option<TextField>,
    #[serde(rename = "gd$neighborhood", default, deserialize_with = "lenient_opt")]
    pub neighborhood: Option<TextField>,
    #[serde(rename = "gd$city", default, deserialize_with = "lenient_opt")]
    pub city: Option<TextField>,
    #[serde(rename = "gd$region", default, deserialize_with = "lenient_opt")]
    pub region: Option<TextField>,
    #[serde(rename = "gd$postcode", default, deserialize_with = "lenient_opt")]
    pub postcode: Option<TextField>,
    #[serde(rename = "gd$country", default, deserialize_with = "lenient_opt")]
    pub country: Option<TextField>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailEntry {
    pub rel: Option<String>,
    pub label: Option<String>,
    pub address: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub primary: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupMembership {
    pub href: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub deleted: bool,
}

/// Groups feed as returned by `/m8/feeds/groups/.../full?alt=json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupFeed {
    #[serde(default)]
    pub feed: GroupFeedBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupFeedBody {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub entry: Vec<GroupEntry>,
}

impl GroupFeed {
    pub fn entries(&self) -> &[GroupEntry] {
        &self.feed.entry
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupEntry {
    #[serde(default, deserialize_with = "lenient_opt")]
    pub id: Option<TextField>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub title: Option<TextField>,
    #[serde(rename = "gContact$systemGroup")]
    pub system_group: Option<serde_json::Value>,
}

/// Attribute marker of a typed sub-record.
///
/// Well-known kinds carry a schema `rel` (`http://schemas.google.com/g/2005#home`),
/// user-defined kinds carry a free `label` attribute instead. The latter is
/// surfaced in `label=<value>` form so both go through the same extractor.
pub trait Marker {
    fn rel(&self) -> Option<&str>;
    fn custom_label(&self) -> Option<&str>;

    fn marker(&self) -> Option<String> {
        match (self.rel(), self.custom_label()) {
            (Some(rel), _) if !rel.is_empty() => Some(rel.to_string()),
            (_, Some(label)) if !label.is_empty() => Some(format!("label={}", label)),
            _ => None,
        }
    }
}

macro_rules! impl_marker {
    ($($ty:ty),*) => {
        $(impl Marker for $ty {
            fn rel(&self) -> Option<&str> {
                self.rel.as_deref()
            }

            fn custom_label(&self) -> Option<&str> {
                self.label.as_deref()
            }
        })*
    };
}

impl_marker!(PhoneEntry, AddressEntry, EmailEntry);

fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let items = match raw {
        None | Some(serde_json::Value::Null) => Vec::new(),
        Some(serde_json::Value::Array(items)) => items,
        // A single element where a list was expected
        Some(other) => vec![other],
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::debug!("Skipping malformed feed element: {}", e);
                None
            }
        })
        .collect())
}

fn lenient_opt<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::debug!("Skipping malformed feed field: {}", e);
            None
        }
    }))
}

/// GData encodes booleans as the strings `"true"`/`"false"`
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::Bool(b)) => b,
        Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    })
}
