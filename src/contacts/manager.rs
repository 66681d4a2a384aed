use crate::config::AccountConfig;
use crate::contacts::{
    build_contact, Contact, ContactGroup, ContactsProvider, ContactsResult, GroupCatalog,
    GroupFeed,
};
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;

static CONTACT_LOGIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/contacts/([^/]+)/").expect("valid contact id regex"));

/// Result of a single-contact debug lookup
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// Raw response for the contact
    Found(String),
    /// No configured account owns the id
    NoAccount,
}

/// Orchestrates group and contact retrieval across accounts
pub struct ContactsManager {
    provider: Box<dyn ContactsProvider>,
    max_results: usize,
}

impl ContactsManager {
    /// Create a new contacts manager
    pub fn new(provider: Box<dyn ContactsProvider>, max_results: usize) -> Self {
        Self {
            provider,
            max_results,
        }
    }

    /// Fetch and sort the contacts of every account
    pub async fn sync(&self, accounts: &[AccountConfig]) -> ContactsResult<Vec<Contact>> {
        let catalog = self.build_group_catalog(accounts).await?;
        self.collect_contacts(accounts, &catalog).await
    }

    /// Groups of all accounts, merged by href. Later accounts win collisions.
    pub async fn build_group_catalog(
        &self,
        accounts: &[AccountConfig],
    ) -> ContactsResult<GroupCatalog> {
        let mut catalog = GroupCatalog::new();

        for account in accounts {
            let feed = self.fetch_groups(account).await?;
            let account_groups = GroupCatalog::from_feed(&feed);
            tracing::info!(
                "Found {} group(s) for account {}",
                account_groups.len(),
                account.name
            );
            catalog.merge(account_groups);
        }

        Ok(catalog)
    }

    /// Fetch the restricted groups of every account and build contacts.
    ///
    /// Contacts that belong to several groups appear once per group; the
    /// writers drop the repeats. The result is sorted by last name,
    /// case-insensitively, keeping fetch order for equal names.
    pub async fn collect_contacts(
        &self,
        accounts: &[AccountConfig],
        catalog: &GroupCatalog,
    ) -> ContactsResult<Vec<Contact>> {
        let mut contacts = Vec::new();

        for account in accounts {
            let Some(groups) = &account.groups else {
                tracing::info!("No groups configured for account {}, skipping", account.name);
                continue;
            };

            for group in groups {
                let feed = self
                    .provider
                    .fetch_contacts(account, group, self.max_results)
                    .await?;
                let entries = feed.entries();

                if entries.len() >= self.max_results {
                    tracing::warn!(
                        "Group {} of account {} returned {} entries, the per-group limit; \
                         some contacts may be missing",
                        group,
                        account.name,
                        entries.len()
                    );
                }

                let before = contacts.len();
                contacts.extend(entries.iter().filter_map(|entry| build_contact(entry, catalog)));
                tracing::info!(
                    "Fetched {} contact(s) ({} entries) from group {} of account {}",
                    contacts.len() - before,
                    entries.len(),
                    group,
                    account.name
                );
            }
        }

        sort_by_last_name(&mut contacts);
        Ok(contacts)
    }

    /// All groups of one account, system groups included
    pub async fn list_groups(&self, account: &AccountConfig) -> ContactsResult<Vec<ContactGroup>> {
        let feed = self.fetch_groups(account).await?;
        Ok(GroupCatalog::from_feed(&feed).iter().cloned().collect())
    }

    async fn fetch_groups(&self, account: &AccountConfig) -> ContactsResult<GroupFeed> {
        let feed = self.provider.fetch_groups(account, self.max_results).await?;
        if feed.entries().len() >= self.max_results {
            tracing::warn!(
                "Account {} returned {} groups, the per-query limit; some groups may be missing",
                account.name,
                feed.entries().len()
            );
        }
        Ok(feed)
    }

    /// Look up one contact through the account that owns its id
    pub async fn lookup(
        &self,
        accounts: &[AccountConfig],
        contact_id: &str,
    ) -> ContactsResult<LookupOutcome> {
        let Some(login) = login_from_contact_id(contact_id) else {
            return Ok(LookupOutcome::NoAccount);
        };

        match accounts.iter().find(|account| account.login == login) {
            Some(account) => {
                let raw = self.provider.lookup_contact(account, contact_id).await?;
                Ok(LookupOutcome::Found(raw))
            }
            None => Ok(LookupOutcome::NoAccount),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }
}

/// Stable, case-insensitive sort on last name
pub fn sort_by_last_name(contacts: &mut [Contact]) {
    contacts.sort_by_cached_key(|contact| contact.last_name.to_lowercase());
}

/// Extract the owning login from a contact id such as
/// `http://www.google.com/m8/feeds/contacts/me%40gmail.com/base/1a2b`
pub fn login_from_contact_id(contact_id: &str) -> Option<String> {
    let captures = CONTACT_LOGIN.captures(contact_id)?;
    let encoded = captures.get(1)?.as_str();
    Some(percent_decode_str(encoded).decode_utf8_lossy().into_owned())
}
