use crate::config::AppConfig;
use crate::drive::FileStore;
use crate::error::{Result, SqueezeError};
use serde::Deserialize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

/// One row of the credential table.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct CredentialRecord {
    pub username: String,
    pub password: String,
    pub folder_id: String,
}

// passwords never reach logs or debug output
impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("folder_id", &self.folder_id)
            .finish()
    }
}

/// Who is logged in and which folder they work in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub user: String,
    pub folder_id: String,
    pub is_admin: bool,
}

impl SessionContext {
    /// The same identity scoped to another folder.
    pub fn with_folder(&self, folder_id: &str) -> Self {
        Self {
            folder_id: folder_id.to_string(),
            ..self.clone()
        }
    }
}

/// Parses a CSV credential table with `username,password,folder_id` headers.
///
/// Cells are trimmed and extra columns are ignored.
pub fn parse_credential_table(bytes: &[u8]) -> Result<Vec<CredentialRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// Locates and parses the credential table; `None` when the file is absent.
pub fn fetch_credential_table(
    store: &dyn FileStore,
    table_name: &str,
    folder_id: &str,
) -> Result<Option<Vec<CredentialRecord>>> {
    let Some(file) = store.find_file(table_name, folder_id)? else {
        return Ok(None);
    };
    let bytes = store.download(&file.id)?;
    parse_credential_table(&bytes).map(Some)
}

/// Memoizes credential tables per `(table name, folder id)` until invalidated.
#[derive(Debug, Default)]
pub struct CredentialCache {
    entries: HashMap<(String, String), Vec<CredentialRecord>>,
}

impl CredentialCache {
    pub fn get_or_fetch(
        &mut self,
        store: &dyn FileStore,
        table_name: &str,
        folder_id: &str,
    ) -> Result<&[CredentialRecord]> {
        match self
            .entries
            .entry((table_name.to_string(), folder_id.to_string()))
        {
            Entry::Occupied(entry) => {
                debug!(table = table_name, "credential table served from cache");
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let records = fetch_credential_table(store, table_name, folder_id)?
                    .ok_or_else(|| SqueezeError::CredentialTableMissing {
                        table: table_name.to_string(),
                        folder_id: folder_id.to_string(),
                    })?;
                info!(table = table_name, rows = records.len(), "loaded credential table");
                Ok(entry.insert(records))
            }
        }
    }

    pub fn invalidate(&mut self, table_name: &str, folder_id: &str) {
        self.entries
            .remove(&(table_name.to_string(), folder_id.to_string()));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Validates logins against the hosted credential table.
#[derive(Debug)]
pub struct AuthGate {
    table_name: String,
    folder_id: String,
    admin_user: String,
    cache: CredentialCache,
}

impl AuthGate {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            table_name: config.credential_table.clone(),
            folder_id: config.credential_folder_id.clone(),
            admin_user: config.admin_user.clone(),
            cache: CredentialCache::default(),
        }
    }

    /// Checks a username/password pair.
    ///
    /// Fails with [`SqueezeError::CredentialTableMissing`] when the table
    /// cannot be located and [`SqueezeError::AuthenticationMismatch`] when no
    /// row matches; no session exists in either case.
    pub fn login(
        &mut self,
        store: &dyn FileStore,
        username: &str,
        password: &str,
    ) -> Result<SessionContext> {
        let records = self
            .cache
            .get_or_fetch(store, &self.table_name, &self.folder_id)?;

        let (username, password) = (username.trim(), password.trim());
        let record = records
            .iter()
            .find(|r| r.username == username && r.password == password)
            .ok_or(SqueezeError::AuthenticationMismatch)?;

        info!(user = %record.username, folder = %record.folder_id, "login succeeded");
        Ok(SessionContext {
            user: record.username.clone(),
            folder_id: record.folder_id.clone(),
            is_admin: record.username == self.admin_user,
        })
    }

    /// Drops the memoized table so the next login reads it again.
    pub fn invalidate(&mut self) {
        self.cache.invalidate(&self.table_name, &self.folder_id);
    }
}
