use crate::error::{ErrorType, IntoResult};
use crate::export;
use crate::model::Profile;
use crate::{utils, Result};
use anyhow::{anyhow, Context};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// A way of reaching a user, used to find their account when they forget the password.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Contact {
    Email(String),
    Phone(String),
}

/// User profiles keyed by username, backed by a JSON object in a file.
///
/// Persistence follows `TransactionStore`: every upsert rewrites the whole file, a failed
/// write leaves the in-memory map as it was and an unreadable file is copied aside first.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
    profiles: BTreeMap<String, Profile>,
    unreadable: bool,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            profiles: BTreeMap::new(),
            unreadable: false,
        }
    }

    /// Creates a store backed by `path` and loads it. A file that cannot be loaded leaves the
    /// store empty; the problem is logged.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut store = Self::new(path);
        if let Err(e) = store.load() {
            error!("Starting with no user profiles: {e:#}");
        }
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the in-memory profiles with the contents of the backing file. A missing file is
    /// an empty store; entries that are not objects are skipped.
    pub fn load(&mut self) -> Result<usize> {
        self.profiles.clear();
        self.unreadable = false;
        if !self.path.exists() {
            debug!("No users file at {}", self.path.display());
            return Ok(0);
        }
        let entries = read_entries(&self.path)
            .inspect_err(|_| self.unreadable = true)
            .pub_result(ErrorType::Io)?;
        for (username, value) in entries {
            match serde_json::from_value::<Profile>(value) {
                Ok(profile) => {
                    self.profiles.insert(username, profile);
                }
                Err(e) => warn!("Skipping profile '{username}': {e}"),
            }
        }
        debug!("Loaded {} profiles", self.profiles.len());
        Ok(self.profiles.len())
    }

    pub fn save(&mut self) -> Result<()> {
        if self.unreadable && self.path.exists() {
            let aside = utils::set_aside(&self.path)
                .context("Unable to keep a copy of the unreadable users file")
                .pub_result(ErrorType::Io)?;
            warn!("The unreadable users file was copied to {}", aside.display());
        }
        utils::write_json(&self.path, &self.profiles)
            .context("Unable to save user profiles")
            .pub_result(ErrorType::Io)?;
        self.unreadable = false;
        Ok(())
    }

    pub fn get(&self, username: &str) -> Option<&Profile> {
        self.profiles.get(username)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.profiles.contains_key(username)
    }

    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Inserts or replaces the whole profile for `username` and saves.
    pub fn upsert(&mut self, username: &str, profile: Profile) -> Result<()> {
        let previous = self.profiles.insert(username.to_string(), profile);
        if let Err(e) = self.save() {
            match previous {
                Some(p) => self.profiles.insert(username.to_string(), p),
                None => self.profiles.remove(username),
            };
            return Err(e);
        }
        info!("Saved profile '{username}'");
        Ok(())
    }

    /// The first username, in username order, whose email or phone equals `contact`.
    pub fn find_by_contact(&self, contact: &Contact) -> Option<&str> {
        self.profiles
            .iter()
            .find(|(_, p)| match contact {
                Contact::Email(email) => p.email == *email,
                Contact::Phone(phone) => p.phone == *phone,
            })
            .map(|(username, _)| username.as_str())
    }

    pub fn export_csv(&self, username: &str, path: impl AsRef<Path>) -> Result<()> {
        let profile = self.require(username)?;
        export::profile_csv(username, profile, path.as_ref()).pub_result(ErrorType::Io)
    }

    pub fn export_json(&self, username: &str, path: impl AsRef<Path>) -> Result<()> {
        let profile = self.require(username)?;
        export::profile_json(username, profile, path.as_ref()).pub_result(ErrorType::Io)
    }

    fn require(&self, username: &str) -> Result<&Profile> {
        self.get(username)
            .ok_or_else(|| anyhow!("User '{username}' not found"))
            .pub_result(ErrorType::NotFound)
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, Value>> {
    let content = utils::read(path)?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse users file at {}", path.display()))
}
