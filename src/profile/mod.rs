//! Scraped profile cards and their export formats.
//!
//! Profiles arrive as the JSON rows the browser extension keeps in local
//! storage. They are deduplicated on insertion and exported as a CSV file,
//! as a CSV with every image inlined as a data URI, or as a ZIP bundle
//! holding the CSV plus one image per profile.

pub mod csv;
mod export;
pub mod inline;
pub mod naming;

pub use export::{CSV_FILE_NAME, ExportBundle, IMAGES_FOLDER, ImageSource};
pub use inline::{CSV_WITH_IMAGES_FILE_NAME, csv_with_images};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One extracted profile card. Missing fields are empty strings.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Profile {
    #[serde(alias = "userId", skip_serializing_if = "String::is_empty")]
    pub user_id: String,
    pub name: String,
    pub location: String,
    pub age: String,
    pub bio: String,
    pub image: String,
}

impl Profile {
    /// Identity used for deduplication: the site's user id when known,
    /// otherwise image URL and name together.
    pub fn dedup_key(&self) -> String {
        if self.user_id.is_empty() {
            format!("{}||{}", self.image, self.name)
        } else {
            format!("id:{}", self.user_id)
        }
    }
}

/// Insertion-ordered set of profiles.
#[derive(Debug, Default, Clone)]
pub struct ProfileSet {
    profiles: Vec<Profile>,
    seen: HashSet<String>,
}

impl ProfileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `profile` unless an equal key was already seen. Returns whether it was added.
    pub fn insert(&mut self, profile: Profile) -> bool {
        if !self.seen.insert(profile.dedup_key()) {
            return false;
        }
        self.profiles.push(profile);
        true
    }

    /// Add every new profile, returning how many were added.
    pub fn extend<I: IntoIterator<Item = Profile>>(&mut self, profiles: I) -> usize {
        let mut added = 0;
        for profile in profiles {
            if self.insert(profile) {
                added += 1;
            }
        }
        added
    }

    /// Parse a JSON array of profiles.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let rows: Vec<Profile> = serde_json::from_str(json)?;
        let mut set = Self::new();
        set.extend(rows);
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn as_slice(&self) -> &[Profile] {
        &self.profiles
    }
}
