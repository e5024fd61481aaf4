use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Profile vector of one business
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileEntry {
    pub business_id: String,
    pub vector: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct ProfileTable {
    embedding_dims: usize,
    entries: Vec<ProfileEntry>,
}

/// Content profiles for every business, in catalog order
///
/// Each vector has `embedding_dims + 1` components: the text embedding
/// followed by the sentiment score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "ProfileTable", into = "ProfileTable")]
pub struct ItemProfiles {
    embedding_dims: usize,
    entries: Vec<ProfileEntry>,
    index: HashMap<String, usize>,
}

impl ItemProfiles {
    pub fn new(embedding_dims: usize) -> Self {
        Self {
            embedding_dims,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Inserts a profile, replacing any earlier one for the same business
    pub fn insert(&mut self, business_id: impl Into<String>, vector: Vec<f32>) {
        let business_id = business_id.into();
        match self.index.get(&business_id) {
            Some(&pos) => self.entries[pos].vector = vector,
            None => {
                self.index.insert(business_id.clone(), self.entries.len());
                self.entries.push(ProfileEntry { business_id, vector });
            }
        }
    }

    pub fn get(&self, business_id: &str) -> Option<&[f32]> {
        self.index
            .get(business_id)
            .map(|&pos| self.entries[pos].vector.as_slice())
    }

    pub fn contains(&self, business_id: &str) -> bool {
        self.index.contains_key(business_id)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &ProfileEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Length of every profile vector
    pub fn vector_len(&self) -> usize {
        self.embedding_dims + 1
    }
}

impl From<ProfileTable> for ItemProfiles {
    fn from(table: ProfileTable) -> Self {
        let mut profiles = ItemProfiles::new(table.embedding_dims);
        for entry in table.entries {
            profiles.insert(entry.business_id, entry.vector);
        }
        profiles
    }
}

impl From<ItemProfiles> for ProfileTable {
    fn from(profiles: ItemProfiles) -> Self {
        Self {
            embedding_dims: profiles.embedding_dims,
            entries: profiles.entries,
        }
    }
}
