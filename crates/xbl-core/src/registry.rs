//! Explicit registry of extracted entities.
//!
//! One map per entity kind, keyed the way the entities identify themselves
//! across refreshes: gamertag for profiles and game libraries, the
//! (gamertag, title id) pair for achievement lists. Construction and lookup
//! are explicit — there is no global instance and no scanning of live
//! objects; whoever owns the registry decides its lifetime.
//!
//! Inserting under an existing key replaces the entry whole, matching the
//! recompute-in-full refresh model of the extractors.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::types::{GameAchievements, GameLibrary, Profile};

/// Caller-owned store of the latest extracted entities, by key.
#[derive(Debug, Default)]
pub struct Registry {
    profiles: HashMap<String, Profile>,
    libraries: HashMap<String, GameLibrary>,
    achievements: HashMap<(String, u64), GameAchievements>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest profile stored for `gamertag`, if any.
    #[must_use]
    pub fn profile(&self, gamertag: &str) -> Option<&Profile> {
        self.profiles.get(gamertag)
    }

    /// Store `profile` under its gamertag, replacing any previous entry.
    pub fn insert_profile(&mut self, profile: Profile) -> &Profile {
        let key = profile.gamertag.clone();
        replace(&mut self.profiles, key, profile)
    }

    /// Latest game library stored for `gamertag`, if any.
    #[must_use]
    pub fn library(&self, gamertag: &str) -> Option<&GameLibrary> {
        self.libraries.get(gamertag)
    }

    /// Store `library` under its gamertag, replacing any previous entry.
    pub fn insert_library(&mut self, library: GameLibrary) -> &GameLibrary {
        let key = library.gamertag.clone();
        replace(&mut self.libraries, key, library)
    }

    /// Latest achievement list stored for the (gamertag, title id) pair.
    #[must_use]
    pub fn achievements(&self, gamertag: &str, title_id: u64) -> Option<&GameAchievements> {
        self.achievements.get(&(gamertag.to_string(), title_id))
    }

    /// Store `achievements` under its (gamertag, title id) pair, replacing
    /// any previous entry.
    pub fn insert_achievements(&mut self, achievements: GameAchievements) -> &GameAchievements {
        let key = (achievements.gamertag.clone(), achievements.game_id);
        replace(&mut self.achievements, key, achievements)
    }
}

/// Insert-or-overwrite, handing back a reference to the stored value.
fn replace<K: std::hash::Hash + Eq, V>(map: &mut HashMap<K, V>, key: K, value: V) -> &V {
    match map.entry(key) {
        Entry::Occupied(mut occupied) => {
            occupied.insert(value);
            occupied.into_mut()
        },
        Entry::Vacant(vacant) => vacant.insert(value),
    }
}
