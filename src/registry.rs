use std::sync::Mutex;

/// Maps race IDs to the last token handed in for that race.
#[derive(Debug, Default)]
pub struct RaceRegistry {
    races: Mutex<crate::HashMap<String, String>>,
}

impl RaceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new race with its initial token, returning the race ID.
    pub fn start(&self, token: String) -> String {
        let race_id = uuid::Uuid::new_v4().to_string();

        log::debug!("starting race {race_id}");

        self.races
            .lock()
            .expect("lock is poisoned")
            .insert(race_id.clone(), token);

        race_id
    }

    /// Stores the token of the next lap, returning the previous one.
    ///
    /// An unknown race starts out with an empty token.
    pub fn lap(&self, race_id: &str, token: String) -> String {
        self.races
            .lock()
            .expect("lock is poisoned")
            .insert(race_id.to_owned(), token)
            .unwrap_or_default()
    }

    /// Number of known races.
    #[must_use]
    pub fn len(&self) -> usize {
        self.races.lock().expect("lock is poisoned").len()
    }

    /// Returns `true` if no race was registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
