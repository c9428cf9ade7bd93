use std::{collections::HashMap, path::Path, sync::Arc};

use calrss_core::{PUBLIC_LOGIN, Result, source::Calendar};

/// Calendars loaded from a directory of `{login}.json` files.
pub struct CalendarStore {
    calendars: HashMap<String, Arc<Calendar>>,
}

impl CalendarStore {
    /// Loads every `.json` calendar under `dir`. Files that fail to
    /// parse are skipped with a warning.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut calendars = HashMap::new();

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Calendar::from_path(&path) {
                Ok(calendar) => {
                    tracing::info!(
                        "Loaded calendar '{}' ({} events)",
                        calendar.login,
                        calendar.events.len()
                    );
                    calendars.insert(calendar.login.clone(), Arc::new(calendar));
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                }
            }
        }

        tracing::info!("Calendar store ready with {} calendars", calendars.len());
        Ok(Self { calendars })
    }

    /// Looks up a calendar by login. `public` aliases the canonical
    /// public login.
    pub fn get(&self, login: &str) -> Option<Arc<Calendar>> {
        let login = if login == "public" { PUBLIC_LOGIN } else { login };
        self.calendars.get(login).cloned()
    }

    pub fn logins(&self) -> impl Iterator<Item = &str> {
        self.calendars.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.calendars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calendars.is_empty()
    }
}
