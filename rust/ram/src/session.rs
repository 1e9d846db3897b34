// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scoped access to an open RAM database.

use std::path::Path;

use crate::api::{RamDatabase, RamModel};
use crate::error::{Error, Result};

/// Keeps a database open for its lifetime.
///
/// [`finish`](Self::finish) saves and closes. Dropping the session any other
/// way, including early returns and panics, closes without saving.
pub struct RamSession<'d, D: RamDatabase + ?Sized> {
    db: &'d mut D,
    closed: bool,
}

impl<'d, D: RamDatabase + ?Sized> RamSession<'d, D> {
    /// Creates a new database at `path`.
    pub fn create(db: &'d mut D, path: &Path) -> Result<Self> {
        db.create(path)?;
        tracing::debug!(path = %path.display(), "RAM database created");
        Ok(Self { db, closed: false })
    }

    /// Opens the existing database at `path`.
    pub fn open(db: &'d mut D, path: &Path) -> Result<Self> {
        db.open(path)?;
        tracing::debug!(path = %path.display(), "RAM database opened");
        Ok(Self { db, closed: false })
    }

    pub fn model(&self) -> Result<&dyn RamModel> {
        self.db.model().ok_or_else(not_open)
    }

    pub fn model_mut(&mut self) -> Result<&mut dyn RamModel> {
        self.db.model_mut().ok_or_else(not_open)
    }

    /// Saves, then closes whether or not the save succeeded.
    pub fn finish(mut self) -> Result<()> {
        let saved = self.db.save();
        self.db.close();
        self.closed = true;
        saved
    }
}

impl<D: RamDatabase + ?Sized> Drop for RamSession<'_, D> {
    fn drop(&mut self) {
        if !self.closed {
            tracing::debug!("RAM database closed without saving");
            self.db.close();
        }
    }
}

fn not_open() -> Error {
    Error::Precondition("RAM database is not open".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRamDatabase;

    #[test]
    fn drop_closes_without_saving() {
        let path = Path::new("a.rss");
        let mut db = MemoryRamDatabase::new();
        {
            let mut session = RamSession::create(&mut db, path).unwrap();
            session.model_mut().unwrap().add_floor_type("Typical").unwrap();
        }
        assert!(!db.is_open());
        assert!(db.file(path).is_none());
    }

    #[test]
    fn finish_saves_then_closes() {
        let path = Path::new("b.rss");
        let mut db = MemoryRamDatabase::new();
        let mut session = RamSession::create(&mut db, path).unwrap();
        session.model_mut().unwrap().add_floor_type("Typical").unwrap();
        session.finish().unwrap();

        assert!(!db.is_open());
        assert_eq!(db.file(path).map(|m| m.floor_type_count()), Some(1));
    }

    #[test]
    fn failed_save_still_closes() {
        let mut db = MemoryRamDatabase::new();
        db.fail_saves();
        let session = RamSession::create(&mut db, Path::new("c.rss")).unwrap();
        assert!(matches!(session.finish(), Err(Error::Save(_))));
        assert!(!db.is_open());
    }

    #[test]
    fn open_failure_leaves_nothing_open() {
        let mut db = MemoryRamDatabase::new();
        assert!(RamSession::open(&mut db, Path::new("missing.rss")).is_err());
        assert!(!db.is_open());
    }
}
