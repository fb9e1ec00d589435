use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

use crate::track::{Track, TrackId};

/// Owner of the library database connection.
///
/// The connection is reference counted so views can keep a lightweight
/// handle to it without taking over its lifetime.
pub struct DbManager {
    conn: Rc<Connection>,
}

impl DbManager {
    pub fn open(db_path: &Path) -> Result<Self, rusqlite::Error> {
        debug!("Opening library database. path={}", db_path.display());
        let conn = Connection::open(db_path)?;
        let db_manager = Self {
            conn: Rc::new(conn),
        };
        db_manager.initialize_schema()?;
        Ok(db_manager)
    }

    pub fn new_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        let db_manager = Self {
            conn: Rc::new(conn),
        };
        db_manager.initialize_schema()?;
        Ok(db_manager)
    }

    fn initialize_schema(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS track_locations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                location TEXT UNIQUE,
                filename TEXT,
                directory TEXT
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS library (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                artist TEXT,
                title TEXT,
                album TEXT,
                location INTEGER REFERENCES track_locations(id),
                duration REAL,
                bpm REAL,
                key TEXT,
                rating INTEGER DEFAULT 0,
                coverart_type INTEGER DEFAULT 0,
                mixxx_deleted INTEGER DEFAULT 0
            )",
            [],
        )?;
        Ok(())
    }

    /// Returns a shared handle to the underlying connection.
    pub fn database(&self) -> Rc<Connection> {
        Rc::clone(&self.conn)
    }

    /// Resolves a library id into a full track, including its file location.
    pub fn get_track(&self, id: TrackId) -> Result<Option<Track>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT library.id, track_locations.location, library.title, library.artist,
                        library.album, library.bpm, library.key, library.duration,
                        library.rating, library.coverart_type
                 FROM library
                 LEFT JOIN track_locations ON library.location = track_locations.id
                 WHERE library.id = ?1",
                params![id.0],
                |row| {
                    Ok(Track {
                        id: TrackId(row.get(0)?),
                        location: PathBuf::from(
                            row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                        ),
                        title: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                        artist: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                        album: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                        bpm: row.get::<_, Option<f64>>(5)?.unwrap_or_default(),
                        key: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                        duration_secs: row.get::<_, Option<f64>>(7)?.unwrap_or_default(),
                        rating: row.get::<_, Option<i32>>(8)?.unwrap_or_default(),
                        cover_art_type: row.get::<_, Option<i32>>(9)?.unwrap_or_default(),
                    })
                },
            )
            .optional()
    }

    /// Inserts a track together with its location row. Test fixture helper.
    #[cfg(test)]
    pub(crate) fn insert_track(
        &self,
        track: &Track,
        deleted: bool,
    ) -> Result<TrackId, rusqlite::Error> {
        let location_id: Option<i64> = if track.location.as_os_str().is_empty() {
            None
        } else {
            let location = track.location.to_string_lossy().to_string();
            let filename = track
                .location
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default();
            let directory = track
                .location
                .parent()
                .map(|dir| dir.to_string_lossy().to_string())
                .unwrap_or_default();
            self.conn.execute(
                "INSERT INTO track_locations (location, filename, directory) VALUES (?1, ?2, ?3)",
                params![location, filename, directory],
            )?;
            Some(self.conn.last_insert_rowid())
        };

        self.conn.execute(
            "INSERT INTO library (artist, title, album, location, duration, bpm, key, rating, coverart_type, mixxx_deleted)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                track.artist,
                track.title,
                track.album,
                location_id,
                track.duration_secs,
                track.bpm,
                track.key,
                track.rating,
                track.cover_art_type,
                deleted as i32,
            ],
        )?;
        Ok(TrackId(self.conn.last_insert_rowid()))
    }
}
