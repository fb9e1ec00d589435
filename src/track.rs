//! Track records resolved from the library database.

use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

/// Primary key of a row in the `library` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TrackId(pub i64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fully resolved library track, as handed to the players.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Track {
    pub id: TrackId,
    /// Absolute file location, empty when the track has no location row.
    pub location: PathBuf,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub bpm: f64,
    pub key: String,
    pub duration_secs: f64,
    pub rating: i32,
    pub cover_art_type: i32,
}

/// Shared handle to a resolved track.
pub type TrackPointer = Rc<Track>;
