use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, error, warn};
use rusqlite::Connection;

use crate::db_manager::DbManager;
use crate::track::{TrackId, TrackPointer};

type LoadTrackToPlayerHandler = Box<dyn Fn(TrackPointer, &str, bool)>;

/// Internal track collection backed by the library database.
///
/// Resolves bare track ids coming from lightweight views into full tracks
/// before they are handed over to the players.
pub struct TrackCollection {
    db_manager: DbManager,
    load_track_to_player_handlers: RefCell<Vec<LoadTrackToPlayerHandler>>,
}

impl TrackCollection {
    pub fn new(db_manager: DbManager) -> Self {
        Self {
            db_manager,
            load_track_to_player_handlers: RefCell::new(Vec::new()),
        }
    }

    pub fn database(&self) -> Rc<Connection> {
        self.db_manager.database()
    }

    /// Registers a handler receiving resolved tracks for a player group.
    pub fn on_load_track_to_player(&self, handler: impl Fn(TrackPointer, &str, bool) + 'static) {
        self.load_track_to_player_handlers
            .borrow_mut()
            .push(Box::new(handler));
    }

    /// Resolves `track_id` and forwards it to every registered handler.
    ///
    /// Tracks that cannot be resolved are logged and dropped.
    pub fn slot_load_track_to_player(&self, track_id: TrackId, group: &str) {
        let track = match self.db_manager.get_track(track_id) {
            Ok(Some(track)) => Rc::new(track),
            Ok(None) => {
                warn!(
                    "Cannot load unknown track to player. track_id={} group={}",
                    track_id, group
                );
                return;
            }
            Err(err) => {
                error!(
                    "Failed to resolve track from database: {}. track_id={} group={}",
                    err, track_id, group
                );
                return;
            }
        };

        debug!(
            "Loading track to player. track_id={} group={} location={}",
            track_id,
            group,
            track.location.display()
        );
        for handler in self.load_track_to_player_handlers.borrow().iter() {
            handler(Rc::clone(&track), group, false);
        }
    }
}
