//! Library access: the internal track collection and the views built on it.

pub(crate) mod track_collection;
pub(crate) mod track_list_model;

use std::rc::Rc;

use crate::db_manager::DbManager;
use track_collection::TrackCollection;

/// Entry point to the application's track collections.
pub struct Library {
    internal_collection: Rc<TrackCollection>,
}

impl Library {
    pub fn new(db_manager: DbManager) -> Self {
        Self {
            internal_collection: Rc::new(TrackCollection::new(db_manager)),
        }
    }

    /// The collection backed by the local library database.
    pub fn internal_collection(&self) -> Rc<TrackCollection> {
        Rc::clone(&self.internal_collection)
    }
}
