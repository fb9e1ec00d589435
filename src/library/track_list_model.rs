//! Load-once track list model backing the touch library view.
//!
//! The model snapshots every non-deleted library row into memory when it is
//! constructed and serves the snapshot by row index and role. Activating a row
//! raises a "load track" event carrying the row's track id and a player group.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use log::{debug, error, warn};
use rusqlite::{Connection, Row};
use slint::{Model, ModelNotify, ModelTracker, SharedString};

use crate::duration::{self, Precision};
use crate::track::TrackId;
use crate::TrackRow;

/// First role code, matching the user-role base of common list view toolkits.
pub const USER_ROLE: i32 = 0x0100;

const LOAD_TRACKS_QUERY: &str = "SELECT coverart_type, title, artist, bpm, key, duration, rating, id \
     FROM library \
     WHERE mixxx_deleted=0";

/// Field selector for a cached row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i32)]
pub enum Role {
    Cover = USER_ROLE,
    Title,
    Artist,
    Bpm,
    Key,
    Duration,
    Rating,
    Id,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::Cover,
        Role::Title,
        Role::Artist,
        Role::Bpm,
        Role::Key,
        Role::Duration,
        Role::Rating,
        Role::Id,
    ];

    pub fn code(self) -> i32 {
        self as i32
    }

    /// Maps a raw role code back to a role, `None` outside `[Cover..=Id]`.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|role| role.code() == code)
    }

    /// Field name the view binds to.
    pub fn name(self) -> &'static str {
        match self {
            Role::Cover => "cover",
            Role::Title => "title",
            Role::Artist => "artist",
            Role::Bpm => "bpm",
            Role::Key => "key",
            Role::Duration => "duration",
            Role::Rating => "rating",
            Role::Id => "id",
        }
    }
}

/// Typed value of a single row field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    CoverArt(i32),
    Text(String),
    Bpm(f64),
    Rating(i32),
    Id(TrackId),
}

/// One cached library row. `duration` is stored already formatted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LiteTrack {
    pub cover_art_type: i32,
    pub title: String,
    pub artist: String,
    pub bpm: f64,
    pub key: String,
    pub duration: String,
    pub rating: i32,
    pub id: TrackId,
}

impl LiteTrack {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        let duration_secs = row.get::<_, Option<f64>>(5)?.unwrap_or_default();
        Ok(Self {
            cover_art_type: row.get::<_, Option<i32>>(0)?.unwrap_or_default(),
            title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            artist: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            bpm: row.get::<_, Option<f64>>(3)?.unwrap_or_default(),
            key: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            duration: duration::format_time(duration_secs, Precision::Seconds),
            rating: row.get::<_, Option<i32>>(6)?.unwrap_or_default(),
            id: TrackId(row.get(7)?),
        })
    }

    pub fn field(&self, role: Role) -> FieldValue {
        match role {
            Role::Cover => FieldValue::CoverArt(self.cover_art_type),
            Role::Title => FieldValue::Text(self.title.clone()),
            Role::Artist => FieldValue::Text(self.artist.clone()),
            Role::Bpm => FieldValue::Bpm(self.bpm),
            Role::Key => FieldValue::Text(self.key.clone()),
            Role::Duration => FieldValue::Text(self.duration.clone()),
            Role::Rating => FieldValue::Rating(self.rating),
            Role::Id => FieldValue::Id(self.id),
        }
    }

    fn to_view_row(&self) -> TrackRow {
        TrackRow {
            cover: self.cover_art_type,
            title: SharedString::from(self.title.as_str()),
            artist: SharedString::from(self.artist.as_str()),
            bpm: self.bpm as f32,
            key: SharedString::from(self.key.as_str()),
            duration: SharedString::from(self.duration.as_str()),
            rating: self.rating,
            id: i32::try_from(self.id.0).unwrap_or_default(),
        }
    }
}

type LoadTrackHandler = Box<dyn Fn(TrackId, &str)>;

/// Snapshot of the library table served to the touch library view.
pub struct TrackListModel {
    database: Rc<Connection>,
    rows: RefCell<Vec<LiteTrack>>,
    load_track_handlers: RefCell<Vec<LoadTrackHandler>>,
    notify: ModelNotify,
}

impl TrackListModel {
    /// Builds the model and eagerly loads all rows from `database`.
    pub fn new(database: Rc<Connection>) -> Self {
        let rows = load_rows(&database);
        Self {
            database,
            rows: RefCell::new(rows),
            load_track_handlers: RefCell::new(Vec::new()),
            notify: ModelNotify::default(),
        }
    }

    /// Re-runs the load query and replaces the whole snapshot.
    pub fn reload(&self) {
        let rows = load_rows(&self.database);
        *self.rows.borrow_mut() = rows;
        self.notify.reset();
    }

    pub fn row_count(&self) -> usize {
        self.rows.borrow().len()
    }

    /// Returns the field selected by `role_code` in `row`, if both are valid.
    pub fn field_at(&self, row: usize, role_code: i32) -> Option<FieldValue> {
        let role = Role::from_code(role_code)?;
        self.field(row, role)
    }

    pub fn field(&self, row: usize, role: Role) -> Option<FieldValue> {
        self.rows.borrow().get(row).map(|track| track.field(role))
    }

    pub fn role_names(&self) -> BTreeMap<i32, &'static str> {
        Role::ALL
            .iter()
            .map(|role| (role.code(), role.name()))
            .collect()
    }

    /// Registers a handler for "load track" events.
    ///
    /// Handlers must not register further handlers while being invoked.
    pub fn on_load_track(&self, handler: impl Fn(TrackId, &str) + 'static) {
        self.load_track_handlers
            .borrow_mut()
            .push(Box::new(handler));
    }

    /// Raises a "load track" event for `row` towards player `group`.
    ///
    /// Returns `false` without raising anything when `row` is out of range.
    pub fn notify_activate(&self, row: usize, group: &str) -> bool {
        let track_id = match self.rows.borrow().get(row) {
            Some(track) => track.id,
            None => {
                warn!(
                    "Ignoring activation of missing row. row={} row_count={} group={}",
                    row,
                    self.row_count(),
                    group
                );
                return false;
            }
        };
        debug!("Row activated. row={} track_id={} group={}", row, track_id, group);
        for handler in self.load_track_handlers.borrow().iter() {
            handler(track_id, group);
        }
        true
    }
}

impl Model for TrackListModel {
    type Data = TrackRow;

    fn row_count(&self) -> usize {
        TrackListModel::row_count(self)
    }

    fn row_data(&self, row: usize) -> Option<Self::Data> {
        self.rows.borrow().get(row).map(LiteTrack::to_view_row)
    }

    fn model_tracker(&self) -> &dyn ModelTracker {
        &self.notify
    }
}

fn load_rows(database: &Connection) -> Vec<LiteTrack> {
    match query_rows(database) {
        Ok(rows) => {
            debug!("Loaded library tracks. count={}", rows.len());
            rows
        }
        Err(err) => {
            error!(
                "Failed to load library tracks: {}. query={}",
                err, LOAD_TRACKS_QUERY
            );
            Vec::new()
        }
    }
}

fn query_rows(database: &Connection) -> Result<Vec<LiteTrack>, rusqlite::Error> {
    let mut stmt = database.prepare(LOAD_TRACKS_QUERY)?;
    let track_iter = stmt.query_map([], LiteTrack::from_row)?;
    track_iter.collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db_manager::DbManager;
    use crate::track::Track;
    use rusqlite::Connection;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn insert(db_manager: &DbManager, title: &str, duration_secs: f64) -> TrackId {
        db_manager
            .insert_track(
                &Track {
                    title: title.to_string(),
                    artist: format!("{title} artist"),
                    bpm: 128.0,
                    key: "11B".to_string(),
                    duration_secs,
                    rating: 3,
                    cover_art_type: 1,
                    ..Track::default()
                },
                false,
            )
            .expect("insert should succeed")
    }

    fn model_with_durations(durations: &[f64]) -> (DbManager, TrackListModel, Vec<TrackId>) {
        let db_manager = DbManager::new_in_memory().expect("failed to create in-memory db");
        let ids = durations
            .iter()
            .enumerate()
            .map(|(i, duration)| insert(&db_manager, &format!("Track {i}"), *duration))
            .collect();
        let model = TrackListModel::new(db_manager.database());
        (db_manager, model, ids)
    }

    #[test]
    fn test_new_loads_rows_in_query_order_with_formatted_durations() {
        let (_db, model, ids) = model_with_durations(&[61.5, 0.0, 125.25]);

        assert_eq!(model.row_count(), 3);
        assert_eq!(
            model.field(0, Role::Duration),
            Some(FieldValue::Text("1:01".to_string()))
        );
        assert_eq!(
            model.field(1, Role::Duration),
            Some(FieldValue::Text("0:00".to_string()))
        );
        assert_eq!(
            model.field(2, Role::Duration),
            Some(FieldValue::Text("2:05".to_string()))
        );
        for (row, id) in ids.iter().enumerate() {
            assert_eq!(model.field(row, Role::Id), Some(FieldValue::Id(*id)));
        }
    }

    #[test]
    fn test_field_at_returns_typed_values_for_every_role() {
        let (_db, model, ids) = model_with_durations(&[200.0]);

        let code = |role: Role| role.code();
        assert_eq!(model.field_at(0, code(Role::Cover)), Some(FieldValue::CoverArt(1)));
        assert_eq!(
            model.field_at(0, code(Role::Title)),
            Some(FieldValue::Text("Track 0".to_string()))
        );
        assert_eq!(
            model.field_at(0, code(Role::Artist)),
            Some(FieldValue::Text("Track 0 artist".to_string()))
        );
        assert_eq!(model.field_at(0, code(Role::Bpm)), Some(FieldValue::Bpm(128.0)));
        assert_eq!(
            model.field_at(0, code(Role::Key)),
            Some(FieldValue::Text("11B".to_string()))
        );
        assert_eq!(
            model.field_at(0, code(Role::Duration)),
            Some(FieldValue::Text("3:20".to_string()))
        );
        assert_eq!(model.field_at(0, code(Role::Rating)), Some(FieldValue::Rating(3)));
        assert_eq!(model.field_at(0, code(Role::Id)), Some(FieldValue::Id(ids[0])));
    }

    #[test]
    fn test_field_at_returns_none_outside_rows_or_roles() {
        let (_db, model, _ids) = model_with_durations(&[10.0, 20.0]);

        assert_eq!(model.field_at(2, Role::Title.code()), None);
        assert_eq!(model.field_at(usize::MAX, Role::Title.code()), None);
        assert_eq!(model.field_at(0, USER_ROLE - 1), None);
        assert_eq!(model.field_at(0, Role::Id.code() + 1), None);
        assert_eq!(model.field_at(0, 0), None);
    }

    #[test]
    fn test_role_names_cover_exactly_the_eight_roles() {
        let (_db, model, _ids) = model_with_durations(&[]);
        let names = model.role_names();

        assert_eq!(names.len(), 8);
        let expected = [
            (USER_ROLE, "cover"),
            (USER_ROLE + 1, "title"),
            (USER_ROLE + 2, "artist"),
            (USER_ROLE + 3, "bpm"),
            (USER_ROLE + 4, "key"),
            (USER_ROLE + 5, "duration"),
            (USER_ROLE + 6, "rating"),
            (USER_ROLE + 7, "id"),
        ];
        for (code, name) in expected {
            assert_eq!(names.get(&code), Some(&name));
            assert_eq!(Role::from_code(code).map(Role::name), Some(name));
        }
    }

    #[test]
    fn test_deleted_rows_are_excluded() {
        let db_manager = DbManager::new_in_memory().expect("failed to create in-memory db");
        insert(&db_manager, "Kept", 60.0);
        db_manager
            .insert_track(
                &Track {
                    title: "Gone".to_string(),
                    ..Track::default()
                },
                true,
            )
            .expect("insert should succeed");

        let model = TrackListModel::new(db_manager.database());
        assert_eq!(model.row_count(), 1);
        assert_eq!(
            model.field(0, Role::Title),
            Some(FieldValue::Text("Kept".to_string()))
        );
    }

    #[test]
    fn test_null_columns_become_defaults_and_duration_is_still_formatted() {
        let db_manager = DbManager::new_in_memory().expect("failed to create in-memory db");
        db_manager
            .database()
            .execute(
                "INSERT INTO library (id, duration, rating, coverart_type) VALUES (5, NULL, NULL, NULL)",
                [],
            )
            .expect("insert should succeed");

        let model = TrackListModel::new(db_manager.database());
        assert_eq!(model.row_count(), 1);
        assert_eq!(model.field(0, Role::Title), Some(FieldValue::Text(String::new())));
        assert_eq!(
            model.field(0, Role::Duration),
            Some(FieldValue::Text("0:00".to_string()))
        );
        assert_eq!(model.field(0, Role::Rating), Some(FieldValue::Rating(0)));
        assert_eq!(model.field(0, Role::Id), Some(FieldValue::Id(TrackId(5))));
    }

    #[test]
    fn test_failed_query_leaves_model_empty() {
        let conn = Connection::open_in_memory().expect("failed to open in-memory db");
        let model = TrackListModel::new(Rc::new(conn));

        assert_eq!(model.row_count(), 0);
        assert_eq!(model.field_at(0, Role::Title.code()), None);
        assert!(Model::row_data(&model, 0).is_none());
    }

    #[test]
    fn test_unreadable_row_discards_the_whole_snapshot() {
        let db_manager = DbManager::new_in_memory().expect("failed to create in-memory db");
        insert(&db_manager, "Good", 60.0);
        db_manager
            .database()
            .execute(
                "INSERT INTO library (title, bpm) VALUES ('Bad', X'00FF')",
                [],
            )
            .expect("insert should succeed");

        let model = TrackListModel::new(db_manager.database());
        assert_eq!(model.row_count(), 0);
    }

    #[test]
    fn test_notify_activate_raises_one_event_with_row_id_and_group() {
        let (_db, model, ids) = model_with_durations(&[30.0, 40.0]);
        let events = Rc::new(RefCell::new(Vec::new()));
        let events_clone = Rc::clone(&events);
        model.on_load_track(move |id, group| {
            events_clone.borrow_mut().push((id, group.to_string()));
        });

        assert!(model.notify_activate(1, "[Channel1]"));
        assert_eq!(*events.borrow(), vec![(ids[1], "[Channel1]".to_string())]);
    }

    #[test]
    fn test_notify_activate_out_of_range_raises_nothing() {
        let (_db, model, _ids) = model_with_durations(&[30.0]);
        let events = Rc::new(RefCell::new(0usize));
        let events_clone = Rc::clone(&events);
        model.on_load_track(move |_, _| *events_clone.borrow_mut() += 1);

        assert!(!model.notify_activate(1, "[Channel1]"));
        assert!(!model.notify_activate(usize::MAX, "[Channel2]"));
        assert_eq!(*events.borrow(), 0);
    }

    #[test]
    fn test_reload_replaces_snapshot() {
        let (db_manager, model, _ids) = model_with_durations(&[30.0]);
        insert(&db_manager, "Late", 90.0);
        assert_eq!(model.row_count(), 1);

        model.reload();
        assert_eq!(model.row_count(), 2);
        assert_eq!(
            model.field(1, Role::Title),
            Some(FieldValue::Text("Late".to_string()))
        );
    }

    #[test]
    fn test_view_rows_mirror_cached_fields() {
        let (_db, model, ids) = model_with_durations(&[61.5]);
        let row = Model::row_data(&model, 0).expect("row should exist");

        assert_eq!(Model::row_count(&model), 1);
        assert_eq!(row.cover, 1);
        assert_eq!(row.title.as_str(), "Track 0");
        assert_eq!(row.artist.as_str(), "Track 0 artist");
        assert_eq!(row.key.as_str(), "11B");
        assert_eq!(row.duration.as_str(), "1:01");
        assert_eq!(row.rating, 3);
        assert_eq!(i64::from(row.id), ids[0].0);
        assert!((row.bpm - 128.0).abs() < f32::EPSILON);
    }
}
