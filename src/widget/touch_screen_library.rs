//! Touch-screen library widget hosting the compiled track list view.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info};
use slint::{ComponentHandle, LogicalSize, ModelRc, SharedString, VecModel};

use crate::config::UiConfig;
use crate::library::track_collection::TrackCollection;
use crate::library::track_list_model::TrackListModel;
use crate::library::Library;
use crate::mixer::player_manager::PlayerManager;
use crate::TouchLibraryView;

/// View property the track list model is published under.
pub const MODEL_PROPERTY_NAME: &str = "track_list_model";

/// Embeds [`TouchLibraryView`] and forwards row activations to the players.
///
/// Fields drop in declaration order, so the view releases its model handle
/// before the widget's own reference goes away.
pub struct TouchScreenLibrary {
    view: TouchLibraryView,
    model: Rc<TrackListModel>,
}

impl TouchScreenLibrary {
    pub fn new(
        library: &Library,
        player_manager: &Rc<RefCell<PlayerManager>>,
        ui_config: &UiConfig,
    ) -> Result<Self, slint::PlatformError> {
        let collection = library.internal_collection();
        let model = Rc::new(TrackListModel::new(collection.database()));
        let view = TouchLibraryView::new()?;

        initialize_view(&view, &model, player_manager, ui_config);
        connect_track_loading(&model, &collection, player_manager);

        Ok(Self { view, model })
    }

    pub fn model(&self) -> &TrackListModel {
        &self.model
    }

    /// Shows the view and blocks in the UI event loop until it is closed.
    pub fn run(&self) -> Result<(), slint::PlatformError> {
        self.view.run()
    }
}

fn initialize_view(
    view: &TouchLibraryView,
    model: &Rc<TrackListModel>,
    player_manager: &Rc<RefCell<PlayerManager>>,
    ui_config: &UiConfig,
) {
    view.set_track_list_model(ModelRc::from(Rc::clone(model)));

    let deck_groups: Vec<SharedString> = player_manager
        .borrow()
        .groups()
        .filter(|group| group.starts_with("[Channel"))
        .map(SharedString::from)
        .collect();
    view.set_deck_groups(ModelRc::new(VecModel::from(deck_groups)));

    view.window().set_size(LogicalSize::new(
        ui_config.window_width as f32,
        ui_config.window_height as f32,
    ));

    let model_weak = Rc::downgrade(model);
    view.on_row_activated(move |row, group| {
        let Ok(row) = usize::try_from(row) else {
            debug!("Ignoring activation without a selected row. group={}", group);
            return;
        };
        if let Some(model) = model_weak.upgrade() {
            model.notify_activate(row, group.as_str());
        }
    });

    let model_weak = Rc::downgrade(model);
    view.on_refresh_requested(move || {
        if let Some(model) = model_weak.upgrade() {
            model.reload();
        }
    });

    info!(
        "Touch library view initialized. property={} rows={}",
        MODEL_PROPERTY_NAME,
        model.row_count()
    );
}

/// Wires model activations through the collection into the player manager.
///
/// The collection resolves each track id before the player manager sees it.
/// Handlers hold weak references, so wiring never extends a collaborator's
/// lifetime. Calling this twice for the same pair forwards every event twice.
pub fn connect_track_loading(
    model: &TrackListModel,
    collection: &Rc<TrackCollection>,
    player_manager: &Rc<RefCell<PlayerManager>>,
) {
    let collection_weak = Rc::downgrade(collection);
    model.on_load_track(move |track_id, group| {
        if let Some(collection) = collection_weak.upgrade() {
            collection.slot_load_track_to_player(track_id, group);
        }
    });

    let player_manager_weak = Rc::downgrade(player_manager);
    collection.on_load_track_to_player(move |track, group, play| {
        if let Some(player_manager) = player_manager_weak.upgrade() {
            player_manager
                .borrow_mut()
                .slot_load_track_to_player(track, group, play);
        }
    });
}
