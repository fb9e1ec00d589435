//! Player registry receiving load requests from the library.

use std::fmt;

use log::{info, warn};
use tokio::sync::broadcast::Sender;

use crate::config::PlayerConfig;
use crate::protocol::{Message, PlayerMessage};
use crate::track::TrackPointer;

/// Why a load request was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadTrackError {
    InvalidGroup(String),
    PlayerIsPlaying(String),
}

impl fmt::Display for LoadTrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadTrackError::InvalidGroup(group) => write!(f, "no player for group {group}"),
            LoadTrackError::PlayerIsPlaying(group) => {
                write!(f, "player {group} is playing and may not be replaced")
            }
        }
    }
}

impl std::error::Error for LoadTrackError {}

/// A deck or sampler slot.
#[derive(Debug, Clone)]
pub struct Player {
    group: String,
    loaded_track: Option<TrackPointer>,
    playing: bool,
}

impl Player {
    fn new(group: String) -> Self {
        Self {
            group,
            loaded_track: None,
            playing: false,
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn loaded_track(&self) -> Option<&TrackPointer> {
        self.loaded_track.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

pub fn deck_group(number: u32) -> String {
    format!("[Channel{number}]")
}

pub fn sampler_group(number: u32) -> String {
    format!("[Sampler{number}]")
}

/// Owns every player and loads tracks into them by group name.
pub struct PlayerManager {
    players: Vec<Player>,
    allow_track_load_to_playing_deck: bool,
    bus_sender: Sender<Message>,
}

impl PlayerManager {
    pub fn new(config: &PlayerConfig, bus_sender: Sender<Message>) -> Self {
        let decks = (1..=config.deck_count).map(deck_group);
        let samplers = (1..=config.sampler_count).map(sampler_group);
        Self {
            players: decks.chain(samplers).map(Player::new).collect(),
            allow_track_load_to_playing_deck: config.allow_track_load_to_playing_deck,
            bus_sender,
        }
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.players.iter().map(Player::group)
    }

    pub fn player(&self, group: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.group == group)
    }

    pub fn loaded_track(&self, group: &str) -> Option<&TrackPointer> {
        self.player(group).and_then(Player::loaded_track)
    }

    /// Marks the player as playing or paused. Unknown groups are ignored.
    pub fn set_playing(&mut self, group: &str, playing: bool) {
        if let Some(player) = self.players.iter_mut().find(|player| player.group == group) {
            player.playing = playing && player.loaded_track.is_some();
        }
    }

    pub fn load_track_to_player(
        &mut self,
        track: TrackPointer,
        group: &str,
        play: bool,
    ) -> Result<(), LoadTrackError> {
        let allow_playing = self.allow_track_load_to_playing_deck;
        let player = self
            .players
            .iter_mut()
            .find(|player| player.group == group)
            .ok_or_else(|| LoadTrackError::InvalidGroup(group.to_string()))?;
        if player.playing && !allow_playing {
            return Err(LoadTrackError::PlayerIsPlaying(group.to_string()));
        }

        let track_id = track.id;
        player.loaded_track = Some(track);
        player.playing = play;
        info!(
            "Track loaded. group={} track_id={} play={}",
            group, track_id, play
        );

        // No subscribers is fine; the bus is an optional observer.
        let _ = self.bus_sender.send(Message::Player(PlayerMessage::TrackLoaded {
            group: group.to_string(),
            track_id: track_id.0,
            play,
        }));
        Ok(())
    }

    /// Relay entry point: rejections are logged rather than returned.
    pub fn slot_load_track_to_player(&mut self, track: TrackPointer, group: &str, play: bool) {
        if let Err(err) = self.load_track_to_player(track, group, play) {
            warn!("Rejected track load: {}", err);
        }
    }
}
