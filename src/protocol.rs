//! Event-bus protocol shared by runtime components.
//!
//! Payloads here cross thread boundaries, so they carry plain ids and group
//! names rather than shared track handles.

/// Top-level envelope for all bus traffic.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Player(PlayerMessage),
}

/// Player-domain notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerMessage {
    /// A track was loaded into the player identified by `group`.
    TrackLoaded {
        group: String,
        track_id: i64,
        play: bool,
    },
}
