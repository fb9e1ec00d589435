//! Deck and sampler players.

pub(crate) mod player_manager;
