//! Widgets embedding compiled Slint views.

pub(crate) mod touch_screen_library;
