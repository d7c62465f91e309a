//! Application-level configuration constants.

/// Period of the display refresh while the stopwatch runs.
pub const TICK_INTERVAL_MS: u32 = 10;

/// Body class that switches the stylesheet to the dark palette.
pub const DARK_THEME_CLASS: &str = "dark-theme";

/// Theme toggle icons: the sun shows while dark mode is active, the moon
/// while light mode is.
pub const ICON_SUN: &str = "☀️";
pub const ICON_MOON: &str = "🌙";
