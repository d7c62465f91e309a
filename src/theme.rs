//! Applies the persisted theme preference to the document.

use crate::config::{DARK_THEME_CLASS, ICON_MOON, ICON_SUN};
use log::warn;
use split_second::Theme;

/// Toggle the `dark-theme` class on `<body>` to match the preference.
pub fn apply_theme(theme: Theme) {
    let class_list = gloo_utils::body().class_list();
    let result = match theme {
        Theme::Dark => class_list.add_1(DARK_THEME_CLASS),
        Theme::Light => class_list.remove_1(DARK_THEME_CLASS),
    };
    if let Err(err) = result {
        warn!("failed to apply theme class: {:?}", err);
    }
}

/// Icon for the theme toggle button under the given theme.
pub fn toggle_icon(theme: Theme) -> &'static str {
    match theme {
        Theme::Dark => ICON_SUN,
        Theme::Light => ICON_MOON,
    }
}
