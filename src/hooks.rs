//! Custom hooks for the stopwatch shell.

use log::warn;
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::JsCast;
use web_sys::KeyboardEvent;
use yew::prelude::*;

/// Abstract commands bound to keyboard shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutCommand {
    /// Space: start when idle or paused, pause when running.
    ToggleRun,
    /// `R`: reset the stopwatch.
    Reset,
    /// `L`: record a lap.
    Lap,
}

/// Listen for stopwatch shortcuts on the document for the component's
/// lifetime.
///
/// The listener is registered once on mount and removed by the effect's
/// cleanup, so re-renders never stack duplicate handlers. Default browser
/// behavior is suppressed for all bound keys (Space would otherwise scroll
/// or re-trigger a focused button).
#[hook]
pub fn use_keyboard_shortcuts(on_command: Callback<ShortcutCommand>) {
    use_effect_with((), move |_| {
        let document = gloo_utils::document();
        let listener = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            let command = match event.code().as_str() {
                "Space" => ShortcutCommand::ToggleRun,
                "KeyR" => ShortcutCommand::Reset,
                "KeyL" => ShortcutCommand::Lap,
                _ => return,
            };
            event.prevent_default();
            on_command.emit(command);
        });

        if let Err(err) = document
            .add_event_listener_with_callback("keydown", listener.as_ref().unchecked_ref())
        {
            warn!("failed to register keyboard shortcuts: {:?}", err);
        }

        move || {
            let _ = document
                .remove_event_listener_with_callback("keydown", listener.as_ref().unchecked_ref());
            drop(listener);
        }
    });
}
