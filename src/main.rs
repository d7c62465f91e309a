//! Stopwatch application shell using Yew.
//! Wires the session to UI components, the periodic display tick, and
//! keyboard shortcuts.

use gloo_timers::callback::Interval;
use split_second::{format_time, StopwatchSession};
use yew::prelude::*;

mod components;
mod config;
mod hooks;
mod storage;
mod theme;

use components::{ControlBar, LapList, TimeDisplay};
use config::TICK_INTERVAL_MS;
use hooks::{use_keyboard_shortcuts, ShortcutCommand};
use storage::BrowserStorage;
use theme::{apply_theme, toggle_icon};

type Session = StopwatchSession<BrowserStorage>;

/// Wall clock in whole milliseconds. `Date.now()` rather than
/// `performance.now()` to match the millisecond resolution the session
/// works in.
fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

#[function_component(App)]
fn app() -> Html {
    // One session per page, shared by every handler below.
    let session = use_mut_ref(|| {
        let mut session = Session::new(BrowserStorage::new());
        session.load_saved_laps();
        session
    });
    let display = use_state(|| format_time(0));
    let running = use_state(|| false);
    // Bumped after every ledger mutation to re-render the lap list, the same
    // way a revision counter drives cache-dependent re-renders elsewhere.
    let laps_version = use_state(|| 0usize);
    let theme = use_state(|| session.borrow().theme());
    // Handle of the live display tick; dropping it cancels the underlying
    // interval. `None` whenever the stopwatch is not running.
    let tick = use_mut_ref(|| None::<Interval>);

    // Apply the persisted theme once on mount.
    {
        let initial = *theme;
        use_effect_with((), move |_| {
            apply_theme(initial);
        });
    }

    let start = {
        let session = session.clone();
        let display = display.clone();
        let running = running.clone();
        let tick = tick.clone();
        Callback::from(move |_: ()| {
            // An existing handle means the tick is already live; starting
            // again must not stack a second interval.
            if tick.borrow().is_some() {
                return;
            }
            session.borrow_mut().start(now_ms());
            running.set(true);

            let session = session.clone();
            let display = display.clone();
            let handle = Interval::new(TICK_INTERVAL_MS, move || {
                display.set(format_time(session.borrow().elapsed_ms(now_ms())));
            });
            *tick.borrow_mut() = Some(handle);
        })
    };

    let pause = {
        let session = session.clone();
        let running = running.clone();
        let tick = tick.clone();
        Callback::from(move |_: ()| {
            // Taking the handle drops it, cancelling the tick exactly once.
            if tick.borrow_mut().take().is_none() {
                return;
            }
            session.borrow_mut().pause(now_ms());
            running.set(false);
        })
    };

    let reset = {
        let session = session.clone();
        let display = display.clone();
        let running = running.clone();
        let tick = tick.clone();
        Callback::from(move |_: ()| {
            tick.borrow_mut().take();
            session.borrow_mut().reset();
            display.set(format_time(0));
            running.set(false);
        })
    };

    let lap = {
        let session = session.clone();
        let laps_version = laps_version.clone();
        Callback::from(move |_: ()| {
            // No-op unless running; the session enforces it.
            if session.borrow_mut().record_lap(now_ms()).is_some() {
                laps_version.set(laps_version.wrapping_add(1));
            }
        })
    };

    let clear_laps = {
        let session = session.clone();
        let laps_version = laps_version.clone();
        Callback::from(move |_: ()| {
            session.borrow_mut().clear_laps();
            laps_version.set(laps_version.wrapping_add(1));
        })
    };

    let toggle_theme = {
        let session = session.clone();
        let theme = theme.clone();
        Callback::from(move |_: MouseEvent| {
            let next = session.borrow_mut().toggle_theme();
            apply_theme(next);
            theme.set(next);
        })
    };

    // Keyboard shortcuts dispatch to the same command callbacks. The running
    // phase is read from the session at event time, not from render-time
    // state, because the listener lives for the whole component lifetime.
    {
        let session = session.clone();
        let start = start.clone();
        let pause = pause.clone();
        let reset = reset.clone();
        let lap = lap.clone();
        use_keyboard_shortcuts(Callback::from(move |command: ShortcutCommand| {
            match command {
                ShortcutCommand::ToggleRun => {
                    let running_now = session.borrow().is_running();
                    if running_now {
                        pause.emit(());
                    } else {
                        start.emit(());
                    }
                }
                ShortcutCommand::Reset => reset.emit(()),
                ShortcutCommand::Lap => lap.emit(()),
            }
        }));
    }

    // Ensure re-render on ledger updates by reading the revision counter.
    let _ = *laps_version;
    let (laps, extremes) = {
        let session = session.borrow();
        (session.laps().to_vec(), session.extremes())
    };

    html! {
        <div class="container">
            <header class="header">
                <h1>{ "Stopwatch" }</h1>
                <button class="theme-toggle" onclick={toggle_theme}>
                    <span class="icon">{ toggle_icon(*theme) }</span>
                </button>
            </header>

            <TimeDisplay time={(*display).clone()} />

            <ControlBar
                running={*running}
                on_start={start}
                on_pause={pause}
                on_reset={reset}
                on_lap={lap}
                on_clear_laps={clear_laps}
            />

            <div class="laps-section">
                <h2>{ "Laps" }</h2>
                <LapList laps={laps} extremes={extremes} />
            </div>
        </div>
    }
}

/// Entry point: installs the panic hook and mounts the app.
fn main() {
    console_error_panic_hook::set_once();
    yew::Renderer::<App>::new().render();
}
