//! Pure Yew view components for the stopwatch UI.
//!
//! These are stateless: they render the formatted time, the control bar, and
//! the lap list from props, with highlight instructions computed elsewhere.

use split_second::{FormattedTime, Lap, LapExtremes};
use yew::prelude::*;

/// The running time readout, split into minute/second/hundredth fields.
#[derive(Properties, PartialEq)]
pub struct TimeDisplayProps {
    pub time: FormattedTime,
}

#[function_component(TimeDisplay)]
pub fn time_display(props: &TimeDisplayProps) -> Html {
    html! {
        <div class="time-display">
            <span class="minutes">{ &props.time.minutes }</span>
            <span class="separator">{ ":" }</span>
            <span class="seconds">{ &props.time.seconds }</span>
            <span class="separator">{ ":" }</span>
            <span class="hundredths">{ &props.time.milliseconds }</span>
        </div>
    }
}

/// Buttons for the stopwatch commands. Start and pause disable against the
/// running flag; every command is an idempotent no-op in an invalid state
/// anyway.
#[derive(Properties, PartialEq)]
pub struct ControlBarProps {
    pub running: bool,
    pub on_start: Callback<()>,
    pub on_pause: Callback<()>,
    pub on_reset: Callback<()>,
    pub on_lap: Callback<()>,
    pub on_clear_laps: Callback<()>,
}

#[function_component(ControlBar)]
pub fn control_bar(props: &ControlBarProps) -> Html {
    html! {
        <div class="controls">
            <button
                class="btn-primary"
                disabled={props.running}
                onclick={props.on_start.reform(|_| ())}
            >
                { "Start" }
            </button>
            <button
                class="btn-primary"
                disabled={!props.running}
                onclick={props.on_pause.reform(|_| ())}
            >
                { "Pause" }
            </button>
            <button class="btn-secondary" onclick={props.on_reset.reform(|_| ())}>
                { "Reset" }
            </button>
            <button
                class="btn-secondary"
                disabled={!props.running}
                onclick={props.on_lap.reform(|_| ())}
            >
                { "Lap" }
            </button>
            <button class="btn-secondary" onclick={props.on_clear_laps.reform(|_| ())}>
                { "Clear Laps" }
            </button>
        </div>
    }
}

/// The recorded laps, newest first, with fastest/slowest highlights applied
/// per the instruction set.
#[derive(Properties, PartialEq)]
pub struct LapListProps {
    pub laps: Vec<Lap>,
    pub extremes: LapExtremes,
}

#[function_component(LapList)]
pub fn lap_list(props: &LapListProps) -> Html {
    if props.laps.is_empty() {
        return html! {
            <p class="no-laps">{ "No laps recorded" }</p>
        };
    }

    html! {
        <ul class="laps">
            { props.laps.iter().rev().map(|lap| lap_row(lap, props.extremes)).collect::<Html>() }
        </ul>
    }
}

fn lap_row(lap: &Lap, extremes: LapExtremes) -> Html {
    let mut class = Classes::new();
    if extremes.fastest == Some(lap.number) {
        class.push("fastest");
    }
    if extremes.slowest == Some(lap.number) {
        class.push("slowest");
    }

    html! {
        <li class={class}>
            <span class="lap-number">{ lap.number }</span>
            <span class="lap-time">{ lap.formatted_time.to_string() }</span>
            <span class="lap-split">{ lap.formatted_split.to_string() }</span>
        </li>
    }
}
