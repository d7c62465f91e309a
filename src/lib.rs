//! Core stopwatch logic: time formatting, the running/paused state machine,
//! the lap ledger, and the persistence seam. Everything here is pure with
//! respect to the browser: the current time arrives as an explicit `now_ms`
//! argument and storage goes through the [`KeyValueStore`] trait, so the whole
//! module is testable on the host.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Storage keys shared by the session and the browser shell.
pub mod keys {
    pub const LAPS: &str = "stopwatchLaps";
    pub const THEME: &str = "theme";
}

// ──────────────────────────────────────────────────────────────────────────────
// Time formatting

/// Display fields for an elapsed-millisecond value.
///
/// `milliseconds` holds hundredths of a second; the field name matches the
/// persisted lap shape (`formattedTime: {minutes, seconds, milliseconds}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedTime {
    pub minutes: String,
    pub seconds: String,
    pub milliseconds: String,
}

impl fmt::Display for FormattedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.minutes, self.seconds, self.milliseconds)
    }
}

/// Split `ms` into zero-padded minutes, seconds, and hundredths.
///
/// Minutes have no upper bound: 100 minutes and up simply widen the field.
pub fn format_time(ms: u64) -> FormattedTime {
    FormattedTime {
        minutes: format!("{:02}", ms / 60_000),
        seconds: format!("{:02}", (ms % 60_000) / 1_000),
        milliseconds: format!("{:02}", (ms % 1_000) / 10),
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Stopwatch state machine

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Stopped,
    Running,
    Paused,
}

/// Elapsed-time accumulator over wall-clock readings.
///
/// While paused the accumulator is authoritative; while running the live
/// segment `now - segment_start` is added on top. All transitions are total:
/// invalid ones are no-ops, never errors.
#[derive(Debug)]
pub struct Stopwatch {
    phase: Phase,
    accumulated_ms: u64,
    segment_start_ms: u64,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self {
            phase: Phase::Stopped,
            accumulated_ms: 0,
            segment_start_ms: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Begin (or resume) timing. No-op while already running, so a repeated
    /// start cannot skew the segment epoch.
    pub fn start(&mut self, now_ms: u64) {
        if self.phase == Phase::Running {
            return;
        }
        self.segment_start_ms = now_ms;
        self.phase = Phase::Running;
    }

    /// Freeze the elapsed time. No-op unless running.
    pub fn pause(&mut self, now_ms: u64) {
        if self.phase != Phase::Running {
            return;
        }
        self.accumulated_ms += now_ms.saturating_sub(self.segment_start_ms);
        self.phase = Phase::Paused;
    }

    /// Back to stopped-at-zero from any phase.
    pub fn reset(&mut self) {
        self.phase = Phase::Stopped;
        self.accumulated_ms = 0;
        self.segment_start_ms = 0;
    }

    /// Total elapsed milliseconds at `now_ms`. `Date.now()` is not monotonic,
    /// so a clock regression saturates to the accumulator instead of
    /// underflowing.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        match self.phase {
            Phase::Running => self.accumulated_ms + now_ms.saturating_sub(self.segment_start_ms),
            _ => self.accumulated_ms,
        }
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Lap ledger

/// A recorded lap. Serialized field names match the stored JSON shape:
/// `{number, time, split, formattedTime: {...}, formattedSplit: {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lap {
    pub number: u32,
    /// Cumulative elapsed time at the moment the lap was recorded.
    pub time: u64,
    /// Difference to the previous lap's cumulative time.
    pub split: u64,
    pub formatted_time: FormattedTime,
    pub formatted_split: FormattedTime,
}

/// Highlight instructions for the lap list, by lap number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LapExtremes {
    pub fastest: Option<u32>,
    pub slowest: Option<u32>,
}

/// Ordered collection of laps, stored oldest-first.
///
/// Numbering is strictly increasing by creation order and survives a restore
/// from storage; the display renders newest-first from the same vector.
#[derive(Debug)]
pub struct LapLedger {
    laps: Vec<Lap>,
    next_number: u32,
    last_lap_ms: u64,
}

impl LapLedger {
    pub fn new() -> Self {
        Self {
            laps: Vec::new(),
            next_number: 1,
            last_lap_ms: 0,
        }
    }

    pub fn laps(&self) -> &[Lap] {
        &self.laps
    }

    pub fn is_empty(&self) -> bool {
        self.laps.is_empty()
    }

    /// Append a lap at the given cumulative elapsed time. The split is
    /// measured against the previous lap (or zero before any lap). The
    /// running-only guard lives at the call site, not here.
    pub fn record(&mut self, elapsed_ms: u64) -> &Lap {
        let split = elapsed_ms.saturating_sub(self.last_lap_ms);
        self.last_lap_ms = elapsed_ms;

        self.laps.push(Lap {
            number: self.next_number,
            time: elapsed_ms,
            split,
            formatted_time: format_time(elapsed_ms),
            formatted_split: format_time(split),
        });
        self.next_number += 1;

        self.laps.last().expect("lap was just pushed")
    }

    /// Drop every lap; numbering restarts at 1, split baseline at 0.
    pub fn clear(&mut self) {
        self.laps.clear();
        self.next_number = 1;
        self.last_lap_ms = 0;
    }

    /// Restart numbering at 1 and zero the split baseline without touching
    /// the recorded laps. This is what a stopwatch reset does: prior laps
    /// stay on display (and in storage) until an explicit clear.
    pub fn reset_numbering(&mut self) {
        self.next_number = 1;
        self.last_lap_ms = 0;
    }

    /// Replace the ledger wholesale with laps loaded from storage. Numbering
    /// resumes past the highest stored number and the split baseline picks up
    /// from the last stored lap.
    pub fn restore(&mut self, laps: Vec<Lap>) {
        self.next_number = laps.iter().map(|lap| lap.number).max().unwrap_or(0) + 1;
        self.last_lap_ms = laps.last().map(|lap| lap.time).unwrap_or(0);
        self.laps = laps;
    }

    /// Fastest and slowest splits over every lap except the first stored one
    /// (the opening lap has no meaningful split to compare). Ties resolve to
    /// the earliest lap in stored order, independently for both extremes, so
    /// repeated calls are deterministic. Fewer than two laps yield no
    /// highlights.
    pub fn extremes(&self) -> LapExtremes {
        if self.laps.len() < 2 {
            return LapExtremes::default();
        }

        let mut fastest: Option<&Lap> = None;
        let mut slowest: Option<&Lap> = None;
        for lap in &self.laps[1..] {
            match fastest {
                Some(best) if lap.split >= best.split => {}
                _ => fastest = Some(lap),
            }
            match slowest {
                Some(worst) if lap.split <= worst.split => {}
                _ => slowest = Some(lap),
            }
        }

        LapExtremes {
            fastest: fastest.map(|lap| lap.number),
            slowest: slowest.map(|lap| lap.number),
        }
    }
}

impl Default for LapLedger {
    fn default() -> Self {
        Self::new()
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Persistence seam

/// String key-value storage with `localStorage` semantics: absent keys read
/// as `None`, writes are fire-and-forget. Implementations log and degrade
/// instead of surfacing errors.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory store, shared by clone. Backs the unit tests and stands in when
/// browser storage is unavailable.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Theme preference

/// Visual theme, persisted under its own key with a lifecycle independent of
/// the lap ledger. Anything other than a stored `"dark"` reads as light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Session

/// One stopwatch session: the state machine, the lap ledger, and the store
/// they persist into. The application shell owns a single instance for the
/// lifetime of the page.
pub struct StopwatchSession<S: KeyValueStore> {
    watch: Stopwatch,
    ledger: LapLedger,
    store: S,
}

impl<S: KeyValueStore> StopwatchSession<S> {
    pub fn new(store: S) -> Self {
        Self {
            watch: Stopwatch::new(),
            ledger: LapLedger::new(),
            store,
        }
    }

    pub fn start(&mut self, now_ms: u64) {
        self.watch.start(now_ms);
    }

    pub fn pause(&mut self, now_ms: u64) {
        self.watch.pause(now_ms);
    }

    /// Zero the stopwatch, restart lap numbering, and reset the split
    /// baseline. Recorded laps stay in the ledger and in storage; removing
    /// them is the explicit [`clear_laps`] action.
    ///
    /// [`clear_laps`]: StopwatchSession::clear_laps
    pub fn reset(&mut self) {
        self.watch.reset();
        self.ledger.reset_numbering();
    }

    pub fn is_running(&self) -> bool {
        self.watch.is_running()
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        self.watch.elapsed_ms(now_ms)
    }

    pub fn laps(&self) -> &[Lap] {
        self.ledger.laps()
    }

    pub fn extremes(&self) -> LapExtremes {
        self.ledger.extremes()
    }

    /// Record a lap at the current elapsed time and persist the full ledger.
    /// Returns `None` (and writes nothing) unless the stopwatch is running.
    pub fn record_lap(&mut self, now_ms: u64) -> Option<Lap> {
        if !self.watch.is_running() {
            return None;
        }
        let elapsed = self.watch.elapsed_ms(now_ms);
        let lap = self.ledger.record(elapsed).clone();
        self.persist_laps();
        Some(lap)
    }

    /// Empty the ledger and remove the stored key entirely (not an empty
    /// array).
    pub fn clear_laps(&mut self) {
        self.ledger.clear();
        self.store.remove(keys::LAPS);
    }

    /// Restore laps persisted by an earlier session. An absent key means no
    /// prior data; malformed JSON is treated the same way, with a warning,
    /// so loading can never fail a user action.
    pub fn load_saved_laps(&mut self) {
        let Some(raw) = self.store.get(keys::LAPS) else {
            return;
        };
        match serde_json::from_str::<Vec<Lap>>(&raw) {
            Ok(laps) => {
                info!("restored {} saved laps", laps.len());
                self.ledger.restore(laps);
            }
            Err(err) => warn!("ignoring malformed saved laps: {}", err),
        }
    }

    pub fn theme(&self) -> Theme {
        Theme::from_stored(self.store.get(keys::THEME).as_deref())
    }

    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.theme().toggled();
        self.store.set(keys::THEME, theme.as_str());
        theme
    }

    fn persist_laps(&self) {
        match serde_json::to_string(self.ledger.laps()) {
            Ok(json) => self.store.set(keys::LAPS, &json),
            Err(err) => warn!("failed to serialize laps: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(time: &FormattedTime) -> (&str, &str, &str) {
        (&time.minutes, &time.seconds, &time.milliseconds)
    }

    #[test]
    fn format_zero() {
        assert_eq!(fields(&format_time(0)), ("00", "00", "00"));
    }

    #[test]
    fn format_minute_second_hundredth() {
        assert_eq!(fields(&format_time(61_010)), ("01", "01", "01"));
    }

    #[test]
    fn format_has_no_minute_ceiling() {
        assert_eq!(fields(&format_time(3_600_000)), ("60", "00", "00"));
        assert_eq!(fields(&format_time(6_000_000)), ("100", "00", "00"));
    }

    #[test]
    fn format_truncates_to_hundredths() {
        assert_eq!(fields(&format_time(1_239)), ("00", "01", "23"));
    }

    #[test]
    fn display_is_colon_separated() {
        assert_eq!(format_time(61_010).to_string(), "01:01:01");
    }

    #[test]
    fn stopwatch_accumulates_across_pause() {
        let mut watch = Stopwatch::new();
        watch.start(1_000);
        assert_eq!(watch.elapsed_ms(1_500), 500);

        watch.pause(1_500);
        assert_eq!(watch.phase(), Phase::Paused);
        // Frozen while paused, whatever the clock says.
        assert_eq!(watch.elapsed_ms(9_999), 500);

        watch.start(2_000);
        assert_eq!(watch.elapsed_ms(2_300), 800);
    }

    #[test]
    fn start_while_running_keeps_the_epoch() {
        let mut watch = Stopwatch::new();
        watch.start(1_000);
        watch.start(2_000);
        assert_eq!(watch.elapsed_ms(3_000), 2_000);
    }

    #[test]
    fn pause_while_not_running_is_a_noop() {
        let mut watch = Stopwatch::new();
        watch.pause(5_000);
        assert_eq!(watch.phase(), Phase::Stopped);
        assert_eq!(watch.elapsed_ms(6_000), 0);
    }

    #[test]
    fn reset_returns_to_zero_from_any_phase() {
        let mut watch = Stopwatch::new();
        watch.start(1_000);
        watch.reset();
        assert_eq!(watch.phase(), Phase::Stopped);
        assert_eq!(watch.elapsed_ms(9_000), 0);

        watch.start(10_000);
        watch.pause(10_500);
        watch.reset();
        assert_eq!(watch.elapsed_ms(11_000), 0);
    }

    #[test]
    fn clock_regression_saturates() {
        let mut watch = Stopwatch::new();
        watch.start(1_000);
        assert_eq!(watch.elapsed_ms(500), 0);
    }

    #[test]
    fn splits_measure_against_previous_lap() {
        let mut ledger = LapLedger::new();
        for elapsed in [1_000, 2_500, 4_000] {
            ledger.record(elapsed);
        }

        let numbers: Vec<u32> = ledger.laps().iter().map(|lap| lap.number).collect();
        let splits: Vec<u64> = ledger.laps().iter().map(|lap| lap.split).collect();
        assert_eq!(numbers, [1, 2, 3]);
        assert_eq!(splits, [1_000, 1_500, 1_500]);
        // The first lap's split is its cumulative time.
        assert_eq!(ledger.laps()[0].time, ledger.laps()[0].split);
    }

    #[test]
    fn extremes_need_at_least_two_laps() {
        let mut ledger = LapLedger::new();
        assert_eq!(ledger.extremes(), LapExtremes::default());
        ledger.record(1_000);
        assert_eq!(ledger.extremes(), LapExtremes::default());
    }

    #[test]
    fn extremes_skip_the_first_lap_and_break_ties_first_found() {
        let mut ledger = LapLedger::new();
        for elapsed in [1_000, 2_500, 4_000] {
            ledger.record(elapsed);
        }
        // Splits are [1000, 1500, 1500]; lap 1 is ineligible, so lap 2 wins
        // both extremes over the tied lap 3.
        let extremes = ledger.extremes();
        assert_eq!(extremes.fastest, Some(2));
        assert_eq!(extremes.slowest, Some(2));
        // Deterministic across repeated calls.
        assert_eq!(ledger.extremes(), extremes);
    }

    #[test]
    fn extremes_pick_distinct_laps() {
        let mut ledger = LapLedger::new();
        for elapsed in [1_000, 2_500, 3_700] {
            ledger.record(elapsed);
        }
        // Splits [1000, 1500, 1200]: lap 3 fastest, lap 2 slowest.
        let extremes = ledger.extremes();
        assert_eq!(extremes.fastest, Some(3));
        assert_eq!(extremes.slowest, Some(2));
    }

    #[test]
    fn clear_restarts_numbering() {
        let mut ledger = LapLedger::new();
        ledger.record(1_000);
        ledger.record(2_000);
        ledger.clear();
        assert!(ledger.is_empty());
        assert_eq!(ledger.record(500).number, 1);
        // Baseline reset too: the first new split equals its cumulative time.
        assert_eq!(ledger.laps()[0].split, 500);
    }

    #[test]
    fn restore_resumes_numbering_past_the_maximum() {
        let mut source = LapLedger::new();
        source.record(1_000);
        source.record(2_500);
        source.record(4_000);
        let mut stored: Vec<Lap> = source.laps().to_vec();
        stored.remove(1); // numbers [1, 3] survive

        let mut ledger = LapLedger::new();
        ledger.restore(stored);
        let lap = ledger.record(5_000);
        assert_eq!(lap.number, 4);
        // Split baseline continues from the last stored cumulative time.
        assert_eq!(lap.split, 1_000);
    }

    #[test]
    fn restore_empty_starts_at_one() {
        let mut ledger = LapLedger::new();
        ledger.restore(Vec::new());
        assert_eq!(ledger.record(250).number, 1);
    }

    #[test]
    fn lap_serializes_with_camel_case_fields() {
        let mut ledger = LapLedger::new();
        ledger.record(61_010);
        let json = serde_json::to_string(ledger.laps()).unwrap();
        assert!(json.contains("\"formattedTime\""));
        assert!(json.contains("\"formattedSplit\""));
        assert!(json.contains("\"milliseconds\":\"01\""));
    }

    #[test]
    fn session_ignores_lap_while_not_running() {
        let store = MemoryStore::new();
        let mut session = StopwatchSession::new(store.clone());
        assert_eq!(session.record_lap(1_000), None);
        assert_eq!(store.get(keys::LAPS), None);
    }

    #[test]
    fn session_persists_every_recorded_lap() {
        let store = MemoryStore::new();
        let mut session = StopwatchSession::new(store.clone());
        session.start(0);
        session.record_lap(1_000);
        session.record_lap(2_500);

        let stored: Vec<Lap> = serde_json::from_str(&store.get(keys::LAPS).unwrap()).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1].split, 1_500);
    }

    #[test]
    fn reset_keeps_laps_but_clear_removes_them() {
        let store = MemoryStore::new();
        let mut session = StopwatchSession::new(store.clone());
        session.start(0);
        session.record_lap(1_000);

        session.reset();
        // Reset leaves the recorded laps alone, in memory and in storage.
        assert_eq!(session.laps().len(), 1);
        assert!(store.get(keys::LAPS).is_some());

        session.clear_laps();
        assert!(session.laps().is_empty());
        assert_eq!(store.get(keys::LAPS), None);
    }

    #[test]
    fn reset_restarts_numbering_and_baseline() {
        let store = MemoryStore::new();
        let mut session = StopwatchSession::new(store);
        session.start(0);
        session.record_lap(1_000);
        session.record_lap(2_500);

        session.reset();
        assert_eq!(session.elapsed_ms(9_000), 0);
        session.start(10_000);
        let lap = session.record_lap(10_400).unwrap();
        assert_eq!(lap.number, 1);
        // Baseline reset: the new first split equals its cumulative time.
        assert_eq!(lap.split, 400);
    }

    #[test]
    fn laps_reload_across_sessions() {
        let store = MemoryStore::new();
        let mut first = StopwatchSession::new(store.clone());
        first.start(0);
        first.record_lap(1_000);
        first.record_lap(2_500);

        let mut second = StopwatchSession::new(store.clone());
        second.load_saved_laps();
        assert_eq!(second.laps().len(), 2);
        second.start(10_000);
        let lap = second.record_lap(11_000).unwrap();
        assert_eq!(lap.number, 3);
    }

    #[test]
    fn malformed_saved_laps_load_as_empty() {
        let store = MemoryStore::new();
        store.set(keys::LAPS, "{not json");
        let mut session = StopwatchSession::new(store);
        session.load_saved_laps();
        assert!(session.laps().is_empty());
        session.start(0);
        assert_eq!(session.record_lap(100).unwrap().number, 1);
    }

    #[test]
    fn theme_defaults_to_light_and_toggles() {
        let store = MemoryStore::new();
        let mut session = StopwatchSession::new(store.clone());
        assert_eq!(session.theme(), Theme::Light);

        assert_eq!(session.toggle_theme(), Theme::Dark);
        assert_eq!(store.get(keys::THEME).as_deref(), Some("dark"));
        assert_eq!(session.toggle_theme(), Theme::Light);
        assert_eq!(store.get(keys::THEME).as_deref(), Some("light"));
    }

    #[test]
    fn unknown_stored_theme_reads_as_light() {
        assert_eq!(Theme::from_stored(Some("solarized")), Theme::Light);
        assert_eq!(Theme::from_stored(None), Theme::Light);
    }
}
