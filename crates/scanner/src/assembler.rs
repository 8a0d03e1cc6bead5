//! Keystroke-to-scan assembly.
//!
//! A keyboard-wedge scanner types its payload like a very fast user. There is
//! no start marker and the end marker (Enter/Tab) is optional, so a scan ends
//! either at a terminator or when input goes idle. The idle window depends on
//! the session phase: a location code is typed once and may be slow; item
//! scans come in quick bursts.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use tallyscan_core::{Clock, SessionState};

use crate::keymap::{Control, KeyInput};
use crate::timer::{IdleScheduler, TimerId};

/// One reconstructed scan: trimmed, never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanEvent {
    text: String,
    received_at: DateTime<Utc>,
}

impl ScanEvent {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Idle window per session phase. `None` disables idle flushing in that
/// phase, leaving only the terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleTimeouts {
    pub awaiting_location: Option<Duration>,
    pub awaiting_items: Option<Duration>,
    pub finished: Option<Duration>,
}

impl Default for IdleTimeouts {
    fn default() -> Self {
        Self {
            awaiting_location: Some(Duration::from_millis(250)),
            awaiting_items: Some(Duration::from_millis(90)),
            finished: Some(Duration::from_millis(250)),
        }
    }
}

impl IdleTimeouts {
    pub fn for_state(&self, state: SessionState) -> Option<Duration> {
        match state {
            SessionState::AwaitingLocation => self.awaiting_location,
            SessionState::AwaitingItems => self.awaiting_items,
            SessionState::Finished => self.finished,
        }
    }
}

/// Pending-buffer state machine.
///
/// Methods take `&mut self`: a flushed [`ScanEvent`] must be handled before
/// the next keystroke can be fed in, so two scans never interleave.
pub struct ScanAssembler<S: IdleScheduler> {
    buffer: String,
    live_timer: Option<TimerId>,
    timeouts: IdleTimeouts,
    scheduler: S,
    clock: Arc<dyn Clock>,
}

impl<S: IdleScheduler + core::fmt::Debug> core::fmt::Debug for ScanAssembler<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScanAssembler")
            .field("buffer", &self.buffer)
            .field("live_timer", &self.live_timer)
            .field("timeouts", &self.timeouts)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

impl<S: IdleScheduler> ScanAssembler<S> {
    pub fn new(timeouts: IdleTimeouts, scheduler: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            buffer: String::new(),
            live_timer: None,
            timeouts,
            scheduler,
            clock,
        }
    }

    /// Characters received since the last flush.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    pub fn live_timer(&self) -> Option<TimerId> {
        self.live_timer
    }

    pub fn timeouts(&self) -> &IdleTimeouts {
        &self.timeouts
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn on_key(&mut self, key: KeyInput, state: SessionState) -> Option<ScanEvent> {
        match key {
            KeyInput::Char(c) => {
                self.on_char(c, state);
                None
            }
            KeyInput::Control(control) => self.on_control(control, state),
        }
    }

    pub fn on_char(&mut self, c: char, state: SessionState) {
        self.buffer.push(c);
        self.rearm(state);
    }

    pub fn on_control(&mut self, control: Control, state: SessionState) -> Option<ScanEvent> {
        match control {
            Control::Terminator => self.flush(),
            Control::Backspace => {
                self.buffer.pop();
                self.rearm(state);
                None
            }
        }
    }

    /// Side-channel producer (a text field the scanner also fills, a paste).
    /// Its value replaces the buffer rather than being appended to it.
    pub fn on_field_input(&mut self, value: &str, state: SessionState) {
        if value.is_empty() {
            return;
        }
        self.buffer.clear();
        self.buffer.push_str(value);
        self.rearm(state);
    }

    /// The timer `id` elapsed. Timers other than the live one are stale.
    pub fn on_idle_timeout(&mut self, id: TimerId) -> Option<ScanEvent> {
        if self.live_timer != Some(id) {
            trace!(%id, "ignoring stale idle timer");
            return None;
        }
        self.live_timer = None;
        self.flush()
    }

    /// Emit the buffer as a scan (if it holds anything but whitespace) and
    /// reset buffer and timer.
    pub fn flush(&mut self) -> Option<ScanEvent> {
        if let Some(id) = self.live_timer.take() {
            self.scheduler.cancel(id);
        }
        let raw = std::mem::take(&mut self.buffer);
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        debug!(len = text.len(), "scan assembled");
        Some(ScanEvent {
            text: text.to_string(),
            received_at: self.clock.now(),
        })
    }

    fn rearm(&mut self, state: SessionState) {
        if let Some(id) = self.live_timer.take() {
            self.scheduler.cancel(id);
        }
        if let Some(timeout) = self.timeouts.for_state(state) {
            self.live_timer = Some(self.scheduler.arm(timeout));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::SimulatedScheduler;
    use proptest::prelude::*;
    use tallyscan_core::FixedClock;

    const LOC: SessionState = SessionState::AwaitingLocation;
    const ITEMS: SessionState = SessionState::AwaitingItems;

    fn assembler() -> ScanAssembler<SimulatedScheduler> {
        ScanAssembler::new(
            IdleTimeouts::default(),
            SimulatedScheduler::new(),
            Arc::new(FixedClock::new(Utc::now())),
        )
    }

    fn type_str(asm: &mut ScanAssembler<SimulatedScheduler>, s: &str, state: SessionState) {
        for c in s.chars() {
            asm.on_char(c, state);
        }
    }

    /// Advance simulated time and deliver every due timer.
    fn idle(asm: &mut ScanAssembler<SimulatedScheduler>, ms: u64) -> Vec<ScanEvent> {
        let due = asm.scheduler_mut().advance(Duration::from_millis(ms));
        due.into_iter().filter_map(|id| asm.on_idle_timeout(id)).collect()
    }

    #[test]
    fn terminator_flushes_immediately_and_cancels_timer() {
        let mut asm = assembler();
        type_str(&mut asm, "  A1-03 ", LOC);
        assert_eq!(asm.scheduler().live_timers(), 1);

        let event = asm.on_control(Control::Terminator, LOC).unwrap();
        assert_eq!(event.text(), "A1-03");
        assert_eq!(asm.pending(), "");
        assert_eq!(asm.live_timer(), None);
        assert_eq!(asm.scheduler().live_timers(), 0);
    }

    #[test]
    fn backspace_removes_last_character() {
        let mut asm = assembler();
        type_str(&mut asm, "A1X", LOC);
        asm.on_control(Control::Backspace, LOC);
        type_str(&mut asm, "2", LOC);
        let event = asm.on_control(Control::Terminator, LOC).unwrap();
        assert_eq!(event.text(), "A12");
    }

    #[test]
    fn empty_buffer_never_produces_an_event() {
        let mut asm = assembler();
        assert!(asm.on_control(Control::Terminator, LOC).is_none());
        type_str(&mut asm, "   ", LOC);
        assert!(asm.on_control(Control::Terminator, LOC).is_none());
        asm.on_control(Control::Backspace, LOC);
        assert!(idle(&mut asm, 1_000).is_empty());
    }

    #[test]
    fn idle_window_is_longer_while_awaiting_a_location() {
        let mut asm = assembler();
        type_str(&mut asm, "LOC-7", LOC);
        assert!(idle(&mut asm, 200).is_empty());
        let flushed = idle(&mut asm, 50);
        assert_eq!(flushed.len(), 1);
        assert_eq!(flushed[0].text(), "LOC-7");
    }

    #[test]
    fn idle_window_is_shorter_while_awaiting_items() {
        let mut asm = assembler();
        type_str(&mut asm, "ITEM-1", ITEMS);
        assert!(idle(&mut asm, 89).is_empty());
        let flushed = idle(&mut asm, 1);
        assert_eq!(flushed.len(), 1);
        assert_eq!(flushed[0].text(), "ITEM-1");
    }

    #[test]
    fn same_idle_gap_splits_items_but_not_a_location() {
        // 120ms between bursts: two items, but one location code.
        let mut asm = assembler();
        type_str(&mut asm, "AAA", ITEMS);
        let first = idle(&mut asm, 120);
        type_str(&mut asm, "BBB", ITEMS);
        let second = idle(&mut asm, 120);
        assert_eq!(first[0].text(), "AAA");
        assert_eq!(second[0].text(), "BBB");

        type_str(&mut asm, "AAA", LOC);
        assert!(idle(&mut asm, 120).is_empty());
        type_str(&mut asm, "BBB", LOC);
        let flushed = idle(&mut asm, 250);
        assert_eq!(flushed.len(), 1);
        assert_eq!(flushed[0].text(), "AAABBB");
    }

    #[test]
    fn each_keystroke_rearms_a_single_timer() {
        let mut asm = assembler();
        for c in "0123456789".chars() {
            asm.on_char(c, ITEMS);
            assert_eq!(asm.scheduler().live_timers(), 1);
            assert!(idle(&mut asm, 50).is_empty());
        }
        assert_eq!(idle(&mut asm, 40)[0].text(), "0123456789");
    }

    #[test]
    fn stale_timer_is_ignored() {
        let mut asm = assembler();
        asm.on_char('A', ITEMS);
        let stale = asm.live_timer().unwrap();
        asm.on_char('B', ITEMS);
        assert!(asm.on_idle_timeout(stale).is_none());
        assert_eq!(asm.pending(), "AB");
    }

    #[test]
    fn field_input_replaces_buffer_and_rearms() {
        let mut asm = assembler();
        type_str(&mut asm, "02RE", ITEMS);
        asm.on_field_input("02REF100", ITEMS);
        assert_eq!(asm.pending(), "02REF100");
        assert_eq!(asm.scheduler().live_timers(), 1);
        let flushed = idle(&mut asm, 90);
        assert_eq!(flushed.len(), 1);
        assert_eq!(flushed[0].text(), "02REF100");
    }

    #[test]
    fn empty_field_input_is_ignored() {
        let mut asm = assembler();
        type_str(&mut asm, "X", ITEMS);
        asm.on_field_input("", ITEMS);
        assert_eq!(asm.pending(), "X");
    }

    #[test]
    fn disabled_phase_waits_for_terminator() {
        let mut asm = ScanAssembler::new(
            IdleTimeouts {
                finished: None,
                ..IdleTimeouts::default()
            },
            SimulatedScheduler::new(),
            Arc::new(FixedClock::new(Utc::now())),
        );
        type_str(&mut asm, "LOC-9", SessionState::Finished);
        assert_eq!(asm.live_timer(), None);
        assert!(idle(&mut asm, 10_000).is_empty());
        let event = asm.on_control(Control::Terminator, SessionState::Finished);
        assert_eq!(event.unwrap().text(), "LOC-9");
    }

    #[test]
    fn control_bytes_inside_payload_survive_assembly() {
        let mut asm = assembler();
        type_str(&mut asm, "\x1D02REF\x1D10L", ITEMS);
        let event = asm.on_control(Control::Terminator, ITEMS).unwrap();
        assert_eq!(event.text(), "\x1D02REF\x1D10L");
    }

    proptest! {
        /// Property: whatever is typed comes out trimmed, in one piece, when
        /// the gap before the terminator is shorter than the idle window.
        #[test]
        fn terminated_burst_is_one_trimmed_event(text in "[ -~]{1,48}") {
            let mut asm = assembler();
            type_str(&mut asm, &text, ITEMS);
            let event = asm.on_control(Control::Terminator, ITEMS);
            let expected = text.trim();
            if expected.is_empty() {
                prop_assert!(event.is_none());
            } else {
                prop_assert_eq!(event.map(ScanEvent::into_text), Some(expected.to_string()));
            }
            prop_assert_eq!(asm.scheduler().live_timers(), 0);
        }
    }

    #[test]
    fn event_carries_clock_timestamp() {
        let at = Utc::now();
        let mut asm = ScanAssembler::new(
            IdleTimeouts::default(),
            SimulatedScheduler::new(),
            Arc::new(FixedClock::new(at)),
        );
        type_str(&mut asm, "X", LOC);
        assert_eq!(asm.flush().unwrap().received_at(), at);
    }
}
