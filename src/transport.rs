//! Transport: play/pause/stop over a schedule, firing tones into a sink.
//!
//! The transport owns no clock. The shell calls [`Transport::advance`]
//! with the wall time that passed, and every event that has become due is
//! handed to the [`ToneSink`] once. Stopping or restarting drops the
//! pending queue in a single step, so nothing from an earlier run can
//! fire afterwards.

use std::collections::VecDeque;

use serde::Serialize;

use crate::pitch::note_name;
use crate::schedule::{Schedule, ToneEvent};

/// Transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PlayerState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlayerState {
    pub fn is_playing(&self) -> bool {
        matches!(self, PlayerState::Playing)
    }

    /// Stopped or paused
    pub fn is_stopped(&self) -> bool {
        matches!(self, PlayerState::Stopped | PlayerState::Paused)
    }
}

/// Receiver of fired tones. Fire-and-forget: the transport never hears
/// back about a tone once it is handed over.
pub trait ToneSink {
    /// `at_time` is the tone's start in seconds from the beginning of the run.
    fn play_tone(&mut self, frequency: f64, duration_secs: f64, at_time: f64);
}

impl<F> ToneSink for F
where
    F: FnMut(f64, f64, f64),
{
    fn play_tone(&mut self, frequency: f64, duration_secs: f64, at_time: f64) {
        self(frequency, duration_secs, at_time)
    }
}

/// The note currently sounding in one voice, for highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SoundingNote {
    pub track_index: usize,
    pub note_index: usize,
    /// Position (seconds) at which the note stops sounding
    pub until_secs: f64,
}

#[derive(Debug, Default)]
pub struct Transport {
    state: PlayerState,
    pending: VecDeque<ToneEvent>,
    position_secs: f64,
    end_secs: f64,
    sounding: Vec<Option<SoundingNote>>,
}

impl Transport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Seconds since the start of the current run.
    pub fn position(&self) -> f64 {
        self.position_secs
    }

    /// Events not yet fired.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Currently sounding note per voice (index = track index).
    pub fn sounding(&self) -> &[Option<SoundingNote>] {
        &self.sounding
    }

    /// Start playback, or resume when paused.
    ///
    /// While already playing, the pending events are discarded and the new
    /// schedule starts over from position 0.
    pub fn play(&mut self, schedule: &Schedule) {
        match self.state {
            PlayerState::Paused => {
                log::debug!("[TRANSPORT] resume at {:.3}s", self.position_secs);
            }
            PlayerState::Playing | PlayerState::Stopped => {
                self.reset();
                self.pending = schedule.events().into_iter().cloned().collect();
                self.end_secs = schedule.duration_secs();
                self.sounding = vec![None; schedule.tracks.len()];
                log::debug!(
                    "[TRANSPORT] play: {} events, {:.3}s",
                    self.pending.len(),
                    self.end_secs
                );
            }
        }
        self.state = PlayerState::Playing;
    }

    /// Hold the position; nothing fires until `play` is called again.
    pub fn pause(&mut self) {
        if self.state == PlayerState::Playing {
            self.state = PlayerState::Paused;
            log::debug!("[TRANSPORT] pause at {:.3}s", self.position_secs);
        }
    }

    /// Drop pending events, rewind, clear the highlight.
    pub fn stop(&mut self) {
        self.reset();
        self.state = PlayerState::Stopped;
        log::debug!("[TRANSPORT] stop");
    }

    fn reset(&mut self) {
        self.pending.clear();
        self.position_secs = 0.0;
        self.end_secs = 0.0;
        self.sounding.iter_mut().for_each(|s| *s = None);
    }

    /// Move the position forward by `elapsed` seconds and fire every event
    /// that has become due. Returns how many tones were fired.
    ///
    /// Reaching the end of the schedule stops the transport.
    pub fn advance<S: ToneSink + ?Sized>(&mut self, elapsed: f64, sink: &mut S) -> usize {
        if !self.state.is_playing() {
            return 0;
        }
        self.position_secs += elapsed.max(0.0);
        let now = self.position_secs;

        let mut fired = 0;
        while self.pending.front().is_some_and(|e| e.start_secs <= now) {
            let Some(event) = self.pending.pop_front() else {
                break;
            };
            log::trace!(
                "[TRANSPORT] fire track {} note {} {} ({:.2}Hz) at {:.3}s",
                event.track_index,
                event.note_index,
                note_name(event.midi_pitch),
                event.frequency,
                event.start_secs
            );
            sink.play_tone(event.frequency, event.duration_secs, event.start_secs);
            fired += 1;

            if !event.is_grace {
                if let Some(slot) = self.sounding.get_mut(event.track_index) {
                    *slot = Some(SoundingNote {
                        track_index: event.track_index,
                        note_index: event.note_index,
                        until_secs: event.start_secs + event.duration_secs,
                    });
                }
            }
        }

        for slot in &mut self.sounding {
            if slot.is_some_and(|s| s.until_secs <= now) {
                *slot = None;
            }
        }

        if self.pending.is_empty() && now >= self.end_secs {
            log::debug!("[TRANSPORT] finished at {:.3}s", now);
            self.stop();
        }
        fired
    }
}
