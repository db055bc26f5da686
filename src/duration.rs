//! Tie resolution: how long a note actually sounds once the extension
//! markers that follow it are folded in.
//!
//! Layout, playback and MIDI export all call through here so there is a
//! single rule for extensions.

use crate::model::Note;

/// Total beats for `notes[index]`, including trailing extensions.
///
/// Only a sounding note absorbs the extensions after it; a rest or a bare
/// extension reports its own duration. Returns 0.0 for an out-of-range
/// index.
pub fn total_duration(notes: &[Note], index: usize) -> f64 {
    let Some(seed) = notes.get(index) else {
        return 0.0;
    };
    if !seed.is_sounding() {
        return seed.duration;
    }

    seed.duration
        + notes[index + 1..]
            .iter()
            .take_while(|n| n.is_extension())
            .map(|n| n.duration)
            .sum::<f64>()
}

/// Number of extension markers directly after `notes[index]` that its
/// resolution consumes.
pub fn extension_count(notes: &[Note], index: usize) -> usize {
    match notes.get(index) {
        Some(seed) if seed.is_sounding() => notes[index + 1..]
            .iter()
            .take_while(|n| n.is_extension())
            .count(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Degree;

    fn one(duration: f64) -> Note {
        Note::sounding(Degree::new(1).unwrap(), duration)
    }

    #[test]
    fn plain_note() {
        let notes = vec![one(1.0), one(0.5)];
        assert_eq!(total_duration(&notes, 0), 1.0);
        assert_eq!(total_duration(&notes, 1), 0.5);
        assert_eq!(extension_count(&notes, 0), 0);
    }

    #[test]
    fn extensions_are_summed() {
        let notes = vec![
            one(1.0),
            Note::extension(1.0),
            Note::extension(0.5),
            one(1.0),
            Note::extension(1.0),
        ];
        assert_eq!(total_duration(&notes, 0), 2.5);
        assert_eq!(extension_count(&notes, 0), 2);
        assert_eq!(total_duration(&notes, 3), 2.0);
    }

    #[test]
    fn rest_does_not_absorb_extensions() {
        let notes = vec![Note::rest(1.0), Note::extension(1.0)];
        assert_eq!(total_duration(&notes, 0), 1.0);
        assert_eq!(extension_count(&notes, 0), 0);
    }

    #[test]
    fn extension_seed_reports_own_length() {
        let notes = vec![one(1.0), Note::extension(0.5)];
        assert_eq!(total_duration(&notes, 1), 0.5);
    }

    #[test]
    fn out_of_range() {
        assert_eq!(total_duration(&[], 0), 0.0);
        assert_eq!(total_duration(&[one(1.0)], 3), 0.0);
    }
}
