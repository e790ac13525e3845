//! Morse timeline building.
//!
//! A timeline is an ordered list of [`TimelineEvent`]s: one per dot or dash,
//! each carrying an absolute start offset (seconds from the beginning of the
//! run) and a duration. Gaps between symbols, letters, and words are not
//! events; they exist only as silence between event intervals. The audio
//! layer schedules one tone per event and the UI layer maps an elapsed time
//! back to the event sounding at that instant.
//!
//! Timing follows the PARIS standard: at `wpm` words per minute one unit is
//! `1.2 / wpm` seconds. A dot lasts one unit, a dash three. Symbols within a
//! letter are separated by one unit, letters by three, and words by seven on
//! top of the trailing letter gap, ten units of silence in all.

#![allow(clippy::unwrap_used)] // Tests use unwrap for brevity

use serde::{Deserialize, Serialize};

use crate::alphabet;

/// Which of the two Morse symbols an event sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneKind {
    Dot,
    Dash,
}

/// One scheduled dot or dash.
///
/// Events are immutable once built and ordered by `start_time` ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Dot or dash.
    pub kind: ToneKind,
    /// Seconds from the start of the run to the start of this tone.
    pub start_time: f64,
    /// Tone length in seconds.
    pub duration: f64,
    /// 0-based index of the translatable character this tone belongs to,
    /// counted across the whole input (word boundaries do not reset it).
    pub letter_index: usize,
    /// 0-based position of this symbol within its letter's code.
    pub symbol_index: usize,
    /// The (uppercased) character being spelled.
    pub ch: char,
}

impl TimelineEvent {
    /// Seconds from the start of the run to the end of this tone.
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }
}

/// Per-wpm durations derived from the PARIS standard.
#[derive(Debug, Clone, Copy)]
struct Timings {
    dot: f64,
    dash: f64,
    symbol_gap: f64,
    letter_gap: f64,
    word_gap: f64,
}

impl Timings {
    fn for_wpm(wpm: u32) -> Self {
        // wpm is a knob, not a contract: clamp instead of erroring.
        let unit = 1.2 / f64::from(wpm.max(1));
        Self {
            dot: unit,
            dash: unit * 3.0,
            symbol_gap: unit,
            letter_gap: unit * 3.0,
            word_gap: unit * 7.0,
        }
    }
}

/// Builds the tone timeline for `text` at `wpm` words per minute.
///
/// Pure and deterministic. Splits on whitespace; characters without a Morse
/// mapping are silently skipped and do not advance `letter_index`, so the
/// index always names the n-th translatable character of the whole input.
/// Empty or whitespace-only input produces an empty timeline. `wpm` is
/// clamped to at least 1.
pub fn build_timeline(text: &str, wpm: u32) -> Vec<TimelineEvent> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let timings = Timings::for_wpm(wpm);
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut timeline = Vec::new();
    let mut current_time = 0.0_f64;
    let mut letter_index = 0_usize;

    for (word_pos, word) in words.iter().enumerate() {
        let chars: Vec<char> = word.chars().collect();
        for (char_pos, &raw) in chars.iter().enumerate() {
            let ch = raw.to_ascii_uppercase();
            let Some(code) = alphabet::morse_code(ch) else {
                continue;
            };

            let symbol_count = code.len();
            for (symbol_index, symbol) in code.chars().enumerate() {
                let kind = if symbol == '.' { ToneKind::Dot } else { ToneKind::Dash };
                let duration = match kind {
                    ToneKind::Dot => timings.dot,
                    ToneKind::Dash => timings.dash,
                };
                timeline.push(TimelineEvent {
                    kind,
                    start_time: current_time,
                    duration,
                    letter_index,
                    symbol_index,
                    ch,
                });
                current_time += duration;
                if symbol_index < symbol_count - 1 {
                    current_time += timings.symbol_gap;
                }
            }

            letter_index += 1;
            // The last letter of the last word gets no trailing gap; the
            // last letter of every other word gets the letter gap before
            // the word gap below.
            if char_pos < chars.len() - 1 || word_pos < words.len() - 1 {
                current_time += timings.letter_gap;
            }
        }
        if word_pos < words.len() - 1 {
            current_time += timings.word_gap;
        }
    }

    timeline
}

/// Total run length in seconds: end of the last event, 0.0 when empty.
///
/// Trailing silence (gaps after the final tone) never counts.
pub fn timeline_duration(timeline: &[TimelineEvent]) -> f64 {
    timeline.last().map_or(0.0, TimelineEvent::end_time)
}

/// The event sounding at `time`, if any.
///
/// An event covers the half-open interval `[start_time, end_time)`; inside
/// a gap this returns `None`.
pub fn event_at_time(timeline: &[TimelineEvent], time: f64) -> Option<&TimelineEvent> {
    timeline
        .iter()
        .find(|ev| time >= ev.start_time && time < ev.end_time())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn test_empty_input() {
        assert!(build_timeline("", 20).is_empty());
        assert!(build_timeline("   \t\n ", 20).is_empty());
    }

    #[test]
    fn test_unsupported_only_input() {
        assert!(build_timeline("!?!", 20).is_empty());
        assert!(build_timeline("... --- ...", 20).is_empty());
        assert!(build_timeline("çé ßø", 20).is_empty());
    }

    #[test]
    fn test_single_dot_letter() {
        // E is a single dot: one event at t=0, one unit long.
        let tl = build_timeline("E", 20);
        assert_eq!(tl.len(), 1);
        assert_eq!(tl[0].kind, ToneKind::Dot);
        assert!(close(tl[0].start_time, 0.0));
        assert!(close(tl[0].duration, 0.06));
        assert_eq!(tl[0].letter_index, 0);
        assert_eq!(tl[0].symbol_index, 0);
        assert_eq!(tl[0].ch, 'E');
    }

    #[test]
    fn test_dash_is_three_units() {
        // A = .-  : dot, one-unit gap, dash three units long.
        let tl = build_timeline("A", 20);
        assert_eq!(tl.len(), 2);
        assert!(close(tl[0].duration, 0.06));
        assert!(close(tl[1].start_time, 0.12));
        assert!(close(tl[1].duration, 0.18));
        assert!(close(timeline_duration(&tl), 0.30));
    }

    #[test]
    fn test_sos_at_20_wpm() {
        // unit = 0.06s. S=... O=--- S=...
        let tl = build_timeline("SOS", 20);
        assert_eq!(tl.len(), 9);

        let dots = tl.iter().filter(|ev| ev.kind == ToneKind::Dot).count();
        let dashes = tl.iter().filter(|ev| ev.kind == ToneKind::Dash).count();
        assert_eq!(dots, 6);
        assert_eq!(dashes, 3);

        // First S: dots at 0, 0.12, 0.24 separated by 0.06 gaps.
        assert!(close(tl[0].start_time, 0.0));
        assert!(close(tl[1].start_time, 0.12));
        assert!(close(tl[2].start_time, 0.24));
        for ev in &tl[0..3] {
            assert!(close(ev.duration, 0.06));
            assert_eq!(ev.letter_index, 0);
            assert_eq!(ev.ch, 'S');
        }

        // O starts after a 0.18 letter gap, dashes 0.18 long.
        assert!(close(tl[3].start_time, 0.48));
        assert!(close(tl[4].start_time, 0.72));
        assert!(close(tl[5].start_time, 0.96));
        for ev in &tl[3..6] {
            assert!(close(ev.duration, 0.18));
            assert_eq!(ev.letter_index, 1);
            assert_eq!(ev.ch, 'O');
        }

        // Second S after another 0.18 letter gap.
        assert!(close(tl[6].start_time, 1.32));
        assert!(close(tl[7].start_time, 1.44));
        assert!(close(tl[8].start_time, 1.56));
        for ev in &tl[6..9] {
            assert_eq!(ev.letter_index, 2);
        }

        // 9 symbols + 6 symbol gaps + 2 letter gaps, no trailing gap.
        assert!(close(timeline_duration(&tl), 1.62));
        assert_eq!(tl.iter().map(|ev| ev.symbol_index).collect::<Vec<_>>(), vec![
            0, 1, 2, 0, 1, 2, 0, 1, 2
        ]);
    }

    #[test]
    fn test_word_gap() {
        // "E E": second word starts after letter gap (3u) + word gap (7u),
        // i.e. ten units of silence between the tones.
        let tl = build_timeline("E E", 20);
        assert_eq!(tl.len(), 2);
        assert!(close(tl[0].end_time(), 0.06));
        assert!(close(tl[1].start_time, 0.66));
    }

    #[test]
    fn test_word_gap_survives_empty_word() {
        // A word of only unsupported characters still advances the clock by
        // its word gap, so the next word starts late.
        let tl = build_timeline("!! E", 20);
        assert_eq!(tl.len(), 1);
        assert!(close(tl[0].start_time, 0.42));
    }

    #[test]
    fn test_unsupported_char_inside_word() {
        // "a!b": the '!' is skipped without a gap of its own and without
        // consuming a letter index.
        let tl = build_timeline("a!b", 20);
        let a_events: Vec<_> = tl.iter().filter(|ev| ev.ch == 'A').collect();
        let b_events: Vec<_> = tl.iter().filter(|ev| ev.ch == 'B').collect();
        assert_eq!(a_events.len(), 2);
        assert_eq!(b_events.len(), 4);
        assert_eq!(a_events[0].letter_index, 0);
        assert_eq!(b_events[0].letter_index, 1);
        // A ends at 0.30; letter gap 0.18; B starts at 0.48.
        assert!(close(b_events[0].start_time, 0.48));
    }

    #[test]
    fn test_case_insensitive_and_uppercased() {
        let lower = build_timeline("sos", 20);
        let upper = build_timeline("SOS", 20);
        assert_eq!(lower, upper);
        assert!(lower.iter().all(|ev| ev.ch == 'S' || ev.ch == 'O'));
    }

    #[test]
    fn test_digits() {
        let tl = build_timeline("73", 20);
        assert_eq!(tl.len(), 10);
        assert_eq!(tl[0].ch, '7');
        assert_eq!(tl[5].ch, '3');
        assert_eq!(tl[5].letter_index, 1);
    }

    #[test]
    fn test_letter_index_contiguous_across_words() {
        let tl = build_timeline("hi yo", 20);
        let indices: Vec<usize> = tl.iter().map(|ev| ev.letter_index).collect();
        assert_eq!(indices.first(), Some(&0));
        assert_eq!(indices.last(), Some(&3));
    }

    #[test]
    fn test_wpm_scales_unit() {
        // Doubling wpm halves every duration.
        let slow = build_timeline("SOS", 10);
        let fast = build_timeline("SOS", 20);
        for (s, f) in slow.iter().zip(&fast) {
            assert!(close(s.duration, f.duration * 2.0));
            assert!(close(s.start_time, f.start_time * 2.0));
        }
    }

    #[test]
    fn test_wpm_zero_clamped() {
        let tl = build_timeline("E", 0);
        assert_eq!(tl.len(), 1);
        assert!(close(tl[0].duration, 1.2));
    }

    #[test]
    fn test_duration_empty() {
        assert!(close(timeline_duration(&[]), 0.0));
    }

    #[test]
    fn test_duration_grows_with_input() {
        let a = timeline_duration(&build_timeline("SOS", 20));
        let b = timeline_duration(&build_timeline("SOSO", 20));
        let c = timeline_duration(&build_timeline("SOSO X", 20));
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_event_at_time_inside_tone() {
        let tl = build_timeline("A", 20);
        // Dot covers [0, 0.06), gap [0.06, 0.12), dash [0.12, 0.30).
        assert_eq!(event_at_time(&tl, 0.0).unwrap().kind, ToneKind::Dot);
        assert_eq!(event_at_time(&tl, 0.03).unwrap().kind, ToneKind::Dot);
        assert_eq!(event_at_time(&tl, 0.12).unwrap().kind, ToneKind::Dash);
        assert_eq!(event_at_time(&tl, 0.29).unwrap().kind, ToneKind::Dash);
    }

    #[test]
    fn test_event_at_time_inside_gap_or_outside() {
        let tl = build_timeline("A", 20);
        assert!(event_at_time(&tl, 0.09).is_none()); // symbol gap
        assert!(event_at_time(&tl, 0.30).is_none()); // end is exclusive
        assert!(event_at_time(&tl, -0.01).is_none());
        assert!(event_at_time(&tl, 100.0).is_none());
        assert!(event_at_time(&[], 0.0).is_none());
    }

    #[test]
    fn test_serde_round_trip() {
        let tl = build_timeline("OK", 20);
        let json = serde_json::to_string(&tl).unwrap();
        assert!(json.contains("\"dash\""));
        let back: Vec<TimelineEvent> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tl);
    }

    proptest! {
        #[test]
        fn prop_events_ordered_and_non_overlapping(
            text in "[a-zA-Z0-9 .,!?]{0,48}",
            wpm in 1_u32..=60,
        ) {
            let tl = build_timeline(&text, wpm);
            for pair in tl.windows(2) {
                prop_assert!(pair[1].start_time >= pair[0].end_time() - EPS);
            }
            for ev in &tl {
                prop_assert!(ev.start_time >= 0.0);
                prop_assert!(ev.duration > 0.0);
            }
        }

        #[test]
        fn prop_letter_indices_contiguous(
            text in "[a-zA-Z0-9 .,!?]{0,48}",
            wpm in 1_u32..=60,
        ) {
            let tl = build_timeline(&text, wpm);
            let mut expected_next = 0_usize;
            for ev in &tl {
                if ev.symbol_index == 0 && ev.letter_index == expected_next {
                    expected_next += 1;
                }
                prop_assert!(ev.letter_index < expected_next);
            }
        }

        #[test]
        fn prop_symbol_indices_follow_code(
            text in "[a-zA-Z0-9]{1,16}",
            wpm in 1_u32..=60,
        ) {
            let tl = build_timeline(&text, wpm);
            let mut prev: Option<&TimelineEvent> = None;
            for ev in &tl {
                match prev {
                    Some(p) if p.letter_index == ev.letter_index => {
                        prop_assert_eq!(ev.symbol_index, p.symbol_index + 1);
                    }
                    _ => prop_assert_eq!(ev.symbol_index, 0),
                }
                prev = Some(ev);
            }
        }

        #[test]
        fn prop_dash_is_triple_dot(wpm in 1_u32..=60) {
            // A = .- gives one of each in a single letter.
            let tl = build_timeline("A", wpm);
            prop_assert!(close(tl[1].duration, tl[0].duration * 3.0));
            // Gap between them is exactly one dot.
            prop_assert!(close(tl[1].start_time - tl[0].end_time(), tl[0].duration));
        }

        #[test]
        fn prop_duration_monotone_under_append(
            words in proptest::collection::vec("[a-z0-9]{1,8}", 1..6),
            wpm in 1_u32..=60,
        ) {
            let mut last = 0.0_f64;
            for k in 1..=words.len() {
                let text = words[..k].join(" ");
                let dur = timeline_duration(&build_timeline(&text, wpm));
                prop_assert!(dur >= last - EPS);
                last = dur;
            }
        }

        #[test]
        fn prop_event_at_time_finds_every_event(
            text in "[a-z0-9 ]{0,24}",
            wpm in 5_u32..=40,
        ) {
            let tl = build_timeline(&text, wpm);
            for ev in &tl {
                let mid = ev.start_time + ev.duration / 2.0;
                let found = event_at_time(&tl, mid);
                prop_assert!(found.is_some());
                prop_assert_eq!(found.unwrap(), ev);
            }
        }
    }
}
