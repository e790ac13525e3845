//! NATO phonetic readout for display next to playback.
//!
//! Purely presentational: the playback engine never consults this, but the
//! same input text that feeds the timeline builder can be rendered as
//! per-letter phonetic words ("H - Hotel") by a UI or the CLI.

use crate::alphabet;

/// One input character with its phonetic word, if it has one.
///
/// Characters without a NATO mapping (digits, punctuation) are retained so
/// a renderer can show them, just without a word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedLetter {
    /// The uppercased input character.
    pub ch: char,
    /// Its NATO phonetic word, or `None` when unmapped.
    pub nato: Option<&'static str>,
}

/// One whitespace-delimited word of the input, translated letter by letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedWord {
    /// The uppercased word as typed (unsupported characters included).
    pub text: String,
    pub letters: Vec<TranslatedLetter>,
}

/// Translates `text` into per-word phonetic readouts.
///
/// Splits on whitespace like the timeline builder; empty input yields an
/// empty list.
pub fn translate(text: &str) -> Vec<TranslatedWord> {
    text.split_whitespace()
        .map(|word| TranslatedWord {
            text: word.to_ascii_uppercase(),
            letters: word
                .chars()
                .map(|raw| {
                    let ch = raw.to_ascii_uppercase();
                    TranslatedLetter {
                        ch,
                        nato: alphabet::nato_word(ch),
                    }
                })
                .collect(),
        })
        .collect()
}
