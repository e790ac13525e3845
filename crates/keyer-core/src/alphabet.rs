//! Morse code and NATO phonetic alphabet lookup tables.
//!
//! Both lookups are case-insensitive and cover exactly the characters the
//! playback engine can sound out: letters A-Z for both tables, digits 0-9
//! for Morse only. Everything else maps to `None` and is skipped upstream.

#![allow(clippy::unwrap_used)] // Tests use unwrap for brevity

/// International Morse code for a single character.
///
/// Returns the dot/dash pattern (`'.'` = dot, `'-'` = dash) for letters and
/// digits, or `None` for characters with no Morse mapping.
pub const fn morse_code(ch: char) -> Option<&'static str> {
    let code = match ch.to_ascii_uppercase() {
        'A' => ".-",
        'B' => "-...",
        'C' => "-.-.",
        'D' => "-..",
        'E' => ".",
        'F' => "..-.",
        'G' => "--.",
        'H' => "....",
        'I' => "..",
        'J' => ".---",
        'K' => "-.-",
        'L' => ".-..",
        'M' => "--",
        'N' => "-.",
        'O' => "---",
        'P' => ".--.",
        'Q' => "--.-",
        'R' => ".-.",
        'S' => "...",
        'T' => "-",
        'U' => "..-",
        'V' => "...-",
        'W' => ".--",
        'X' => "-..-",
        'Y' => "-.--",
        'Z' => "--..",
        '0' => "-----",
        '1' => ".----",
        '2' => "..---",
        '3' => "...--",
        '4' => "....-",
        '5' => ".....",
        '6' => "-....",
        '7' => "--...",
        '8' => "---..",
        '9' => "----.",
        _ => return None,
    };
    Some(code)
}

/// NATO phonetic alphabet word for a single letter.
///
/// Returns `None` for anything outside A-Z (digits have no NATO word).
pub const fn nato_word(ch: char) -> Option<&'static str> {
    let word = match ch.to_ascii_uppercase() {
        'A' => "Alpha",
        'B' => "Bravo",
        'C' => "Charlie",
        'D' => "Delta",
        'E' => "Echo",
        'F' => "Foxtrot",
        'G' => "Golf",
        'H' => "Hotel",
        'I' => "India",
        'J' => "Juliett",
        'K' => "Kilo",
        'L' => "Lima",
        'M' => "Mike",
        'N' => "November",
        'O' => "Oscar",
        'P' => "Papa",
        'Q' => "Quebec",
        'R' => "Romeo",
        'S' => "Sierra",
        'T' => "Tango",
        'U' => "Uniform",
        'V' => "Victor",
        'W' => "Whiskey",
        'X' => "X-ray",
        'Y' => "Yankee",
        'Z' => "Zulu",
        _ => return None,
    };
    Some(word)
}

/// True if the character has a Morse mapping and will produce tone events.
pub const fn is_translatable(ch: char) -> bool {
    morse_code(ch).is_some()
}
