//! # Keyer
//!
//! Morse code playback from the command line: play text as tones with a
//! live terminal highlight, print NATO phonetic readouts, or dump the tone
//! timeline as JSON.

use std::env;
use std::io::{self, Write};
use std::process;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use keyer_audio::{MorsePlayer, PlayMode, PlayerConfig, ToneParams, ToneScheduler};
use keyer_core::{alphabet, build_timeline, translate};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "Usage: keyer <command> <text> [options]

Commands:
  play      Play text as Morse code tones
  nato      Print the NATO phonetic readout
  timeline  Print the tone timeline as JSON

Options:
  --wpm <n>   Keying speed in words per minute (default: 20)

Examples:
  keyer play \"hello world\"
  keyer play sos --wpm 25
  keyer nato cq
  keyer timeline paris
";

/// Default keying speed when `--wpm` is not given.
const DEFAULT_WPM: u32 = 20;

/// Cadence of the terminal highlight loop (roughly one video frame).
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

const HIGHLIGHT: &str = "\x1b[7m";
const RESET: &str = "\x1b[0m";

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keyer=info,keyer_audio=info,keyer_core=info".into()),
        )
        .init();

    info!("Keyer v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        eprintln!("{USAGE}");
        process::exit(1);
    };

    match command.as_str() {
        "play" | "nato" | "timeline" if rest.is_empty() => {
            eprintln!("{USAGE}");
            process::exit(1);
        }
        "play" => {
            let (text, wpm) = parse_text_args(rest)?;
            cmd_play(&text, wpm)
        }
        "nato" => {
            let (text, _) = parse_text_args(rest)?;
            cmd_nato(&text);
            Ok(())
        }
        "timeline" => {
            let (text, wpm) = parse_text_args(rest)?;
            cmd_timeline(&text, wpm)
        }
        other => {
            eprintln!("Unknown command: {other}\n\n{USAGE}");
            process::exit(1);
        }
    }
}

/// Splits a command's arguments into the text to key and the options that
/// follow it. Every word that is not an option joins the text.
fn parse_text_args(args: &[String]) -> Result<(String, u32)> {
    let mut words = Vec::new();
    let mut wpm = DEFAULT_WPM;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--wpm" {
            let value = iter.next().context("--wpm requires a value")?;
            wpm = value
                .parse()
                .with_context(|| format!("Invalid wpm value: {value}"))?;
        } else {
            words.push(arg.as_str());
        }
    }
    if words.is_empty() {
        bail!("No text given");
    }
    Ok((words.join(" "), wpm))
}

/// Plays `text` as tones, redrawing a highlight line until the run ends.
fn cmd_play(text: &str, wpm: u32) -> Result<()> {
    let scheduler = ToneScheduler::new(ToneParams::default());
    let config = PlayerConfig {
        wpm,
        mode: PlayMode::Replace,
    };
    let mut player = MorsePlayer::new(scheduler, config);
    if let Err(err) = player.play(text) {
        if err.is_device_unavailable() {
            bail!("{err}. Connect an audio output and try again.");
        }
        return Err(err.into());
    }

    let cells = display_cells(text);
    let mut stdout = io::stdout();
    while player.is_playing() {
        player.tick();
        write!(stdout, "\r\x1b[K{}", render_line(&cells, &player))?;
        stdout.flush()?;
        thread::sleep(FRAME_INTERVAL);
    }
    writeln!(stdout)?;
    player.cleanup();
    Ok(())
}

/// Prints each word with its per-letter NATO readout.
fn cmd_nato(text: &str) {
    for word in translate(text) {
        println!("{}", word.text);
        for letter in &word.letters {
            match letter.nato {
                Some(nato) => println!("  {} - {nato}", letter.ch),
                None => println!("  {} - ?", letter.ch),
            }
        }
    }
}

/// Prints the timeline for `text` as pretty JSON on stdout.
fn cmd_timeline(text: &str, wpm: u32) -> Result<()> {
    let timeline = build_timeline(text, wpm);
    let json = serde_json::to_string_pretty(&timeline).context("Failed to encode timeline")?;
    println!("{json}");
    Ok(())
}

/// One character of the highlight line. `letter` carries the timeline
/// letter index when the character is keyable, so highlights land on the
/// same positions the scheduler is sounding.
struct DisplayCell {
    ch: char,
    letter: Option<usize>,
}

fn display_cells(text: &str) -> Vec<DisplayCell> {
    let mut cells = Vec::new();
    let mut next_letter = 0;
    for (word_pos, word) in text.split_whitespace().enumerate() {
        if word_pos > 0 {
            cells.push(DisplayCell {
                ch: ' ',
                letter: None,
            });
        }
        for ch in word.chars() {
            let upper = ch.to_ascii_uppercase();
            let letter = if alphabet::is_translatable(upper) {
                let index = next_letter;
                next_letter += 1;
                Some(index)
            } else {
                None
            };
            cells.push(DisplayCell { ch: upper, letter });
        }
    }
    cells
}

/// Renders the text with the sounding letter inverted, plus the current
/// letter's code with the sounding symbol inverted.
fn render_line(cells: &[DisplayCell], player: &MorsePlayer) -> String {
    let mut line = String::new();
    for cell in cells {
        if cell.letter.is_some() && cell.letter == player.letter_index() {
            line.push_str(HIGHLIGHT);
            line.push(cell.ch);
            line.push_str(RESET);
        } else {
            line.push(cell.ch);
        }
    }
    if let Some(letter) = player.letter_index() {
        let code = cells
            .iter()
            .find(|cell| cell.letter == Some(letter))
            .and_then(|cell| alphabet::morse_code(cell.ch));
        if let Some(code) = code {
            line.push_str("   ");
            for (pos, symbol) in code.chars().enumerate() {
                if player.symbol_index() == Some(pos) {
                    line.push_str(HIGHLIGHT);
                    line.push(symbol);
                    line.push_str(RESET);
                } else {
                    line.push(symbol);
                }
            }
        }
    }
    line
}
