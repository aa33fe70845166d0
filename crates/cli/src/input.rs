//! Where answers come from.
//!
//! [`InputSource`] abstracts over reading whole lines and single keys. [`ReaderInput`] serves any
//! buffered reader, which is what the tests drive the console with; [`TerminalInput`] reads the
//! process's stdin and switches the terminal to raw mode for single keys and Tab completion.

use std::io::{stdin, stdout, BufRead, IsTerminal, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use log::debug;
use promptline_core::error::{Error, Result};
use promptline_core::trie::Trie;

/// The character a backspace key arrives as.
pub const BACKSPACE: char = '\x7f';

pub trait InputSource {
    /// Reads one line without its terminator. `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>>;

    /// Reads a single character. `None` at end of input.
    fn read_char(&mut self) -> Result<Option<char>>;

    /// Reads a line, offering completion against `candidates` where the source supports it.
    fn read_line_completing(&mut self, candidates: &[String]) -> Result<Option<String>> {
        let _ = candidates;
        self.read_line()
    }
}

/// Input read from any buffered reader.
#[derive(Debug)]
pub struct ReaderInput<R> {
    reader: R,
}

impl<R: BufRead> ReaderInput<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl ReaderInput<std::io::Cursor<Vec<u8>>> {
    /// Input that replays `text`.
    pub fn from_text(text: &str) -> Self {
        Self::new(std::io::Cursor::new(text.as_bytes().to_vec()))
    }
}

impl<R: BufRead> InputSource for ReaderInput<R> {
    fn read_line(&mut self) -> Result<Option<String>> {
        read_line_from(&mut self.reader)
    }

    fn read_char(&mut self) -> Result<Option<char>> {
        read_char_from(&mut self.reader)
    }
}

fn read_line_from(reader: &mut impl BufRead) -> Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Some(line))
}

fn read_char_from(reader: &mut impl BufRead) -> Result<Option<char>> {
    let mut first = [0u8; 1];
    if reader.read(&mut first)? == 0 {
        return Ok(None);
    }

    let width = match first[0] {
        byte if byte >= 0xF0 => 4,
        byte if byte >= 0xE0 => 3,
        byte if byte >= 0xC0 => 2,
        _ => 1,
    };
    let mut bytes = vec![0u8; width];
    bytes[0] = first[0];
    reader.read_exact(&mut bytes[1..])?;

    Ok(Some(
        std::str::from_utf8(&bytes)
            .ok()
            .and_then(|text| text.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER),
    ))
}

struct RawModeGuard;

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        // Disable raw mode on drop
        let _ = disable_raw_mode();
    }
}

/// Input from the process's stdin.
///
/// When stdin is a terminal, single characters are read in raw mode so they arrive without
/// waiting for Enter, and lines read with candidates complete on Tab. Otherwise stdin is read
/// like any other stream.
#[derive(Debug, Default)]
pub struct TerminalInput;

impl TerminalInput {
    pub fn new() -> Self {
        Self
    }

    fn is_terminal() -> bool {
        stdin().is_terminal()
    }
}

impl InputSource for TerminalInput {
    fn read_line(&mut self) -> Result<Option<String>> {
        read_line_from(&mut stdin().lock())
    }

    fn read_char(&mut self) -> Result<Option<char>> {
        if !Self::is_terminal() {
            return read_char_from(&mut stdin().lock());
        }

        enable_raw_mode()?;
        let _raw_mode_guard = RawModeGuard; // When this goes out of scope, raw mode is disabled
        read_key()
    }

    fn read_line_completing(&mut self, candidates: &[String]) -> Result<Option<String>> {
        if !Self::is_terminal() || candidates.is_empty() {
            return self.read_line();
        }

        enable_raw_mode()?;
        let _raw_mode_guard = RawModeGuard;
        edit_line(candidates)
    }
}

/// Waits for a key press, mapping it to the character a cooked terminal would have sent.
fn read_key() -> Result<Option<char>> {
    loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        else {
            continue;
        };

        let key = match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                return Err(Error::Interrupted);
            }
            KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => return Ok(None),
            KeyCode::Char(c) => c,
            KeyCode::Enter => '\n',
            KeyCode::Tab => '\t',
            KeyCode::Backspace => BACKSPACE,
            KeyCode::Esc => '\x1b',
            _ => continue,
        };
        return Ok(Some(key));
    }
}

/// A minimal line editor: printable keys, backspace, and Tab to extend the line to the longest
/// prefix shared by the matching candidates.
fn edit_line(candidates: &[String]) -> Result<Option<String>> {
    let trie: Trie = candidates.iter().collect();
    let mut stdout = stdout();
    let mut line = String::new();

    loop {
        let Some(key) = read_key()? else {
            if line.is_empty() {
                return Ok(None);
            }
            continue;
        };

        match key {
            '\n' | '\r' => {
                queue!(stdout, Print("\r\n"))?;
                stdout.flush()?;
                return Ok(Some(line));
            }
            BACKSPACE | '\x08' => {
                if line.pop().is_some() {
                    queue!(stdout, Print("\x08 \x08"))?;
                }
            }
            '\t' => {
                let Ok(completions) = trie.completions(&line) else {
                    continue;
                };
                let shared = shared_prefix(&completions);
                if shared.len() > line.len() {
                    debug!("Tab completed `{}` to `{}`", line, shared);
                    queue!(stdout, Print(&shared[line.len()..]))?;
                    line = shared;
                }
            }
            c if !c.is_control() => {
                line.push(c);
                queue!(stdout, Print(c))?;
            }
            _ => {}
        }
        stdout.flush()?;
    }
}

fn shared_prefix(words: &[String]) -> String {
    let Some((first, rest)) = words.split_first() else {
        return String::new();
    };

    let mut end = first.len();
    for word in rest {
        end = first
            .char_indices()
            .zip(word.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map_or(0, |((index, c), _)| index + c.len_utf8())
            .min(end);
    }
    first[..end].to_string()
}
