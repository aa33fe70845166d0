//! The console: formatted output, questions, menus and paging over one input and one output.

use std::io::{stdout, IsTerminal, Stdout, Write};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crossterm::terminal;
use log::{debug, warn};
use promptline_core::answers::{Agree, Answer, Choice};
use promptline_core::colors::{ColorScheme, Effects, RESET};
use promptline_core::config::{DEFAULT_COLUMNS, DEFAULT_ROWS, PAGE_PROMPT};
use promptline_core::error::{Error, Result};
use promptline_core::listdisplay::{self, Flow};
use promptline_core::strformat::{fmt, Args};
use promptline_core::text::{insert_before_whitespace, remove_capture_whitespace, wrap};
use promptline_core::trie::Trie;

use crate::input::{InputSource, TerminalInput, BACKSPACE};
use crate::menu::{Layout, Menu, Selected, GENERAL_HELP, HELP_CHOICE, NO_HELP};
use crate::question::{Case, Echo, OnError, Question, Whitespace};

/// Columns and rows of the terminal on stdout, or 80×24 when it isn't one.
pub fn dimensions() -> (usize, usize) {
    if stdout().is_terminal() {
        match terminal::size() {
            Ok((columns, rows)) => return (usize::from(columns), usize::from(rows)),
            Err(e) => warn!("Could not read the terminal size: {}", e),
        }
    }
    (usize::from(DEFAULT_COLUMNS), usize::from(DEFAULT_ROWS))
}

/// A console on the process's stdin and stdout.
pub type StdioConsole = Console<TerminalInput, Stdout>;

/// Talks to the user: reads answers from `I`, writes to `W`.
///
/// Everything said is a template. The color palette is available as positional argument `0`
/// and as the keyword `colors`, so caller arguments start at `{1}`:
///
/// ```
/// use promptline_cli::console::Console;
/// use promptline_cli::input::ReaderInput;
/// use promptline_core::strformat::Args;
///
/// let mut console = Console::new(ReaderInput::from_text(""), Vec::new());
/// console.say("{colors.bold:Hi} {1}!", &Args::new().arg("there"))?;
/// assert_eq!(console.output(), b"\x1b[1mHi\x1b[0m there!\x1b[0m\n");
/// # Ok::<(), promptline_core::error::Error>(())
/// ```
pub struct Console<I, W> {
    input: I,
    output: W,
    wrap_at: usize,
    page_at: usize,
    colors: bool,
    scheme: Arc<ColorScheme>,
}

impl StdioConsole {
    /// A console on stdin and stdout, sized to the terminal.
    pub fn stdio() -> Self {
        let (columns, rows) = dimensions();
        debug!("Console dimensions: {}x{}", columns, rows);
        Self::new(TerminalInput::new(), stdout())
            .wrap_at(columns)
            .page_at(rows.saturating_sub(2))
    }
}

impl<I: InputSource, W: Write> Console<I, W> {
    pub fn new(input: I, output: W) -> Self {
        Self {
            input,
            output,
            wrap_at: usize::from(DEFAULT_COLUMNS),
            page_at: usize::from(DEFAULT_ROWS) - 2,
            colors: true,
            scheme: Arc::new(ColorScheme::new()),
        }
    }

    /// Width to wrap output at; 0 turns wrapping off.
    pub fn wrap_at(mut self, wrap_at: usize) -> Self {
        self.wrap_at = wrap_at;
        self
    }

    /// Lines per page of output; 0 turns paging off.
    pub fn page_at(mut self, page_at: usize) -> Self {
        self.page_at = page_at;
        self
    }

    pub fn colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    pub fn color_scheme(mut self, scheme: ColorScheme) -> Self {
        self.scheme = Arc::new(scheme);
        self
    }

    pub fn colors_enabled(&self) -> bool {
        self.colors
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Turns colors off until the returned guard is dropped.
    pub fn no_colors(&mut self) -> NoColors<'_, I, W> {
        let previous = self.colors;
        self.colors = false;
        NoColors {
            console: self,
            previous,
        }
    }

    pub fn palette(&self) -> Effects {
        Effects::new(Arc::clone(&self.scheme), self.colors)
    }

    /// Renders `template` with the palette prepended to `args`.
    ///
    /// Trailing whitespace is kept outside the rendered text, and output that used escape codes
    /// is closed with a reset.
    pub fn format(&self, template: &str, args: &Args) -> Result<String> {
        let (body, whitespace) = remove_capture_whitespace(template);
        let palette = self.palette();
        let mut args = args.clone();
        if !args.contains_keyword("colors") {
            args.insert("colors", palette.clone());
        }
        args.prepend(palette);

        let mut text = fmt(body, &args)?;
        if self.colors && text.contains('\x1b') && !text.ends_with(RESET) {
            text.push_str(RESET);
        }
        text.push_str(whitespace);
        Ok(text)
    }

    /// Formats, wraps, pages and writes `template`.
    ///
    /// A newline follows unless the text ends in a space or tab, which leaves the cursor on
    /// the same line for a reply.
    pub fn say(&mut self, template: &str, args: &Args) -> Result<()> {
        let text = self.format(template, args)?;
        self.write_text(&text)
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        let (body, whitespace) = remove_capture_whitespace(text);
        let lines: Vec<String> = body
            .split('\n')
            .flat_map(|line| wrap(line, self.wrap_at))
            .collect();

        let mut text = self.page(lines)?.join("\n");
        text.push_str(whitespace);
        if !text.ends_with([' ', '\t']) {
            text.push('\n');
        }
        self.output.write_all(text.as_bytes())?;
        self.output.flush()?;
        Ok(())
    }

    /// Writes all but the last page of `lines`, pausing after each. Returns what is left.
    fn page(&mut self, mut lines: Vec<String>) -> Result<Vec<String>> {
        if self.page_at == 0 {
            return Ok(lines);
        }

        while lines.len() > self.page_at {
            let rest = lines.split_off(self.page_at);
            let mut page = lines.join("\n");
            page.push('\n');
            self.output.write_all(page.as_bytes())?;
            lines = rest;

            let mut question = Question::new(PAGE_PROMPT, Choice::new(["q", "Q", "\n"]))
                .character()
                .whitespace(Whitespace::Preserve)
                .overwrite()
                .on_error(OnError::RepeatQuestion);
            if self.ask(&mut question)? != "\n" {
                let mut tail = lines.split_off(lines.len().saturating_sub(2));
                tail.insert(0, "...".to_string());
                return Ok(tail);
            }
        }
        Ok(lines)
    }

    /// Formats each item and lays them out.
    pub fn listdisplay<S: AsRef<str>>(&self, items: &[S], flow: &Flow) -> Result<String> {
        let items = items
            .iter()
            .map(|item| self.format(item.as_ref(), &Args::new()))
            .collect::<Result<Vec<_>>>()?;
        listdisplay::layout(&items, flow, self.wrap_at)
    }

    pub fn ask<A: Answer>(&mut self, question: &mut Question<A>) -> Result<A::Output> {
        self.ask_with(question, &Args::new())
    }

    /// Asks with extra arguments for the prompt template.
    pub fn ask_with<A: Answer>(
        &mut self,
        question: &mut Question<A>,
        args: &Args,
    ) -> Result<A::Output> {
        let prompt = question.prompt().to_string();
        self.say(&prompt, args)?;
        self.answer(question, args)
    }

    /// Reads replies until one converts (and is confirmed, when the question asks to).
    fn answer<A: Answer>(&mut self, question: &mut Question<A>, args: &Args) -> Result<A::Output> {
        loop {
            let reply = self.read_reply(question)?;
            let reply = question.answer_or_default(&reply);

            match question.convert(&reply) {
                Ok(answer) => match question.confirm_prompt(&answer) {
                    None => return Ok(answer),
                    Some(prompt) => {
                        if self.agree(&prompt)? {
                            return Ok(answer);
                        }
                    }
                },
                Err(error) => {
                    debug!("Rejected reply `{}`: {}", reply, error);
                    self.write_text(&error.to_string())?;
                }
            }

            match question.get_on_error().clone() {
                OnError::Say(text) => self.say(&text, &Args::new())?,
                OnError::RepeatQuestion => {
                    let prompt = question.prompt().to_string();
                    self.say(&prompt, args)?;
                }
                OnError::Nothing => {}
            }
        }
    }

    fn read_reply<A: Answer>(&mut self, question: &mut Question<A>) -> Result<String> {
        if let Some(reply) = question.take_first_answer() {
            return Ok(reply);
        }

        let echo = question.get_echo();
        if question.is_character() {
            let key = self.input.read_char()?.ok_or(Error::EndOfInput)?;
            if question.is_overwrite() {
                self.erase_line()?;
            } else {
                self.echo_char(echo, key)?;
            }
            self.output.flush()?;
            return Ok(key.to_string());
        }

        if echo == Echo::On && question.get_limit().is_none() {
            let line = match question.answer().candidates() {
                Some(candidates) => self.input.read_line_completing(&candidates)?,
                None => self.input.read_line()?,
            };
            return line.ok_or(Error::EndOfInput);
        }

        let mut reply = String::new();
        loop {
            let key = self.input.read_char()?.ok_or(Error::EndOfInput)?;
            match key {
                '\n' | '\r' => break,
                BACKSPACE | '\x08' => {
                    if reply.pop().is_some() && echo != Echo::Off {
                        let erase = self.format("\x08{0.erase_char}", &Args::new())?;
                        self.output.write_all(erase.as_bytes())?;
                    }
                }
                _ => {
                    reply.push(key);
                    self.echo_char(echo, key)?;
                }
            }
            self.output.flush()?;

            if question
                .get_limit()
                .is_some_and(|limit| reply.chars().count() >= limit)
            {
                break;
            }
        }

        if question.is_overwrite() {
            self.erase_line()?;
        } else {
            self.output.write_all(b"\n")?;
        }
        self.output.flush()?;
        Ok(reply)
    }

    fn echo_char(&mut self, echo: Echo, key: char) -> Result<()> {
        match echo {
            Echo::On => write!(self.output, "{key}")?,
            Echo::Mask(mask) => write!(self.output, "{mask}")?,
            Echo::Off => {}
        }
        Ok(())
    }

    fn erase_line(&mut self) -> Result<()> {
        let erase = self.format("\r{0.erase_line}", &Args::new())?;
        self.output.write_all(erase.as_bytes())?;
        Ok(())
    }

    /// Asks a yes or no question; `(y or n)` is added to the prompt.
    pub fn agree(&mut self, prompt: &str) -> Result<bool> {
        self.agree_with(prompt, false, None)
    }

    /// [`agree`](Self::agree) with single key replies and an optional default.
    pub fn agree_with(
        &mut self,
        prompt: &str,
        character: bool,
        default: Option<&str>,
    ) -> Result<bool> {
        let prompt = insert_before_whitespace(prompt, "  (y or n)");
        let mut question = Question::new(prompt.clone(), Agree { character })
            .case(Case::Lower)
            .on_error(OnError::Say(prompt));
        if character {
            question = question.character();
        }
        if let Some(default) = default {
            question = question.default(default);
        }
        self.ask(&mut question)
    }

    /// A single key yes or no question.
    pub fn y_or_n_q(&mut self, prompt: &str) -> Result<bool> {
        self.agree_with(prompt, true, None)
    }

    /// A yes or no question that must be answered with a whole word.
    pub fn yes_or_no_q(&mut self, prompt: &str) -> Result<bool> {
        let prompt = insert_before_whitespace(prompt, " (yes or no)");
        Ok(self.yes_or_no_style_q(&prompt, &["yes", "no"])? == "yes")
    }

    /// Reads a single key, which must be one of `answers`.
    pub fn y_or_n_style_q(&mut self, prompt: &str, answers: &[&str]) -> Result<String> {
        let mut question = Question::new(prompt, Choice::new(answers.iter().copied()))
            .character()
            .on_error(OnError::RepeatQuestion);
        self.ask(&mut question)
    }

    /// Reads a line, which must complete to one of `answers`.
    pub fn yes_or_no_style_q(&mut self, prompt: &str, answers: &[&str]) -> Result<String> {
        let mut question = Question::new(prompt, Choice::new(answers.iter().copied()))
            .on_error(OnError::RepeatQuestion);
        self.ask(&mut question)
    }

    fn render_menu<T: From<String>>(&self, menu: &Menu<T>) -> Result<String> {
        let items = menu
            .entries()
            .into_iter()
            .map(|(label, name)| Ok(label + &self.format(&name, &Args::new())?))
            .collect::<Result<Vec<_>>>()?;
        let list = listdisplay::layout(&items, menu.get_layout().flow(), self.wrap_at)?;
        let prompt = self.format(menu.get_prompt(), &Args::new())?;
        let header = menu
            .get_header()
            .map(|header| self.format(header, &Args::new()))
            .transpose()?;

        Ok(match menu.get_layout() {
            Layout::List(_) => {
                let mut text = header.map(|header| header + ":\n").unwrap_or_default();
                text.push_str(&list);
                text.push('\n');
                text.push_str(&prompt);
                text
            }
            Layout::OneLine(_) => {
                let mut text = header.map(|header| header + ":  ").unwrap_or_default();
                let (_, whitespace) = remove_capture_whitespace(&prompt);
                text.push_str(&prompt);
                text.push('(');
                text.push_str(&list);
                text.push(')');
                text.push_str(whitespace);
                text
            }
            Layout::MenuOnly(_) => list + &prompt,
        })
    }

    /// Shows the menu and returns the result of the chosen entry.
    ///
    /// Asking for help shows it and asks again.
    pub fn choose<T: From<String>>(&mut self, menu: &Menu<T>) -> Result<T> {
        let text = self.render_menu(menu)?;
        self.write_text(&text)?;

        let mut question = menu.question(false);
        loop {
            match self.answer(&mut question, &Args::new())? {
                Selected::Choice { index, rest } => {
                    return menu
                        .run(index, &rest)
                        .ok_or_else(|| Error::Misc(format!("No menu choice at {index}")));
                }
                Selected::Help { topic } => {
                    self.show_help(menu, &topic)?;
                    self.say(menu.get_prompt(), &Args::new())?;
                }
                Selected::Exit => return Err(Error::Interrupted),
            }
        }
    }

    /// Runs the menu as a command loop, collecting each action's result.
    ///
    /// The first word of every reply picks the entry and the rest of the line goes to its
    /// action. The loop ends at the menu's exit keyword or at the end of input.
    pub fn shell<T: From<String>>(&mut self, menu: &Menu<T>) -> Result<Vec<T>> {
        let text = self.render_menu(menu)?;
        self.write_text(&text)?;

        let mut question = menu.question(true);
        let mut results = Vec::new();
        loop {
            let selected = match self.answer(&mut question, &Args::new()) {
                Err(Error::EndOfInput) => break,
                selected => selected?,
            };

            match selected {
                Selected::Choice { index, rest } => results.extend(menu.run(index, &rest)),
                Selected::Help { topic } => self.show_help(menu, &topic)?,
                Selected::Exit => break,
            }
            self.say(menu.get_prompt(), &Args::new())?;
        }
        debug!("Shell finished after {} command(s)", results.len());
        Ok(results)
    }

    fn show_help<T: From<String>>(&mut self, menu: &Menu<T>, topic: &str) -> Result<()> {
        let topics = menu.help_topics();
        let name = if topic.is_empty() {
            Ok(HELP_CHOICE.to_string())
        } else {
            topics.iter().collect::<Trie>().complete(topic)
        };

        match name {
            Ok(name) if name == HELP_CHOICE && menu.has_auto_help() => {
                let listing = self.listdisplay(&topics, &Flow::ColumnsAcross(None))?;
                self.write_text(&format!("{GENERAL_HELP}{listing}\n"))
            }
            Ok(name) => match menu.help_for(&name) {
                Some(help) => {
                    let text = format!("= {name}\n\n{help}");
                    self.say(&text, &Args::new())
                }
                None => self.write_text(NO_HELP),
            },
            Err(_) => self.write_text(NO_HELP),
        }
    }
}

/// Restores the console's color setting when dropped.
pub struct NoColors<'a, I: InputSource, W: Write> {
    console: &'a mut Console<I, W>,
    previous: bool,
}

impl<I: InputSource, W: Write> Deref for NoColors<'_, I, W> {
    type Target = Console<I, W>;

    fn deref(&self) -> &Self::Target {
        self.console
    }
}

impl<I: InputSource, W: Write> DerefMut for NoColors<'_, I, W> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.console
    }
}

impl<I: InputSource, W: Write> Drop for NoColors<'_, I, W> {
    fn drop(&mut self) {
        self.console.colors = self.previous;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ReaderInput;
    use std::io::Cursor;

    type TestConsole = Console<ReaderInput<Cursor<Vec<u8>>>, Vec<u8>>;

    fn console(input: &str) -> TestConsole {
        Console::new(ReaderInput::from_text(input), Vec::new()).colors(false)
    }

    fn written(console: &TestConsole) -> String {
        String::from_utf8(console.output().clone()).unwrap()
    }

    #[test]
    fn test_say_adds_newline_unless_trailing_space() {
        let mut console = console("");
        console.say("Hello", &Args::new()).unwrap();
        console.say("Name?  ", &Args::new()).unwrap();
        assert_eq!(written(&console), "Hello\nName?  ");
    }

    #[test]
    fn test_say_passes_palette_and_arguments() {
        let mut console = console("");
        console
            .say("{0.red:{1}} and {colors.bold:{who}}", &Args::new().arg(1).kwarg("who", "me"))
            .unwrap();
        assert_eq!(written(&console), "1 and me\n");
    }

    #[test]
    fn test_format_closes_colors_with_reset() {
        let console = Console::new(ReaderInput::from_text(""), Vec::new());
        assert_eq!(
            console.format("{0.red:red}  ", &Args::new()).unwrap(),
            "\x1b[31mred\x1b[0m  "
        );
        assert_eq!(console.format("plain", &Args::new()).unwrap(), "plain");
    }

    #[test]
    fn test_say_wraps_long_lines() {
        let mut console = console("").wrap_at(10);
        console.say("one two three four", &Args::new()).unwrap();
        assert_eq!(written(&console), "one two\nthree four\n");
    }

    #[test]
    fn test_no_colors_guard_restores_setting() {
        let mut console = Console::new(ReaderInput::from_text(""), Vec::new());
        {
            let mut quiet = console.no_colors();
            quiet.say("{0.red:x}", &Args::new()).unwrap();
            assert!(!quiet.colors_enabled());
        }
        assert!(console.colors_enabled());
        assert_eq!(console.output(), b"x\n");
    }

    #[test]
    fn test_page_continues_and_quits() {
        let text = (1..=7).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");

        let mut paged = console("\n").page_at(5);
        paged.say(&text, &Args::new()).unwrap();
        assert_eq!(
            written(&paged),
            format!("1\n2\n3\n4\n5\n{PAGE_PROMPT}\r6\n7\n")
        );

        let mut stopped = console("q").page_at(3);
        stopped.say(&text, &Args::new()).unwrap();
        assert_eq!(
            written(&stopped),
            format!("1\n2\n3\n{PAGE_PROMPT}\r...\n6\n7\n")
        );
    }

    #[test]
    fn test_end_of_input() {
        let mut console = console("");
        let result = console.agree("Continue? ");
        assert!(matches!(result, Err(Error::EndOfInput)));
    }

    #[test]
    fn test_erase_line_respects_colors() {
        let mut colored = Console::new(ReaderInput::from_text(""), Vec::new());
        colored.erase_line().unwrap();
        assert_eq!(colored.output(), b"\r\x1b[K\x1b[0m");

        let mut plain = console("");
        plain.erase_line().unwrap();
        assert_eq!(plain.output(), b"\r");
    }
}
