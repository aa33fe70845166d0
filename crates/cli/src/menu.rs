//! Menus of named choices, picked by index or (abbreviated) name.
//!
//! A [`Menu`] only describes the choices and how they look; [`Console::choose`] and
//! [`Console::shell`] put it in front of the user.
//!
//! [`Console::choose`]: crate::console::Console::choose
//! [`Console::shell`]: crate::console::Console::shell

use log::debug;
use promptline_core::answers::{Answer, AnswerError};
use promptline_core::listdisplay::Flow;
use promptline_core::trie::Trie;

use crate::question::Question;

/// Name of the choice added when any choice carries help text.
pub const HELP_CHOICE: &str = "help";

/// Introduction printed by the help choice, ahead of the list of topics.
pub const GENERAL_HELP: &str = "This command will display helpful messages about functionality, \
like this one. To see the help for a specific topic enter:\n\thelp [TOPIC]\n\
Try asking for help on any of the following:\n\n";

pub const NO_HELP: &str = "There's no help for that topic.";

/// Runs a chosen entry: receives the choice's name and, in shell mode, the rest of the line.
pub type Action<T> = Box<dyn Fn(&str, &str) -> T>;

pub struct MenuChoice<T> {
    name: String,
    help: Option<String>,
    action: Option<Action<T>>,
}

impl<T: From<String>> MenuChoice<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: None,
            action: None,
        }
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn action(mut self, action: impl Fn(&str, &str) -> T + 'static) -> Self {
        self.action = Some(Box::new(action));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// The action's result, or the choice's name when it has no action.
    pub fn invoke(&self, rest: &str) -> T {
        match &self.action {
            Some(action) => action(&self.name, rest),
            None => T::from(self.name.clone()),
        }
    }
}

/// The label shown in front of each visible choice.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IndexStyle {
    /// `1`, `2`, `3`, ...
    #[default]
    Number,
    /// `a` to `z`, then `A` to `Z`.
    Letter,
    None,
    /// The same marker before every choice, e.g. `*`.
    Constant(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectBy {
    Index,
    Name,
    #[default]
    IndexOrName,
}

/// How the menu is drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// `header:`, the choices, then the prompt on its own line.
    List(Flow),
    /// `header:  prompt(choices)` on one line.
    OneLine(Flow),
    /// The choices followed directly by the prompt.
    MenuOnly(Flow),
}

impl Layout {
    pub fn list() -> Self {
        Layout::List(Flow::Rows)
    }

    pub fn one_line() -> Self {
        Layout::OneLine(Flow::inline())
    }

    pub fn menu_only() -> Self {
        Layout::MenuOnly(Flow::inline())
    }

    pub fn flow(&self) -> &Flow {
        match self {
            Layout::List(flow) | Layout::OneLine(flow) | Layout::MenuOnly(flow) => flow,
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Layout::list()
    }
}

/// What the user picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selected {
    /// A choice, by position among the visible then hidden choices.
    Choice { index: usize, rest: String },
    Help { topic: String },
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Choice(usize),
    Help,
    Exit,
}

/// Converts a reply into a [`Selected`] entry of a menu.
#[derive(Debug, Clone)]
pub struct MenuAnswer {
    options: Vec<(String, Target)>,
    first_word: bool,
}

impl MenuAnswer {
    fn selects_by_first_word(&self, entered: &str) -> bool {
        self.first_word || entered.starts_with("help ")
    }
}

impl Answer for MenuAnswer {
    type Output = Selected;

    fn candidates(&self) -> Option<Vec<String>> {
        Some(self.options.iter().map(|(label, _)| label.clone()).collect())
    }

    fn convert(&self, chosen: &str, entered: &str) -> Result<Selected, AnswerError> {
        let target = self
            .options
            .iter()
            .find(|(label, _)| label == chosen)
            .map(|(_, target)| *target)
            .ok_or(AnswerError::NoMatch)?;

        let rest = if self.selects_by_first_word(entered) {
            entered.split_once(' ').map_or("", |(_, rest)| rest)
        } else {
            ""
        };

        Ok(match target {
            Target::Choice(index) => Selected::Choice {
                index,
                rest: rest.to_string(),
            },
            Target::Help => Selected::Help {
                topic: rest.to_string(),
            },
            Target::Exit => Selected::Exit,
        })
    }

    /// In shell mode, and for `help TOPIC`, only the first word picks the entry.
    fn resolve(&self, entered: &str) -> Result<Selected, AnswerError> {
        let word = if self.selects_by_first_word(entered) {
            entered.split(' ').next().unwrap_or(entered)
        } else {
            entered
        };

        let trie: Trie = self.options.iter().map(|(label, _)| label).collect();
        let chosen = trie.complete(word)?;
        debug!("Menu reply `{}` selected `{}`", entered, chosen);
        self.convert(&chosen, entered)
    }
}

/// A menu of choices.
///
/// ```
/// use promptline_cli::menu::{Menu, MenuChoice};
///
/// let menu: Menu = Menu::new()
///     .choices(["foo", "bar"])
///     .choice(MenuChoice::new("baz").help("The third one"))
///     .header("pick one");
/// let labels: Vec<_> = menu.entries().into_iter().map(|(label, _)| label).collect();
/// assert_eq!(labels, ["1. ", "2. ", "3. ", "4. "]);
/// ```
pub struct Menu<T = String> {
    items: Vec<MenuChoice<T>>,
    hidden: Vec<MenuChoice<T>>,
    index: IndexStyle,
    index_suffix: String,
    select_by: SelectBy,
    header: Option<String>,
    prompt: String,
    layout: Layout,
    shell: bool,
    exit_keyword: Option<String>,
}

impl<T: From<String>> Default for Menu<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: From<String>> Menu<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            hidden: Vec::new(),
            index: IndexStyle::default(),
            index_suffix: ". ".to_string(),
            select_by: SelectBy::default(),
            header: None,
            prompt: "? ".to_string(),
            layout: Layout::default(),
            shell: false,
            exit_keyword: None,
        }
    }

    pub fn choice(mut self, choice: MenuChoice<T>) -> Self {
        self.items.push(choice);
        self
    }

    /// Adds plain choices that answer with their own names.
    pub fn choices<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.items.extend(names.into_iter().map(MenuChoice::new));
        self
    }

    /// A choice that can be picked by name but isn't listed.
    pub fn hidden(mut self, choice: MenuChoice<T>) -> Self {
        self.hidden.push(choice);
        self
    }

    /// `None` and `Constant` labels can't be typed, so they switch selection to names.
    pub fn index(mut self, index: IndexStyle) -> Self {
        match index {
            IndexStyle::None => self.select_by = SelectBy::Name,
            IndexStyle::Constant(_) => {
                self.select_by = SelectBy::Name;
                self.index_suffix = " ".to_string();
            }
            IndexStyle::Number | IndexStyle::Letter => {}
        }
        self.index = index;
        self
    }

    pub fn index_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.index_suffix = suffix.into();
        self
    }

    pub fn select_by(mut self, select_by: SelectBy) -> Self {
        self.select_by = select_by;
        self
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Choices are picked by the first word of the reply, and the rest goes to the action.
    pub fn shell(mut self, shell: bool) -> Self {
        self.shell = shell;
        self
    }

    /// A reply that ends [`Console::shell`](crate::console::Console::shell).
    pub fn exit_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.exit_keyword = Some(keyword.into());
        self
    }

    pub fn get_header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    pub fn get_prompt(&self) -> &str {
        &self.prompt
    }

    pub fn get_layout(&self) -> &Layout {
        &self.layout
    }

    pub fn is_shell(&self) -> bool {
        self.shell
    }

    fn all_choices(&self) -> impl Iterator<Item = &MenuChoice<T>> {
        self.items.iter().chain(self.hidden.iter())
    }

    /// True when the menu supplies its own `help` choice.
    pub fn has_auto_help(&self) -> bool {
        !self.all_choices().any(|choice| choice.name == HELP_CHOICE)
            && self.all_choices().any(|choice| choice.help.is_some())
    }

    /// Visible entries as `(label, name)`, where the label includes the index suffix.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut names: Vec<String> = self.items.iter().map(|choice| choice.name.clone()).collect();
        if self.has_auto_help() {
            names.push(HELP_CHOICE.to_string());
        }

        let labels = self.index_labels(names.len());
        labels
            .into_iter()
            .map(|label| {
                if label.is_empty() {
                    label
                } else {
                    label + &self.index_suffix
                }
            })
            .zip(names)
            .collect()
    }

    fn index_labels(&self, count: usize) -> Vec<String> {
        match &self.index {
            IndexStyle::Number => (1..=count).map(|i| i.to_string()).collect(),
            IndexStyle::Letter => ('a'..='z')
                .chain('A'..='Z')
                .map(String::from)
                .chain(std::iter::repeat(String::new()))
                .take(count)
                .collect(),
            IndexStyle::None => vec![String::new(); count],
            IndexStyle::Constant(marker) => vec![marker.clone(); count],
        }
    }

    /// The converter for replies to this menu; `for_shell` also accepts the exit keyword.
    pub fn answer(&self, for_shell: bool) -> MenuAnswer {
        let first_word = self.shell || for_shell;
        let auto_help = self.has_auto_help();
        let visible = self.items.len() + usize::from(auto_help);
        let visible_target = |position: usize| {
            if position < self.items.len() {
                Target::Choice(position)
            } else {
                Target::Help
            }
        };

        let mut options = Vec::new();
        let by_index = matches!(self.index, IndexStyle::Number | IndexStyle::Letter)
            && self.select_by != SelectBy::Name
            && !first_word;
        if by_index {
            options.extend(
                self.index_labels(visible)
                    .into_iter()
                    .enumerate()
                    .filter(|(_, label)| !label.is_empty())
                    .map(|(position, label)| (label, visible_target(position))),
            );
        }

        if self.select_by != SelectBy::Index || first_word {
            options.extend(
                self.all_choices()
                    .enumerate()
                    .map(|(position, choice)| (choice.name.clone(), Target::Choice(position))),
            );
            if auto_help {
                options.push((HELP_CHOICE.to_string(), Target::Help));
            }
        }

        if let (true, Some(keyword)) = (for_shell, &self.exit_keyword) {
            options.push((keyword.clone(), Target::Exit));
        }

        MenuAnswer {
            options,
            first_word,
        }
    }

    pub fn question(&self, for_shell: bool) -> Question<MenuAnswer> {
        Question::new(self.prompt.clone(), self.answer(for_shell))
    }

    /// Names of the choices that have help, plus `help` itself when it's automatic.
    pub fn help_topics(&self) -> Vec<&str> {
        let mut topics: Vec<&str> = self
            .all_choices()
            .filter(|choice| choice.help.is_some())
            .map(|choice| choice.name.as_str())
            .collect();
        if self.has_auto_help() {
            topics.push(HELP_CHOICE);
        }
        topics
    }

    pub fn help_for(&self, name: &str) -> Option<&str> {
        self.all_choices()
            .find(|choice| choice.name == name)
            .and_then(MenuChoice::get_help)
    }

    /// Runs the choice at `index` among the visible then hidden choices.
    pub fn run(&self, index: usize, rest: &str) -> Option<T> {
        self.all_choices()
            .nth(index)
            .map(|choice| choice.invoke(rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four() -> Menu {
        Menu::new().choices(["foo", "bar", "baz", "this one is longer"])
    }

    fn pick(menu: &Menu, reply: &str) -> Result<Selected, AnswerError> {
        menu.answer(false).resolve(reply)
    }

    #[test]
    fn test_number_labels() {
        let entries = four().entries();
        assert_eq!(entries[0], ("1. ".to_string(), "foo".to_string()));
        assert_eq!(entries[3].0, "4. ");
    }

    #[test]
    fn test_letter_and_constant_labels() {
        let menu = four().index(IndexStyle::Letter);
        let labels: Vec<_> = menu.entries().into_iter().map(|(label, _)| label).collect();
        assert_eq!(labels, ["a. ", "b. ", "c. ", "d. "]);

        let menu = four().index(IndexStyle::Constant("*".to_string()));
        assert_eq!(menu.entries()[0].0, "* ");
        assert!(matches!(pick(&menu, "1"), Err(AnswerError::NoMatch)));
    }

    #[test]
    fn test_select_by_index_or_name() {
        let menu = four();
        assert_eq!(
            pick(&menu, "2").unwrap(),
            Selected::Choice {
                index: 1,
                rest: String::new()
            }
        );
        assert_eq!(
            pick(&menu, "this").unwrap(),
            Selected::Choice {
                index: 3,
                rest: String::new()
            }
        );
        assert!(matches!(
            pick(&menu, "ba"),
            Err(AnswerError::Ambiguous(_))
        ));
    }

    #[test]
    fn test_select_by_index_only() {
        let menu = four().select_by(SelectBy::Index);
        assert!(pick(&menu, "1").is_ok());
        assert!(pick(&menu, "foo").is_err());
    }

    #[test]
    fn test_hidden_choices_are_selectable_by_name() {
        let menu = four().hidden(MenuChoice::new("secret"));
        assert_eq!(menu.entries().len(), 4);
        assert_eq!(
            pick(&menu, "sec").unwrap(),
            Selected::Choice {
                index: 4,
                rest: String::new()
            }
        );
        assert_eq!(menu.run(4, "").as_deref(), Some("secret"));
    }

    #[test]
    fn test_automatic_help() {
        let menu: Menu = Menu::new()
            .choice(MenuChoice::new("load").help("Loads a file"))
            .choice(MenuChoice::new("save"));
        assert!(menu.has_auto_help());
        assert_eq!(menu.entries().last().unwrap().1, "help");
        assert_eq!(menu.help_topics(), ["load", "help"]);
        assert_eq!(
            pick(&menu, "3").unwrap(),
            Selected::Help {
                topic: String::new()
            }
        );
        assert_eq!(
            pick(&menu, "help lo").unwrap(),
            Selected::Help {
                topic: "lo".to_string()
            }
        );
        assert_eq!(menu.help_for("load"), Some("Loads a file"));
        assert_eq!(menu.help_for("save"), None);
    }

    #[test]
    fn test_user_help_choice_replaces_automatic_help() {
        let menu: Menu = Menu::new()
            .choice(MenuChoice::new("load").help("Loads a file"))
            .choice(MenuChoice::new("help"));
        assert!(!menu.has_auto_help());
        assert_eq!(menu.entries().len(), 2);
    }

    #[test]
    fn test_shell_passes_rest_of_line() {
        let menu: Menu = Menu::new()
            .choice(MenuChoice::new("double").action(|_, rest| format!("{rest} {rest}")))
            .shell(true);
        let Selected::Choice { index, rest } = pick(&menu, "double this please").unwrap() else {
            panic!("expected a choice");
        };
        assert_eq!(menu.run(index, &rest).unwrap(), "this please this please");
    }

    #[test]
    fn test_exit_keyword_only_in_shell() {
        let menu = four().exit_keyword("quit");
        assert_eq!(menu.answer(true).resolve("qu").unwrap(), Selected::Exit);
        assert!(menu.answer(false).resolve("quit").is_err());
    }

    #[test]
    fn test_layout_flows() {
        assert_eq!(Layout::list().flow(), &Flow::Rows);
        assert_eq!(Layout::one_line().flow(), &Flow::inline());
        assert_eq!(Layout::default(), Layout::list());
    }
}
