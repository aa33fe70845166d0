//! Questions: a prompt, an [`Answer`] converter, and the policies for reading the reply.

use promptline_core::answers::{Answer, AnswerError};

/// What is echoed while the user types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Echo {
    On,
    Off,
    /// Each typed character is shown as this one instead.
    Mask(char),
}

/// How whitespace in the reply is cleaned up before conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Whitespace {
    #[default]
    Strip,
    Collapse,
    StripAndCollapse,
    Remove,
    Preserve,
}

impl Whitespace {
    pub fn apply(self, text: &str) -> String {
        match self {
            Whitespace::Strip => text.trim().to_string(),
            Whitespace::Collapse => collapse(text),
            Whitespace::StripAndCollapse => collapse(text.trim()),
            Whitespace::Remove => text.chars().filter(|c| !c.is_whitespace()).collect(),
            Whitespace::Preserve => text.to_string(),
        }
    }
}

fn collapse(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut in_whitespace = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                collapsed.push(' ');
            }
            in_whitespace = true;
        } else {
            collapsed.push(c);
            in_whitespace = false;
        }
    }
    collapsed
}

/// Case folding applied to the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Case {
    #[default]
    Preserve,
    Upper,
    Lower,
    Capitalize,
}

impl Case {
    pub fn apply(self, text: &str) -> String {
        match self {
            Case::Preserve => text.to_string(),
            Case::Upper => text.to_uppercase(),
            Case::Lower => text.to_lowercase(),
            Case::Capitalize => {
                let mut chars = text.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }
}

/// What is shown after an answer is rejected and its error message printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnError {
    /// A short re-prompt, `"? "` by default.
    Say(String),
    RepeatQuestion,
    Nothing,
}

impl Default for OnError {
    fn default() -> Self {
        OnError::Say("? ".to_string())
    }
}

type ConfirmPrompt<T> = Box<dyn Fn(&T) -> String>;

/// A question to put to the user.
///
/// ```
/// use promptline_cli::question::{Case, Question};
/// use promptline_core::answers::Text;
///
/// let question = Question::new("Favorite color?  ", Text::new())
///     .case(Case::Lower)
///     .default("blue");
/// assert_eq!(question.prompt(), "Favorite color?  |blue|  ");
/// assert_eq!(question.answer_or_default("  "), "blue");
/// assert_eq!(question.answer_or_default(" RED "), "red");
/// ```
pub struct Question<A: Answer> {
    prompt: String,
    answer: A,
    character: bool,
    limit: Option<usize>,
    echo: Option<Echo>,
    whitespace: Whitespace,
    case: Case,
    default: Option<String>,
    confirm: Option<ConfirmPrompt<A::Output>>,
    first_answer: Option<String>,
    overwrite: bool,
    on_error: OnError,
}

impl<A: Answer> Question<A> {
    pub fn new(prompt: impl Into<String>, answer: A) -> Self {
        Self {
            prompt: prompt.into(),
            answer,
            character: false,
            limit: None,
            echo: None,
            whitespace: Whitespace::default(),
            case: Case::default(),
            default: None,
            confirm: None,
            first_answer: None,
            overwrite: false,
            on_error: OnError::default(),
        }
    }

    /// Reads a single key instead of a line. Echo is off unless set explicitly.
    pub fn character(mut self) -> Self {
        self.character = true;
        self
    }

    /// Stops reading after this many characters.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn echo(mut self, echo: Echo) -> Self {
        self.echo = Some(echo);
        self
    }

    pub fn whitespace(mut self, whitespace: Whitespace) -> Self {
        self.whitespace = whitespace;
        self
    }

    pub fn case(mut self, case: Case) -> Self {
        self.case = case;
        self
    }

    /// Used when the reply is empty; shown in the prompt as `|default|`.
    pub fn default(mut self, default: impl Into<String>) -> Self {
        let default = default.into();
        self.prompt = with_default(&self.prompt, &default);
        self.default = Some(default);
        self
    }

    /// Asks "Are you sure?" before accepting an answer.
    pub fn confirm(self) -> Self {
        self.confirm_with(|_| "Are you sure?  ".to_string())
    }

    /// Asks the prompt built from the converted answer before accepting it.
    pub fn confirm_with(mut self, prompt: impl Fn(&A::Output) -> String + 'static) -> Self {
        self.confirm = Some(Box::new(prompt));
        self
    }

    /// Answers the first asking with `reply` instead of reading input.
    pub fn first_answer(mut self, reply: impl Into<String>) -> Self {
        self.first_answer = Some(reply.into());
        self
    }

    /// Erases the reply from the screen once it is read.
    pub fn overwrite(mut self) -> Self {
        self.overwrite = true;
        self
    }

    pub fn on_error(mut self, on_error: OnError) -> Self {
        self.on_error = on_error;
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn answer(&self) -> &A {
        &self.answer
    }

    pub fn is_character(&self) -> bool {
        self.character
    }

    pub fn get_limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn get_echo(&self) -> Echo {
        self.echo
            .unwrap_or(if self.character { Echo::Off } else { Echo::On })
    }

    pub fn is_overwrite(&self) -> bool {
        self.overwrite
    }

    pub fn get_on_error(&self) -> &OnError {
        &self.on_error
    }

    pub(crate) fn take_first_answer(&mut self) -> Option<String> {
        self.first_answer.take()
    }

    /// Cleans up the reply, falling back to the default when nothing is left.
    pub fn answer_or_default(&self, reply: &str) -> String {
        let reply = self.case.apply(&self.whitespace.apply(reply));
        match &self.default {
            Some(default) if reply.is_empty() => default.clone(),
            _ => reply,
        }
    }

    pub fn convert(&self, reply: &str) -> Result<A::Output, AnswerError> {
        self.answer.resolve(reply)
    }

    pub(crate) fn confirm_prompt(&self, answer: &A::Output) -> Option<String> {
        self.confirm.as_ref().map(|prompt| prompt(answer))
    }
}

/// Places `|default|` after the prompt text, ahead of its trailing whitespace.
fn with_default(prompt: &str, default: &str) -> String {
    if prompt.is_empty() {
        return format!("|{default}|  ");
    }
    if let Some(question) = prompt.strip_suffix('\n') {
        return format!("{question}  |{default}|\n");
    }

    let question = prompt.trim_end();
    let whitespace = &prompt[question.len()..];
    format!("{question}  |{default}|{whitespace}")
}
