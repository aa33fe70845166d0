//! Asking the same question several times.

use std::io::Write;

use indexmap::IndexMap;
use log::debug;
use promptline_core::answers::Answer;
use promptline_core::error::Result;
use promptline_core::strformat::Args;
use regex::Regex;

use crate::console::Console;
use crate::input::InputSource;
use crate::question::Question;

impl<I: InputSource, W: Write> Console<I, W> {
    /// Asks `question` exactly `times` times.
    pub fn gather_times<A: Answer>(
        &mut self,
        question: &mut Question<A>,
        times: usize,
    ) -> Result<Vec<A::Output>> {
        (0..times).map(|_| self.ask(question)).collect()
    }

    /// Asks until the answer equals `sentinel`, which is left out of the result.
    pub fn gather_until<A>(
        &mut self,
        question: &mut Question<A>,
        sentinel: &str,
    ) -> Result<Vec<A::Output>>
    where
        A: Answer,
        A::Output: AsRef<str>,
    {
        self.gather_while(question, |answer| answer != sentinel)
    }

    /// Asks until an answer matches `pattern`; the matching answer is left out.
    pub fn gather_until_match<A>(
        &mut self,
        question: &mut Question<A>,
        pattern: &Regex,
    ) -> Result<Vec<A::Output>>
    where
        A: Answer,
        A::Output: AsRef<str>,
    {
        self.gather_while(question, |answer| !pattern.is_match(answer))
    }

    fn gather_while<A>(
        &mut self,
        question: &mut Question<A>,
        keep_going: impl Fn(&str) -> bool,
    ) -> Result<Vec<A::Output>>
    where
        A: Answer,
        A::Output: AsRef<str>,
    {
        let mut answers = Vec::new();
        loop {
            let answer = self.ask(question)?;
            if !keep_going(answer.as_ref()) {
                debug!("Gathered {} answer(s)", answers.len());
                return Ok(answers);
            }
            answers.push(answer);
        }
    }

    /// Asks once per key, with the key available to the prompt as `{key}`.
    pub fn gather_keys<A, S>(
        &mut self,
        question: &mut Question<A>,
        keys: &[S],
    ) -> Result<IndexMap<String, A::Output>>
    where
        A: Answer,
        S: AsRef<str>,
    {
        let mut answers = IndexMap::new();
        for key in keys {
            let key = key.as_ref();
            let answer = self.ask_with(question, &Args::new().kwarg("key", key))?;
            answers.insert(key.to_string(), answer);
        }
        Ok(answers)
    }
}
