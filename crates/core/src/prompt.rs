use anyhow::Result;

pub trait Prompter {
    fn prompt_valid(
        &mut self,
        text: &str,
        default: &str,
        validate: &dyn Fn(&str) -> Result<(), String>,
    ) -> Result<String>;

    fn prompt_choice(&mut self, text: &str, choices: &[(u8, &str)], default: &str)
        -> Result<String>;

    fn confirm(&mut self, text: &str) -> Result<bool>;
}

pub fn resolve_choice<'a>(answer: &str, choices: &[(u8, &'a str)]) -> Option<&'a str> {
    let answer = answer.trim();
    choices
        .iter()
        .find(|(id, name)| name.eq_ignore_ascii_case(answer) || id.to_string() == answer)
        .map(|(_, name)| *name)
}

#[cfg(test)]
pub(crate) mod scripted {
    use super::{resolve_choice, Prompter};
    use anyhow::{bail, Result};
    use std::collections::VecDeque;

    /// Replays canned answers in order. Invalid answers are skipped like a
    /// user retrying.
    #[derive(Debug, Default)]
    pub struct ScriptedPrompter {
        answers: VecDeque<String>,
        pub asked: Vec<String>,
    }

    impl ScriptedPrompter {
        pub fn new(answers: &[&str]) -> Self {
            Self {
                answers: answers.iter().map(|s| s.to_string()).collect(),
                asked: Vec::new(),
            }
        }

        fn next_answer(&mut self, text: &str) -> Result<String> {
            self.asked.push(text.to_string());
            match self.answers.pop_front() {
                Some(answer) => Ok(answer),
                None => bail!("no scripted answer left for [{text}]"),
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn prompt_valid(
            &mut self,
            text: &str,
            default: &str,
            validate: &dyn Fn(&str) -> Result<(), String>,
        ) -> Result<String> {
            loop {
                let answer = self.next_answer(text)?;
                let answer = if answer.is_empty() {
                    default.to_string()
                } else {
                    answer
                };
                if validate(&answer).is_ok() {
                    return Ok(answer);
                }
            }
        }

        fn prompt_choice(
            &mut self,
            text: &str,
            choices: &[(u8, &str)],
            default: &str,
        ) -> Result<String> {
            loop {
                let answer = self.next_answer(text)?;
                let answer = if answer.is_empty() {
                    default
                } else {
                    answer.as_str()
                };
                if let Some(name) = resolve_choice(answer, choices) {
                    return Ok(name.to_string());
                }
            }
        }

        fn confirm(&mut self, text: &str) -> Result<bool> {
            let answer = self.next_answer(text)?;
            Ok(matches!(answer.as_str(), "y" | "Y" | "yes"))
        }
    }
}
