use anyhow::{bail, Result};
use pthree_core::{resolve_choice, Prompter};
use std::io::{self, BufRead, Write};

/// Reads answers from stdin. Questions go to stderr so stdout stays clean.
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl StdinPrompter {
    fn read_answer(&mut self, text: &str, default: &str) -> Result<String> {
        eprint!("{text} [{default}]: ");
        io::stderr().flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            bail!("入力が終了しました");
        }
        let answer = line.trim();
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer.to_string()
        })
    }
}

impl Prompter for StdinPrompter {
    fn prompt_valid(
        &mut self,
        text: &str,
        default: &str,
        validate: &dyn Fn(&str) -> Result<(), String>,
    ) -> Result<String> {
        loop {
            let answer = self.read_answer(text, default)?;
            match validate(&answer) {
                Ok(()) => return Ok(answer),
                Err(message) => eprintln!("{message}"),
            }
        }
    }

    fn prompt_choice(
        &mut self,
        text: &str,
        choices: &[(u8, &str)],
        default: &str,
    ) -> Result<String> {
        let listed: Vec<String> = choices
            .iter()
            .map(|(id, name)| format!("{id}={name}"))
            .collect();
        eprintln!("{}", listed.join(", "));

        loop {
            let answer = self.read_answer(text, default)?;
            if let Some(name) = resolve_choice(&answer, choices) {
                return Ok(name.to_string());
            }
            eprintln!("[{answer}] は選択肢にありません");
        }
    }

    fn confirm(&mut self, text: &str) -> Result<bool> {
        let answer = self.read_answer(&format!("{text} (y/N)"), "n")?;
        Ok(matches!(answer.as_str(), "y" | "Y" | "yes"))
    }
}
