// backendtool/src/prompt/mod.rs
use anyhow::{Context, Result};
use std::io::{Write, stdin, stdout};

/// Terminal question surface used by the confirmation gates and the
/// interactive configuration flows. The decision logic only sees this trait,
/// so tests drive it with a scripted implementation.
pub trait Prompter {
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;
    fn choose(&mut self, message: &str, options: &[&str], default: usize) -> Result<usize>;
    fn input(&mut self, message: &str, default: &str) -> Result<String>;
}

/// Reads answers from stdin.
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let hint = if default { "(Y/n)" } else { "(y/N)" };
        print!("{} {} ", message, hint);
        stdout().flush().context("Failed to flush stdout")?;
        let line = read_line()?;
        Ok(parse_confirm_answer(&line, default))
    }

    fn choose(&mut self, message: &str, options: &[&str], default: usize) -> Result<usize> {
        println!("{}", message);
        for (index, option) in options.iter().enumerate() {
            let marker = if index == default { "*" } else { " " };
            println!("  {}{}. {}", marker, index + 1, option);
        }
        print!("Enter your choice: ");
        stdout().flush().context("Failed to flush stdout")?;
        let line = read_line()?;
        Ok(parse_choice_answer(&line, options.len(), default))
    }

    fn input(&mut self, message: &str, default: &str) -> Result<String> {
        if default.is_empty() {
            print!("{}", message);
        } else {
            print!("{}[{}] ", message, default);
        }
        stdout().flush().context("Failed to flush stdout")?;
        let line = read_line()?;
        let answer = line.trim();
        if answer.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(strip_quotes(answer).to_string())
        }
    }
}

fn read_line() -> Result<String> {
    let mut input = String::new();
    stdin()
        .read_line(&mut input)
        .context("Failed to read user input")?;
    Ok(input)
}

fn parse_confirm_answer(input: &str, default: bool) -> bool {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => default,
    }
}

fn parse_choice_answer(input: &str, option_count: usize, default: usize) -> usize {
    match input.trim().parse::<usize>() {
        Ok(n) if n >= 1 && n <= option_count => n - 1,
        _ => default,
    }
}

fn strip_quotes(value: &str) -> &str {
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .unwrap_or(value)
}

/// Test double that replays scripted answers and records every question it
/// was asked.
#[cfg(test)]
pub struct ScriptedPrompter {
    confirms: std::collections::VecDeque<bool>,
    choices: std::collections::VecDeque<usize>,
    inputs: std::collections::VecDeque<String>,
    pub asked: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new() -> Self {
        ScriptedPrompter {
            confirms: std::collections::VecDeque::new(),
            choices: std::collections::VecDeque::new(),
            inputs: std::collections::VecDeque::new(),
            asked: Vec::new(),
        }
    }

    pub fn push_confirm(&mut self, answer: bool) {
        self.confirms.push_back(answer);
    }

    pub fn push_choice(&mut self, answer: usize) {
        self.choices.push_back(answer);
    }

    pub fn push_input(&mut self, answer: &str) {
        self.inputs.push_back(answer.to_string());
    }

    pub fn prompt_count(&self) -> usize {
        self.asked.len()
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        self.asked.push(message.to_string());
        Ok(self.confirms.pop_front().unwrap_or(default))
    }

    fn choose(&mut self, message: &str, _options: &[&str], default: usize) -> Result<usize> {
        self.asked.push(message.to_string());
        Ok(self.choices.pop_front().unwrap_or(default))
    }

    fn input(&mut self, message: &str, default: &str) -> Result<String> {
        self.asked.push(message.to_string());
        Ok(self
            .inputs
            .pop_front()
            .unwrap_or_else(|| default.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_confirm_answer() {
        assert!(parse_confirm_answer("y\n", false));
        assert!(parse_confirm_answer("YES\n", false));
        assert!(!parse_confirm_answer("n\n", true));
        assert!(parse_confirm_answer("\n", true));
        assert!(!parse_confirm_answer("\n", false));
        assert!(!parse_confirm_answer("maybe\n", false));
    }

    #[test]
    fn test_parse_choice_answer() {
        assert_eq!(parse_choice_answer("1\n", 3, 0), 0);
        assert_eq!(parse_choice_answer("3\n", 3, 0), 2);
        assert_eq!(parse_choice_answer("4\n", 3, 1), 1);
        assert_eq!(parse_choice_answer("\n", 3, 2), 2);
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("\"./src\""), "./src");
        assert_eq!(strip_quotes("'build'"), "build");
        assert_eq!(strip_quotes("plain"), "plain");
    }
}
