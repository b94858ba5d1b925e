use crate::debug_log;
use crate::game_state::{
    GameInterface, GameSession, Notice, ROUND_END_DELAY_MS, RoundTicket, UserAction,
};
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

/// Hangman word-guessing game for the terminal
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a word bank file with one `WORD;tip` entry per line
    #[arg(short = 'i', long = "input")]
    pub wordbank_path: Option<PathBuf>,

    /// Use the line-based interface instead of the full-screen one
    #[arg(long)]
    pub plain: bool,

    /// Seed for challenge selection
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log file (defaults to the user cache directory)
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Delay before checking whether a round ended, in milliseconds
    #[arg(long = "delay-ms", default_value_t = ROUND_END_DELAY_MS)]
    pub delay_ms: u64,
}

impl Cli {
    pub fn round_end_delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

const RESTART_COMMAND: &str = ":reiniciar";
const EXIT_COMMAND: &str = ":sair";
const PROMPT: &str = "Palpite (uma letra, :reiniciar ou :sair):";
const HIDDEN_TILE: char = '_';

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_lowercase().as_str(), "s" | "sim" | "y" | "yes")
}

/// Single-line rendering of the word, e.g. `_ A _ A _ A`.
pub fn format_tiles(session: &GameSession) -> String {
    session
        .tiles()
        .iter()
        .map(|tile| tile.unwrap_or(HIDDEN_TILE).to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Used letters in order, wrong ones marked with `-`.
pub fn format_letters_used(session: &GameSession) -> String {
    session
        .letters_used()
        .iter()
        .map(|used| {
            if used.correct {
                used.value.to_string()
            } else {
                format!("-{}", used.value)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Line-based implementation of `GameInterface`.
///
/// Every line read is one guess: it becomes the pending input and is
/// confirmed right away.
pub struct CliInterface<R: BufRead, W: Write> {
    reader: R,
    writer: W,
    queued: Option<UserAction>,
    last_frame: Option<(RoundTicket, usize)>,
}

impl<R: BufRead, W: Write> CliInterface<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            queued: None,
            last_frame: None,
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn say(&mut self, text: &str) {
        if let Err(e) = writeln!(self.writer, "{text}") {
            debug_log!("CliInterface::say() - write failed: {}", e);
        }
    }

    /// `None` on end of input or read failure.
    fn read_line(&mut self) -> Option<String> {
        let _ = self.writer.flush();
        let mut input = String::new();
        match self.reader.read_line(&mut input) {
            Ok(0) => None,
            Ok(_) => Some(input.trim().to_string()),
            Err(e) => {
                debug_log!("CliInterface::read_line() - read failed: {}", e);
                None
            }
        }
    }
}

impl<R: BufRead, W: Write> GameInterface for CliInterface<R, W> {
    fn render(&mut self, session: &GameSession) {
        let Some(challenge) = session.challenge() else {
            return;
        };
        let frame = (session.ticket(), session.attempts_used());
        if self.last_frame == Some(frame) {
            return;
        }
        self.last_frame = Some(frame);

        let lines = [
            String::new(),
            format!(
                "Tentativas: {} de {}",
                session.attempts_used(),
                session.max_attempts()
            ),
            format!("Dica: {}", challenge.tip()),
            format_tiles(session),
            format!("Letras usadas: {}", format_letters_used(session)),
        ];
        for line in &lines {
            self.say(line);
        }
    }

    fn next_action(&mut self, timeout: Option<Duration>) -> Option<UserAction> {
        if let Some(action) = self.queued.take() {
            return Some(action);
        }
        if let Some(wait) = timeout {
            std::thread::sleep(wait);
            return None;
        }

        self.say(PROMPT);
        let Some(line) = self.read_line() else {
            return Some(UserAction::Exit);
        };
        match line.as_str() {
            EXIT_COMMAND => Some(UserAction::Exit),
            RESTART_COMMAND => Some(UserAction::Restart),
            _ => {
                self.queued = Some(UserAction::Confirm);
                Some(UserAction::Input(line.chars().take(1).collect()))
            }
        }
    }

    fn confirm(&mut self, question: &str) -> bool {
        self.say(&format!("{question} (s/n)"));
        self.read_line().is_some_and(|answer| is_yes(&answer))
    }

    fn notify(&mut self, notice: &Notice) {
        self.say(&format!("*** {notice}"));
    }
}
