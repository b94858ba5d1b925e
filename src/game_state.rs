//! Game state engine and the loop that drives it.
//!
//! `GameSession` is the plain state of one round plus its pure transitions.
//! `Game` pairs a session with the word bank and RNG it draws challenges from,
//! and `game_loop` connects a `Game` to any front-end implementing
//! `GameInterface`.

use crate::wordbank::{Challenge, WordBank};
use crate::{debug_log, info_log};
use rand::Rng;
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Extra guesses allowed beyond the word's letter count.
pub const ATTEMPTS_MARGIN: usize = 5;

/// Time between a guess and the round-end check, so the letter shows up
/// before a win/loss notice covers the board.
pub const ROUND_END_DELAY_MS: u64 = 200;
pub const ROUND_END_DELAY: Duration = Duration::from_millis(ROUND_END_DELAY_MS);

pub const RESTART_QUESTION: &str = "Você tem certeza que deseja reiniciar?";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LetterAttempt {
    pub value: char,
    pub correct: bool,
}

/// A guess that was applied to the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Guess {
    pub attempt: LetterAttempt,
    pub hits: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GuessError {
    #[error("Digite uma letra")]
    EmptyInput,
    #[error("Você já utilizou a letra {0}")]
    AlreadyUsed(char),
}

/// Messages surfaced to the player through `GameInterface::notify`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    Guess(GuessError),
    Won,
    Lost,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guess(err) => write!(f, "{err}"),
            Self::Won => f.write_str("Parabéns, você descobriu a palavra"),
            Self::Lost => f.write_str("Que pena, você usou todas as tentativas!"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundStatus {
    /// No challenge selected yet.
    Idle,
    InProgress,
    Won,
    Lost,
}

/// Result of a deferred round-end check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundEnd {
    Continue,
    Won,
    Lost,
    /// The check was scheduled for a round that has since been replaced.
    Stale,
}

/// Identifies the round a deferred check was scheduled for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundTicket(u64);

#[derive(Clone, Debug, Default)]
pub struct GameSession {
    challenge: Option<Challenge>,
    score: usize,
    letters_used: Vec<LetterAttempt>,
    pending_input: String,
    round: u64,
}

impl GameSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a new challenge and resets everything else.
    pub fn start(&mut self, challenge: Challenge) {
        self.challenge = Some(challenge);
        self.score = 0;
        self.letters_used.clear();
        self.pending_input.clear();
        self.round += 1;
    }

    pub fn challenge(&self) -> Option<&Challenge> {
        self.challenge.as_ref()
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn letters_used(&self) -> &[LetterAttempt] {
        &self.letters_used
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    pub fn attempts_used(&self) -> usize {
        self.letters_used.len()
    }

    pub fn max_attempts(&self) -> usize {
        self.challenge
            .as_ref()
            .map_or(0, |challenge| challenge.len() + ATTEMPTS_MARGIN)
    }

    pub fn ticket(&self) -> RoundTicket {
        RoundTicket(self.round)
    }

    /// Keeps at most the first character of `text`.
    pub fn set_pending_input(&mut self, text: &str) {
        self.pending_input = text.chars().take(1).collect();
    }

    pub fn is_used(&self, letter: char) -> bool {
        self.letters_used.iter().any(|used| used.value == letter)
    }

    /// One entry per letter of the word: the letter once it has been guessed.
    pub fn tiles(&self) -> Vec<Option<char>> {
        let Some(challenge) = &self.challenge else {
            return Vec::new();
        };
        challenge
            .word()
            .chars()
            .map(|c| self.is_used(c).then_some(c))
            .collect()
    }

    pub fn round_status(&self) -> RoundStatus {
        let Some(challenge) = &self.challenge else {
            return RoundStatus::Idle;
        };
        if self.score == challenge.len() {
            RoundStatus::Won
        } else if self.letters_used.len() == challenge.len() + ATTEMPTS_MARGIN {
            RoundStatus::Lost
        } else {
            RoundStatus::InProgress
        }
    }

    /// Applies the pending input as a guess.
    ///
    /// Returns `Ok(None)` without touching the session when there is no
    /// challenge or the round is already decided. A repeated letter is
    /// rejected and not counted again.
    pub fn confirm_guess(&mut self) -> Result<Option<Guess>, GuessError> {
        if self.round_status() != RoundStatus::InProgress {
            return Ok(None);
        }
        let Some(challenge) = &self.challenge else {
            return Ok(None);
        };

        let Some(letter) = self.pending_input.chars().find(|c| !c.is_whitespace()) else {
            return Err(GuessError::EmptyInput);
        };
        let value = letter.to_uppercase().next().unwrap_or(letter);

        if self.is_used(value) {
            self.pending_input.clear();
            debug_log!("confirm_guess() - '{}' already used", value);
            return Err(GuessError::AlreadyUsed(value));
        }

        let hits = challenge.hits(value);
        let attempt = LetterAttempt {
            value,
            correct: hits > 0,
        };
        self.letters_used.push(attempt);
        self.score += hits;
        self.pending_input.clear();
        debug_log!(
            "confirm_guess() - '{}' hits={} score={} attempts={}",
            value,
            hits,
            self.score,
            self.letters_used.len()
        );

        Ok(Some(Guess { attempt, hits }))
    }

    /// Checks whether the round scheduled as `ticket` has ended.
    pub fn evaluate_round_end(&self, ticket: RoundTicket) -> RoundEnd {
        if ticket != self.ticket() {
            return RoundEnd::Stale;
        }
        match self.round_status() {
            RoundStatus::Won => RoundEnd::Won,
            RoundStatus::Lost => RoundEnd::Lost,
            RoundStatus::Idle | RoundStatus::InProgress => RoundEnd::Continue,
        }
    }
}

/// What a front-end needs to provide to run the game.
pub trait GameInterface {
    fn render(&mut self, session: &GameSession);

    /// Waits for the next user action. With a timeout, returns `None` once
    /// it elapses. Without one, `None` means no more input can arrive.
    fn next_action(&mut self, timeout: Option<Duration>) -> Option<UserAction>;

    /// Blocking yes/no question.
    fn confirm(&mut self, question: &str) -> bool;

    /// Blocking message; returns once the player dismissed it.
    fn notify(&mut self, notice: &Notice);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserAction {
    Input(String),
    Confirm,
    Restart,
    Exit,
}

/// A session together with the bank and RNG its challenges come from.
pub struct Game<R: Rng> {
    bank: WordBank,
    rng: R,
    session: GameSession,
}

impl<R: Rng> Game<R> {
    /// Creates an idle game; call `start_game` to draw the first challenge.
    pub fn new(bank: WordBank, rng: R) -> Self {
        Self {
            bank,
            rng,
            session: GameSession::new(),
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn word_bank(&self) -> &WordBank {
        &self.bank
    }

    pub fn start_game(&mut self) {
        let challenge = self.bank.select_random_challenge(&mut self.rng).clone();
        info_log!("start_game() - new challenge with {} letters", challenge.len());
        self.session.start(challenge);
    }

    /// Restarts only if the player confirms. Returns whether it restarted.
    pub fn request_restart<I: GameInterface + ?Sized>(&mut self, interface: &mut I) -> bool {
        if interface.confirm(RESTART_QUESTION) {
            info_log!("request_restart() - confirmed");
            self.start_game();
            true
        } else {
            debug_log!("request_restart() - declined");
            false
        }
    }

    pub fn set_pending_input(&mut self, text: &str) {
        self.session.set_pending_input(text);
    }

    pub fn confirm_guess(&mut self) -> Result<Option<Guess>, GuessError> {
        self.session.confirm_guess()
    }

    /// Surfaces the win/loss notice and starts a new round once the player
    /// dismisses it.
    pub fn evaluate_round_end<I: GameInterface + ?Sized>(
        &mut self,
        ticket: RoundTicket,
        interface: &mut I,
    ) -> RoundEnd {
        let outcome = self.session.evaluate_round_end(ticket);
        match outcome {
            RoundEnd::Won => {
                info_log!("evaluate_round_end() - round won");
                interface.notify(&Notice::Won);
                self.start_game();
            }
            RoundEnd::Lost => {
                info_log!("evaluate_round_end() - round lost");
                interface.notify(&Notice::Lost);
                self.start_game();
            }
            RoundEnd::Stale => {
                debug_log!("evaluate_round_end() - stale ticket ignored");
            }
            RoundEnd::Continue => {}
        }
        outcome
    }
}

struct PendingCheck {
    ticket: RoundTicket,
    due: Instant,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopSummary {
    pub rounds_won: usize,
    pub rounds_lost: usize,
}

/// Runs the game until the interface asks to exit.
///
/// After every applied guess the board is rendered first and the round-end
/// check runs `round_end_delay` later, keyed to the round it was scheduled in.
pub fn game_loop<R: Rng, I: GameInterface + ?Sized>(
    game: &mut Game<R>,
    interface: &mut I,
    round_end_delay: Duration,
) -> LoopSummary {
    if game.session().challenge().is_none() {
        game.start_game();
    }

    let mut summary = LoopSummary::default();
    let mut pending: Option<PendingCheck> = None;

    loop {
        interface.render(game.session());

        if let Some(check) = pending.take_if(|check| Instant::now() >= check.due) {
            match game.evaluate_round_end(check.ticket, interface) {
                RoundEnd::Won => summary.rounds_won += 1,
                RoundEnd::Lost => summary.rounds_lost += 1,
                RoundEnd::Continue | RoundEnd::Stale => {}
            }
            continue;
        }

        let timeout = pending
            .as_ref()
            .map(|check| check.due.saturating_duration_since(Instant::now()));
        let Some(action) = interface.next_action(timeout) else {
            if timeout.is_none() {
                info_log!("game_loop() - input closed");
                break;
            }
            continue;
        };
        debug_log!("game_loop() - action: {:?}", action);

        match action {
            UserAction::Exit => break,
            UserAction::Input(text) => game.set_pending_input(&text),
            UserAction::Restart => {
                game.request_restart(interface);
            }
            UserAction::Confirm => match game.confirm_guess() {
                Ok(Some(_)) => {
                    pending = Some(PendingCheck {
                        ticket: game.session().ticket(),
                        due: Instant::now() + round_end_delay,
                    });
                }
                Ok(None) => {}
                Err(err) => interface.notify(&Notice::Guess(err)),
            },
        }
    }

    info_log!(
        "game_loop() - finished: {} won, {} lost",
        summary.rounds_won,
        summary.rounds_lost
    );
    summary
}
