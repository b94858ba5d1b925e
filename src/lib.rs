// Library interface for forca
// The binary and the integration tests both build on these modules

pub mod cli;
pub mod game_state;
pub mod logging;
pub mod tui;
pub mod wordbank;

// Re-export commonly used items for easier testing
pub use game_state::{
    ATTEMPTS_MARGIN, Game, GameInterface, GameSession, GuessError, LetterAttempt, LoopSummary,
    Notice, RoundEnd, RoundStatus, UserAction, game_loop,
};
pub use wordbank::{
    Challenge, WordBank, WordBankError, load_embedded_wordbank, load_wordbank_from_file,
    load_wordbank_from_str,
};
