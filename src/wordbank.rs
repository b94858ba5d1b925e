use crate::debug_log;
use rand::Rng;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

pub const EMBEDDED_WORDBANK: &str = include_str!("resources/words.txt");

const FIELD_SEPARATOR: char = ';';
const COMMENT_PREFIX: char = '#';

/// The hidden word of a round together with the hint shown to the player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Challenge {
    word: String,
    tip: String,
}

impl Challenge {
    /// Builds a challenge, upper-casing the word.
    ///
    /// Returns `None` if the word is empty or contains anything but letters,
    /// or if the tip is blank.
    pub fn new(word: &str, tip: &str) -> Option<Self> {
        let word = word.trim().to_uppercase();
        let tip = tip.trim();
        if !is_valid_word(&word) || tip.is_empty() {
            return None;
        }
        Some(Self {
            word,
            tip: tip.to_string(),
        })
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn tip(&self) -> &str {
        &self.tip
    }

    /// Length of the word in letters.
    pub fn len(&self) -> usize {
        self.word.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.word.is_empty()
    }

    /// Number of positions in the word holding `letter`.
    pub fn hits(&self, letter: char) -> usize {
        self.word.chars().filter(|&c| c == letter).count()
    }
}

#[derive(Debug, Error)]
pub enum WordBankError {
    #[error("failed to read word bank: {0}")]
    Io(#[from] io::Error),
    #[error("word bank has no valid entries")]
    Empty,
}

/// A non-empty collection of challenges.
#[derive(Clone, Debug)]
pub struct WordBank {
    challenges: Vec<Challenge>,
}

impl WordBank {
    pub fn new(challenges: Vec<Challenge>) -> Result<Self, WordBankError> {
        if challenges.is_empty() {
            return Err(WordBankError::Empty);
        }
        Ok(Self { challenges })
    }

    pub fn challenges(&self) -> &[Challenge] {
        &self.challenges
    }

    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }

    pub fn contains(&self, challenge: &Challenge) -> bool {
        self.challenges.contains(challenge)
    }

    /// Uniform pick, with replacement.
    pub fn select_random_challenge<R: Rng>(&self, rng: &mut R) -> &Challenge {
        let index = rng.gen_range(0..self.challenges.len());
        &self.challenges[index]
    }
}

fn is_valid_word(word: &str) -> bool {
    !word.is_empty() && word.chars().all(char::is_alphabetic)
}

fn parse_line(line: &str) -> Option<Challenge> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
        return None;
    }
    let Some((word, tip)) = line.split_once(FIELD_SEPARATOR) else {
        debug_log!("Skipping word bank line without separator: '{}'", line);
        return None;
    };
    let challenge = Challenge::new(word, tip);
    if challenge.is_none() {
        debug_log!("Skipping invalid word bank line: '{}'", line);
    }
    challenge
}

/// Parses `WORD;tip` lines. Blank lines and `#` comments are ignored.
pub fn load_wordbank_from_str(data: &str) -> Result<WordBank, WordBankError> {
    WordBank::new(data.lines().filter_map(parse_line).collect())
}

pub fn load_wordbank_from_file<P: AsRef<Path>>(path: P) -> Result<WordBank, WordBankError> {
    let data = fs::read_to_string(path)?;
    load_wordbank_from_str(&data)
}

pub fn load_embedded_wordbank() -> Result<WordBank, WordBankError> {
    load_wordbank_from_str(EMBEDDED_WORDBANK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_embedded_wordbank_is_valid() {
        let bank = load_embedded_wordbank().unwrap();
        assert!(!bank.is_empty());
        for challenge in bank.challenges() {
            assert!(challenge.len() > 0);
            assert!(!challenge.tip().is_empty());
            assert!(challenge.word().chars().all(|c| c.is_uppercase()));
        }
    }

    #[test]
    fn test_challenge_uppercases_word() {
        let challenge = Challenge::new("gato", "Animal").unwrap();
        assert_eq!(challenge.word(), "GATO");
        assert_eq!(challenge.len(), 4);
    }

    #[test]
    fn test_challenge_rejects_bad_entries() {
        assert!(Challenge::new("", "dica").is_none());
        assert!(Challenge::new("GA TO", "dica").is_none());
        assert!(Challenge::new("G4TO", "dica").is_none());
        assert!(Challenge::new("GATO", "   ").is_none());
    }

    #[test]
    fn test_hits_counts_every_occurrence() {
        let challenge = Challenge::new("ANANA", "dica").unwrap();
        assert_eq!(challenge.hits('A'), 3);
        assert_eq!(challenge.hits('N'), 2);
        assert_eq!(challenge.hits('Z'), 0);
    }

    #[test]
    fn test_len_counts_letters_not_bytes() {
        let challenge = Challenge::new("maçã", "Fruta").unwrap();
        assert_eq!(challenge.word(), "MAÇÃ");
        assert_eq!(challenge.len(), 4);
    }

    #[test]
    fn test_load_from_str_skips_invalid_lines() {
        let data = "# comentario\n\ngato;Mia\nsem separador\n;sem palavra\nSOL;\nsol;Brilha\n";
        let bank = load_wordbank_from_str(data).unwrap();
        let words: Vec<&str> = bank.challenges().iter().map(Challenge::word).collect();
        assert_eq!(words, vec!["GATO", "SOL"]);
    }

    #[test]
    fn test_load_from_str_keeps_separator_in_tip() {
        let bank = load_wordbank_from_str("GATO;Mia; e ronrona").unwrap();
        assert_eq!(bank.challenges()[0].tip(), "Mia; e ronrona");
    }

    #[test]
    fn test_load_from_str_empty_is_error() {
        assert!(matches!(
            load_wordbank_from_str("# nada\n\n"),
            Err(WordBankError::Empty)
        ));
    }

    #[test]
    fn test_load_from_missing_file_is_io_error() {
        let result = load_wordbank_from_file("/nonexistent/forca/words.txt");
        assert!(matches!(result, Err(WordBankError::Io(_))));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("forca_wordbank_test.txt");
        fs::write(&path, "casa;Onde moramos\n").unwrap();
        let bank = load_wordbank_from_file(&path).unwrap();
        assert_eq!(bank.len(), 1);
        assert_eq!(bank.challenges()[0].word(), "CASA");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_select_random_challenge_comes_from_bank() {
        let bank = load_embedded_wordbank().unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let challenge = bank.select_random_challenge(&mut rng);
            assert!(bank.contains(challenge));
        }
    }

    #[test]
    fn test_select_random_challenge_reaches_every_entry() {
        let bank = load_wordbank_from_str("GATO;a\nSOL;b\nCASA;c").unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(bank.select_random_challenge(&mut rng).word().to_string());
        }
        assert_eq!(seen.len(), 3);
    }
}
