use forca::cli::{CliInterface, parse_cli};
use forca::game_state::{Game, LoopSummary, game_loop};
use forca::info_log;
use forca::logging::{default_log_path, init_logging};
use forca::tui::TuiInterface;
use forca::wordbank::{load_embedded_wordbank, load_wordbank_from_file};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = parse_cli();

    if let Some(path) = cli.log_file.clone().or_else(default_log_path)
        && let Err(e) = init_logging(&path)
    {
        eprintln!("Failed to open log file '{}': {e}", path.display());
    }

    let wordbank = match &cli.wordbank_path {
        Some(path) => load_wordbank_from_file(path).map_err(|e| (path.display().to_string(), e)),
        None => load_embedded_wordbank().map_err(|e| ("embedded".to_string(), e)),
    };
    let wordbank = match wordbank {
        Ok(bank) => bank,
        Err((source, e)) => {
            eprintln!("Failed to load word bank from '{source}': {e}");
            return ExitCode::FAILURE;
        }
    };
    info_log!("Loaded {} challenges", wordbank.len());

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut game = Game::new(wordbank, rng);
    let delay = cli.round_end_delay();

    let summary: LoopSummary = if cli.plain {
        let mut interface = CliInterface::new(io::stdin().lock(), io::stdout());
        game_loop(&mut game, &mut interface, delay)
    } else {
        let mut interface = match TuiInterface::new() {
            Ok(interface) => interface,
            Err(e) => {
                eprintln!("Failed to initialize terminal: {e}");
                return ExitCode::FAILURE;
            }
        };
        let summary = game_loop(&mut game, &mut interface, delay);
        // Restores the terminal before printing the summary.
        drop(interface);
        summary
    };

    println!(
        "Palavras descobertas: {} | Rodadas perdidas: {}",
        summary.rounds_won, summary.rounds_lost
    );
    ExitCode::SUCCESS
}
