/// Phrase Linter: validates phrase book coverage and quality.
///
/// Usage: phrase_linter <phrase_file_or_dir> [--base]
///
/// With `--base`, files are merged over the built-in Death & Taxes book
/// before linting, the way the bot loads override files.

use dnt_blurb::core::phrases::{PhraseBook, Severity};
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: phrase_linter <phrase_file_or_dir> [--base]");
        process::exit(0);
    }

    let phrase_path = Path::new(&args[1]);
    let merge_over_base = args.iter().skip(2).any(|a| a == "--base");

    let mut book = if merge_over_base {
        match PhraseBook::standard() {
            Ok(book) => book,
            Err(e) => {
                eprintln!("ERROR: Built-in phrase book is invalid: {}", e);
                process::exit(1);
            }
        }
    } else {
        PhraseBook::default()
    };

    let mut load_failures = Vec::new();
    if phrase_path.is_file() {
        match PhraseBook::load_from_ron(phrase_path) {
            Ok(other) => book.merge(other),
            Err(e) => {
                eprintln!("ERROR: Failed to load phrase file: {}", e);
                process::exit(1);
            }
        }
    } else if phrase_path.is_dir() {
        load_failures = book.merge_dir(phrase_path);
    } else {
        eprintln!("ERROR: Path '{}' does not exist", args[1]);
        process::exit(1);
    }

    let template_count: usize = book.openers.len()
        + book.closers.len()
        + book.middles.iter().map(|p| p.templates.len()).sum::<usize>();
    println!(
        "Loaded {} templates in {} middle pools, {} reference lists",
        template_count,
        book.middles.len(),
        book.lists.len()
    );

    let mut problems = load_failures;
    problems.extend(book.problems());
    let errors: Vec<_> = problems
        .iter()
        .filter(|p| p.severity == Severity::Error)
        .collect();
    let warnings: Vec<_> = problems
        .iter()
        .filter(|p| p.severity == Severity::Warning)
        .collect();

    println!("\n=== Phrase Lint Report ===\n");

    if problems.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning.message);
    }

    for error in &errors {
        println!("ERROR: {}", error.message);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}
