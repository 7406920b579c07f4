/// Preview: interactive generation shell for trying phrase books on cards.
///
/// Usage: preview --card <card.ron> [--phrases <path>] [--seed <n>]
///
/// Commands:
///   caption            compose one caption
///   alt                print alt text for every face
///   tags               show the selection tags derived from the card
///   bulk <n>           compose n captions with pool statistics
///   card <path>        load another card
///   seed <n>           set RNG seed
///   help               list commands
///   quit               exit

use dnt_blurb::core::phrases::PhraseBook;
use dnt_blurb::core::pipeline::BlurbEngine;
use dnt_blurb::core::selector::SelectionContext;
use dnt_blurb::schema::subject::Subject;
use std::collections::{BTreeMap, HashSet};
use std::io::{self, BufRead, Write};
use std::path::Path;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut card_path = None;
    let mut phrases_path = None;
    let mut seed: u64 = 42;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--card" if i + 1 < args.len() => {
                i += 1;
                card_path = Some(args[i].clone());
            }
            "--phrases" if i + 1 < args.len() => {
                i += 1;
                phrases_path = Some(args[i].clone());
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(42);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut phrases = match PhraseBook::standard() {
        Ok(book) => book,
        Err(e) => {
            eprintln!("ERROR: Built-in phrase book is invalid: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(ref path) = phrases_path {
        match PhraseBook::load_from_ron(Path::new(path)) {
            Ok(other) => phrases.merge(other),
            Err(e) => {
                eprintln!("ERROR: Failed to load phrases from {}: {}", path, e);
                std::process::exit(1);
            }
        }
    }

    let mut subject = match card_path {
        Some(ref path) => match load_card(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("ERROR: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            eprintln!("ERROR: --card is required");
            print_usage();
            std::process::exit(1);
        }
    };

    let mut current_seed = seed;
    let mut engine = match build_engine(phrases.clone(), current_seed) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    println!("Loaded card: {}", subject.name);
    println!("Seed: {}", seed);
    println!("Type 'help' for commands.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("preview> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => {
                print_help();
            }
            "caption" | "c" => match engine.caption_traced(&subject) {
                Ok((text, trace)) => {
                    println!("\n--- Caption ---");
                    println!("{}", text);
                    println!("--- End ---");
                    println!(
                        "  opener #{} | pool '{}' #{} | closer #{}{}\n",
                        trace.opener,
                        trace.pool,
                        trace.middle,
                        trace.closer,
                        if trace.easter_egg { " | easter egg" } else { "" }
                    );
                }
                Err(e) => println!("ERROR: {}", e),
            },
            "alt" => match engine.alt_texts(&subject) {
                Ok(texts) => {
                    for (i, text) in texts.iter().enumerate() {
                        println!("\n--- Face {} ---", i + 1);
                        println!("{}", text);
                    }
                    println!();
                }
                Err(e) => println!("ERROR: {}", e),
            },
            "tags" => {
                let ctx = SelectionContext::from_subject(&subject.representative());
                let mut tags: Vec<&String> = ctx.tags.iter().collect();
                tags.sort();
                println!("Tags: {:?}", tags);
                let pools: Vec<&str> = ctx
                    .eligible_pools(engine.phrases())
                    .iter()
                    .map(|p| p.name.as_str())
                    .collect();
                println!("Eligible pools: {:?}", pools);
            }
            "bulk" => {
                if parts.len() < 2 {
                    println!("Usage: bulk <n>");
                    continue;
                }
                let count: usize = match parts[1].parse() {
                    Ok(n) if n > 0 => n,
                    _ => {
                        println!("Invalid count: {}", parts[1]);
                        continue;
                    }
                };
                print_bulk_stats(&mut engine, &subject, count);
            }
            "card" => {
                if parts.len() < 2 {
                    println!("Usage: card <path>");
                    println!("  Current: {}", subject.name);
                    continue;
                }
                match load_card(parts[1]) {
                    Ok(s) => {
                        subject = s;
                        println!("Loaded card: {}", subject.name);
                    }
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            "seed" => {
                if parts.len() < 2 {
                    println!("Current seed: {}", current_seed);
                    continue;
                }
                match parts[1].parse::<u64>() {
                    Ok(s) => match build_engine(phrases.clone(), s) {
                        Ok(e) => {
                            current_seed = s;
                            engine = e;
                            println!("Seed set to {}", current_seed);
                        }
                        Err(e) => println!("ERROR: {}", e),
                    },
                    Err(_) => {
                        println!("Invalid seed: {}", parts[1]);
                    }
                }
            }
            _ => {
                println!("Unknown command: {}. Type 'help' for commands.", cmd);
            }
        }
    }
}

fn build_engine(
    phrases: PhraseBook,
    seed: u64,
) -> Result<BlurbEngine, dnt_blurb::core::BlurbError> {
    BlurbEngine::builder().seed(seed).with_phrases(phrases).build()
}

fn load_card(path: &str) -> Result<Subject, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read card {}: {}", path, e))?;
    let subject: Subject = ron::from_str(&contents)
        .map_err(|e| format!("Failed to parse card {}: {}", path, e))?;
    subject.validate().map_err(|e| e.to_string())?;
    Ok(subject)
}

fn print_bulk_stats(engine: &mut BlurbEngine, subject: &Subject, count: usize) {
    let mut pools: BTreeMap<String, usize> = BTreeMap::new();
    let mut distinct = HashSet::new();
    let mut eggs = 0usize;
    let mut total_len = 0usize;

    for _ in 0..count {
        match engine.caption_traced(subject) {
            Ok((text, trace)) => {
                *pools.entry(trace.pool).or_insert(0) += 1;
                if trace.easter_egg {
                    eggs += 1;
                }
                total_len += text.len();
                distinct.insert(text);
            }
            Err(e) => {
                println!("ERROR: {}", e);
                return;
            }
        }
    }

    println!("\n=== Bulk Stats ({} captions) ===", count);
    println!("Distinct captions: {}", distinct.len());
    println!("Average length: {} chars", total_len / count);
    println!(
        "Easter eggs: {} ({:.1}%)",
        eggs,
        eggs as f64 * 100.0 / count as f64
    );
    println!("Middle pools:");
    for (name, n) in &pools {
        println!("  {:<14} {}", name, n);
    }
    println!();
}

fn print_usage() {
    println!("Usage: preview --card <card.ron> [--phrases <path>] [--seed <n>]");
}

fn print_help() {
    println!("Commands:");
    println!("  caption           compose one caption");
    println!("  alt               print alt text for every face");
    println!("  tags              show selection tags and eligible pools");
    println!("  bulk <n>          compose n captions with pool statistics");
    println!("  card <path>       load another card");
    println!("  seed <n>          set RNG seed");
    println!("  help              list commands");
    println!("  quit              exit");
}
