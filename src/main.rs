use gfg_earley::{split_words, Engine, Error};
use log::info;
use std::env;
use std::fs;
use std::process::ExitCode;
use std::time::Instant;

const USAGE: &str = "usage: gfg-earley <grammar.json> <input-file> [--json]

Each non-empty line of the input file is parsed on its own. Words are
separated by whitespace and every word names the terminal it stands for.
Set RUST_LOG=debug (or trace) for engine diagnostics.";

struct Options {
    grammar_path: String,
    input_path: String,
    json: bool,
}

fn parse_args() -> Result<Options, String> {
    let mut json = false;
    let mut positional = Vec::new();
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            _ => positional.push(arg),
        }
    }
    match <[String; 2]>::try_from(positional) {
        Ok([grammar_path, input_path]) => Ok(Options {
            grammar_path,
            input_path,
            json,
        }),
        Err(_) => Err(USAGE.to_string()),
    }
}

/// Parse one input line, printing the tree or the diagnostic.
/// Returns whether the line was accepted.
fn run_line(engine: &Engine, line: &str, json: bool) -> Result<bool, Error> {
    let start = Instant::now();
    let parsing = match engine.parse(split_words(line)) {
        Ok(parsing) => parsing,
        Err(failure) => {
            println!("[✗] {}", failure);
            return Ok(false);
        }
    };
    let tree = engine.to_ptree(&parsing)?;
    let duration = start.elapsed();

    let derivations = match parsing.count_derivations() {
        Some(n) => n.to_string(),
        None => "infinitely many".to_string(),
    };
    println!(
        "[✓] {} tokens in {}us, {} derivation(s)",
        parsing.tokens().len(),
        duration.as_micros(),
        derivations
    );
    if json {
        match tree.to_json() {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Failed to serialize tree: {}", e),
        }
    } else {
        println!("{}", tree.display());
    }
    Ok(true)
}

fn main() -> ExitCode {
    env_logger::init();

    let options = match parse_args() {
        Ok(options) => options,
        Err(usage) => {
            eprintln!("{}", usage);
            return ExitCode::from(2);
        }
    };

    let engine = match Engine::from_file(&options.grammar_path) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error loading grammar: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("loaded grammar from {}", options.grammar_path);
    println!("{}", engine.grammar());

    let input = match fs::read_to_string(&options.input_path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!(
                "Failed to read input file '{}': {}",
                options.input_path, e
            );
            return ExitCode::FAILURE;
        }
    };

    let lines: Vec<&str> = input.lines().filter(|l| !l.trim().is_empty()).collect();
    println!("Found {} inputs", lines.len());
    println!("{}", "=".repeat(60));

    let mut accepted = 0;
    for (i, line) in lines.iter().enumerate() {
        println!("\nInput #{}: {}", i + 1, line.trim());
        match run_line(&engine, line, options.json) {
            Ok(true) => accepted += 1,
            Ok(false) => {}
            Err(e) => {
                eprintln!("Internal error while building the tree: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    println!("\n{}", "=".repeat(60));
    println!("{}/{} inputs accepted", accepted, lines.len());
    if accepted == lines.len() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
