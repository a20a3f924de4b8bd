use std::{io::Read, path::PathBuf, process::ExitCode};

use omega_membership::{congruence::evaluate_regex, prelude::*};

use tracing::{debug, info, trace};
use tracing_subscriber::{filter, prelude::*};

use clap::{Arg, ArgAction, ArgMatches, Command};

mod input;
use input::{parse_automaton, AutomatonFormatError};

fn cli() -> clap::Command {
    Command::new("omega-check")
        .about("Checks whether a deterministic Büchi automaton accepts some word described by an omega-regular expression")
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbosity")
                .num_args(0..=1)
                .require_equals(true)
                .value_parser(["info", "debug", "trace"])
                .default_missing_value("info"),
        )
        .arg(
            Arg::new("automaton")
                .short('a')
                .long("automaton")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("file containing the automaton, it is read from stdin if omitted"),
        )
        .arg(
            Arg::new("explain")
                .long("explain")
                .action(ArgAction::SetTrue)
                .help("print the transforms that were computed for prefix and loop"),
        )
        .arg(
            Arg::new("words")
                .value_name("WORD")
                .num_args(1..)
                .required(true)
                .help("words of the form `u v^w`, where `u` and `v` are regular expressions"),
        )
}

fn setup_logging(matches: &ArgMatches) {
    let Ok(Some(verbosity)) = matches.try_get_one::<String>("verbosity") else {
        return;
    };

    let level = match verbosity.as_str() {
        "trace" => filter::LevelFilter::TRACE,
        "debug" => filter::LevelFilter::DEBUG,
        "info" => filter::LevelFilter::INFO,
        _ => unreachable!(),
    };

    let stderr_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(level))
        .init();

    trace!("setup {level} logging");
}

fn read_automaton(matches: &ArgMatches) -> Result<Automaton, AutomatonFormatError> {
    let text = match matches.get_one::<PathBuf>("automaton") {
        Some(path) => {
            debug!("reading automaton from {}", path.display());
            std::fs::read_to_string(path)?
        }
        None => {
            debug!("reading automaton from stdin");
            let mut text = String::new();
            std::io::stdin().lock().read_to_string(&mut text)?;
            text
        }
    };
    parse_automaton(&text)
}

fn explain(automaton: &Automaton, word: &ParsedOmegaWord) {
    let table = TransitionTable::compile(automaton);
    if let Some(prefix) = word.prefix() {
        println!("prefix {prefix}:");
        println!("{}", evaluate_regex(prefix, &table).table(|q| table.label(q)));
    }
    println!("loop {}:", word.omega());
    println!(
        "{}",
        evaluate_regex(word.omega(), &table).table(|q| table.label(q))
    );
}

pub fn main() -> ExitCode {
    let matches = cli().get_matches();

    setup_logging(&matches);

    let automaton = match read_automaton(&matches) {
        Ok(automaton) => automaton,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(2);
        }
    };
    info!("read automaton with {} states", automaton.size());
    if matches.get_flag("explain") {
        println!("{}", automaton.show());
    }

    let mut input_error = false;
    let mut rejected = false;
    for text in matches.get_many::<String>("words").into_iter().flatten() {
        let word = match parse_omega_word(text) {
            Ok(word) => word,
            Err(err) => {
                eprintln!("{text}: {err}");
                input_error = true;
                continue;
            }
        };
        if matches.get_flag("explain") {
            explain(&automaton, &word);
        }

        let start = std::time::Instant::now();
        let evaluation = evaluate(&automaton, &word);
        info!("evaluating {word} took {}µs", start.elapsed().as_micros());

        rejected |= !evaluation.accepted;
        println!("{text}: {}", evaluation.show());
    }

    if input_error {
        ExitCode::from(2)
    } else if rejected {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
