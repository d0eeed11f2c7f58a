//! Check a JSON document fixture against a PDF/A level.
//!
//! Usage:
//!   cargo run --bin check_pdfa -- fixture.json
//!   cargo run --bin check_pdfa -- --level A1b --full-check fixture.json
//!
//! Exit codes: 0 compliant, 1 not compliant, 2 usage or load error.
//! Logging is controlled with `RUST_LOG` (default `warn`).

use pdfa_oxide::compliance::{PdfALevel, PdfAValidator};
use pdfa_oxide::config::CheckerConfig;
use pdfa_oxide::fixture::load_document;
use std::path::PathBuf;
use std::process::ExitCode;

struct CheckArgs {
    level: PdfALevel,
    full_check: bool,
    fixture: PathBuf,
}

impl CheckArgs {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut level = PdfALevel::A2b;
        let mut full_check = false;
        let mut fixture = None;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--level" | "-l" => {
                    i += 1;
                    let value = args.get(i).ok_or("--level needs a value")?;
                    level = value.parse()?;
                },
                "--full-check" => {
                    full_check = true;
                },
                flag if flag.starts_with('-') => return Err(format!("unknown option {}", flag)),
                path => fixture = Some(PathBuf::from(path)),
            }
            i += 1;
        }

        Ok(Self {
            level,
            full_check,
            fixture: fixture.ok_or("missing fixture path")?,
        })
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match CheckArgs::from_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("Usage: check_pdfa [--level A2b] [--full-check] fixture.json");
            return ExitCode::from(2);
        },
    };

    let document = match load_document(&args.fixture) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Error: cannot load {}: {}", args.fixture.display(), e);
            return ExitCode::from(2);
        },
    };

    let mut config = CheckerConfig::from_env();
    if args.full_check {
        config = config.with_full_check(true);
    }
    let validator = PdfAValidator::new().with_config(config);
    let result = match validator.validate(&document, args.level) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: check of {} did not finish: {}", args.fixture.display(), e);
            return ExitCode::from(2);
        },
    };

    for warning in &result.warnings {
        println!("warning: {}", warning);
    }
    match &result.error {
        None => {
            println!("{}: compliant with {}", args.fixture.display(), result.level);
            ExitCode::SUCCESS
        },
        Some(error) => {
            println!("{}: not compliant with {}", args.fixture.display(), result.level);
            println!("  {}", error);
            ExitCode::from(1)
        },
    }
}
