use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use codespan_reporting::files::{SimpleFile, SimpleFiles};
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use luaparse::driver::{parse_named, ParseOptions, ParseOutput, RecoveryMode};
use luaparse::lexer::{display_source, format_tokens, Lexer};
use luaparse::printer::print_program;
use luaparse::{Diagnostic, LuaError};

#[derive(Parser)]
#[command(name = "luaparse")]
#[command(author, version, about = "A recovering Lua parser", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    options: OptionArgs,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct OptionArgs {
    /// Abort at the first error instead of recovering
    #[arg(long, global = true)]
    stop_at_first_error: bool,

    /// Warn about long brackets deeper than this level
    #[arg(long, global = true, value_name = "N", default_value_t = 4)]
    warn_bracket_level: usize,

    /// Never warn about long bracket levels
    #[arg(long, global = true, conflicts_with = "warn_bracket_level")]
    no_bracket_warning: bool,
}

impl OptionArgs {
    fn to_parse_options(&self) -> ParseOptions {
        let recovery = if self.stop_at_first_error {
            RecoveryMode::StopAtFirstError
        } else {
            RecoveryMode::Recover
        };
        let level = (!self.no_bracket_warning).then_some(self.warn_bracket_level);
        ParseOptions::default()
            .with_recovery(recovery)
            .with_long_bracket_warn_level(level)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a Lua source file and print its syntax tree
    Parse {
        /// The source file to parse
        input: PathBuf,

        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Dump the token stream of a Lua source file
    Tokens {
        /// The source file to tokenize
        input: PathBuf,
    },

    /// Check a Lua source file for errors
    Check {
        /// The source file to check
        input: PathBuf,
    },

    /// Print a Lua source file in canonical form
    Fmt {
        /// The source file to format
        input: PathBuf,

        /// Overwrite the file instead of printing to stdout
        #[arg(short, long)]
        write: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logger before parsing CLI args
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbose flag
    if cli.verbose {
        log::set_max_level(log::LevelFilter::Debug);
    }

    let options = cli.options.to_parse_options();
    let result = match cli.command {
        Commands::Parse { input, json } => parse(input, json, &options),
        Commands::Tokens { input } => tokens(input, &options),
        Commands::Check { input } => check(input, &options),
        Commands::Fmt { input, write } => format(input, write, &options),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

/// Source file loaded for one command
struct SourceState {
    name: String,
    /// Raw bytes as read from disk
    source: Vec<u8>,
    /// Text shown in diagnostics, with invalid bytes replaced one for one
    text: String,
    files: SimpleFiles<String, String>,
    file_id: usize,
}

impl SourceState {
    fn new(path: PathBuf) -> Result<Self> {
        let source =
            fs::read(&path).with_context(|| format!("Failed to read source file: {:?}", path))?;
        let text = display_source(&source);
        let name = path.display().to_string();

        let mut files = SimpleFiles::new();
        let file_id = files.add(name.clone(), text.clone());

        Ok(Self {
            name,
            source,
            text,
            files,
            file_id,
        })
    }

    fn parse(&self, options: &ParseOptions) -> ParseOutput {
        parse_named(&self.name, &self.source, options)
    }

    fn report(&self, diagnostics: &[Diagnostic]) -> Result<()> {
        let writer = StandardStream::stderr(ColorChoice::Always);
        let config = codespan_reporting::term::Config::default();
        for diagnostic in diagnostics {
            codespan_reporting::term::emit(
                &mut writer.lock(),
                &config,
                &self.files,
                &diagnostic.to_codespan(self.file_id),
            )?;
        }
        Ok(())
    }

    /// Reports all diagnostics and fails if any of them is an error
    fn report_and_check(&self, output: &ParseOutput) -> Result<()> {
        self.report(&output.diagnostics)?;
        if output.has_errors() {
            anyhow::bail!(
                "{} error(s) in {}",
                output.errors().count(),
                self.name
            );
        }
        Ok(())
    }
}

fn parse(input: PathBuf, json: bool, options: &ParseOptions) -> Result<()> {
    let state = SourceState::new(input)?;
    let output = state.parse(options);
    state.report(&output.diagnostics)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&output.program)?);
    } else {
        println!("{:#?}", output.program);
    }

    if output.has_errors() {
        anyhow::bail!("Parsing failed");
    }
    Ok(())
}

fn tokens(input: PathBuf, options: &ParseOptions) -> Result<()> {
    let state = SourceState::new(input)?;
    log::debug!("Starting lexical analysis");

    let lexed = Lexer::with_scanner(
        &state.source,
        options.scanner.clone(),
        options.long_bracket_warn_level,
    )
    .collect_tokens();

    println!("{}", "=== Tokens ===".blue().bold());
    println!("{}", format_tokens(&lexed.tokens));

    let file = SimpleFile::new(state.name.clone(), state.text.as_str());
    let lexical: Vec<_> = lexed
        .errors
        .into_iter()
        .map(|e| Diagnostic::from_error(&LuaError::from(e), &file))
        .collect();
    state.report(&lexical)?;

    if lexical.iter().any(Diagnostic::is_error) {
        anyhow::bail!("Lexical analysis failed");
    }
    Ok(())
}

fn check(input: PathBuf, options: &ParseOptions) -> Result<()> {
    log::info!("Checking {:?}", input);

    let state = SourceState::new(input)?;
    let output = state.parse(options);
    state.report_and_check(&output)?;

    println!("{}: No errors found", "success".green().bold());
    Ok(())
}

fn format(input: PathBuf, write: bool, options: &ParseOptions) -> Result<()> {
    let state = SourceState::new(input.clone())?;
    let output = state.parse(options);
    state.report_and_check(&output)?;

    let formatted = print_program(&output.program);
    if write {
        fs::write(&input, formatted)
            .with_context(|| format!("Failed to write formatted source: {:?}", input))?;
        println!("{}: Formatted {:?}", "success".green().bold(), input);
    } else {
        print!("{}", formatted);
    }
    Ok(())
}
