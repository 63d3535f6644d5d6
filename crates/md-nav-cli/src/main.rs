use clap::{ArgAction, CommandFactory, Parser};
use clap_complete::{generate, Shell};

mod commands;

/// Section trees, tables of contents and scroll tracking for markdown articles.
#[derive(Debug, Parser)]
#[command(name = "md-nav", version)]
struct Cli {
    /// Log more (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, clap::Subcommand)]
enum CliCommand {
    #[command(flatten)]
    Nav(commands::Commands),
    /// Print a completion script for the given shell
    Completions { shell: Shell },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn dispatch(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    match &cli.command {
        CliCommand::Nav(cmd) => commands::run(cmd),
        CliCommand::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "md-nav", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = dispatch(&cli) {
        log::debug!("command failed: {e:?}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
