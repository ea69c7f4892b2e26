use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};
use viterbi_golden::codec::HexPolicy;
use viterbi_golden::compare::compare_files;
use viterbi_golden::config::RunConfig;

#[derive(Parser)]
#[command(name = "viterbi-ref")]
#[command(author, version, about = "Bit-exact Viterbi reference model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Decode Input.dat against the model and write the reference output
    Run(RunArgs),
    /// Compare a reference output with a device-under-test capture
    Compare {
        #[arg(long, env = "VITERBI_REFERENCE")]
        reference: PathBuf,
        #[arg(long, env = "VITERBI_CANDIDATE")]
        candidate: PathBuf,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Test-case directory holding N.dat, A.dat, B.dat and Input.dat
    #[arg(long, short = 'd', env = "VITERBI_DIR", default_value = ".")]
    dir: PathBuf,
    #[arg(long, env = "VITERBI_N")]
    n: Option<PathBuf>,
    #[arg(long, env = "VITERBI_A")]
    a: Option<PathBuf>,
    #[arg(long, env = "VITERBI_B")]
    b: Option<PathBuf>,
    #[arg(long, env = "VITERBI_INPUT")]
    input: Option<PathBuf>,
    #[arg(long, short = 'o', env = "VITERBI_OUTPUT")]
    output: Option<PathBuf>,
    /// Load malformed model tokens as 0.0 instead of failing
    #[arg(long)]
    lenient_hex: bool,
    /// Decode sequences concurrently (needs the `parallel` feature)
    #[arg(long)]
    parallel: bool,
    /// Sequences buffered per parallel chunk
    #[arg(long)]
    chunk_size: Option<usize>,
}

impl RunArgs {
    fn into_config(self) -> RunConfig {
        let mut cfg = RunConfig::in_dir(&self.dir);
        if let Some(p) = self.n {
            cfg.n_path = p;
        }
        if let Some(p) = self.a {
            cfg.a_path = p;
        }
        if let Some(p) = self.b {
            cfg.b_path = p;
        }
        if let Some(p) = self.input {
            cfg.input_path = p;
        }
        if let Some(p) = self.output {
            cfg.output_path = p;
        }
        if self.lenient_hex {
            cfg.hex_policy = HexPolicy::Lenient;
        }
        cfg.parallel = self.parallel;
        cfg.chunk_size = self.chunk_size;
        cfg
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("viterbi_golden={level},viterbi_ref={level}")));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Run(args) => match args.into_config().run() {
            Ok(report) => {
                if report.truncated {
                    tracing::warn!("a trailing sequence had no sentinel and was dropped");
                }
                ExitCode::SUCCESS
            }
            Err(err) => {
                tracing::error!(error = %err, "reference run failed");
                ExitCode::from(2)
            }
        },
        Command::Compare {
            reference,
            candidate,
        } => match compare_files(&reference, &candidate) {
            Ok(outcome) if outcome.is_match() => {
                println!("{outcome}");
                ExitCode::SUCCESS
            }
            Ok(outcome) => {
                println!("{outcome}");
                ExitCode::from(1)
            }
            Err(err) => {
                tracing::error!(error = %err, "comparison failed");
                ExitCode::from(2)
            }
        },
    }
}
