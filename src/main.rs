use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use pipegraph::format::{self, InternalLines, Parsed, SerializeOptions};
use pipegraph::{Result, diagnostics, summary};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pipegraph")]
#[command(about = "Pipeline graph text formatter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a pipeline file and print it in canonical form.
    Fmt {
        #[arg(long)]
        input: String,

        /// Write here instead of stdout.
        #[arg(short = 'o', long)]
        out: Option<String>,

        #[arg(long, value_enum, default_value_t = InternalLines::Derived)]
        internal: InternalLines,

        /// Fail on lines the parser would otherwise skip.
        #[arg(long)]
        strict: bool,
    },
    /// Summarize the graph a pipeline file describes.
    Inspect {
        #[arg(long)]
        input: String,

        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Fmt {
            input,
            out,
            internal,
            strict,
        } => {
            let parsed = read_pipeline(&input)?;
            if strict && !parsed.skipped.is_empty() {
                let lines: Vec<String> = parsed.skipped.iter().map(|s| s.to_string()).collect();
                bail!(
                    "{}",
                    diagnostics::error_message(format!(
                        "{} has {} unparsed lines:\n  {}",
                        input,
                        lines.len(),
                        lines.join("\n  ")
                    ))
                );
            }
            for s in &parsed.skipped {
                diagnostics::warn(format!("{}: skipped {}", input, s));
            }

            let text = format::serialize_with(&parsed.graph, &SerializeOptions { internal });
            match out {
                Some(out) => {
                    std::fs::write(&out, format!("{}\n", text)).with_context(|| {
                        diagnostics::error_message(format!("write pipeline file {}", out))
                    })?;
                    tracing::info!("wrote {}", out);
                }
                None => println!("{}", text),
            }
        }
        Commands::Inspect { input, json } => {
            let parsed = read_pipeline(&input)?;
            let report = summary::build_summary(&parsed.graph, &parsed.skipped);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report);
            }
        }
    }

    Ok(())
}

fn read_pipeline(path: &str) -> Result<Parsed> {
    let text = std::fs::read_to_string(path)
        .with_context(|| diagnostics::error_message(format!("read pipeline file {}", path)))?;
    Ok(format::parse_with_report(&text))
}
