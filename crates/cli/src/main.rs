use anyhow::Result;
use clap::{Parser, Subcommand};
use il2dump::commands::{dump_command, probe_command, DumpOverrides};
use il2dump_core::runtime::DEFAULT_LIBRARY;

/// Declaration dumper for a live IL2CPP runtime.
///
/// This CLI is a thin wrapper around `il2dump-core` (exposed in code as `il2dump_core`).
/// The runtime has to be loaded in this process, so `dump` is mostly useful from a
/// launcher that preloads the game library; `probe` works against any library.
#[derive(Parser, Debug)]
#[command(
    name = "il2dump",
    version,
    about = "Dump type declarations from a live IL2CPP runtime",
    long_about = None
)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Attach to the runtime and write a C#-like declaration dump.
    ///
    /// This will:
    /// - Wait until the runtime has finished initializing.
    /// - Walk every loaded assembly, directly or through reflection on old players.
    /// - Write the whole dump to `--output` once it has been built.
    Dump {
        /// Destination file. Replaced if it already exists.
        #[arg(long)]
        output: String,

        /// Runtime library to bind (overrides the config file).
        #[arg(long)]
        library: Option<String>,

        /// Optional JSON or YAML dump config.
        #[arg(long)]
        config: Option<String>,

        /// Milliseconds between readiness checks (overrides the config file).
        #[arg(long)]
        poll_interval_ms: Option<u64>,

        /// Leave out the `// Image <i>: <name>` index.
        #[arg(long)]
        no_image_index: bool,
    },

    /// Bind a runtime library and report which entry points resolved.
    ///
    /// Never attaches to the runtime.
    Probe {
        /// Runtime library to bind.
        #[arg(long, default_value = DEFAULT_LIBRARY)]
        library: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Dump { output, library, config, poll_interval_ms, no_image_index } => {
            let overrides = DumpOverrides { library, poll_interval_ms, no_image_index };
            dump_command(&output, config.as_deref(), &overrides)?
        }
        Command::Probe { library, json } => probe_command(&library, json)?,
    }

    Ok(())
}
