#![forbid(unsafe_code)]

use std::io::Write;
use std::path::PathBuf;

use buriko_arc::arc::{self, Progress, UnpackOptions};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Erase the current terminal line and return to column 0.
const CLEAR_LINE: &str = "\x1b[2K\r";

#[derive(Debug, Parser)]
#[command(name = "arcman", version, about = "BURIKO ARC20 archive packer/unpacker")]
struct Cli {
    /// Don't print progress.
    #[arg(short, long, global = true, default_value_t = false)]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract an archive into a directory.
    Unpack {
        /// Input archive.
        archive: PathBuf,
        /// Output directory (created if missing).
        #[arg(default_value = "output")]
        output: PathBuf,
        /// Extract zero-size entries as empty files instead of failing.
        #[arg(long, default_value_t = false)]
        allow_empty: bool,
    },

    /// Pack the files of a directory into an archive. Subdirectories are skipped.
    Pack {
        /// Input directory.
        input: PathBuf,
        /// Output archive.
        #[arg(default_value = "output")]
        output: PathBuf,
    },

    /// List entries in an archive.
    List {
        archive: PathBuf,
        /// Print offsets and sizes too.
        #[arg(long, default_value_t = false)]
        verbose: bool,
    },

    /// Check archive integrity (header, index, bounds) without extracting.
    Verify {
        archive: PathBuf,
        /// Accept zero-size entries.
        #[arg(long, default_value_t = false)]
        allow_empty: bool,
    },
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn render(quiet: bool) -> impl FnMut(Progress<'_>) {
    move |p| {
        if quiet {
            return;
        }
        match p {
            Progress::Found { count } => println!("Found {count} valid file{}", plural(count)),
            Progress::Packing { index, total, name } => {
                print!("{CLEAR_LINE}Processing {index}/{total}: {name}");
            }
            Progress::Writing => print!("{CLEAR_LINE}Writing output file..."),
            Progress::Extracting { index, total, name } => {
                print!("{CLEAR_LINE}Extracting {index}/{total}: {name}");
            }
        }
        let _ = std::io::stdout().flush();
    }
}

fn run(cli: Cli) -> arc::ArcResult<()> {
    let mut progress = render(cli.quiet);

    match cli.cmd {
        Command::Unpack {
            archive,
            output,
            allow_empty,
        } => {
            let opts = UnpackOptions { allow_empty };
            let n = arc::unpack_with_progress(&archive, &output, &opts, &mut progress)?;
            if n > 0 {
                println!("{CLEAR_LINE}Successfully extracted {n} file{}", plural(n));
            }
        }
        Command::Pack { input, output } => {
            let n = arc::pack_with_progress(&input, &output, &mut progress)?;
            println!("{CLEAR_LINE}Successfully processed {n} valid file{}", plural(n));
        }
        Command::List { archive, verbose } => arc::list(&archive, verbose)?,
        Command::Verify {
            archive,
            allow_empty,
        } => {
            let n = arc::verify(&archive, &UnpackOptions { allow_empty })?;
            println!("ok: {n} entries");
        }
    }
    Ok(())
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let quiet = cli.quiet;
    if let Err(e) = run(cli) {
        if !quiet {
            print!("{CLEAR_LINE}");
            let _ = std::io::stdout().flush();
        }
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}
