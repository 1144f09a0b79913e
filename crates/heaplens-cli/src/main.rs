//! Heaplens command line tool
//!
//! Captures JSON heap dumps of the tracked object registry, either as a
//! one-shot capture or on a fixed interval while a demo workload churns.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};

mod output;
mod workload;

use output::{resolve_color_choice, StyledOutput};
use workload::Workload;

#[derive(Parser)]
#[command(name = "heaplens")]
#[command(about = "Heap dump capture for tracked object registries", long_about = None)]
#[command(version)]
struct Cli {
    /// Color output: auto, always, never
    #[arg(long, global = true)]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture one heap dump and exit
    Dump {
        /// Destination path (".json" appended when missing)
        #[arg(default_value = "heap_dump")]
        path: PathBuf,
        /// Seed the demo workload before capturing
        #[arg(long)]
        demo: bool,
    },

    /// Capture numbered dumps on an interval while the demo workload runs
    Watch {
        /// Directory receiving the numbered dumps
        #[arg(short, long, default_value = "heap_dumps")]
        out_dir: PathBuf,
        /// Seconds between captures
        #[arg(short, long, default_value_t = 10)]
        interval: u64,
        /// Number of captures; 0 runs until interrupted
        #[arg(short, long, default_value_t = 0)]
        count: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut out = StyledOutput::new(resolve_color_choice(cli.color.as_deref()));

    match cli.command {
        Commands::Dump { path, demo } => {
            let _workload = demo.then(Workload::start);
            match heaplens::collect_heap_metadata(&path) {
                Ok(message) => out.success_line(&message),
                Err(e) => {
                    out.error_line(&e.to_string());
                    std::process::exit(1);
                }
            }
        }

        Commands::Watch {
            out_dir,
            interval,
            count,
        } => {
            let mut workload = Workload::start();
            out.info_line(&format!(
                "Watching the demo workload; dumps land in {}",
                out_dir.display()
            ));

            let mut taken: u64 = 0;
            loop {
                workload.tick();
                let destination = out_dir.join(format!("heap_dump_{}", taken));
                match heaplens::collect_heap_metadata(&destination) {
                    Ok(message) => out.success_line(&message),
                    Err(e) => out.error_line(&e.to_string()),
                }
                out.dim_line(&format!("live items: {}", workload.live_items()));

                taken += 1;
                if count != 0 && taken >= count {
                    break;
                }
                thread::sleep(Duration::from_secs(interval));
            }
        }
    }

    Ok(())
}
