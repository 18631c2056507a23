use std::io;

use anyhow::Result;
use arbor::{dump::dump_plain, testing::Harness};
use arbor_examples::{popupgym::PopupGym, script};
use chrono::NaiveDate;
use clap::Parser;
use tracing::Level;

/// Default input: open both dropdowns and the calendar in turn.
const DEFAULT_SCRIPT: &str = "click:20,20 click:20,45 click:20,240 key:up key:enter click:160,20";

/// Open popups with a scripted input sequence and print where they landed.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Window width
    #[clap(long, default_value_t = 400.0)]
    width: f32,

    /// Window height
    #[clap(long, default_value_t = 260.0)]
    height: f32,

    /// Whitespace-separated steps, e.g. "click:20,20 key:down"
    #[clap(short, long, default_value = DEFAULT_SCRIPT)]
    script: String,

    /// Print the tree after the script
    #[clap(short, long)]
    tree: bool,

    /// Log core activity to stderr
    #[clap(short, long)]
    verbose: bool,
}

pub fn main() -> Result<()> {
    let args = Args::parse();
    if args.verbose {
        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_max_level(Level::DEBUG)
            .init();
    }

    let mut h = Harness::new(args.width, args.height);
    let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap_or_default();
    let gym = PopupGym::build(&mut h, date)?;
    for step in script::parse(&args.script)? {
        step.apply(&mut h)?;
        h.frame()?;
        println!("after {step:?}:");
        println!("{}", gym.popup_table(&h));
    }
    if args.tree {
        println!("{}", dump_plain(&h.window.core, h.root())?);
    }
    println!("{}", gym.summary(&mut h)?);
    Ok(())
}
