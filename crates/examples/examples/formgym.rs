use std::io;

use anyhow::Result;
use arbor::{
    FocusManager,
    dump::{dump, layout_table},
    testing::Harness,
};
use arbor_examples::{formgym::FormGym, script};
use chrono::NaiveDate;
use clap::Parser;
use tracing::Level;

/// Default input: fill in every field from the keyboard and submit.
const DEFAULT_SCRIPT: &str = "key:tab text:ada key:tab key:space key:tab key:right key:right \
                              key:tab key:down key:down key:tab key:tab key:enter";

/// Drive a form with a scripted input sequence and print the resulting tree.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Window width
    #[clap(long, default_value_t = 360.0)]
    width: f32,

    /// Window height
    #[clap(long, default_value_t = 420.0)]
    height: f32,

    /// Whitespace-separated steps, e.g. "click:10,20 key:tab text:hi"
    #[clap(short, long, default_value = DEFAULT_SCRIPT)]
    script: String,

    /// Print the layout table
    #[clap(short, long)]
    layout: bool,

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
    let start = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap_or_default();
    let form = FormGym::build(&mut h, start)?;
    let steps = script::parse(&args.script)?;
    script::run(&mut h, &steps)?;
    form.refresh_status(&mut h)?;

    println!("{}", dump(&h.window.core, h.root())?);
    if args.layout {
        println!("{}", layout_table(&h.window.core, h.root()));
    }
    println!("focus: {:?}", h.window.core.focused());
    println!("{}", form.summary(&mut h)?);
    println!("history rows: {}", form.history_len());
    Ok(())
}
