use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, LevelFilter};

use chip8_core::Config;

mod keymap;
mod run;

#[derive(Parser, Debug)]
#[command(name = "chip8", about = "Runs a CHIP-8 program in an SDL2 window.")]
struct Args {
    /// Program image to load at 0x200.
    #[arg(value_name = "ROM")]
    rom: PathBuf,

    /// Instructions to execute per second (unpaced if omitted).
    #[arg(long, value_name = "N")]
    ips: Option<u32>,

    /// Seed for the random number instruction.
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Keep running when the program spins on a jump to itself.
    #[arg(long, default_value_t = false)]
    no_idle_halt: bool,

    /// Size of each CHIP-8 pixel in window pixels.
    #[arg(long, default_value_t = 10)]
    scale: u32,

    /// Log a hex dump of program memory after loading.
    #[arg(long, default_value_t = false)]
    dump: bool,

    /// More logging; repeat for more.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            halt_on_idle_loop: !self.no_idle_halt,
            instructions_per_second: self.ips,
            seed: self.seed,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run::run(&args.rom, args.config(), args.scale, args.dump) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
