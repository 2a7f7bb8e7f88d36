//! teleop - interactive teleoperation client
//!
//! Connects to the onboard receiver, performs the hello handshake, then maps
//! keys typed on stdin to motion and toggle commands. Unrecognized lines are
//! sent to the receiver as-is.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use qrtrack::{map_key, TeleopLink, TrackerConfig};

#[derive(Parser)]
#[command(name = "teleop", about = "Keyboard teleoperation client")]
struct Args {
    /// Path to the JSON config file.
    #[arg(long, env = "QRTRACK_CONFIG")]
    config: Option<PathBuf>,

    /// Receiver address, host:port. Overrides the config file.
    #[arg(long)]
    addr: Option<String>,
}

const KEY_HELP: &str = "\
keys: w/s forward/backward, a/d turn, q/e translate, o/c gripper, x stop
other lines are sent raw; 'quit' exits";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let cfg = TrackerConfig::load(args.config.as_deref())?;
    let addr = args.addr.unwrap_or(cfg.teleop.addr);

    let mut link = TeleopLink::connect(&addr, cfg.teleop.connect_timeout)?;
    log::info!("connected to receiver at {}", link.peer());
    println!("{}", KEY_HELP);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "exit" {
            break;
        }

        let mut chars = input.chars();
        let (first, rest) = (chars.next(), chars.next());
        match (first, rest) {
            (Some(key), None) => match map_key(key) {
                Some(command) => {
                    log::debug!("sending '{}'", command.encode());
                    link.send(&command)?;
                }
                None => println!("unmapped key '{}'\n{}", key, KEY_HELP),
            },
            _ => link.send_raw(input)?,
        }
        io::stdout().flush()?;
    }

    Ok(())
}
