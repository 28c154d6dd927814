use std::process::ExitCode;

use log::debug;
use winit::event_loop::EventLoop;

use cookie::config::DEFAULT_LOG_FILTER;
use cookie::{Config, Error};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER)).init();

    // No flags of our own, winit reads its settings from the environment.
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        debug!("ignoring arguments {args:?}");
    }

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if err.is_gl_failure() {
                println!("{err}");
            } else {
                eprintln!("{err}");
            }
            ExitCode::from(err.exit_code())
        },
    }
}

fn run() -> Result<(), Error> {
    let event_loop = EventLoop::new()?;
    cookie::run(event_loop, Config::default())
}
