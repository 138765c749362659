use std::fmt::Display;
use std::io::{self, Write};

use anyhow::Result;
use spinners_rs::{Spinner, Spinners};

// ESEQ is for "escape sequence"
pub const ESEQ_RED: &str = "\x1b[38;5;1m";
pub const ESEQ_GREEN: &str = "\x1b[38;5;2m";
pub const ESEQ_YELLOW: &str = "\x1b[38;5;3m";
pub const ESEQ_WEAK: &str = "\x1b[38;5;240m";
pub const ESEQ_RESET: &str = "\x1b[m";

pub const SPINNER_MS: u64 = 50;

pub fn info(message: impl Display) {
    println!("{ESEQ_YELLOW}{message}{ESEQ_RESET}");
}

pub fn success(message: impl Display) {
    println!("{ESEQ_GREEN}{message}{ESEQ_RESET}");
}

pub fn failure(message: impl Display) {
    eprintln!("{ESEQ_RED}{message}{ESEQ_RESET}");
}

pub fn detail(message: impl Display) {
    println!("{ESEQ_WEAK}{message}{ESEQ_RESET}");
}

// One dot per remote round-trip, flushed so the line grows live.
pub fn tick() {
    print!(".");
    io::stdout().flush().ok();
}

pub fn end_ticks() {
    println!();
}

pub fn with_spinner<T>(
    task: impl ToString,
    func: impl FnOnce(&mut Spinner) -> Result<T>,
) -> Result<T> {
    let mut spinner = Spinner::new(Spinners::BouncingBar, task.to_string());
    spinner.set_interval(SPINNER_MS);
    spinner.start();

    let result = func(&mut spinner);
    if result.is_err() {
        spinner.stop();
        println!();
    }

    result
}
