use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::menu::{Session, Step};

/// Line-oriented front-end for piped input: prompts go to `output`, answers
/// come from `input`. End of input behaves like choosing `0`.
pub fn run_plain<R: BufRead, W: Write>(conn: &Connection, input: R, mut output: W) -> Result<()> {
    let mut session = Session::new();
    let mut lines = input.lines();
    let mut printed = Vec::new();

    loop {
        if session.at_menu() {
            writeln!(output)?;
            for line in session.menu_lines() {
                writeln!(output, "{line}")?;
            }
        }
        write!(output, "{}", session.prompt())?;
        output.flush().context("failed to flush prompt")?;

        let Some(line) = lines.next() else {
            writeln!(output)?;
            return Ok(());
        };
        let line = line.context("failed to read input")?;
        writeln!(output)?;

        let step = session.submit(conn, &line, &mut printed)?;
        for text in printed.drain(..) {
            writeln!(output, "{text}")?;
        }
        if step == Step::Exit {
            return Ok(());
        }
    }
}
