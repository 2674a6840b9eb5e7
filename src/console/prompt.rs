use std::io::{self, BufRead, Write};

use crate::config::{NO, YES};

pub const INVALID_INPUT: &str = "Invalid input. Please enter a valid input.";

/// Ask `question` until `parse` accepts the answer.
///
/// The answer is trimmed before it is parsed. Returns `Ok(None)` once the
/// input is exhausted.
pub fn ask<R, W, T>(
    input: &mut R,
    output: &mut W,
    question: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> io::Result<Option<T>>
where
    R: BufRead,
    W: Write,
{
    let mut line = String::new();
    loop {
        writeln!(output, "{question}")?;
        write!(output, "> ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(None);
        }
        let answer = line.trim();
        if let Some(value) = parse(answer) {
            return Ok(Some(value));
        }
        log::debug!("rejected input {answer:?} for {question:?}");
        writeln!(output, "{INVALID_INPUT}")?;
    }
}

pub fn parse_yes_no(input: &str) -> Option<bool> {
    let input = input.trim().to_lowercase();
    if YES.contains(&input.as_str()) {
        Some(true)
    } else if NO.contains(&input.as_str()) {
        Some(false)
    } else {
        None
    }
}
