use core::fmt;
use std::io::{self, BufRead, IsTerminal};

pub struct WriteAdapter<W>(pub W);

impl<W> fmt::Write for WriteAdapter<W>
where
    W: io::Write,
{
    fn write_str(&mut self, s: &str) -> Result<(), fmt::Error> {
        self.0.write_all(s.as_bytes()).map_err(|_| fmt::Error)?;
        self.0.flush().map_err(|_| fmt::Error)
    }

    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<(), fmt::Error> {
        self.0.write_fmt(args).map_err(|_| fmt::Error)?;
        self.0.flush().map_err(|_| fmt::Error)
    }
}

pub trait StdIn: Send + Sync {
    fn is_terminal(&self) -> bool;
    fn lines(&self) -> impl Iterator<Item = io::Result<String>>;
}

impl StdIn for io::Stdin {
    fn is_terminal(&self) -> bool {
        self.lock().is_terminal()
    }
    fn lines(&self) -> impl Iterator<Item = io::Result<String>> {
        io::BufReader::new(self.lock()).lines()
    }
}

/// Ask a yes/no question, reading the answer from `lines`.
///
/// Only an explicit yes counts, running out of input is a no.
///
/// # Errors
///
/// Fails if the prompt can't be written.
pub fn confirm<W: fmt::Write>(
    prompt: &str,
    lines: &mut impl Iterator<Item = io::Result<String>>,
    stdout: &mut W,
) -> Result<bool, fmt::Error> {
    write!(stdout, "{prompt} [y/N] ")?;
    let answer = lines.next().and_then(Result::ok).unwrap_or_default();
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::yes(Some("y"), true)]
    #[case::yes_word(Some("Yes"), true)]
    #[case::padded(Some("  y "), true)]
    #[case::no(Some("n"), false)]
    #[case::empty(Some(""), false)]
    #[case::other(Some("sure"), false)]
    #[case::eof(None, false)]
    fn test_confirm(#[case] answer: Option<&str>, #[case] expected: bool) {
        let mut lines = answer.map(|a| Ok(a.to_string())).into_iter();
        let mut out = String::new();

        assert_eq!(confirm("Delete?", &mut lines, &mut out).unwrap(), expected);
        assert_eq!(out, "Delete? [y/N] ");
    }
}
