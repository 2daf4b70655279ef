//! Interactive downsizing questions asked before the pipeline starts.

use super::DEFAULT_MAX_PER_CLASS;
use crate::error::PrepError;
use anyhow::Result;
use std::io::{BufRead, Write};

fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<String> {
    write!(output, "{}", question)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(PrepError::PromptAborted.into());
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Ask whether to downsize and, if so, the per-class maximum.
///
/// Returns `None` when the user declines.
pub fn ask_downsize<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Option<usize>> {
    let answer = ask(
        input,
        output,
        "Would you like to downsize the dataset? ([y]/n): ",
    )?;
    if !matches!(answer.to_lowercase().as_str(), "y" | "") {
        return Ok(None);
    }

    let question = format!(
        "What is the maximum number of examples you want in each class? (default: {}): ",
        DEFAULT_MAX_PER_CLASS
    );
    loop {
        let answer = ask(input, output, &question)?;
        if answer.is_empty() {
            return Ok(Some(DEFAULT_MAX_PER_CLASS));
        }

        match answer.trim().parse::<i64>() {
            Ok(0) => writeln!(output, "Error: Please enter a positive integer.")?,
            Ok(n) => return Ok(Some(n.unsigned_abs() as usize)),
            Err(_) => writeln!(output, "Error: Please enter a valid integer.")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn answer(script: &str) -> (Result<Option<usize>>, String) {
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut output = Vec::new();
        let result = ask_downsize(&mut input, &mut output);
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_declined() {
        assert_eq!(answer("n\n").0.unwrap(), None);
        assert_eq!(answer("No\n").0.unwrap(), None);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(answer("\n\n").0.unwrap(), Some(5000));
        assert_eq!(answer("Y\n\n").0.unwrap(), Some(5000));
    }

    #[test]
    fn test_padded_yes_is_not_yes() {
        assert_eq!(answer(" y \n").0.unwrap(), None);
        assert_eq!(answer("y\r\n\r\n").0.unwrap(), Some(5000));
    }

    #[test]
    fn test_padded_number_is_accepted() {
        assert_eq!(answer("y\n 42 \n").0.unwrap(), Some(42));
        let (result, output) = answer("y\n  \n7\n");
        assert_eq!(result.unwrap(), Some(7));
        assert!(output.contains("Please enter a valid integer"));
    }

    #[test]
    fn test_explicit_and_negative_values() {
        assert_eq!(answer("y\n1200\n").0.unwrap(), Some(1200));
        assert_eq!(answer("y\n-300\n").0.unwrap(), Some(300));
    }

    #[test]
    fn test_reprompts_on_bad_input() {
        let (result, output) = answer("y\nabc\n0\n42\n");
        assert_eq!(result.unwrap(), Some(42));
        assert!(output.contains("Please enter a valid integer"));
        assert!(output.contains("Please enter a positive integer"));
    }

    #[test]
    fn test_eof_aborts() {
        let (result, _) = answer("y\nabc\n");
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PrepError>(),
            Some(PrepError::PromptAborted)
        ));
    }
}
