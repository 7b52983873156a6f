//! Picking one collage cell by its label.

use std::io::{BufRead, Write};

use anyhow::bail;

/// Ask for one of `labels` until a valid one is entered.
///
/// Matching ignores case and surrounding whitespace. Returns the index of
/// the chosen label; fails when `labels` is empty or input ends first.
pub fn read_choice<R, W>(reader: &mut R, writer: &mut W, labels: &[&str]) -> Result<usize, anyhow::Error>
where
    R: BufRead,
    W: Write,
{
    if labels.is_empty() {
        bail!("nothing to choose from");
    }
    let prompt = format!("Please choose one image to display ({}): ", describe(labels));

    loop {
        write!(writer, "{prompt}")?;
        writer.flush()?;

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            bail!("input closed before an image was chosen");
        }
        let answer = line.trim();
        if let Some(index) = labels.iter().position(|l| l.eq_ignore_ascii_case(answer)) {
            tracing::debug!(label = labels[index], "Image chosen");
            return Ok(index);
        }
        tracing::debug!(answer, "Ignoring invalid choice");
    }
}

/// `A`, `A or B`, `A, B or C`, ...
fn describe(labels: &[&str]) -> String {
    match labels.split_last() {
        Some((last, [])) => last.to_string(),
        Some((last, rest)) => format!("{} or {last}", rest.join(", ")),
        None => String::new(),
    }
}
