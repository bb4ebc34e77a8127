//! Parser for the legacy `.slide` presentation markup.
//!
//! ```text
//! Title of the talk
//! Optional subtitle
//! 15:04 2 Jan 2006
//! Tags: foo, bar
//!
//! Author Name
//! author@example.com
//!
//! * First section
//!
//! Some text,
//! continued here.
//!
//! - a bullet
//!
//! ** A subsection
//!
//!   indented code is skipped
//! .image gopher.png
//! ```

use chrono::NaiveDateTime;

use super::presentation::{SlideDeck, SlideSection};
use super::ParseError;

const METADATA_PREFIXES: [&str; 3] = ["Tags:", "Summary:", "OldURL:"];

pub fn parse(source: &str) -> Result<SlideDeck, ParseError> {
    let lines: Vec<(usize, &str)> = source
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim_end()))
        .filter(|(_, line)| !is_comment(line))
        .collect();

    let mut rest = lines.iter().skip_while(|(_, line)| line.is_empty()).peekable();

    let title = match rest.next() {
        Some((_, line)) => line.trim().to_string(),
        None => return Err(ParseError::MissingTitle),
    };

    let mut deck = SlideDeck {
        title: Some(title),
        ..SlideDeck::default()
    };

    // Header: subtitle and metadata up to the first blank line.
    while let Some((_, line)) = rest.next_if(|(_, line)| !line.is_empty()) {
        if deck.subtitle.is_none() && !is_metadata(line) {
            deck.subtitle = Some(line.trim().to_string());
        }
    }

    // Author blocks run until the first section header.
    let mut current: Option<(String, Vec<String>)> = None;
    let mut paragraph: Vec<&str> = Vec::new();

    for (number, line) in rest {
        if let Some(header) = section_title(line) {
            let header = header.trim();
            if header.is_empty() {
                return Err(ParseError::EmptySectionTitle { line: *number });
            }
            flush_paragraph(&mut current, &mut paragraph);
            if let Some(section) = current.take() {
                deck.sections.push(finish_section(section));
            }
            current = Some((header.to_string(), Vec::new()));
            continue;
        }

        if current.is_none() {
            continue;
        }

        if let Some(subheader) = subsection_title(line) {
            flush_paragraph(&mut current, &mut paragraph);
            let subheader = subheader.trim();
            if !subheader.is_empty() {
                paragraph.push(subheader);
                flush_paragraph(&mut current, &mut paragraph);
            }
        } else if line.is_empty() {
            flush_paragraph(&mut current, &mut paragraph);
        } else if line.starts_with(char::is_whitespace) || line.starts_with('.') {
            // Code blocks and directives have no slide text.
            flush_paragraph(&mut current, &mut paragraph);
        } else {
            paragraph.push(line);
        }
    }

    flush_paragraph(&mut current, &mut paragraph);
    if let Some(section) = current {
        deck.sections.push(finish_section(section));
    }

    Ok(deck)
}

fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with("//")
}

fn is_metadata(line: &str) -> bool {
    let line = line.trim();
    METADATA_PREFIXES.iter().any(|prefix| line.starts_with(prefix)) || is_timestamp(line)
}

fn is_timestamp(line: &str) -> bool {
    ["%H:%M %d %b %Y", "%H:%M %e %b %Y"]
        .iter()
        .any(|format| NaiveDateTime::parse_from_str(line, format).is_ok())
}

/// `* Title` opens a section; `*` alone is a header with an empty title.
fn section_title(line: &str) -> Option<&str> {
    if line == "*" {
        return Some("");
    }
    line.strip_prefix("* ")
}

fn subsection_title(line: &str) -> Option<&str> {
    if !line.starts_with("**") {
        return None;
    }
    Some(line.trim_start_matches('*'))
}

fn flush_paragraph(current: &mut Option<(String, Vec<String>)>, paragraph: &mut Vec<&str>) {
    if paragraph.is_empty() {
        return;
    }
    if let Some((_, body)) = current.as_mut() {
        body.push(paragraph.join("\n"));
    }
    paragraph.clear();
}

fn finish_section((title, body): (String, Vec<String>)) -> SlideSection {
    SlideSection {
        title,
        body: (!body.is_empty()).then(|| body.join("\n")),
    }
}
