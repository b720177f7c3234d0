//! Line input for the interactive chat.
//!
//! Enter sends. A line ending in `\` continues the draft on the next line,
//! the terminal stand-in for Shift+Enter.

use std::io::{self, BufRead};

pub enum InputLine {
    /// A complete draft, newlines preserved.
    Draft(String),
    /// `exit` or `quit`.
    Exit,
    /// End of input.
    Eof,
}

pub fn read_draft<R: BufRead>(reader: &mut R, mut on_continue: impl FnMut()) -> io::Result<InputLine> {
    let mut draft = String::new();

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(if draft.is_empty() {
                InputLine::Eof
            } else {
                InputLine::Draft(draft)
            });
        }

        let line = line.trim_end_matches(['\n', '\r']);
        if let Some(continued) = line.strip_suffix('\\') {
            draft.push_str(continued);
            draft.push('\n');
            on_continue();
            continue;
        }

        draft.push_str(line);
        break;
    }

    let command = draft.trim();
    if command.eq_ignore_ascii_case("exit") || command.eq_ignore_ascii_case("quit") {
        return Ok(InputLine::Exit);
    }
    Ok(InputLine::Draft(draft))
}
