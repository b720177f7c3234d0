//! Terminal rendering of conversation turns.

use chat_core::{Role, Turn};
use colored::Colorize;

/// Plain-text lines for one turn: a speaker line, the content, and the
/// provenance line when the turn has metadata.
pub fn format_turn(turn: &Turn) -> Vec<String> {
    let speaker = match turn.role {
        Role::User => "You:",
        Role::Assistant => "Assistant:",
    };
    let mut lines = vec![speaker.to_string()];
    lines.extend(turn.content.lines().map(|l| format!("  {l}")));
    if let Some(label) = turn.provenance_label() {
        lines.push(format!("  ({label})"));
    }
    lines
}

pub fn print_turn(turn: &Turn) {
    let lines = format_turn(turn);
    let Some((speaker, rest)) = lines.split_first() else {
        return;
    };

    match turn.role {
        Role::User => println!("{}", speaker.cyan().bold()),
        Role::Assistant => println!("{}", speaker.green().bold()),
    }

    let body_len = turn.content.lines().count();
    for (i, line) in rest.iter().enumerate() {
        if i < body_len {
            match (turn.role, turn.metadata.is_some()) {
                (Role::Assistant, false) => println!("{}", line.red()),
                _ => println!("{line}"),
            }
        } else {
            println!("{}", line.dimmed());
        }
    }
}
