//! Terminal rendering for the prompter display.
//!
//! The prompter frame shows three lines: the previous chunk dimmed, the
//! current chunk bold, and the next chunk dimmed. Formatting is split from
//! printing so the frame layout is testable.

use crate::script::{Script, ScriptChunk};
use crate::session::{SessionController, SessionPhase};
use std::io::{self, Write};

const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Clear the current terminal line (replaces countdown etc.)
pub fn clear_line() {
    eprint!("\r\x1b[2K");
}

/// Three-line prompter frame: previous dimmed, current bold, next dimmed.
///
/// Missing neighbors render as blank lines so the current chunk stays in a
/// stable screen position.
pub fn format_frame(
    previous: Option<&ScriptChunk>,
    current: Option<&ScriptChunk>,
    next: Option<&ScriptChunk>,
    paused: bool,
) -> String {
    let mut frame = String::new();

    match previous {
        Some(chunk) => frame.push_str(&format!("  {DIM}{}{RESET}\n", chunk.text)),
        None => frame.push('\n'),
    }

    let marker = if paused {
        format!(" {YELLOW}[paused]{RESET}")
    } else {
        String::new()
    };
    match current {
        Some(chunk) => frame.push_str(&format!("> {BOLD}{}{RESET}{marker}\n", chunk.text)),
        None => frame.push_str(&format!(">{marker}\n")),
    }

    match next {
        Some(chunk) => frame.push_str(&format!("  {DIM}{}{RESET}\n", chunk.text)),
        None => frame.push('\n'),
    }

    frame
}

/// One countdown line, overwritten in place each second.
pub fn format_countdown(remaining: u8) -> String {
    format!("Starting in {remaining}...")
}

/// Render the controller's current display state to stderr.
pub fn render_session(controller: &SessionController) {
    match controller.phase() {
        SessionPhase::Setup => {}
        SessionPhase::Countdown(remaining) => {
            eprint!("\r\x1b[2K{}", format_countdown(remaining));
            io::stderr().flush().ok();
        }
        SessionPhase::Capturing => {
            clear_line();
            eprint!(
                "{}",
                format_frame(
                    controller.previous_chunk(),
                    controller.current_chunk(),
                    controller.next_chunk(),
                    controller.is_paused(),
                )
            );
            io::stderr().flush().ok();
        }
        SessionPhase::Completed => {
            clear_line();
            eprintln!("{GREEN}Session complete{RESET}");
        }
    }
}

/// Numbered chunk listing with duration estimates, for the chunk command.
pub fn format_script_listing(script: &Script) -> String {
    let mut listing = String::new();
    for (i, chunk) in script.iter().enumerate() {
        listing.push_str(&format!(
            "{:>3}. {} {DIM}({} ms){RESET}\n",
            i + 1,
            chunk.text,
            chunk.estimated_duration_ms
        ));
    }
    listing.push_str(&format!(
        "{DIM}{} chunks, ~{:.1}s total{RESET}\n",
        script.len(),
        script.total_duration_ms() as f64 / 1000.0
    ));
    listing
}
