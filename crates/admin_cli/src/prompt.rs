//! Hidden password entry on the controlling terminal.

use std::io::{self, Stderr, Write};

use crossterm::{
    QueueableCommand, cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    style::Print,
    terminal::{self, ClearType},
};

/// Same minimum the engine enforces.
pub const MIN_PASSWORD_CHARS: usize = 8;

const ATTEMPTS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
    #[error("password entry cancelled")]
    Cancelled,
    #[error("no usable password after {ATTEMPTS} attempts")]
    Exhausted,
}

/// Raw mode for as long as the value lives.
struct RawMode;

impl RawMode {
    fn on() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn print_line(out: &mut Stderr, text: &str) -> io::Result<()> {
    out.queue(cursor::MoveToColumn(0))?
        .queue(terminal::Clear(ClearType::CurrentLine))?
        .queue(Print(text))?;
    out.flush()
}

/// Reads one line without echoing it. Esc or Ctrl-C cancels.
fn read_hidden(label: &str) -> Result<String, PromptError> {
    let _raw = RawMode::on()?;
    let mut out = io::stderr();
    print_line(&mut out, label)?;

    let mut secret = String::new();
    let outcome = loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        else {
            continue;
        };
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        match code {
            KeyCode::Enter => break Ok(secret),
            KeyCode::Esc => break Err(PromptError::Cancelled),
            KeyCode::Char('c') if ctrl => break Err(PromptError::Cancelled),
            KeyCode::Backspace => {
                secret.pop();
            }
            KeyCode::Char(ch) if !ctrl => secret.push(ch),
            _ => {}
        }
    };
    out.queue(Print("\r\n"))?.flush()?;
    outcome
}

/// Asks for a new password and its confirmation until both agree and the
/// password is long enough.
pub fn new_password() -> Result<String, PromptError> {
    let mut out = io::stderr();
    for _ in 0..ATTEMPTS {
        let first = read_hidden("New password: ")?;
        if first.chars().count() < MIN_PASSWORD_CHARS {
            print_line(
                &mut out,
                &format!("At least {MIN_PASSWORD_CHARS} characters, please.\r\n"),
            )?;
            continue;
        }
        if read_hidden("Repeat password: ")? == first {
            return Ok(first);
        }
        print_line(&mut out, "The two entries differ.\r\n")?;
    }
    Err(PromptError::Exhausted)
}
