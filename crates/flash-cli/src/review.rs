//! Interactive review session
//!
//! Shows the front, waits for Enter, shows the back, then reads a grade.
//! The deck is saved after every grade so an interrupted session loses
//! nothing.

use std::io::{BufRead, Write};

use chrono::{DateTime, Utc};
use colored::Colorize;
use flash_core::{DeckError, DeckStore, Grade, Pool};

/// Pools visited when none is requested
pub const DEFAULT_ORDER: [Pool; 3] = [Pool::Due, Pool::Failed, Pool::New];

/// Counters reported at the end of a session
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    /// Scheduled cards moved to due when the session opened
    pub promoted: usize,
    pub reviewed: usize,
    pub passed: usize,
    pub failed: usize,
}

enum Answer {
    Grade(Grade),
    Skip,
    Quit,
}

/// Review deck `name` pool by pool until the pools run dry, the user quits,
/// or input ends.
pub fn run_session<R: BufRead, W: Write>(
    store: &dyn DeckStore,
    name: &str,
    pools: &[Pool],
    input: &mut R,
    output: &mut W,
    clock: &dyn Fn() -> DateTime<Utc>,
) -> anyhow::Result<SessionStats> {
    let mut deck = store.load(name)?;
    let mut stats = SessionStats {
        promoted: deck.check_repetitions(clock()),
        ..Default::default()
    };
    if stats.promoted > 0 {
        store.save(name, &deck)?;
    }

    writeln!(output, "{}", format!("=== Reviewing {} ===", name).cyan().bold())?;
    if stats.promoted > 0 {
        writeln!(output, "{} cards became due", stats.promoted)?;
    }

    'pools: for &pool in pools {
        loop {
            let prompt = match deck.prompt(pool) {
                Ok(prompt) => prompt,
                Err(DeckError::EmptyPool(_)) => break,
                Err(e) => return Err(e.into()),
            };

            writeln!(output)?;
            writeln!(
                output,
                "{} {} {}",
                format!("[{}: {} left]", pool, prompt.remaining).dimmed(),
                "Q:".white().bold(),
                prompt.front
            )?;
            write!(output, "{}", "Press Enter to show the answer (q to quit) ".dimmed())?;
            output.flush()?;
            match read_line(input)? {
                Some(line) if !is_quit(&line) => {}
                _ => break 'pools,
            }
            writeln!(output, "{} {}", "A:".white().bold(), prompt.back)?;

            match ask_grade(input, output, pool)? {
                Answer::Quit => break 'pools,
                Answer::Skip => {
                    deck.skip_failed()?;
                    store.save(name, &deck)?;
                }
                Answer::Grade(grade) => {
                    let outcome = deck.review_next(pool, grade, clock())?;
                    store.save(name, &deck)?;
                    stats.reviewed += 1;

                    match outcome.due_at {
                        Some(due_at) => {
                            stats.passed += 1;
                            writeln!(
                                output,
                                "{} next review {}",
                                "OK".green(),
                                due_at.format("%Y-%m-%d %H:%M")
                            )?;
                        }
                        None => {
                            stats.failed += 1;
                            writeln!(output, "{} moved to the failed pool", "MISS".red())?;
                        }
                    }
                }
            }
        }
    }

    writeln!(output)?;
    writeln!(
        output,
        "{}",
        format!(
            "Session complete: {} reviewed, {} passed, {} failed",
            stats.reviewed, stats.passed, stats.failed
        )
        .green()
        .bold()
    )?;
    Ok(stats)
}

/// Keep asking until the input is a grade, a skip (failed pool only) or quit
fn ask_grade<R: BufRead, W: Write>(input: &mut R, output: &mut W, pool: Pool) -> anyhow::Result<Answer> {
    let hint = if pool == Pool::Failed {
        "Grade [0 bad, 1 medium, 2 good, s skip, q quit]: "
    } else {
        "Grade [0 bad, 1 medium, 2 good, q quit]: "
    };

    loop {
        write!(output, "{}", hint)?;
        output.flush()?;

        let Some(line) = read_line(input)? else {
            return Ok(Answer::Quit);
        };
        if is_quit(&line) {
            return Ok(Answer::Quit);
        }
        if pool == Pool::Failed && line.eq_ignore_ascii_case("s") {
            return Ok(Answer::Skip);
        }
        match line.parse::<Grade>() {
            Ok(grade) => return Ok(Answer::Grade(grade)),
            Err(e) => writeln!(output, "{} {}", "Invalid grade:".red(), e)?,
        }
    }
}

/// Next trimmed line, or `None` at end of input
fn read_line<R: BufRead>(input: &mut R) -> std::io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn is_quit(line: &str) -> bool {
    matches!(line.to_lowercase().as_str(), "q" | "quit")
}
