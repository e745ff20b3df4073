//! Prompts and choice parsing for the interactive mode

use std::io::{self, BufRead, Write};
use xtrade_stock::domain::{DEFAULT_COUNT, MAX_COUNT, MIN_COUNT};
use xtrade_stock::{AnalysisMode, Market};

pub fn print_banner() {
    println!(
        r#"
╔══════════════════════════════════════════════════════════════╗
║                  xtrade stock suggestions                    ║
║                                                              ║
║  Pick a market, an analysis mode and how many stocks to see. ║
║  Results are shown as a table and saved as CSV.              ║
║  Press Ctrl-D at any prompt to quit.                         ║
╚══════════════════════════════════════════════════════════════╝
"#
    );
}

pub fn market_menu() -> String {
    let mut menu = String::from("Select a market:\n");
    for (index, market) in Market::ALL.iter().enumerate() {
        menu.push_str(&format!("  {}. {} ({})\n", index + 1, market.label(), market.exchange()));
    }
    menu
}

pub fn mode_menu() -> String {
    let mut menu = String::from("Select an analysis mode:\n");
    for (index, mode) in AnalysisMode::ALL.iter().enumerate() {
        menu.push_str(&format!("  {}. {}\n", index + 1, mode.describe()));
    }
    menu
}

/// Menu number or market name
pub fn parse_market(input: &str) -> Option<Market> {
    let input = input.trim();
    match input.parse::<usize>() {
        Ok(n) => Market::ALL.get(n.checked_sub(1)?).copied(),
        Err(_) => input.parse().ok(),
    }
}

/// Menu number or mode name
pub fn parse_mode(input: &str) -> Option<AnalysisMode> {
    let input = input.trim();
    match input.parse::<usize>() {
        Ok(n) => AnalysisMode::ALL.get(n.checked_sub(1)?).copied(),
        Err(_) => input.parse().ok(),
    }
}

/// Blank input takes the default; anything outside the allowed range is
/// rejected so the user can retype it.
pub fn parse_count(input: &str) -> Option<i64> {
    let input = input.trim();
    if input.is_empty() {
        return Some(DEFAULT_COUNT as i64);
    }
    let count: i64 = input.parse().ok()?;
    (MIN_COUNT as i64..=MAX_COUNT as i64)
        .contains(&count)
        .then_some(count)
}

/// Ask until `parse` accepts the answer. `None` on end of input.
pub fn prompt_until<T>(
    input: &mut impl BufRead,
    prompt: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> io::Result<Option<T>> {
    let mut stdout = io::stdout();
    loop {
        print!("{prompt}");
        stdout.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        match parse(&line) {
            Some(value) => return Ok(Some(value)),
            None => println!("Invalid choice '{}', please try again.", line.trim()),
        }
    }
}
