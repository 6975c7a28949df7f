//! Interactive numbered menu and interval prompt.

use std::{
    io::{self, BufRead, Write},
    time::Duration,
};

use crate::sender::{Selection, MAX_INTERVAL_SECS, MIN_INTERVAL_SECS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Send(Selection),
    Exit,
}

pub fn print_menu<W: Write>(out: &mut W, config_summary: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "DragonLink Test Data Broadcaster")?;
    writeln!(out, "{config_summary}")?;
    writeln!(out)?;
    writeln!(out, "1. Original Format")?;
    writeln!(out, "2. ESP32 Format")?;
    writeln!(out, "3. Status Messages")?;
    writeln!(out, "4. Broadcast All")?;
    writeln!(out, "5. Exit")?;
    Ok(())
}

pub fn parse_choice(input: &str) -> Option<MenuChoice> {
    let choice = match input.trim() {
        "1" => MenuChoice::Send(Selection::Original),
        "2" => MenuChoice::Send(Selection::Esp32),
        "3" => MenuChoice::Send(Selection::Status),
        "4" => MenuChoice::Send(Selection::All),
        "5" => MenuChoice::Exit,
        _ => return None,
    };
    Some(choice)
}

/// Parse an interval in seconds, rejecting anything outside the allowed range.
pub fn parse_interval(input: &str) -> Result<Duration, String> {
    let secs: f64 = input
        .trim()
        .parse()
        .map_err(|_| "Please enter a valid number".to_string())?;
    if !(MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(&secs) {
        return Err(format!(
            "Please enter a number between {MIN_INTERVAL_SECS} and {MAX_INTERVAL_SECS}"
        ));
    }
    Ok(Duration::from_secs_f64(secs))
}

/// Read one line. `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

/// Ask for a menu choice until a valid one is entered. `None` at end of input.
pub fn prompt_choice<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
) -> io::Result<Option<MenuChoice>> {
    loop {
        write!(out, "\nEnter your choice (1-5): ")?;
        out.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        match parse_choice(&line) {
            Some(choice) => return Ok(Some(choice)),
            None => writeln!(out, "Invalid choice, try again")?,
        }
    }
}

/// Ask for a send interval until a valid one is entered. `None` at end of input.
pub fn prompt_interval<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
) -> io::Result<Option<Duration>> {
    loop {
        write!(
            out,
            "\nEnter broadcast interval in seconds ({MIN_INTERVAL_SECS}-{MAX_INTERVAL_SECS}): "
        )?;
        out.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        match parse_interval(&line) {
            Ok(interval) => return Ok(Some(interval)),
            Err(msg) => writeln!(out, "{msg}")?,
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("1\n"), Some(MenuChoice::Send(Selection::Original)));
        assert_eq!(parse_choice(" 4 "), Some(MenuChoice::Send(Selection::All)));
        assert_eq!(parse_choice("5"), Some(MenuChoice::Exit));
        assert_eq!(parse_choice("6"), None);
        assert_eq!(parse_choice(""), None);
        assert_eq!(parse_choice("one"), None);
    }

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("0.1"), Ok(Duration::from_millis(100)));
        assert_eq!(parse_interval("60\n"), Ok(Duration::from_secs(60)));
        assert_eq!(parse_interval(" 2.5 "), Ok(Duration::from_millis(2500)));
        assert!(parse_interval("0.05").unwrap_err().contains("between"));
        assert!(parse_interval("61").unwrap_err().contains("between"));
        assert!(parse_interval("fast").unwrap_err().contains("valid number"));
        assert!(parse_interval("NaN").is_err());
    }

    #[test]
    fn test_prompt_interval_reprompts() {
        let mut input = Cursor::new("abc\n100\n0.5\n");
        let mut out = Vec::new();
        let interval = prompt_interval(&mut input, &mut out).unwrap();
        assert_eq!(interval, Some(Duration::from_millis(500)));
        let console = String::from_utf8(out).unwrap();
        assert!(console.contains("Please enter a valid number"));
        assert!(console.contains("Please enter a number between 0.1 and 60"));
        assert_eq!(console.matches("Enter broadcast interval").count(), 3);
    }

    #[test]
    fn test_prompt_choice_eof() {
        let mut input = Cursor::new("9\n");
        let mut out = Vec::new();
        assert_eq!(prompt_choice(&mut input, &mut out).unwrap(), None);
        assert!(String::from_utf8(out).unwrap().contains("Invalid choice"));
    }
}
