use std::io::{self, BufRead, Write};
use taskman_core::error::AppError;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime, UtcOffset};

const DATE_INPUT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const DATETIME_INPUT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Add,
    List,
    Complete,
    Delete,
    Search,
    Exit,
}

/// Print a prompt and read one line. `Ok(None)` means EOF.
pub fn read_line<R: BufRead>(reader: &mut R, prompt: &str) -> Result<Option<String>, AppError> {
    print!("{prompt}");
    io::stdout()
        .flush()
        .map_err(|err| AppError::io(err.to_string()))?;

    let mut input = String::new();
    let bytes = reader
        .read_line(&mut input)
        .map_err(|err| AppError::io(err.to_string()))?;

    if bytes == 0 {
        return Ok(None);
    }

    Ok(Some(input.trim().to_string()))
}

pub fn parse_menu_choice(line: &str) -> Result<MenuChoice, AppError> {
    match line.trim() {
        "1" => Ok(MenuChoice::Add),
        "2" => Ok(MenuChoice::List),
        "3" => Ok(MenuChoice::Complete),
        "4" => Ok(MenuChoice::Delete),
        "5" => Ok(MenuChoice::Search),
        "6" => Ok(MenuChoice::Exit),
        _ => Err(AppError::validation("select an option between 1 and 6")),
    }
}

pub fn parse_id(line: &str) -> Result<u32, AppError> {
    let id: u32 = line
        .trim()
        .parse()
        .map_err(|_| AppError::validation("id must be a positive number"))?;
    if id == 0 {
        return Err(AppError::validation("id must be a positive number"));
    }
    Ok(id)
}

/// Accepts `YYYY-MM-DD` (midnight) or `YYYY-MM-DD HH:MM`, interpreted in
/// the local offset and normalized to RFC3339 for the core. Blank input
/// means no due date. The repository re-validates whatever this returns.
pub fn parse_due_date_input(line: &str) -> Result<Option<String>, AppError> {
    let raw = line.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let local = if let Ok(datetime) = PrimitiveDateTime::parse(raw, DATETIME_INPUT) {
        datetime
    } else if let Ok(date) = Date::parse(raw, DATE_INPUT) {
        date.midnight()
    } else {
        return Err(AppError::validation(
            "due date must be YYYY-MM-DD or YYYY-MM-DD HH:MM",
        ));
    };

    let formatted = local
        .assume_offset(local_offset())
        .format(&Rfc3339)
        .map_err(|err| AppError::validation(err.to_string()))?;
    Ok(Some(formatted))
}

pub fn parse_confirmation(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}
