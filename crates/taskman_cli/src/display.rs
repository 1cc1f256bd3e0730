use tabled::settings::Style;
use tabled::{Table, Tabled};
use taskman_core::config::Palette;
use taskman_core::error::AppError;
use taskman_core::model::{Task, TaskStatus};
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::UtcOffset;

const DISPLAY_STAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Due")]
    due: String,
}

pub fn show_menu(palette: &Palette) {
    println!();
    println!("{}", palette.accentize("=== Task Manager ==="));
    println!("1. Add task");
    println!("2. List tasks");
    println!("3. Complete task");
    println!("4. Delete task");
    println!("5. Search tasks");
    println!("6. Exit");
}

pub fn show_tasks(tasks: &[Task], palette: &Palette) -> Result<(), AppError> {
    if tasks.is_empty() {
        println!("{}", palette.mutedize("No tasks found."));
        return Ok(());
    }

    let now = OffsetDateTime::now_utc();
    let mut rows = Vec::with_capacity(tasks.len());
    let mut pending = 0usize;
    let mut overdue = 0usize;
    let mut completed = 0usize;

    for task in tasks {
        let status = task.status_at(now)?;
        match status {
            TaskStatus::Pending => pending += 1,
            TaskStatus::Overdue => overdue += 1,
            TaskStatus::Completed => completed += 1,
        }
        rows.push(TaskRow {
            id: task.id,
            description: task.description.clone(),
            status: status.label(),
            created: humanize(&task.created_date),
            due: task.due_date.as_deref().map(humanize).unwrap_or_else(|| "-".to_string()),
        });
    }

    println!("{}", Table::new(rows).with(Style::psql()));
    println!(
        "{}",
        palette.mutedize(&format!(
            "{} total, {} pending, {} overdue, {} completed",
            tasks.len(),
            pending,
            overdue,
            completed
        ))
    );

    Ok(())
}

pub fn show_success(palette: &Palette, message: &str) {
    println!("{}", palette.successize(message));
}

pub fn show_error(palette: &Palette, err: &AppError) {
    eprintln!("{}", palette.errorize(&format!("ERROR: {err}")));
    if !err.is_correctable() {
        eprintln!("{}", palette.mutedize("The task file was left as it is."));
    }
}

// Display-layer leniency: a timestamp that fails to parse is shown raw
// rather than turned into an error here.
fn humanize(timestamp: &str) -> String {
    OffsetDateTime::parse(timestamp, &Rfc3339)
        .ok()
        .and_then(|parsed| {
            parsed
                .to_offset(UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC))
                .format(&DISPLAY_STAMP)
                .ok()
        })
        .unwrap_or_else(|| timestamp.to_string())
}
