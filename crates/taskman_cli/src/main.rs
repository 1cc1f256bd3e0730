mod display;
mod prompt;

use std::io::{self, BufRead};
use taskman_core::config::{self, Palette};
use taskman_core::error::AppError;
use taskman_core::repository::TaskRepository;
use taskman_core::storage::JsonFileStore;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn init_tracing() {
    // Tracing is opt-in via RUST_LOG; an invalid filter must not break startup.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn run_loop<R: BufRead>(
    repository: &TaskRepository,
    palette: &Palette,
    input: &mut R,
) -> Result<(), AppError> {
    loop {
        display::show_menu(palette);

        let line = match prompt::read_line(input, "Select an option: ")? {
            Some(line) => line,
            None => break,
        };
        if line.is_empty() {
            continue;
        }

        let choice = match prompt::parse_menu_choice(&line) {
            Ok(choice) => choice,
            Err(err) => {
                display::show_error(palette, &err);
                continue;
            }
        };

        let outcome = match choice {
            prompt::MenuChoice::Add => handle_add(repository, palette, input),
            prompt::MenuChoice::List => handle_list(repository, palette),
            prompt::MenuChoice::Complete => handle_complete(repository, palette, input),
            prompt::MenuChoice::Delete => handle_delete(repository, palette, input),
            prompt::MenuChoice::Search => handle_search(repository, palette, input),
            prompt::MenuChoice::Exit => break,
        };

        // Every failure returns to the menu; nothing here ever resets or
        // rewrites the store on the user's behalf.
        if let Err(err) = outcome {
            display::show_error(palette, &err);
        }
    }

    Ok(())
}

fn handle_add<R: BufRead>(
    repository: &TaskRepository,
    palette: &Palette,
    input: &mut R,
) -> Result<(), AppError> {
    let Some(description) = prompt::read_line(input, "Description: ")? else {
        return Ok(());
    };
    let Some(due_raw) =
        prompt::read_line(input, "Due date (YYYY-MM-DD or YYYY-MM-DD HH:MM, blank for none): ")?
    else {
        return Ok(());
    };
    let due_date = prompt::parse_due_date_input(&due_raw)?;

    let task = repository.add(&description, due_date.as_deref())?;
    display::show_success(
        palette,
        &format!("Added task {}: {}", task.id, task.description),
    );
    Ok(())
}

fn handle_list(repository: &TaskRepository, palette: &Palette) -> Result<(), AppError> {
    let tasks = repository.get_all()?;
    display::show_tasks(&tasks, palette)
}

fn handle_complete<R: BufRead>(
    repository: &TaskRepository,
    palette: &Palette,
    input: &mut R,
) -> Result<(), AppError> {
    let Some(raw_id) = prompt::read_line(input, "Task id to complete: ")? else {
        return Ok(());
    };
    let id = prompt::parse_id(&raw_id)?;

    let task = repository.complete(id)?;
    display::show_success(
        palette,
        &format!("Completed task {}: {}", task.id, task.description),
    );
    Ok(())
}

fn handle_delete<R: BufRead>(
    repository: &TaskRepository,
    palette: &Palette,
    input: &mut R,
) -> Result<(), AppError> {
    let Some(raw_id) = prompt::read_line(input, "Task id to delete: ")? else {
        return Ok(());
    };
    let id = prompt::parse_id(&raw_id)?;

    let Some(answer) = prompt::read_line(input, &format!("Delete task {id}? [y/N]: "))? else {
        return Ok(());
    };
    if !prompt::parse_confirmation(&answer) {
        println!("{}", palette.mutedize("Cancelled."));
        return Ok(());
    }

    let task = repository.delete(id)?;
    display::show_success(
        palette,
        &format!("Deleted task {}: {}", task.id, task.description),
    );
    Ok(())
}

fn handle_search<R: BufRead>(
    repository: &TaskRepository,
    palette: &Palette,
    input: &mut R,
) -> Result<(), AppError> {
    let Some(query) = prompt::read_line(input, "Search for: ")? else {
        return Ok(());
    };

    let found = repository.search(&query)?;
    display::show_tasks(&found, palette)
}

fn main() {
    init_tracing();

    let config_load = config::load_config_with_fallback();
    let palette = config::palette_for_theme(config_load.config.theme.as_deref());
    if let Some(err) = config_load.error {
        display::show_error(&palette, &err);
    }

    let store = match JsonFileStore::from_env() {
        Ok(store) => store,
        Err(err) => {
            display::show_error(&palette, &err);
            std::process::exit(1);
        }
    };
    let repository = TaskRepository::new(Box::new(store));

    let stdin = io::stdin();
    let mut input = stdin.lock();
    if let Err(err) = run_loop(&repository, &palette, &mut input) {
        display::show_error(&palette, &err);
        std::process::exit(1);
    }

    println!("Goodbye.");
}
