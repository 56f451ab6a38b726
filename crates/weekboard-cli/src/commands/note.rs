use anyhow::Result;
use weekboard_core::planner::Planner;
use weekboard_core::repository::Repository;

use crate::cli::{DayCommand, NoteCommand, NoteSubcommand, SetNoteCommand, WeekSelector};
use crate::parser::parse_date;
use crate::util::{resolve_category, resolve_selector};
use crate::views::table::display_notes;

pub async fn note_command<R: Repository>(planner: &Planner<R>, command: NoteCommand) -> Result<()> {
    match command.command {
        NoteSubcommand::Set(cmd) => set_note(planner, cmd).await,
        NoteSubcommand::Clear(cmd) => clear_note(planner, cmd).await,
        NoteSubcommand::List(selector) => list_notes(planner, selector).await,
    }
}

async fn set_note<R: Repository>(planner: &Planner<R>, command: SetNoteCommand) -> Result<()> {
    let category = resolve_category(planner, command.category.as_deref()).await?;
    let date = parse_date(&command.date)?;
    let note = planner.set_day_note(category.id, date, command.content).await?;
    println!("Saved note for {} in '{}'", note.date, category.name);
    Ok(())
}

async fn clear_note<R: Repository>(planner: &Planner<R>, command: DayCommand) -> Result<()> {
    let category = resolve_category(planner, command.category.as_deref()).await?;
    let date = parse_date(&command.date)?;
    planner.delete_day_note(category.id, date).await?;
    println!("Deleted the note on {} in '{}'", date, category.name);
    Ok(())
}

async fn list_notes<R: Repository>(planner: &Planner<R>, selector: WeekSelector) -> Result<()> {
    let (category, week) = resolve_selector(planner, &selector).await?;
    let notes = planner.day_notes(category.id, week.start_date, week.end_date).await?;
    display_notes(&notes);
    Ok(())
}
