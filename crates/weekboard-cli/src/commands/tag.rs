use anyhow::Result;
use weekboard_core::planner::Planner;
use weekboard_core::repository::Repository;

use crate::cli::{DayCommand, ListTagsCommand, SetTagCommand, TagCommand, TagSubcommand};
use crate::parser::parse_date;
use crate::util::resolve_category;
use crate::views::table::display_tags;

pub async fn tag_command<R: Repository>(planner: &Planner<R>, command: TagCommand) -> Result<()> {
    match command.command {
        TagSubcommand::Set(cmd) => set_tag(planner, cmd).await,
        TagSubcommand::Clear(cmd) => clear_tag(planner, cmd).await,
        TagSubcommand::List(cmd) => list_tags(planner, cmd).await,
    }
}

async fn set_tag<R: Repository>(planner: &Planner<R>, command: SetTagCommand) -> Result<()> {
    let category = resolve_category(planner, command.category.as_deref()).await?;
    let date = parse_date(&command.date)?;
    let tag = planner.set_day_tag(category.id, date, command.tag).await?;
    println!("Tagged {} as {} in '{}'", tag.date, tag.tag, category.name);
    Ok(())
}

async fn clear_tag<R: Repository>(planner: &Planner<R>, command: DayCommand) -> Result<()> {
    let category = resolve_category(planner, command.category.as_deref()).await?;
    let date = parse_date(&command.date)?;
    if planner.clear_day_tag(category.id, date).await? {
        println!("Removed the tag on {} in '{}'", date, category.name);
    } else {
        println!("{} has no tag in '{}'", date, category.name);
    }
    Ok(())
}

async fn list_tags<R: Repository>(planner: &Planner<R>, command: ListTagsCommand) -> Result<()> {
    let category = resolve_category(planner, command.category.as_deref()).await?;
    let start = command.from.as_deref().map(parse_date).transpose()?;
    let end = command.to.as_deref().map(parse_date).transpose()?;
    display_tags(&planner.day_tags(category.id, start, end).await?);
    Ok(())
}
