use comfy_table::{Attribute, Cell, Color, Row, Table};
use owo_colors::OwoColorize;
use weekboard_core::models::{Category, DayNote, DayTag, DayTagKind, Todo, Week, WeeksPage};
use weekboard_core::planner::WeekView;
use weekboard_core::stats::WeeklyStats;

const SHORT_ID_LEN: usize = 8;

fn short_id(id: &uuid::Uuid) -> String {
    id.simple().to_string()[..SHORT_ID_LEN].to_string()
}

fn tag_color(tag: DayTagKind) -> Color {
    match tag {
        DayTagKind::Weekend => Color::Blue,
        DayTagKind::Vacation => Color::Green,
        DayTagKind::Sick => Color::Red,
    }
}

fn todo_cell(todo: &Todo, prefix: &str) -> Cell {
    let cell = Cell::new(format!("{}{}", prefix, todo.content));
    if todo.completed {
        cell.add_attribute(Attribute::CrossedOut).fg(Color::DarkGrey)
    } else {
        cell
    }
}

pub fn display_categories(categories: &[Category]) {
    if categories.is_empty() {
        println!("No categories found. Run `weekboard category seed` to create the defaults.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Color", "Role", "Order", "Default"]);

    for category in categories {
        let mut row = Row::new();
        row.add_cell(Cell::new(short_id(&category.id)));
        row.add_cell(Cell::new(&category.name).add_attribute(Attribute::Bold));
        row.add_cell(Cell::new(&category.color));
        row.add_cell(Cell::new(category.role.to_string()));
        row.add_cell(Cell::new(category.order));
        row.add_cell(Cell::new(if category.is_default { "yes" } else { "" }));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_weeks(page: &WeeksPage, offset: i64) {
    if page.weeks.is_empty() {
        println!("No weeks found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Week", "Year", "Start", "End"]);

    for week in &page.weeks {
        table.add_row(week_row(week));
    }

    println!("{table}");
    let shown_to = offset + page.weeks.len() as i64;
    print!("Showing {} to {} of {}", offset + 1, shown_to, page.total);
    if page.has_more {
        print!(" (use --offset {} for more)", shown_to);
    }
    println!();
}

fn week_row(week: &Week) -> Row {
    let mut row = Row::new();
    row.add_cell(Cell::new(short_id(&week.id)));
    row.add_cell(Cell::new(week.week_number));
    row.add_cell(Cell::new(week.year));
    row.add_cell(Cell::new(week.start_date));
    row.add_cell(Cell::new(week.end_date));
    row
}

/// Renders a week as one table with a row per todo. Tagged days collapse
/// into a single row unless `expand` is set.
pub fn display_week_view(view: &WeekView, expand: bool) {
    let title = format!("{} | {}", view.category.name, view.label);
    println!("{}", title.bold());
    if view.read_only {
        println!("{}", "Read-only combined view".bright_black());
    }

    let mut table = Table::new();
    table.set_header(vec!["Day", "ID", "Todo", "Source"]);

    for day in &view.days {
        let mut day_cell = Cell::new(&day.bucket.date_formatted).add_attribute(Attribute::Bold);
        if let Some(tag) = &day.day_tag {
            day_cell = Cell::new(format!("{} ({})", day.bucket.date_formatted, tag.tag))
                .add_attribute(Attribute::Bold)
                .fg(tag_color(tag.tag));
        }

        if day.is_collapsed && !expand {
            let hidden = day.bucket.todos.len();
            let summary = match hidden {
                0 => String::new(),
                1 => "1 todo hidden".to_string(),
                n => format!("{} todos hidden", n),
            };
            table.add_row(vec![
                day_cell,
                Cell::new(""),
                Cell::new(summary).fg(Color::DarkGrey),
                Cell::new(""),
            ]);
            continue;
        }

        if day.bucket.todos.is_empty() {
            table.add_row(vec![day_cell, Cell::new(""), Cell::new(""), Cell::new("")]);
            continue;
        }

        let mut first = true;
        for entry in &day.bucket.todos {
            let day_label = if first { day_cell.clone() } else { Cell::new("") };
            first = false;

            let mut row = Row::new();
            row.add_cell(day_label);
            row.add_cell(Cell::new(short_id(&entry.node.todo.id)));
            row.add_cell(todo_cell(&entry.node.todo, ""));
            row.add_cell(Cell::new(&entry.category_name).fg(Color::DarkGrey));
            table.add_row(row);

            for subtask in &entry.node.subtasks {
                let mut row = Row::new();
                row.add_cell(Cell::new(""));
                row.add_cell(Cell::new(short_id(&subtask.id)));
                row.add_cell(todo_cell(subtask, "  └ "));
                row.add_cell(Cell::new(""));
                table.add_row(row);
            }
        }
    }

    println!("{table}");

    let notes: Vec<&DayNote> = view.days.iter().filter_map(|d| d.day_note.as_ref()).collect();
    if !notes.is_empty() {
        println!("\n{}", "Notes".bold());
        for note in notes {
            println!("  {} {}", note.date.to_string().yellow(), note.content);
        }
    }

    if !view.read_only {
        println!();
        display_stats(&view.stats);
    }

    if let Some(reflection) = &view.reflection {
        println!("\n{}", "Reflection".bold());
        println!("{}", reflection.content);
    }
}

pub fn display_stats(stats: &WeeklyStats) {
    let mut table = Table::new();
    let mut header = vec!["".to_string()];
    header.extend(stats.days.iter().map(|d| d.day.clone()));
    header.push("Week".to_string());
    table.set_header(header);

    let mut done = vec![Cell::new("Done")];
    done.extend(
        stats
            .days
            .iter()
            .map(|d| Cell::new(format!("{}/{}", d.completed, d.total))),
    );
    done.push(Cell::new(format!("{}/{}", stats.completed, stats.total)).add_attribute(Attribute::Bold));
    table.add_row(done);

    let mut rate = vec![Cell::new("Rate")];
    rate.extend(stats.days.iter().map(|d| rate_cell(d.completion_rate)));
    rate.push(rate_cell(stats.completion_rate).add_attribute(Attribute::Bold));
    table.add_row(rate);

    println!("{table}");
}

fn rate_cell(rate: u32) -> Cell {
    let cell = Cell::new(format!("{}%", rate));
    match rate {
        100 => cell.fg(Color::Green),
        0 => cell.fg(Color::DarkGrey),
        _ => cell.fg(Color::Yellow),
    }
}

pub fn display_tags(tags: &[DayTag]) {
    if tags.is_empty() {
        println!("No day tags found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Tag"]);
    for tag in tags {
        let mut row = Row::new();
        row.add_cell(Cell::new(short_id(&tag.id)));
        row.add_cell(Cell::new(tag.date));
        row.add_cell(Cell::new(tag.tag.to_string()).fg(tag_color(tag.tag)));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_notes(notes: &[DayNote]) {
    if notes.is_empty() {
        println!("No notes for this week.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", "Note"]);
    for note in notes {
        table.add_row(vec![Cell::new(note.date), Cell::new(&note.content)]);
    }

    println!("{table}");
}
