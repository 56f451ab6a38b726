use clap::{Parser, Subcommand};
use weekboard_core::models::{CategoryRole, DayTagKind};

/// Weekboard: a weekly todo planner organised by ISO weeks and categories
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the SQLite database (overrides the configuration)
    #[arg(long, global = true)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Manage categories
    Category(CategoryCommand),
    /// Generate and list weeks
    Week(WeekCommand),
    /// Show a week with its todos, day tags, notes and stats
    View(ViewCommand),
    /// Manage todos
    Todo(TodoCommand),
    /// Tag days as Weekend, Vacation or Sick
    Tag(TagCommand),
    /// Write notes on days
    Note(NoteCommand),
    /// Show or write a week's reflection
    Reflect(ReflectCommand),
    /// Show completion statistics for a week
    Stats(WeekSelector),
    /// Serve the JSON API
    Serve(ServeCommand),
}

/// Which category and week a command applies to.
#[derive(Parser, Debug, Clone, Default)]
pub struct WeekSelector {
    /// Category name or ID prefix (defaults to the first category)
    #[arg(short, long)]
    pub category: Option<String>,
    /// Week ID prefix or any date inside the week (defaults to today)
    #[arg(short, long)]
    pub week: Option<String>,
}

// ============================================================================
// Categories
// ============================================================================

#[derive(Parser, Debug, Clone)]
pub struct CategoryCommand {
    #[command(subcommand)]
    pub command: CategorySubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CategorySubcommand {
    /// Add a new category and generate its first weeks
    Add(AddCategoryCommand),
    /// List categories
    List,
    /// Edit a category
    Edit(EditCategoryCommand),
    /// Delete a category with all its weeks and todos
    Delete(DeleteCategoryCommand),
    /// Create the default Work Daily and Personal Daily categories
    Seed,
}

#[derive(Parser, Debug, Clone)]
pub struct AddCategoryCommand {
    /// The name of the category
    pub name: String,
    /// Hex color, e.g. "#3B82F6"
    #[arg(long)]
    pub color: Option<String>,
    /// standard, work, personal or combined (inferred from the name when omitted)
    #[arg(long)]
    pub role: Option<CategoryRole>,
}

#[derive(Parser, Debug, Clone)]
pub struct EditCategoryCommand {
    /// Category name or ID prefix
    pub category: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub color: Option<String>,
    #[arg(long)]
    pub order: Option<i64>,
    #[arg(long)]
    pub role: Option<CategoryRole>,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCategoryCommand {
    /// Category name or ID prefix
    pub category: String,
    /// Force deletion without confirmation
    #[arg(short, long)]
    pub force: bool,
}

// ============================================================================
// Weeks
// ============================================================================

#[derive(Parser, Debug, Clone)]
pub struct WeekCommand {
    #[command(subcommand)]
    pub command: WeekSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum WeekSubcommand {
    /// Generate more weeks after the latest one
    Generate(GenerateWeeksCommand),
    /// List weeks of a category
    List(ListWeeksCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct GenerateWeeksCommand {
    /// Category name or ID prefix (defaults to the first category)
    #[arg(short, long)]
    pub category: Option<String>,
    /// Number of weeks to generate (defaults to the configured batch size)
    #[arg(short = 'n', long)]
    pub count: Option<i64>,
}

#[derive(Parser, Debug, Clone)]
pub struct ListWeeksCommand {
    /// Category name or ID prefix (defaults to the first category)
    #[arg(short, long)]
    pub category: Option<String>,
    /// ISO week-year (defaults to the current year)
    #[arg(long)]
    pub year: Option<i32>,
    /// List weeks of every year
    #[arg(long, conflicts_with = "year")]
    pub all: bool,
    #[arg(long, default_value_t = 12)]
    pub limit: i64,
    #[arg(long, default_value_t = 0)]
    pub offset: i64,
}

// ============================================================================
// Views
// ============================================================================

#[derive(Parser, Debug, Clone)]
pub struct ViewCommand {
    #[command(flatten)]
    pub selector: WeekSelector,
    /// Show todos of tagged days instead of collapsing them
    #[arg(long)]
    pub expand: bool,
    /// Print the view as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// Todos
// ============================================================================

#[derive(Parser, Debug, Clone)]
pub struct TodoCommand {
    #[command(subcommand)]
    pub command: TodoSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TodoSubcommand {
    /// Add a todo
    Add(AddTodoCommand),
    /// Mark a todo as completed
    Do(TodoIdCommand),
    /// Mark a todo as not completed
    Undo(TodoIdCommand),
    /// Edit a todo's content
    Edit(EditTodoCommand),
    /// Delete a todo and its subtasks
    Delete(DeleteTodoCommand),
    /// Move a todo to another position within its day
    Move(MoveTodoCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddTodoCommand {
    /// What to do
    pub content: String,
    /// Category name or ID prefix (defaults to the first category)
    #[arg(short, long)]
    pub category: Option<String>,
    /// Due date, e.g. "2025-02-04", "tomorrow", "friday" (defaults to today)
    #[arg(short, long)]
    pub date: Option<String>,
    /// ID of the parent todo, making this a subtask
    #[arg(long)]
    pub parent: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct TodoIdCommand {
    /// The ID of the todo
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct EditTodoCommand {
    /// The ID of the todo to edit
    pub id: String,
    /// New content
    pub content: String,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteTodoCommand {
    /// The ID of the todo to delete
    pub id: String,
    /// Force deletion without confirmation
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct MoveTodoCommand {
    /// The ID of the todo to move
    pub id: String,
    /// New position among its siblings, starting at 1
    pub position: usize,
}

// ============================================================================
// Day tags and notes
// ============================================================================

#[derive(Parser, Debug, Clone)]
pub struct TagCommand {
    #[command(subcommand)]
    pub command: TagSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TagSubcommand {
    /// Tag a day, replacing any existing tag
    Set(SetTagCommand),
    /// Remove the tag from a day
    Clear(DayCommand),
    /// List tags of a category
    List(ListTagsCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct SetTagCommand {
    /// The day to tag
    pub date: String,
    /// Weekend, Vacation or Sick
    pub tag: DayTagKind,
    /// Category name or ID prefix (defaults to the first category)
    #[arg(short, long)]
    pub category: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct DayCommand {
    /// The day
    pub date: String,
    /// Category name or ID prefix (defaults to the first category)
    #[arg(short, long)]
    pub category: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ListTagsCommand {
    /// Category name or ID prefix (defaults to the first category)
    #[arg(short, long)]
    pub category: Option<String>,
    /// First day, inclusive
    #[arg(long)]
    pub from: Option<String>,
    /// Last day, inclusive
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct NoteCommand {
    #[command(subcommand)]
    pub command: NoteSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum NoteSubcommand {
    /// Write the note of a day, replacing any existing one
    Set(SetNoteCommand),
    /// Delete the note of a day
    Clear(DayCommand),
    /// List notes of a week
    List(WeekSelector),
}

#[derive(Parser, Debug, Clone)]
pub struct SetNoteCommand {
    /// The day
    pub date: String,
    /// Note text
    pub content: String,
    /// Category name or ID prefix (defaults to the first category)
    #[arg(short, long)]
    pub category: Option<String>,
}

// ============================================================================
// Reflections and server
// ============================================================================

#[derive(Parser, Debug, Clone)]
pub struct ReflectCommand {
    #[command(subcommand)]
    pub command: ReflectSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ReflectSubcommand {
    /// Show the reflection of a week
    Show(WeekSelector),
    /// Write the reflection of a week
    Set(SetReflectionCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct SetReflectionCommand {
    /// Reflection text
    pub content: String,
    #[command(flatten)]
    pub selector: WeekSelector,
}

#[derive(Parser, Debug, Clone)]
pub struct ServeCommand {
    /// Address to listen on (overrides the configuration)
    #[arg(long)]
    pub bind: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_view_selector() {
        let cli = Cli::try_parse_from(["weekboard", "view", "-c", "Work", "-w", "2025-02-04"]).unwrap();
        match cli.command {
            Commands::View(view) => {
                assert_eq!(view.selector.category.as_deref(), Some("Work"));
                assert_eq!(view.selector.week.as_deref(), Some("2025-02-04"));
                assert!(!view.expand);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_day_tag_case_insensitively() {
        let cli = Cli::try_parse_from(["weekboard", "tag", "set", "2025-02-07", "vacation"]).unwrap();
        match cli.command {
            Commands::Tag(TagCommand {
                command: TagSubcommand::Set(set),
            }) => assert_eq!(set.tag, DayTagKind::Vacation),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_day_tag() {
        assert!(Cli::try_parse_from(["weekboard", "tag", "set", "2025-02-07", "holiday"]).is_err());
    }

    #[test]
    fn global_db_flag_is_accepted_after_subcommand() {
        let cli = Cli::try_parse_from(["weekboard", "category", "list", "--db", "/tmp/x.db"]).unwrap();
        assert_eq!(cli.db.as_deref(), Some("/tmp/x.db"));
    }
}
