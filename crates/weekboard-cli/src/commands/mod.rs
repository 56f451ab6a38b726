pub mod category;
pub mod note;
pub mod reflect;
pub mod serve;
pub mod stats;
pub mod tag;
pub mod todo;
pub mod view;
pub mod week;

use dialoguer::Confirm;

/// Asks before destructive operations. Declines when no terminal is attached.
pub(crate) fn confirm(prompt: String) -> bool {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .unwrap_or(false)
}
