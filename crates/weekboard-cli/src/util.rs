use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};
use uuid::Uuid;
use weekboard_core::error::CoreError;
use weekboard_core::models::{Category, Week};
use weekboard_core::planner::Planner;
use weekboard_core::repository::Repository;

use crate::cli::WeekSelector;
use crate::parser::parse_date;

const MIN_SHORT_ID_LEN: usize = 2;

fn check_short_id(short_id: &str) -> Result<()> {
    if short_id.len() < MIN_SHORT_ID_LEN {
        return Err(anyhow!(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }
    Ok(())
}

/// Lowercase hex form of an ID or ID prefix, for prefix comparisons.
fn normalize_id(id: &str) -> String {
    id.chars().filter(|c| *c != '-').collect::<String>().to_lowercase()
}

/// Resolves a category by exact name (case-insensitive) or ID prefix.
/// Without input, the first category in display order is used.
pub async fn resolve_category<R: Repository>(planner: &Planner<R>, input: Option<&str>) -> Result<Category> {
    let categories = planner.categories().await?;

    let Some(input) = input else {
        return categories.into_iter().next().ok_or_else(|| {
            anyhow!(CoreError::NotFound(
                "No categories yet. Create one with `weekboard category add` or `weekboard category seed`."
                    .to_string()
            ))
        });
    };

    if let Some(category) = categories.iter().find(|c| c.name.eq_ignore_ascii_case(input)) {
        return Ok(category.clone());
    }

    check_short_id(input)?;
    let prefix = normalize_id(input);
    let mut matches: Vec<Category> = categories
        .into_iter()
        .filter(|c| c.id.simple().to_string().starts_with(&prefix))
        .collect();

    match matches.len() {
        1 => Ok(matches.remove(0)),
        0 => Err(anyhow!(CoreError::NotFound(format!(
            "No category named or with ID prefix '{}'",
            input
        )))),
        _ => Err(anyhow!(CoreError::AmbiguousId(
            matches.into_iter().map(|c| (c.id.to_string(), c.name)).collect()
        ))),
    }
}

pub async fn resolve_todo_id(repo: &impl Repository, short_id: &str) -> Result<Uuid> {
    check_short_id(short_id)?;
    let todos = repo.find_todos_by_short_id_prefix(short_id).await?;
    if todos.len() == 1 {
        Ok(todos[0].id)
    } else if todos.is_empty() {
        Err(anyhow!(CoreError::NotFound(format!(
            "No todo found with ID prefix '{}'",
            short_id
        ))))
    } else {
        let todo_info: Vec<(String, String)> = todos
            .into_iter()
            .map(|t| (t.id.to_string(), t.content))
            .collect();
        Err(anyhow!(CoreError::AmbiguousId(todo_info)))
    }
}

/// Resolves a week of `category` from a date inside it or a week ID prefix.
/// Without input, the week containing today is used.
pub async fn resolve_week<R: Repository>(
    planner: &Planner<R>,
    category: &Category,
    input: Option<&str>,
) -> Result<Week> {
    let date = match input {
        None => Some(Local::now().date_naive()),
        Some(raw) => parse_date(raw).ok(),
    };

    if let Some(date) = date {
        return week_for_date(planner, category, date).await;
    }

    let short_id = input.unwrap_or_default();
    check_short_id(short_id)?;
    let weeks = planner.weeks(category.id, None).await?;
    let prefix = normalize_id(short_id);
    let mut matches: Vec<Week> = weeks
        .into_iter()
        .filter(|w| w.id.simple().to_string().starts_with(&prefix))
        .collect();

    match matches.len() {
        1 => Ok(matches.remove(0)),
        0 => Err(anyhow!(CoreError::NotFound(format!(
            "No week of '{}' matches '{}'",
            category.name, short_id
        )))),
        _ => Err(anyhow!(CoreError::AmbiguousId(
            matches
                .into_iter()
                .map(|w| (w.id.to_string(), format!("Week {} of {}", w.week_number, w.year)))
                .collect()
        ))),
    }
}

pub async fn week_for_date<R: Repository>(planner: &Planner<R>, category: &Category, date: NaiveDate) -> Result<Week> {
    planner
        .week_containing(category.id, date)
        .await?
        .ok_or_else(|| {
            anyhow!(CoreError::NotFound(format!(
                "'{}' has no week containing {}. Run `weekboard week generate -c \"{}\"` first.",
                category.name, date, category.name
            )))
        })
}

pub async fn resolve_selector<R: Repository>(planner: &Planner<R>, selector: &WeekSelector) -> Result<(Category, Week)> {
    let category = resolve_category(planner, selector.category.as_deref()).await?;
    let week = resolve_week(planner, &category, selector.week.as_deref()).await?;
    Ok((category, week))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("0190A3F2-5B", "0190a3f25b")]
    #[case("abc", "abc")]
    fn normalizes_id_prefixes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_id(input), expected);
    }

    #[test]
    fn short_ids_need_two_characters() {
        assert!(check_short_id("a").is_err());
        assert!(check_short_id("ab").is_ok());
    }

    proptest! {
        #[test]
        fn hyphenated_prefixes_match_the_simple_form(bytes in any::<[u8; 16]>(), len in 2usize..36) {
            let id = Uuid::from_bytes(bytes);
            let hyphenated = id.to_string();
            let prefix = &hyphenated[..len];
            prop_assert!(id.simple().to_string().starts_with(&normalize_id(prefix)));
        }
    }
}
