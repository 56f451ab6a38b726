//! # Weekboard Core Library
//!
//! Storage and view assembly for a weekly todo planner. Todos live in ISO
//! weeks that belong to categories; a combined category shows the work and
//! personal categories side by side without owning any data.
//!
//! ## Features
//!
//! - **ISO Week Generation**: Idempotent batches of Monday to Sunday weeks,
//!   numbered by ISO week-year
//! - **Day Metadata**: Per-day tags (Weekend, Vacation, Sick) and notes laid
//!   over the day buckets, with weekend auto-tagging for work categories
//! - **Combined Views**: Work and personal weeks aligned by week number and
//!   their todos interleaved into a read-only list
//! - **View Cache**: Query-keyed cache with optimistic completion toggles
//!
//! ## Core Modules
//!
//! - [`db`]: Database connection and migration management
//! - [`models`]: Core data structures and transfer objects
//! - [`repository`]: Data access layer with Repository pattern
//! - [`weeks`]: ISO week generation
//! - [`overlay`]: Day tag and note overlay, weekend policy
//! - [`combined`]: Combined category merging
//! - [`planner`]: Cached service assembling week views
//! - [`error`]: Error types shared by every layer
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use weekboard_core::{
//!     db, models::NewCategoryData,
//!     planner::{Planner, PlannerConfig},
//!     repository::SqliteRepository,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), weekboard_core::error::CoreError> {
//!     let pool = db::establish_connection("weekboard.db").await?;
//!     let planner = Planner::new(SqliteRepository::new(pool), PlannerConfig::default());
//!
//!     // Creating a category generates its first 52 weeks
//!     let category = planner
//!         .create_category(NewCategoryData {
//!             name: "Work Daily".to_string(),
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!     let weeks = planner.weeks(category.id, None).await?;
//!     let view = planner.week_view(category.id, weeks[0].id).await?;
//!     println!("{}: {} todos", view.label, view.stats.total);
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod combined;
pub mod dates;
pub mod db;
pub mod error;
pub mod models;
pub mod overlay;
pub mod planner;
pub mod repository;
pub mod stats;
pub mod weeks;
