pub mod config;
pub mod db;
pub mod engine;
pub mod observability;

pub use config::Config;
pub use engine::{Engine, MealPlanProvider};
