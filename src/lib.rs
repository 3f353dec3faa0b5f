pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod hierarchy;
pub mod render;
pub mod resolver;
pub mod session;
pub mod table;
pub mod tools;

pub use config::AppConfig;
pub use engine::{ChartOutcome, ChartRequest, GroupsOutcome, OrgChartEngine};
pub use error::Error;
pub use session::{InMemorySessionStore, SessionStore};
