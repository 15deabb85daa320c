//! # Island Core
//!
//! The decision core of the island life-sim. Given a snapshot of the world
//! from `island_rules`, it decides what every character is doing and which
//! narrative event, if any, fires next.
//!
//! ## Core Components
//!
//! - **condition**: Pure predicates over the world snapshot
//! - **schedule**: Base schedules, conditional overrides and resolution
//! - **events**: Event registry and the one-per-query trigger service
//! - **rival**: Day-driven courtship of rival pairs
//! - **persistence**: Save payload for triggered events, rivals and flags
//! - **content**: TOML content packs and the built-in catalogue
//! - **session**: The query/commit facade used by the game loop
//!
//! ## Design Philosophy
//!
//! - **Snapshot-Driven**: Every query takes the world explicitly; there is no global state
//! - **Explicit Commits**: Selection never mutates; marking and advancing are separate calls
//! - **Content Is Data**: Authoring mistakes degrade to safe defaults and are logged

pub mod condition;
pub mod content;
pub mod events;
pub mod persistence;
pub mod rival;
pub mod schedule;
pub mod session;

pub use condition::*;
pub use content::*;
pub use events::*;
pub use persistence::*;
pub use rival::*;
pub use schedule::*;
pub use session::*;
