//! Deterministic generation pipeline and analytics engine for synthetic
//! SDLC activity (spec.md §2, §4).
//!
//! [`generator::generate`] is the sole entry point that turns a
//! [`sdlc_synth_config::SeedConfig`] into a fully populated, immutable
//! [`store::Store`]. Everything else in this crate either feeds that
//! pipeline (rng, developer, timeline, session, commit, pr, review,
//! quality, survival) or reads from the resulting store (analytics,
//! analyze, research).

pub mod analytics;
pub mod analyze;
pub mod commit;
pub mod developer;
pub mod generator;
pub mod pr;
pub mod quality;
pub mod research;
pub mod review;
pub mod rng;
pub mod session;
pub mod store;
pub mod survival;
pub mod timeline;

pub use generator::generate;
pub use store::Store;
