#![deny(warnings)]

//! Strategy advice for the castle runway planner.
//!
//! - [`StrategyAdvisor`] asks a chat model for three strategy presets and
//!   always answers with exactly three validated recommendations, falling
//!   back to deterministic presets when the model is unavailable.
//! - [`build_briefing`] writes the scenario briefing (three options and a
//!   recommendation) from the baseline's cost structure.
//! - [`action_tips`] picks the follow-up actions shown after a simulation.

mod advisor;
mod briefing;
mod config;
mod error;
mod presets;
mod tips;
mod transport;

pub use advisor::{
    extract_json_object, AdvisorResult, Recommendation, RecommendationSource, StrategyAdvisor,
};
pub use briefing::{build_briefing, Briefing, BriefingOption, CostComposition};
pub use config::AdvisorConfig;
pub use error::AdvisorError;
pub use presets::{fallback_presets, fallback_recommendations, PRESET_COPY};
pub use tips::{action_tips, ActionTip};
pub use transport::{ChatMessage, ChatRequest, ChatResponse, ChatTransport, HttpTransport, ResponseMessage};
