pub mod briefing;

pub use briefing::BriefingConfig;
