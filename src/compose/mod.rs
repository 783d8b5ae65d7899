//! Text-generation orchestration: per-topic news summaries, simulated social
//! commentary, and the broadcast composer that merges them.

pub mod broadcast;
pub mod news;
pub mod social;

pub use broadcast::{BroadcastComposer, NO_CONTENT_SCRIPT};
pub use news::NewsSummarizer;
pub use social::SocialCommentator;
