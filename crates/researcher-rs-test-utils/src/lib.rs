//! Test helpers shared across researcher-rs crates.

pub mod llm;
pub mod sources;

pub use llm::{FailingLLM, FixedChatResponse, FixedLLM, RecordingChatLLM, ScriptedLLM, SlowLLM};
pub use sources::{
    StubNewsSource, StubProductSource, StubStockSource, sample_articles, sample_products,
    sample_quote,
};
