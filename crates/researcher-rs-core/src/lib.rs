//! Query routing and orchestration.
//!
//! A [`Supervisor`] classifies each query into one [`Domain`] with a single
//! model call (falling back to keyword scoring), dispatches it to the matching
//! [`Responder`], and the [`Orchestrator`] times the run and persists the
//! outcome through a [`QueryStore`].
//!
//! [`Domain`]: researcher_rs_protocol::Domain
//! [`QueryStore`]: researcher_rs_store::QueryStore

pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod responders;
pub mod router;

pub use error::{CoreError, LlmError};
pub use llm::ChatModel;
pub use orchestrator::{Orchestrator, validate_history_filter};
pub use responders::{
    GeneralResponder, MarketResponder, NewsResponder, Responder, Responders, StockResponder,
};
pub use router::Supervisor;
