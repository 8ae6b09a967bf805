//! Domain models for the transaction graph

pub mod node;
pub mod risk;
pub mod transaction;

// Re-exports
pub use node::TransactionNode;
pub use risk::{FailureMode, RiskAssessment, Severity};
pub use transaction::TransactionRecord;
