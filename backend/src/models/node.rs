//! Transaction node: a record plus its (optional) risk assessment

use crate::models::risk::RiskAssessment;
use crate::models::transaction::TransactionRecord;
use serde::{Deserialize, Serialize};

/// Graph vertex for one transaction
///
/// The risk assessment is `None` until the scorer has run. Re-scoring
/// overwrites it in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionNode {
    record: TransactionRecord,
    risk: Option<RiskAssessment>,
}

impl TransactionNode {
    pub fn new(record: TransactionRecord) -> Self {
        Self { record, risk: None }
    }

    pub fn record(&self) -> &TransactionRecord {
        &self.record
    }

    pub fn id(&self) -> &str {
        self.record.id()
    }

    pub fn amount(&self) -> f64 {
        self.record.amount()
    }

    pub fn risk(&self) -> Option<&RiskAssessment> {
        self.risk.as_ref()
    }

    pub fn is_scored(&self) -> bool {
        self.risk.is_some()
    }

    /// Overwrite the risk assessment
    pub fn set_risk(&mut self, assessment: RiskAssessment) {
        self.risk = Some(assessment);
    }

    /// Drop any previous assessment
    pub fn clear_risk(&mut self) {
        self.risk = None;
    }
}
