use serde::{Deserialize, Serialize};

use super::state_machine::{InvalidTransition, ScanEvent, ScanState};
use crate::ids::{Barcode, ScanId};
use crate::product::{IngredientRecommendation, Product};

/// Why a session ended in [`ScanState::Error`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanFailure {
    /// The barcode has no matching product. Rendered as its own screen state.
    NotFound,
    /// Network, server or decoding failure, with a user-visible message.
    Transport { message: String },
    /// Polling stopped after the configured number of attempts.
    TimedOut { attempts: u32 },
}

impl ScanFailure {
    pub fn transport(message: impl Into<String>) -> Self {
        ScanFailure::Transport {
            message: message.into(),
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            ScanFailure::NotFound => "No product matches this barcode.".to_string(),
            ScanFailure::Transport { message } => message.clone(),
            ScanFailure::TimedOut { attempts } => {
                format!("Analysis did not finish after {attempts} status checks.")
            }
        }
    }
}

/// One in-progress or completed capture.
///
/// Exclusively owned by the view-model that created it. The backend keeps the
/// authoritative copy, addressable by `scan_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSession {
    pub scan_id: ScanId,
    pub barcode: Option<Barcode>,
    pub state: ScanState,
    pub product: Option<Product>,
    pub recommendations: Option<Vec<IngredientRecommendation>>,
    pub guidance: Option<String>,
    pub error: Option<ScanFailure>,
}

impl ScanSession {
    /// New session for the barcode flow.
    pub fn for_barcode(barcode: Barcode) -> Self {
        Self {
            barcode: Some(barcode),
            ..Self::for_photo(ScanId::new())
        }
    }

    /// New session for the photo (label) flow.
    pub fn for_photo(scan_id: ScanId) -> Self {
        Self {
            scan_id,
            barcode: None,
            state: ScanState::Idle,
            product: None,
            recommendations: None,
            guidance: None,
            error: None,
        }
    }

    pub fn apply(&mut self, event: ScanEvent) -> Result<ScanState, InvalidTransition> {
        self.state = self.state.apply(event)?;
        Ok(self.state)
    }

    /// Move to `Done` with the final analysis.
    pub fn complete(
        &mut self,
        recommendations: Vec<IngredientRecommendation>,
    ) -> Result<(), InvalidTransition> {
        self.apply(ScanEvent::Completed)?;
        self.recommendations = Some(recommendations);
        Ok(())
    }

    /// Move to `Error` and record why.
    pub fn fail(&mut self, failure: ScanFailure) -> Result<(), InvalidTransition> {
        self.apply(ScanEvent::Failed)?;
        self.error = Some(failure);
        Ok(())
    }

    pub fn is_done(&self) -> bool {
        self.state == ScanState::Done
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.error, Some(ScanFailure::NotFound))
    }
}
