use serde::{Deserialize, Serialize};

/// Safety verdict for one ingredient against the user's dietary preferences.
///
/// 配料相对于用户饮食偏好的安全判定。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SafetyClassification {
    Safe,
    MaybeUnsafe,
    DefinitelyUnsafe,
}

impl SafetyClassification {
    pub fn is_flagged(self) -> bool {
        !matches!(self, SafetyClassification::Safe)
    }
}

/// One verdict per ingredient (or ingredient fragment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientRecommendation {
    /// The text span of the ingredient list this verdict refers to.
    pub ingredient_name: String,
    pub safety: SafetyClassification,
    /// The preference that triggered the verdict, e.g. "No peanuts".
    pub preference: Option<String>,
    pub reasoning: Option<String>,
}

/// Highest severity across a list of verdicts; `Safe` when the list is empty.
pub fn worst_classification(recommendations: &[IngredientRecommendation]) -> SafetyClassification {
    recommendations
        .iter()
        .map(|r| r.safety)
        .max()
        .unwrap_or(SafetyClassification::Safe)
}
