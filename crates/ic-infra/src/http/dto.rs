//! Wire format of the scan backend and its mapping onto domain models.

use ic_core::ports::{ScanApiError, ScanStatus, SubmitReceipt};
use ic_core::{
    Barcode, ImageRef, Ingredient, IngredientRecommendation, Product, ProductAnalysis,
    SafetyClassification,
};
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitReceiptDto {
    #[serde(default)]
    pub queued: bool,
    #[serde(default)]
    pub queue_position: u32,
}

impl From<SubmitReceiptDto> for SubmitReceipt {
    fn from(dto: SubmitReceiptDto) -> Self {
        SubmitReceipt {
            queued: dto.queued,
            queue_position: dto.queue_position,
        }
    }
}

/// `GET /scan/{scan_id}`
#[derive(Debug, Deserialize)]
pub(crate) struct ScanDto {
    pub state: String,
    #[serde(default)]
    pub product_info: Option<ProductDto>,
    #[serde(default)]
    pub analysis_result: Option<AnalysisResultDto>,
    #[serde(default)]
    pub latest_guidance: Option<String>,
}

impl TryFrom<ScanDto> for ScanStatus {
    type Error = ScanApiError;

    fn try_from(dto: ScanDto) -> Result<Self, Self::Error> {
        let recommendations = dto
            .analysis_result
            .map(AnalysisResultDto::into_recommendations);
        Ok(ScanStatus {
            state: dto.state,
            product: dto.product_info.map(Product::from),
            recommendations,
            guidance: dto.latest_guidance,
        })
    }
}

/// `GET /inventory/{barcode}`: product fields with the verdicts inline.
#[derive(Debug, Deserialize)]
pub(crate) struct InventoryDto {
    #[serde(flatten)]
    pub product: ProductDto,
    #[serde(default)]
    pub ingredient_recommendations: Option<Vec<RecommendationDto>>,
}

impl TryFrom<InventoryDto> for ProductAnalysis {
    type Error = ScanApiError;

    fn try_from(dto: InventoryDto) -> Result<Self, Self::Error> {
        let recommendations = dto.ingredient_recommendations.map(|recs| {
            recs.into_iter()
                .map(IngredientRecommendation::from)
                .collect::<Vec<_>>()
        });
        Ok(ProductAnalysis {
            product: dto.product.into(),
            recommendations,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProductDto {
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<IngredientDto>,
    #[serde(default)]
    pub images: Vec<ImageDto>,
}

impl From<ProductDto> for Product {
    fn from(dto: ProductDto) -> Self {
        let barcode = dto.barcode.and_then(|raw| match Barcode::parse(&raw) {
            Ok(barcode) => Some(barcode),
            Err(err) => {
                warn!(barcode = %raw, error = %err, "ignoring malformed product barcode");
                None
            }
        });
        Product {
            barcode,
            name: dto.name,
            brand: dto.brand,
            ingredients: dto.ingredients.into_iter().map(Ingredient::from).collect(),
            images: dto.images.into_iter().filter_map(ImageDto::into_ref).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct IngredientDto {
    pub name: String,
    #[serde(default)]
    pub vegan: Option<bool>,
    #[serde(default)]
    pub vegetarian: Option<bool>,
    #[serde(default)]
    pub ingredients: Vec<IngredientDto>,
}

impl From<IngredientDto> for Ingredient {
    fn from(dto: IngredientDto) -> Self {
        Ingredient {
            name: dto.name,
            vegan: dto.vegan,
            vegetarian: dto.vegetarian,
            ingredients: dto.ingredients.into_iter().map(Ingredient::from).collect(),
        }
    }
}

/// Either a public URL or a hash of an image held in backend storage.
#[derive(Debug, Deserialize)]
pub(crate) struct ImageDto {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image_file_hash: Option<String>,
}

impl ImageDto {
    fn into_ref(self) -> Option<ImageRef> {
        match (self.url, self.image_file_hash) {
            (Some(url), _) => Some(ImageRef::Url { url }),
            (None, Some(key)) => Some(ImageRef::Stored { key }),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnalysisResultDto {
    #[serde(default)]
    pub ingredient_recommendations: Vec<RecommendationDto>,
}

impl AnalysisResultDto {
    fn into_recommendations(self) -> Vec<IngredientRecommendation> {
        self.ingredient_recommendations
            .into_iter()
            .map(IngredientRecommendation::from)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecommendationDto {
    pub ingredient_name: String,
    pub safety_recommendation: String,
    #[serde(default)]
    pub preference: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

impl From<RecommendationDto> for IngredientRecommendation {
    fn from(dto: RecommendationDto) -> Self {
        IngredientRecommendation {
            safety: parse_safety(&dto.ingredient_name, &dto.safety_recommendation),
            ingredient_name: dto.ingredient_name,
            preference: dto.preference,
            reasoning: dto.reasoning,
        }
    }
}

/// Accepts `MaybeUnsafe`, `maybe_unsafe`, `maybeUnsafe` and friends.
///
/// Labels this client does not know yet are shown as `MaybeUnsafe` so a
/// newer backend never hides a whole analysis, and never passes as safe.
fn parse_safety(ingredient: &str, raw: &str) -> SafetyClassification {
    let normalized: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    match normalized.as_str() {
        "safe" | "saferecommendation" => SafetyClassification::Safe,
        "maybeunsafe" => SafetyClassification::MaybeUnsafe,
        "definitelyunsafe" | "unsafe" => SafetyClassification::DefinitelyUnsafe,
        _ => {
            warn!(
                ingredient,
                label = raw,
                "unknown safety recommendation, treating as maybe unsafe"
            );
            SafetyClassification::MaybeUnsafe
        }
    }
}
