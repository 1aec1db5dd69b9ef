//! # ic-core
//!
//! Core domain models and scan coordination rules for IngrediCheck.
//!
//! This crate contains pure domain logic without any infrastructure dependencies:
//! scan sessions and their state machine, product/recommendation models,
//! the backend port, and the configuration DTO.

pub mod config;
pub mod ids;
pub mod ports;
pub mod product;
pub mod scan;

// Re-export commonly used types at the crate root
pub use config::AppConfig;
pub use ids::{Barcode, BarcodeError, ScanId};
pub use product::{
    ImageRef, Ingredient, IngredientRecommendation, Product, ProductAnalysis,
    SafetyClassification,
};
pub use scan::{InvalidTransition, ScanBounds, ScanEvent, ScanFailure, ScanSession, ScanState};
