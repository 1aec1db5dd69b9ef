use ic_core::ports::ScanStatus;
use ic_core::product::worst_classification;
use ic_core::{IngredientRecommendation, Product, ScanSession, ScanState};
use serde::Serialize;

use super::Output;

pub fn print_session(session: &ScanSession, output: Output) -> anyhow::Result<()> {
    if output.json {
        return print_json(session);
    }

    let source = match &session.barcode {
        Some(barcode) => format!("barcode {barcode}"),
        None => "label photo".to_string(),
    };
    println!("scan {} ({source}): {:?}", session.scan_id, session.state);
    if let Some(product) = &session.product {
        print_product(product);
    }
    if let Some(guidance) = &session.guidance {
        println!("  guidance: {guidance}");
    }
    match (&session.state, &session.error, &session.recommendations) {
        (ScanState::Error, Some(error), _) => println!("  error: {}", error.user_message()),
        (_, _, Some(recommendations)) => print_recommendations(recommendations),
        _ => {}
    }
    Ok(())
}

pub fn print_status(status: &ScanStatus, output: Output) -> anyhow::Result<()> {
    if output.json {
        return print_json(status);
    }

    println!("state: {}", status.state);
    if let Some(product) = &status.product {
        print_product(product);
    }
    if let Some(guidance) = &status.guidance {
        println!("  guidance: {guidance}");
    }
    match &status.recommendations {
        Some(recommendations) => print_recommendations(recommendations),
        None => println!("  analysis pending"),
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_product(product: &Product) {
    match &product.brand {
        Some(brand) => println!("  product: {} ({brand})", product.display_name()),
        None => println!("  product: {}", product.display_name()),
    }
    println!("  ingredients: {}", product.ingredient_count());
}

fn print_recommendations(recommendations: &[IngredientRecommendation]) {
    println!("  verdict: {:?}", worst_classification(recommendations));
    for rec in recommendations {
        let marker = if rec.safety.is_flagged() { '!' } else { '-' };
        print!("    {marker} {}: {:?}", rec.ingredient_name, rec.safety);
        if let Some(preference) = &rec.preference {
            print!(" [{preference}]");
        }
        println!();
        if let Some(reasoning) = &rec.reasoning {
            println!("      {reasoning}");
        }
    }
}
