use crate::infra::{parse_field, parse_kind};
use agri_advisor::advisory::{
    AdvisoryEngine, AdvisoryError, AdvisoryService, ConcurrencyPolicy, InferenceKind, Metadata,
    RawRequest, Recommendation, SessionId,
};
use agri_advisor::config::{AppConfig, EngineConfig};
use agri_advisor::error::AppError;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub(crate) struct AdviseArgs {
    /// Advisory flow to run: crop, fertilizer or yield
    #[arg(value_parser = parse_kind)]
    pub(crate) kind: InferenceKind,
    /// Form field as key=value; repeat for every field
    #[arg(long = "field", short = 'f', value_parser = parse_field)]
    pub(crate) fields: Vec<(String, String)>,
    /// Seed the reference models for reproducible output
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Print the recommendation as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Seed the reference models (defaults to 42 so demos repeat)
    #[arg(long, default_value_t = 42)]
    pub(crate) seed: u64,
}

pub(crate) async fn run_advise(args: AdviseArgs) -> Result<(), AppError> {
    let AdviseArgs {
        kind,
        fields,
        seed,
        json,
    } = args;

    let mut engine_config = AppConfig::load()?.engine;
    if seed.is_some() {
        engine_config.model_seed = seed;
    }
    let engine = AdvisoryEngine::from_config(&engine_config);

    let request: RawRequest = fields.into_iter().collect();
    let recommendation = engine.advise(&request, kind).await?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&recommendation).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        render_recommendation(&recommendation);
    }
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let engine_config = EngineConfig {
        model_seed: Some(args.seed),
        inference_latency: Duration::from_millis(150),
        ..EngineConfig::default()
    };
    let service = AdvisoryService::new(
        Arc::new(AdvisoryEngine::from_config(&engine_config)),
        ConcurrencyPolicy::Reject,
    );
    let session = service.open_session();

    println!("Agri advisor demo (seed {})", args.seed);

    for (kind, request) in sample_forms() {
        println!("\n{}", kind.label());
        match service.advise(&session, request, kind).await {
            Ok(recommendation) => render_recommendation(&recommendation),
            Err(err) => println!("  {}", err),
        }
    }

    println!("\nValidation walkthrough");
    let mismatched = sample_yield_form().with("district", "Kolkata");
    match service.advise(&session, mismatched, InferenceKind::Yield).await {
        Err(AdvisoryError::Validation(err)) => println!("  Rejected: {}", err.summary()),
        Ok(recommendation) => println!("  Unexpectedly accepted: {}", recommendation.headline),
        Err(other) => println!("  {}", other),
    }

    demo_busy_rejection(&service, &session).await;

    let stats = service.stats();
    println!(
        "\nSession totals: {} completed | {} failed | {} busy rejections",
        stats.completed, stats.failed, stats.busy_rejections
    );
    Ok(())
}

async fn demo_busy_rejection(service: &AdvisoryService, session: &SessionId) {
    println!("\nConcurrent submit walkthrough");
    let handle = match service.submit(session, sample_crop_form(), InferenceKind::Crop) {
        Ok(handle) => handle,
        Err(err) => {
            println!("  {}", err);
            return;
        }
    };

    match service.submit(session, sample_crop_form(), InferenceKind::Crop) {
        Err(AdvisoryError::Busy(busy)) => println!("  Second submit refused: {}", busy),
        Ok(_) => println!("  Second submit accepted"),
        Err(other) => println!("  {}", other),
    }

    match handle.outcome().await {
        Ok(recommendation) => println!("  First request finished: {}", recommendation.headline),
        Err(err) => println!("  First request failed: {}", err),
    }
}

pub(crate) fn render_recommendation(recommendation: &Recommendation) {
    println!("- {}", recommendation.headline);
    println!(
        "  Confidence: {} ({} flow)",
        recommendation.result.confidence, recommendation.kind
    );

    match &recommendation.metadata {
        Metadata::Crop { suitability_score } => {
            println!("  Suitability score: {suitability_score}/100");
        }
        Metadata::Fertilizer {
            composition,
            benefits,
            application,
            dosage_kg_per_hectare,
        } => {
            if let Some(composition) = composition {
                println!("  Composition: {composition}");
            }
            if let Some(benefits) = benefits {
                println!("  Benefits: {benefits}");
            }
            if let Some(application) = application {
                println!("  Application: {application}");
            }
            println!("  Recommended dosage: {dosage_kg_per_hectare} kg/hectare");
        }
        Metadata::Yield {
            yield_per_hectare,
            total_production,
            previous_production,
            production_change_pct,
        } => {
            println!("  Yield per hectare: {yield_per_hectare:.2} tons");
            println!(
                "  Total production: {total_production:.2} tons (previous {previous_production:.2})"
            );
            if let Some(change) = production_change_pct {
                println!("  Change vs previous season: {change:+.1}%");
            }
        }
    }

    for warning in &recommendation.warnings {
        println!("  Warning: {warning}");
    }
    if !recommendation.tips.is_empty() {
        println!("  Tips:");
        for tip in &recommendation.tips {
            println!("    - {tip}");
        }
    }
}

fn sample_forms() -> Vec<(InferenceKind, RawRequest)> {
    vec![
        (InferenceKind::Crop, sample_crop_form()),
        (InferenceKind::Fertilizer, sample_fertilizer_form()),
        (InferenceKind::Yield, sample_yield_form()),
    ]
}

fn sample_crop_form() -> RawRequest {
    RawRequest::new()
        .with("nitrogen", "90")
        .with("phosphorus", "42")
        .with("potassium", "43")
        .with("temperature", "20.9")
        .with("humidity", "82")
        .with("ph", "6.5")
        .with("rainfall", "203")
}

fn sample_fertilizer_form() -> RawRequest {
    RawRequest::new()
        .with("soil_type", "Clayey")
        .with("crop_type", "Paddy")
        .with("temperature", "27")
        .with("humidity", "64")
        .with("moisture", "52")
        .with("nitrogen", "68")
        .with("phosphorus", "31")
        .with("potassium", "55")
}

fn sample_yield_form() -> RawRequest {
    RawRequest::new()
        .with("state", "Punjab")
        .with("district", "Ludhiana")
        .with("season", "Rabi")
        .with("crop", "Wheat")
        .with("area", "4.5")
        .with("production", "18")
}

#[cfg(test)]
mod tests {
    use super::*;
    use agri_advisor::advisory::InputValidator;

    #[test]
    fn sample_forms_pass_validation() {
        let validator = InputValidator::default();
        for (kind, request) in sample_forms() {
            validator
                .validate(&request, kind)
                .unwrap_or_else(|err| panic!("{kind} sample rejected: {err}"));
        }
    }

    #[tokio::test]
    async fn demo_runs_to_completion() {
        run_demo(DemoArgs { seed: 7 }).await.expect("demo completes");
    }
}
