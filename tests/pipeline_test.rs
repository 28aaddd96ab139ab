use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use procur_config::EngineConfig;
use procur_orchestrator::{PipelineBuilder, SeedCatalog, StaticSeedCatalog};
use procur_proposal::DeterministicProposalGenerator;
use procur_types::{
    ExchangePolicy, NegotiationOutcome, PaymentTerms, ReliabilityStats, RiskLevel, VendorGuardrails, VendorProfile,
};
use rust_decimal::Decimal;

fn vendor(vendor_id: &str, price_floor: i64, list_price: i64) -> VendorProfile {
    VendorProfile {
        vendor_id: vendor_id.to_string(),
        name: format!("{vendor_id} Inc"),
        category: Some("crm".to_string()),
        capability_tags: BTreeSet::from(["pipeline".to_string()]),
        certifications: BTreeSet::new(),
        regions: BTreeSet::new(),
        price_tiers: BTreeMap::from([(1, Decimal::new(list_price, 0))]),
        guardrails: VendorGuardrails {
            price_floor: Decimal::new(price_floor, 0),
            non_negotiables: BTreeSet::new(),
            payment_terms_allowed: BTreeSet::from([PaymentTerms::Net30]),
            response_window_hours: 24,
            contact_endpoints: BTreeSet::new(),
        },
        exchange_policy: ExchangePolicy {
            term_trade: BTreeMap::from([(12, 0.05), (24, 0.08)]),
            payment_trade: BTreeMap::from([(PaymentTerms::Net15, -0.02)]),
            value_add_offsets: BTreeMap::new(),
            min_step_abs: Decimal::new(1, 0),
            finalize_gap_abs: Decimal::new(10, 0),
            finalize_gap_pct: 0.02,
            close_extra_discount: 0.01,
            max_rounds: 6,
        },
        reliability_stats: ReliabilityStats {
            on_time_delivery_pct: Some(0.97),
            support_tier: Some("gold".to_string()),
            sla_pct: Some(0.995),
        },
        risk_level: RiskLevel::Low,
        billing_cadence: None,
    }
}

fn seed_catalog() -> Arc<dyn SeedCatalog> {
    Arc::new(StaticSeedCatalog::new(vec![
        vendor("vendor-a", 90, 130),
        vendor("vendor-b", 95, 140),
        vendor("vendor-c", 70, 100),
    ]))
}

#[tokio::test]
async fn full_run_covers_every_shortlisted_vendor() {
    let pipeline = PipelineBuilder::new()
        .with_engine_config(EngineConfig::default())
        .with_generator(Arc::new(DeterministicProposalGenerator))
        .with_seed_catalog(seed_catalog())
        .build()
        .expect("builder has every required field");

    let result = pipeline
        .run(
            "Looking for a sales pipeline and lead management tool for 25 seats, budget around $3k.",
            "standard procurement policy",
            None,
            2,
        )
        .await
        .expect("run should complete");

    assert!(result.request.is_some());
    assert!(result.clarification_questions.is_empty());
    assert!(!result.shortlist.is_empty());
    // §7 "no silent drops": every vendor the pipeline fanned out to appears in
    // the result, whether it closed, dropped, or stalemated.
    assert_eq!(result.vendors.len(), result.shortlist.len());

    for vendor_result in &result.vendors {
        assert!(matches!(
            vendor_result.audit_summary.outcome,
            NegotiationOutcome::Accepted | NegotiationOutcome::Dropped | NegotiationOutcome::Stalemate
        ));
    }

    // top_n=2 must be respected even though three vendors clear the gate.
    assert!(result.shortlist.len() <= 2);
}

#[tokio::test]
async fn missing_quantity_surfaces_clarification_without_running_vendors() {
    let pipeline = PipelineBuilder::new()
        .with_engine_config(EngineConfig::default())
        .with_generator(Arc::new(DeterministicProposalGenerator))
        .with_seed_catalog(seed_catalog())
        .build()
        .expect("builder has every required field");

    let result = pipeline
        .run("We would like to procure some new software.", "standard procurement policy", None, 2)
        .await
        .expect("run should complete");

    assert!(result.request.is_none());
    assert!(!result.clarification_questions.is_empty());
    assert!(result.vendors.is_empty());
    assert!(result.shortlist.is_empty());
}

#[tokio::test]
async fn clarification_answers_are_folded_into_a_second_intake_attempt() {
    let pipeline = PipelineBuilder::new()
        .with_engine_config(EngineConfig::default())
        .with_generator(Arc::new(DeterministicProposalGenerator))
        .with_seed_catalog(seed_catalog())
        .build()
        .expect("builder has every required field");

    let mut answers = BTreeMap::new();
    answers.insert("quantity".to_string(), "40 seats".to_string());

    let result = pipeline
        .run(
            "We would like to procure a sales pipeline tool.",
            "standard procurement policy",
            Some(&answers),
            2,
        )
        .await
        .expect("run should complete");

    assert!(result.request.is_some());
    assert!(result.clarification_questions.is_empty());
}
