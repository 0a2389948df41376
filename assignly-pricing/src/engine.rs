use crate::app_config::PricingConfig;
use assignly_shared::{DeliveryType, WorkRequest, WorkType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 86_400;

/// One priced line on the order summary. Insertion order is display order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceLineItem {
    pub label: String,
    pub amount_minor: i64,
}

impl PriceLineItem {
    fn new(label: String, amount_minor: i64) -> Self {
        Self { label, amount_minor }
    }
}

/// Priced quote for a work request.
///
/// Invariant: `total_minor` always equals the sum of the breakdown amounts.
/// The customer is shown the breakdown and charged the total, so a mismatch
/// here is a billing defect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PricingResult {
    pub total_minor: i64,
    pub breakdown: Vec<PriceLineItem>,
}

impl PricingResult {
    fn from_breakdown(breakdown: Vec<PriceLineItem>) -> Self {
        let total_minor = breakdown.iter().map(|line| line.amount_minor).sum();
        Self { total_minor, breakdown }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    /// The configured rate table has no base-fee entry for this work type.
    /// Upstream enum validation should make this unreachable; if it fires, the
    /// deployment's pricing config is broken and the order must not proceed.
    #[error("No configured base fee for work type: {0}")]
    UnknownWorkType(WorkType),
}

/// Computes the price of a work request from the configured rate table.
///
/// Pure and deterministic: the reference instant is an explicit argument, so
/// identical inputs always produce identical quotes.
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Price `request` as of `now`.
    ///
    /// Line order is fixed for display stability: base fee, writing/printing,
    /// diagrams, delivery surcharge, spiral binding, impromptu fee last.
    pub fn compute(
        &self,
        request: &WorkRequest,
        now: DateTime<Utc>,
    ) -> Result<PricingResult, PricingError> {
        let cfg = &self.config;
        let pages = i64::from(request.page_count);
        let diagrams = i64::from(request.diagram_count);

        let base_fee = cfg
            .base_fees
            .get(&request.work_type)
            .copied()
            .ok_or(PricingError::UnknownWorkType(request.work_type))?;

        let mut breakdown = Vec::new();

        if base_fee > 0 {
            breakdown.push(PriceLineItem::new(
                format!("{} base fee", capitalize(request.work_type.as_str())),
                base_fee,
            ));
        }

        // Per-page writing cost, only for the writing work types.
        match request.work_type {
            WorkType::Assignment => match request.delivery_type {
                DeliveryType::SoftCopy => breakdown.push(PriceLineItem::new(
                    format!("Writing ({} pages)", pages),
                    pages * cfg.base_rate_per_page,
                )),
                // Writing and printing are charged as one combined line.
                DeliveryType::Printed | DeliveryType::PrintedSpiral => {
                    breakdown.push(PriceLineItem::new(
                        format!("Writing & printing ({} pages)", pages),
                        pages * (cfg.base_rate_per_page + cfg.printing_rate_per_page),
                    ))
                }
                DeliveryType::Handwritten => breakdown.push(PriceLineItem::new(
                    format!("Handwritten writing ({} pages)", pages),
                    pages * cfg.handwritten_rate_per_page,
                )),
            },
            WorkType::WritingNotes => breakdown.push(PriceLineItem::new(
                format!("Writing notes ({} pages)", pages),
                pages * cfg.notes_rate_per_page,
            )),
            _ => {}
        }

        if diagrams > 0 {
            breakdown.push(PriceLineItem::new(
                format!("Diagrams ({})", diagrams),
                diagrams * cfg.diagram_rate,
            ));
        }

        // Delivery surcharges for work not priced per written page.
        if !request.work_type.is_writing_work() {
            match request.delivery_type {
                DeliveryType::SoftCopy => {}
                DeliveryType::Printed | DeliveryType::PrintedSpiral => {
                    breakdown.push(PriceLineItem::new(
                        format!("Printing ({} pages)", pages),
                        pages * cfg.printing_rate_per_page,
                    ))
                }
                DeliveryType::Handwritten => breakdown.push(PriceLineItem::new(
                    format!("Handwriting ({} pages)", pages),
                    pages * cfg.handwritten_rate_per_page,
                )),
            }
        }

        // Spiral binding is a flat fee on top of printing. The assignment's
        // combined writing line above does not include it.
        if request.delivery_type == DeliveryType::PrintedSpiral
            && request.work_type != WorkType::WritingNotes
        {
            breakdown.push(PriceLineItem::new(
                "Spiral binding".to_string(),
                cfg.spiral_binding_fee,
            ));
        }

        if days_until(request.deadline, now) < cfg.impromptu_threshold_days {
            breakdown.push(PriceLineItem::new(
                format!(
                    "Impromptu service fee (< {} days deadline)",
                    cfg.impromptu_threshold_days
                ),
                cfg.impromptu_fee,
            ));
        }

        Ok(PricingResult::from_breakdown(breakdown))
    }
}

/// Whole days until the deadline, rounded up. Negative when the deadline has
/// already passed.
fn days_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let seconds = (deadline - now).num_seconds();
    let mut days = seconds.div_euclid(SECONDS_PER_DAY);
    if seconds.rem_euclid(SECONDS_PER_DAY) > 0 {
        days += 1;
    }
    days
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
