use assignly_shared::WorkType;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;

/// Rate table for the pricing engine. All amounts are in kobo (minor currency
/// units); division to naira happens only at display time.
///
/// Operators retune rates through config files or environment overrides, never
/// through code changes. `Default` carries the latest deployed values.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PricingConfig {
    /// Per-page writing rate for assignments delivered as soft copy.
    pub base_rate_per_page: i64,
    /// Per-page rate for writing notes, regardless of delivery type.
    pub notes_rate_per_page: i64,
    /// Per-page rate when the work is handwritten.
    pub handwritten_rate_per_page: i64,
    /// Per-page surcharge for printed delivery.
    pub printing_rate_per_page: i64,
    pub diagram_rate: i64,
    pub spiral_binding_fee: i64,
    pub impromptu_fee: i64,
    /// Deadlines closer than this many days attract the impromptu fee.
    #[serde(default = "default_impromptu_threshold")]
    pub impromptu_threshold_days: i64,
    /// Flat base fee per work type. Every enumerated work type must have an
    /// entry; the engine refuses to price a work type missing from this map.
    pub base_fees: HashMap<WorkType, i64>,
}

fn default_impromptu_threshold() -> i64 {
    3
}

impl Default for PricingConfig {
    fn default() -> Self {
        let mut base_fees = HashMap::new();
        base_fees.insert(WorkType::Assignment, 0);
        base_fees.insert(WorkType::WritingNotes, 0);
        base_fees.insert(WorkType::Presentation, 150_000);
        base_fees.insert(WorkType::Report, 200_000);
        base_fees.insert(WorkType::Project, 300_000);
        base_fees.insert(WorkType::Thesis, 500_000);

        Self {
            base_rate_per_page: 20_000,
            notes_rate_per_page: 15_000,
            handwritten_rate_per_page: 30_000,
            printing_rate_per_page: 30_000,
            diagram_rate: 10_000,
            spiral_binding_fee: 30_000,
            impromptu_fee: 50_000,
            impromptu_threshold_days: 3,
            base_fees,
        }
    }
}

impl PricingConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file (optional)
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file, not checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Environment overrides, e.g. ASSIGNLY__PRICING__DIAGRAM_RATE=12000
            .add_source(config::Environment::with_prefix("ASSIGNLY").separator("__"))
            .build()?;

        s.get("pricing")
    }
}
