use serde::{Deserialize, Serialize};

/// Hours at or below which vomiting counts as sudden onset.
pub const SUDDEN_ONSET_MAX_HOURS: f64 = 24.0;
/// Hours at or above which vomiting counts as recurrent.
pub const RECURRENT_MIN_HOURS: f64 = 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyLevel {
    Normal,
    Reduced,
    Severe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BloodType {
    None,
    Fresh,
    CoffeeGround,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrineOutput {
    Normal,
    Oliguria,
    Anuria,
    Unknown,
}

/// Clinical observations. Every field is optional: `None` means the
/// finding was not assessed, which is distinct from a negative finding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriageInput {
    #[serde(default)]
    pub duration_hours: Option<f64>,
    #[serde(default)]
    pub vomit_count_24h: Option<u32>,
    #[serde(default)]
    pub energy_level: Option<EnergyLevel>,
    #[serde(default)]
    pub blood: Option<BloodType>,
    #[serde(default)]
    pub abd_distension: Option<bool>,
    #[serde(default)]
    pub unproductive_retching: Option<bool>,
    #[serde(default)]
    pub suspected_toxin: Option<bool>,
    #[serde(default)]
    pub urine: Option<UrineOutput>,
    #[serde(default)]
    pub black_stool: Option<bool>,
}

/// Signal vocabulary shared with the tree's `signals` lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    BloodVomit,
    CoffeeGroundEmesis,
    AbdominalDistension,
    UnproductiveRetching,
    SuspectedToxin,
    Anuria,
    Oliguria,
    BlackStool,
    SevereLethargy,
    SuddenOnset,
    Recurrent,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BloodVomit => "blood_vomit",
            Self::CoffeeGroundEmesis => "coffee_ground_emesis",
            Self::AbdominalDistension => "abdominal_distension",
            Self::UnproductiveRetching => "unproductive_retching",
            Self::SuspectedToxin => "suspected_toxin",
            Self::Anuria => "anuria",
            Self::Oliguria => "oliguria",
            Self::BlackStool => "black_stool",
            Self::SevereLethargy => "severe_lethargy",
            Self::SuddenOnset => "sudden_onset",
            Self::Recurrent => "recurrent",
        }
    }
}

/// Derive signals in rule-declaration order.
pub fn derive_signals(input: &TriageInput) -> Vec<Signal> {
    let mut signals = Vec::new();

    match input.blood {
        Some(BloodType::Fresh) => signals.push(Signal::BloodVomit),
        Some(BloodType::CoffeeGround) => signals.push(Signal::CoffeeGroundEmesis),
        _ => {}
    }

    if input.abd_distension == Some(true) {
        signals.push(Signal::AbdominalDistension);
    }
    if input.unproductive_retching == Some(true) {
        signals.push(Signal::UnproductiveRetching);
    }
    if input.suspected_toxin == Some(true) {
        signals.push(Signal::SuspectedToxin);
    }

    // Anuria takes precedence over oliguria.
    match input.urine {
        Some(UrineOutput::Anuria) => signals.push(Signal::Anuria),
        Some(UrineOutput::Oliguria) => signals.push(Signal::Oliguria),
        _ => {}
    }

    if input.black_stool == Some(true) {
        signals.push(Signal::BlackStool);
    }
    if input.energy_level == Some(EnergyLevel::Severe) {
        signals.push(Signal::SevereLethargy);
    }

    // 24-72h intentionally yields no onset signal.
    if let Some(hours) = input.duration_hours {
        if hours <= SUDDEN_ONSET_MAX_HOURS {
            signals.push(Signal::SuddenOnset);
        }
        if hours >= RECURRENT_MIN_HOURS {
            signals.push(Signal::Recurrent);
        }
    }

    signals
}
