// Industry enumeration and the trade-name lookup used when another page
// hands a preselected industry to the wizard.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Industry {
    Roofer,
    Detailer,
    Salon,
    Landscaper,
    Plumber,
    #[serde(rename = "HVAC")]
    Hvac,
    Painter,
    Electrician,
    Other,
}

impl Industry {
    pub const ALL: [Industry; 9] = [
        Industry::Roofer,
        Industry::Detailer,
        Industry::Salon,
        Industry::Landscaper,
        Industry::Plumber,
        Industry::Hvac,
        Industry::Painter,
        Industry::Electrician,
        Industry::Other,
    ];

    /// Wire value sent to the form endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Industry::Roofer => "Roofer",
            Industry::Detailer => "Detailer",
            Industry::Salon => "Salon",
            Industry::Landscaper => "Landscaper",
            Industry::Plumber => "Plumber",
            Industry::Hvac => "HVAC",
            Industry::Painter => "Painter",
            Industry::Electrician => "Electrician",
            Industry::Other => "Other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Industry::Detailer => "Auto Detailer",
            Industry::Salon => "Salon / Spa",
            other => other.as_str(),
        }
    }

    /// Cycle helper for list pickers. `None` means nothing selected yet.
    pub fn next(current: Option<Industry>) -> Industry {
        match current {
            None => Industry::ALL[0],
            Some(i) => {
                let idx = Industry::ALL.iter().position(|x| *x == i).unwrap_or(0);
                Industry::ALL[(idx + 1) % Industry::ALL.len()]
            }
        }
    }

    pub fn prev(current: Option<Industry>) -> Industry {
        let len = Industry::ALL.len();
        match current {
            None => Industry::ALL[len - 1],
            Some(i) => {
                let idx = Industry::ALL.iter().position(|x| *x == i).unwrap_or(0);
                Industry::ALL[(idx + len - 1) % len]
            }
        }
    }
}

/// Trade names shown on the marketing carousel, mapped to the wizard's
/// industry list. Matching ignores case and surrounding whitespace.
const TRADE_NAMES: &[(&str, Industry)] = &[
    ("Roofers", Industry::Roofer),
    ("Auto Detailers", Industry::Detailer),
    ("Detailers", Industry::Detailer),
    ("Salons", Industry::Salon),
    ("Salons & Spas", Industry::Salon),
    ("Landscapers", Industry::Landscaper),
    ("Plumbers", Industry::Plumber),
    ("HVAC", Industry::Hvac),
    ("Painters", Industry::Painter),
    ("Electricians", Industry::Electrician),
];

/// Map an externally supplied trade name to an industry.
/// Unknown names return `None` and leave the form untouched.
pub fn industry_from_trade_name(trade_name: &str) -> Option<Industry> {
    let needle = trade_name.trim();
    if needle.is_empty() {
        return None;
    }
    TRADE_NAMES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(needle))
        .map(|(_, industry)| *industry)
}
