// Lead form data model
// Everything the wizard collects, grouped the way the steps ask for it.

use serde::{Deserialize, Serialize};

use super::industry::Industry;
use super::uploads::Uploads;

/// Current website situation, asked on the Details step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebsiteStatus {
    #[serde(rename = "no")]
    NoWebsite,
    #[serde(rename = "yes-update")]
    NeedsUpdate,
    #[serde(rename = "yes-expensive")]
    TooExpensive,
}

impl WebsiteStatus {
    pub const ALL: [WebsiteStatus; 3] = [
        WebsiteStatus::NoWebsite,
        WebsiteStatus::NeedsUpdate,
        WebsiteStatus::TooExpensive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WebsiteStatus::NoWebsite => "no",
            WebsiteStatus::NeedsUpdate => "yes-update",
            WebsiteStatus::TooExpensive => "yes-expensive",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WebsiteStatus::NoWebsite => "No, I rely on word of mouth",
            WebsiteStatus::NeedsUpdate => "Yes, but it needs an update",
            WebsiteStatus::TooExpensive => "Yes, but I'm paying too much for it",
        }
    }

    /// Whether the existing-URL field applies.
    pub fn has_existing_site(&self) -> bool {
        matches!(
            self,
            WebsiteStatus::NeedsUpdate | WebsiteStatus::TooExpensive
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WebsiteGoal {
    #[serde(rename = "phone-calls")]
    PhoneCalls,
    #[serde(rename = "quote-requests")]
    QuoteRequests,
    #[serde(rename = "book-online")]
    BookOnline,
    #[serde(rename = "google-seo")]
    GoogleSeo,
    #[serde(rename = "look-professional")]
    LookProfessional,
    #[serde(rename = "sell-online")]
    SellOnline,
}

impl WebsiteGoal {
    pub const ALL: [WebsiteGoal; 6] = [
        WebsiteGoal::PhoneCalls,
        WebsiteGoal::QuoteRequests,
        WebsiteGoal::BookOnline,
        WebsiteGoal::GoogleSeo,
        WebsiteGoal::LookProfessional,
        WebsiteGoal::SellOnline,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            WebsiteGoal::PhoneCalls => "phone-calls",
            WebsiteGoal::QuoteRequests => "quote-requests",
            WebsiteGoal::BookOnline => "book-online",
            WebsiteGoal::GoogleSeo => "google-seo",
            WebsiteGoal::LookProfessional => "look-professional",
            WebsiteGoal::SellOnline => "sell-online",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WebsiteGoal::PhoneCalls => "Get phone calls",
            WebsiteGoal::QuoteRequests => "Get quote requests",
            WebsiteGoal::BookOnline => "Book appointments online",
            WebsiteGoal::GoogleSeo => "Show up on Google",
            WebsiteGoal::LookProfessional => "Look professional",
            WebsiteGoal::SellOnline => "Sell products online",
        }
    }
}

/// "How did you hear about us?"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Referral {
    GoogleSearch,
    Social,
    WordOfMouth,
    SawVibelySite,
    FlyerPrint,
    Other,
}

impl Referral {
    pub const ALL: [Referral; 6] = [
        Referral::GoogleSearch,
        Referral::Social,
        Referral::WordOfMouth,
        Referral::SawVibelySite,
        Referral::FlyerPrint,
        Referral::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Referral::GoogleSearch => "Google Search",
            Referral::Social => "Facebook / Instagram",
            Referral::WordOfMouth => "Referral / Word of Mouth",
            Referral::SawVibelySite => "Saw a Vibely site",
            Referral::FlyerPrint => "Flyer / Print",
            Referral::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormData {
    // Identity
    pub business_name: String,
    pub contact_name: String,
    pub industry: Option<Industry>,
    pub other_industry: String,
    pub city: String,

    // Contact
    pub email: String,
    pub phone: String,

    // Details (optional)
    pub services: String,
    pub website_status: Option<WebsiteStatus>,
    pub existing_url: String,
    pub differentiators: String,
    pub website_goals: Vec<WebsiteGoal>,

    // Uploads (optional)
    pub uploads: Uploads,

    // Meta
    pub additional_notes: String,
    pub hear_about_us: Option<Referral>,
}

impl FormData {
    /// Industry as it should be shown and sent: the free-text override when
    /// "Other" was picked, otherwise the enumerated value.
    pub fn effective_industry(&self) -> String {
        match self.industry {
            Some(Industry::Other) => self.other_industry.trim().to_string(),
            Some(industry) => industry.as_str().to_string(),
            None => String::new(),
        }
    }

    /// Existing-site URL, only when the website status says there is one.
    pub fn effective_existing_url(&self) -> &str {
        match self.website_status {
            Some(status) if status.has_existing_site() => self.existing_url.trim(),
            _ => "",
        }
    }

    /// Selects or deselects a goal. Returns true when the goal is now selected.
    pub fn toggle_goal(&mut self, goal: WebsiteGoal) -> bool {
        if let Some(pos) = self.website_goals.iter().position(|g| *g == goal) {
            self.website_goals.remove(pos);
            false
        } else {
            self.website_goals.push(goal);
            true
        }
    }

    pub fn goals_joined(&self) -> String {
        self.website_goals
            .iter()
            .map(|g| g.id())
            .collect::<Vec<_>>()
            .join(",")
    }
}
