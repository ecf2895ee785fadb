use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Shift labels as they appear in schedules and on the ledger.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum Shift {
    Repos,
    Matin,
    Soir,
    Doublage,
}

impl Shift {
    /// Parse a stored label, falling back to Repos for anything unknown.
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or(Shift::Repos)
    }
}

/// Advance payment workflow status. Only the first three count toward
/// the day's advance total; a refused advance is kept for history only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum AdvanceStatus {
    #[strum(serialize = "En attente")]
    #[serde(rename = "En attente")]
    EnAttente,
    #[strum(serialize = "Validé")]
    #[serde(rename = "Validé")]
    Valide,
    #[strum(serialize = "Payé")]
    #[serde(rename = "Payé")]
    Paye,
    #[strum(serialize = "Refusé")]
    #[serde(rename = "Refusé")]
    Refuse,
}

impl AdvanceStatus {
    pub const COUNTABLE: [&'static str; 3] = ["En attente", "Validé", "Payé"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_labels_round_trip() {
        assert_eq!(Shift::from_label("Doublage"), Shift::Doublage);
        assert_eq!(Shift::from_label("matin?"), Shift::Repos);
        assert_eq!(Shift::Soir.to_string(), "Soir");
    }

    #[test]
    fn advance_status_uses_french_labels() {
        assert_eq!(AdvanceStatus::Valide.to_string(), "Validé");
        assert_eq!("En attente".parse::<AdvanceStatus>().unwrap(), AdvanceStatus::EnAttente);
    }
}
