//! The closed set of topic labels a feedback item can be classified under.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Topic category assigned by the classifier.
///
/// Labels are the exact strings the classifier is instructed to use and the
/// strings stored in `analyses.topic`. The migration carries the same set as a
/// `CHECK` constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Topic {
    #[serde(rename = "Support Client")]
    CustomerSupport,
    #[serde(rename = "Tarifs et Valeur")]
    PricingAndValue,
    #[serde(rename = "Interface Utilisateur")]
    UserInterface,
    #[serde(rename = "Bugs et Problèmes Techniques")]
    BugsAndTechnicalIssues,
    #[serde(rename = "Documentation")]
    Documentation,
    #[serde(rename = "Performance")]
    Performance,
    #[serde(rename = "Personnalisation")]
    Customization,
    #[serde(rename = "Processus d’Inscription")]
    Onboarding,
    #[serde(rename = "Fonctionnalités Avancées")]
    AdvancedFeatures,
    #[serde(rename = "Expérience Utilisateur Générale")]
    GeneralUserExperience,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown topic label: {0:?}")]
pub struct UnknownTopic(pub String);

impl Topic {
    pub const ALL: [Topic; 10] = [
        Topic::CustomerSupport,
        Topic::PricingAndValue,
        Topic::UserInterface,
        Topic::BugsAndTechnicalIssues,
        Topic::Documentation,
        Topic::Performance,
        Topic::Customization,
        Topic::Onboarding,
        Topic::AdvancedFeatures,
        Topic::GeneralUserExperience,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Topic::CustomerSupport => "Support Client",
            Topic::PricingAndValue => "Tarifs et Valeur",
            Topic::UserInterface => "Interface Utilisateur",
            Topic::BugsAndTechnicalIssues => "Bugs et Problèmes Techniques",
            Topic::Documentation => "Documentation",
            Topic::Performance => "Performance",
            Topic::Customization => "Personnalisation",
            Topic::Onboarding => "Processus d’Inscription",
            Topic::AdvancedFeatures => "Fonctionnalités Avancées",
            Topic::GeneralUserExperience => "Expérience Utilisateur Générale",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Labels compare case-insensitively after trimming, and a straight
/// apostrophe is accepted in place of the typographic one.
impl FromStr for Topic {
    type Err = UnknownTopic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_label(s);
        Topic::ALL
            .into_iter()
            .find(|t| normalize_label(t.label()) == wanted)
            .ok_or_else(|| UnknownTopic(s.to_string()))
    }
}

fn normalize_label(s: &str) -> String {
    s.trim().replace('\'', "’").to_lowercase()
}
