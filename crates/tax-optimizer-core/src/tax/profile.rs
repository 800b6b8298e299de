use serde::{Deserialize, Serialize};

/// Taxpayer context used for age-gated caps and checklist wording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxProfile {
    #[serde(default = "default_age")]
    pub age: u32,
    #[serde(default, alias = "userType", skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
}

fn default_age() -> u32 {
    30
}

impl Default for TaxProfile {
    fn default() -> Self {
        TaxProfile {
            age: default_age(),
            user_type: None,
        }
    }
}

impl TaxProfile {
    pub fn with_age(age: u32) -> Self {
        TaxProfile {
            age,
            ..TaxProfile::default()
        }
    }
}
