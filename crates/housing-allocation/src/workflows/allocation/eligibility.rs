use serde::{Deserialize, Serialize};

use super::domain::{FlatType, MaritalStatus};
use crate::config::AllocationConfig;

const DEFAULT_SINGLE_MINIMUM_AGE: u8 = 35;
const DEFAULT_MARRIED_MINIMUM_AGE: u8 = 21;

/// Age and marital-status rules deciding which flat types an applicant may apply for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityPolicy {
    single_minimum_age: u8,
    married_minimum_age: u8,
}

impl EligibilityPolicy {
    pub const fn new(single_minimum_age: u8, married_minimum_age: u8) -> Self {
        Self {
            single_minimum_age,
            married_minimum_age,
        }
    }

    pub const fn single_minimum_age(&self) -> u8 {
        self.single_minimum_age
    }

    pub const fn married_minimum_age(&self) -> u8 {
        self.married_minimum_age
    }

    pub fn is_eligible(&self, age: u8, marital_status: MaritalStatus, flat_type: FlatType) -> bool {
        match marital_status {
            MaritalStatus::Single if age >= self.single_minimum_age => {
                flat_type == FlatType::smallest()
            }
            MaritalStatus::Married if age >= self.married_minimum_age => true,
            _ => false,
        }
    }

    pub fn eligible_flat_types(&self, age: u8, marital_status: MaritalStatus) -> Vec<FlatType> {
        FlatType::ALL
            .into_iter()
            .filter(|flat_type| self.is_eligible(age, marital_status, *flat_type))
            .collect()
    }
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SINGLE_MINIMUM_AGE, DEFAULT_MARRIED_MINIMUM_AGE)
    }
}

impl From<&AllocationConfig> for EligibilityPolicy {
    fn from(config: &AllocationConfig) -> Self {
        Self::new(config.single_minimum_age, config.married_minimum_age)
    }
}
