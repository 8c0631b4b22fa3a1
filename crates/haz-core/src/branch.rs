//! # Branch Hubs
//!
//! The operator's four regional depots. Each branch has a fixed hub
//! coordinate used as the origin for distance-based dispatch decisions.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ValidationError;
use crate::geo::Coordinates;

/// One of the four regional branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Branch {
    /// Johannesburg.
    #[serde(rename = "JNB")]
    Jnb,
    /// Cape Town.
    #[serde(rename = "CPT")]
    Cpt,
    /// Durban / KwaZulu-Natal.
    #[serde(rename = "KZN")]
    Kzn,
    /// Gqeberha (Port Elizabeth).
    #[serde(rename = "PLZ")]
    Plz,
}

impl Branch {
    /// All branches, in dispatch-priority order.
    pub const ALL: [Branch; 4] = [Branch::Jnb, Branch::Cpt, Branch::Kzn, Branch::Plz];

    /// The branch's fixed hub coordinate.
    pub fn hub(self) -> Coordinates {
        match self {
            Branch::Jnb => Coordinates::new(-26.2041, 28.0473),
            Branch::Cpt => Coordinates::new(-33.9249, 18.4241),
            Branch::Kzn => Coordinates::new(-29.8579, 31.0292),
            Branch::Plz => Coordinates::new(-33.9608, 25.6022),
        }
    }

    /// Branch code as it appears on waybills and in the API.
    pub fn as_str(self) -> &'static str {
        match self {
            Branch::Jnb => "JNB",
            Branch::Cpt => "CPT",
            Branch::Kzn => "KZN",
            Branch::Plz => "PLZ",
        }
    }
}

impl std::str::FromStr for Branch {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JNB" => Ok(Branch::Jnb),
            "CPT" => Ok(Branch::Cpt),
            "KZN" => Ok(Branch::Kzn),
            "PLZ" => Ok(Branch::Plz),
            other => Err(ValidationError::UnknownBranch(other.to_string())),
        }
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{distance_km, Leg};

    #[test]
    fn branch_parses_codes() {
        assert_eq!("JNB".parse::<Branch>().unwrap(), Branch::Jnb);
        assert_eq!("PLZ".parse::<Branch>().unwrap(), Branch::Plz);
        assert!("DUR".parse::<Branch>().is_err());
    }

    #[test]
    fn branch_serde_uses_codes() {
        let json = serde_json::to_string(&Branch::Kzn).unwrap();
        assert_eq!(json, r#""KZN""#);
        let back: Branch = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Branch::Kzn);
    }

    #[test]
    fn hubs_are_mutually_remote() {
        // Every pair of hubs is beyond driver range of each other, which is
        // why inter-branch movements always go to a carrier.
        for a in Branch::ALL {
            for b in Branch::ALL {
                if a != b {
                    assert_eq!(
                        Leg::classify(a.hub(), b.hub()),
                        Leg::Remote,
                        "{a} → {b} was {} km",
                        distance_km(a.hub(), b.hub())
                    );
                }
            }
        }
    }
}
