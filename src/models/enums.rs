use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
///
/// The `default = Variant` form also implements `Default`. Derived status
/// fields use it since they are optional on the wire and re-derived by the
/// receiver.
///
/// Variants are declared from least to most severe where a severity order
/// exists, so the derived `Ord` can be used for ranking.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
    ($name:ident default = $default:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        str_enum!($name { $($variant => $s),+ });

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }
    };
}

str_enum!(CaseStatus default = Low {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

str_enum!(OccupancyStatus default = Low {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

str_enum!(VaccinationStatus default = Critical {
    Completed => "completed",
    OnTrack => "on-track",
    Behind => "behind",
    Critical => "critical",
});

str_enum!(VaccinationPriority default = Urgent {
    Low => "low",
    Medium => "medium",
    High => "high",
    Urgent => "urgent",
});

str_enum!(MedicineStatus default = Good {
    Good => "good",
    Medium => "medium",
    Low => "low",
    Critical => "critical",
});

str_enum!(AlertType {
    Warning => "warning",
    Info => "info",
    Success => "success",
    Error => "error",
});

str_enum!(AlertSeverity {
    Low => "low",
    Medium => "medium",
    High => "high",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn case_status_round_trips_through_str() {
        for status in [
            CaseStatus::Low,
            CaseStatus::Medium,
            CaseStatus::High,
            CaseStatus::Critical,
        ] {
            assert_eq!(CaseStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn vaccination_status_uses_hyphenated_wire_name() {
        let json = serde_json::to_string(&VaccinationStatus::OnTrack).unwrap();
        assert_eq!(json, "\"on-track\"");
        let parsed: VaccinationStatus = serde_json::from_str("\"on-track\"").unwrap();
        assert_eq!(parsed, VaccinationStatus::OnTrack);
    }

    #[test]
    fn unknown_value_is_invalid_enum() {
        let err = AlertType::from_str("panic").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidEnum { .. }));
    }

    #[test]
    fn derived_statuses_default_to_declared_variant() {
        assert_eq!(CaseStatus::default(), CaseStatus::Low);
        assert_eq!(OccupancyStatus::default(), OccupancyStatus::Low);
        assert_eq!(VaccinationStatus::default(), VaccinationStatus::Critical);
        assert_eq!(VaccinationPriority::default(), VaccinationPriority::Urgent);
        assert_eq!(MedicineStatus::default(), MedicineStatus::Good);
    }

    #[test]
    fn case_status_orders_by_severity() {
        assert!(CaseStatus::Low < CaseStatus::Medium);
        assert!(CaseStatus::High < CaseStatus::Critical);
    }
}
