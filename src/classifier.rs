//! Status and risk derivation.
//!
//! Pure, total functions mapping a raw metric to a tier. One canonical
//! threshold set per metric:
//!
//! | Metric | Tiers |
//! |---|---|
//! | total cases | critical ≥ 60, high ≥ 40, medium ≥ 20, else low |
//! | bed occupancy % | critical ≥ 90, high ≥ 75, medium ≥ 50, else low |
//! | vaccination rate % | completed ≥ 90, on-track ≥ 80, behind ≥ 60, else critical |
//! | vaccination priority | urgent < 60, high < 70, medium < 80, else low |
//! | medicine stock/required % | critical < 50, low < 75, medium < 100, else good |

use crate::models::enums::{
    CaseStatus, MedicineStatus, OccupancyStatus, VaccinationPriority, VaccinationStatus,
};

pub fn case_status(total_cases: u32) -> CaseStatus {
    match total_cases {
        60.. => CaseStatus::Critical,
        40..=59 => CaseStatus::High,
        20..=39 => CaseStatus::Medium,
        _ => CaseStatus::Low,
    }
}

pub fn occupancy_status(occupancy_pct: f64) -> OccupancyStatus {
    if occupancy_pct >= 90.0 {
        OccupancyStatus::Critical
    } else if occupancy_pct >= 75.0 {
        OccupancyStatus::High
    } else if occupancy_pct >= 50.0 {
        OccupancyStatus::Medium
    } else {
        OccupancyStatus::Low
    }
}

pub fn vaccination_status(rate: f64) -> VaccinationStatus {
    if rate >= 90.0 {
        VaccinationStatus::Completed
    } else if rate >= 80.0 {
        VaccinationStatus::OnTrack
    } else if rate >= 60.0 {
        VaccinationStatus::Behind
    } else {
        VaccinationStatus::Critical
    }
}

pub fn vaccination_priority(rate: f64) -> VaccinationPriority {
    if rate < 60.0 {
        VaccinationPriority::Urgent
    } else if rate < 70.0 {
        VaccinationPriority::High
    } else if rate < 80.0 {
        VaccinationPriority::Medium
    } else {
        VaccinationPriority::Low
    }
}

/// Band the stock/required ratio. Nothing required means nothing missing.
pub fn medicine_status(stock: u32, required: u32) -> MedicineStatus {
    if required == 0 {
        return MedicineStatus::Good;
    }
    let ratio = f64::from(stock) / f64::from(required) * 100.0;
    if ratio < 50.0 {
        MedicineStatus::Critical
    } else if ratio < 75.0 {
        MedicineStatus::Low
    } else if ratio < 100.0 {
        MedicineStatus::Medium
    } else {
        MedicineStatus::Good
    }
}

/// Heatmap weight for a case tier.
pub fn heat_intensity(status: CaseStatus) -> f64 {
    match status {
        CaseStatus::Critical => 0.9,
        CaseStatus::High => 0.7,
        CaseStatus::Medium => 0.5,
        CaseStatus::Low => 0.3,
    }
}

/// `part / whole * 100`, rounded to one decimal. Zero when `whole` is zero.
pub fn percent(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round1(f64::from(part) / f64::from(whole) * 100.0)
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_status_boundaries() {
        assert_eq!(case_status(0), CaseStatus::Low);
        assert_eq!(case_status(19), CaseStatus::Low);
        assert_eq!(case_status(20), CaseStatus::Medium);
        assert_eq!(case_status(39), CaseStatus::Medium);
        assert_eq!(case_status(40), CaseStatus::High);
        assert_eq!(case_status(59), CaseStatus::High);
        assert_eq!(case_status(60), CaseStatus::Critical);
        assert_eq!(case_status(u32::MAX), CaseStatus::Critical);
    }

    #[test]
    fn case_status_is_monotonic() {
        let mut previous = case_status(0);
        for total in 1..200 {
            let current = case_status(total);
            assert!(current >= previous, "severity dropped at {total}");
            previous = current;
        }
    }

    #[test]
    fn occupancy_boundaries() {
        assert_eq!(occupancy_status(49.9), OccupancyStatus::Low);
        assert_eq!(occupancy_status(50.0), OccupancyStatus::Medium);
        assert_eq!(occupancy_status(74.9), OccupancyStatus::Medium);
        assert_eq!(occupancy_status(75.0), OccupancyStatus::High);
        assert_eq!(occupancy_status(90.0), OccupancyStatus::Critical);
        assert_eq!(occupancy_status(120.0), OccupancyStatus::Critical);
    }

    #[test]
    fn vaccination_status_and_priority() {
        assert_eq!(vaccination_status(91.0), VaccinationStatus::Completed);
        assert_eq!(vaccination_status(85.0), VaccinationStatus::OnTrack);
        assert_eq!(vaccination_status(68.0), VaccinationStatus::Behind);
        assert_eq!(vaccination_status(59.9), VaccinationStatus::Critical);

        assert_eq!(vaccination_priority(59.9), VaccinationPriority::Urgent);
        assert_eq!(vaccination_priority(68.0), VaccinationPriority::High);
        assert_eq!(vaccination_priority(72.0), VaccinationPriority::Medium);
        assert_eq!(vaccination_priority(80.0), VaccinationPriority::Low);
    }

    #[test]
    fn medicine_banding() {
        assert_eq!(medicine_status(20, 40), MedicineStatus::Low);
        assert_eq!(medicine_status(19, 40), MedicineStatus::Critical);
        assert_eq!(medicine_status(30, 40), MedicineStatus::Medium);
        assert_eq!(medicine_status(40, 40), MedicineStatus::Good);
        assert_eq!(medicine_status(0, 0), MedicineStatus::Good);
    }

    #[test]
    fn percent_rounds_to_one_decimal() {
        assert_eq!(percent(27_200, 40_000), 68.0);
        assert_eq!(percent(1, 3), 33.3);
        assert_eq!(percent(5, 0), 0.0);
    }
}
