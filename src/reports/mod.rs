//! Financial aggregation over the booking and staff collections.
//!
//! Everything here is pure and total: a dangling staff reference or an
//! unparseable booking date contributes nothing rather than failing.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::{Booking, Staff};

/// Earned/paid totals for one known staff member.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffLedgerEntry {
    pub staff_id: String,
    pub name: String,
    pub earned: f64,
    pub paid: f64,
    pub outstanding: f64,
}

/// Studio-wide financial totals plus the per-staff ledger.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub gross_revenue: f64,
    pub payroll_cost: f64,
    pub net_profit: f64,
    pub staff_ledger: Vec<StaffLedgerEntry>,
}

/// Revenue and profit for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    /// 1-based calendar month.
    pub month: u32,
    pub revenue: f64,
    pub profit: f64,
}

/// Fold the collections into gross revenue, payroll cost, net profit, and a
/// per-staff ledger.
///
/// Fees on assignments referencing unknown staff ids count toward payroll
/// cost but appear in no ledger entry. Staff with no assignments report
/// zeros.
pub fn financial_summary(bookings: &[Booking], staff: &[Staff]) -> FinancialSummary {
    let mut gross_revenue = 0.0;
    let mut payroll_cost = 0.0;
    let mut fees: HashMap<&str, (f64, f64)> = staff
        .iter()
        .map(|s| (s.id.as_str(), (0.0, 0.0)))
        .collect();

    for booking in bookings {
        gross_revenue += booking.revenue;
        for assignment in &booking.assignments {
            payroll_cost += assignment.fee;
            if let Some((earned, paid)) = fees.get_mut(assignment.staff_id.as_str()) {
                *earned += assignment.fee;
                if assignment.is_paid {
                    *paid += assignment.fee;
                }
            }
        }
    }

    let staff_ledger = staff
        .iter()
        .map(|s| {
            let (earned, paid) = fees.get(s.id.as_str()).copied().unwrap_or((0.0, 0.0));
            StaffLedgerEntry {
                staff_id: s.id.clone(),
                name: s.name.clone(),
                earned,
                paid,
                outstanding: earned - paid,
            }
        })
        .collect();

    FinancialSummary {
        gross_revenue,
        payroll_cost,
        net_profit: gross_revenue - payroll_cost,
        staff_ledger,
    }
}

/// Revenue and profit per calendar month of `year`, always twelve points.
///
/// Months without bookings report zeros, not absence.
pub fn monthly_series(bookings: &[Booking], year: i32) -> Vec<MonthlyPoint> {
    let mut points: Vec<MonthlyPoint> = (1..=12)
        .map(|month| MonthlyPoint {
            month,
            revenue: 0.0,
            profit: 0.0,
        })
        .collect();

    for booking in bookings {
        let Ok(date) = NaiveDate::parse_from_str(&booking.date, "%Y-%m-%d") else {
            continue;
        };
        if date.year() != year {
            continue;
        }

        let fees: f64 = booking.assignments.iter().map(|a| a.fee).sum();
        let point = &mut points[date.month0() as usize];
        point.revenue += booking.revenue;
        point.profit += booking.revenue - fees;
    }

    points
}
