//! Dashboard aggregations over an uploaded status.

use serde::{Deserialize, Serialize};

use crate::{AgingMatrix, AgingRow, RtoStatusEntry, SummaryCounts, SummaryKey, TimeBucket};

/// Statuses waiting on the business side.
pub const BUSINESS_PENDING: [SummaryKey; 5] = [
    SummaryKey::PendingVlan,
    SummaryKey::PendingMyAccess,
    SummaryKey::PendingMyAccessEdp,
    SummaryKey::PendingMyAccessPm,
    SummaryKey::PendingUat,
];

/// Statuses waiting on IT.
pub const IT_PENDING: [SummaryKey; 3] = [
    SummaryKey::VlanInProgress,
    SummaryKey::FirewallInProgress,
    SummaryKey::BusinessUatTroubleshooting,
];

impl SummaryCounts {
    /// Sums every status count, ignoring the stored grand total.
    /// Saturates at `u64::MAX`.
    pub fn computed_grand_total(&self) -> u64 {
        SummaryKey::ALL
            .into_iter()
            .filter(|key| *key != SummaryKey::GrandTotal)
            .map(|key| self.get(key))
            .fold(0, u64::saturating_add)
    }

    /// Returns a copy whose grand total is recomputed from the counts.
    pub fn with_computed_grand_total(mut self) -> Self {
        self.grand_total = self.computed_grand_total();
        self
    }

    fn sum_of(&self, keys: &[SummaryKey]) -> u64 {
        keys.iter().map(|key| self.get(*key)).fold(0, u64::saturating_add)
    }
}

impl AgingMatrix {
    /// Returns a copy with row grand totals and column totals derived from
    /// the elapsed-time buckets.
    pub fn recomputed(&self) -> Self {
        let mut totals = AgingRow::default();
        let statuses = self
            .statuses
            .iter()
            .map(|(category, row)| {
                let mut row = *row;
                row.grand_total = TimeBucket::AGES
                    .iter()
                    .map(|b| row.get(*b))
                    .fold(0, u64::saturating_add);
                for bucket in TimeBucket::ALL {
                    totals.set(bucket, totals.get(bucket).saturating_add(row.get(bucket)));
                }
                (*category, row)
            })
            .collect();

        Self { statuses, totals }
    }
}

/// Formats `part` as a percentage of `total` with two decimals.
fn percentage(part: u64, total: u64) -> String {
    if total == 0 {
        return "0.00".to_string();
    }
    format!("{:.2}", part as f64 / total as f64 * 100.0)
}

/// Pending actions split between the business and IT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingBreakdown {
    pub business: u64,
    pub it: u64,
    pub total: u64,
    /// Business share, e.g. `"62.50"`.
    pub business_percentage: String,
    /// IT share, e.g. `"37.50"`.
    pub it_percentage: String,
}

impl PendingBreakdown {
    pub fn from_counts(counts: &SummaryCounts) -> Self {
        let business = counts.sum_of(&BUSINESS_PENDING);
        let it = counts.sum_of(&IT_PENDING);
        let total = business.saturating_add(it);
        Self {
            business,
            it,
            total,
            business_percentage: percentage(business, total),
            it_percentage: percentage(it, total),
        }
    }
}

/// The latest status as the dashboard presents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Upload the summary was computed from.
    pub entry_id: u64,
    /// Counts with the grand total recomputed.
    pub summary_counts: SummaryCounts,
    pub pending: PendingBreakdown,
    /// Matrix with row and column totals recomputed.
    pub aging_matrix: AgingMatrix,
    pub uploaded_by: String,
    pub uploaded_at: String,
}

impl DashboardSummary {
    pub fn from_entry(entry: &RtoStatusEntry) -> Self {
        let summary_counts = entry.summary_counts.with_computed_grand_total();
        Self {
            entry_id: entry.id,
            pending: PendingBreakdown::from_counts(&summary_counts),
            summary_counts,
            aging_matrix: entry.aging_matrix.recomputed(),
            uploaded_by: entry.uploaded_by.clone(),
            uploaded_at: entry.uploaded_at_iso(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{RtoStatusUpload, StatusCategory};

    #[test]
    fn test_all_zero_counts() {
        let counts = SummaryCounts::default();
        assert_eq!(counts.computed_grand_total(), 0);

        let pending = PendingBreakdown::from_counts(&counts);
        assert_eq!(pending.total, 0);
        assert_eq!(pending.business_percentage, "0.00");
        assert_eq!(pending.it_percentage, "0.00");
    }

    #[test]
    fn test_grand_total_ignores_stored_value() {
        let counts = SummaryCounts {
            completed: 10,
            pending_vlan: 2,
            firewall_in_progress: 3,
            grand_total: 999,
            ..Default::default()
        };
        assert_eq!(counts.computed_grand_total(), 15);
        assert_eq!(counts.with_computed_grand_total().grand_total, 15);
    }

    #[test]
    fn test_pending_breakdown() {
        let counts = SummaryCounts {
            completed: 50,
            pending_vlan: 1,
            pending_uat: 1,
            vlan_in_progress: 1,
            ..Default::default()
        };
        let pending = PendingBreakdown::from_counts(&counts);
        assert_eq!(pending.business, 2);
        assert_eq!(pending.it, 1);
        assert_eq!(pending.total, 3);
        assert_eq!(pending.business_percentage, "66.67");
        assert_eq!(pending.it_percentage, "33.33");
    }

    #[test]
    fn test_recomputed_matrix() {
        let mut matrix = AgingMatrix::default();
        let mut row = AgingRow::default();
        row.set(TimeBucket::Within2Weeks, 2);
        row.set(TimeBucket::FourWeeks, 3);
        matrix.statuses.insert(StatusCategory::PendingVlan, row);
        matrix.statuses.insert(StatusCategory::VlanInProgress, row);

        let recomputed = matrix.recomputed();
        assert_eq!(recomputed.statuses[&StatusCategory::PendingVlan].grand_total, 5);
        assert_eq!(recomputed.totals.within_2_weeks, 4);
        assert_eq!(recomputed.totals.four_weeks, 6);
        assert_eq!(recomputed.totals.grand_total, 10);
    }

    #[test]
    fn test_sums_saturate() {
        let counts = SummaryCounts {
            completed: u64::MAX,
            pending_vlan: 1,
            vlan_in_progress: u64::MAX,
            ..Default::default()
        };
        assert_eq!(counts.computed_grand_total(), u64::MAX);

        let pending = PendingBreakdown::from_counts(&counts);
        assert_eq!(pending.total, u64::MAX);
        assert_eq!(pending.it_percentage, "100.00");

        let mut matrix = AgingMatrix::default();
        let mut row = AgingRow::default();
        row.set(TimeBucket::Within2Weeks, u64::MAX);
        row.set(TimeBucket::FourWeeks, 1);
        matrix.statuses.insert(StatusCategory::PendingVlan, row);
        matrix.statuses.insert(StatusCategory::PendingUat, row);

        let recomputed = matrix.recomputed();
        assert_eq!(recomputed.statuses[&StatusCategory::PendingUat].grand_total, u64::MAX);
        assert_eq!(recomputed.totals.within_2_weeks, u64::MAX);
        assert_eq!(recomputed.totals.four_weeks, 2);
    }

    #[test]
    fn test_dashboard_summary() {
        let mut upload = RtoStatusUpload::default();
        upload.summary_counts.completed = 7;
        upload.summary_counts.pending_my_access = 1;
        let entry = RtoStatusEntry::new(4, upload, "uploader@example.com", Utc::now());

        let summary = DashboardSummary::from_entry(&entry);
        assert_eq!(summary.entry_id, 4);
        assert_eq!(summary.summary_counts.grand_total, 8);
        assert_eq!(summary.pending.business_percentage, "100.00");
    }
}
