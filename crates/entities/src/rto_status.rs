//! RTO status entity definitions.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::Value;

/// A key of the summary counts table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryKey {
    Completed,
    PendingVlan,
    PendingMyAccess,
    PendingMyAccessEdp,
    PendingMyAccessPm,
    PendingUat,
    VlanInProgress,
    BusinessUatTroubleshooting,
    FirewallInProgress,
    GrandTotal,
}

impl SummaryKey {
    /// Every key, in the order uploads are validated.
    pub const ALL: [SummaryKey; 10] = [
        SummaryKey::Completed,
        SummaryKey::PendingVlan,
        SummaryKey::PendingMyAccess,
        SummaryKey::PendingMyAccessEdp,
        SummaryKey::PendingMyAccessPm,
        SummaryKey::PendingUat,
        SummaryKey::VlanInProgress,
        SummaryKey::BusinessUatTroubleshooting,
        SummaryKey::FirewallInProgress,
        SummaryKey::GrandTotal,
    ];

    /// Every key, in the order the summary table is displayed.
    pub const DISPLAY_ORDER: [SummaryKey; 10] = [
        SummaryKey::Completed,
        SummaryKey::PendingVlan,
        SummaryKey::PendingMyAccess,
        SummaryKey::PendingUat,
        SummaryKey::PendingMyAccessEdp,
        SummaryKey::PendingMyAccessPm,
        SummaryKey::VlanInProgress,
        SummaryKey::BusinessUatTroubleshooting,
        SummaryKey::FirewallInProgress,
        SummaryKey::GrandTotal,
    ];

    /// Returns the JSON field name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryKey::Completed => "completed",
            SummaryKey::PendingVlan => "pendingVlan",
            SummaryKey::PendingMyAccess => "pendingMyAccess",
            SummaryKey::PendingMyAccessEdp => "pendingMyAccessEdp",
            SummaryKey::PendingMyAccessPm => "pendingMyAccessPm",
            SummaryKey::PendingUat => "pendingUat",
            SummaryKey::VlanInProgress => "vlanInProgress",
            SummaryKey::BusinessUatTroubleshooting => "businessUatTroubleshooting",
            SummaryKey::FirewallInProgress => "firewallInProgress",
            SummaryKey::GrandTotal => "grandTotal",
        }
    }

    /// Returns the human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            SummaryKey::Completed => "Completed",
            SummaryKey::PendingVlan => "Pending with Project POC(VLAN Request Yet to raise)",
            SummaryKey::PendingMyAccess => "Pending with Project POC(MYAccess Yet to raise)",
            SummaryKey::PendingMyAccessEdp => "Pending with POC(MYAccess-EDP pending)",
            SummaryKey::PendingMyAccessPm => "Pending with POC(MYAccess-PM pending)",
            SummaryKey::PendingUat => "Pending with Business for UAT",
            SummaryKey::VlanInProgress => "VLAN request in progress",
            SummaryKey::BusinessUatTroubleshooting => {
                "Business UAT Testing Troubleshooting in progress"
            }
            SummaryKey::FirewallInProgress => "Firewall request in progress",
            SummaryKey::GrandTotal => "Grand Total",
        }
    }
}

/// Overall status counts of an upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SummaryCounts {
    pub completed: u64,
    pub pending_vlan: u64,
    pub pending_my_access: u64,
    pub pending_my_access_edp: u64,
    pub pending_my_access_pm: u64,
    pub pending_uat: u64,
    pub vlan_in_progress: u64,
    pub business_uat_troubleshooting: u64,
    pub firewall_in_progress: u64,
    pub grand_total: u64,
}

impl SummaryCounts {
    pub fn get(&self, key: SummaryKey) -> u64 {
        match key {
            SummaryKey::Completed => self.completed,
            SummaryKey::PendingVlan => self.pending_vlan,
            SummaryKey::PendingMyAccess => self.pending_my_access,
            SummaryKey::PendingMyAccessEdp => self.pending_my_access_edp,
            SummaryKey::PendingMyAccessPm => self.pending_my_access_pm,
            SummaryKey::PendingUat => self.pending_uat,
            SummaryKey::VlanInProgress => self.vlan_in_progress,
            SummaryKey::BusinessUatTroubleshooting => self.business_uat_troubleshooting,
            SummaryKey::FirewallInProgress => self.firewall_in_progress,
            SummaryKey::GrandTotal => self.grand_total,
        }
    }

    pub fn set(&mut self, key: SummaryKey, value: u64) {
        let slot = match key {
            SummaryKey::Completed => &mut self.completed,
            SummaryKey::PendingVlan => &mut self.pending_vlan,
            SummaryKey::PendingMyAccess => &mut self.pending_my_access,
            SummaryKey::PendingMyAccessEdp => &mut self.pending_my_access_edp,
            SummaryKey::PendingMyAccessPm => &mut self.pending_my_access_pm,
            SummaryKey::PendingUat => &mut self.pending_uat,
            SummaryKey::VlanInProgress => &mut self.vlan_in_progress,
            SummaryKey::BusinessUatTroubleshooting => &mut self.business_uat_troubleshooting,
            SummaryKey::FirewallInProgress => &mut self.firewall_in_progress,
            SummaryKey::GrandTotal => &mut self.grand_total,
        };
        *slot = value;
    }
}

/// A pending status broken down by age in the aging matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusCategory {
    FirewallInProgress,
    PendingUat,
    PendingMyAccess,
    PendingMyAccessEdp,
    PendingMyAccessPm,
    PendingVlan,
    VlanInProgress,
    BusinessUatTroubleshooting,
}

impl StatusCategory {
    /// Every category, in the order uploads are validated.
    pub const ALL: [StatusCategory; 8] = [
        StatusCategory::FirewallInProgress,
        StatusCategory::PendingUat,
        StatusCategory::PendingMyAccess,
        StatusCategory::PendingMyAccessEdp,
        StatusCategory::PendingMyAccessPm,
        StatusCategory::PendingVlan,
        StatusCategory::VlanInProgress,
        StatusCategory::BusinessUatTroubleshooting,
    ];

    /// Every category, in the order matrix rows are displayed.
    pub const DISPLAY_ORDER: [StatusCategory; 8] = [
        StatusCategory::PendingVlan,
        StatusCategory::PendingMyAccess,
        StatusCategory::PendingUat,
        StatusCategory::PendingMyAccessEdp,
        StatusCategory::PendingMyAccessPm,
        StatusCategory::VlanInProgress,
        StatusCategory::BusinessUatTroubleshooting,
        StatusCategory::FirewallInProgress,
    ];

    /// Returns the summary key carrying the same status.
    pub fn summary_key(&self) -> SummaryKey {
        match self {
            StatusCategory::FirewallInProgress => SummaryKey::FirewallInProgress,
            StatusCategory::PendingUat => SummaryKey::PendingUat,
            StatusCategory::PendingMyAccess => SummaryKey::PendingMyAccess,
            StatusCategory::PendingMyAccessEdp => SummaryKey::PendingMyAccessEdp,
            StatusCategory::PendingMyAccessPm => SummaryKey::PendingMyAccessPm,
            StatusCategory::PendingVlan => SummaryKey::PendingVlan,
            StatusCategory::VlanInProgress => SummaryKey::VlanInProgress,
            StatusCategory::BusinessUatTroubleshooting => SummaryKey::BusinessUatTroubleshooting,
        }
    }

    /// Returns the JSON field name.
    pub fn as_str(&self) -> &'static str {
        self.summary_key().as_str()
    }

    pub fn label(&self) -> &'static str {
        self.summary_key().label()
    }
}

/// An elapsed-time column of the aging matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeBucket {
    Within2Weeks,
    ThreeWeeks,
    FourWeeks,
    OneAndHalfToTwoMonths,
    TwoToTwoAndHalfMonths,
    GrandTotal,
}

impl TimeBucket {
    /// The elapsed-time buckets, without the grand total column.
    pub const AGES: [TimeBucket; 5] = [
        TimeBucket::Within2Weeks,
        TimeBucket::ThreeWeeks,
        TimeBucket::FourWeeks,
        TimeBucket::OneAndHalfToTwoMonths,
        TimeBucket::TwoToTwoAndHalfMonths,
    ];

    /// Every column, grand total last.
    pub const ALL: [TimeBucket; 6] = [
        TimeBucket::Within2Weeks,
        TimeBucket::ThreeWeeks,
        TimeBucket::FourWeeks,
        TimeBucket::OneAndHalfToTwoMonths,
        TimeBucket::TwoToTwoAndHalfMonths,
        TimeBucket::GrandTotal,
    ];

    /// Returns the JSON field name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeBucket::Within2Weeks => "within2Weeks",
            TimeBucket::ThreeWeeks => "c3weeks",
            TimeBucket::FourWeeks => "c4weeks",
            TimeBucket::OneAndHalfToTwoMonths => "c1_5to2months",
            TimeBucket::TwoToTwoAndHalfMonths => "c2to2_5months",
            TimeBucket::GrandTotal => "grandTotal",
        }
    }

    /// Returns the column header.
    pub fn label(&self) -> &'static str {
        match self {
            TimeBucket::Within2Weeks => "With in 2 Weeks",
            TimeBucket::ThreeWeeks => "3 Weeks",
            TimeBucket::FourWeeks => "4 Weeks",
            TimeBucket::OneAndHalfToTwoMonths => "1.5 - 2 Month",
            TimeBucket::TwoToTwoAndHalfMonths => "2 - 2.5 Month",
            TimeBucket::GrandTotal => "Grand Total",
        }
    }
}

/// One row of the aging matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgingRow {
    #[serde(rename = "within2Weeks")]
    pub within_2_weeks: u64,
    #[serde(rename = "c3weeks")]
    pub three_weeks: u64,
    #[serde(rename = "c4weeks")]
    pub four_weeks: u64,
    #[serde(rename = "c1_5to2months")]
    pub one_and_half_to_two_months: u64,
    #[serde(rename = "c2to2_5months")]
    pub two_to_two_and_half_months: u64,
    #[serde(rename = "grandTotal")]
    pub grand_total: u64,
}

impl AgingRow {
    pub fn get(&self, bucket: TimeBucket) -> u64 {
        match bucket {
            TimeBucket::Within2Weeks => self.within_2_weeks,
            TimeBucket::ThreeWeeks => self.three_weeks,
            TimeBucket::FourWeeks => self.four_weeks,
            TimeBucket::OneAndHalfToTwoMonths => self.one_and_half_to_two_months,
            TimeBucket::TwoToTwoAndHalfMonths => self.two_to_two_and_half_months,
            TimeBucket::GrandTotal => self.grand_total,
        }
    }

    pub fn set(&mut self, bucket: TimeBucket, value: u64) {
        let slot = match bucket {
            TimeBucket::Within2Weeks => &mut self.within_2_weeks,
            TimeBucket::ThreeWeeks => &mut self.three_weeks,
            TimeBucket::FourWeeks => &mut self.four_weeks,
            TimeBucket::OneAndHalfToTwoMonths => &mut self.one_and_half_to_two_months,
            TimeBucket::TwoToTwoAndHalfMonths => &mut self.two_to_two_and_half_months,
            TimeBucket::GrandTotal => &mut self.grand_total,
        };
        *slot = value;
    }
}

/// Pending items per status, broken down by elapsed time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingMatrix {
    /// One row per status category. Stored rows for unknown categories
    /// are dropped on load.
    #[serde(default, deserialize_with = "known_categories")]
    pub statuses: BTreeMap<StatusCategory, AgingRow>,
    /// Column totals.
    #[serde(default)]
    pub totals: AgingRow,
}

fn known_categories<'de, D>(deserializer: D) -> Result<BTreeMap<StatusCategory, AgingRow>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    raw.into_iter()
        .filter_map(|(key, row)| {
            let category = StatusCategory::ALL.into_iter().find(|c| c.as_str() == key)?;
            Some(AgingRow::deserialize(row).map(|row| (category, row)).map_err(D::Error::custom))
        })
        .collect()
}

/// A validated upload, before it is stamped and stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RtoStatusUpload {
    pub summary_counts: SummaryCounts,
    pub aging_matrix: AgingMatrix,
}

/// An uploaded RTO status snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtoStatusEntry {
    /// Sequential ID. Entries written before IDs existed read as 0.
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub summary_counts: SummaryCounts,
    #[serde(default)]
    pub aging_matrix: AgingMatrix,
    /// Email of the uploading account.
    #[serde(rename = "uploadedBy", default)]
    pub uploaded_by: String,
    #[serde(rename = "uploadedAt")]
    pub uploaded_at: DateTime<Utc>,
}

impl RtoStatusEntry {
    /// Stamps an upload with its ID, uploader and upload time.
    pub fn new(
        id: u64,
        upload: RtoStatusUpload,
        uploaded_by: impl Into<String>,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            summary_counts: upload.summary_counts,
            aging_matrix: upload.aging_matrix,
            uploaded_by: uploaded_by.into(),
            uploaded_at,
        }
    }

    /// Returns the upload time as an ISO 8601 string with milliseconds.
    pub fn uploaded_at_iso(&self) -> String {
        self.uploaded_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_wire_names() {
        let mut counts = SummaryCounts::default();
        for (value, key) in SummaryKey::ALL.into_iter().enumerate() {
            counts.set(key, value as u64);
        }

        let json = serde_json::to_value(counts).unwrap();
        for (value, key) in SummaryKey::ALL.into_iter().enumerate() {
            assert_eq!(json[key.as_str()], value as u64, "field {}", key.as_str());
        }
    }

    #[test]
    fn test_aging_row_wire_names() {
        let mut row = AgingRow::default();
        for (value, bucket) in TimeBucket::ALL.into_iter().enumerate() {
            row.set(bucket, value as u64 + 1);
        }

        let json = serde_json::to_value(row).unwrap();
        for (value, bucket) in TimeBucket::ALL.into_iter().enumerate() {
            assert_eq!(json[bucket.as_str()], value as u64 + 1);
        }
    }

    #[test]
    fn test_category_keys_match_summary_keys() {
        for category in StatusCategory::ALL {
            let json = serde_json::to_value(category).unwrap();
            assert_eq!(json, category.as_str());
        }
    }

    #[test]
    fn test_unknown_matrix_categories_are_dropped() {
        let json = r#"{
            "id": 3,
            "aging_matrix": {
                "statuses": {
                    "pendingVlan": { "within2Weeks": 2 },
                    "onHold": { "within2Weeks": "n/a" }
                },
                "totals": { "within2Weeks": 2 }
            },
            "uploadedAt": "2024-05-01T10:00:00.000Z"
        }"#;
        let entry: RtoStatusEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.aging_matrix.statuses.len(), 1);
        assert_eq!(
            entry.aging_matrix.statuses[&StatusCategory::PendingVlan].within_2_weeks,
            2
        );

        let bad_known_row = r#"{ "statuses": { "pendingUat": { "c3weeks": -1 } } }"#;
        assert!(serde_json::from_str::<AgingMatrix>(bad_known_row).is_err());
    }

    #[test]
    fn test_legacy_entry_without_id() {
        let json = r#"{
            "summary_counts": { "completed": 4 },
            "aging_matrix": { "statuses": {}, "totals": {} },
            "uploadedBy": "uploader@example.com",
            "uploadedAt": "2024-05-01T10:00:00.000Z"
        }"#;
        let entry: RtoStatusEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id, 0);
        assert_eq!(entry.summary_counts.completed, 4);
        assert_eq!(entry.uploaded_at_iso(), "2024-05-01T10:00:00.000Z");
    }
}
