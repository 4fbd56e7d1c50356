use serde::Serialize;
use utoipa::ToSchema;

/// One organization row of a period sheet after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct OrgRecord {
    pub organization: String,
    pub total: u64,
    pub closed: u64,
    pub open: u64,
    pub cancelled: u64,
    pub erroneous: u64,
}

/// Column-wise sums over the records of a period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Totals {
    pub total: u64,
    pub closed: u64,
    pub open: u64,
    pub cancelled: u64,
    pub erroneous: u64,
}

impl Totals {
    pub fn add(&mut self, record: &OrgRecord) {
        self.total = self.total.saturating_add(record.total);
        self.closed = self.closed.saturating_add(record.closed);
        self.open = self.open.saturating_add(record.open);
        self.cancelled = self.cancelled.saturating_add(record.cancelled);
        self.erroneous = self.erroneous.saturating_add(record.erroneous);
    }
}

/// Normalized result for one period, in source row order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct PeriodReport {
    pub records: Vec<OrgRecord>,
    pub totals: Totals,
}

/// Flags for the headline cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Highlights {
    /// Every request of the period is closed (and there was at least one).
    pub all_closed: bool,
    /// Open requests remain.
    pub needs_attention: bool,
    pub has_cancellations: bool,
}

/// Per-organization slice of the period volume, used for charts.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrgShare {
    pub organization: String,
    pub total: u64,
    pub closed: u64,
    /// Fraction of the active total, in `0.0..=1.0`.
    pub share: f64,
}

impl PeriodReport {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn highlights(&self) -> Highlights {
        let t = &self.totals;
        Highlights {
            all_closed: t.total > 0 && t.closed == t.total,
            needs_attention: t.open > 0,
            has_cancellations: t.cancelled > 0,
        }
    }

    /// Records with a non-zero total, in source order.
    pub fn active_records(&self) -> impl Iterator<Item = &OrgRecord> {
        self.records.iter().filter(|r| r.total > 0)
    }

    /// Share of each active organization in the period volume.
    ///
    /// Empty when no organization has any requests, which the dashboard
    /// shows as "no chart data".
    pub fn distribution(&self) -> Vec<OrgShare> {
        let active_total: u64 = self
            .active_records()
            .fold(0u64, |acc, r| acc.saturating_add(r.total));

        self.active_records()
            .map(|r| OrgShare {
                organization: r.organization.clone(),
                total: r.total,
                closed: r.closed,
                share: if active_total == 0 {
                    0.0
                } else {
                    r.total as f64 / active_total as f64
                },
            })
            .collect()
    }
}
