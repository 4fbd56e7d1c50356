use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Configuration problems that abort a request before any network call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown period key: '{0}'")]
    UnknownPeriod(String),
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Reporting period: one calendar month or the year aggregate.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKey {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
    #[default]
    Year,
}

/// Canonical period table: (key, external sheet name, display label).
///
/// The sheet names are fixed configuration of the source document. June,
/// July and September use the long forms that the document actually carries.
const PERIOD_TABLE: [(PeriodKey, &str, &str); 13] = [
    (PeriodKey::Jan, "jan", "Янв"),
    (PeriodKey::Feb, "feb", "Фев"),
    (PeriodKey::Mar, "mar", "Мар"),
    (PeriodKey::Apr, "apr", "Апр"),
    (PeriodKey::May, "may", "Май"),
    (PeriodKey::Jun, "june", "Июн"),
    (PeriodKey::Jul, "jule", "Июл"),
    (PeriodKey::Aug, "aug", "Авг"),
    (PeriodKey::Sep, "sept", "Сен"),
    (PeriodKey::Oct, "oct", "Окт"),
    (PeriodKey::Nov, "nov", "Ноя"),
    (PeriodKey::Dec, "dec", "Дек"),
    (PeriodKey::Year, "gen", "Год"),
];

impl PeriodKey {
    /// All periods in display order (months first, then the year aggregate).
    pub const ALL: [PeriodKey; 13] = [
        PeriodKey::Jan,
        PeriodKey::Feb,
        PeriodKey::Mar,
        PeriodKey::Apr,
        PeriodKey::May,
        PeriodKey::Jun,
        PeriodKey::Jul,
        PeriodKey::Aug,
        PeriodKey::Sep,
        PeriodKey::Oct,
        PeriodKey::Nov,
        PeriodKey::Dec,
        PeriodKey::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKey::Jan => "jan",
            PeriodKey::Feb => "feb",
            PeriodKey::Mar => "mar",
            PeriodKey::Apr => "apr",
            PeriodKey::May => "may",
            PeriodKey::Jun => "jun",
            PeriodKey::Jul => "jul",
            PeriodKey::Aug => "aug",
            PeriodKey::Sep => "sep",
            PeriodKey::Oct => "oct",
            PeriodKey::Nov => "nov",
            PeriodKey::Dec => "dec",
            PeriodKey::Year => "year",
        }
    }

    /// External sheet name this period is stored under.
    pub fn sheet_name(&self) -> Result<&'static str, ConfigError> {
        Self::lookup(*self)
            .map(|(_, sheet, _)| sheet)
            .ok_or_else(|| ConfigError::UnknownPeriod(self.as_str().to_string()))
    }

    /// Short label shown on the period selector.
    pub fn label(&self) -> &'static str {
        Self::lookup(*self).map(|(_, _, label)| label).unwrap_or("")
    }

    fn lookup(key: PeriodKey) -> Option<(PeriodKey, &'static str, &'static str)> {
        PERIOD_TABLE.iter().copied().find(|(k, _, _)| *k == key)
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        PeriodKey::ALL
            .into_iter()
            .find(|key| key.as_str() == wanted)
            .ok_or_else(|| ConfigError::UnknownPeriod(s.to_string()))
    }
}
