/// Column layout of a report sheet.
///
/// Each period sheet carries a title block followed by one row per
/// organization. The fields below are mapped by ordinal position, the row
/// window by configuration. Nothing in the pipeline indexes cells by literal
/// numbers; everything goes through [`Field::position`] and [`RowWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Organization,
    Total,
    Closed,
    Open,
    Cancelled,
    Erroneous,
}

impl Field {
    /// Fields in sheet order.
    pub const ALL: [Field; 6] = [
        Field::Organization,
        Field::Total,
        Field::Closed,
        Field::Open,
        Field::Cancelled,
        Field::Erroneous,
    ];

    /// The numeric counters, in sheet order.
    pub const COUNTERS: [Field; 5] = [
        Field::Total,
        Field::Closed,
        Field::Open,
        Field::Cancelled,
        Field::Erroneous,
    ];

    /// Zero-based column index within the fetched window.
    pub fn position(&self) -> usize {
        match self {
            Field::Organization => 0,
            Field::Total => 1,
            Field::Closed => 2,
            Field::Open => 3,
            Field::Cancelled => 4,
            Field::Erroneous => 5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Field::Organization => "organization",
            Field::Total => "total",
            Field::Closed => "closed",
            Field::Open => "open",
            Field::Cancelled => "cancelled",
            Field::Erroneous => "erroneous",
        }
    }
}

/// Number of columns every admitted row is normalized to.
pub const SCHEMA_WIDTH: usize = Field::ALL.len();

/// Rectangular block of the sheet that holds the data rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowWindow {
    /// Title/header rows above the data.
    pub skip_rows: u32,
    /// Data rows read after the header block.
    pub data_rows: u32,
}

impl RowWindow {
    /// Three title rows, ten organization rows.
    pub const DEFAULT: RowWindow = RowWindow {
        skip_rows: 3,
        data_rows: 10,
    };

    /// A1 notation for the window, e.g. `A4:F13`.
    ///
    /// An A1 range cannot be empty, so a window with `data_rows == 0` still
    /// covers its first row.
    pub fn a1_range(&self) -> String {
        let first_row = self.skip_rows + 1;
        let last_row = self.skip_rows + self.data_rows.max(1);
        format!(
            "A{}:{}{}",
            first_row,
            column_letters(SCHEMA_WIDTH - 1),
            last_row
        )
    }
}

impl Default for RowWindow {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Spreadsheet column letters for a zero-based index (0 -> A, 25 -> Z, 26 -> AA).
pub fn column_letters(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}
