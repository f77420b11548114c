use std::fmt;

/// Narrowest zero padding used for entry names (`001.jpg`).
pub const MIN_PAD_WIDTH: usize = 3;

/// 1-based position of an image reference within its page.
///
/// The numeric value is the ordering key across every stage; the padded text
/// form only exists for file and entry names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SequenceNumber(u32);

impl SequenceNumber {
    /// Sequence number for the 0-based `index` of a reference list.
    pub fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).map_or(u32::MAX, |i| i.saturating_add(1)))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn padded(self, width: usize) -> String {
        format!("{:0width$}", self.0, width = width)
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pad width for a page with `total` references: wide enough for the last
/// number, never narrower than [`MIN_PAD_WIDTH`].
pub fn pad_width(total: usize) -> usize {
    total.to_string().len().max(MIN_PAD_WIDTH)
}
