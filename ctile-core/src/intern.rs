//! C4: attribute interner. Deduplicates `i32` values into a per-layer value
//! table, returning stable, insertion-ordered offsets. Also carries the
//! exact line/point value-table layout constants from the spec, since they
//! are this component's contract with the assembler.

use std::collections::HashMap;

/// Offsets `0..128` of the line layer's value table are the literal
/// `uint64` values `0..127` — the clamped speed range.
pub const SPEED_TABLE_SIZE: usize = 128;
pub const BOOL_TRUE_OFFSET: usize = SPEED_TABLE_SIZE;
pub const BOOL_FALSE_OFFSET: usize = SPEED_TABLE_SIZE + 1;
pub const DATASOURCE_BASE_OFFSET: usize = SPEED_TABLE_SIZE + 2;

pub const LINE_KEYS: [&str; 4] = ["speed", "is_small", "datasource", "duration"];
pub const POINT_KEYS: [&str; 3] = ["bearing_in", "bearing_out", "weight"];

/// Value-table offset of `datasource_id` within the datasource sub-table.
#[must_use]
pub fn datasource_offset(datasource_id: u8) -> usize {
    DATASOURCE_BASE_OFFSET + usize::from(datasource_id)
}

/// The offset at which the per-`line_ints`-entry `double` values begin,
/// immediately after the datasource sub-table (one entry per id
/// `0..=max_datasource_id`).
#[must_use]
pub fn duration_base_offset(max_datasource_id: u8) -> usize {
    DATASOURCE_BASE_OFFSET + usize::from(max_datasource_id) + 1
}

/// An ordered, deduplicated table of `i32` attribute values. Re-interning an
/// already-seen value returns its original offset; a new value is appended
/// and assigned the next offset.
#[derive(Debug, Default)]
pub struct InternTable {
    values: Vec<i32>,
    index: HashMap<i32, usize>,
}

impl InternTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, value: i32) -> usize {
        if let Some(&offset) = self.index.get(&value) {
            return offset;
        }
        let offset = self.values.len();
        self.values.push(value);
        self.index.insert(value, offset);
        offset
    }

    #[must_use]
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_values_share_an_offset() {
        let mut t = InternTable::new();
        assert_eq!(t.intern(150), 0);
        assert_eq!(t.intern(200), 1);
        assert_eq!(t.intern(150), 0);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn negative_values_intern_like_any_other() {
        let mut t = InternTable::new();
        assert_eq!(t.intern(-5), 0);
        assert_eq!(t.values(), &[-5]);
    }

    #[test]
    fn layout_offsets_match_spec_formulas() {
        assert_eq!(BOOL_TRUE_OFFSET, 128);
        assert_eq!(BOOL_FALSE_OFFSET, 129);
        assert_eq!(datasource_offset(0), 130);
        assert_eq!(duration_base_offset(2), 133); // 130 + 2 + 1
    }
}
