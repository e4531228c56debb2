use serde::{Deserialize, Serialize};

/// Number of distinct function keys: every value a 16-bit cell can hold.
pub const FUNCTION_KEYS: usize = u16::MAX as usize + 1;

/// A half-open slice `[start, end)` of the opcode stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Range {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Functions declared so far, keyed by the cell value seen at `(`.
///
/// Keys are only known at run time, so the table starts empty and is filled
/// as `(` opcodes execute.
#[derive(Debug, Clone)]
pub struct FunctionTable {
    ranges: Vec<Range>,
    /// Keys in declaration order, paired with the opcode index of their `(`.
    definitions: Vec<(u16, usize)>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self {
            ranges: vec![Range::default(); FUNCTION_KEYS],
            definitions: Vec::new(),
        }
    }

    /// Records a body for `key`; `false` if the key already has one.
    pub fn try_define(&mut self, key: u16, declaration: usize, body: Range) -> bool {
        let slot = &mut self.ranges[key as usize];
        if !slot.is_empty() {
            return false;
        }
        *slot = body;
        self.definitions.push((key, declaration));
        true
    }

    /// Body of `key`, or `None` if it was never defined.
    pub fn get(&self, key: u16) -> Option<Range> {
        let range = self.ranges[key as usize];
        (!range.is_empty()).then_some(range)
    }

    pub fn definitions(&self) -> &[(u16, usize)] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for FunctionTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_key() {
        let table = FunctionTable::new();
        assert_eq!(table.get(0), None);
        assert_eq!(table.get(u16::MAX), None);
    }

    #[test]
    fn test_define_and_lookup() {
        let mut table = FunctionTable::new();
        assert!(table.try_define(7, 3, Range::new(4, 9)));
        assert_eq!(table.get(7), Some(Range::new(4, 9)));
        assert_eq!(table.definitions(), &[(7, 3)]);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut table = FunctionTable::new();
        assert!(table.try_define(1, 0, Range::new(1, 2)));
        assert!(!table.try_define(1, 5, Range::new(6, 8)));
        assert_eq!(table.get(1), Some(Range::new(1, 2)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_declaration_order_kept() {
        let mut table = FunctionTable::new();
        table.try_define(9, 0, Range::new(1, 2));
        table.try_define(2, 4, Range::new(5, 6));
        let keys: Vec<u16> = table.definitions().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![9, 2]);
    }
}
