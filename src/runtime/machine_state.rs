use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const MIN_MEMORY_SIZE: usize = 32;
pub const MAX_MEMORY_SIZE: usize = 1024;
pub const DEFAULT_MEMORY_SIZE: usize = 128;

/// Cell width and behaviour at the numeric bounds of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverflowMode {
    /// 8-bit cells, arithmetic wraps around.
    ByteWithOverflow,
    /// 8-bit cells, leaving `[0, 255]` is a fault.
    #[default]
    ByteWithNoOverflow,
    /// 16-bit cells, arithmetic wraps around.
    UshortWithOverflow,
    /// 16-bit cells, leaving `[0, 65535]` is a fault.
    UshortWithNoOverflow,
}

impl OverflowMode {
    pub fn max_value(self) -> u16 {
        match self {
            OverflowMode::ByteWithOverflow | OverflowMode::ByteWithNoOverflow => u8::MAX as u16,
            OverflowMode::UshortWithOverflow | OverflowMode::UshortWithNoOverflow => u16::MAX,
        }
    }

    pub fn wraps(self) -> bool {
        matches!(
            self,
            OverflowMode::ByteWithOverflow | OverflowMode::UshortWithOverflow
        )
    }
}

impl std::str::FromStr for OverflowMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "byte" | "byte-wrap" => Ok(OverflowMode::ByteWithOverflow),
            "byte-checked" => Ok(OverflowMode::ByteWithNoOverflow),
            "ushort" | "ushort-wrap" => Ok(OverflowMode::UshortWithOverflow),
            "ushort-checked" => Ok(OverflowMode::UshortWithNoOverflow),
            other => Err(format!(
                "unknown overflow mode '{}' (expected byte-wrap, byte-checked, ushort-wrap or ushort-checked)",
                other
            )),
        }
    }
}

/// The Turing tape: a fixed row of cells and a pointer into it.
///
/// Every `try_*` operation that takes a `count` behaves exactly like `count`
/// single steps: on failure the tape is left after the last step that
/// succeeded and `operations` has been credited with those steps only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineState {
    cells: Vec<u16>,
    pointer: usize,
    mode: OverflowMode,
}

impl MachineState {
    pub fn new(size: usize, mode: OverflowMode) -> Result<Self> {
        if !(MIN_MEMORY_SIZE..=MAX_MEMORY_SIZE).contains(&size) {
            return Err(Error::InvalidMemorySize(size));
        }
        Ok(Self {
            cells: vec![0; size],
            pointer: 0,
            mode,
        })
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn mode(&self) -> OverflowMode {
        self.mode
    }

    /// Value of the cell under the pointer.
    pub fn current(&self) -> u16 {
        self.cells[self.pointer]
    }

    pub fn cells(&self) -> &[u16] {
        &self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.cells.iter().copied()
    }

    pub fn try_move_next(&mut self, count: u16, operations: &mut u64) -> bool {
        let room = self.cells.len() - 1 - self.pointer;
        let count = count as usize;
        if count <= room {
            self.pointer += count;
            *operations += count as u64;
            true
        } else {
            self.pointer += room;
            *operations += room as u64;
            false
        }
    }

    pub fn try_move_back(&mut self, count: u16, operations: &mut u64) -> bool {
        let room = self.pointer;
        let count = count as usize;
        if count <= room {
            self.pointer -= count;
            *operations += count as u64;
            true
        } else {
            self.pointer = 0;
            *operations += room as u64;
            false
        }
    }

    pub fn try_increment(&mut self, count: u16, operations: &mut u64) -> bool {
        let max = self.mode.max_value() as u32;
        let value = self.cells[self.pointer] as u32;

        if self.mode.wraps() {
            self.cells[self.pointer] = ((value + count as u32) % (max + 1)) as u16;
            *operations += count as u64;
            return true;
        }

        let room = max - value;
        if count as u32 <= room {
            self.cells[self.pointer] = (value + count as u32) as u16;
            *operations += count as u64;
            true
        } else {
            self.cells[self.pointer] = max as u16;
            *operations += room as u64;
            false
        }
    }

    pub fn try_decrement(&mut self, count: u16, operations: &mut u64) -> bool {
        let max = self.mode.max_value() as u32;
        let value = self.cells[self.pointer] as u32;

        if self.mode.wraps() {
            let modulus = max + 1;
            let step = count as u32 % modulus;
            self.cells[self.pointer] = ((value + modulus - step) % modulus) as u16;
            *operations += count as u64;
            return true;
        }

        if count as u32 <= value {
            self.cells[self.pointer] = (value - count as u32) as u16;
            *operations += count as u64;
            true
        } else {
            self.cells[self.pointer] = 0;
            *operations += value as u64;
            false
        }
    }

    /// Stores a character code in the current cell.
    ///
    /// Wrapping modes keep the low bits that fit the cell; checked modes
    /// reject codes above the cell maximum and leave the cell untouched.
    pub fn try_input(&mut self, c: char) -> bool {
        let code = c as u32;
        let max = self.mode.max_value() as u32;

        if code <= max {
            self.cells[self.pointer] = code as u16;
            true
        } else if self.mode.wraps() {
            self.cells[self.pointer] = (code & max) as u16;
            true
        } else {
            false
        }
    }

    /// Zeroes the current cell.
    pub fn reset_cell(&mut self) {
        self.cells[self.pointer] = 0;
    }

    /// Encodes the tape with postcard.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(postcard::to_allocvec(self)?)
    }

    /// Decodes a tape written by [`MachineState::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let state: MachineState = postcard::from_bytes(bytes)?;
        if !(MIN_MEMORY_SIZE..=MAX_MEMORY_SIZE).contains(&state.cells.len()) {
            return Err(Error::InvalidMemorySize(state.cells.len()));
        }
        if state.pointer >= state.cells.len() {
            return Err(Error::Snapshot(postcard::Error::DeserializeBadEncoding));
        }
        if state.cells.iter().any(|&c| c > state.mode.max_value()) {
            return Err(Error::Snapshot(postcard::Error::DeserializeBadEncoding));
        }
        Ok(state)
    }
}

impl Default for MachineState {
    fn default() -> Self {
        Self {
            cells: vec![0; DEFAULT_MEMORY_SIZE],
            pointer: 0,
            mode: OverflowMode::default(),
        }
    }
}
