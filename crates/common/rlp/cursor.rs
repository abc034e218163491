use std::{
    collections::HashMap,
    ops::{Deref, DerefMut},
};

use tracing::trace;

use crate::{constants::DEFAULT_RECURSIVE_READ_LIMIT, error::CursorError};

/// A bounds-checked reader and writer over a fixed-size byte buffer.
///
/// Every read records how many times its starting position has been visited.
/// Visiting a position a second time counts as a recursive read, and once
/// `recursive_read_limit` of those happened any further read fails with
/// [`CursorError::RecursiveReadLimitExceeded`]. Writes never grow the buffer.
#[derive(Debug, Clone)]
pub struct Cursor<B> {
    bytes: B,
    position: usize,
    position_read_count: HashMap<usize, usize>,
    recursive_read_count: usize,
    recursive_read_limit: Option<usize>,
}

impl<B: AsRef<[u8]>> Cursor<B> {
    pub fn new(bytes: B) -> Self {
        Self::with_recursive_read_limit(bytes, Some(DEFAULT_RECURSIVE_READ_LIMIT))
    }

    /// `None` disables the recursive read guard altogether.
    pub fn with_recursive_read_limit(bytes: B, recursive_read_limit: Option<usize>) -> Self {
        Self {
            bytes,
            position: 0,
            position_read_count: HashMap::new(),
            recursive_read_count: 0,
            recursive_read_limit,
        }
    }

    pub fn unbounded(bytes: B) -> Self {
        Self::with_recursive_read_limit(bytes, None)
    }

    pub fn bytes(&self) -> &[u8] {
        self.bytes.as_ref()
    }

    pub fn into_inner(self) -> B {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.position)
    }

    pub fn recursive_read_count(&self) -> usize {
        self.recursive_read_count
    }

    pub fn recursive_read_limit(&self) -> Option<usize> {
        self.recursive_read_limit
    }

    /// Number of reads that started at `position` (the current one when `None`).
    pub fn read_count(&self, position: Option<usize>) -> usize {
        self.position_read_count
            .get(&position.unwrap_or(self.position))
            .copied()
            .unwrap_or_default()
    }

    pub fn assert_position(&self, position: usize) -> Result<(), CursorError> {
        if position >= self.len() {
            return Err(self.out_of_bounds(signed(position)));
        }
        Ok(())
    }

    fn out_of_bounds(&self, position: isize) -> CursorError {
        CursorError::PositionOutOfBounds {
            position,
            length: self.len(),
        }
    }

    /// Checks that `width` bytes starting at `start` lie inside the buffer.
    /// An empty range may sit right after the last byte.
    fn assert_range(&self, start: usize, width: usize) -> Result<(), CursorError> {
        if width == 0 {
            if start > self.len() {
                return Err(self.out_of_bounds(signed(start)));
            }
            return Ok(());
        }
        let last = start
            .checked_add(width - 1)
            .ok_or_else(|| self.out_of_bounds(isize::MAX))?;
        self.assert_position(last)
    }

    fn assert_read_limit(&self) -> Result<(), CursorError> {
        if let Some(limit) = self.recursive_read_limit {
            if self.recursive_read_count >= limit {
                return Err(CursorError::RecursiveReadLimitExceeded {
                    count: self.recursive_read_count + 1,
                    limit,
                });
            }
        }
        Ok(())
    }

    fn touch(&mut self) {
        if self.recursive_read_limit.is_none() {
            return;
        }
        let count = self.read_count(None);
        self.position_read_count.insert(self.position, count + 1);
        if count > 0 {
            self.recursive_read_count += 1;
            trace!(
                position = self.position,
                recursive_read_count = self.recursive_read_count,
                "Revisited cursor position"
            );
        }
    }

    pub fn inspect_byte(&self, position: Option<usize>) -> Result<u8, CursorError> {
        let position = position.unwrap_or(self.position);
        self.assert_position(position)?;
        Ok(self.bytes()[position])
    }

    pub fn inspect_bytes(&self, length: usize, position: Option<usize>) -> Result<&[u8], CursorError> {
        let position = position.unwrap_or(self.position);
        self.assert_range(position, length)?;
        Ok(&self.bytes()[position..position + length])
    }

    fn inspect_array<const N: usize>(&self, position: Option<usize>) -> Result<[u8; N], CursorError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.inspect_bytes(N, position)?);
        Ok(out)
    }

    pub fn inspect_u8(&self, position: Option<usize>) -> Result<u8, CursorError> {
        self.inspect_byte(position)
    }

    pub fn inspect_u16(&self, position: Option<usize>) -> Result<u16, CursorError> {
        self.inspect_array(position).map(u16::from_be_bytes)
    }

    pub fn inspect_u24(&self, position: Option<usize>) -> Result<u32, CursorError> {
        let [a, b, c] = self.inspect_array(position)?;
        Ok(u32::from_be_bytes([0, a, b, c]))
    }

    pub fn inspect_u32(&self, position: Option<usize>) -> Result<u32, CursorError> {
        self.inspect_array(position).map(u32::from_be_bytes)
    }

    pub fn read_byte(&mut self) -> Result<u8, CursorError> {
        self.assert_read_limit()?;
        self.touch();
        let value = self.inspect_byte(None)?;
        self.position += 1;
        Ok(value)
    }

    /// Reads `length` bytes and advances by `size` (defaults to `length`).
    pub fn read_bytes(&mut self, length: usize, size: Option<usize>) -> Result<&[u8], CursorError> {
        self.assert_read_limit()?;
        self.touch();
        let start = self.position;
        self.assert_range(start, length)?;
        let next = start.saturating_add(size.unwrap_or(length));
        if next > self.len() {
            return Err(self.out_of_bounds(signed(next)));
        }
        self.position = next;
        Ok(&self.bytes.as_ref()[start..start + length])
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CursorError> {
        self.assert_read_limit()?;
        self.touch();
        let value = self.inspect_array(None)?;
        self.position += N;
        Ok(value)
    }

    pub fn read_u8(&mut self) -> Result<u8, CursorError> {
        self.read_byte()
    }

    pub fn read_u16(&mut self) -> Result<u16, CursorError> {
        self.read_array().map(u16::from_be_bytes)
    }

    pub fn read_u24(&mut self) -> Result<u32, CursorError> {
        let [a, b, c] = self.read_array()?;
        Ok(u32::from_be_bytes([0, a, b, c]))
    }

    pub fn read_u32(&mut self) -> Result<u32, CursorError> {
        self.read_array().map(u32::from_be_bytes)
    }

    pub fn increment_position(&mut self, offset: isize) -> Result<(), CursorError> {
        if offset < 0 {
            return Err(CursorError::NegativeOffset { offset });
        }
        let position = signed(self.position).saturating_add(offset);
        self.move_to(position)
    }

    pub fn decrement_position(&mut self, offset: isize) -> Result<(), CursorError> {
        if offset < 0 {
            return Err(CursorError::NegativeOffset { offset });
        }
        let position = signed(self.position) - offset;
        self.move_to(position)
    }

    fn move_to(&mut self, position: isize) -> Result<(), CursorError> {
        let Ok(position) = usize::try_from(position) else {
            return Err(self.out_of_bounds(position));
        };
        self.assert_position(position)?;
        self.position = position;
        Ok(())
    }

    /// Moves to `position` until the returned guard is dropped, at which point
    /// the previous position is restored.
    pub fn set_position(&mut self, position: usize) -> Result<PositionGuard<'_, B>, CursorError> {
        self.assert_position(position)?;
        let previous = std::mem::replace(&mut self.position, position);
        Ok(PositionGuard {
            cursor: self,
            previous,
        })
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Cursor<B> {
    pub fn push_byte(&mut self, byte: u8) -> Result<(), CursorError> {
        self.push_bytes(&[byte])
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<(), CursorError> {
        let start = self.position;
        self.assert_range(start, bytes.len())?;
        self.bytes.as_mut()[start..start + bytes.len()].copy_from_slice(bytes);
        self.position += bytes.len();
        Ok(())
    }

    pub fn push_u8(&mut self, value: u8) -> Result<(), CursorError> {
        self.push_byte(value)
    }

    pub fn push_u16(&mut self, value: u16) -> Result<(), CursorError> {
        self.push_bytes(&value.to_be_bytes())
    }

    /// Writes the low 24 bits of `value`.
    pub fn push_u24(&mut self, value: u32) -> Result<(), CursorError> {
        self.push_bytes(&value.to_be_bytes()[1..])
    }

    pub fn push_u32(&mut self, value: u32) -> Result<(), CursorError> {
        self.push_bytes(&value.to_be_bytes())
    }
}

fn signed(position: usize) -> isize {
    isize::try_from(position).unwrap_or(isize::MAX)
}

/// Restores the cursor position it was created from when dropped.
pub struct PositionGuard<'a, B: AsRef<[u8]>> {
    cursor: &'a mut Cursor<B>,
    previous: usize,
}

impl<B: AsRef<[u8]>> Deref for PositionGuard<'_, B> {
    type Target = Cursor<B>;

    fn deref(&self) -> &Self::Target {
        self.cursor
    }
}

impl<B: AsRef<[u8]>> DerefMut for PositionGuard<'_, B> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.cursor
    }
}

impl<B: AsRef<[u8]>> Drop for PositionGuard<'_, B> {
    fn drop(&mut self) {
        self.cursor.position = self.previous;
    }
}
