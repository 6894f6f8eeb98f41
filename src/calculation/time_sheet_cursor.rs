//! Forward cursor over an ordered slice.
//!
//! The reconciler walks time sheets alongside transactions and needs both the
//! sheet it is positioned on and the one it just left. Running past the end
//! is a normal state: `current()` becomes `None` while `previous()` keeps the
//! last element.

/// A forward-only cursor that remembers the element before its position.
///
/// A new cursor is already positioned on the first element.
///
/// # Example
///
/// ```
/// use efficiency_engine::calculation::TimeSheetCursor;
///
/// let sheets = [10, 20];
/// let mut cursor = TimeSheetCursor::new(&sheets);
/// assert_eq!(cursor.current(), Some(&10));
/// assert_eq!(cursor.previous(), None);
///
/// assert!(cursor.advance());
/// assert!(!cursor.advance());
/// assert_eq!(cursor.current(), None);
/// assert_eq!(cursor.previous(), Some(&20));
/// ```
#[derive(Debug, Clone)]
pub struct TimeSheetCursor<'a, T> {
    items: &'a [T],
    position: usize,
}

impl<'a, T> TimeSheetCursor<'a, T> {
    /// Creates a cursor positioned on the first element of `items`.
    pub fn new(items: &'a [T]) -> Self {
        Self { items, position: 0 }
    }

    /// Returns the element the cursor is positioned on, or `None` once exhausted.
    pub fn current(&self) -> Option<&'a T> {
        self.items.get(self.position)
    }

    /// Returns the element the cursor was positioned on before the last advance.
    pub fn previous(&self) -> Option<&'a T> {
        self.position
            .checked_sub(1)
            .and_then(|index| self.items.get(index))
    }

    /// Moves to the next element, returning false once no element remains.
    ///
    /// Advancing an exhausted cursor leaves it unchanged.
    pub fn advance(&mut self) -> bool {
        if self.position < self.items.len() {
            self.position += 1;
        }
        self.position < self.items.len()
    }

    /// Returns the index of the current element.
    pub fn position(&self) -> usize {
        self.position
    }
}
