//! Bounded notification list with cursor and timed deletion
//!
//! Deleting is two-phase: [`NotificationStore::request_delete`] marks a record,
//! and the record is removed only after `delete_timeout_ticks` calls to
//! [`NotificationStore::tick`] unless [`NotificationStore::undo_delete`] runs
//! first. The pending record is tracked by its sequence number, so eviction
//! while the timer runs never removes the wrong record.

use heapless::Vec;
use herald_protocol::{NotificationCategory, NotificationPayload};

use super::notification::Notification;
use crate::config::DeletePreview;

/// Number of notifications kept before the oldest is evicted
pub const STORE_CAPACITY: usize = 30;

/// Ticks a pending deletion waits before it is applied (2 s at 100 ms)
pub const DEFAULT_DELETE_TIMEOUT_TICKS: u16 = 20;

/// Store operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// No notification at the given index
    IndexOutOfRange,
    /// Another deletion is already pending
    DeletionPending,
    /// Undo requested with no deletion pending
    NothingPending,
}

impl StoreError {
    pub fn reason(&self) -> &'static str {
        match self {
            StoreError::IndexOutOfRange => "no such notification",
            StoreError::DeletionPending => "deletion already pending",
            StoreError::NothingPending => "no deletion pending",
        }
    }
}

/// A notification marked for removal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PendingDeletion {
    seq: u32,
    index: usize,
    elapsed_ticks: u16,
    /// Cursor to return to on undo, when the preview moved it
    restore_cursor: Option<usize>,
}

impl PendingDeletion {
    /// Current position of the marked record
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn seq(&self) -> u32 {
        self.seq
    }

    pub fn elapsed_ticks(&self) -> u16 {
        self.elapsed_ticks
    }
}

/// Ordered notification store holding at most `N` records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationStore<const N: usize = STORE_CAPACITY> {
    items: Vec<Notification, N>,
    cursor: usize,
    pending: Option<PendingDeletion>,
    next_seq: u32,
    delete_timeout_ticks: u16,
    preview: DeletePreview,
}

impl<const N: usize> Default for NotificationStore<N> {
    fn default() -> Self {
        Self::new(DEFAULT_DELETE_TIMEOUT_TICKS, DeletePreview::KeepCursor)
    }
}

impl<const N: usize> NotificationStore<N> {
    pub fn new(delete_timeout_ticks: u16, preview: DeletePreview) -> Self {
        Self {
            items: Vec::new(),
            cursor: 0,
            pending: None,
            next_seq: 0,
            delete_timeout_ticks: delete_timeout_ticks.max(1),
            preview,
        }
    }

    // --- Read access ---

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        N
    }

    pub fn get(&self, index: usize) -> Option<&Notification> {
        self.items.get(index)
    }

    /// Notification under the cursor
    pub fn current(&self) -> Option<&Notification> {
        self.items.get(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// One-based cursor position and total, for an "N of M" counter
    pub fn position(&self) -> Option<(usize, usize)> {
        if self.items.is_empty() {
            None
        } else {
            Some((self.cursor + 1, self.items.len()))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn pending_deletion(&self) -> Option<&PendingDeletion> {
        self.pending.as_ref()
    }

    pub fn is_deletion_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Unread notifications, including one pending deletion
    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.is_read).count()
    }

    pub fn delete_timeout_ticks(&self) -> u16 {
        self.delete_timeout_ticks
    }

    // --- Mutation ---

    /// Append a notification, evicting the oldest at capacity
    ///
    /// The cursor moves to the new notification. Returns its sequence number.
    pub fn add(
        &mut self,
        category: NotificationCategory,
        app_name: &str,
        title: &str,
        body: &str,
        timestamp: u32,
    ) -> Option<u32> {
        let seq = self.take_seq();
        let record = Notification::from_parts(seq, category, app_name, title, body, timestamp);
        self.insert(record)
    }

    /// Append a decoded AddNotification payload
    pub fn add_payload(&mut self, payload: NotificationPayload) -> Option<u32> {
        let seq = self.take_seq();
        self.insert(Notification::new(seq, payload))
    }

    fn take_seq(&mut self) -> u32 {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        seq
    }

    fn insert(&mut self, record: Notification) -> Option<u32> {
        if N == 0 {
            return None;
        }

        if self.items.is_full() {
            self.evict_oldest();
        }

        let seq = record.seq();
        if self.items.push(record).is_err() {
            return None;
        }
        self.cursor = self.items.len() - 1;
        Some(seq)
    }

    fn evict_oldest(&mut self) {
        let evicted = self.items.remove(0);
        debug!("Evicted notification {}", evicted.seq());

        if let Some(pending) = self.pending.as_mut() {
            if pending.seq == evicted.seq() {
                debug!("Pending deletion ended by eviction");
                self.pending = None;
            } else {
                pending.index = pending.index.saturating_sub(1);
                pending.restore_cursor = pending.restore_cursor.map(|c| c.saturating_sub(1));
            }
        }
    }

    /// Mark the current notification read and move to the next, wrapping
    pub fn advance(&mut self) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        self.items[self.cursor].is_read = true;
        self.cursor = (self.cursor + 1) % len;
    }

    /// Mark the current notification read and move to the previous, wrapping
    pub fn retreat(&mut self) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        self.items[self.cursor].is_read = true;
        self.cursor = if self.cursor == 0 { len - 1 } else { self.cursor - 1 };
    }

    pub fn mark_read(&mut self, index: usize) -> Result<(), StoreError> {
        let item = self
            .items
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange)?;
        item.is_read = true;
        Ok(())
    }

    /// Start the deletion timer for the notification at `index`
    pub fn request_delete(&mut self, index: usize) -> Result<(), StoreError> {
        if self.pending.is_some() {
            return Err(StoreError::DeletionPending);
        }
        let seq = self
            .items
            .get(index)
            .ok_or(StoreError::IndexOutOfRange)?
            .seq();

        let len = self.items.len();
        let restore_cursor = match self.preview {
            DeletePreview::AdvanceCursor if len > 1 => {
                let previous = self.cursor;
                self.cursor = (index + 1) % len;
                Some(previous)
            }
            _ => None,
        };

        self.pending = Some(PendingDeletion {
            seq,
            index,
            elapsed_ticks: 0,
            restore_cursor,
        });
        debug!("Deletion pending for notification {}", seq);
        Ok(())
    }

    /// Cancel the pending deletion; the records are left as they were
    pub fn undo_delete(&mut self) -> Result<(), StoreError> {
        let pending = self.pending.take().ok_or(StoreError::NothingPending)?;
        if let Some(cursor) = pending.restore_cursor {
            self.cursor = cursor.min(self.items.len().saturating_sub(1));
        }
        debug!("Deletion of notification {} undone", pending.seq);
        Ok(())
    }

    /// Advance the deletion timer by one tick
    ///
    /// Returns `true` when the pending deletion was applied this tick.
    pub fn tick(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };

        pending.elapsed_ticks = pending.elapsed_ticks.saturating_add(1);
        if pending.elapsed_ticks < self.delete_timeout_ticks {
            return false;
        }

        let seq = pending.seq;
        self.pending = None;

        let Some(index) = self.items.iter().position(|n| n.seq() == seq) else {
            return true;
        };
        self.items.remove(index);
        // Records right of the removed one shift left
        if index < self.cursor {
            self.cursor -= 1;
        }
        self.cursor = self.cursor.min(self.items.len().saturating_sub(1));
        debug!("Deleted notification {} at {}", seq, index);
        true
    }

    /// Remove every notification and cancel any pending deletion
    pub fn clear_all(&mut self) {
        self.items.clear();
        self.cursor = 0;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with<const N: usize>(count: usize) -> NotificationStore<N> {
        let mut store = NotificationStore::<N>::default();
        for i in 0..count {
            store.add(NotificationCategory::Message, "App", "Title", "Body", i as u32);
        }
        store
    }

    fn timestamps<const N: usize>(store: &NotificationStore<N>) -> heapless::Vec<u32, N> {
        store.iter().map(|n| n.timestamp).collect()
    }

    #[test]
    fn test_add_moves_cursor_to_newest() {
        let store: NotificationStore<4> = store_with(3);
        assert_eq!(store.len(), 3);
        assert_eq!(store.cursor(), 2);
        assert_eq!(store.unread_count(), 3);
        assert_eq!(store.position(), Some((3, 3)));
    }

    #[test]
    fn test_eviction_at_capacity() {
        let mut store: NotificationStore<STORE_CAPACITY> = store_with(STORE_CAPACITY);
        store.add(NotificationCategory::Email, "Mail", "New", "", 999);

        assert_eq!(store.len(), STORE_CAPACITY);
        assert_eq!(store.get(0).map(|n| n.timestamp), Some(1));
        assert_eq!(store.current().map(|n| n.timestamp), Some(999));
        assert_eq!(store.cursor(), STORE_CAPACITY - 1);
    }

    #[test]
    fn test_advance_and_retreat_wrap() {
        let mut store: NotificationStore<4> = store_with(3);
        store.advance();
        assert_eq!(store.cursor(), 0);
        assert!(store.get(2).map(|n| n.is_read).unwrap_or(false));

        store.retreat();
        assert_eq!(store.cursor(), 2);
        assert!(store.get(0).map(|n| n.is_read).unwrap_or(false));
        assert_eq!(store.unread_count(), 1);
    }

    #[test]
    fn test_navigation_on_empty_store() {
        let mut store: NotificationStore<4> = NotificationStore::default();
        store.advance();
        store.retreat();
        assert_eq!(store.cursor(), 0);
        assert_eq!(store.current(), None);
        assert_eq!(store.position(), None);
    }

    #[test]
    fn test_mark_read() {
        let mut store: NotificationStore<4> = store_with(2);
        store.mark_read(0).unwrap();
        assert_eq!(store.unread_count(), 1);
        assert_eq!(store.mark_read(5), Err(StoreError::IndexOutOfRange));
    }

    #[test]
    fn test_undo_restores_identical_store() {
        let mut store: NotificationStore<8> = store_with(5);
        let before = store.clone();

        store.request_delete(2).unwrap();
        for _ in 0..10 {
            assert!(!store.tick());
        }
        store.undo_delete().unwrap();

        assert_eq!(store, before);
    }

    #[test]
    fn test_delete_after_timeout_shifts_left() {
        let mut store: NotificationStore<8> = store_with(5);
        store.request_delete(1).unwrap();

        for _ in 0..DEFAULT_DELETE_TIMEOUT_TICKS - 1 {
            assert!(!store.tick());
        }
        assert!(store.tick());

        assert_eq!(timestamps(&store).as_slice(), &[0, 2, 3, 4]);
        assert!(store.pending_deletion().is_none());
        assert_eq!(store.cursor(), 3);
    }

    #[test]
    fn test_delete_last_item_clamps_cursor() {
        let mut store: NotificationStore<8> = store_with(3);
        store.request_delete(2).unwrap();
        for _ in 0..DEFAULT_DELETE_TIMEOUT_TICKS {
            store.tick();
        }
        assert_eq!(store.len(), 2);
        assert_eq!(store.cursor(), 1);
    }

    #[test]
    fn test_delete_only_item_leaves_empty_store() {
        let mut store: NotificationStore<8> = store_with(1);
        store.request_delete(0).unwrap();
        for _ in 0..DEFAULT_DELETE_TIMEOUT_TICKS {
            store.tick();
        }
        assert!(store.is_empty());
        assert_eq!(store.cursor(), 0);
    }

    #[test]
    fn test_second_delete_rejected() {
        let mut store: NotificationStore<8> = store_with(3);
        store.request_delete(0).unwrap();
        assert_eq!(store.request_delete(1), Err(StoreError::DeletionPending));
        assert_eq!(store.pending_deletion().map(|p| p.index()), Some(0));
    }

    #[test]
    fn test_delete_bad_index_and_undo_without_pending() {
        let mut store: NotificationStore<8> = store_with(1);
        assert_eq!(store.request_delete(3), Err(StoreError::IndexOutOfRange));
        assert_eq!(store.undo_delete(), Err(StoreError::NothingPending));
    }

    #[test]
    fn test_pending_item_still_unread() {
        let mut store: NotificationStore<8> = store_with(2);
        store.request_delete(0).unwrap();
        assert_eq!(store.unread_count(), 2);
    }

    #[test]
    fn test_eviction_during_pending_deletes_right_record() {
        let mut store: NotificationStore<3> = store_with(3);
        store.request_delete(2).unwrap();

        store.add(NotificationCategory::Other, "App", "Late", "", 100);
        assert_eq!(store.pending_deletion().map(|p| p.index()), Some(1));

        for _ in 0..DEFAULT_DELETE_TIMEOUT_TICKS {
            store.tick();
        }
        assert_eq!(timestamps(&store).as_slice(), &[1, 100]);
    }

    #[test]
    fn test_eviction_of_pending_record_ends_deletion() {
        let mut store: NotificationStore<3> = store_with(3);
        store.request_delete(0).unwrap();

        store.add(NotificationCategory::Other, "App", "Late", "", 100);
        assert!(store.pending_deletion().is_none());
        assert_eq!(timestamps(&store).as_slice(), &[1, 2, 100]);
    }

    #[test]
    fn test_clear_all_cancels_pending() {
        let mut store: NotificationStore<8> = store_with(4);
        store.request_delete(1).unwrap();
        store.clear_all();

        assert!(store.is_empty());
        assert!(store.pending_deletion().is_none());
        assert!(!store.tick());
    }

    #[test]
    fn test_advance_cursor_preview_and_undo() {
        let mut store: NotificationStore<8> =
            NotificationStore::new(DEFAULT_DELETE_TIMEOUT_TICKS, DeletePreview::AdvanceCursor);
        for i in 0..3 {
            store.add(NotificationCategory::Social, "App", "Title", "Body", i);
        }
        store.retreat();
        assert_eq!(store.cursor(), 1);

        store.request_delete(1).unwrap();
        assert_eq!(store.cursor(), 2);

        store.undo_delete().unwrap();
        assert_eq!(store.cursor(), 1);
    }

    #[test]
    fn test_advance_preview_kept_after_timeout() {
        let mut store: NotificationStore<8> =
            NotificationStore::new(DEFAULT_DELETE_TIMEOUT_TICKS, DeletePreview::AdvanceCursor);
        for i in 0..4 {
            store.add(NotificationCategory::Email, "App", "Title", "Body", i);
        }
        store.retreat();
        store.retreat();
        assert_eq!(store.cursor(), 1);

        store.request_delete(1).unwrap();
        assert_eq!(store.current().map(|n| n.timestamp), Some(2));

        for _ in 0..DEFAULT_DELETE_TIMEOUT_TICKS {
            store.tick();
        }
        assert_eq!(timestamps(&store).as_slice(), &[0, 2, 3]);
        assert_eq!(store.cursor(), 1);
        assert_eq!(store.current().map(|n| n.timestamp), Some(2));
    }

    #[test]
    fn test_cursor_right_of_deleted_record_follows_it() {
        let mut store: NotificationStore<8> = store_with(4);
        assert_eq!(store.capacity(), 8);
        store.request_delete(0).unwrap();
        for _ in 0..DEFAULT_DELETE_TIMEOUT_TICKS {
            store.tick();
        }
        assert_eq!(store.cursor(), 2);
        assert_eq!(store.current().map(|n| n.timestamp), Some(3));
    }

    #[test]
    fn test_sequence_numbers_unique() {
        let mut store: NotificationStore<2> = NotificationStore::default();
        let a = store.add(NotificationCategory::Phone, "", "", "", 0);
        let b = store.add(NotificationCategory::Phone, "", "", "", 0);
        let c = store.add(NotificationCategory::Phone, "", "", "", 0);
        assert_eq!((a, b, c), (Some(0), Some(1), Some(2)));
        assert_eq!(store.get(0).map(|n| n.seq()), Some(1));
    }
}
