//! Stored notification record

use herald_protocol::{clamped, AppName, Body, NotificationCategory, NotificationPayload, Title};

/// One received notification
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Notification {
    /// Store-assigned identity, unique for the lifetime of the store
    seq: u32,
    pub category: NotificationCategory,
    pub app_name: AppName,
    pub title: Title,
    pub body: Body,
    /// Unix epoch seconds as sent by the peer (0 = unknown)
    pub timestamp: u32,
    pub is_read: bool,
}

impl Notification {
    pub(crate) fn new(seq: u32, payload: NotificationPayload) -> Self {
        Self {
            seq,
            category: payload.category,
            app_name: payload.app_name,
            title: payload.title,
            body: payload.body,
            timestamp: payload.unix_timestamp,
            is_read: false,
        }
    }

    pub(crate) fn from_parts(
        seq: u32,
        category: NotificationCategory,
        app_name: &str,
        title: &str,
        body: &str,
        timestamp: u32,
    ) -> Self {
        Self {
            seq,
            category,
            app_name: clamped(app_name),
            title: clamped(title),
            body: clamped(body),
            timestamp,
            is_read: false,
        }
    }

    pub fn seq(&self) -> u32 {
        self.seq
    }
}
