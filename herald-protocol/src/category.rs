//! Notification categories sent by the companion app

/// Kind of notification, as classified by the phone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NotificationCategory {
    /// Incoming or missed call
    Phone,
    /// SMS / chat message
    Message,
    /// Email
    Email,
    /// Social network activity
    Social,
    /// Calendar reminder
    Calendar,
    /// Anything else
    #[default]
    Other,
}

// Wire format values
const CATEGORY_PHONE: u8 = 0;
const CATEGORY_MESSAGE: u8 = 1;
const CATEGORY_EMAIL: u8 = 2;
const CATEGORY_SOCIAL: u8 = 3;
const CATEGORY_CALENDAR: u8 = 4;
const CATEGORY_OTHER: u8 = 5;

impl NotificationCategory {
    /// Parse a category from its wire byte
    ///
    /// Unknown values map to [`NotificationCategory::Other`]; newer apps may
    /// send categories this firmware does not know yet.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            CATEGORY_PHONE => NotificationCategory::Phone,
            CATEGORY_MESSAGE => NotificationCategory::Message,
            CATEGORY_EMAIL => NotificationCategory::Email,
            CATEGORY_SOCIAL => NotificationCategory::Social,
            CATEGORY_CALENDAR => NotificationCategory::Calendar,
            _ => NotificationCategory::Other,
        }
    }

    /// Convert to wire byte
    pub fn to_byte(self) -> u8 {
        match self {
            NotificationCategory::Phone => CATEGORY_PHONE,
            NotificationCategory::Message => CATEGORY_MESSAGE,
            NotificationCategory::Email => CATEGORY_EMAIL,
            NotificationCategory::Social => CATEGORY_SOCIAL,
            NotificationCategory::Calendar => CATEGORY_CALENDAR,
            NotificationCategory::Other => CATEGORY_OTHER,
        }
    }

    /// Short label for status lines
    pub fn label(self) -> &'static str {
        match self {
            NotificationCategory::Phone => "Call",
            NotificationCategory::Message => "Message",
            NotificationCategory::Email => "Email",
            NotificationCategory::Social => "Social",
            NotificationCategory::Calendar => "Calendar",
            NotificationCategory::Other => "Other",
        }
    }
}
