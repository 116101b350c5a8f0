pub mod author;
pub mod booking;
pub mod id;
pub mod post;
pub mod settings;
pub mod subscriber;

pub use author::{Author, AuthorPatch, SocialLinks};
pub use booking::{Booking, BookingPatch, BookingStatus};
pub use post::{Post, PostPatch};
pub use settings::{AppSettings, AppSettingsPatch, SeoSettings, SeoSettingsPatch};
pub use subscriber::{Subscriber, SubscriberPatch, SubscriberStatus};

/// Deserializes a patch field that distinguishes "absent" from
/// "explicitly null": `Some(None)` clears the stored value, `None`
/// leaves it untouched.
pub(crate) mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::deserialize(deserializer).map(Some)
    }
}
