/// Identifier of an image in the external catalog.
pub type ImageId = i32;

/// Persisted per-image flag bits, as stored by the catalog.
/// The low three bits hold the star rating (0..=5).
pub const RATING_MASK: u32 = 0x7;
pub const FLAG_REJECTED: u32 = 1 << 3;
pub const FLAG_HAS_AUDIO: u32 = 1 << 4;

/// Snapshot of the image metadata the overlay engine needs. Built from the
/// catalog's flag word plus derived state (group membership, edit history).
/// All fields are best-effort: a thumbnail whose data has not arrived yet is
/// simply rendered without metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageMeta {
    pub id: ImageId,
    pub group_id: ImageId,
    pub rating: u8,
    pub rejected: bool,
    pub has_audio: bool,
    /// True when the image belongs to a group with other members.
    pub grouped: bool,
    /// True when the image has a non-empty edit history.
    pub altered: bool,
}

impl ImageMeta {
    pub fn from_flags(id: ImageId, group_id: ImageId, flags: u32) -> Self {
        Self {
            id,
            group_id,
            rating: (flags & RATING_MASK).min(5) as u8,
            rejected: flags & FLAG_REJECTED != 0,
            has_audio: flags & FLAG_HAS_AUDIO != 0,
            grouped: false,
            altered: false,
        }
    }
}
