//! Datapoint ids the vacuum exposes on its local protocol.
//!
//! Datapoints are the device's addressable attributes, exchanged as an
//! id → value map. Only the two below matter for pushing voice packs.

/// Voice pack install command and its confirmation reply.
pub const VOICE_PACK: u32 = 162;

/// Voice volume, read back from status as a corroborating signal.
pub const VOLUME: u32 = 158;

/// Official female voice pack id.
pub const PACK_FEMALE: u64 = 501;

/// Official male voice pack id.
pub const PACK_MALE: u64 = 502;

/// Folder name the official packs ship under, if the id is a known one.
pub fn pack_name(id: u64) -> Option<&'static str> {
    match id {
        PACK_FEMALE => Some("en_us_female"),
        PACK_MALE => Some("en_us_male"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn official_packs_have_names() {
        assert_eq!(pack_name(PACK_FEMALE), Some("en_us_female"));
        assert_eq!(pack_name(PACK_MALE), Some("en_us_male"));
        assert_eq!(pack_name(503), None);
    }
}
