/// Compute the BLAKE3 hash of a byte slice, returning the hex-encoded digest.
///
/// Used to fingerprint the Meteor build manifest so incremental builds can
/// tell whether the upstream framework recompiled between two compilations.
#[must_use]
pub fn blake3_bytes(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}
