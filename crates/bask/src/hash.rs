//! Content fingerprinting for output names.

/// Number of hex characters kept from the digest.
pub const FINGERPRINT_LEN: usize = 8;

/// Compute a short content fingerprint, e.g. for `main.a1b2c3d4.css`.
///
/// A deterministic function of the final byte content, independent of the
/// source revision.
pub fn fingerprint<T: AsRef<[u8]> + ?Sized>(content: &T) -> String {
    let digest = blake3::hash(content.as_ref());
    digest.to_hex()[..FINGERPRINT_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_deterministic() {
        assert_eq!(fingerprint("body { margin: 0; }"), fingerprint("body { margin: 0; }"));
    }

    #[test]
    fn fingerprint_tracks_content() {
        assert_ne!(fingerprint("a { color: red; }"), fingerprint("a { color: blue; }"));
    }

    #[test]
    fn fingerprint_is_short_hex() {
        let fp = fingerprint("anything");
        assert_eq!(fp.len(), FINGERPRINT_LEN);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
