use rand::Rng;

/// Boundary length in random bytes (60 hex characters).
const BOUNDARY_BYTES: usize = 30;

/// Generates a random boundary as a lowercase hex string.
pub fn generate_boundary() -> String {
    let mut bytes = [0u8; BOUNDARY_BYTES];
    rand::thread_rng().fill(&mut bytes);
    hex::encode(bytes)
}

/// Checks a boundary against RFC 2046 (1-70 chars, restricted alphabet,
/// no trailing space).
pub fn is_valid_boundary(boundary: &str) -> bool {
    if boundary.is_empty() || boundary.len() > 70 || boundary.ends_with(' ') {
        return false;
    }
    boundary.bytes().all(|b| {
        b.is_ascii_alphanumeric()
            || matches!(
                b,
                b'\'' | b'(' | b')' | b'+' | b'_' | b',' | b'-' | b'.' | b'/' | b':' | b'=' | b'?' | b' '
            )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_boundary_length() {
        assert_eq!(generate_boundary().len(), 60);
    }

    #[test]
    fn generated_boundary_is_valid() {
        let b = generate_boundary();
        assert!(b.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(is_valid_boundary(&b));
    }

    #[test]
    fn boundaries_are_unique() {
        assert_ne!(generate_boundary(), generate_boundary());
    }

    #[test]
    fn invalid_boundaries() {
        assert!(!is_valid_boundary(""));
        assert!(!is_valid_boundary("trailing "));
        assert!(!is_valid_boundary("has\"quote"));
        assert!(!is_valid_boundary(&"x".repeat(71)));
    }
}
