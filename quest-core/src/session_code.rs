use rand::Rng;

const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LENGTH: usize = 8;

/// Generate a candidate session code: 8 characters from [A-Z0-9].
///
/// Uniqueness is not guaranteed here; callers must check the store and
/// regenerate on collision before persisting.
pub fn generate_session_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_shape() {
        for _ in 0..100 {
            let code = generate_session_code();
            assert_eq!(code.len(), 8);
            assert!(
                code.chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            );
        }
    }

    #[test]
    fn test_codes_vary() {
        // 36^8 possibilities; 50 draws colliding across the board would
        // mean a broken generator
        let codes: std::collections::HashSet<String> =
            (0..50).map(|_| generate_session_code()).collect();
        assert!(codes.len() > 1);
    }
}
