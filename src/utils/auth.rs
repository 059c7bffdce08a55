/// Verify the panel API key using a constant-time comparison, so response
/// timing leaks nothing about how much of a guessed key matched.
pub fn verify_api_key(provided: &str, expected: &str) -> bool {
    provided.as_bytes().len() == expected.as_bytes().len()
        && provided
            .as_bytes()
            .iter()
            .zip(expected.as_bytes().iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
