//! Bit string helpers used to compute the depth of a bucket.

/// Longest common leading run shared by all `sequences`.
///
/// Stops at the first position where the sequences disagree, or at the
/// length of the shortest one. An empty input has an empty prefix.
pub fn shared_prefix<'a, T: PartialEq>(sequences: &[&'a [T]]) -> &'a [T] {
    let first = match sequences.first() {
        Some(first) => *first,
        None => return &[],
    };

    let shortest = sequences.iter().map(|s| s.len()).min().unwrap_or(0);

    let len = (0..shortest)
        .find(|&i| sequences.iter().any(|s| s[i] != first[i]))
        .unwrap_or(shortest);

    &first[..len]
}

/// Render bytes as a string of zero padded binary digits, 8 per byte.
pub fn bytes_to_bit_string(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{:08b}", byte)).collect()
}
