// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

use crate::deserialization_error;
use crate::types::error::TypesError;

/// Utility method to extract the N bytes at a given cursor from a byte array.
///
/// # Arguments
///
/// * `structure` - The name of the structure being extracted.
/// * `bytes` - The byte array to extract from.
/// * `cursor` - The current cursor position in the byte array.
///
/// # Returns
///
/// A tuple containing the new cursor position and the extracted bytes.
pub fn extract_fixed_bytes<const N: usize>(
    structure: &str,
    bytes: &[u8],
    cursor: usize,
) -> Result<(usize, [u8; N]), TypesError> {
    let end = cursor
        .checked_add(N)
        .filter(|end| *end <= bytes.len())
        .ok_or_else(|| deserialization_error!(structure, "Not enough bytes to extract fixed bytes"))?;

    let result = bytes[cursor..end]
        .try_into()
        .map_err(|_| deserialization_error!(structure, "Invalid fixed bytes"))?;

    Ok((end, result))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_extract_fixed_bytes() {
        let bytes = [1u8, 2, 3, 4, 5];
        let (cursor, first) = extract_fixed_bytes::<2>("Test", &bytes, 0).unwrap();
        assert_eq!((cursor, first), (2, [1, 2]));
        let (cursor, rest) = extract_fixed_bytes::<3>("Test", &bytes, cursor).unwrap();
        assert_eq!((cursor, rest), (5, [3, 4, 5]));
        assert!(extract_fixed_bytes::<1>("Test", &bytes, cursor).is_err());
    }
}
