/// Unpacks the low `width` bits of `value`, least-significant bit first.
pub fn to_bits(value: u64, width: usize) -> Vec<u8> {
    (0..width).map(|i| ((value >> i) & 1) as u8).collect()
}

/// Inverse of `to_bits`: weighted sum of bits with weights 2^i.
pub fn from_bits(bits: &[u8]) -> u64 {
    bits.iter()
        .enumerate()
        .fold(0u64, |acc, (i, &bit)| acc + ((bit as u64) << i))
}
