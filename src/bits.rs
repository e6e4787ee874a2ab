#[inline]
pub(crate) fn extract_highest_bit_set(x: u16) -> u16 {
    debug_assert!(x != 0);
    1 << (15 - x.leading_zeros())
}

#[inline]
pub(crate) fn reset_highest_bit_set(x: u16) -> u16 {
    debug_assert!(x != 0);
    x & !extract_highest_bit_set(x)
}

/// Bits whose next higher bit is clear: the top of every run of set bits.
#[inline]
pub(crate) fn top_of_runs(x: u16) -> u16 {
    x & !(x >> 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highest_bit() {
        assert_eq!(0b1000_0000, extract_highest_bit_set(0b1010_0110));
        assert_eq!(0b0010_0110, reset_highest_bit_set(0b1010_0110));
        assert_eq!(1, extract_highest_bit_set(1));
    }

    #[test]
    fn runs() {
        assert_eq!(0b0100_0000, top_of_runs(0b0111_0000));
        assert_eq!(0b1010_0100, top_of_runs(0b1010_0110));
        assert_eq!(0, top_of_runs(0));
    }
}
