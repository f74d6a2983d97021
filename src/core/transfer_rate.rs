use std::{cmp::Ordering, fmt::Display, time::Duration};

use size::Size;

/// Amount of data moved over a measurement window.
///
/// Two rates are equal when they move the same number of bytes per second, regardless of the
/// window they were sampled over.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferRate(pub Size, pub Duration);

impl Display for TransferRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let size_per_second = Size::from_bytes(self.bps());
        write!(f, "{}/s", size_per_second)
    }
}

impl TransferRate {
    pub const EMPTY: Self = Self(Size::from_const(0), Duration::ZERO);

    pub fn per_second(size: Size) -> Self {
        Self(size, Duration::from_secs(1))
    }

    pub fn bps(&self) -> f64 {
        if self.1.is_zero() {
            return 0.0;
        }
        (self.0.bytes() as f64) / self.1.as_secs_f64()
    }
}

impl PartialEq for TransferRate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TransferRate {}

impl PartialOrd for TransferRate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TransferRate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bps().total_cmp(&other.bps())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_speed_over_different_windows_is_equal() {
        let a = TransferRate(Size::from_kibibytes(10), Duration::from_secs(1));
        let b = TransferRate(Size::from_kibibytes(20), Duration::from_secs(2));

        assert_eq!(a, b);
    }

    #[test]
    fn empty_window_is_zero() {
        assert_eq!(TransferRate::EMPTY.bps(), 0.0);
        assert_eq!(
            TransferRate(Size::from_kibibytes(1), Duration::ZERO),
            TransferRate::EMPTY
        );
    }

    #[test]
    fn ordering() {
        let rate_10_kbps = TransferRate::per_second(Size::from_kibibytes(10));
        let rate_20_kbps = TransferRate::per_second(Size::from_kibibytes(20));
        let rate_30_kbps = TransferRate::per_second(Size::from_kibibytes(30));
        let mut rates = vec![&rate_10_kbps, &rate_30_kbps, &rate_20_kbps];
        rates.sort();

        assert_eq!(rates, vec![&rate_10_kbps, &rate_20_kbps, &rate_30_kbps]);
    }
}
