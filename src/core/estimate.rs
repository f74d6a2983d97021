use std::fmt::Display;

/// A derived quantity that may not have a meaningful value yet.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Estimate<T> {
    Known(T),
    /// Not enough information to compute the value (e.g. metadata still being fetched).
    #[default]
    Unknown,
    /// The value is mathematically undefined (e.g. a ratio over zero).
    Undefined,
}

impl<T> Estimate<T> {
    pub fn known(self) -> Option<T> {
        match self {
            Self::Known(value) => Some(value),
            Self::Unknown | Self::Undefined => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Estimate<U> {
        match self {
            Self::Known(value) => Estimate::Known(f(value)),
            Self::Unknown => Estimate::Unknown,
            Self::Undefined => Estimate::Undefined,
        }
    }
}

impl<T> From<Option<T>> for Estimate<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Unknown, Self::Known)
    }
}

impl<T: Display> Display for Estimate<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(value) => value.fmt(f),
            Self::Unknown => write!(f, "unknown"),
            Self::Undefined => write!(f, "undefined"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_option() {
        assert_eq!(Estimate::from(Some(3)), Estimate::Known(3));
        assert_eq!(Estimate::<i32>::from(None), Estimate::Unknown);
    }

    #[test]
    fn only_known_values_are_extracted() {
        assert_eq!(Estimate::Known(1.5).known(), Some(1.5));
        assert_eq!(Estimate::<f64>::Undefined.known(), None);
        assert!(!Estimate::<f64>::Unknown.is_known());
    }

    #[test]
    fn display() {
        assert_eq!(Estimate::Known(42).to_string(), "42");
        assert_eq!(Estimate::<u8>::Unknown.to_string(), "unknown");
        assert_eq!(Estimate::<u8>::Undefined.to_string(), "undefined");
    }
}
