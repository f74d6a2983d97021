/// A cached value that reports whether an assignment actually changed it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tracked<T> {
    value: T,
}

impl<T: PartialEq> Tracked<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Stores `value` and returns `true` iff it differs from the cached one.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_value_is_not_a_change() {
        let mut tracked = Tracked::new(String::from("ubuntu.iso"));

        assert!(!tracked.set(String::from("ubuntu.iso")));
        assert_eq!(tracked.get(), "ubuntu.iso");
    }

    #[test]
    fn different_value_is_stored() {
        let mut tracked = Tracked::new(1);

        assert!(tracked.set(2));
        assert_eq!(*tracked.get(), 2);
        assert!(!tracked.set(2));
    }
}
