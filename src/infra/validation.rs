//! Utilities for validating constraints on types.

use validator::{Validate, ValidationErrors};

/// A type that cannot be instantiated without validating the value within.
/// That is, if you have a [`Valid<T>`], `T` is guaranteed to be valid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Valid<T> {
    value: T,
}

impl<T> Valid<T> {
    /// Constructs a new validated value.
    pub fn new(value: T) -> Result<Valid<T>, ValidationErrors>
    where
        T: Validate,
    {
        value.validate().map(|_| Valid { value })
    }

    /// Returns a reference to the validated value.
    pub fn inner(&self) -> &T {
        &self.value
    }

    /// Returns the validated value.
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> AsRef<T> for Valid<T> {
    fn as_ref(&self) -> &T {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::Valid;
    use validator::Validate;

    #[derive(Debug, Validate)]
    struct Shelf {
        #[validate(length(min = 1, max = 8))]
        label: String,
        #[validate(range(min = 0))]
        slots: i32,
    }

    #[test]
    pub fn valid_value_succeeds() {
        let shelf = Valid::new(Shelf {
            label: "A1".to_string(),
            slots: 0,
        })
        .unwrap();
        assert_eq!("A1", shelf.inner().label);
    }

    #[test]
    pub fn invalid_value_fails() {
        let errors = Valid::new(Shelf {
            label: String::new(),
            slots: -1,
        })
        .unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("label"));
        assert!(fields.contains_key("slots"));
    }
}
