//! Lookup outcome for facade queries.

/// Outcome of a keyed query against the current indexes.
///
/// Queries distinguish *why* nothing was returned. Callers match on the
/// variant instead of collapsing everything into `Option`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<T> {
    /// No key was supplied (absent or empty).
    NoKey,
    /// A key was supplied but no record matches it.
    NotFound,
    /// The country exists but its companion policy record does not.
    Incomplete,
    /// The record was found.
    Found(T),
}

impl<T> Lookup<T> {
    /// `NoKey` or `Incomplete`: nothing to return, but not a failed match.
    pub fn is_null(&self) -> bool {
        matches!(self, Lookup::NoKey | Lookup::Incomplete)
    }

    /// A key was supplied and nothing matched.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Lookup::NotFound)
    }

    /// A record was found.
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// The found value, discarding the reason for absence.
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            _ => None,
        }
    }

    /// Borrow the found value, keeping the absence reason.
    pub fn as_ref(&self) -> Lookup<&T> {
        match self {
            Lookup::NoKey => Lookup::NoKey,
            Lookup::NotFound => Lookup::NotFound,
            Lookup::Incomplete => Lookup::Incomplete,
            Lookup::Found(value) => Lookup::Found(value),
        }
    }

    /// Transform the found value; absence reasons pass through unchanged.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        self.and_then(|value| Lookup::Found(f(value)))
    }

    /// Chain a dependent lookup; absence reasons pass through unchanged.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Lookup<U>) -> Lookup<U> {
        match self {
            Lookup::NoKey => Lookup::NoKey,
            Lookup::NotFound => Lookup::NotFound,
            Lookup::Incomplete => Lookup::Incomplete,
            Lookup::Found(value) => f(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_and_not_found_are_distinct() {
        assert!(Lookup::<()>::NoKey.is_null());
        assert!(Lookup::<()>::Incomplete.is_null());
        assert!(!Lookup::<()>::NotFound.is_null());
        assert!(Lookup::<()>::NotFound.is_not_found());
        assert!(!Lookup::Found(1).is_null());
    }

    #[test]
    fn as_ref_borrows_found_value() {
        let found = Lookup::Found(String::from("GB"));
        assert!(found.is_found());
        assert_eq!(found.as_ref(), Lookup::Found(&String::from("GB")));
        assert_eq!(Lookup::<String>::Incomplete.as_ref(), Lookup::Incomplete);
        assert!(!Lookup::<String>::NoKey.is_found());
    }

    #[test]
    fn map_preserves_absence_reason() {
        assert_eq!(Lookup::<i32>::NoKey.map(|v| v + 1), Lookup::NoKey);
        assert_eq!(Lookup::<i32>::NotFound.map(|v| v + 1), Lookup::NotFound);
        assert_eq!(Lookup::<i32>::Incomplete.map(|v| v + 1), Lookup::Incomplete);
        assert_eq!(Lookup::Found(1).map(|v| v + 1), Lookup::Found(2));
    }

    #[test]
    fn and_then_can_downgrade() {
        let result = Lookup::Found(1).and_then(|_| Lookup::<i32>::Incomplete);
        assert_eq!(result, Lookup::Incomplete);
    }
}
