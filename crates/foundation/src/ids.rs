/// Monotonic token used to tell the latest scheduled piece of work apart from
/// everything it superseded.
///
/// Work captures the generation it was started under and compares it against
/// the owner's current generation before applying a result.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub const fn initial() -> Self {
        Generation(0)
    }

    /// Advances in place and returns the new value.
    pub fn bump(&mut self) -> Self {
        self.0 = self.0.wrapping_add(1);
        *self
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::Generation;

    #[test]
    fn bump_returns_new_value_and_orders() {
        let mut g = Generation::initial();
        let a = g.bump();
        let b = g.bump();
        assert_eq!(a.value(), 1);
        assert_eq!(b, g);
        assert!(b > a);
    }
}
