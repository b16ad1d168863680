use std::{
    fmt::{self, Display, Formatter},
    num::NonZeroU32,
    ops::Mul,
};

use rust_decimal::Decimal;

use crate::Count;

impl Count {
    pub(crate) fn new(n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(Self)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl Mul<Decimal> for Count {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Decimal::from(self.0.get()) * rhs
    }
}

impl From<Count> for i64 {
    fn from(value: Count) -> Self {
        value.0.get().into()
    }
}

impl Display for Count {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for Count {
    fn default() -> Self {
        // SAFETY: 1 is not 0
        Self(NonZeroU32::new(1).unwrap())
    }
}
