use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

pub const TENGE_CURRENCY_CODE: &str = "KZT";

//--------------------------------------       Tenge         ---------------------------------------------------------
/// Whole currency units. Fractions of a tenge are never stored.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Tenge(i64);

macro_rules! tenge_arithmetic {
    ($($op:ident::$f:ident / $assign:ident::$assign_f:ident),*) => {$(
        impl $op for Tenge {
            type Output = Self;

            fn $f(self, rhs: Self) -> Self {
                Self(self.0.$f(rhs.0))
            }
        }

        impl $assign for Tenge {
            fn $assign_f(&mut self, rhs: Self) {
                self.0.$assign_f(rhs.0)
            }
        }
    )*};
}

tenge_arithmetic!(Add::add / AddAssign::add_assign, Sub::sub / SubAssign::sub_assign);

impl Neg for Tenge {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Mul<i64> for Tenge {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Tenge {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in tenge: {0}")]
pub struct TengeConversionError(String);

impl From<i64> for Tenge {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl TryFrom<u64> for Tenge {
    type Error = TengeConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(TengeConversionError(format!("Value {value} is too large to convert to Tenge")))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Tenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ₸", self.0)
    }
}

impl Tenge {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// The amount for `qty` units at `price` each, truncated toward zero. `None` if the result is not finite or does
    /// not fit in an `i64`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn for_quantity(qty: f64, price: Tenge) -> Option<Self> {
        let amount = (qty * price.0 as f64).trunc();
        // i64::MIN and i64::MAX + 1 are both exact powers of two as f64
        if !amount.is_finite() || amount < i64::MIN as f64 || amount >= i64::MAX as f64 {
            return None;
        }
        Some(Self(amount as i64))
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}
