use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const INR_CURRENCY_CODE: &str = "INR";
pub const INR_CURRENCY_CODE_LOWER: &str = "inr";

//--------------------------------------      Rupees       -----------------------------------------------------------
/// An amount of Indian Rupees, stored as an integer number of paise.
///
/// All order amounts in the system use this type. Storing paise keeps the
/// arithmetic exact and matches the unit the payment gateway bills in.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Rupees(i64);

op!(binary Rupees, Add, add);
op!(binary Rupees, Sub, sub);
op!(inplace Rupees, SubAssign, sub_assign);
op!(unary Rupees, Neg, neg);

impl Mul<i64> for Rupees {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Rupees {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in paise: {0}")]
pub struct RupeesConversionError(String);

impl From<i64> for Rupees {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Rupees {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Rupees {}

impl TryFrom<u64> for Rupees {
    type Error = RupeesConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(RupeesConversionError(format!("Value {value} is too large to convert to Rupees")))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Rupees {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rupees = self.0 as f64 / 100.0;
        write!(f, "₹{rupees:0.2}")
    }
}

impl Rupees {
    /// Construct an amount from whole rupees.
    pub fn from_rupees(rupees: i64) -> Self {
        Self(rupees * 100)
    }

    /// The amount in paise. This is the unit the payment gateway expects.
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}
