// Money columns are stored as integer cents

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

pub(crate) fn to_cents(amount: Decimal) -> Option<i64> {
    (amount.round_dp(2) * Decimal::ONE_HUNDRED).to_i64()
}

pub(crate) fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
