//! Native-currency amount type.
//!
//! Amounts are denominated in wei, the smallest native unit, and stored as
//! u128 to avoid floating-point errors. This covers every realistic funding
//! amount; values wider than 128 bits are rejected at the decoding layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Number of wei in one ETH.
const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;

/// A wei amount — the smallest native-currency unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WeiAmount(u128);

impl WeiAmount {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Render as a decimal ETH string, trimming trailing zeros
    /// (`1500000000000000000` -> `"1.5"`).
    pub fn to_eth_string(&self) -> String {
        let whole = self.0 / WEI_PER_ETH;
        let frac = self.0 % WEI_PER_ETH;
        if frac == 0 {
            return whole.to_string();
        }
        let frac = format!("{frac:018}");
        format!("{whole}.{}", frac.trim_end_matches('0'))
    }
}

impl Add for WeiAmount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for WeiAmount {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for WeiAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} wei", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eth_string_whole() {
        assert_eq!(WeiAmount::new(2 * WEI_PER_ETH).to_eth_string(), "2");
    }

    #[test]
    fn eth_string_fractional() {
        assert_eq!(
            WeiAmount::new(WEI_PER_ETH + WEI_PER_ETH / 2).to_eth_string(),
            "1.5"
        );
    }

    #[test]
    fn eth_string_sub_wei_dust() {
        assert_eq!(WeiAmount::new(1).to_eth_string(), "0.000000000000000001");
    }

    #[test]
    fn checked_add_overflow() {
        assert!(WeiAmount::new(u128::MAX)
            .checked_add(WeiAmount::new(1))
            .is_none());
    }
}
