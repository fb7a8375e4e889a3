use ethers::types::U256;

use crate::models::{GuardianError, Receipt, Result};

const WEI_PER_ETHER: u64 = 1_000_000_000_000_000_000;

/// Parse a `0x`-prefixed (or bare) hex quantity. Absent, empty and `0x` are zero.
pub fn parse_hex_quantity(hex: Option<&str>) -> Result<U256> {
    let raw = match hex {
        Some(raw) => raw.trim(),
        None => return Ok(U256::zero()),
    };
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    if digits.is_empty() {
        return Ok(U256::zero());
    }

    U256::from_str_radix(digits, 16)
        .map_err(|e| GuardianError::MalformedResponse(format!("bad hex quantity {:?}: {}", raw, e)))
}

/// Wei paid for a receipt: gasUsed x (effectiveGasPrice, else legacy gasPrice)
pub fn receipt_cost_wei(receipt: &Receipt) -> Result<U256> {
    if receipt.gas_used.is_none() {
        return Ok(U256::zero());
    }

    let gas_used = parse_hex_quantity(receipt.gas_used.as_deref())?;
    let effective = parse_hex_quantity(receipt.effective_gas_price.as_deref())?;
    let price = if effective.is_zero() {
        parse_hex_quantity(receipt.gas_price.as_deref())?
    } else {
        effective
    };

    Ok(gas_used.saturating_mul(price))
}

/// Whole ether by integer division, plus the remainder as a float fraction
pub fn wei_to_eth(wei: U256) -> f64 {
    let one_ether = U256::from(WEI_PER_ETHER);
    let whole = wei / one_ether;
    let fraction = wei % one_ether;

    u256_to_f64(whole) + fraction.low_u64() as f64 / WEI_PER_ETHER as f64
}

/// Lossy conversion for values past 2^53
pub fn u256_to_f64(value: U256) -> f64 {
    value
        .0
        .iter()
        .rev()
        .fold(0.0, |acc, limb| acc * 18_446_744_073_709_551_616.0 + *limb as f64)
}

/// Native-currency cost of a receipt; zero price means zero cost
pub fn receipt_cost_eth(receipt: &Receipt) -> Result<f64> {
    receipt_cost_wei(receipt).map(wei_to_eth)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(gas_used: Option<&str>, effective: Option<&str>, legacy: Option<&str>) -> Receipt {
        Receipt {
            gas_used: gas_used.map(String::from),
            effective_gas_price: effective.map(String::from),
            gas_price: legacy.map(String::from),
        }
    }

    #[test]
    fn test_transfer_cost() {
        // 21000 gas at 1 gwei
        let cost = receipt_cost_eth(&receipt(Some("0x5208"), Some("0x3b9aca00"), None)).unwrap();
        assert!((cost - 0.000021).abs() < 1e-15);
    }

    #[test]
    fn test_legacy_price_fallback() {
        let r = receipt(Some("0x5208"), Some("0x0"), Some("0x3b9aca00"));
        assert_eq!(receipt_cost_wei(&r).unwrap(), U256::from(21_000_000_000_000u64));
    }

    #[test]
    fn test_zero_prices_cost_nothing() {
        let r = receipt(Some("0x5208"), Some("0x0"), Some("0x0"));
        assert_eq!(receipt_cost_eth(&r).unwrap(), 0.0);

        let no_prices = receipt(Some("0x5208"), None, None);
        assert_eq!(receipt_cost_eth(&no_prices).unwrap(), 0.0);
    }

    #[test]
    fn test_missing_gas_used() {
        let r = receipt(None, Some("0x3b9aca00"), None);
        assert_eq!(receipt_cost_wei(&r).unwrap(), U256::zero());
    }

    #[test]
    fn test_malformed_hex() {
        assert!(parse_hex_quantity(Some("0xzz")).is_err());
        assert_eq!(parse_hex_quantity(Some("0x")).unwrap(), U256::zero());
        assert_eq!(parse_hex_quantity(Some("ff")).unwrap(), U256::from(255u64));
    }

    #[test]
    fn test_wei_to_eth_large_values() {
        let wei = U256::from(WEI_PER_ETHER) * U256::from(12_345u64) + U256::from(WEI_PER_ETHER / 2);
        assert!((wei_to_eth(wei) - 12_345.5).abs() < 1e-9);
    }
}
