use ethers::types::U256;

const WORD: usize = 64;
const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

fn strip_prefix(data: &str) -> Option<&str> {
    let hex = data.strip_prefix("0x").unwrap_or(data);
    if hex.is_empty() {
        None
    } else {
        Some(hex)
    }
}

/// Decode a dynamic `string` return value (offset word, length word, bytes).
/// NUL bytes are dropped; an empty result is `None`.
pub fn decode_abi_string(data: &str) -> Option<String> {
    let hex = strip_prefix(data)?;
    if hex.len() < 2 * WORD {
        return None;
    }

    let length = U256::from_str_radix(hex.get(WORD..2 * WORD)?, 16).ok()?;
    if length.is_zero() || length > U256::from(hex.len() as u64) {
        return None;
    }

    let end = (2 * WORD + length.as_usize() * 2).min(hex.len());
    let mut payload = hex.get(2 * WORD..end)?;
    if payload.len() % 2 == 1 {
        payload = &payload[..payload.len() - 1];
    }

    let decoded: String = hex::decode(payload)
        .ok()?
        .into_iter()
        .filter(|b| *b != 0)
        .map(char::from)
        .collect();

    if decoded.is_empty() {
        None
    } else {
        Some(decoded)
    }
}

/// Decode the last word as an unsigned integer; values that do not fit
/// in 2^53 - 1 are `None`.
pub fn decode_abi_uint(data: &str) -> Option<u64> {
    let hex = strip_prefix(data)?;
    if hex.len() < WORD {
        return None;
    }

    let value = U256::from_str_radix(hex.get(hex.len() - WORD..)?, 16).ok()?;
    if value > U256::from(MAX_SAFE_INTEGER) {
        return None;
    }
    Some(value.as_u64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_string() {
        let data = format!(
            "0x{}{}{}",
            format!("{:064x}", 32),
            format!("{:064x}", 4),
            format!("{:0<64}", hex::encode("PUNK"))
        );
        assert_eq!(decode_abi_string(&data).as_deref(), Some("PUNK"));
    }

    #[test]
    fn test_decode_string_drops_nul_and_rejects_short() {
        let data = format!(
            "0x{}{}{}",
            format!("{:064x}", 32),
            format!("{:064x}", 3),
            format!("{:0<64}", "410042")
        );
        assert_eq!(decode_abi_string(&data).as_deref(), Some("AB"));
        assert_eq!(decode_abi_string("0x"), None);
        assert_eq!(decode_abi_string("0x1234"), None);
    }

    #[test]
    fn test_decode_uint() {
        let supply = format!("0x{:064x}", 10_000);
        assert_eq!(decode_abi_uint(&supply), Some(10_000));
        assert_eq!(decode_abi_uint(&format!("0x{}", "f".repeat(64))), None);
        assert_eq!(decode_abi_uint(&format!("0x{:064x}", MAX_SAFE_INTEGER)), Some(MAX_SAFE_INTEGER));
        assert_eq!(decode_abi_uint("0x"), None);
    }
}
