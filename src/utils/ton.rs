use crate::error::{AppError, AppResult};
use regex::Regex;

/// 校验 TON 钱包地址：用户友好格式（48 位 base64url）或原始格式（workchain:hex64）
pub fn validate_ton_address(address: &str) -> AppResult<()> {
    let friendly = Regex::new(r"^[A-Za-z0-9_\-+/]{48}$")
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    let raw = Regex::new(r"^-?\d+:[0-9a-fA-F]{64}$")
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    if !friendly.is_match(address) && !raw.is_match(address) {
        return Err(AppError::ValidationError(
            "Wallet address is not a valid TON address".to_string(),
        ));
    }

    Ok(())
}

/// 1 TON = 10^9 nano
pub const NANO_PER_TON: i64 = 1_000_000_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ton_address() {
        assert!(validate_ton_address("EQD4FPq-PRDieyQKkizFTRtSDyucUIqrj0v_zXJmqaDp6_0t").is_ok());
        assert!(
            validate_ton_address(
                "0:83dfd552e63729b472fcbcc8c45ebcc6691702558b68ec7527e1ba403a0f31a8"
            )
            .is_ok()
        );
        assert!(
            validate_ton_address(
                "-1:83dfd552e63729b472fcbcc8c45ebcc6691702558b68ec7527e1ba403a0f31a8"
            )
            .is_ok()
        );
        assert!(validate_ton_address("EQD4FPq").is_err());
        assert!(validate_ton_address("0:xyz").is_err());
        assert!(validate_ton_address("").is_err());
    }
}
