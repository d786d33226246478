//! 兑换签名：sha256(地址 ‖ 数量 ‖ 过期时间 ‖ 签名编号) 后做 ed25519 签名

use crate::error::{AppError, AppResult};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};

pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// 签名载荷
/// amount_nano 为 u64 大端，expire 与 signature_id 为 u32 大端
pub fn payload_hash(address: &str, amount_nano: u64, expire: u32, signature_id: u32) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(address.as_bytes());
    hasher.update(amount_nano.to_be_bytes());
    hasher.update(expire.to_be_bytes());
    hasher.update(signature_id.to_be_bytes());
    hasher.finalize().into()
}

#[derive(Clone)]
pub struct SwapSigner {
    signing_key: SigningKey,
}

impl SwapSigner {
    pub fn from_secret(secret: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&secret),
        }
    }

    /// base64 私钥；为空时生成临时密钥（仅适用于开发环境）
    pub fn from_config(encoded: &str) -> AppResult<Self> {
        if encoded.trim().is_empty() {
            log::warn!("Swap signing key is not configured, using an ephemeral key");
            return Ok(Self::from_secret(rand::random::<[u8; 32]>()));
        }

        let raw = STANDARD
            .decode(encoded.trim())
            .map_err(|e| AppError::ConfigError(format!("Invalid swap signing key: {e}")))?;
        let secret: [u8; 32] = raw.as_slice().try_into().map_err(|_| {
            AppError::ConfigError(format!(
                "Swap signing key must be 32 bytes, got {}",
                raw.len()
            ))
        })?;

        Ok(Self::from_secret(secret))
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    pub fn public_key_hex(&self) -> String {
        to_hex(self.verifying_key().as_bytes())
    }

    /// 返回十六进制签名
    pub fn sign(&self, address: &str, amount_nano: u64, expire: u32, signature_id: u32) -> String {
        let digest = payload_hash(address, amount_nano, expire, signature_id);
        let signature: Signature = self.signing_key.sign(&digest);
        to_hex(&signature.to_bytes())
    }

    pub fn verify(
        &self,
        address: &str,
        amount_nano: u64,
        expire: u32,
        signature_id: u32,
        signature_hex: &str,
    ) -> bool {
        let Some(bytes) = from_hex(signature_hex) else {
            return false;
        };
        let Ok(bytes) = <[u8; 64]>::try_from(bytes.as_slice()) else {
            return false;
        };
        let signature = Signature::from_bytes(&bytes);
        let digest = payload_hash(address, amount_nano, expire, signature_id);
        self.verifying_key().verify(&digest, &signature).is_ok()
    }
}

fn from_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "EQD4FPq-PRDieyQKkizFTRtSDyucUIqrj0v_zXJmqaDp6_0t";

    #[test]
    fn test_sign_and_verify() {
        let signer = SwapSigner::from_secret([7u8; 32]);
        let sig = signer.sign(ADDR, 950_000, 1_700_000_000, 12_345_678);
        assert_eq!(sig.len(), 128);
        assert!(signer.verify(ADDR, 950_000, 1_700_000_000, 12_345_678, &sig));
        // 任一字段变化都应验证失败
        assert!(!signer.verify(ADDR, 950_001, 1_700_000_000, 12_345_678, &sig));
        assert!(!signer.verify(ADDR, 950_000, 1_700_000_001, 12_345_678, &sig));
        assert!(!signer.verify(ADDR, 950_000, 1_700_000_000, 12_345_679, &sig));
        assert!(!signer.verify(ADDR, 950_000, 1_700_000_000, 12_345_678, "zz"));
    }

    #[test]
    fn test_signature_is_deterministic() {
        let signer = SwapSigner::from_secret([1u8; 32]);
        let a = signer.sign(ADDR, 1, 2, 3);
        let b = signer.sign(ADDR, 1, 2, 3);
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_config() {
        let encoded = STANDARD.encode([9u8; 32]);
        let signer = SwapSigner::from_config(&encoded).unwrap();
        assert_eq!(signer.public_key_hex().len(), 64);
        assert_eq!(
            signer.public_key_hex(),
            SwapSigner::from_secret([9u8; 32]).public_key_hex()
        );

        assert!(SwapSigner::from_config(&STANDARD.encode([1u8; 16])).is_err());
        assert!(SwapSigner::from_config("not base64!").is_err());
        assert!(SwapSigner::from_config("").is_ok());
    }

    #[test]
    fn test_hex_helpers() {
        assert_eq!(to_hex(&[0x00, 0xab, 0x10]), "00ab10");
        assert_eq!(from_hex("00ab10"), Some(vec![0x00, 0xab, 0x10]));
        assert_eq!(from_hex("abc"), None);
    }
}
