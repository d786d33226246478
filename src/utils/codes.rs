use crate::entities::{user_entity, user_swap_entity};
use crate::error::AppResult;
use rand::Rng;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};

const REFERRAL_CHARS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const REFERRAL_CODE_LEN: usize = 8;

/// 8 位推荐码（去掉易混淆字符）
pub fn generate_referral_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..REFERRAL_CODE_LEN)
        .map(|_| REFERRAL_CHARS[rng.gen_range(0..REFERRAL_CHARS.len())] as char)
        .collect()
}

/// 8 位数字签名编号
pub fn generate_signature_id<R: Rng + ?Sized>(rng: &mut R) -> i64 {
    rng.gen_range(10_000_000_i64..=99_999_999_i64)
}

pub async fn generate_unique_referral_code<C: ConnectionTrait>(db: &C) -> AppResult<String> {
    loop {
        let code = generate_referral_code(&mut rand::thread_rng());

        let exists = user_entity::Entity::find()
            .filter(user_entity::Column::ReferralCode.eq(code.as_str()))
            .count(db)
            .await?;

        if exists == 0 {
            return Ok(code);
        }
    }
}

pub async fn generate_unique_signature_id<C: ConnectionTrait>(db: &C) -> AppResult<i64> {
    loop {
        let id = generate_signature_id(&mut rand::thread_rng());

        let exists = user_swap_entity::Entity::find()
            .filter(user_swap_entity::Column::SignatureId.eq(id))
            .count(db)
            .await?;

        if exists == 0 {
            return Ok(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_generate_referral_code() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let code = generate_referral_code(&mut rng);
            assert_eq!(code.len(), 8);
            assert!(code.bytes().all(|b| REFERRAL_CHARS.contains(&b)));
        }
    }

    #[test]
    fn test_generate_signature_id_has_eight_digits() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..50 {
            let id = generate_signature_id(&mut rng);
            assert_eq!(id.to_string().len(), 8);
        }
    }
}
