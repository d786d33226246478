use crate::error::AppResult;
use rand::Rng;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};

const SUFFIX_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// 生成 kebab-case ASCII slug
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// slug 冲突时追加两位随机后缀
pub fn slug_with_suffix<R: Rng + ?Sized>(base: &str, rng: &mut R) -> String {
    let suffix: String = (0..2)
        .map(|_| SUFFIX_CHARS[rng.gen_range(0..SUFFIX_CHARS.len())] as char)
        .collect();
    if base.is_empty() {
        suffix
    } else {
        format!("{base}-{suffix}")
    }
}

/// 在指定列上生成不重复的 slug，except_id 用于更新时排除自身
pub async fn unique_slug<E, C>(
    db: &C,
    text: &str,
    slug_col: E::Column,
    id_col: E::Column,
    except_id: Option<i64>,
) -> AppResult<String>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    let base = slugify(text);
    let mut candidate = if base.is_empty() {
        slug_with_suffix("", &mut rand::thread_rng())
    } else {
        base.clone()
    };
    loop {
        let mut select = E::find().filter(slug_col.eq(candidate.as_str()));
        if let Some(id) = except_id {
            select = select.filter(id_col.ne(id));
        }
        if select.count(db).await? == 0 {
            return Ok(candidate);
        }
        candidate = slug_with_suffix(&base, &mut rand::thread_rng());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Lucky Wheel"), "lucky-wheel");
        assert_eq!(slugify("  Ton -- Swap!! 2024 "), "ton-swap-2024");
        assert_eq!(slugify("Đà Nẵng App"), "n-ng-app");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn test_slug_with_suffix() {
        let mut rng = StdRng::seed_from_u64(7);
        let s = slug_with_suffix("lucky-wheel", &mut rng);
        assert!(s.starts_with("lucky-wheel-"));
        assert_eq!(s.len(), "lucky-wheel-".len() + 2);
        assert!(s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
    }
}
