use crate::database::DbPool;
use crate::config::{AppConfig, WheelConfig};
use crate::entities::{
    ticket_entity as tickets, user_entity as users, user_wheel_entity as spins,
    wheel_entity as wheels, wheel_prize_entity as prizes,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AdminPrizeResponse, AdminWheelResponse, BuyTicketResponse, CountTicketResponse,
    CreateWheelRequest, Currency, PlayResponse, PrizeCategory, PrizeInput, PrizeResponse,
    PrizeType, SpinResult, TicketType, TransactionAction, UpdateWheelRequest,
    WheelResponse,
};
use crate::services::{LedgerEntry, LedgerService, TicketService};
use crate::utils::{merge_localized, normalize_locale, resolve_localized};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};

pub const TOTAL_RATE_BP: i32 = 10_000;
pub const MAX_SPINS_PER_PLAY: u32 = 10;
pub const MAX_TICKETS_PER_PURCHASE: u32 = 100;

/// 百分比转 basis points，保留两位小数
pub fn rate_to_bp(rate: f64) -> AppResult<i32> {
    if !rate.is_finite() || !(0.0..=100.0).contains(&rate) {
        return Err(AppError::ValidationError(format!(
            "Prize rate must be between 0 and 100, got {rate}"
        )));
    }
    Ok((rate * 100.0).round() as i32)
}

pub fn bp_to_rate(bp: i32) -> f64 {
    f64::from(bp) / 100.0
}

/// 所有奖品概率之和必须恰好为 100%
pub fn validate_prize_rates(rates: &[f64]) -> AppResult<Vec<i32>> {
    if rates.is_empty() {
        return Err(AppError::ValidationError(
            "Wheel must have at least one prize".to_string(),
        ));
    }
    let bps = rates
        .iter()
        .map(|r| rate_to_bp(*r))
        .collect::<AppResult<Vec<i32>>>()?;
    let total: i32 = bps.iter().sum();
    if total != TOTAL_RATE_BP {
        return Err(AppError::ValidationError(format!(
            "Total prize rate must be 100, got {}",
            bp_to_rate(total)
        )));
    }
    Ok(bps)
}

/// 按权重抽取：r ∈ [0, total)，返回第一个累计权重大于 r 的下标
pub fn select_prize<R: Rng + ?Sized>(weights: &[i32], rng: &mut R) -> Option<usize> {
    let total: i64 = weights.iter().map(|w| i64::from((*w).max(0))).sum();
    if total <= 0 {
        return None;
    }
    let pick = rng.gen_range(0..total);
    let mut acc = 0i64;
    for (idx, w) in weights.iter().enumerate() {
        acc += i64::from((*w).max(0));
        if pick < acc {
            return Some(idx);
        }
    }
    None
}

/// 用户最近一次中大奖后的状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CooldownState {
    /// 距上次大奖之后的抽奖次数，None 表示从未中过大奖
    pub spins_since_jackpot: Option<u64>,
    pub seconds_since_jackpot: Option<i64>,
}

/// 冷却期内屏蔽 JACKPOT / SUPER_JACKPOT
pub fn jackpot_blocked(
    cool_down_value: i32,
    cool_down_time: Option<i64>,
    state: CooldownState,
) -> bool {
    let by_spins = match state.spins_since_jackpot {
        Some(spins) => cool_down_value > 0 && spins < cool_down_value as u64,
        None => false,
    };
    let by_time = match (cool_down_time, state.seconds_since_jackpot) {
        (Some(limit), Some(elapsed)) => limit > 0 && elapsed < limit,
        _ => false,
    };
    by_spins || by_time
}

/// 冷却期内将大奖权重置零；若因此无可抽奖品则保持原权重
pub fn eligible_weights(prizes: &[prizes::Model], blocked: bool) -> Vec<i32> {
    let base: Vec<i32> = prizes.iter().map(|p| p.rate_bp).collect();
    if !blocked {
        return base;
    }
    let filtered: Vec<i32> = prizes
        .iter()
        .map(|p| if p.category.is_jackpot() { 0 } else { p.rate_bp })
        .collect();
    if filtered.iter().any(|w| *w > 0) {
        filtered
    } else {
        base
    }
}

fn start_of_today() -> DateTime<Utc> {
    let now = Utc::now();
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or(now)
}

#[derive(Clone)]
pub struct WheelService {
    pool: DbPool,
    app: AppConfig,
    config: WheelConfig,
}

impl WheelService {
    pub fn new(pool: DbPool, app: AppConfig, config: WheelConfig) -> Self {
        Self { pool, app, config }
    }

    fn locale<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        normalize_locale(requested, &self.app.languages, &self.app.main_language)
    }

    /// 当前生效的转盘（最早创建的一个）
    async fn active_wheel<C: ConnectionTrait>(conn: &C) -> AppResult<wheels::Model> {
        wheels::Entity::find()
            .order_by_asc(wheels::Column::Id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Wheel not found".to_string()))
    }

    async fn prizes_of<C: ConnectionTrait>(conn: &C, wheel_id: i64) -> AppResult<Vec<prizes::Model>> {
        Ok(prizes::Entity::find()
            .filter(prizes::Column::WheelId.eq(wheel_id))
            .order_by_asc(prizes::Column::Position)
            .all(conn)
            .await?)
    }

    async fn purchased_today<C: ConnectionTrait>(conn: &C, user_id: i64) -> AppResult<u64> {
        Ok(tickets::Entity::find()
            .filter(tickets::Column::UserId.eq(user_id))
            .filter(tickets::Column::TicketType.eq(TicketType::Buy))
            .filter(tickets::Column::CreatedAt.gte(start_of_today()))
            .count(conn)
            .await?)
    }

    async fn cooldown_state<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        wheel_id: i64,
    ) -> AppResult<CooldownState> {
        let last = spins::Entity::find()
            .filter(spins::Column::UserId.eq(user_id))
            .filter(spins::Column::WheelId.eq(wheel_id))
            .filter(
                spins::Column::Category
                    .is_in([PrizeCategory::Jackpot, PrizeCategory::SuperJackpot]),
            )
            .order_by_desc(spins::Column::Id)
            .one(conn)
            .await?;

        let Some(last) = last else {
            return Ok(CooldownState::default());
        };

        let since = spins::Entity::find()
            .filter(spins::Column::UserId.eq(user_id))
            .filter(spins::Column::WheelId.eq(wheel_id))
            .filter(spins::Column::Id.gt(last.id))
            .count(conn)
            .await?;

        Ok(CooldownState {
            spins_since_jackpot: Some(since),
            seconds_since_jackpot: Some((Utc::now() - last.created_at).num_seconds()),
        })
    }

    fn prize_response(&self, p: &prizes::Model, locale: &str) -> PrizeResponse {
        PrizeResponse {
            id: p.id,
            position: p.position,
            name: resolve_localized(&p.name, Some(locale), &self.app.main_language),
            description: resolve_localized(&p.description, Some(locale), &self.app.main_language),
            prize_type: p.prize_type,
            category: p.category,
            prize: p.prize,
            image: p.image.clone(),
        }
    }

    pub async fn get_wheel(&self, user_id: i64, locale: Option<&str>) -> AppResult<WheelResponse> {
        let locale = self.locale(locale);
        let wheel = Self::active_wheel(self.pool.as_ref()).await?;
        let prize_list = Self::prizes_of(self.pool.as_ref(), wheel.id).await?;
        let purchased_today = Self::purchased_today(self.pool.as_ref(), user_id).await?;

        Ok(WheelResponse {
            id: wheel.id,
            fee: wheel.fee,
            daily_limit: wheel.daily_limit,
            purchased_today,
            prizes: prize_list
                .iter()
                .map(|p| self.prize_response(p, locale))
                .collect(),
        })
    }

    pub async fn count_tickets(&self, user_id: i64) -> AppResult<CountTicketResponse> {
        Ok(CountTicketResponse {
            count: TicketService::count_new(self.pool.as_ref(), user_id).await?,
        })
    }

    /// 购买抽奖券
    ///
    /// 逻辑:
    /// 1. 锁定用户行，校验今日购买上限
    /// 2. 扣除 fee × quantity 积分
    /// 3. 发放 BUY 券，并把流水关联到第一张券
    pub async fn buy_tickets(
        &self,
        user_id: i64,
        quantity: u32,
        origin: Option<String>,
    ) -> AppResult<BuyTicketResponse> {
        if quantity == 0 || quantity > MAX_TICKETS_PER_PURCHASE {
            return Err(AppError::ValidationError(format!(
                "Quantity must be between 1 and {MAX_TICKETS_PER_PURCHASE}"
            )));
        }

        let txn = self.pool.begin().await?;
        let wheel = Self::active_wheel(&txn).await?;

        // 锁定用户，串行化同一用户的购买
        users::Entity::find_by_id(user_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let today = Self::purchased_today(&txn, user_id).await?;
        if today + u64::from(quantity) > wheel.daily_limit.max(0) as u64 {
            return Err(AppError::ValidationError(format!(
                "Daily ticket limit reached ({today}/{})",
                wheel.daily_limit
            )));
        }

        let cost = wheel
            .fee
            .checked_mul(i64::from(quantity))
            .ok_or_else(|| AppError::ValidationError("Ticket cost overflow".to_string()))?;

        let entry = if cost > 0 {
            Some(
                LedgerService::apply(
                    &txn,
                    LedgerEntry::debit(user_id, Currency::Point, cost, TransactionAction::BuyTicket)
                        .with_origin(origin),
                )
                .await?,
            )
        } else {
            None
        };

        let minted = TicketService::mint(&txn, user_id, TicketType::Buy, quantity).await?;
        if let (Some(entry), Some(first)) = (&entry, minted.first()) {
            LedgerService::attach_ref(&txn, entry.id, "user_wheel_tickets", first.id).await?;
        }

        let balance = match &entry {
            Some(e) => e.balance_after,
            None => users::Entity::find_by_id(user_id)
                .one(&txn)
                .await?
                .map(|u| u.balance)
                .unwrap_or_default(),
        };

        txn.commit().await?;

        log::info!("User {user_id} bought {quantity} tickets for {cost} points");
        Ok(BuyTicketResponse {
            quantity,
            cost,
            balance,
            transaction_id: entry.map(|e| e.id),
            ticket_ids: minted.iter().map(|t| t.id).collect(),
        })
    }

    /// 抽奖 (Play)
    ///
    /// 每张券：先 NEW -> USED 消费，再在事务内记录结果并发放奖品；
    /// 事务失败则把券恢复为 NEW 并返回错误。
    pub async fn play(
        &self,
        user_id: i64,
        spin_count: Option<u32>,
        locale: Option<&str>,
    ) -> AppResult<PlayResponse> {
        let count = spin_count.unwrap_or(1);
        if count == 0 || count > MAX_SPINS_PER_PLAY {
            return Err(AppError::ValidationError(format!(
                "Spin count must be between 1 and {MAX_SPINS_PER_PLAY}"
            )));
        }
        let locale = self.locale(locale);

        let wheel = Self::active_wheel(self.pool.as_ref()).await?;
        let prize_list = Self::prizes_of(self.pool.as_ref(), wheel.id).await?;
        if prize_list.is_empty() {
            return Err(AppError::InternalError("Wheel has no prizes".to_string()));
        }

        // 先一次性消费 count 张券，不足则全部退回
        let candidates =
            TicketService::oldest_usable(self.pool.as_ref(), user_id, u64::from(count)).await?;
        if candidates.len() < count as usize {
            return Err(AppError::ValidationError(
                "Not enough ticket to play".to_string(),
            ));
        }
        let mut claimed = Vec::with_capacity(candidates.len());
        for ticket in &candidates {
            match TicketService::claim(self.pool.as_ref(), ticket.id).await {
                Ok(true) => claimed.push(ticket.id),
                Ok(false) => {}
                Err(e) => {
                    self.release(user_id, &claimed).await;
                    return Err(e);
                }
            }
        }
        if claimed.len() < count as usize {
            // 并发请求抢先消费了部分券
            self.release(user_id, &claimed).await;
            return Err(AppError::ValidationError(
                "Not enough ticket to play".to_string(),
            ));
        }

        let mut results = Vec::with_capacity(claimed.len());
        for (idx, ticket_id) in claimed.iter().enumerate() {
            match self
                .resolve_spin(user_id, &wheel, &prize_list, *ticket_id, locale)
                .await
            {
                Ok(result) => results.push(result),
                Err(e) => {
                    log::warn!("Spin failed for user {user_id} on ticket {ticket_id}: {e}");
                    self.release(user_id, &claimed[idx..]).await;
                    return Err(e);
                }
            }
        }

        Ok(PlayResponse {
            spins: results,
            remaining_tickets: TicketService::count_new(self.pool.as_ref(), user_id).await?,
        })
    }

    /// 把已消费但未抽奖的券恢复为 NEW
    async fn release(&self, user_id: i64, ticket_ids: &[i64]) {
        for ticket_id in ticket_ids {
            match TicketService::revert(self.pool.as_ref(), *ticket_id).await {
                Ok(true) => {}
                Ok(false) => log::warn!("Ticket {ticket_id} of user {user_id} was not in USED state"),
                Err(e) => log::error!("Failed to revert ticket {ticket_id} of user {user_id}: {e}"),
            }
        }
    }

    async fn resolve_spin(
        &self,
        user_id: i64,
        wheel: &wheels::Model,
        prize_list: &[prizes::Model],
        ticket_id: i64,
        locale: &str,
    ) -> AppResult<SpinResult> {
        let txn = self.pool.begin().await?;

        let state = Self::cooldown_state(&txn, user_id, wheel.id).await?;
        let blocked = jackpot_blocked(wheel.cool_down_value, wheel.cool_down_time, state);
        let weights = eligible_weights(prize_list, blocked);
        let idx = {
            let mut rng = rand::thread_rng();
            select_prize(&weights, &mut rng)
        }
        .ok_or_else(|| AppError::InternalError("Prize weights are empty".to_string()))?;
        let prize = &prize_list[idx];

        let record = spins::ActiveModel {
            user_id: Set(user_id),
            wheel_id: Set(wheel.id),
            ticket_id: Set(ticket_id),
            prize_id: Set(prize.id),
            prize_type: Set(prize.prize_type),
            category: Set(prize.category),
            prize: Set(prize.prize),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let currency = match prize.prize_type {
            PrizeType::Gold => Some(Currency::Point),
            PrizeType::Ton => Some(Currency::Ton),
            PrizeType::Ticket | PrizeType::Other => None,
        };
        if let Some(currency) = currency
            && prize.prize > 0
        {
            LedgerService::apply(
                &txn,
                LedgerEntry::credit(user_id, currency, prize.prize, TransactionAction::Wheel)
                    .with_ref("user_wheels", record.id),
            )
            .await?;
        }

        // 奖励券随抽奖记录一起落库，延迟到 available_at 后可用
        if prize.prize_type == PrizeType::Ticket {
            let count = prize.prize.clamp(1, i64::from(MAX_TICKETS_PER_PURCHASE)) as u32;
            let delay = i64::try_from(self.config.ticket_prize_delay_secs)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or_else(Duration::zero);
            let available_at = Utc::now() + delay;
            TicketService::mint_at(&txn, user_id, TicketType::Spin, count, available_at).await?;
        }

        txn.commit().await?;

        if blocked {
            log::info!("User {user_id} spun wheel {} under jackpot cooldown", wheel.id);
        }

        Ok(SpinResult {
            ticket_id,
            prize_id: prize.id,
            position: prize.position,
            name: resolve_localized(&prize.name, Some(locale), &self.app.main_language),
            prize_type: prize.prize_type,
            category: prize.category,
            prize: prize.prize,
        })
    }

    // -----------------------------
    // 管理端
    // -----------------------------

    fn admin_response(wheel: wheels::Model, prize_list: Vec<prizes::Model>) -> AdminWheelResponse {
        AdminWheelResponse {
            id: wheel.id,
            fee: wheel.fee,
            daily_limit: wheel.daily_limit,
            cool_down_value: wheel.cool_down_value,
            cool_down_time: wheel.cool_down_time,
            prizes: prize_list
                .into_iter()
                .map(|p| AdminPrizeResponse {
                    id: p.id,
                    position: p.position,
                    name: p.name,
                    description: p.description,
                    prize_type: p.prize_type,
                    category: p.category,
                    prize: p.prize,
                    rate: bp_to_rate(p.rate_bp),
                    image: p.image,
                })
                .collect(),
            created_at: wheel.created_at,
            updated_at: wheel.updated_at,
        }
    }

    pub async fn admin_list(&self) -> AppResult<Vec<AdminWheelResponse>> {
        let list = wheels::Entity::find()
            .order_by_asc(wheels::Column::Id)
            .all(self.pool.as_ref())
            .await?;
        let mut out = Vec::with_capacity(list.len());
        for wheel in list {
            let prize_list = Self::prizes_of(self.pool.as_ref(), wheel.id).await?;
            out.push(Self::admin_response(wheel, prize_list));
        }
        Ok(out)
    }

    pub async fn admin_get(&self, id: i64) -> AppResult<AdminWheelResponse> {
        let wheel = wheels::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Wheel not found".to_string()))?;
        let prize_list = Self::prizes_of(self.pool.as_ref(), id).await?;
        Ok(Self::admin_response(wheel, prize_list))
    }

    fn validate_settings(
        fee: i64,
        daily_limit: i32,
        cool_down_value: i32,
        cool_down_time: Option<i64>,
    ) -> AppResult<()> {
        if fee < 0 || daily_limit < 0 || cool_down_value < 0 || cool_down_time.is_some_and(|t| t < 0)
        {
            return Err(AppError::ValidationError(
                "Wheel settings must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// 写入奖品列表；同位置旧奖品的其它语言文本会被保留
    async fn insert_prizes<C: ConnectionTrait>(
        &self,
        conn: &C,
        wheel_id: i64,
        inputs: &[PrizeInput],
        previous: &[prizes::Model],
        locale: &str,
    ) -> AppResult<()> {
        let rates: Vec<f64> = inputs.iter().map(|p| p.rate).collect();
        let bps = validate_prize_rates(&rates)?;

        for (idx, (input, bp)) in inputs.iter().zip(bps).enumerate() {
            if input.name.trim().is_empty() {
                return Err(AppError::ValidationError("Prize name is required".to_string()));
            }
            if input.prize < 0 {
                return Err(AppError::ValidationError(
                    "Prize amount must not be negative".to_string(),
                ));
            }
            let old = previous.iter().find(|p| p.position == idx as i32);
            prizes::ActiveModel {
                wheel_id: Set(wheel_id),
                position: Set(idx as i32),
                name: Set(merge_localized(old.map(|p| &p.name), input.name.trim(), locale)),
                description: Set(merge_localized(
                    old.map(|p| &p.description),
                    input.description.as_deref().unwrap_or_default(),
                    locale,
                )),
                prize_type: Set(input.prize_type),
                category: Set(input.category),
                prize: Set(input.prize),
                rate_bp: Set(bp),
                image: Set(input.image.clone()),
                ..Default::default()
            }
            .insert(conn)
            .await?;
        }
        Ok(())
    }

    pub async fn admin_create(
        &self,
        admin_id: i64,
        req: CreateWheelRequest,
        locale: Option<&str>,
    ) -> AppResult<AdminWheelResponse> {
        let locale = self.locale(locale).to_string();
        let cool_down_value = req.cool_down_value.unwrap_or(0);
        Self::validate_settings(req.fee, req.daily_limit, cool_down_value, req.cool_down_time)?;

        let txn = self.pool.begin().await?;
        let wheel = wheels::ActiveModel {
            fee: Set(req.fee),
            daily_limit: Set(req.daily_limit),
            cool_down_value: Set(cool_down_value),
            cool_down_time: Set(req.cool_down_time),
            created_by: Set(Some(admin_id)),
            updated_by: Set(Some(admin_id)),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        self.insert_prizes(&txn, wheel.id, &req.prizes, &[], &locale)
            .await?;
        txn.commit().await?;

        log::info!("Wheel {} created by admin {admin_id}", wheel.id);
        self.admin_get(wheel.id).await
    }

    pub async fn admin_update(
        &self,
        id: i64,
        admin_id: i64,
        req: UpdateWheelRequest,
        locale: Option<&str>,
    ) -> AppResult<AdminWheelResponse> {
        let locale = self.locale(locale).to_string();
        let txn = self.pool.begin().await?;
        let wheel = wheels::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Wheel not found".to_string()))?;

        let fee = req.fee.unwrap_or(wheel.fee);
        let daily_limit = req.daily_limit.unwrap_or(wheel.daily_limit);
        let cool_down_value = req.cool_down_value.unwrap_or(wheel.cool_down_value);
        let cool_down_time = req.cool_down_time.or(wheel.cool_down_time);
        Self::validate_settings(fee, daily_limit, cool_down_value, cool_down_time)?;

        let mut am = wheel.into_active_model();
        am.fee = Set(fee);
        am.daily_limit = Set(daily_limit);
        am.cool_down_value = Set(cool_down_value);
        am.cool_down_time = Set(cool_down_time);
        am.updated_by = Set(Some(admin_id));
        am.updated_at = Set(Utc::now());
        am.update(&txn).await?;

        if let Some(inputs) = &req.prizes {
            let previous = Self::prizes_of(&txn, id).await?;
            prizes::Entity::delete_many()
                .filter(prizes::Column::WheelId.eq(id))
                .exec(&txn)
                .await?;
            self.insert_prizes(&txn, id, inputs, &previous, &locale)
                .await?;
        }
        txn.commit().await?;

        log::info!("Wheel {id} updated by admin {admin_id}");
        self.admin_get(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{DbPool, mock};
    use crate::models::TicketStatus;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};
    use serde_json::json;

    fn prize(id: i64, category: PrizeCategory, rate_bp: i32) -> prizes::Model {
        prizes::Model {
            id,
            wheel_id: 1,
            position: id as i32,
            name: json!({"en": format!("p{id}")}),
            description: json!({}),
            prize_type: PrizeType::Gold,
            category,
            prize: 10,
            rate_bp,
            image: None,
        }
    }

    #[test]
    fn test_rate_to_bp_rounds_two_decimals() {
        assert_eq!(rate_to_bp(12.346).unwrap(), 1235);
        assert_eq!(rate_to_bp(33.33).unwrap(), 3333);
        assert_eq!(rate_to_bp(0.0).unwrap(), 0);
        assert_eq!(rate_to_bp(100.0).unwrap(), 10_000);
        assert!(rate_to_bp(100.01).is_err());
        assert!(rate_to_bp(-1.0).is_err());
        assert!(rate_to_bp(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_prize_rates_requires_exact_total() {
        assert_eq!(
            validate_prize_rates(&[40.0, 20.0, 15.0, 4.0, 1.0, 20.0]).unwrap(),
            vec![4000, 2000, 1500, 400, 100, 2000]
        );
        assert_eq!(
            validate_prize_rates(&[33.33, 33.33, 33.34]).unwrap(),
            vec![3333, 3333, 3334]
        );
        assert!(validate_prize_rates(&[50.0, 49.99]).is_err());
        assert!(validate_prize_rates(&[60.0, 50.0]).is_err());
        assert!(validate_prize_rates(&[]).is_err());
    }

    #[test]
    fn test_select_prize_cumulative_boundaries() {
        // 权重 [1, 0, 3]：r=0 命中 0，r=1..3 命中 2，零权重永远不会被选中
        let weights = [1, 0, 3];
        let mut hits = [0u32; 3];
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..4000 {
            hits[select_prize(&weights, &mut rng).unwrap()] += 1;
        }
        assert_eq!(hits[1], 0);
        assert!(hits[0] > 800 && hits[0] < 1200, "hits: {hits:?}");
        assert!(hits[2] > 2800 && hits[2] < 3200, "hits: {hits:?}");
    }

    #[test]
    fn test_select_prize_empty_weights() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(select_prize(&[], &mut rng), None);
        assert_eq!(select_prize(&[0, 0], &mut rng), None);
        assert_eq!(select_prize(&[0, 5], &mut rng), Some(1));
    }

    #[test]
    fn test_jackpot_blocked() {
        let never = CooldownState::default();
        assert!(!jackpot_blocked(8, Some(3600), never));

        let recent = CooldownState {
            spins_since_jackpot: Some(3),
            seconds_since_jackpot: Some(10_000),
        };
        assert!(jackpot_blocked(8, None, recent));
        assert!(!jackpot_blocked(3, None, recent));
        assert!(!jackpot_blocked(0, None, recent));

        let by_time = CooldownState {
            spins_since_jackpot: Some(100),
            seconds_since_jackpot: Some(30),
        };
        assert!(jackpot_blocked(8, Some(60), by_time));
        assert!(!jackpot_blocked(8, Some(30), by_time));
    }

    #[test]
    fn test_eligible_weights_zeroes_jackpots_when_blocked() {
        let list = vec![
            prize(0, PrizeCategory::Common, 6000),
            prize(1, PrizeCategory::Jackpot, 3000),
            prize(2, PrizeCategory::SuperJackpot, 1000),
        ];
        assert_eq!(eligible_weights(&list, false), vec![6000, 3000, 1000]);
        assert_eq!(eligible_weights(&list, true), vec![6000, 0, 0]);

        let only_jackpots = vec![prize(0, PrizeCategory::Jackpot, 10_000)];
        assert_eq!(eligible_weights(&only_jackpots, true), vec![10_000]);
    }

    fn wheel(fee: i64, daily_limit: i32) -> wheels::Model {
        wheels::Model {
            id: 1,
            fee,
            daily_limit,
            cool_down_value: 0,
            cool_down_time: None,
            created_by: None,
            updated_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn ticket(id: i64) -> tickets::Model {
        tickets::Model {
            id,
            user_id: 7,
            status: TicketStatus::New,
            ticket_type: TicketType::Buy,
            available_at: Utc::now() - Duration::minutes(1),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn spin(id: i64, ticket_id: i64, p: &prizes::Model) -> spins::Model {
        spins::Model {
            id,
            user_id: 7,
            wheel_id: 1,
            ticket_id,
            prize_id: p.id,
            prize_type: p.prize_type,
            category: p.category,
            prize: p.prize,
            created_at: Utc::now(),
        }
    }

    fn service(pool: &DbPool) -> WheelService {
        WheelService::new(pool.clone(), AppConfig::default(), WheelConfig::default())
    }

    #[tokio::test]
    async fn test_buy_tickets_over_daily_limit_never_debits() {
        let pool = mock::pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![wheel(100, 5)]])
                .append_query_results([vec![mock::user(7, 1000, 0)]])
                .append_query_results([vec![mock::count_row(4)]]),
        );

        let err = service(&pool).buy_tickets(7, 2, None).await.unwrap_err();
        assert!(
            matches!(err, AppError::ValidationError(ref m) if m.starts_with("Daily ticket limit reached"))
        );

        let log = mock::statements(pool);
        assert!(log.contains("ROLLBACK"));
        assert!(!log.contains("COMMIT"));
        assert!(!log.contains("UPDATE"));
        assert!(!log.contains("INSERT"));
    }

    #[tokio::test]
    async fn test_buy_tickets_debits_fee_and_links_first_ticket() {
        let user = mock::user(7, 1000, 0);
        let entry = LedgerEntry::debit(7, Currency::Point, 200, TransactionAction::BuyTicket);
        let pool = mock::pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![wheel(100, 5)]])
                .append_query_results([vec![user.clone()]])
                .append_query_results([vec![mock::count_row(3)]])
                .append_query_results([vec![user.clone()]])
                .append_query_results([vec![mock::user(7, 800, 0)]])
                .append_query_results([vec![mock::ledger_row(31, &user, &entry, 1000, 800)]])
                .append_query_results([vec![ticket(41)], vec![ticket(42)]])
                .append_exec_results([mock::affected(1)]),
        );

        let resp = service(&pool).buy_tickets(7, 2, None).await.unwrap();
        assert_eq!(resp.cost, 200);
        assert_eq!(resp.balance, 800);
        assert_eq!(resp.transaction_id, Some(31));
        assert_eq!(resp.ticket_ids, vec![41, 42]);

        let log = mock::statements(pool);
        assert!(log.contains(r#"UPDATE "users" SET "balance""#));
        assert!(log.contains("BigInt(Some(800))"));
        assert!(log.contains(r#"UPDATE "user_transactions" SET "ref_source""#));
        assert!(log.contains("BigInt(Some(41))"));
        assert!(log.contains("COMMIT"));
    }

    #[tokio::test]
    async fn test_play_reverts_ticket_when_spin_fails() {
        let list = vec![prize(0, PrizeCategory::Common, 10_000)];
        let pool = mock::pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![wheel(0, 5)]])
                .append_query_results([list])
                .append_query_results([vec![ticket(5)]])
                .append_query_results([Vec::<spins::Model>::new()])
                .append_query_errors([DbErr::Custom("connection reset".to_string())])
                .append_exec_results([mock::affected(1), mock::affected(1)]),
        );

        let err = service(&pool).play(7, None, None).await.unwrap_err();
        assert!(matches!(err, AppError::DatabaseError(_)));

        let log = mock::statements(pool);
        // 先 NEW -> USED，失败后 USED -> NEW
        assert_eq!(log.matches(r#"UPDATE "user_wheel_tickets" SET "status""#).count(), 2);
        assert!(log.contains(r#"String(Some("USED"))"#));
        assert!(log.contains(r#"String(Some("NEW"))"#));
        assert!(log.contains("ROLLBACK"));
        assert!(!log.contains("COMMIT"));
        assert!(!log.contains(r#"UPDATE "users""#));
    }

    #[tokio::test]
    async fn test_play_requires_enough_tickets_up_front() {
        let list = vec![prize(0, PrizeCategory::Common, 10_000)];
        let pool = mock::pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![wheel(0, 5)]])
                .append_query_results([list])
                .append_query_results([vec![ticket(5)]]),
        );

        let err = service(&pool).play(7, Some(2), None).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(ref m) if m == "Not enough ticket to play"));

        let log = mock::statements(pool);
        assert!(!log.contains("UPDATE"));
        assert!(!log.contains("BEGIN"));
    }

    #[tokio::test]
    async fn test_play_releases_claimed_tickets_when_one_is_taken() {
        let list = vec![prize(0, PrizeCategory::Common, 10_000)];
        let pool = mock::pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![wheel(0, 5)]])
                .append_query_results([list])
                .append_query_results([vec![ticket(5), ticket(6)]])
                .append_exec_results([mock::affected(1), mock::affected(0), mock::affected(1)]),
        );

        let err = service(&pool).play(7, Some(2), None).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(ref m) if m == "Not enough ticket to play"));

        let log = mock::statements(pool);
        assert_eq!(log.matches(r#"UPDATE "user_wheel_tickets""#).count(), 3);
        assert!(!log.contains("BEGIN"));
        assert!(!log.contains("INSERT"));
    }

    #[tokio::test]
    async fn test_ticket_prize_is_minted_inside_spin_transaction() {
        let mut bonus = prize(0, PrizeCategory::Medium, 10_000);
        bonus.prize_type = PrizeType::Ticket;
        bonus.prize = 2;
        let pool = mock::pool(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![wheel(0, 5)]])
                .append_query_results([vec![bonus.clone()]])
                .append_query_results([vec![ticket(5)]])
                .append_query_results([Vec::<spins::Model>::new()])
                .append_query_results([vec![spin(9, 5, &bonus)]])
                .append_query_results([vec![ticket(50)], vec![ticket(51)]])
                .append_query_results([vec![mock::count_row(0)]])
                .append_exec_results([mock::affected(1)]),
        );

        let resp = service(&pool).play(7, None, None).await.unwrap();
        assert_eq!(resp.spins.len(), 1);
        assert_eq!(resp.spins[0].ticket_id, 5);
        assert_eq!(resp.spins[0].prize_type, PrizeType::Ticket);
        assert_eq!(resp.remaining_tickets, 0);

        let log = mock::statements(pool);
        let minted = log
            .match_indices(r#"INSERT INTO "user_wheel_tickets""#)
            .map(|(i, _)| i)
            .collect::<Vec<_>>();
        assert_eq!(minted.len(), 2);
        let commit = log.find("COMMIT").unwrap();
        assert!(minted.iter().all(|i| *i < commit));
        assert!(log.contains(r#""available_at""#));
        assert!(log.contains("SPIN"));
        assert!(!log.contains(r#"UPDATE "users""#));
    }
}
