//! 后台定时任务
//!
//! 启动时调用一次 `spawn_all`，任务通过 `tokio::spawn` 脱离运行，不会阻塞。
//! 单轮失败只记录日志，下一轮照常执行。

use crate::config::SwapConfig;
use crate::services::SwapService;
use std::time::Duration;

pub fn spawn_all(swap_service: SwapService, config: &SwapConfig) {
    // 抓取合约交易，确认或标记失败对应的兑换
    {
        let svc = swap_service.clone();
        let interval = Duration::from_secs(config.crawl_interval_secs.max(1));
        tokio::spawn(async move {
            loop {
                match svc.crawl_chain().await {
                    Ok(n) if n > 0 => log::info!("Swaps resolved from chain: {n}"),
                    Ok(_) => {}
                    Err(e) => log::error!("Failed to crawl swap contract: {e:?}"),
                }
                tokio::time::sleep(interval).await;
            }
        });
    }

    // 过期兑换结算
    {
        let svc = swap_service;
        let interval = Duration::from_secs(config.settle_interval_secs.max(1));
        tokio::spawn(async move {
            loop {
                match svc.settle_expired().await {
                    Ok(n) if n > 0 => log::info!("Expired swaps settled: {n}"),
                    Ok(_) => {}
                    Err(e) => log::error!("Failed to settle expired swaps: {e:?}"),
                }
                tokio::time::sleep(interval).await;
            }
        });
    }
}
