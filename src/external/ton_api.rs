use crate::config::SwapConfig;
use crate::error::{AppError, AppResult};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

/// 合约成功处理兑换后回写的文本
pub const SWAP_SUCCESS_TEXT: &str = "Swap to jetton successfully";
const PAGE_LIMIT: u32 = 10;

/// 链上交易解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSwapRecord {
    pub signature: String,
    pub is_success: bool,
    pub lt: i64,
}

/// 一页合约交易：可识别的兑换记录，以及本页最大的逻辑时间
///
/// last_lt 覆盖整页（包括没有签名的交易），用作下一次抓取的游标。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainPage {
    pub records: Vec<ChainSwapRecord>,
    pub last_lt: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TransactionsResponse {
    #[serde(default)]
    transactions: Vec<RawTransaction>,
}

#[derive(Debug, Deserialize)]
struct RawTransaction {
    lt: i64,
    #[serde(default)]
    success: bool,
    in_msg: Option<RawMessage>,
    #[serde(default)]
    out_msgs: Vec<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    decoded_body: Option<Value>,
}

/// 从 in_msg 的解码体中取签名，从第一条 out_msg 中取合约回执文本
fn parse_transaction(tx: &RawTransaction) -> Option<ChainSwapRecord> {
    let body = tx.in_msg.as_ref()?.decoded_body.as_ref()?;
    let signature = body
        .get("signature")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())?
        .to_lowercase();

    let reply = tx
        .out_msgs
        .first()
        .and_then(|m| m.decoded_body.as_ref())
        .and_then(|b| {
            b.get("text")
                .or_else(|| b.pointer("/forward_payload/value/value/text"))
                .and_then(Value::as_str)
        });

    Some(ChainSwapRecord {
        signature,
        is_success: tx.success && reply == Some(SWAP_SUCCESS_TEXT),
        lt: tx.lt,
    })
}

/// 解析 tonapi 返回体，忽略无法识别的交易
pub fn parse_chain_transactions(body: &str) -> AppResult<ChainPage> {
    let resp: TransactionsResponse = serde_json::from_str(body)?;
    Ok(ChainPage {
        records: resp
            .transactions
            .iter()
            .filter_map(parse_transaction)
            .collect(),
        last_lt: resp.transactions.iter().map(|tx| tx.lt).max(),
    })
}

#[derive(Clone)]
pub struct TonApiClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl TonApiClient {
    pub fn new(cfg: &SwapConfig) -> Self {
        let http = Client::builder()
            .user_agent("pointhub-backend/tonapi")
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Failed to build TON API client, using defaults: {e}");
                Client::new()
            });
        Self {
            http,
            base_url: cfg.ton_api_url.trim_end_matches('/').to_string(),
            api_key: cfg.ton_api_key.clone().filter(|k| !k.is_empty()),
        }
    }

    /// 拉取账户在 after_lt 之后的交易（升序）
    pub async fn account_transactions(
        &self,
        account: &str,
        after_lt: i64,
    ) -> AppResult<ChainPage> {
        let url = format!("{}/v2/blockchain/accounts/{account}/transactions", self.base_url);
        let mut req = self.http.get(&url).query(&[
            ("after_lt", after_lt.to_string()),
            ("limit", PAGE_LIMIT.to_string()),
            ("sort_order", "asc".to_string()),
        ]);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(AppError::ExternalApiError(format!(
                "TON API HTTP {}: {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            )));
        }
        parse_chain_transactions(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chain_transactions() {
        let body = r#"{
            "transactions": [
                {
                    "lt": 100,
                    "success": true,
                    "in_msg": {"decoded_body": {"signature": "ABCD"}},
                    "out_msgs": [{"decoded_body": {"text": "Swap to jetton successfully"}}]
                },
                {
                    "lt": 101,
                    "success": true,
                    "in_msg": {"decoded_body": {"signature": "ef01"}},
                    "out_msgs": [{"decoded_body": {"forward_payload": {"value": {"value": {"text": "Not enough balance"}}}}}]
                },
                {
                    "lt": 102,
                    "success": false,
                    "in_msg": {"decoded_body": {"signature": "9999"}},
                    "out_msgs": [{"decoded_body": {"text": "Swap to jetton successfully"}}]
                },
                {
                    "lt": 103,
                    "success": true,
                    "in_msg": {"decoded_body": {"query_id": 1}},
                    "out_msgs": []
                },
                {"lt": 104, "success": true, "out_msgs": []}
            ]
        }"#;

        let page = parse_chain_transactions(body).unwrap();
        assert_eq!(page.last_lt, Some(104));
        assert_eq!(
            page.records,
            vec![
                ChainSwapRecord { signature: "abcd".into(), is_success: true, lt: 100 },
                ChainSwapRecord { signature: "ef01".into(), is_success: false, lt: 101 },
                ChainSwapRecord { signature: "9999".into(), is_success: false, lt: 102 },
            ]
        );
    }

    #[test]
    fn test_page_without_swaps_still_advances_cursor() {
        let txs: Vec<serde_json::Value> = (1..=10)
            .map(|lt| {
                serde_json::json!({
                    "lt": lt,
                    "success": true,
                    "in_msg": {"decoded_body": {"query_id": lt}},
                    "out_msgs": []
                })
            })
            .collect();
        let body = serde_json::json!({ "transactions": txs }).to_string();

        let page = parse_chain_transactions(&body).unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.last_lt, Some(10));
    }

    #[test]
    fn test_parse_empty_and_malformed() {
        assert_eq!(parse_chain_transactions("{}").unwrap(), ChainPage::default());
        assert!(parse_chain_transactions("not json").is_err());
    }
}
