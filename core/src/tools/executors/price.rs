//! Crypto price lookup against a Binance-style ticker endpoint.

use crate::tools::registry::ToolHandler;
use crate::tools::types::{CryptoPriceArgs, PriceQuote, ToolError, ToolSpec};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

pub const PRICE_TOOL_NAME: &str = "crypto_price";
pub const QUOTE_SUFFIX: &str = "USDT";
pub const DEFAULT_PRICE_URL: &str = "https://api.binance.com/api/v3/ticker/price";

/// Where to fetch quotes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceConfig {
    pub endpoint: String,
}

impl PriceConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into() }
    }

    /// Optional: COINCHAT_PRICE_URL (default: Binance public ticker)
    pub fn from_env() -> Self {
        let endpoint = std::env::var("COINCHAT_PRICE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PRICE_URL.to_string());
        Self { endpoint }
    }
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PRICE_URL)
    }
}

/// Price lookup tool. Holds no state between calls.
pub struct PriceExecutor {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct TickerPrice {
    #[serde(default)]
    price: Option<Value>,
}

impl PriceExecutor {
    pub fn new(config: PriceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint,
        }
    }

    /// "btc" -> "BTCUSDT"
    pub fn trading_pair(symbol: &str) -> String {
        format!("{}{}", symbol.trim().to_uppercase(), QUOTE_SUFFIX)
    }

    /// Look up a symbol and render the result for the model
    pub async fn lookup(&self, symbol: &str) -> String {
        self.quote(symbol).await.to_string()
    }

    /// Look up a symbol. Never fails: every outcome is a `PriceQuote`.
    pub async fn quote(&self, symbol: &str) -> PriceQuote {
        let pair = Self::trading_pair(symbol);
        debug!("Fetching price for {}", pair);

        let response = match self
            .client
            .get(&self.endpoint)
            .query(&[("symbol", pair.as_str())])
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Price request for {} failed: {}", pair, e);
                return PriceQuote::Failed { reason: e.to_string() };
            }
        };

        if !response.status().is_success() {
            debug!("Price endpoint returned {} for {}", response.status(), pair);
            return PriceQuote::NotFound {
                symbol: symbol.trim().to_string(),
            };
        }

        let ticker: TickerPrice = match response.json().await {
            Ok(ticker) => ticker,
            Err(e) => {
                warn!("Could not decode price for {}: {}", pair, e);
                return PriceQuote::Failed { reason: e.to_string() };
            }
        };

        let price = match ticker.price {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => {
                return PriceQuote::Failed {
                    reason: format!("unexpected price value: {}", other),
                }
            }
            None => {
                return PriceQuote::Failed {
                    reason: "response did not include a price".to_string(),
                }
            }
        };

        PriceQuote::Found {
            symbol: symbol.trim().to_uppercase(),
            price,
        }
    }
}

#[async_trait]
impl ToolHandler for PriceExecutor {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: PRICE_TOOL_NAME.to_string(),
            description: "Get real-time crypto price in USD using Binance public API.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "symbol": {
                        "type": "string",
                        "description": "Cryptocurrency symbol, e.g. BTC, ETH, SHIB"
                    }
                },
                "required": ["symbol"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<String, ToolError> {
        let args: CryptoPriceArgs =
            serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments {
                tool: PRICE_TOOL_NAME.to_string(),
                reason: e.to_string(),
            })?;
        Ok(self.lookup(&args.symbol).await)
    }
}
