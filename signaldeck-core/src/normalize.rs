//! Shape normalizer: one upstream document in, one canonical `Signal` out.
//!
//! Upstream documents come in several shapes. They are resolved once, here,
//! into the tagged unions below; nothing downstream inspects raw JSON again.
//!
//! - Body: wrapped under a `signal` key, or bare at the document root.
//! - Entry range: `[min, max]` pair or `{min, max}` bounds.
//! - Targets: `take_profit: [..]` or `targets: [{price}, ..]`.
//! - Risk and sizing fields under several synonym keys (first listed wins).

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tracing::debug;

use crate::coalesce::{
    coalesce_display, display_value, first_present, first_scalar, lookup, NOT_AVAILABLE,
};
use crate::error::SignalError;
use crate::signal::{
    Action, Classification, Count, DataType, PositionSizing, Recommendation, RiskManagement,
    Signal, TechnicalAnalysis, Trend,
};

/// Sections whose presence marks an object as a signal body.
const BODY_SECTIONS: [&str; 6] = [
    "classification",
    "recommendation",
    "position_sizing",
    "technical_analysis",
    "risk_management",
    "reasoning",
];

const DEFAULT_CONFIDENCE: &str = "LOW";
const DEFAULT_REASONING: &str = "No reasoning provided";

// Synonym lists, in priority order.
const WIN_RATE: [&str; 2] = ["classification.expected_win_rate", "classification.win_rate"];
const POSITION_SIZE: [&str; 2] = [
    "position_sizing.suggested_position_size",
    "position_sizing.position_size",
];
const PORTFOLIO_RISK: [&str; 2] = [
    "position_sizing.max_portfolio_risk",
    "position_sizing.portfolio_risk",
];
const TA_TREND: [&str; 2] = ["technical_analysis.trend_direction", "technical_analysis.trend"];
const MAX_DRAWDOWN: [&str; 2] = ["recommendation.max_drawdown", "risk_management.max_drawdown"];
// `stop_loss` may be a bare level or a `{price, percentage}` record.
const STOP_LOSS: [&str; 5] = [
    "recommendation.stop_loss.price",
    "recommendation.stop_loss.percentage",
    "recommendation.stop_loss",
    "risk_management.stop_loss.price",
    "risk_management.stop_loss.percentage",
];

/// Where the signal body lives inside a document.
#[derive(Debug, Clone, Copy)]
pub enum SourceShape<'a> {
    /// `{ "signal": { ..body.. }, "timestamp": .. }`
    Wrapped(&'a Value),
    /// The document is the body.
    Bare(&'a Value),
}

impl<'a> SourceShape<'a> {
    /// Resolve the body. `None` when neither the `signal` key nor the
    /// document itself is an object.
    pub fn detect(doc: &'a Value) -> Option<Self> {
        match doc.get("signal") {
            Some(inner @ Value::Object(_)) => Some(SourceShape::Wrapped(inner)),
            _ if doc.is_object() => Some(SourceShape::Bare(doc)),
            _ => None,
        }
    }

    pub fn body(self) -> &'a Value {
        match self {
            SourceShape::Wrapped(body) | SourceShape::Bare(body) => body,
        }
    }

    fn has_recognised_sections(self) -> bool {
        BODY_SECTIONS
            .iter()
            .any(|section| lookup(self.body(), section).is_some())
    }
}

/// Encoding of `recommendation.entry_range`.
#[derive(Debug, Clone, Copy)]
pub enum EntryRange<'a> {
    Pair(Option<&'a Value>, Option<&'a Value>),
    Bounds {
        min: Option<&'a Value>,
        max: Option<&'a Value>,
    },
    Absent,
}

impl<'a> EntryRange<'a> {
    pub fn resolve(body: &'a Value) -> Self {
        match lookup(body, "recommendation.entry_range") {
            Some(Value::Array(items)) if !items.is_empty() => {
                EntryRange::Pair(present(items.first()), present(items.get(1)))
            }
            Some(range @ Value::Object(_)) => EntryRange::Bounds {
                min: lookup(range, "min"),
                max: lookup(range, "max"),
            },
            _ => EntryRange::Absent,
        }
    }

    /// `"<min> - <max>"`, with `"N/A"` for a missing side.
    pub fn render(&self) -> String {
        match self {
            EntryRange::Pair(min, max) | EntryRange::Bounds { min, max } => {
                format!("{} - {}", side(*min), side(*max))
            }
            EntryRange::Absent => NOT_AVAILABLE.to_string(),
        }
    }
}

/// Encoding of the profit targets.
#[derive(Debug, Clone, Copy)]
pub enum Targets<'a> {
    /// `recommendation.take_profit`: bare prices.
    TakeProfit(&'a [Value]),
    /// `recommendation.targets`: `{price}` records or bare numbers.
    PriceList(&'a [Value]),
    Absent,
}

impl<'a> Targets<'a> {
    pub fn resolve(body: &'a Value) -> Self {
        if let Some(Value::Array(items)) = lookup(body, "recommendation.take_profit") {
            return Targets::TakeProfit(items);
        }
        if let Some(Value::Array(items)) = lookup(body, "recommendation.targets") {
            return Targets::PriceList(items);
        }
        Targets::Absent
    }

    pub fn render(&self) -> String {
        let prices: Vec<String> = match self {
            Targets::TakeProfit(items) => items.iter().map(display_value).collect(),
            Targets::PriceList(items) => items.iter().map(target_price).collect(),
            Targets::Absent => Vec::new(),
        };
        if prices.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            prices.join(" - ")
        }
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn side(value: Option<&Value>) -> String {
    value
        .map(display_value)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn target_price(target: &Value) -> String {
    match target {
        Value::Object(_) => side(lookup(target, "price")),
        other => display_value(other),
    }
}

fn reward_targets(body: &Value) -> Count {
    match lookup(body, "risk_management.reward_targets") {
        Some(Value::Array(items)) => return Count::Known(items.len()),
        Some(Value::Number(n)) => {
            if let Some(n) = n.as_u64() {
                return Count::Known(n as usize);
            }
        }
        _ => {}
    }
    match lookup(body, "recommendation.take_profit") {
        Some(Value::Array(items)) => Count::Known(items.len()),
        _ => Count::NotAvailable,
    }
}

fn field(body: &Value, paths: &[&str]) -> String {
    coalesce_display(body, paths, NOT_AVAILABLE)
}

/// Normalize using the current wall clock for documents without a timestamp.
pub fn normalize(doc: &Value, pair: &str, timeframe: Option<&str>) -> Result<Signal, SignalError> {
    normalize_at(doc, pair, timeframe, Utc::now())
}

/// Normalize with an explicit clock. `now` is used only for the timestamp
/// when the source omits one, so fixed documents normalize identically.
pub fn normalize_at(
    doc: &Value,
    pair: &str,
    timeframe: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Signal, SignalError> {
    let shape = SourceShape::detect(doc)
        .filter(|shape| shape.has_recognised_sections())
        .ok_or_else(|| SignalError::EmptyBody {
            pair: pair.to_string(),
        })?;
    let body = shape.body();

    let kind = field(body, &["classification.type"]);
    let action_text = field(body, &["recommendation.action"]);

    let timestamp = first_present(doc, &["timestamp"])
        .or_else(|| first_present(body, &["timestamp"]))
        .map(display_value)
        .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true));

    let signal = Signal {
        pair: pair.to_string(),
        timeframe: timeframe.map(str::to_string),
        timestamp,
        classification: Classification {
            kind: kind.clone(),
            confidence: coalesce_display(body, &["classification.confidence"], DEFAULT_CONFIDENCE),
            confluence_score: field(body, &["classification.confluence_score"]),
            win_rate: field(body, &WIN_RATE),
        },
        recommendation: Recommendation {
            action: action_text.clone(),
            entry_range: EntryRange::resolve(body).render(),
            targets: Targets::resolve(body).render(),
            stop_loss: first_scalar(body, &STOP_LOSS)
                .map(display_value)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            risk_reward_ratio: field(body, &["recommendation.risk_reward_ratio"]),
        },
        position_sizing: PositionSizing {
            confidence_tier: field(body, &["position_sizing.confidence_tier"]),
            position_size: field(body, &POSITION_SIZE),
            portfolio_risk: field(body, &PORTFOLIO_RISK),
        },
        technical_analysis: TechnicalAnalysis {
            primary_timeframe: field(body, &["technical_analysis.primary_timeframe"]),
            trend: field(body, &TA_TREND),
            volume_confirmation: field(body, &["technical_analysis.volume_confirmation"]),
            pattern_strength: field(body, &["technical_analysis.pattern_strength"]),
        },
        risk_management: RiskManagement {
            stop_loss_type: field(body, &["risk_management.stop_loss_type"]),
            reward_targets: reward_targets(body),
            exit_strategy: field(body, &["risk_management.exit_strategy"]),
            max_drawdown: field(body, &MAX_DRAWDOWN),
        },
        reasoning: coalesce_display(body, &["reasoning"], DEFAULT_REASONING),
        trend: Trend::from_classification(&kind),
        action: Action::from_recommendation(&action_text),
        data_type: DataType::Main,
    };

    debug!(
        pair,
        timeframe = timeframe.unwrap_or("main"),
        trend = %signal.trend,
        action = %signal.action,
        "normalized signal document"
    );
    Ok(signal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn full_document() -> Value {
        json!({
            "timestamp": "2025-02-28T08:00:00Z",
            "signal": {
                "classification": {
                    "type": "STRONG_BULLISH_BREAKOUT",
                    "confidence": "HIGH",
                    "confluence_score": 8,
                    "expected_win_rate": 72
                },
                "recommendation": {
                    "action": "BUY",
                    "entry_range": [45000, 46000],
                    "take_profit": [48000, 50000, 52000],
                    "stop_loss": 44000,
                    "risk_reward_ratio": "1:3"
                },
                "position_sizing": {
                    "confidence_tier": "TIER_1",
                    "suggested_position_size": 2.5,
                    "max_portfolio_risk": 1.5
                },
                "technical_analysis": {
                    "primary_timeframe": "1d",
                    "trend_direction": "UPTREND",
                    "volume_confirmation": "HIGH",
                    "pattern_strength": "STRONG"
                },
                "risk_management": {
                    "stop_loss_type": "ATR",
                    "exit_strategy": "SCALE_OUT",
                    "max_drawdown": 4.2
                },
                "reasoning": "Breakout above resistance on rising volume."
            }
        })
    }

    #[test]
    fn wrapped_document_normalizes_every_field() {
        let s = normalize_at(&full_document(), "BTC-USDT", None, fixed_now()).unwrap();
        assert_eq!(s.pair, "BTC-USDT");
        assert_eq!(s.timeframe, None);
        assert_eq!(s.timestamp, "2025-02-28T08:00:00Z");
        assert_eq!(s.classification.kind, "STRONG_BULLISH_BREAKOUT");
        assert_eq!(s.classification.confidence, "HIGH");
        assert_eq!(s.classification.confluence_score, "8");
        assert_eq!(s.classification.win_rate, "72");
        assert_eq!(s.recommendation.action, "BUY");
        assert_eq!(s.recommendation.entry_range, "45000 - 46000");
        assert_eq!(s.recommendation.targets, "48000 - 50000 - 52000");
        assert_eq!(s.recommendation.stop_loss, "44000");
        assert_eq!(s.recommendation.risk_reward_ratio, "1:3");
        assert_eq!(s.position_sizing.position_size, "2.5");
        assert_eq!(s.position_sizing.portfolio_risk, "1.5");
        assert_eq!(s.technical_analysis.trend, "UPTREND");
        assert_eq!(s.risk_management.reward_targets, Count::Known(3));
        assert_eq!(s.risk_management.max_drawdown, "4.2");
        assert_eq!(s.trend, Trend::Bullish);
        assert_eq!(s.action, Action::Buy);
        assert_eq!(s.data_type, DataType::Main);
    }

    #[test]
    fn bare_document_is_its_own_body() {
        let doc = json!({
            "classification": {"type": "BEARISH", "confidence": "MEDIUM"},
            "recommendation": {"action": "SHORT_ENTRY"}
        });
        let s = normalize_at(&doc, "ETH-USDT", Some("1h"), fixed_now()).unwrap();
        assert_eq!(s.timeframe.as_deref(), Some("1h"));
        assert_eq!(s.trend, Trend::Bearish);
        assert_eq!(s.action, Action::Sell);
        assert_eq!(s.data_type, DataType::Main);
    }

    #[test]
    fn missing_fields_take_typed_defaults() {
        let doc = json!({"reasoning": "thin"});
        let s = normalize_at(&doc, "SOL-USDT", None, fixed_now()).unwrap();
        assert_eq!(s.classification.kind, NOT_AVAILABLE);
        assert_eq!(s.classification.confidence, "LOW");
        assert_eq!(s.classification.win_rate, NOT_AVAILABLE);
        assert_eq!(s.recommendation.entry_range, NOT_AVAILABLE);
        assert_eq!(s.recommendation.targets, NOT_AVAILABLE);
        assert_eq!(s.recommendation.stop_loss, NOT_AVAILABLE);
        assert_eq!(s.position_sizing.position_size, NOT_AVAILABLE);
        assert_eq!(s.risk_management.reward_targets, Count::NotAvailable);
        assert_eq!(s.trend, Trend::Neutral);
        assert_eq!(s.action, Action::Wait);
        assert_eq!(s.timestamp, "2025-03-01T12:00:00.000Z");
    }

    #[test]
    fn reasoning_defaults_when_absent() {
        let doc = json!({"classification": {"type": "RANGE"}});
        let s = normalize_at(&doc, "X", None, fixed_now()).unwrap();
        assert_eq!(s.reasoning, "No reasoning provided");
    }

    #[test]
    fn entry_range_encodings_render_identically() {
        let pair = json!({"recommendation": {"entry_range": [45000, 46000]}});
        let bounds = json!({"recommendation": {"entry_range": {"min": 45000, "max": 46000}}});
        let a = normalize_at(&pair, "BTC-USDT", None, fixed_now()).unwrap();
        let b = normalize_at(&bounds, "BTC-USDT", None, fixed_now()).unwrap();
        assert_eq!(a.recommendation.entry_range, "45000 - 46000");
        assert_eq!(a.recommendation.entry_range, b.recommendation.entry_range);
    }

    #[test]
    fn entry_range_bounds_with_missing_side() {
        let doc = json!({"recommendation": {"entry_range": {"min": 45000}}});
        let s = normalize_at(&doc, "BTC-USDT", None, fixed_now()).unwrap();
        assert_eq!(s.recommendation.entry_range, "45000 - N/A");
    }

    #[test]
    fn entry_range_scalar_is_not_available() {
        let doc = json!({"recommendation": {"entry_range": "45000"}});
        let s = normalize_at(&doc, "BTC-USDT", None, fixed_now()).unwrap();
        assert_eq!(s.recommendation.entry_range, NOT_AVAILABLE);
    }

    #[test]
    fn targets_from_price_records() {
        let doc = json!({"recommendation": {"targets": [{"price": 48000}, {"price": 50000}, 52000]}});
        let s = normalize_at(&doc, "BTC-USDT", None, fixed_now()).unwrap();
        assert_eq!(s.recommendation.targets, "48000 - 50000 - 52000");
    }

    #[test]
    fn take_profit_preferred_over_targets() {
        let doc = json!({"recommendation": {
            "take_profit": [1, 2],
            "targets": [{"price": 9}]
        }});
        let s = normalize_at(&doc, "BTC-USDT", None, fixed_now()).unwrap();
        assert_eq!(s.recommendation.targets, "1 - 2");
    }

    #[test]
    fn primary_synonym_beats_secondary() {
        let doc = json!({
            "classification": {"expected_win_rate": 80, "win_rate": 55},
            "position_sizing": {"suggested_position_size": 3, "position_size": 1,
                                "max_portfolio_risk": 2, "portfolio_risk": 9},
            "recommendation": {"max_drawdown": 5},
            "risk_management": {"max_drawdown": 7}
        });
        let s = normalize_at(&doc, "BTC-USDT", None, fixed_now()).unwrap();
        assert_eq!(s.classification.win_rate, "80");
        assert_eq!(s.position_sizing.position_size, "3");
        assert_eq!(s.position_sizing.portfolio_risk, "2");
        assert_eq!(s.risk_management.max_drawdown, "5");
    }

    #[test]
    fn secondary_synonym_used_when_primary_missing() {
        let doc = json!({
            "classification": {"win_rate": 55},
            "risk_management": {"max_drawdown": 7}
        });
        let s = normalize_at(&doc, "BTC-USDT", None, fixed_now()).unwrap();
        assert_eq!(s.classification.win_rate, "55");
        assert_eq!(s.risk_management.max_drawdown, "7");
    }

    #[test]
    fn stop_loss_object_renders_its_price() {
        let doc = json!({"recommendation": {"stop_loss": {"price": 44000, "type": "HARD"}}});
        let s = normalize_at(&doc, "BTC-USDT", None, fixed_now()).unwrap();
        assert_eq!(s.recommendation.stop_loss, "44000");

        let doc = json!({"risk_management": {"stop_loss": {"percentage": 2.5}}});
        let s = normalize_at(&doc, "BTC-USDT", None, fixed_now()).unwrap();
        assert_eq!(s.recommendation.stop_loss, "2.5");
    }

    #[test]
    fn stop_loss_record_without_price_uses_its_percentage() {
        let doc = json!({"recommendation": {"stop_loss": {"percentage": 2.5}}});
        let s = normalize_at(&doc, "BTC-USDT", None, fixed_now()).unwrap();
        assert_eq!(s.recommendation.stop_loss, "2.5");

        // A record with neither field never leaks as JSON text.
        let doc = json!({
            "recommendation": {"stop_loss": {"type": "TRAILING"}},
            "risk_management": {"stop_loss": {"price": 41000}}
        });
        let s = normalize_at(&doc, "BTC-USDT", None, fixed_now()).unwrap();
        assert_eq!(s.recommendation.stop_loss, "41000");

        let doc = json!({"recommendation": {"stop_loss": {"type": "TRAILING"}}});
        let s = normalize_at(&doc, "BTC-USDT", None, fixed_now()).unwrap();
        assert_eq!(s.recommendation.stop_loss, NOT_AVAILABLE);
    }

    #[test]
    fn reward_targets_count_sources() {
        let doc = json!({"risk_management": {"reward_targets": [1.5, 3.0]}});
        let s = normalize_at(&doc, "X", None, fixed_now()).unwrap();
        assert_eq!(s.risk_management.reward_targets, Count::Known(2));

        let doc = json!({"risk_management": {"reward_targets": 3}});
        let s = normalize_at(&doc, "X", None, fixed_now()).unwrap();
        assert_eq!(s.risk_management.reward_targets, Count::Known(3));
    }

    #[test]
    fn empty_bodies_are_rejected() {
        for doc in [json!(null), json!(42), json!("text"), json!([1, 2]), json!({}),
                    json!({"signal": {}}), json!({"unrelated": true})] {
            let err = normalize_at(&doc, "BTC-USDT", None, fixed_now()).unwrap_err();
            assert_eq!(err, SignalError::EmptyBody { pair: "BTC-USDT".into() });
        }
    }

    #[test]
    fn non_object_signal_key_falls_back_to_root() {
        let doc = json!({"signal": null, "classification": {"type": "BULLISH"}});
        let s = normalize_at(&doc, "BTC-USDT", None, fixed_now()).unwrap();
        assert_eq!(s.trend, Trend::Bullish);
    }

    #[test]
    fn normalization_is_idempotent_for_fixed_documents() {
        let doc = full_document();
        let a = normalize(&doc, "BTC-USDT", None).unwrap();
        let b = normalize(&doc, "BTC-USDT", None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn upstream_trend_enum_is_ignored() {
        let doc = json!({
            "classification": {"type": "CONSOLIDATION"},
            "trend": "bullish",
            "action": "buy"
        });
        let s = normalize_at(&doc, "X", None, fixed_now()).unwrap();
        assert_eq!(s.trend, Trend::Neutral);
        assert_eq!(s.action, Action::Wait);
    }
}
