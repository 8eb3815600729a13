use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use solana_sdk::pubkey::Pubkey;

use crate::common::happypump::logs_data::{
    CompleteEvent, CreateEvent, SetGlobalCfgEvent, TradeEvent,
};
use crate::error::{ClientError, ClientResult};

/// The four event kinds emitted by the program
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "createEvent")]
    Create,
    #[serde(rename = "tradeEvent")]
    Trade,
    #[serde(rename = "completeEvent")]
    Complete,
    #[serde(rename = "setGlobalCfgEvent")]
    SetGlobalCfg,
}

impl EventKind {
    pub const ALL: [EventKind; 4] =
        [EventKind::Create, EventKind::Trade, EventKind::Complete, EventKind::SetGlobalCfg];

    pub fn from_tag(tag: &str) -> ClientResult<Self> {
        match tag {
            "createEvent" => Ok(EventKind::Create),
            "tradeEvent" => Ok(EventKind::Trade),
            "completeEvent" => Ok(EventKind::Complete),
            "setGlobalCfgEvent" => Ok(EventKind::SetGlobalCfg),
            other => Err(ClientError::UnknownEventKind(other.to_string())),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            EventKind::Create => "createEvent",
            EventKind::Trade => "tradeEvent",
            EventKind::Complete => "completeEvent",
            EventKind::SetGlobalCfg => "setGlobalCfgEvent",
        }
    }

    fn event_name(&self) -> &'static str {
        match self {
            EventKind::Create => "CreateEvent",
            EventKind::Trade => "TradeEvent",
            EventKind::Complete => "CompleteEvent",
            EventKind::SetGlobalCfg => "SetGlobalCfgEvent",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// HappyPump event enum
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HappyPumpEvent {
    Create(CreateEvent),
    Trade(TradeEvent),
    Complete(CompleteEvent),
    SetGlobalCfg(SetGlobalCfgEvent),
}

impl HappyPumpEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            HappyPumpEvent::Create(_) => EventKind::Create,
            HappyPumpEvent::Trade(_) => EventKind::Trade,
            HappyPumpEvent::Complete(_) => EventKind::Complete,
            HappyPumpEvent::SetGlobalCfg(_) => EventKind::SetGlobalCfg,
        }
    }
}

/// Decodes an untyped event record into a typed event.
///
/// Addresses may be given as base58 strings, hex strings or 32-element byte arrays. Integers
/// may be JSON numbers, decimal strings or `0x` hex strings.
pub fn decode_event(tag: &str, fields: &Map<String, Value>) -> ClientResult<HappyPumpEvent> {
    let kind = EventKind::from_tag(tag)?;
    let f = FieldReader { event: kind.event_name(), fields };

    let event = match kind {
        EventKind::Create => HappyPumpEvent::Create(CreateEvent {
            name: f.string("name")?,
            symbol: f.string("symbol")?,
            uri: f.string("uri")?,
            mint: f.address("mint")?,
            bonding_curve: f.address("bondingCurve")?,
            user: f.address("user")?,
            trade_authority: f.optional_address("tradeAuthority")?,
            // create events carry `ts`
            timestamp: match f.fields.get("ts") {
                Some(_) => f.timestamp("ts")?,
                None => f.timestamp("timestamp")?,
            },
            virtual_token_reserves: f.u64("virtualTokenReserves")?,
            virtual_sol_reserves: f.u64("virtualSolReserves")?,
            real_token_reserves: f.u64("realTokenReserves")?,
            real_sol_reserves: f.u64("realSolReserves")?,
        }),
        EventKind::Trade => HappyPumpEvent::Trade(TradeEvent {
            mint: f.address("mint")?,
            sol_amount: f.u64("solAmount")?,
            token_amount: f.u64("tokenAmount")?,
            is_buy: f.bool("isBuy")?,
            user: f.address("user")?,
            timestamp: f.timestamp("timestamp")?,
            virtual_sol_reserves: f.u64("virtualSolReserves")?,
            virtual_token_reserves: f.u64("virtualTokenReserves")?,
            real_sol_reserves: f.u64("realSolReserves")?,
            real_token_reserves: f.u64("realTokenReserves")?,
        }),
        EventKind::Complete => HappyPumpEvent::Complete(CompleteEvent {
            user: f.address("user")?,
            mint: f.address("mint")?,
            bonding_curve: f.address("bondingCurve")?,
            timestamp: f.timestamp("timestamp")?,
        }),
        EventKind::SetGlobalCfg => HappyPumpEvent::SetGlobalCfg(SetGlobalCfgEvent {
            fee_recipient: f.address("feeRecipient")?,
            mint_fee: f.u64("mintFee")?,
            creator_fee_basis_points: f.u64("creatorFeeBasisPoints")?,
            system_fee_basis_points: f.u64("systemFeeBasisPoints")?,
            initial_virtual_token_reserves: f.u64("initialVirtualTokenReserves")?,
            initial_virtual_sol_reserves: f.u64("initialVirtualSolReserves")?,
            initial_real_token_reserves: f.u64("initialRealTokenReserves")?,
            initial_real_sol_reserves: f.u64("initialRealSolReserves")?,
            initial_token_supply: f.u64("initialTokenSupply")?,
            timestamp: f.timestamp("timestamp")?,
        }),
    };
    Ok(event)
}

struct FieldReader<'a> {
    event: &'static str,
    fields: &'a Map<String, Value>,
}

impl FieldReader<'_> {
    fn malformed(&self, field: &str) -> ClientError {
        ClientError::MalformedEvent { event: self.event, field: field.to_string() }
    }

    fn required(&self, field: &str) -> ClientResult<&Value> {
        match self.fields.get(field) {
            Some(Value::Null) | None => Err(self.malformed(field)),
            Some(value) => Ok(value),
        }
    }

    fn string(&self, field: &str) -> ClientResult<String> {
        self.required(field)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.malformed(field))
    }

    fn bool(&self, field: &str) -> ClientResult<bool> {
        self.required(field)?.as_bool().ok_or_else(|| self.malformed(field))
    }

    fn u64(&self, field: &str) -> ClientResult<u64> {
        parse_u64(self.required(field)?).ok_or_else(|| self.malformed(field))
    }

    fn timestamp(&self, field: &str) -> ClientResult<i64> {
        parse_i64(self.required(field)?).ok_or_else(|| self.malformed(field))
    }

    fn address(&self, field: &str) -> ClientResult<Pubkey> {
        parse_address(self.required(field)?).ok_or_else(|| self.malformed(field))
    }

    fn optional_address(&self, field: &str) -> ClientResult<Option<Pubkey>> {
        match self.fields.get(field) {
            Some(Value::Null) | None => Ok(None),
            Some(value) => parse_address(value).map(Some).ok_or_else(|| self.malformed(field)),
        }
    }
}

fn parse_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => {
            let s = s.trim();
            match strip_hex_prefix(s) {
                Some(hex) => u64::from_str_radix(hex, 16).ok(),
                None => s.parse().ok(),
            }
        }
        _ => None,
    }
}

fn parse_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_address(value: &Value) -> Option<Pubkey> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Some(hex) = strip_hex_prefix(s) {
                return decode_hex_address(hex);
            }
            if s.len() == 64 {
                if let Some(pubkey) = decode_hex_address(s) {
                    return Some(pubkey);
                }
            }
            Pubkey::from_str(s).ok()
        }
        Value::Array(items) if items.len() == 32 => {
            let mut bytes = [0u8; 32];
            for (slot, item) in bytes.iter_mut().zip(items) {
                *slot = u8::try_from(item.as_u64()?).ok()?;
            }
            Some(Pubkey::new_from_array(bytes))
        }
        _ => None,
    }
}

fn strip_hex_prefix(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

fn decode_hex_address(hex: &str) -> Option<Pubkey> {
    if hex.len() != 64 || !hex.is_ascii() {
        return None;
    }
    let mut bytes = [0u8; 32];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(Pubkey::new_from_array(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn hex(pubkey: &Pubkey) -> String {
        pubkey.to_bytes().iter().map(|b| format!("{:02x}", b)).collect()
    }

    #[test]
    fn test_event_kind_tags() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_tag(kind.tag()).unwrap(), kind);
        }
        assert!(matches!(
            EventKind::from_tag("swapEvent"),
            Err(ClientError::UnknownEventKind(tag)) if tag == "swapEvent"
        ));
    }

    #[test]
    fn test_decode_trade_event() {
        let mint = Pubkey::new_unique();
        let user = Pubkey::new_unique();
        let record = fields(json!({
            "mint": mint.to_string(),
            "solAmount": 1_000_000_000u64,
            "tokenAmount": "34612903225806",
            "isBuy": true,
            "user": user.to_bytes().to_vec(),
            "timestamp": 1_700_000_000,
            "virtualSolReserves": "0x6fc23ac00",
            "virtualTokenReserves": 1_038_387_096_774_194u64,
            "realSolReserves": 1_000_000_000u64,
            "realTokenReserves": 758_487_096_774_194u64,
        }));

        let event = decode_event("tradeEvent", &record).unwrap();
        let HappyPumpEvent::Trade(trade) = event else {
            panic!("expected trade event");
        };
        assert_eq!(trade.mint, mint);
        assert_eq!(trade.user, user);
        assert_eq!(trade.token_amount, 34_612_903_225_806);
        assert_eq!(trade.virtual_sol_reserves, 30_000_000_000);
        assert!(trade.is_buy);
        assert_eq!(trade.timestamp, 1_700_000_000);
    }

    #[test]
    fn test_decode_create_event_uses_ts() {
        let mint = Pubkey::new_unique();
        let record = fields(json!({
            "name": "Happy",
            "symbol": "HAPPY",
            "uri": "https://example.com/meta.json",
            "mint": format!("0x{}", hex(&mint)),
            "bondingCurve": hex(&Pubkey::new_unique()),
            "user": Pubkey::new_unique().to_string(),
            "tradeAuthority": null,
            "ts": "1700000000",
            "virtualTokenReserves": 1u64,
            "virtualSolReserves": 2u64,
            "realTokenReserves": 3u64,
            "realSolReserves": 4u64,
        }));

        let HappyPumpEvent::Create(create) = decode_event("createEvent", &record).unwrap() else {
            panic!("expected create event");
        };
        assert_eq!(create.mint, mint);
        assert_eq!(create.trade_authority, None);
        assert_eq!(create.timestamp, 1_700_000_000);
        assert_eq!(create.real_sol_reserves, 4);
    }

    #[test]
    fn test_decode_create_event_with_trade_authority() {
        let authority = Pubkey::new_unique();
        let record = fields(json!({
            "name": "Happy",
            "symbol": "HAPPY",
            "uri": "",
            "mint": Pubkey::new_unique().to_string(),
            "bondingCurve": Pubkey::new_unique().to_string(),
            "user": Pubkey::new_unique().to_string(),
            "tradeAuthority": authority.to_string(),
            "timestamp": 5,
            "virtualTokenReserves": 1u64,
            "virtualSolReserves": 2u64,
            "realTokenReserves": 3u64,
            "realSolReserves": 4u64,
        }));

        let HappyPumpEvent::Create(create) = decode_event("createEvent", &record).unwrap() else {
            panic!("expected create event");
        };
        assert_eq!(create.trade_authority, Some(authority));
        assert_eq!(create.timestamp, 5);
    }

    #[test]
    fn test_decode_missing_field_is_malformed() {
        let record = fields(json!({
            "user": Pubkey::new_unique().to_string(),
            "mint": Pubkey::new_unique().to_string(),
            "timestamp": 1,
        }));
        let err = decode_event("completeEvent", &record).unwrap_err();
        assert!(matches!(
            err,
            ClientError::MalformedEvent { event: "CompleteEvent", ref field }
                if field == "bondingCurve"
        ));
    }

    #[test]
    fn test_decode_bad_address_is_malformed() {
        let record = fields(json!({
            "user": "not-an-address",
            "mint": Pubkey::new_unique().to_string(),
            "bondingCurve": Pubkey::new_unique().to_string(),
            "timestamp": 1,
        }));
        assert!(matches!(
            decode_event("completeEvent", &record),
            Err(ClientError::MalformedEvent { .. })
        ));
    }

    #[test]
    fn test_decode_set_global_cfg_event() {
        let fee_recipient = Pubkey::new_unique();
        let record = fields(json!({
            "feeRecipient": fee_recipient.to_string(),
            "mintFee": "20000000",
            "creatorFeeBasisPoints": 5,
            "systemFeeBasisPoints": 95,
            "initialVirtualTokenReserves": "1073000000000000",
            "initialVirtualSolReserves": "30000000000",
            "initialRealTokenReserves": "793100000000000",
            "initialRealSolReserves": 0,
            "initialTokenSupply": "1000000000000000",
            "timestamp": 7,
        }));

        let HappyPumpEvent::SetGlobalCfg(cfg) = decode_event("setGlobalCfgEvent", &record).unwrap()
        else {
            panic!("expected set global cfg event");
        };
        assert_eq!(cfg.fee_recipient, fee_recipient);
        assert_eq!(cfg.mint_fee, 20_000_000);
        assert_eq!(cfg.system_fee_basis_points, 95);
        assert_eq!(cfg.initial_token_supply, 1_000_000_000_000_000);
    }

    #[test]
    fn test_parse_address_rejects_short_arrays() {
        assert_eq!(parse_address(&json!([1, 2, 3])), None);
        assert_eq!(parse_address(&json!(vec![256u32; 32])), None);
    }
}
