use base64::engine::general_purpose;
use base64::Engine;
use borsh::BorshDeserialize;

use crate::common::happypump::logs_events::HappyPumpEvent;
use crate::constants::happypump::discriminators;
use crate::error::{ClientError, ClientResult};

pub const PROGRAM_DATA: &str = "Program data: ";

/// Extracts the events emitted through `Program data:` log lines.
///
/// Lines that are not valid base64 or are too short to carry a discriminator are not event
/// payloads and are skipped silently. Payloads with an unknown discriminator or a body that
/// fails to decode are logged at warn level and skipped.
pub fn parse_logs(logs: &[String]) -> Vec<HappyPumpEvent> {
    let mut events = Vec::new();

    for log in logs {
        let Some(event_data) = log.strip_prefix(PROGRAM_DATA) else {
            continue;
        };
        let borsh_bytes = match general_purpose::STANDARD.decode(event_data.trim()) {
            Ok(bytes) => bytes,
            Err(_) => continue,
        };
        if borsh_bytes.len() < 8 {
            continue;
        }

        let (discriminator, data) = borsh_bytes.split_at(8);
        match parse_event(discriminator, data) {
            Ok(event) => events.push(event),
            Err(e) => log::warn!("skipping program data: {}", e),
        }
    }

    events
}

fn parse_event(discriminator: &[u8], data: &[u8]) -> ClientResult<HappyPumpEvent> {
    match discriminator {
        d if d == discriminators::CREATE_EVENT => {
            decode_payload("createEvent", data).map(HappyPumpEvent::Create)
        }
        d if d == discriminators::TRADE_EVENT => {
            decode_payload("tradeEvent", data).map(HappyPumpEvent::Trade)
        }
        d if d == discriminators::COMPLETE_EVENT => {
            decode_payload("completeEvent", data).map(HappyPumpEvent::Complete)
        }
        d if d == discriminators::SET_GLOBAL_CFG_EVENT => {
            decode_payload("setGlobalCfgEvent", data).map(HappyPumpEvent::SetGlobalCfg)
        }
        _ => Err(ClientError::UnknownEventKind(format!("discriminator {:?}", discriminator))),
    }
}

fn decode_payload<T: BorshDeserialize>(event: &'static str, mut data: &[u8]) -> ClientResult<T> {
    T::deserialize(&mut data).map_err(|e| ClientError::MalformedEvent {
        event,
        field: format!("payload ({})", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::happypump::logs_data::{CompleteEvent, CreateEvent, TradeEvent};
    use solana_sdk::pubkey::Pubkey;

    fn program_data(discriminator: [u8; 8], payload: Vec<u8>) -> String {
        let mut bytes = discriminator.to_vec();
        bytes.extend(payload);
        format!("{}{}", PROGRAM_DATA, general_purpose::STANDARD.encode(bytes))
    }

    fn trade_event(sol_amount: u64) -> TradeEvent {
        TradeEvent {
            mint: Pubkey::new_unique(),
            sol_amount,
            token_amount: 42,
            is_buy: true,
            user: Pubkey::new_unique(),
            timestamp: 1_700_000_000,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_logs_extracts_events_in_order() {
        let trade = trade_event(1_000);
        let complete = CompleteEvent {
            user: Pubkey::new_unique(),
            mint: trade.mint,
            bonding_curve: Pubkey::new_unique(),
            timestamp: 9,
        };
        let logs = vec![
            "Program log: Instruction: Buy".to_string(),
            program_data(discriminators::TRADE_EVENT, borsh::to_vec(&trade).unwrap()),
            program_data(discriminators::COMPLETE_EVENT, borsh::to_vec(&complete).unwrap()),
        ];

        let events = parse_logs(&logs);
        assert_eq!(
            events,
            vec![HappyPumpEvent::Trade(trade), HappyPumpEvent::Complete(complete)]
        );
    }

    #[test]
    fn test_parse_logs_decodes_create_event_with_authority() {
        let create = CreateEvent {
            name: "Happy".to_string(),
            symbol: "HAPPY".to_string(),
            uri: "https://example.com".to_string(),
            mint: Pubkey::new_unique(),
            trade_authority: Some(Pubkey::new_unique()),
            ..Default::default()
        };
        let logs =
            vec![program_data(discriminators::CREATE_EVENT, borsh::to_vec(&create).unwrap())];
        assert_eq!(parse_logs(&logs), vec![HappyPumpEvent::Create(create)]);
    }

    #[test]
    fn test_parse_event_reports_unknown_discriminator() {
        assert!(matches!(
            parse_event(&[9u8; 8], &[]),
            Err(ClientError::UnknownEventKind(_))
        ));
        assert!(matches!(
            parse_event(&discriminators::TRADE_EVENT, &[1, 2, 3]),
            Err(ClientError::MalformedEvent { event: "tradeEvent", .. })
        ));
    }

    #[test]
    fn test_parse_logs_skips_garbage() {
        let trade = trade_event(5);
        let logs = vec![
            format!("{}not base64!", PROGRAM_DATA),
            format!("{}{}", PROGRAM_DATA, general_purpose::STANDARD.encode([1u8, 2, 3])),
            program_data([0u8; 8], vec![1, 2, 3]),
            program_data(discriminators::TRADE_EVENT, vec![1, 2, 3]),
            program_data(discriminators::TRADE_EVENT, borsh::to_vec(&trade).unwrap()),
        ];
        assert_eq!(parse_logs(&logs), vec![HappyPumpEvent::Trade(trade)]);
    }
}
