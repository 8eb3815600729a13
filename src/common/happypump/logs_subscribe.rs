use std::sync::Arc;

use futures::StreamExt;
use solana_client::{
    nonblocking::pubsub_client::PubsubClient,
    rpc_config::{RpcTransactionLogsConfig, RpcTransactionLogsFilter},
};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use tokio::sync::mpsc;

use crate::common::happypump::logs_dispatcher::EventDispatcher;
use crate::common::subscription_handle::SubscriptionHandle;
use crate::error::{ClientError, ClientResult};

/// Subscribes to logs mentioning `program_id` and feeds every decoded event to `dispatcher`.
///
/// Failed transactions are skipped. Events are dispatched with the notification's slot and
/// transaction signature.
pub async fn logs_subscription(
    ws_url: &str,
    program_id: Pubkey,
    commitment: CommitmentConfig,
    dispatcher: Arc<EventDispatcher>,
) -> ClientResult<SubscriptionHandle> {
    let logs_filter = RpcTransactionLogsFilter::Mentions(vec![program_id.to_string()]);
    let logs_config = RpcTransactionLogsConfig { commitment: Some(commitment) };

    let sub_client = PubsubClient::new(ws_url)
        .await
        .map_err(|e| ClientError::Rpc(format!("pubsub connect to {} failed: {}", ws_url, e)))?;

    let (unsub_tx, mut unsub_rx) = mpsc::channel::<()>(1);

    let task = tokio::spawn(async move {
        let (mut stream, unsubscribe) =
            match sub_client.logs_subscribe(logs_filter, logs_config).await {
                Ok(subscription) => subscription,
                Err(e) => {
                    log::error!("logs subscription for {} failed: {}", program_id, e);
                    return;
                }
            };
        log::info!("subscribed to logs of {}", program_id);

        loop {
            tokio::select! {
                Some(()) = unsub_rx.recv() => break,
                msg = stream.next() => {
                    let Some(msg) = msg else {
                        log::warn!("logs subscription stream for {} ended", program_id);
                        break;
                    };
                    if msg.value.err.is_some() {
                        continue;
                    }
                    let slot = msg.context.slot;
                    dispatcher.dispatch_logs(&msg.value.logs, slot, &msg.value.signature);
                }
            }
        }

        drop(stream);
        unsubscribe().await;
        log::info!("unsubscribed from logs of {}", program_id);
    });

    Ok(SubscriptionHandle::new(
        task,
        Box::new(move || {
            let _ = unsub_tx.try_send(());
        }),
    ))
}
