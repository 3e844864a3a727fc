//! Message pipeline - orchestration of the processing components.
//!
//! Per inbound event, exactly one of: a substantive reply, a fallback
//! apology, a deferred rate-limit notice, or silence (true duplicate).

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde_json::json;

use crate::domain::conversation::{InboundEvent, OutboundPayload, OutboundRecord};
use crate::domain::foundation::ConversationId;
use crate::ports::{
    ConversationStore, LogRow, MenuProvider, MessagingGateway, OrderRepository, TelemetryEmitter,
    Translator, TtlStore,
};

use super::deadline::with_deadline;
use super::dedup::DedupGate;
use super::router::ActionRouter;
use super::sequencer::ConversationSequencer;
use super::throttle::SendThrottle;

/// Fixed apology sent when routing fails or times out.
pub const FALLBACK_NOTICE: &str =
    "Sorry, something went wrong on our side. Please try again in a moment.";

/// Deferred notice sent after a burst of messages subsides.
pub const SLOW_DOWN_NOTICE: &str =
    "You're sending messages a little quickly - we'll answer them one at a time.";

/// Tunables of the pipeline, with the production defaults.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    /// Dedup window, matching the worst-case upstream redelivery window.
    pub dedup_window_secs: u64,
    /// Bound on the local dedup cache before the oldest half is evicted.
    pub dedup_cache_capacity: usize,
    /// Minimum interval between outbound sends per conversation.
    pub min_send_interval_ms: u64,
    /// TTL of the throttle record; longer than the interval so records
    /// reliably expire between legitimate gaps.
    pub throttle_record_ttl_secs: u64,
    /// Extra delay before a deferred rate-limit notice re-checks the
    /// throttle.
    pub feedback_margin_ms: u64,
    /// Wall-clock budget for one routing attempt.
    pub routing_deadline_ms: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            dedup_window_secs: 3600,
            dedup_cache_capacity: 5000,
            min_send_interval_ms: 900,
            throttle_record_ttl_secs: 60,
            feedback_margin_ms: 150,
            routing_deadline_ms: 5000,
        }
    }
}

/// What became of one inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// The router produced a reply.
    Replied,
    /// True duplicate; dropped silently.
    DuplicateDropped,
    /// Throttled; a deferred notice may follow once the burst subsides.
    RateLimited,
    /// Routing failed or timed out; the fallback apology was dispatched.
    FallbackSent,
    /// The sequenced task itself failed; nothing was sent.
    Failed,
}

/// The conversation processing pipeline.
///
/// Cheap to clone; all components are shared behind `Arc`.
#[derive(Clone)]
pub struct MessagePipeline {
    dedup: Arc<DedupGate>,
    throttle: Arc<SendThrottle>,
    sequencer: Arc<ConversationSequencer>,
    router: Arc<ActionRouter>,
    store: Arc<dyn ConversationStore>,
    gateway: Arc<dyn MessagingGateway>,
    telemetry: Arc<dyn TelemetryEmitter>,
    settings: PipelineSettings,
}

impl MessagePipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ttl_store: Arc<dyn TtlStore>,
        gateway: Arc<dyn MessagingGateway>,
        store: Arc<dyn ConversationStore>,
        orders: Arc<dyn OrderRepository>,
        menus: Arc<dyn MenuProvider>,
        translator: Arc<dyn Translator>,
        telemetry: Arc<dyn TelemetryEmitter>,
        settings: PipelineSettings,
    ) -> Self {
        let dedup = Arc::new(DedupGate::new(
            Arc::clone(&ttl_store),
            settings.dedup_window_secs,
            settings.dedup_cache_capacity,
        ));
        let throttle = Arc::new(SendThrottle::new(
            ttl_store,
            settings.min_send_interval_ms,
            settings.throttle_record_ttl_secs,
        ));
        let router = Arc::new(ActionRouter::new(
            Arc::clone(&gateway),
            Arc::clone(&store),
            orders,
            menus,
            translator,
            Arc::clone(&telemetry),
        ));
        Self {
            dedup,
            throttle,
            sequencer: Arc::new(ConversationSequencer::new()),
            router,
            store,
            gateway,
            telemetry,
            settings,
        }
    }

    /// Processes one inbound event to completion.
    pub async fn process(&self, event: InboundEvent) -> EventOutcome {
        if self.dedup.is_duplicate(&event.id).await {
            tracing::debug!(event_id = %event.id, "duplicate event dropped");
            return EventOutcome::DuplicateDropped;
        }

        let conversation = event.conversation.clone();
        let pipeline = self.clone();
        let handle = self
            .sequencer
            .enqueue(conversation, async move { pipeline.process_sequenced(event).await });

        match handle.await {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::error!(%error, "sequenced processing task failed");
                EventOutcome::Failed
            }
        }
    }

    /// Processes a batch of events, e.g. one webhook delivery.
    ///
    /// Events for the same conversation still apply in vector order; the
    /// sequencer chains them at enqueue time.
    pub async fn process_batch(&self, events: Vec<InboundEvent>) -> Vec<EventOutcome> {
        join_all(events.into_iter().map(|event| self.process(event))).await
    }

    /// The work that runs inside the conversation's single-flight slot.
    async fn process_sequenced(&self, event: InboundEvent) -> EventOutcome {
        let conversation = event.conversation.clone();

        if !self.throttle.try_acquire(&conversation).await {
            tracing::debug!(conversation = %conversation, "send throttled");
            self.schedule_slowdown_notice(conversation);
            return EventOutcome::RateLimited;
        }

        let first_contact = match self.store.has_prior_inbound(&conversation).await {
            Ok(seen) => !seen,
            Err(error) => {
                tracing::warn!(%error, conversation = %conversation, "prior-traffic check failed, skipping welcome-first");
                false
            }
        };

        if let Err(error) = self.store.record_inbound(&event).await {
            tracing::error!(%error, event_id = %event.id, "inbound audit write failed");
        }
        if let Err(error) = self
            .store
            .upsert_chat_summary(&conversation, &event.preview(), event.arrived_at)
            .await
        {
            tracing::warn!(%error, conversation = %conversation, "chat summary upsert failed");
        }
        self.telemetry
            .emit(
                "message.received",
                json!({
                    "conversation": conversation.as_str(),
                    "event_id": event.id.as_str(),
                    "kind": event.kind(),
                }),
            )
            .await;
        self.telemetry
            .append_log(LogRow::inbound(conversation.as_str(), event.preview()))
            .await;

        let deadline = Duration::from_millis(self.settings.routing_deadline_ms);
        let router = Arc::clone(&self.router);
        let guarded_event = event.clone();
        let attempt =
            async move { router.route_event(&guarded_event, first_contact).await };

        match with_deadline(attempt, deadline).await {
            Ok(Ok(_replied)) => EventOutcome::Replied,
            Ok(Err(error)) => {
                tracing::error!(%error, conversation = %conversation, "routing failed, sending fallback");
                self.telemetry
                    .emit(
                        "routing.failed",
                        json!({
                            "conversation": conversation.as_str(),
                            "event_id": event.id.as_str(),
                            "error": error.to_string(),
                        }),
                    )
                    .await;
                self.send_fallback(&conversation).await;
                EventOutcome::FallbackSent
            }
            Err(error) => {
                // The guarded task keeps running; its late result is
                // discarded, so the fallback is the only reply this path
                // produces.
                tracing::warn!(%error, conversation = %conversation, "routing deadline exceeded, sending fallback");
                self.telemetry
                    .emit(
                        "routing.failed",
                        json!({
                            "conversation": conversation.as_str(),
                            "event_id": event.id.as_str(),
                            "error": error.to_string(),
                        }),
                    )
                    .await;
                self.send_fallback(&conversation).await;
                EventOutcome::FallbackSent
            }
        }
    }

    /// One-shot deferred feedback after a throttle rejection.
    ///
    /// Fires after `interval + margin` and re-runs `try_acquire` first, so
    /// a burst of rejections yields at most one notice: subsequent
    /// deferred tasks fail the same acquire until the burst subsides.
    fn schedule_slowdown_notice(&self, conversation: ConversationId) {
        let pipeline = self.clone();
        let delay = Duration::from_millis(
            self.settings.min_send_interval_ms + self.settings.feedback_margin_ms,
        );
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !pipeline.throttle.try_acquire(&conversation).await {
                return;
            }
            let payload = OutboundPayload::text(SLOW_DOWN_NOTICE);
            match pipeline.gateway.send(&conversation, &payload).await {
                Ok(receipt) => {
                    let record = OutboundRecord::from_send(
                        conversation.clone(),
                        &payload,
                        receipt.message_id,
                    );
                    if let Err(error) = pipeline.store.record_outbound(&record).await {
                        tracing::warn!(%error, conversation = %conversation, "slow-down audit write failed");
                    }
                }
                Err(error) => {
                    tracing::warn!(%error, conversation = %conversation, "slow-down notice send failed");
                }
            }
        });
    }

    /// Sends the fixed apology. This path never errors: its own send
    /// failures are logged and swallowed, there is no secondary fallback.
    async fn send_fallback(&self, conversation: &ConversationId) {
        let payload = OutboundPayload::text(FALLBACK_NOTICE);
        match self.gateway.send(conversation, &payload).await {
            Ok(receipt) => {
                let record =
                    OutboundRecord::from_send(conversation.clone(), &payload, receipt.message_id);
                if let Err(error) = self.store.record_outbound(&record).await {
                    tracing::warn!(%error, conversation = %conversation, "fallback audit write failed");
                }
            }
            Err(error) => {
                tracing::error!(%error, conversation = %conversation, "fallback send failed");
            }
        }
    }
}
