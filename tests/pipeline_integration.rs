//! Integration tests for the conversation processing pipeline.
//!
//! These tests verify the end-to-end flow:
//! 1. Dedup gate drops redelivered events
//! 2. Sequencer applies same-conversation events in arrival order
//! 3. Throttle rejects bursts and sends one deferred notice
//! 4. Router replies and transitions the conversation state
//! 5. Deadline guard converts slow routing into a single fallback
//!
//! Uses in-memory implementations to test the pipeline without external
//! dependencies. Intervals are scaled down so the tests run in
//! milliseconds rather than seconds.

use std::sync::Arc;
use std::time::Duration;

use pearl_concierge::adapters::memory::{
    CapturingTelemetry, FixedTranslator, InMemoryConversationStore, InMemoryOrderRepository,
    InMemoryTtlStore, RecordingGateway, ScriptedMenuProvider,
};
use pearl_concierge::application::{
    EventOutcome, MessagePipeline, PipelineSettings, FALLBACK_NOTICE, SLOW_DOWN_NOTICE,
};
use pearl_concierge::domain::conversation::{InboundEvent, InboundPayload, OrderItem};
use pearl_concierge::domain::foundation::{ConversationId, EventId};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Harness {
    pipeline: MessagePipeline,
    gateway: Arc<RecordingGateway>,
    store: Arc<InMemoryConversationStore>,
    orders: Arc<InMemoryOrderRepository>,
    menus: Arc<ScriptedMenuProvider>,
    telemetry: Arc<CapturingTelemetry>,
}

fn harness(settings: PipelineSettings) -> Harness {
    let ttl_store = Arc::new(InMemoryTtlStore::new());
    let gateway = Arc::new(RecordingGateway::new());
    let store = Arc::new(InMemoryConversationStore::new());
    let orders = Arc::new(InMemoryOrderRepository::new());
    let menus = Arc::new(ScriptedMenuProvider::new());
    let telemetry = Arc::new(CapturingTelemetry::new());

    let pipeline = MessagePipeline::new(
        ttl_store,
        Arc::clone(&gateway) as _,
        Arc::clone(&store) as _,
        Arc::clone(&orders) as _,
        Arc::clone(&menus) as _,
        Arc::new(FixedTranslator::passthrough()),
        Arc::clone(&telemetry) as _,
        settings,
    );

    Harness {
        pipeline,
        gateway,
        store,
        orders,
        menus,
        telemetry,
    }
}

/// Settings that effectively disable the throttle so tests can drive
/// several events through one conversation back to back.
fn relaxed_settings() -> PipelineSettings {
    PipelineSettings {
        min_send_interval_ms: 1,
        feedback_margin_ms: 10,
        ..PipelineSettings::default()
    }
}

fn conv(address: &str) -> ConversationId {
    ConversationId::new(address).unwrap()
}

fn text_event(id: &str, conversation: &ConversationId, body: &str) -> InboundEvent {
    InboundEvent::new(
        EventId::new(id).unwrap(),
        conversation.clone(),
        InboundPayload::Text {
            body: body.to_string(),
        },
    )
}

fn button_event(id: &str, conversation: &ConversationId, reply_id: &str) -> InboundEvent {
    InboundEvent::new(
        EventId::new(id).unwrap(),
        conversation.clone(),
        InboundPayload::Interactive {
            reply_id: reply_id.to_string(),
            title: None,
        },
    )
}

// =============================================================================
// Routing and State
// =============================================================================

#[tokio::test]
async fn first_text_is_welcomed_with_the_main_menu() {
    let h = harness(relaxed_settings());
    let c = conv("919812345678");

    // "rings" would match the jewellery keyword, but a brand-new
    // conversation gets the welcome menu first.
    let outcome = h.pipeline.process(text_event("wamid.1", &c, "rings")).await;

    assert_eq!(outcome, EventOutcome::Replied);
    assert_eq!(h.gateway.bodies(), vec!["menu:main".to_string()]);

    let state = h.store.state_of(&c).unwrap();
    assert_eq!((state.flow.as_str(), state.step.as_str()), ("main", "menu"));
    assert!(h.telemetry.has_event("message.received"));
    assert!(h.telemetry.has_event("reply.sent"));
}

#[tokio::test]
async fn keyword_text_routes_once_the_conversation_is_known() {
    let h = harness(relaxed_settings());
    let c = conv("919812345678");
    // Slow each send slightly so the scaled-down throttle interval has
    // elapsed by the time the next event acquires it.
    h.gateway.set_delay(Some(Duration::from_millis(10)));

    h.pipeline.process(text_event("wamid.1", &c, "hello")).await;
    let outcome = h.pipeline.process(text_event("wamid.2", &c, "rings")).await;

    assert_eq!(outcome, EventOutcome::Replied);
    assert_eq!(
        h.gateway.bodies(),
        vec!["menu:main".to_string(), "menu:jewellery".to_string()]
    );
    let state = h.store.state_of(&c).unwrap();
    assert_eq!(state.flow, "jewellery");
}

#[tokio::test]
async fn button_reply_transitions_into_its_menu() {
    let h = harness(relaxed_settings());
    let c = conv("919812345678");
    h.gateway.set_delay(Some(Duration::from_millis(10)));

    h.pipeline.process(text_event("wamid.1", &c, "hello")).await;
    let outcome = h
        .pipeline
        .process(button_event("wamid.2", &c, "offers_menu"))
        .await;

    assert_eq!(outcome, EventOutcome::Replied);
    let state = h.store.state_of(&c).unwrap();
    assert_eq!((state.flow.as_str(), state.step.as_str()), ("offers", "menu"));
}

#[tokio::test]
async fn unknown_order_id_gets_the_not_found_notice_without_state_change() {
    let h = harness(relaxed_settings());
    let c = conv("919812345678");
    h.gateway.set_delay(Some(Duration::from_millis(10)));

    h.pipeline.process(text_event("wamid.1", &c, "hello")).await;
    let state_before = h.store.state_of(&c).unwrap();

    let outcome = h
        .pipeline
        .process(text_event("wamid.2", &c, "KP-00123456"))
        .await;

    assert_eq!(outcome, EventOutcome::Replied);
    assert!(h.gateway.bodies()[1].contains("couldn't find an order"));
    assert_eq!(h.store.state_of(&c).unwrap(), state_before);
}

#[tokio::test]
async fn known_order_id_gets_a_status_reply() {
    use pearl_concierge::domain::conversation::Order;

    let h = harness(relaxed_settings());
    let c = conv("919812345678");
    h.gateway.set_delay(Some(Duration::from_millis(10)));

    let order = Order::place(
        c.clone(),
        vec![OrderItem {
            item_id: "ring-22k".to_string(),
            quantity: 1,
            price_minor: 45_000_00,
            currency: "INR".to_string(),
        }],
    );
    let order_id = order.id.clone();
    h.orders.seed(order);

    h.pipeline.process(text_event("wamid.1", &c, "hello")).await;
    let outcome = h
        .pipeline
        .process(text_event("wamid.2", &c, order_id.as_str()))
        .await;

    assert_eq!(outcome, EventOutcome::Replied);
    let reply = &h.gateway.bodies()[1];
    assert!(reply.contains(order_id.as_str()));
    assert!(reply.contains("being prepared"));
}

#[tokio::test]
async fn catalog_order_is_persisted_and_confirmed() {
    let h = harness(relaxed_settings());
    let c = conv("919812345678");

    let event = InboundEvent::new(
        EventId::new("wamid.cart").unwrap(),
        c.clone(),
        InboundPayload::Order {
            items: vec![OrderItem {
                item_id: "chain-18k".to_string(),
                quantity: 2,
                price_minor: 12_000_00,
                currency: "INR".to_string(),
            }],
        },
    );
    let outcome = h.pipeline.process(event).await;

    assert_eq!(outcome, EventOutcome::Replied);
    assert_eq!(h.orders.len(), 1);
    assert!(h.gateway.bodies()[0].contains("Thank you! Order KP-"));
    assert!(h.telemetry.has_event("order.created"));
}

// =============================================================================
// Dedup
// =============================================================================

#[tokio::test]
async fn redelivered_event_is_dropped_silently() {
    let h = harness(relaxed_settings());
    let c = conv("919812345678");
    h.gateway.set_delay(Some(Duration::from_millis(10)));

    let first = h.pipeline.process(text_event("wamid.dup", &c, "hello")).await;
    let second = h.pipeline.process(text_event("wamid.dup", &c, "hello")).await;

    assert_eq!(first, EventOutcome::Replied);
    assert_eq!(second, EventOutcome::DuplicateDropped);
    assert_eq!(h.gateway.sent_count(), 1);
    assert_eq!(h.store.inbound_count(), 1);
}

// =============================================================================
// Sequencing
// =============================================================================

#[tokio::test]
async fn same_conversation_events_apply_in_arrival_order() {
    let h = harness(relaxed_settings());
    let c = conv("919812345678");
    h.gateway.set_delay(Some(Duration::from_millis(10)));

    let events = vec![
        text_event("wamid.1", &c, "hello"),
        text_event("wamid.2", &c, "rings"),
        text_event("wamid.3", &c, "offers"),
    ];
    let outcomes = h.pipeline.process_batch(events).await;

    assert!(outcomes.iter().all(|o| *o == EventOutcome::Replied));
    assert_eq!(
        h.gateway.bodies(),
        vec![
            "menu:main".to_string(),
            "menu:jewellery".to_string(),
            "menu:offers".to_string(),
        ]
    );
    // The last event's transition wins; no update was lost in between.
    assert_eq!(h.store.state_of(&c).unwrap().flow, "offers");
}

#[tokio::test]
async fn different_conversations_do_not_block_each_other() {
    let h = harness(relaxed_settings());
    let a = conv("919812345678");
    let b = conv("919898989898");
    h.gateway.set_delay(Some(Duration::from_millis(40)));

    let started = std::time::Instant::now();
    let outcomes = h
        .pipeline
        .process_batch(vec![
            text_event("wamid.a", &a, "hello"),
            text_event("wamid.b", &b, "hello"),
        ])
        .await;
    let elapsed = started.elapsed();

    assert!(outcomes.iter().all(|o| *o == EventOutcome::Replied));
    // Two serialized 40ms sends would take 80ms+; parallel ones do not.
    assert!(
        elapsed < Duration::from_millis(75),
        "conversations were serialized: {elapsed:?}"
    );
}

// =============================================================================
// Throttle
// =============================================================================

#[tokio::test]
async fn burst_is_rate_limited_with_one_deferred_notice() {
    let h = harness(PipelineSettings {
        min_send_interval_ms: 80,
        feedback_margin_ms: 20,
        ..PipelineSettings::default()
    });
    let c = conv("919812345678");

    let first = h.pipeline.process(text_event("wamid.1", &c, "hello")).await;
    let second = h.pipeline.process(text_event("wamid.2", &c, "rings")).await;
    // Space the rejections so their deferred notices fire apart from each
    // other rather than racing for the same re-acquire.
    tokio::time::sleep(Duration::from_millis(30)).await;
    let third = h.pipeline.process(text_event("wamid.3", &c, "offers")).await;

    assert_eq!(first, EventOutcome::Replied);
    assert_eq!(second, EventOutcome::RateLimited);
    assert_eq!(third, EventOutcome::RateLimited);

    // Let the deferred notices fire; only the first one re-acquires.
    tokio::time::sleep(Duration::from_millis(300)).await;

    let bodies = h.gateway.bodies();
    let notices = bodies.iter().filter(|b| *b == SLOW_DOWN_NOTICE).count();
    assert_eq!(notices, 1, "expected one notice in {bodies:?}");
    assert_eq!(h.gateway.sent_count(), 2);
}

// =============================================================================
// Deadline and Fallback
// =============================================================================

#[tokio::test]
async fn routing_failure_sends_the_fallback_notice() {
    let h = harness(relaxed_settings());
    let c = conv("919812345678");
    h.menus.set_failing(true);

    let outcome = h.pipeline.process(text_event("wamid.1", &c, "hello")).await;

    assert_eq!(outcome, EventOutcome::FallbackSent);
    assert_eq!(h.gateway.bodies(), vec![FALLBACK_NOTICE.to_string()]);
    assert!(h.telemetry.has_event("routing.failed"));
}

#[tokio::test]
async fn deadline_overrun_yields_exactly_one_fallback() {
    let h = harness(PipelineSettings {
        routing_deadline_ms: 60,
        ..relaxed_settings()
    });
    let c = conv("919812345678");
    // Menu resolution comes back after the deadline, and as an error; the
    // guard must already have discarded the attempt either way.
    h.menus.set_delay(Some(Duration::from_millis(200)));
    h.menus.set_failing(true);

    let outcome = h.pipeline.process(text_event("wamid.1", &c, "hello")).await;

    assert_eq!(outcome, EventOutcome::FallbackSent);
    assert_eq!(h.gateway.bodies(), vec![FALLBACK_NOTICE.to_string()]);
    assert!(h.telemetry.has_event("routing.failed"));

    // The guarded task finishes late in the background; its outcome must
    // not produce a second send.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(h.gateway.sent_count(), 1);
}

// =============================================================================
// Audit Trail
// =============================================================================

#[tokio::test]
async fn every_reply_leaves_an_audit_record_and_chat_summary() {
    let h = harness(relaxed_settings());
    let c = conv("919812345678");

    h.pipeline.process(text_event("wamid.1", &c, "hello")).await;

    assert_eq!(h.store.inbound_count(), 1);
    let records = h.store.outbound_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].body, "menu:main");
    assert!(records[0].gateway_message_id.is_some());

    let summary = h.store.summary_of(&c).unwrap();
    assert_eq!(summary.preview, "hello");
}

#[tokio::test]
async fn audit_write_failures_do_not_cost_the_reply() {
    let h = harness(relaxed_settings());
    let c = conv("919812345678");
    h.store.fail_writes(true);

    let outcome = h.pipeline.process(text_event("wamid.1", &c, "hello")).await;

    assert_eq!(outcome, EventOutcome::Replied);
    assert_eq!(h.gateway.sent_count(), 1);
}
