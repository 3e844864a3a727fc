//! Action router - maps inbound payloads to sends and state transitions.
//!
//! The router is the only writer of ConversationState (the sequencer
//! guarantees it is never entered concurrently for one conversation).
//! Every successful send is paired with an audit write and a best-effort
//! telemetry emission; those failures are logged, never raised, because a
//! reply the user already received cannot be rolled back.

use std::sync::Arc;

use serde_json::json;

use crate::domain::conversation::{
    Action, ContentKind, ConversationState, InboundEvent, InboundPayload, Order, OrderItem,
    OutboundPayload, OutboundRecord, RouteEffect, StateUpdate,
};
use crate::domain::foundation::{ConversationId, OrderId};
use crate::ports::{
    ConversationStore, LogRow, MenuProvider, MessagingGateway, OrderRepository, TelemetryEmitter,
    Translation, Translator,
};

use super::error::RoutingError;
use super::inquiry::{status_reply, ORDER_NOT_FOUND_NOTICE};

/// Fixed acknowledgement for media attachments.
pub const MEDIA_ACK_NOTICE: &str =
    "Thanks for sharing! A member of our team will take a look shortly.";

const PAYMENT_LINK_TEXT: &str =
    "You can complete your payment securely here: https://pay.kanakpearl.example/checkout";
const TRACKING_PROMPT_TEXT: &str =
    "Please share your order id (it looks like KP-12345) and we'll check the status for you.";
const STORE_INFO_TEXT: &str = "Kanak Pearl, 14 MG Road, Bengaluru. \
Open 10:30-20:00, Monday to Saturday.";
const CARE_GUIDE_TEXT: &str = "Keep your jewellery away from perfume and water, \
store pieces separately in a soft pouch, and polish gently with the cloth provided.";
const AGENT_HANDOFF_TEXT: &str =
    "Connecting you with our team - someone will reply here during store hours.";

/// Routes one normalized action or one inbound event.
pub struct ActionRouter {
    gateway: Arc<dyn MessagingGateway>,
    store: Arc<dyn ConversationStore>,
    orders: Arc<dyn OrderRepository>,
    menus: Arc<dyn MenuProvider>,
    translator: Arc<dyn Translator>,
    telemetry: Arc<dyn TelemetryEmitter>,
}

impl ActionRouter {
    pub fn new(
        gateway: Arc<dyn MessagingGateway>,
        store: Arc<dyn ConversationStore>,
        orders: Arc<dyn OrderRepository>,
        menus: Arc<dyn MenuProvider>,
        translator: Arc<dyn Translator>,
        telemetry: Arc<dyn TelemetryEmitter>,
    ) -> Self {
        Self {
            gateway,
            store,
            orders,
            menus,
            translator,
            telemetry,
        }
    }

    /// Routes an inbound event by payload type.
    ///
    /// `first_contact` is true when the conversation has no recorded
    /// inbound traffic before this event; text input is then routed
    /// straight to the main menu regardless of keyword content.
    pub async fn route_event(
        &self,
        event: &InboundEvent,
        first_contact: bool,
    ) -> Result<bool, RoutingError> {
        match &event.payload {
            InboundPayload::Text { body } => {
                self.route_text(&event.conversation, body, first_contact).await
            }
            InboundPayload::Interactive { reply_id, .. } => {
                let state = self.load_state(&event.conversation).await;
                let action = Action::from_reply_id(reply_id).unwrap_or(Action::MainMenu);
                self.route(action, &event.conversation, state.language()).await
            }
            InboundPayload::Media { kind } => {
                tracing::debug!(conversation = %event.conversation, kind = kind.as_str(), "acknowledging media");
                self.deliver(&event.conversation, &OutboundPayload::text(MEDIA_ACK_NOTICE))
                    .await?;
                Ok(true)
            }
            InboundPayload::Order { items } => {
                self.place_order(&event.conversation, items.clone()).await
            }
        }
    }

    /// Routes one canonical action. Returns true when a reply was sent.
    pub async fn route(
        &self,
        action: Action,
        conversation: &ConversationId,
        language: Option<&str>,
    ) -> Result<bool, RoutingError> {
        let descriptor = action.descriptor();
        match descriptor.effect {
            RouteEffect::Menu(name) => {
                let payload = self.menus.menu(conversation, language, name).await?;
                self.deliver(conversation, &payload).await?;
            }
            RouteEffect::Content(kind) => {
                self.deliver(conversation, &content_payload(kind)).await?;
            }
        }

        if let Some(flow) = descriptor.transition {
            self.apply_update(conversation, StateUpdate::menu(flow)).await;
        }
        Ok(true)
    }

    /// Text routing: translation pass, then order-id match over keyword
    /// match over the main-menu fallback.
    async fn route_text(
        &self,
        conversation: &ConversationId,
        body: &str,
        first_contact: bool,
    ) -> Result<bool, RoutingError> {
        let translation = match self.translator.to_english(body).await {
            Ok(translation) => translation,
            Err(error) => {
                tracing::warn!(%error, conversation = %conversation, "translation failed, using original text");
                Translation::passthrough(body)
            }
        };

        if let Some(lang) = &translation.detected_lang {
            self.apply_update(
                conversation,
                StateUpdate::extra_entry("lang", json!(lang)),
            )
            .await;
        }

        let stored_language = self.load_state(conversation).await.language().map(str::to_string);
        let language = translation
            .detected_lang
            .clone()
            .or(stored_language);
        let language = language.as_deref();

        if first_contact {
            // Welcome-first: a brand-new conversation always gets the
            // main menu, whatever the message said.
            return self.route(Action::MainMenu, conversation, language).await;
        }

        // Order ids are matched on the raw body; they survive translation
        // but not necessarily unscathed.
        if let Some(order_id) = OrderId::extract(body) {
            return self.order_inquiry(conversation, &order_id).await;
        }

        if let Some(action) = Action::from_keywords(&translation.translated) {
            return self.route(action, conversation, language).await;
        }

        self.route(Action::MainMenu, conversation, language).await
    }

    /// Looks up an order and replies with its status; state is unchanged.
    async fn order_inquiry(
        &self,
        conversation: &ConversationId,
        order_id: &OrderId,
    ) -> Result<bool, RoutingError> {
        let reply = match self.orders.find_by_id(order_id).await? {
            Some(order) => status_reply(&order),
            None => ORDER_NOT_FOUND_NOTICE.to_string(),
        };
        self.deliver(conversation, &OutboundPayload::text(reply)).await?;
        Ok(true)
    }

    /// Persists a catalog order and confirms it; independent of the menu
    /// state machine.
    async fn place_order(
        &self,
        conversation: &ConversationId,
        items: Vec<OrderItem>,
    ) -> Result<bool, RoutingError> {
        let order = Order::place(conversation.clone(), items);
        self.orders.insert(&order).await?;

        let body = format!(
            "Thank you! Order {} received for {} {:.2}. We'll confirm it shortly.",
            order.id,
            order.currency,
            order.total_minor as f64 / 100.0
        );
        let payload = OutboundPayload::OrderConfirmation {
            order_id: order.id.clone(),
            body,
        };
        self.deliver(conversation, &payload).await?;

        let details = json!({
            "order_id": order.id.as_str(),
            "conversation": conversation.as_str(),
            "total_minor": order.total_minor,
            "currency": order.currency,
        });
        self.telemetry.emit("order.created", details.clone()).await;
        self.telemetry.post_webhook("order.created", details).await;
        Ok(true)
    }

    /// Sends a payload and writes its audit trail.
    ///
    /// The gateway failure propagates; audit and telemetry failures are
    /// contained here.
    async fn deliver(
        &self,
        conversation: &ConversationId,
        payload: &OutboundPayload,
    ) -> Result<(), RoutingError> {
        let receipt = self.gateway.send(conversation, payload).await?;

        let record =
            OutboundRecord::from_send(conversation.clone(), payload, receipt.message_id);
        if let Err(error) = self.store.record_outbound(&record).await {
            tracing::error!(%error, conversation = %conversation, "outbound audit write failed");
        }

        self.telemetry
            .emit(
                "reply.sent",
                json!({
                    "conversation": conversation.as_str(),
                    "kind": record.kind.as_str(),
                }),
            )
            .await;
        self.telemetry
            .append_log(LogRow::outbound(conversation.as_str(), record.body.clone()))
            .await;
        Ok(())
    }

    /// Loads the state record, defaulting for conversations never routed.
    async fn load_state(&self, conversation: &ConversationId) -> ConversationState {
        match self.store.load_state(conversation).await {
            Ok(Some(state)) => state,
            Ok(None) => ConversationState::default(),
            Err(error) => {
                tracing::warn!(%error, conversation = %conversation, "state read failed, using default");
                ConversationState::default()
            }
        }
    }

    /// Read-merge-write of the state record; persistence failures are
    /// logged only.
    async fn apply_update(&self, conversation: &ConversationId, update: StateUpdate) {
        if update.is_empty() {
            return;
        }
        let mut state = self.load_state(conversation).await;
        state.merge(update);
        if let Err(error) = self.store.upsert_state(conversation, &state).await {
            tracing::error!(%error, conversation = %conversation, "state upsert failed");
        }
    }
}

fn content_payload(kind: ContentKind) -> OutboundPayload {
    let body = match kind {
        ContentKind::PaymentLink => PAYMENT_LINK_TEXT,
        ContentKind::TrackingPrompt => TRACKING_PROMPT_TEXT,
        ContentKind::StoreInfo => STORE_INFO_TEXT,
        ContentKind::CareGuide => CARE_GUIDE_TEXT,
        ContentKind::AgentHandoff => AGENT_HANDOFF_TEXT,
    };
    OutboundPayload::text(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        CapturingTelemetry, FixedTranslator, InMemoryConversationStore, InMemoryOrderRepository,
        RecordingGateway, ScriptedMenuProvider,
    };
    use crate::domain::conversation::MediaKind;
    use crate::domain::foundation::EventId;

    struct Fixture {
        router: ActionRouter,
        gateway: Arc<RecordingGateway>,
        store: Arc<InMemoryConversationStore>,
        orders: Arc<InMemoryOrderRepository>,
        telemetry: Arc<CapturingTelemetry>,
    }

    fn fixture() -> Fixture {
        fixture_with_translator(FixedTranslator::passthrough())
    }

    fn fixture_with_translator(translator: FixedTranslator) -> Fixture {
        let gateway = Arc::new(RecordingGateway::new());
        let store = Arc::new(InMemoryConversationStore::new());
        let orders = Arc::new(InMemoryOrderRepository::new());
        let telemetry = Arc::new(CapturingTelemetry::new());
        let router = ActionRouter::new(
            Arc::clone(&gateway) as _,
            Arc::clone(&store) as _,
            Arc::clone(&orders) as _,
            Arc::new(ScriptedMenuProvider::new()),
            Arc::new(translator),
            Arc::clone(&telemetry) as _,
        );
        Fixture {
            router,
            gateway,
            store,
            orders,
            telemetry,
        }
    }

    fn conv() -> ConversationId {
        ConversationId::new("919812345678").unwrap()
    }

    fn text_event(body: &str) -> InboundEvent {
        InboundEvent::new(
            EventId::new(format!("wamid.{body}")).unwrap(),
            conv(),
            InboundPayload::Text {
                body: body.to_string(),
            },
        )
    }

    #[tokio::test]
    async fn button_reply_moves_into_its_menu() {
        let f = fixture();
        let event = InboundEvent::new(
            EventId::new("wamid.btn").unwrap(),
            conv(),
            InboundPayload::Interactive {
                reply_id: "jewellery_menu".to_string(),
                title: Some("Jewellery".to_string()),
            },
        );

        assert!(f.router.route_event(&event, false).await.unwrap());

        let state = f.store.state_of(&conv()).unwrap();
        assert_eq!(state.flow, "jewellery");
        assert_eq!(state.step, "menu");
        assert_eq!(f.gateway.sent_count(), 1);
    }

    #[tokio::test]
    async fn unknown_button_falls_back_to_main_menu() {
        let f = fixture();
        let event = InboundEvent::new(
            EventId::new("wamid.unknown").unwrap(),
            conv(),
            InboundPayload::Interactive {
                reply_id: "mystery_button".to_string(),
                title: None,
            },
        );

        f.router.route_event(&event, false).await.unwrap();

        let state = f.store.state_of(&conv()).unwrap();
        assert_eq!(state.flow, "main");
        assert_eq!(state.step, "menu");
    }

    #[tokio::test]
    async fn content_action_sends_without_state_change() {
        let f = fixture();
        f.router.route_event(&text_event("how do I pay?"), false).await.unwrap();

        assert!(f.gateway.bodies()[0].contains("payment"));
        // Content sends leave state untouched.
        assert!(f.store.state_of(&conv()).is_none());
    }

    #[tokio::test]
    async fn first_contact_text_is_welcomed_with_main_menu() {
        let f = fixture();
        // "pay" would normally match PayNow.
        f.router.route_event(&text_event("pay"), true).await.unwrap();

        let state = f.store.state_of(&conv()).unwrap();
        assert_eq!((state.flow.as_str(), state.step.as_str()), ("main", "menu"));
        assert_eq!(f.gateway.bodies()[0], "menu:main");
    }

    #[tokio::test]
    async fn unmatched_text_defaults_to_main_menu() {
        let f = fixture();
        f.router.route_event(&text_event("good morning"), false).await.unwrap();

        let state = f.store.state_of(&conv()).unwrap();
        assert_eq!(state.flow, "main");
    }

    #[tokio::test]
    async fn order_id_beats_keyword_match() {
        let f = fixture();
        // "order" is a TrackOrder keyword, but the id wins.
        f.router
            .route_event(&text_event("order KP-00123456 status"), false)
            .await
            .unwrap();

        assert!(f.gateway.bodies()[0].contains("couldn't find an order"));
        assert!(f.store.state_of(&conv()).is_none());
    }

    #[tokio::test]
    async fn detected_language_is_merged_and_forwarded() {
        let f = fixture_with_translator(FixedTranslator::to("jewellery", "hi"));
        f.router.route_event(&text_event("आभूषण"), false).await.unwrap();

        let state = f.store.state_of(&conv()).unwrap();
        assert_eq!(state.language(), Some("hi"));
        assert_eq!(f.gateway.bodies()[0], "menu:jewellery:hi");
    }

    #[tokio::test]
    async fn media_is_acknowledged_without_state_change() {
        let f = fixture();
        let event = InboundEvent::new(
            EventId::new("wamid.img").unwrap(),
            conv(),
            InboundPayload::Media {
                kind: MediaKind::Image,
            },
        );

        f.router.route_event(&event, false).await.unwrap();

        assert_eq!(f.gateway.bodies()[0], MEDIA_ACK_NOTICE);
        assert!(f.store.state_of(&conv()).is_none());
    }

    #[tokio::test]
    async fn catalog_order_is_persisted_and_confirmed() {
        let f = fixture();
        let event = InboundEvent::new(
            EventId::new("wamid.order").unwrap(),
            conv(),
            InboundPayload::Order {
                items: vec![OrderItem {
                    item_id: "ring-22k".to_string(),
                    quantity: 1,
                    price_minor: 45_000_00,
                    currency: "INR".to_string(),
                }],
            },
        );

        f.router.route_event(&event, false).await.unwrap();

        assert_eq!(f.orders.len(), 1);
        assert!(f.gateway.bodies()[0].contains("Thank you! Order KP-"));
        assert!(f.telemetry.has_event("order.created"));
        assert!(f.store.state_of(&conv()).is_none());
    }

    #[tokio::test]
    async fn audit_failure_does_not_fail_a_sent_reply() {
        let f = fixture();
        f.store.fail_writes(true);

        let sent = f.router.route_event(&text_event("menu"), false).await.unwrap();
        assert!(sent);
        assert_eq!(f.gateway.sent_count(), 1);
    }

    #[tokio::test]
    async fn every_send_is_audited() {
        let f = fixture();
        f.router.route_event(&text_event("offers"), false).await.unwrap();

        let records = f.store.outbound_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].body, "menu:offers");
        assert!(records[0].gateway_message_id.is_some());
    }
}
