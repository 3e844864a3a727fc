//! Static menu provider with the storefront's built-in copy.
//!
//! Menus are compiled in rather than fetched, so this adapter is
//! infallible apart from unknown menu names. Localization is limited to
//! a Hindi greeting line on the main menu; all button labels stay in
//! English to match the catalog.

use async_trait::async_trait;

use crate::domain::conversation::{Button, OutboundPayload};
use crate::domain::foundation::ConversationId;
use crate::ports::{MenuError, MenuProvider};

/// Menu provider serving the built-in storefront menus.
#[derive(Debug, Clone, Default)]
pub struct StaticMenuProvider;

impl StaticMenuProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MenuProvider for StaticMenuProvider {
    async fn menu(
        &self,
        _conversation: &ConversationId,
        language: Option<&str>,
        menu: &str,
    ) -> Result<OutboundPayload, MenuError> {
        match menu {
            "main" => Ok(main_menu(language)),
            "jewellery" => Ok(jewellery_menu()),
            "collections" => Ok(collections_menu()),
            "offers" => Ok(offers_menu()),
            other => Err(MenuError::UnknownMenu(other.to_string())),
        }
    }
}

fn main_menu(language: Option<&str>) -> OutboundPayload {
    let greeting = match language {
        Some("hi") => "नमस्ते! Welcome to Kanak Pearl Jewellers.",
        _ => "Welcome to Kanak Pearl Jewellers!",
    };
    OutboundPayload::Buttons {
        body: format!("{} How can we help you today?", greeting),
        buttons: vec![
            Button::new("jewellery_menu", "Browse jewellery"),
            Button::new("track_order", "Track my order"),
            Button::new("talk_to_agent", "Talk to us"),
        ],
    }
}

fn jewellery_menu() -> OutboundPayload {
    OutboundPayload::List {
        body: "Our jewellery, handcrafted in 22k and 18k gold. Pick a category to browse."
            .to_string(),
        button_label: "Categories".to_string(),
        rows: vec![
            Button::new("collections_menu", "Seasonal collections"),
            Button::new("offers_menu", "Offers and discounts"),
            Button::new("care_guide", "Jewellery care guide"),
            Button::new("store_info", "Visit our store"),
            Button::new("main_menu", "Back to main menu"),
        ],
    }
}

fn collections_menu() -> OutboundPayload {
    OutboundPayload::Buttons {
        body: "Featured this season: the Lotus bridal set, Pearl Drops earrings, and the \
               Heritage temple line. Reply with a piece you like or browse the catalog \
               from our profile."
            .to_string(),
        buttons: vec![
            Button::new("offers_menu", "Current offers"),
            Button::new("talk_to_agent", "Ask a stylist"),
            Button::new("main_menu", "Main menu"),
        ],
    }
}

fn offers_menu() -> OutboundPayload {
    OutboundPayload::Buttons {
        body: "This week: zero making charges on gold chains and 10% off all pearl sets. \
               Offers apply automatically at checkout."
            .to_string(),
        buttons: vec![
            Button::new("jewellery_menu", "Browse jewellery"),
            Button::new("pay_now", "Pay for an order"),
            Button::new("main_menu", "Main menu"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conv() -> ConversationId {
        ConversationId::new("919812345678").unwrap()
    }

    #[tokio::test]
    async fn main_menu_greets_in_detected_language() {
        let provider = StaticMenuProvider::new();
        let payload = provider.menu(&conv(), Some("hi"), "main").await.unwrap();
        assert!(payload.body().starts_with("नमस्ते!"));

        let payload = provider.menu(&conv(), None, "main").await.unwrap();
        assert!(payload.body().starts_with("Welcome"));
    }

    #[tokio::test]
    async fn every_named_menu_resolves() {
        let provider = StaticMenuProvider::new();
        for menu in ["main", "jewellery", "collections", "offers"] {
            let payload = provider.menu(&conv(), None, menu).await.unwrap();
            assert!(!payload.body().is_empty(), "empty body for {menu}");
        }
    }

    #[tokio::test]
    async fn unknown_menu_is_an_error() {
        let provider = StaticMenuProvider::new();
        let err = provider.menu(&conv(), None, "vip_lounge").await.unwrap_err();
        assert!(matches!(err, MenuError::UnknownMenu(name) if name == "vip_lounge"));
    }

    #[tokio::test]
    async fn menu_buttons_use_known_reply_ids() {
        use crate::domain::conversation::Action;

        let provider = StaticMenuProvider::new();
        for menu in ["main", "jewellery", "collections", "offers"] {
            let payload = provider.menu(&conv(), None, menu).await.unwrap();
            let ids: Vec<String> = match payload {
                OutboundPayload::Buttons { buttons, .. } => {
                    buttons.into_iter().map(|b| b.id).collect()
                }
                OutboundPayload::List { rows, .. } => rows.into_iter().map(|b| b.id).collect(),
                other => panic!("unexpected payload for {menu}: {:?}", other.kind()),
            };
            for id in ids {
                assert!(
                    Action::from_reply_id(&id).is_some(),
                    "button {id} on {menu} routes nowhere"
                );
            }
        }
    }
}
