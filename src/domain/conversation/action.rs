//! Canonical actions and the dispatch table that routes them.
//!
//! An `Action` is "what the user wants to do next", computed per event from
//! a button/list reply id or a free-text keyword match. Actions are never
//! stored; each one maps to exactly one `RouteDescriptor`.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Canonical action symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MainMenu,
    JewelleryMenu,
    CollectionsMenu,
    OffersMenu,
    PayNow,
    TrackOrder,
    StoreInfo,
    CareGuide,
    TalkToAgent,
}

/// What routing an action produces: the send effect plus the state
/// transition, declared together so the table can be tested exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub effect: RouteEffect,
    /// Flow the conversation moves to (always onto the menu step), or
    /// `None` for content sends that leave state untouched.
    pub transition: Option<&'static str>,
}

/// The outbound effect of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteEffect {
    /// Send a named menu (body + buttons come from the menu provider).
    Menu(&'static str),
    /// Send a fixed piece of content.
    Content(ContentKind),
}

/// Fixed content sends that do not change conversation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    PaymentLink,
    TrackingPrompt,
    StoreInfo,
    CareGuide,
    AgentHandoff,
}

impl Action {
    /// The dispatch table: one descriptor per action.
    pub fn descriptor(&self) -> RouteDescriptor {
        match self {
            Action::MainMenu => RouteDescriptor {
                effect: RouteEffect::Menu("main"),
                transition: Some("main"),
            },
            Action::JewelleryMenu => RouteDescriptor {
                effect: RouteEffect::Menu("jewellery"),
                transition: Some("jewellery"),
            },
            Action::CollectionsMenu => RouteDescriptor {
                effect: RouteEffect::Menu("collections"),
                transition: Some("collections"),
            },
            Action::OffersMenu => RouteDescriptor {
                effect: RouteEffect::Menu("offers"),
                transition: Some("offers"),
            },
            Action::PayNow => RouteDescriptor {
                effect: RouteEffect::Content(ContentKind::PaymentLink),
                transition: None,
            },
            Action::TrackOrder => RouteDescriptor {
                effect: RouteEffect::Content(ContentKind::TrackingPrompt),
                transition: None,
            },
            Action::StoreInfo => RouteDescriptor {
                effect: RouteEffect::Content(ContentKind::StoreInfo),
                transition: None,
            },
            Action::CareGuide => RouteDescriptor {
                effect: RouteEffect::Content(ContentKind::CareGuide),
                transition: None,
            },
            Action::TalkToAgent => RouteDescriptor {
                effect: RouteEffect::Content(ContentKind::AgentHandoff),
                transition: None,
            },
        }
    }

    /// All actions, for exhaustive table tests.
    pub fn all() -> &'static [Action] {
        &[
            Action::MainMenu,
            Action::JewelleryMenu,
            Action::CollectionsMenu,
            Action::OffersMenu,
            Action::PayNow,
            Action::TrackOrder,
            Action::StoreInfo,
            Action::CareGuide,
            Action::TalkToAgent,
        ]
    }

    /// Resolves a button/list reply id to an action.
    pub fn from_reply_id(raw: &str) -> Option<Action> {
        REPLY_IDS.get(normalize_input(raw).as_str()).copied()
    }

    /// Resolves free text to an action via the keyword table.
    ///
    /// Every word of the normalized input is looked up individually, so
    /// "show me offers please" matches the same as "offers".
    pub fn from_keywords(text: &str) -> Option<Action> {
        normalize_input(text)
            .split_whitespace()
            .find_map(|word| KEYWORDS.get(word).copied())
    }
}

/// Lowercases, strips punctuation, and collapses whitespace.
///
/// Pure normalization shared by the reply-id and keyword tables.
pub fn normalize_input(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_space = true;
    for c in raw.chars() {
        if c.is_alphanumeric() || c == '_' {
            out.extend(c.to_lowercase());
            last_space = false;
        } else if !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

static REPLY_IDS: Lazy<HashMap<&'static str, Action>> = Lazy::new(|| {
    HashMap::from([
        ("main_menu", Action::MainMenu),
        ("jewellery_menu", Action::JewelleryMenu),
        ("collections_menu", Action::CollectionsMenu),
        ("offers_menu", Action::OffersMenu),
        ("pay_now", Action::PayNow),
        ("track_order", Action::TrackOrder),
        ("store_info", Action::StoreInfo),
        ("care_guide", Action::CareGuide),
        ("talk_to_agent", Action::TalkToAgent),
    ])
});

static KEYWORDS: Lazy<HashMap<&'static str, Action>> = Lazy::new(|| {
    HashMap::from([
        ("menu", Action::MainMenu),
        ("start", Action::MainMenu),
        ("home", Action::MainMenu),
        ("jewellery", Action::JewelleryMenu),
        ("jewelry", Action::JewelleryMenu),
        ("rings", Action::JewelleryMenu),
        ("necklaces", Action::JewelleryMenu),
        ("collections", Action::CollectionsMenu),
        ("collection", Action::CollectionsMenu),
        ("catalogue", Action::CollectionsMenu),
        ("catalog", Action::CollectionsMenu),
        ("offers", Action::OffersMenu),
        ("offer", Action::OffersMenu),
        ("discount", Action::OffersMenu),
        ("sale", Action::OffersMenu),
        ("pay", Action::PayNow),
        ("payment", Action::PayNow),
        ("track", Action::TrackOrder),
        ("tracking", Action::TrackOrder),
        ("order", Action::TrackOrder),
        ("status", Action::TrackOrder),
        ("store", Action::StoreInfo),
        ("address", Action::StoreInfo),
        ("location", Action::StoreInfo),
        ("timings", Action::StoreInfo),
        ("care", Action::CareGuide),
        ("cleaning", Action::CareGuide),
        ("polish", Action::CareGuide),
        ("agent", Action::TalkToAgent),
        ("help", Action::TalkToAgent),
        ("support", Action::TalkToAgent),
        ("human", Action::TalkToAgent),
    ])
});
