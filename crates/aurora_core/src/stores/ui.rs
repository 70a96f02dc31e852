//! RAM-only UI flags.

use crate::reactive::{Atom, Subscription};

#[derive(Clone)]
pub struct UiStore {
    locale: Atom<String>,
    search_query: Atom<String>,
    cart_drawer_open: Atom<bool>,
}

impl UiStore {
    pub fn new(default_locale: &str) -> Self {
        Self {
            locale: Atom::new("ui_locale", default_locale.to_string()),
            search_query: Atom::new("ui_search_query", String::new()),
            cart_drawer_open: Atom::new("ui_cart_drawer_open", false),
        }
    }

    pub fn locale(&self) -> String {
        self.locale.get()
    }

    pub fn set_locale(&self, locale: &str) {
        self.locale.set(crate::i18n::normalize_locale(locale));
    }

    /// Shared handle for stores that render text in the active locale.
    pub fn locale_atom(&self) -> &Atom<String> {
        &self.locale
    }

    pub fn search_query(&self) -> String {
        self.search_query.get()
    }

    /// Stores the query with surrounding whitespace removed.
    pub fn set_search_query(&self, query: &str) {
        self.search_query.set(query.trim().to_string());
    }

    pub fn clear_search(&self) {
        self.search_query.set(String::new());
    }

    pub fn subscribe_search(
        &self,
        listener: impl Fn(&String) + Send + Sync + 'static,
    ) -> Subscription {
        self.search_query.subscribe(listener)
    }

    pub fn is_cart_drawer_open(&self) -> bool {
        self.cart_drawer_open.get()
    }

    pub fn set_cart_drawer_open(&self, open: bool) {
        self.cart_drawer_open.set(open);
    }
}
