//! Session-related types.
//!
//! The cart, checkout progress and the details of the last customer are kept
//! in the visitor's session, serialized as JSON by tower-sessions.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tower_sessions::session::Error;
use woo_storefront_core::checkout::SavedCustomer;
use woo_storefront_core::{Cart, Checkout, CurrencyCode, OrderId};

/// Session keys for visitor data.
pub mod keys {
    /// Key for the cart.
    pub const CART: &str = "cart";

    /// Key for checkout progress.
    pub const CHECKOUT: &str = "checkout";

    /// Key for contact details remembered after an order.
    pub const SAVED_CUSTOMER: &str = "saved_customer";

    /// Key for the order shown on the confirmation page.
    pub const LAST_ORDER: &str = "last_order";
}

/// Summary of the order placed in this session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastOrder {
    pub id: OrderId,
    pub number: String,
    /// Formatted total.
    pub total: String,
    pub email: String,
}

/// Typed access to the visitor's session.
#[derive(Debug, Clone)]
pub struct VisitorSession<'a> {
    session: &'a Session,
}

impl<'a> VisitorSession<'a> {
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// The visitor's cart, or an empty cart in the store currency.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn cart(&self, currency: CurrencyCode) -> Result<Cart, Error> {
        Ok(self
            .session
            .get::<Cart>(keys::CART)
            .await?
            .unwrap_or_else(|| Cart::new(currency)))
    }

    /// Persist the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub async fn set_cart(&self, cart: &Cart) -> Result<(), Error> {
        self.session.insert(keys::CART, cart).await
    }

    /// Checkout progress, if checkout has been started.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn checkout(&self) -> Result<Option<Checkout>, Error> {
        self.session.get::<Checkout>(keys::CHECKOUT).await
    }

    /// Persist checkout progress.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub async fn set_checkout(&self, checkout: &Checkout) -> Result<(), Error> {
        self.session.insert(keys::CHECKOUT, checkout).await
    }

    /// Forget checkout progress.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub async fn clear_checkout(&self) -> Result<(), Error> {
        self.session.remove::<Checkout>(keys::CHECKOUT).await?;
        Ok(())
    }

    /// Details saved after the previous order.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn saved_customer(&self) -> Result<Option<SavedCustomer>, Error> {
        self.session.get::<SavedCustomer>(keys::SAVED_CUSTOMER).await
    }

    /// Remember customer details for the next checkout.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub async fn set_saved_customer(&self, customer: &SavedCustomer) -> Result<(), Error> {
        self.session.insert(keys::SAVED_CUSTOMER, customer).await
    }

    /// The order placed most recently in this session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn last_order(&self) -> Result<Option<LastOrder>, Error> {
        self.session.get::<LastOrder>(keys::LAST_ORDER).await
    }

    /// Remember the order for the confirmation page.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub async fn set_last_order(&self, order: &LastOrder) -> Result<(), Error> {
        self.session.insert(keys::LAST_ORDER, order).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;
    use tower_sessions::MemoryStore;
    use woo_storefront_core::{CartAction, CartItem, Price, ProductId};

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_empty_session_gives_empty_cart() {
        let session = session();
        let visitor = VisitorSession::new(&session);
        let cart = visitor.cart(CurrencyCode::RUB).await.unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.currency_code(), CurrencyCode::RUB);
        assert!(visitor.checkout().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cart_persists() {
        let session = session();
        let visitor = VisitorSession::new(&session);
        let mut cart = Cart::new(CurrencyCode::RUB);
        cart.apply(CartAction::Add(CartItem {
            product_id: ProductId::new(7),
            variation_id: None,
            variation_slug: None,
            name: "Чайник".to_string(),
            slug: "teapot".to_string(),
            quantity: 2,
            price: Price::new(Decimal::from(1500), CurrencyCode::RUB),
            image: None,
        }));
        visitor.set_cart(&cart).await.unwrap();

        let restored = visitor.cart(CurrencyCode::RUB).await.unwrap();
        assert_eq!(restored, cart);
        assert_eq!(restored.item_count(), 2);
    }

    #[tokio::test]
    async fn test_clear_checkout() {
        let session = session();
        let visitor = VisitorSession::new(&session);
        visitor.set_checkout(&Checkout::default()).await.unwrap();
        assert!(visitor.checkout().await.unwrap().is_some());
        visitor.clear_checkout().await.unwrap();
        assert!(visitor.checkout().await.unwrap().is_none());
    }
}
