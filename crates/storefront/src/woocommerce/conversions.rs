//! Conversions between WooCommerce wire types and storefront domain types.

use woo_storefront_core::checkout::{DeliveryMethod, ValidatedCheckout, ValidatedDelivery};
use woo_storefront_core::{Cart, CartItem, CurrencyCode, format_date};

use super::types::{
    Billing, MetaData, NewLineItem, NewOrder, Product, Shipping, ShippingLine, Variation,
};

/// Country code sent with every address.
const COUNTRY: &str = "RU";

/// Build a cart line for a simple product.
///
/// Returns `None` when the product has no price and cannot be sold.
#[must_use]
pub fn cart_item_from_product(
    product: &Product,
    quantity: u32,
    currency: CurrencyCode,
) -> Option<CartItem> {
    let price = product.current_price(currency)?;
    Some(CartItem {
        product_id: product.id,
        variation_id: None,
        variation_slug: None,
        name: product.name.clone(),
        slug: product.slug.clone(),
        quantity,
        price,
        image: product.featured_image().map(|i| i.src.clone()),
    })
}

/// Build a cart line for a chosen variation of a variable product.
///
/// The line name carries the variation label, e.g. "Кружка (Синий)".
#[must_use]
pub fn cart_item_from_variation(
    product: &Product,
    variation: &Variation,
    quantity: u32,
    currency: CurrencyCode,
) -> Option<CartItem> {
    let price = variation.current_price(currency)?;
    let label = variation.label();
    let name = if label.is_empty() {
        product.name.clone()
    } else {
        format!("{} ({label})", product.name)
    };
    let image = variation
        .image
        .as_ref()
        .or_else(|| product.featured_image())
        .map(|i| i.src.clone());

    Some(CartItem {
        product_id: product.id,
        variation_id: Some(variation.id),
        variation_slug: None,
        name,
        slug: product.slug.clone(),
        quantity,
        price,
        image,
    })
}

/// Build the order creation request from the cart and validated checkout.
///
/// Payment is collected on delivery, so the order is never marked paid.
#[must_use]
pub fn new_order(cart: &Cart, checkout: &ValidatedCheckout) -> NewOrder {
    let (address, apartment) = match &checkout.delivery {
        ValidatedDelivery::Courier {
            address, apartment, ..
        } => (address.clone(), apartment.clone().unwrap_or_default()),
        ValidatedDelivery::Pickup => (String::new(), String::new()),
    };

    let billing = Billing {
        first_name: checkout.first_name.clone(),
        last_name: checkout.last_name.clone(),
        address_1: address.clone(),
        address_2: apartment.clone(),
        country: COUNTRY.to_string(),
        email: checkout.email.to_string(),
        phone: checkout.phone.e164().to_string(),
        ..Billing::default()
    };

    let shipping = Shipping {
        first_name: checkout.first_name.clone(),
        last_name: checkout.last_name.clone(),
        address_1: address,
        address_2: apartment,
        country: COUNTRY.to_string(),
        phone: checkout.phone.e164().to_string(),
        ..Shipping::default()
    };

    let line_items = cart
        .items()
        .iter()
        .map(|item| NewLineItem {
            product_id: item.product_id,
            variation_id: item.variation_id,
            quantity: item.quantity,
            meta_data: item
                .variation_slug
                .as_ref()
                .map(|slug| vec![MetaData::new("variation", slug.clone())])
                .unwrap_or_default(),
        })
        .collect();

    let method = match checkout.delivery {
        ValidatedDelivery::Courier { .. } => DeliveryMethod::Courier,
        ValidatedDelivery::Pickup => DeliveryMethod::Pickup,
    };
    let shipping_lines = vec![ShippingLine {
        method_id: method.method_id().to_string(),
        method_title: method.title().to_string(),
        total: "0".to_string(),
    }];

    let mut meta_data = Vec::new();
    let mut note = Vec::new();
    if let ValidatedDelivery::Courier {
        date, time_slot, ..
    } = &checkout.delivery
    {
        meta_data.push(MetaData::new("delivery_date", date.to_string()));
        meta_data.push(MetaData::new("delivery_time", time_slot.value()));
        note.push(format!(
            "Доставка: {}, {}",
            format_date(*date),
            time_slot.label()
        ));
    }
    if let Some(comment) = &checkout.comment {
        note.push(comment.clone());
    }

    NewOrder {
        payment_method: checkout.payment_method.gateway_id().to_string(),
        payment_method_title: checkout.payment_method.title().to_string(),
        set_paid: false,
        billing,
        shipping,
        line_items,
        shipping_lines,
        customer_note: note.join("\n"),
        meta_data,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use woo_storefront_core::checkout::{PaymentMethod, TimeSlot};
    use woo_storefront_core::{
        CartAction, Email, PhoneNumber, Price, ProductId, StockStatus, VariationId,
    };

    use super::super::types::{Image, ProductType, VariationAttribute};
    use super::*;

    fn product() -> Product {
        serde_json::from_value(serde_json::json!({
            "id": 93,
            "name": "Кружка",
            "slug": "mug",
            "type": "variable",
            "price": "790",
            "images": [{"id": 1, "src": "https://shop.test/mug.jpg"}]
        }))
        .unwrap()
    }

    fn variation() -> Variation {
        Variation {
            id: VariationId::new(94),
            sku: String::new(),
            price: "850".to_string(),
            regular_price: "850".to_string(),
            sale_price: String::new(),
            on_sale: false,
            stock_status: StockStatus::InStock,
            image: Some(Image {
                id: woo_storefront_core::ImageId::new(2),
                src: "https://shop.test/mug-blue.jpg".to_string(),
                name: String::new(),
                alt: String::new(),
            }),
            attributes: vec![VariationAttribute {
                id: 1,
                name: "Цвет".to_string(),
                option: "Синий".to_string(),
            }],
        }
    }

    fn checkout(delivery: ValidatedDelivery, comment: Option<&str>) -> ValidatedCheckout {
        ValidatedCheckout {
            first_name: "Анна".to_string(),
            last_name: "Иванова".to_string(),
            phone: PhoneNumber::parse("89991234567").unwrap(),
            email: Email::parse("anna@example.ru").unwrap(),
            delivery,
            payment_method: PaymentMethod::CashOnDelivery,
            comment: comment.map(ToString::to_string),
        }
    }

    fn cart() -> Cart {
        let mut cart = Cart::new(CurrencyCode::RUB);
        let product = product();
        cart.apply(CartAction::Add(
            cart_item_from_product(&product, 2, CurrencyCode::RUB).unwrap(),
        ));
        cart.apply(CartAction::Add(
            cart_item_from_variation(&product, &variation(), 1, CurrencyCode::RUB).unwrap(),
        ));
        cart
    }

    #[test]
    fn test_cart_item_from_product() {
        let item = cart_item_from_product(&product(), 2, CurrencyCode::RUB).unwrap();
        assert_eq!(item.product_id, ProductId::new(93));
        assert_eq!(item.price, Price::new(Decimal::from(790), CurrencyCode::RUB));
        assert_eq!(item.image.as_deref(), Some("https://shop.test/mug.jpg"));
        assert_eq!(item.key().as_str(), "93");
    }

    #[test]
    fn test_cart_item_without_price() {
        let mut product = product();
        product.price = String::new();
        assert!(cart_item_from_product(&product, 1, CurrencyCode::RUB).is_none());
        assert_eq!(product.kind, ProductType::Variable);
    }

    #[test]
    fn test_cart_item_from_variation() {
        let item =
            cart_item_from_variation(&product(), &variation(), 1, CurrencyCode::RUB).unwrap();
        assert_eq!(item.name, "Кружка (Синий)");
        assert_eq!(item.key().as_str(), "93-94");
        assert_eq!(item.image.as_deref(), Some("https://shop.test/mug-blue.jpg"));
        assert_eq!(item.price.amount, Decimal::from(850));
    }

    #[test]
    fn test_new_order_courier() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let order = new_order(
            &cart(),
            &checkout(
                ValidatedDelivery::Courier {
                    address: "г Москва, ул Тверская, д 1".to_string(),
                    apartment: Some("12".to_string()),
                    date,
                    time_slot: TimeSlot::Evening,
                },
                Some("Позвонить за час"),
            ),
        );

        assert_eq!(order.payment_method, "cod");
        assert!(!order.set_paid);
        assert_eq!(order.billing.phone, "+79991234567");
        assert_eq!(order.billing.country, "RU");
        assert_eq!(order.shipping.address_2, "12");
        assert_eq!(order.line_items.len(), 2);
        assert_eq!(order.line_items[0].quantity, 2);
        assert_eq!(order.line_items[1].variation_id, Some(VariationId::new(94)));
        assert_eq!(order.shipping_lines[0].method_id, "flat_rate");
        assert_eq!(
            order.customer_note,
            format!(
                "Доставка: 20.10.2026, {}\nПозвонить за час",
                TimeSlot::Evening.label()
            )
        );
        assert!(
            order
                .meta_data
                .contains(&MetaData::new("delivery_date", "2026-10-20"))
        );
        assert!(
            order
                .meta_data
                .contains(&MetaData::new("delivery_time", "18-22"))
        );
    }

    #[test]
    fn test_new_order_pickup() {
        let order = new_order(&cart(), &checkout(ValidatedDelivery::Pickup, None));
        assert_eq!(order.shipping_lines[0].method_id, "local_pickup");
        assert!(order.billing.address_1.is_empty());
        assert!(order.customer_note.is_empty());
        assert!(order.meta_data.is_empty());
    }
}
