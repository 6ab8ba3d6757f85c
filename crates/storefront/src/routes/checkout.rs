//! Checkout route handlers.
//!
//! Checkout is a three-step form (personal details, delivery, payment)
//! whose progress is kept in the session. Each step posts its fields, the
//! data is stored even when invalid so nothing typed is lost, and the
//! visitor moves on only when every earlier step validates. The payment
//! step creates the WooCommerce order.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use woo_storefront_core::checkout::{
    CheckoutData, DeliveryMethod, FieldError, PaymentMethod, PersonalInfo, SavedCustomer, TimeSlot,
};
use woo_storefront_core::{
    CartAction, Checkout, CheckoutError, CheckoutStep, Price, format_date, format_date_input,
    format_phone,
};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::models::{LastOrder, VisitorSession};
use crate::routes::cart::CartView;
use crate::state::AppState;
use crate::woocommerce::Order;
use crate::woocommerce::conversions::new_order;

/// Shown when WooCommerce rejects or fails to create the order.
const ORDER_FAILED: &str = "Не удалось оформить заказ. Попробуйте ещё раз через минуту.";

/// The local calendar date used for delivery date checks.
pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

// =============================================================================
// View Types
// =============================================================================

/// Step indicator entry.
#[derive(Clone)]
pub struct StepView {
    pub number: u8,
    pub slug: &'static str,
    pub title: &'static str,
    pub is_current: bool,
    pub is_done: bool,
}

fn step_views(current: CheckoutStep) -> Vec<StepView> {
    CheckoutStep::ALL
        .into_iter()
        .map(|step| StepView {
            number: step.number(),
            slug: step.slug(),
            title: step.title(),
            is_current: step == current,
            is_done: step < current,
        })
        .collect()
}

/// Radio/select option.
#[derive(Clone)]
pub struct ChoiceView {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Field errors of the step being shown, looked up by field name.
#[derive(Clone, Default)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Message for a field, empty when the field is valid.
    #[must_use]
    pub fn get(&self, field: &str) -> &str {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map_or("", |e| e.message)
    }

    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutShowTemplate {
    pub step: &'static str,
    pub step_number: u8,
    pub steps: Vec<StepView>,
    pub data: CheckoutData,
    pub errors: FieldErrors,
    /// Error not tied to a field.
    pub form_error: Option<String>,
    pub cart: CartView,
    pub is_courier: bool,
    pub delivery_methods: Vec<ChoiceView>,
    pub time_slots: Vec<ChoiceView>,
    pub payment_methods: Vec<ChoiceView>,
    /// Earliest delivery date, `DD.MM.YYYY`.
    pub min_date: String,
    pub dadata_enabled: bool,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/success.html")]
pub struct CheckoutSuccessTemplate {
    pub order: LastOrder,
}

struct Page<'a> {
    checkout: &'a Checkout,
    step: CheckoutStep,
    errors: &'a [FieldError],
    form_error: Option<String>,
}

fn render(
    state: &AppState,
    cart: CartView,
    page: Page<'_>,
    today: NaiveDate,
) -> CheckoutShowTemplate {
    let data = page.checkout.data.clone();
    let delivery = &data.delivery;
    CheckoutShowTemplate {
        step: page.step.slug(),
        step_number: page.step.number(),
        steps: step_views(page.step),
        errors: FieldErrors(page.errors.to_vec()),
        form_error: page.form_error,
        cart,
        is_courier: delivery.method == DeliveryMethod::Courier,
        delivery_methods: [DeliveryMethod::Courier, DeliveryMethod::Pickup]
            .into_iter()
            .map(|m| ChoiceView {
                value: m.value(),
                label: m.title(),
                selected: m == delivery.method,
            })
            .collect(),
        time_slots: TimeSlot::ALL
            .into_iter()
            .map(|slot| ChoiceView {
                value: slot.value(),
                label: slot.label(),
                selected: delivery.time_slot == Some(slot),
            })
            .collect(),
        payment_methods: PaymentMethod::ALL
            .into_iter()
            .map(|m| ChoiceView {
                value: m.gateway_id(),
                label: m.title(),
                selected: data.payment_method == Some(m),
            })
            .collect(),
        min_date: format_date(today),
        dadata_enabled: state.dadata().is_some(),
        data,
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Step 1 fields.
#[derive(Debug, Deserialize)]
pub struct PersonalForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

impl From<PersonalForm> for PersonalInfo {
    fn from(form: PersonalForm) -> Self {
        Self {
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            phone: format_phone(&form.phone),
            email: form.email.trim().to_string(),
        }
    }
}

/// Step 2 fields.
#[derive(Debug, Deserialize)]
pub struct DeliveryForm {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub apartment: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time_slot: String,
    #[serde(default)]
    pub comment: String,
}

impl DeliveryForm {
    fn apply(self, data: &mut CheckoutData) {
        let delivery = &mut data.delivery;
        delivery.method = self.method.parse().unwrap_or_default();
        delivery.address = self.address.trim().to_string();
        delivery.apartment = self.apartment.trim().to_string();
        delivery.date = format_date_input(&self.date);
        delivery.time_slot = self.time_slot.parse().ok();
        delivery.comment = self.comment.trim().to_string();
    }
}

/// Step 3 fields.
#[derive(Debug, Deserialize)]
pub struct PaymentForm {
    #[serde(default)]
    pub payment_method: String,
}

/// Step indicator jump.
#[derive(Debug, Deserialize)]
pub struct GoToForm {
    pub step: String,
}

// =============================================================================
// Order Placement
// =============================================================================

/// Create the WooCommerce order for the session cart and checkout data.
///
/// On success the cart and checkout progress are cleared, the contact
/// details are remembered for next time and the order is recorded for the
/// confirmation page.
///
/// # Errors
///
/// Returns [`AppError::BadRequest`] for an empty cart,
/// [`AppError::Checkout`] when a step does not validate and
/// [`AppError::WooCommerce`] when order creation fails.
#[instrument(skip(state, session, checkout))]
pub(crate) async fn place_order(
    state: &AppState,
    session: &Session,
    checkout: &Checkout,
    today: NaiveDate,
) -> Result<(Order, LastOrder)> {
    let catalog = &state.config().catalog;
    let visitor = VisitorSession::new(session);
    let mut cart = visitor.cart(catalog.currency).await?;
    if cart.is_empty() {
        return Err(AppError::BadRequest("Корзина пуста".to_string()));
    }

    let validated = checkout.validated(today)?;
    let order = state
        .woo()
        .create_order(&new_order(&cart, &validated))
        .await?;

    let last_order = LastOrder {
        id: order.id,
        number: if order.number.is_empty() {
            order.id.to_string()
        } else {
            order.number.clone()
        },
        total: Price::parse(&order.total, catalog.currency)
            .map_or_else(|| order.total.clone(), |p| p.format(catalog.locale)),
        email: validated.email.to_string(),
    };

    cart.apply(CartAction::Clear);
    visitor.set_cart(&cart).await?;
    visitor
        .set_saved_customer(&SavedCustomer::from(&validated))
        .await?;
    visitor.set_last_order(&last_order).await?;
    visitor.clear_checkout().await?;

    let order_id = order.id.to_string();
    add_breadcrumb("checkout", "Order placed", Some(&[("order_id", order_id.as_str())]));

    Ok((order, last_order))
}

// =============================================================================
// Handlers
// =============================================================================

/// Load checkout progress, starting a prefilled checkout if there is none.
async fn load_checkout(visitor: &VisitorSession<'_>) -> Result<Checkout> {
    if let Some(checkout) = visitor.checkout().await? {
        return Ok(checkout);
    }
    let mut data = CheckoutData::default();
    if let Some(saved) = visitor.saved_customer().await? {
        saved.prefill(&mut data);
    }
    Ok(Checkout::with_data(data))
}

/// Store the edited checkout, then try to move to `target`.
///
/// Renders the failing step with 422 when an earlier step is invalid.
async fn save_and_go(
    state: &AppState,
    session: &Session,
    mut checkout: Checkout,
    target: CheckoutStep,
) -> Result<Response> {
    let today = today();
    let visitor = VisitorSession::new(session);
    let result = checkout.go_to(target, today);
    visitor.set_checkout(&checkout).await?;

    match result {
        Ok(()) => Ok(Redirect::to("/checkout").into_response()),
        Err(CheckoutError::Invalid { step, errors }) => {
            let cart = visitor.cart(state.config().catalog.currency).await?;
            let page = Page {
                checkout: &checkout,
                step,
                errors: &errors,
                form_error: None,
            };
            let cart = CartView::new(&cart, &state.config().catalog);
            let template = render(state, cart, page, today);
            Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
        }
    }
}

/// Display the current checkout step.
///
/// An empty cart sends the visitor back to the cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Response> {
    let catalog = &state.config().catalog;
    let visitor = VisitorSession::new(&session);
    let cart = visitor.cart(catalog.currency).await?;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let checkout = load_checkout(&visitor).await?;
    visitor.set_checkout(&checkout).await?;

    let page = Page {
        checkout: &checkout,
        step: checkout.step(),
        errors: &[],
        form_error: None,
    };
    Ok(render(&state, CartView::new(&cart, catalog), page, today()).into_response())
}

/// Submit personal details and continue to delivery.
#[instrument(skip(state, session, form))]
pub async fn personal(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PersonalForm>,
) -> Result<Response> {
    let mut checkout = load_checkout(&VisitorSession::new(&session)).await?;
    checkout.data.personal = form.into();
    save_and_go(&state, &session, checkout, CheckoutStep::Delivery).await
}

/// Submit delivery details and continue to payment.
#[instrument(skip(state, session, form))]
pub async fn delivery(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<DeliveryForm>,
) -> Result<Response> {
    let mut checkout = load_checkout(&VisitorSession::new(&session)).await?;
    form.apply(&mut checkout.data);
    save_and_go(&state, &session, checkout, CheckoutStep::Payment).await
}

/// Choose the payment method and place the order.
#[instrument(skip(state, session, form))]
pub async fn payment(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PaymentForm>,
) -> Result<Response> {
    let today = today();
    let visitor = VisitorSession::new(&session);
    let mut checkout = load_checkout(&visitor).await?;
    checkout.data.payment_method = form.payment_method.parse().ok();
    visitor.set_checkout(&checkout).await?;

    let (step, errors, form_error, status) =
        match place_order(&state, &session, &checkout, today).await {
            Ok((order, _)) => {
                return Ok(Redirect::to(&format!("/checkout/success/{}", order.id)).into_response());
            }
            Err(AppError::BadRequest(_)) => return Ok(Redirect::to("/cart").into_response()),
            Err(AppError::Checkout(CheckoutError::Invalid { step, errors })) => {
                (step, errors, None, StatusCode::UNPROCESSABLE_ENTITY)
            }
            Err(AppError::WooCommerce(e)) => {
                tracing::error!("Order creation failed: {e}");
                (
                    CheckoutStep::Payment,
                    Vec::new(),
                    Some(ORDER_FAILED.to_string()),
                    StatusCode::BAD_GATEWAY,
                )
            }
            Err(e) => return Err(e),
        };

    let cart = visitor.cart(state.config().catalog.currency).await?;
    let page = Page {
        checkout: &checkout,
        step,
        errors: &errors,
        form_error,
    };
    let cart = CartView::new(&cart, &state.config().catalog);
    let template = render(&state, cart, page, today);
    Ok((status, template).into_response())
}

/// Return to the previous step. Always allowed.
#[instrument(skip(session))]
pub async fn back(session: Session) -> Result<Response> {
    let visitor = VisitorSession::new(&session);
    if let Some(mut checkout) = visitor.checkout().await? {
        checkout.back();
        visitor.set_checkout(&checkout).await?;
    }
    Ok(Redirect::to("/checkout").into_response())
}

/// Jump to a step from the step indicator.
#[instrument(skip(state, session))]
pub async fn go_to(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<GoToForm>,
) -> Result<Response> {
    let target = CheckoutStep::ALL
        .into_iter()
        .find(|step| step.slug() == form.step)
        .ok_or_else(|| AppError::BadRequest("Неизвестный шаг оформления".to_string()))?;
    let checkout = load_checkout(&VisitorSession::new(&session)).await?;
    save_and_go(&state, &session, checkout, target).await
}

/// Order confirmation.
///
/// Only the order placed in this session can be viewed.
#[instrument(skip(session))]
pub async fn success(session: Session, Path(id): Path<i64>) -> Result<impl IntoResponse> {
    let order = VisitorSession::new(&session)
        .last_order()
        .await?
        .filter(|order| order.id.as_i64() == id)
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    Ok(CheckoutSuccessTemplate { order })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_personal_form_normalizes_phone() {
        let form: PersonalForm = serde_urlencoded::from_str(
            "first_name=+Анна+&last_name=Петрова&phone=89161234567&email=anna%40example.ru",
        )
        .unwrap();
        let personal = PersonalInfo::from(form);
        assert_eq!(personal.first_name, "Анна");
        assert_eq!(personal.phone, "+7 (916) 123-45-67");
    }

    #[test]
    fn test_delivery_form_masks_date_and_parses_choices() {
        let form: DeliveryForm = serde_urlencoded::from_str(
            "method=courier&address=Москва&date=01022030&time_slot=14-18&comment=",
        )
        .unwrap();
        let mut data = CheckoutData::default();
        form.apply(&mut data);
        assert_eq!(data.delivery.method, DeliveryMethod::Courier);
        assert_eq!(data.delivery.date, "01.02.2030");
        assert_eq!(data.delivery.time_slot, Some(TimeSlot::Afternoon));
    }

    #[test]
    fn test_delivery_form_unknown_values() {
        let form: DeliveryForm =
            serde_urlencoded::from_str("method=teleport&time_slot=3-4").unwrap();
        let mut data = CheckoutData::default();
        form.apply(&mut data);
        assert_eq!(data.delivery.method, DeliveryMethod::Courier);
        assert_eq!(data.delivery.time_slot, None);
    }

    #[test]
    fn test_step_views() {
        let steps = step_views(CheckoutStep::Delivery);
        assert_eq!(steps.len(), 3);
        assert!(steps[0].is_done);
        assert!(steps[1].is_current);
        assert!(!steps[2].is_done && !steps[2].is_current);
    }

    #[test]
    fn test_field_errors_lookup() {
        let errors = FieldErrors(vec![FieldError {
            field: "phone",
            message: "Введите номер телефона полностью",
        }]);
        assert!(errors.has("phone"));
        assert!(!errors.has("email"));
        assert_eq!(errors.get("email"), "");
    }
}
