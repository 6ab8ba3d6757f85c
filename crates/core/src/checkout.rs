//! Three-step checkout state machine.
//!
//! Steps run strictly in order: personal details, then delivery, then
//! payment. Moving forward requires the current step's fields to validate;
//! moving back is always allowed. The raw form input is kept as typed so
//! the forms can be re-rendered, and only [`Checkout::validated`] turns it
//! into parsed values for order creation.

use core::fmt;
use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{Email, PhoneNumber, parse_date_input};

/// A checkout stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    Personal,
    Delivery,
    Payment,
}

impl CheckoutStep {
    /// All steps in order.
    pub const ALL: [Self; 3] = [Self::Personal, Self::Delivery, Self::Payment];

    /// The following step, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Personal => Some(Self::Delivery),
            Self::Delivery => Some(Self::Payment),
            Self::Payment => None,
        }
    }

    /// The preceding step, if any.
    #[must_use]
    pub const fn prev(self) -> Option<Self> {
        match self {
            Self::Personal => None,
            Self::Delivery => Some(Self::Personal),
            Self::Payment => Some(Self::Delivery),
        }
    }

    /// 1-based position for progress indicators.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Personal => 1,
            Self::Delivery => 2,
            Self::Payment => 3,
        }
    }

    /// URL segment for the step's form.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Delivery => "delivery",
            Self::Payment => "payment",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Personal => "Личные данные",
            Self::Delivery => "Доставка",
            Self::Payment => "Оплата",
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Contact details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
}

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    #[default]
    Courier,
    Pickup,
}

impl DeliveryMethod {
    /// WooCommerce shipping method ID.
    #[must_use]
    pub const fn method_id(self) -> &'static str {
        match self {
            Self::Courier => "flat_rate",
            Self::Pickup => "local_pickup",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Courier => "Курьером",
            Self::Pickup => "Самовывоз",
        }
    }

    /// Form value.
    #[must_use]
    pub const fn value(self) -> &'static str {
        match self {
            Self::Courier => "courier",
            Self::Pickup => "pickup",
        }
    }
}

impl FromStr for DeliveryMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "courier" => Ok(Self::Courier),
            "pickup" => Ok(Self::Pickup),
            _ => Err(()),
        }
    }
}

/// Courier delivery window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeSlot {
    #[serde(rename = "10-14")]
    Morning,
    #[serde(rename = "14-18")]
    Afternoon,
    #[serde(rename = "18-22")]
    Evening,
}

impl TimeSlot {
    pub const ALL: [Self; 3] = [Self::Morning, Self::Afternoon, Self::Evening];

    /// Form value.
    #[must_use]
    pub const fn value(self) -> &'static str {
        match self {
            Self::Morning => "10-14",
            Self::Afternoon => "14-18",
            Self::Evening => "18-22",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Morning => "10:00–14:00",
            Self::Afternoon => "14:00–18:00",
            Self::Evening => "18:00–22:00",
        }
    }
}

impl FromStr for TimeSlot {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|slot| slot.value() == s.trim())
            .ok_or(())
    }
}

/// Delivery details as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryInfo {
    pub method: DeliveryMethod,
    pub address: String,
    pub apartment: String,
    /// Masked `DD.MM.YYYY` input.
    pub date: String,
    pub time_slot: Option<TimeSlot>,
    pub comment: String,
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    CashOnDelivery,
}

impl PaymentMethod {
    pub const ALL: [Self; 2] = [Self::Card, Self::CashOnDelivery];

    /// WooCommerce payment gateway ID.
    #[must_use]
    pub const fn gateway_id(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::CashOnDelivery => "cod",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Card => "Картой при получении",
            Self::CashOnDelivery => "Наличными при получении",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.gateway_id() == s.trim())
            .ok_or(())
    }
}

/// Everything collected across the three steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutData {
    pub personal: PersonalInfo,
    pub delivery: DeliveryInfo,
    pub payment_method: Option<PaymentMethod>,
}

/// A failed field check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Form field name.
    pub field: &'static str,
    /// Message shown next to the field.
    pub message: &'static str,
}

impl FieldError {
    const fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Errors from step transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckoutError {
    /// A step's fields did not validate.
    #[error("checkout step '{step}' has {} invalid field(s)", .errors.len())]
    Invalid {
        step: CheckoutStep,
        errors: Vec<FieldError>,
    },
}

impl CheckoutError {
    /// Field errors carried by the error.
    #[must_use]
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Invalid { errors, .. } => errors,
        }
    }

    /// The step that failed validation.
    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        match self {
            Self::Invalid { step, .. } => *step,
        }
    }
}

/// Parsed delivery details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedDelivery {
    Courier {
        address: String,
        apartment: Option<String>,
        date: NaiveDate,
        time_slot: TimeSlot,
    },
    Pickup,
}

/// Checkout data with every field parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCheckout {
    pub first_name: String,
    pub last_name: String,
    pub phone: PhoneNumber,
    pub email: Email,
    pub delivery: ValidatedDelivery,
    pub payment_method: PaymentMethod,
    pub comment: Option<String>,
}

/// Checkout progress for one visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkout {
    step: CheckoutStep,
    pub data: CheckoutData,
}

impl Checkout {
    /// Start at the personal step with prefilled data.
    #[must_use]
    pub fn with_data(data: CheckoutData) -> Self {
        Self {
            step: CheckoutStep::Personal,
            data,
        }
    }

    /// The step currently shown.
    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Check one step's fields.
    #[must_use]
    pub fn validate(&self, step: CheckoutStep, today: NaiveDate) -> Vec<FieldError> {
        match step {
            CheckoutStep::Personal => validate_personal(&self.data.personal),
            CheckoutStep::Delivery => validate_delivery(&self.data.delivery, today),
            CheckoutStep::Payment => {
                if self.data.payment_method.is_some() {
                    Vec::new()
                } else {
                    vec![FieldError::new("payment_method", "Выберите способ оплаты")]
                }
            }
        }
    }

    fn check(&self, step: CheckoutStep, today: NaiveDate) -> Result<(), CheckoutError> {
        let errors = self.validate(step, today);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(CheckoutError::Invalid { step, errors })
        }
    }

    /// Move to the next step if the current one validates.
    ///
    /// On the last step this only validates and stays put.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Invalid`] and leaves the step unchanged when
    /// the current step has invalid fields.
    pub fn advance(&mut self, today: NaiveDate) -> Result<CheckoutStep, CheckoutError> {
        self.check(self.step, today)?;
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    /// Move one step back. No-op on the first step.
    pub fn back(&mut self) -> CheckoutStep {
        if let Some(prev) = self.step.prev() {
            self.step = prev;
        }
        self.step
    }

    /// Jump to a step.
    ///
    /// Earlier steps are always reachable; later steps only when every step
    /// before the target validates.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's errors; the step is unchanged.
    pub fn go_to(&mut self, target: CheckoutStep, today: NaiveDate) -> Result<(), CheckoutError> {
        for step in CheckoutStep::ALL.into_iter().filter(|s| *s < target) {
            self.check(step, today)?;
        }
        self.step = target;
        Ok(())
    }

    /// Whether every step validates.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's errors.
    pub fn ready_to_submit(&self, today: NaiveDate) -> Result<(), CheckoutError> {
        CheckoutStep::ALL
            .into_iter()
            .try_for_each(|step| self.check(step, today))
    }

    /// Parse every field for order creation.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's errors.
    pub fn validated(&self, today: NaiveDate) -> Result<ValidatedCheckout, CheckoutError> {
        self.ready_to_submit(today)?;

        // Already validated; failures here map back to the owning step.
        let personal = &self.data.personal;
        let invalid = |step: CheckoutStep, field: &'static str, message: &'static str| {
            CheckoutError::Invalid {
                step,
                errors: vec![FieldError::new(field, message)],
            }
        };
        let phone = PhoneNumber::parse(&personal.phone)
            .map_err(|_| invalid(CheckoutStep::Personal, "phone", PHONE_MESSAGE))?;
        let email = Email::parse(&personal.email)
            .map_err(|_| invalid(CheckoutStep::Personal, "email", EMAIL_MESSAGE))?;
        let payment_method = self.data.payment_method.ok_or_else(|| {
            invalid(CheckoutStep::Payment, "payment_method", "Выберите способ оплаты")
        })?;

        let delivery = &self.data.delivery;
        let validated_delivery = match delivery.method {
            DeliveryMethod::Pickup => ValidatedDelivery::Pickup,
            DeliveryMethod::Courier => ValidatedDelivery::Courier {
                address: delivery.address.trim().to_string(),
                apartment: non_blank(&delivery.apartment),
                date: parse_date_input(&delivery.date)
                    .map_err(|_| invalid(CheckoutStep::Delivery, "date", DATE_MESSAGE))?,
                time_slot: delivery.time_slot.ok_or_else(|| {
                    invalid(CheckoutStep::Delivery, "time_slot", SLOT_MESSAGE)
                })?,
            },
        };

        Ok(ValidatedCheckout {
            first_name: personal.first_name.trim().to_string(),
            last_name: personal.last_name.trim().to_string(),
            phone,
            email,
            delivery: validated_delivery,
            payment_method,
            comment: non_blank(&delivery.comment),
        })
    }
}

const PHONE_MESSAGE: &str = "Введите номер телефона полностью";
const EMAIL_MESSAGE: &str = "Введите корректный email";
const DATE_MESSAGE: &str = "Укажите дату доставки";
const SLOT_MESSAGE: &str = "Выберите время доставки";

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn validate_personal(personal: &PersonalInfo) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if personal.first_name.trim().is_empty() {
        errors.push(FieldError::new("first_name", "Укажите имя"));
    }
    if personal.last_name.trim().is_empty() {
        errors.push(FieldError::new("last_name", "Укажите фамилию"));
    }
    if PhoneNumber::parse(&personal.phone).is_err() {
        errors.push(FieldError::new("phone", PHONE_MESSAGE));
    }
    if Email::parse(&personal.email).is_err() {
        errors.push(FieldError::new("email", EMAIL_MESSAGE));
    }
    errors
}

fn validate_delivery(delivery: &DeliveryInfo, today: NaiveDate) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if delivery.method == DeliveryMethod::Pickup {
        return errors;
    }
    if delivery.address.trim().is_empty() {
        errors.push(FieldError::new("address", "Укажите адрес доставки"));
    }
    match parse_date_input(&delivery.date) {
        Ok(date) if date < today => {
            errors.push(FieldError::new("date", "Дата доставки уже прошла"));
        }
        Ok(_) => {}
        Err(_) => errors.push(FieldError::new("date", DATE_MESSAGE)),
    }
    if delivery.time_slot.is_none() {
        errors.push(FieldError::new("time_slot", SLOT_MESSAGE));
    }
    errors
}

/// Contact and address details remembered after a successful order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCustomer {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub apartment: String,
}

impl SavedCustomer {
    /// Fill blank checkout fields from the saved details.
    pub fn prefill(&self, data: &mut CheckoutData) {
        fill(&mut data.personal.first_name, &self.first_name);
        fill(&mut data.personal.last_name, &self.last_name);
        fill(&mut data.personal.phone, &self.phone);
        fill(&mut data.personal.email, &self.email);
        fill(&mut data.delivery.address, &self.address);
        fill(&mut data.delivery.apartment, &self.apartment);
    }
}

fn fill(target: &mut String, saved: &str) {
    if target.trim().is_empty() && !saved.is_empty() {
        saved.clone_into(target);
    }
}

impl From<&ValidatedCheckout> for SavedCustomer {
    fn from(checkout: &ValidatedCheckout) -> Self {
        let (address, apartment) = match &checkout.delivery {
            ValidatedDelivery::Courier {
                address, apartment, ..
            } => (address.clone(), apartment.clone().unwrap_or_default()),
            ValidatedDelivery::Pickup => (String::new(), String::new()),
        };
        Self {
            first_name: checkout.first_name.clone(),
            last_name: checkout.last_name.clone(),
            phone: checkout.phone.masked(),
            email: checkout.email.to_string(),
            address,
            apartment,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn personal() -> PersonalInfo {
        PersonalInfo {
            first_name: "Анна".to_string(),
            last_name: "Иванова".to_string(),
            phone: "+7 (999) 123-45-67".to_string(),
            email: "anna@example.ru".to_string(),
        }
    }

    fn courier() -> DeliveryInfo {
        DeliveryInfo {
            method: DeliveryMethod::Courier,
            address: "Москва, ул. Тверская, д. 1".to_string(),
            apartment: "12".to_string(),
            date: "20.10.2026".to_string(),
            time_slot: Some(TimeSlot::Afternoon),
            comment: String::new(),
        }
    }

    fn complete() -> Checkout {
        Checkout::with_data(CheckoutData {
            personal: personal(),
            delivery: courier(),
            payment_method: Some(PaymentMethod::Card),
        })
    }

    #[test]
    fn test_step_order() {
        assert_eq!(CheckoutStep::Personal.next(), Some(CheckoutStep::Delivery));
        assert_eq!(CheckoutStep::Payment.next(), None);
        assert_eq!(CheckoutStep::Personal.prev(), None);
        assert_eq!(CheckoutStep::Payment.prev(), Some(CheckoutStep::Delivery));
        assert!(CheckoutStep::Personal < CheckoutStep::Payment);
    }

    #[test]
    fn test_cannot_advance_with_empty_personal_step() {
        let mut checkout = Checkout::default();
        let err = checkout.advance(today()).unwrap_err();
        assert_eq!(err.step(), CheckoutStep::Personal);
        let fields: Vec<_> = err.field_errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, ["first_name", "last_name", "phone", "email"]);
        assert_eq!(checkout.step(), CheckoutStep::Personal);
    }

    #[test]
    fn test_invalid_phone_blocks_progress() {
        let mut checkout = Checkout::default();
        checkout.data.personal = PersonalInfo {
            phone: "+7 (999) 12".to_string(),
            ..personal()
        };
        let err = checkout.advance(today()).unwrap_err();
        assert_eq!(err.field_errors()[0].field, "phone");
    }

    #[test]
    fn test_full_forward_flow() {
        let mut checkout = Checkout::default();
        checkout.data.personal = personal();
        assert_eq!(checkout.advance(today()).unwrap(), CheckoutStep::Delivery);

        checkout.data.delivery = courier();
        assert_eq!(checkout.advance(today()).unwrap(), CheckoutStep::Payment);

        assert!(checkout.advance(today()).is_err());
        checkout.data.payment_method = Some(PaymentMethod::CashOnDelivery);
        assert_eq!(checkout.advance(today()).unwrap(), CheckoutStep::Payment);
        assert!(checkout.ready_to_submit(today()).is_ok());
    }

    #[test]
    fn test_courier_requires_address_date_and_slot() {
        let mut checkout = Checkout::default();
        checkout.data.personal = personal();
        checkout.advance(today()).unwrap();

        checkout.data.delivery.method = DeliveryMethod::Courier;
        let err = checkout.advance(today()).unwrap_err();
        let fields: Vec<_> = err.field_errors().iter().map(|e| e.field).collect();
        assert_eq!(fields, ["address", "date", "time_slot"]);
        assert_eq!(checkout.step(), CheckoutStep::Delivery);
    }

    #[test]
    fn test_past_delivery_date_rejected() {
        let checkout = Checkout::with_data(CheckoutData {
            delivery: DeliveryInfo {
                date: "17.10.2026".to_string(),
                ..courier()
            },
            ..complete().data
        });
        let errors = checkout.validate(CheckoutStep::Delivery, today());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "date");

        // Today itself is fine
        let checkout = Checkout::with_data(CheckoutData {
            delivery: DeliveryInfo {
                date: "18.10.2026".to_string(),
                ..courier()
            },
            ..complete().data
        });
        assert!(checkout.validate(CheckoutStep::Delivery, today()).is_empty());
    }

    #[test]
    fn test_pickup_needs_no_address() {
        let checkout = Checkout::with_data(CheckoutData {
            delivery: DeliveryInfo {
                method: DeliveryMethod::Pickup,
                ..DeliveryInfo::default()
            },
            ..complete().data
        });
        assert!(checkout.validate(CheckoutStep::Delivery, today()).is_empty());
        let validated = checkout.validated(today()).unwrap();
        assert_eq!(validated.delivery, ValidatedDelivery::Pickup);
    }

    #[test]
    fn test_back_is_always_allowed() {
        let mut checkout = complete();
        checkout.go_to(CheckoutStep::Payment, today()).unwrap();
        assert_eq!(checkout.back(), CheckoutStep::Delivery);
        assert_eq!(checkout.back(), CheckoutStep::Personal);
        assert_eq!(checkout.back(), CheckoutStep::Personal);
    }

    #[test]
    fn test_go_to_gates_forward_jumps() {
        let mut checkout = Checkout::default();
        checkout.data.personal = personal();
        let err = checkout
            .go_to(CheckoutStep::Payment, today())
            .unwrap_err();
        assert_eq!(err.step(), CheckoutStep::Delivery);
        assert_eq!(checkout.step(), CheckoutStep::Personal);

        checkout.go_to(CheckoutStep::Delivery, today()).unwrap();
        assert_eq!(checkout.step(), CheckoutStep::Delivery);
        checkout.go_to(CheckoutStep::Personal, today()).unwrap();
        assert_eq!(checkout.step(), CheckoutStep::Personal);
    }

    #[test]
    fn test_validated_parses_fields() {
        let validated = complete().validated(today()).unwrap();
        assert_eq!(validated.phone.e164(), "+79991234567");
        assert_eq!(validated.email.as_str(), "anna@example.ru");
        assert_eq!(validated.comment, None);
        assert_eq!(
            validated.delivery,
            ValidatedDelivery::Courier {
                address: "Москва, ул. Тверская, д. 1".to_string(),
                apartment: Some("12".to_string()),
                date: NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
                time_slot: TimeSlot::Afternoon,
            }
        );
    }

    #[test]
    fn test_saved_customer_prefills_blank_fields_only() {
        let saved = SavedCustomer::from(&complete().validated(today()).unwrap());
        let mut data = CheckoutData::default();
        data.personal.first_name = "Мария".to_string();
        saved.prefill(&mut data);

        assert_eq!(data.personal.first_name, "Мария");
        assert_eq!(data.personal.last_name, "Иванова");
        assert_eq!(data.personal.phone, "+7 (999) 123-45-67");
        assert_eq!(data.delivery.apartment, "12");
    }

    #[test]
    fn test_form_values_parse() {
        assert_eq!("14-18".parse::<TimeSlot>(), Ok(TimeSlot::Afternoon));
        assert!("9-10".parse::<TimeSlot>().is_err());
        assert_eq!("cod".parse::<PaymentMethod>(), Ok(PaymentMethod::CashOnDelivery));
        assert_eq!(" pickup ".parse::<DeliveryMethod>(), Ok(DeliveryMethod::Pickup));
        assert!("drone".parse::<DeliveryMethod>().is_err());
    }

    #[test]
    fn test_checkout_session_round_trip() {
        let mut checkout = complete();
        checkout.advance(today()).unwrap();
        let json = serde_json::to_string(&checkout).unwrap();
        let restored: Checkout = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, checkout);
        assert_eq!(restored.step(), CheckoutStep::Delivery);
    }
}
