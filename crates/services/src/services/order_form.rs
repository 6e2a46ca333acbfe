//! Boundary between submitted form values and storable orders.

use std::ops::RangeInclusive;

use std::fmt;

use chrono::{Days, NaiveDate};
use db::models::order::{CreateOrder, Order};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, Visitor},
};
use thiserror::Error;

use super::catalog::{CanvasSize, Catalog, FrameOption, PaymentMethod, Theme};

/// Bounds of the lead time input, in days.
pub const LEAD_TIME_DAYS: RangeInclusive<i64> = 15..=365;
pub const DEFAULT_LEAD_TIME_DAYS: i64 = 15;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Informe o nome do cliente.")]
    MissingClient,
    #[error("Escolha o tema da pintura.")]
    ThemeNotChosen,
    #[error("Escolha a opção de moldura.")]
    FrameNotChosen,
    #[error("Escolha o tamanho da tela.")]
    SizeNotChosen,
    #[error("Informe o tempo de entrega em dias.")]
    MissingLeadTime,
    #[error("O tempo de entrega deve estar entre 15 e 365 dias (recebido: {0}).")]
    LeadTimeOutOfRange(i64),
    #[error("Opção inválida para {field}: {value}")]
    UnknownOption { field: &'static str, value: String },
    #[error("Data de entrega fora do calendário suportado.")]
    DeliveryDateOverflow,
}

impl FormError {
    /// Name of the form field the message belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingClient => "client",
            Self::ThemeNotChosen => Theme::FIELD,
            Self::FrameNotChosen => FrameOption::FIELD,
            Self::SizeNotChosen => CanvasSize::FIELD,
            Self::MissingLeadTime
            | Self::LeadTimeOutOfRange(_)
            | Self::DeliveryDateOverflow => "lead_time_days",
            Self::UnknownOption { field, .. } => *field,
        }
    }
}

/// State of a dropdown: still on its placeholder, or holding a real option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<T> {
    Unselected,
    Chosen(T),
}

impl<T: Catalog> Selection<T> {
    /// Empty input and the placeholder label both mean "not chosen"; any
    /// other label must name an option.
    pub fn parse(raw: &str) -> Result<Self, FormError> {
        let raw = raw.trim();
        if raw.is_empty() || T::PLACEHOLDER == Some(raw) {
            return Ok(Selection::Unselected);
        }
        raw.parse::<T>()
            .map(Selection::Chosen)
            .map_err(|_| FormError::UnknownOption {
                field: T::FIELD,
                value: raw.to_string(),
            })
    }

    pub fn chosen(self) -> Option<T> {
        match self {
            Selection::Chosen(value) => Some(value),
            Selection::Unselected => None,
        }
    }
}

/// `order_date + lead_time_days`.
pub fn delivery_date(order_date: NaiveDate, lead_time_days: i64) -> Result<NaiveDate, FormError> {
    let days = u64::try_from(lead_time_days)
        .map_err(|_| FormError::LeadTimeOutOfRange(lead_time_days))?;
    order_date
        .checked_add_days(Days::new(days))
        .ok_or(FormError::DeliveryDateOverflow)
}

/// Accepts the lead time as a number or as the text of the number input.
/// Blank or non-integer input reads as `None` so validation can report it
/// like any other field.
fn lenient_days<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct DaysVisitor;

    impl<'de> Visitor<'de> for DaysVisitor {
        type Value = Option<i64>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a number of days")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(i64::try_from(v).ok())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            let whole = v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64;
            Ok(whole.then_some(v as i64))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.trim().parse().ok())
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            d.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(DaysVisitor)
}

/// Raw values of the order form, exactly as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderForm {
    pub client: String,
    pub theme: String,
    pub frame_option: String,
    pub size: String,
    pub custom_size: String,
    /// `None` when the input was blank or not a whole number.
    #[serde(deserialize_with = "lenient_days")]
    pub lead_time_days: Option<i64>,
    pub payment_terms: String,
    pub payment_method: String,
}

impl Default for OrderForm {
    /// A blank form: dropdowns on their placeholders, minimum lead time,
    /// first payment method.
    fn default() -> Self {
        Self {
            client: String::new(),
            theme: String::new(),
            frame_option: String::new(),
            size: String::new(),
            custom_size: String::new(),
            lead_time_days: Some(DEFAULT_LEAD_TIME_DAYS),
            payment_terms: String::new(),
            payment_method: PaymentMethod::default().to_string(),
        }
    }
}

impl From<&Order> for OrderForm {
    /// Pre-populate the edit form with what is stored.
    fn from(order: &Order) -> Self {
        Self {
            client: order.client.clone(),
            theme: order.theme.clone(),
            frame_option: order.frame_option.clone(),
            size: order.size.clone(),
            custom_size: order.custom_size.clone(),
            lead_time_days: Some(order.lead_time_days),
            payment_terms: order.payment_terms.clone(),
            payment_method: order.payment_method.clone(),
        }
    }
}

impl OrderForm {
    /// Check the required fields in form order and build the row to store.
    /// `delivery_date` is computed once here from `order_date`.
    pub fn validate(&self, order_date: NaiveDate) -> Result<CreateOrder, FormError> {
        if self.client.trim().is_empty() {
            return Err(FormError::MissingClient);
        }
        let theme = Selection::<Theme>::parse(&self.theme)?
            .chosen()
            .ok_or(FormError::ThemeNotChosen)?;
        let frame_option = Selection::<FrameOption>::parse(&self.frame_option)?
            .chosen()
            .ok_or(FormError::FrameNotChosen)?;
        let size = Selection::<CanvasSize>::parse(&self.size)?
            .chosen()
            .ok_or(FormError::SizeNotChosen)?;
        let lead_time_days = self.lead_time_days.ok_or(FormError::MissingLeadTime)?;
        if !LEAD_TIME_DAYS.contains(&lead_time_days) {
            return Err(FormError::LeadTimeOutOfRange(lead_time_days));
        }
        let payment_method = Selection::<PaymentMethod>::parse(&self.payment_method)?
            .chosen()
            .unwrap_or_default();

        Ok(CreateOrder {
            client: self.client.clone(),
            theme: theme.to_string(),
            frame_option: frame_option.to_string(),
            size: size.to_string(),
            custom_size: self.custom_size.clone(),
            order_date,
            lead_time_days,
            delivery_date: delivery_date(order_date, lead_time_days)?,
            payment_terms: self.payment_terms.clone(),
            payment_method: payment_method.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> OrderForm {
        OrderForm {
            client: "Maria Lima".to_string(),
            theme: "Retrato".to_string(),
            frame_option: "Sem Moldura".to_string(),
            size: "50cm x 70cm".to_string(),
            custom_size: String::new(),
            lead_time_days: Some(20),
            payment_terms: "Entrada de 30%".to_string(),
            payment_method: "Pix".to_string(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn delivery_date_adds_lead_time() {
        let order = filled().validate(day(2024, 5, 10)).unwrap();
        assert_eq!(order.order_date, day(2024, 5, 10));
        assert_eq!(order.delivery_date, day(2024, 5, 30));
        assert_eq!(order.lead_time_days, 20);
        assert_eq!(order.theme, "Retrato");
        assert_eq!(order.payment_method, "Pix");
    }

    #[test]
    fn delivery_date_crosses_month_and_year() {
        assert_eq!(delivery_date(day(2024, 12, 20), 15).unwrap(), day(2025, 1, 4));
        assert_eq!(delivery_date(day(2024, 2, 14), 15).unwrap(), day(2024, 2, 29));
    }

    #[test]
    fn theme_placeholder_is_rejected() {
        let form = OrderForm {
            theme: "Escolha o tema".to_string(),
            ..filled()
        };
        assert_eq!(form.validate(day(2024, 5, 10)), Err(FormError::ThemeNotChosen));
    }

    #[test]
    fn blank_form_reports_client_first() {
        let err = OrderForm::default().validate(day(2024, 5, 10)).unwrap_err();
        assert_eq!(err, FormError::MissingClient);
        assert_eq!(err.field(), "client");
    }

    #[test]
    fn whitespace_client_is_missing() {
        let form = OrderForm {
            client: "   ".to_string(),
            ..filled()
        };
        assert_eq!(form.validate(day(2024, 5, 10)), Err(FormError::MissingClient));
    }

    #[test]
    fn frame_and_size_must_be_chosen() {
        let no_frame = OrderForm {
            frame_option: "Escolha".to_string(),
            ..filled()
        };
        assert_eq!(no_frame.validate(day(2024, 5, 10)), Err(FormError::FrameNotChosen));

        let no_size = OrderForm {
            size: String::new(),
            ..filled()
        };
        assert_eq!(no_size.validate(day(2024, 5, 10)), Err(FormError::SizeNotChosen));
    }

    #[test]
    fn unknown_option_names_the_field() {
        let form = OrderForm {
            theme: "Cubismo".to_string(),
            ..filled()
        };
        let err = form.validate(day(2024, 5, 10)).unwrap_err();
        assert_eq!(
            err,
            FormError::UnknownOption {
                field: "theme",
                value: "Cubismo".to_string()
            }
        );
        assert_eq!(err.field(), "theme");
    }

    #[test]
    fn lead_time_bounds_are_inclusive() {
        for (days, ok) in [(14, false), (15, true), (365, true), (366, false)] {
            let form = OrderForm {
                lead_time_days: Some(days),
                ..filled()
            };
            assert_eq!(form.validate(day(2024, 5, 10)).is_ok(), ok, "lead time {days}");
        }
    }

    #[test]
    fn blank_lead_time_is_reported_after_size() {
        let form = OrderForm {
            lead_time_days: None,
            ..filled()
        };
        let err = form.validate(day(2024, 5, 10)).unwrap_err();
        assert_eq!(err, FormError::MissingLeadTime);
        assert_eq!(err.field(), "lead_time_days");

        let no_size_either = OrderForm {
            size: String::new(),
            ..form
        };
        assert_eq!(
            no_size_either.validate(day(2024, 5, 10)),
            Err(FormError::SizeNotChosen)
        );
    }

    #[test]
    fn lead_time_accepts_numbers_and_text() {
        let parse = |raw: &str| -> Option<i64> {
            serde_json::from_str::<OrderForm>(raw).unwrap().lead_time_days
        };
        assert_eq!(parse(r#"{"lead_time_days": 20}"#), Some(20));
        assert_eq!(parse(r#"{"lead_time_days": "30"}"#), Some(30));
        assert_eq!(parse(r#"{"lead_time_days": " 45 "}"#), Some(45));
        assert_eq!(parse(r#"{"lead_time_days": ""}"#), None);
        assert_eq!(parse(r#"{"lead_time_days": "abc"}"#), None);
        assert_eq!(parse(r#"{"lead_time_days": 20.5}"#), None);
        assert_eq!(parse(r#"{"lead_time_days": null}"#), None);
        assert_eq!(parse("{}"), Some(DEFAULT_LEAD_TIME_DAYS));
    }

    #[test]
    fn custom_size_is_free_text() {
        let form = OrderForm {
            custom_size: "abc".to_string(),
            ..filled()
        };
        let order = form.validate(day(2024, 5, 10)).unwrap();
        assert_eq!(order.custom_size, "abc");
        assert_eq!(order.size, "50cm x 70cm");
    }

    #[test]
    fn empty_payment_method_defaults_to_cash() {
        let form = OrderForm {
            payment_method: String::new(),
            ..filled()
        };
        assert_eq!(form.validate(day(2024, 5, 10)).unwrap().payment_method, "Dinheiro");
    }

    #[test]
    fn form_prefills_from_stored_order() {
        let stored = filled().validate(day(2024, 5, 10)).unwrap().into_order(3);
        assert_eq!(OrderForm::from(&stored), filled());
    }
}
