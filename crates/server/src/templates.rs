//! Server-rendered pages. Templates are embedded at build time and compiled
//! once on first use.

use chrono::NaiveDate;
use db::models::order::Order;
use handlebars::Handlebars;
use once_cell::sync::OnceCell;
use rust_embed::RustEmbed;
use serde::Serialize;
use services::services::{
    catalog::{CanvasSize, Catalog, FrameOption, PaymentMethod, Theme},
    order_form::{LEAD_TIME_DAYS, OrderForm, delivery_date},
};
use thiserror::Error;

#[derive(RustEmbed)]
#[folder = "templates/"]
struct TemplateAssets;

static REGISTRY: OnceCell<Handlebars<'static>> = OnceCell::new();

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template {0} is not valid UTF-8")]
    Encoding(String),
    #[error(transparent)]
    Parse(#[from] handlebars::TemplateError),
    #[error(transparent)]
    Render(#[from] handlebars::RenderError),
}

fn build_registry() -> Result<Handlebars<'static>, TemplateError> {
    let mut handlebars = Handlebars::new();
    for file in TemplateAssets::iter() {
        let Some(asset) = TemplateAssets::get(&file) else {
            continue;
        };
        let source = std::str::from_utf8(&asset.data)
            .map_err(|_| TemplateError::Encoding(file.to_string()))?;
        let name = file.trim_end_matches(".hbs");
        handlebars.register_template_string(name, source)?;
    }
    Ok(handlebars)
}

/// Render template `name` (file stem under `templates/`).
pub fn render<T: Serialize>(name: &str, data: &T) -> Result<String, TemplateError> {
    let registry = REGISTRY.get_or_try_init(build_registry)?;
    Ok(registry.render(name, data)?)
}

#[derive(Debug, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Serialize)]
pub struct SelectField {
    pub name: &'static str,
    pub label: &'static str,
    pub options: Vec<SelectOption>,
}

impl SelectField {
    /// Options of `T`, led by its placeholder (empty value) when it has one.
    /// A stored value no longer in the list leaves the placeholder selected.
    fn of<T: Catalog>(label: &'static str, current: &str) -> Self {
        let current = current.trim();
        let mut options: Vec<SelectOption> = T::PLACEHOLDER
            .map(|placeholder| SelectOption {
                value: String::new(),
                label: placeholder.to_string(),
                selected: false,
            })
            .into_iter()
            .collect();
        options.extend(T::labels().into_iter().map(|option| SelectOption {
            selected: option == current,
            value: option.clone(),
            label: option,
        }));
        if !options.iter().any(|o| o.selected) {
            if let Some(first) = options.first_mut() {
                first.selected = true;
            }
        }
        Self {
            name: T::FIELD,
            label,
            options,
        }
    }
}

/// The order form, as rendered on both the new-order and edit pages.
#[derive(Debug, Serialize)]
pub struct FormView {
    pub action: String,
    pub submit_label: &'static str,
    pub client: String,
    pub custom_size: String,
    pub payment_terms: String,
    pub lead_time_days: Option<i64>,
    pub lead_time_min: i64,
    pub lead_time_max: i64,
    pub theme: SelectField,
    pub frame_option: SelectField,
    pub size: SelectField,
    pub payment_method: SelectField,
    pub order_date: NaiveDate,
    /// Preview for the current lead time; absent when it is out of range.
    pub delivery_date: Option<NaiveDate>,
    pub error: Option<String>,
    pub error_field: Option<&'static str>,
}

impl FormView {
    pub fn new(
        action: impl Into<String>,
        submit_label: &'static str,
        form: &OrderForm,
        order_date: NaiveDate,
    ) -> Self {
        let delivery_date = form
            .lead_time_days
            .filter(|days| LEAD_TIME_DAYS.contains(days))
            .and_then(|days| delivery_date(order_date, days).ok());
        Self {
            action: action.into(),
            submit_label,
            client: form.client.clone(),
            custom_size: form.custom_size.clone(),
            payment_terms: form.payment_terms.clone(),
            lead_time_days: form.lead_time_days,
            lead_time_min: *LEAD_TIME_DAYS.start(),
            lead_time_max: *LEAD_TIME_DAYS.end(),
            theme: SelectField::of::<Theme>("Tema da Pintura", &form.theme),
            frame_option: SelectField::of::<FrameOption>("Moldura", &form.frame_option),
            size: SelectField::of::<CanvasSize>("Tamanho da Tela em (cm)", &form.size),
            payment_method: SelectField::of::<PaymentMethod>(
                "Forma de pagamento",
                &form.payment_method,
            ),
            order_date,
            delivery_date,
            error: None,
            error_field: None,
        }
    }

    pub fn with_error(mut self, message: String, field: Option<&'static str>) -> Self {
        self.error = Some(message);
        self.error_field = field;
        self
    }
}

#[derive(Debug, Serialize)]
pub struct IndexPage {
    pub form: FormView,
    pub orders: Vec<Order>,
    pub flash: Option<String>,
    pub report_file: String,
}

#[derive(Debug, Serialize)]
pub struct EditPage {
    pub order: Order,
    pub form: FormView,
}
