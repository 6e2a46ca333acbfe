//! Fixed option lists offered by the order form dropdowns.
//!
//! The display strings are also the values persisted in `pedidos`, so they
//! must stay byte-for-byte stable.

use std::{fmt::Display, str::FromStr};

use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// A dropdown backed by an enum.
pub trait Catalog: Copy + FromStr + Display + IntoEnumIterator {
    /// Form field the dropdown fills.
    const FIELD: &'static str;
    /// Label of the "nothing chosen yet" entry, when the dropdown has one.
    const PLACEHOLDER: Option<&'static str>;

    fn labels() -> Vec<String> {
        Self::iter().map(|option| option.to_string()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
pub enum Theme {
    #[strum(to_string = "Paisagem")]
    Landscape,
    #[strum(to_string = "Figurativo")]
    Figurative,
    #[strum(to_string = "Abstrato")]
    Abstract,
    #[strum(to_string = "Retrato")]
    Portrait,
    #[strum(to_string = "Marinha")]
    Seascape,
    #[strum(to_string = "Natureza Morta")]
    StillLife,
}

impl Catalog for Theme {
    const FIELD: &'static str = "theme";
    const PLACEHOLDER: Option<&'static str> = Some("Escolha o tema");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
pub enum FrameOption {
    #[strum(to_string = "Com Moldura")]
    Framed,
    #[strum(to_string = "Sem Moldura")]
    Unframed,
}

impl Catalog for FrameOption {
    const FIELD: &'static str = "frame_option";
    const PLACEHOLDER: Option<&'static str> = Some("Escolha");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
pub enum CanvasSize {
    #[strum(to_string = "50cm x 70cm")]
    Cm50x70,
    #[strum(to_string = "60cm x 80cm")]
    Cm60x80,
    #[strum(to_string = "70cm x 90cm")]
    Cm70x90,
    #[strum(to_string = "80cm x 100cm")]
    Cm80x100,
}

impl Catalog for CanvasSize {
    const FIELD: &'static str = "size";
    const PLACEHOLDER: Option<&'static str> = Some("Escolha o tamanho");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
pub enum PaymentMethod {
    #[default]
    #[strum(to_string = "Dinheiro")]
    Cash,
    #[strum(to_string = "Cartão")]
    Card,
    #[strum(to_string = "Pix")]
    Pix,
    #[strum(to_string = "Transferência")]
    BankTransfer,
    #[strum(to_string = "Cheque")]
    Cheque,
    #[strum(to_string = "Promissória")]
    PromissoryNote,
}

impl Catalog for PaymentMethod {
    const FIELD: &'static str = "payment_method";
    const PLACEHOLDER: Option<&'static str> = None;
}

/// One dropdown as exposed to clients.
#[derive(Debug, Clone, Serialize)]
pub struct DropdownOptions {
    pub field: &'static str,
    pub placeholder: Option<&'static str>,
    pub options: Vec<String>,
}

impl DropdownOptions {
    pub fn of<T: Catalog>() -> Self {
        Self {
            field: T::FIELD,
            placeholder: T::PLACEHOLDER,
            options: T::labels(),
        }
    }
}

/// Every dropdown of the order form, in form order.
pub fn all_dropdowns() -> Vec<DropdownOptions> {
    vec![
        DropdownOptions::of::<Theme>(),
        DropdownOptions::of::<FrameOption>(),
        DropdownOptions::of::<CanvasSize>(),
        DropdownOptions::of::<PaymentMethod>(),
    ]
}
