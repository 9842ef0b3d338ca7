//! # Domain Types
//!
//! The option enums a drink is customized with, the tax rate, and the
//! payment method recorded on an order.
//!
//! ## Lenient Reading, Canonical Writing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Incoming value            Parsed as              Written back as       │
//! │  ─────────────────         ─────────────────      ─────────────────     │
//! │  "Large", " large "        Size::Large            "large"               │
//! │  50, "50", "Half"          Sweetness::Fifty       "50%"                 │
//! │  "No Ice", "none"          IceLevel::NoIce        "none"                │
//! │  "Regular" (cashier)       Sweetness::Hundred     "100%"                │
//! │  null, 17, "weird"         the baseline value     baseline label        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Options never fail to deserialize: a stored cart written by any version
//! of the kiosk must still load. Unknown values fall back to the baseline.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so the store's 8.25% is 825 bps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (`8.25` → 825 bps).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round().max(0.0) as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::from_bps(crate::DEFAULT_TAX_RATE_BPS)
    }
}

// =============================================================================
// Lenient Parsing
// =============================================================================

/// Any JSON scalar a historic payload might carry in an option or number slot.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum Loose {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

impl Loose {
    /// The value as a number, accepting numeric strings.
    pub(crate) fn number(&self) -> Option<f64> {
        match self {
            Loose::Number(n) if n.is_finite() => Some(*n),
            Loose::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }
}

/// Reads an optional number that may arrive as a string, `null`, or garbage.
pub(crate) fn loose_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Loose::deserialize(deserializer)?.number())
}

/// An option enum that can be read from any label or number.
pub trait OptionLabel: Sized + Default {
    /// Parses a label, case-insensitively. `None` when unrecognized.
    fn parse(label: &str) -> Option<Self>;

    /// Parses a bare number. Only sweetness has numeric labels.
    fn from_number(_value: f64) -> Option<Self> {
        None
    }

    /// Parses a label, falling back to the baseline value.
    fn from_label(label: &str) -> Self {
        Self::parse(label).unwrap_or_default()
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: OptionLabel,
{
    let parsed = match Loose::deserialize(deserializer)? {
        Loose::Number(n) => T::from_number(n),
        Loose::Text(s) => T::parse(&s),
        Loose::Other(_) => None,
    };
    Ok(parsed.unwrap_or_default())
}

fn normalize_label(label: &str) -> String {
    label.trim().to_ascii_lowercase()
}

// =============================================================================
// Size
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Size {
    #[default]
    Small,
    Medium,
    Large,
}

impl Size {
    /// Upcharge over the small baseline.
    pub const fn surcharge(&self) -> Money {
        match self {
            Size::Small => Money::from_cents(0),
            Size::Medium => Money::from_cents(20),
            Size::Large => Money::from_cents(40),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Size::Small => "small",
            Size::Medium => "medium",
            Size::Large => "large",
        }
    }
}

impl OptionLabel for Size {
    fn parse(label: &str) -> Option<Self> {
        match normalize_label(label).as_str() {
            "small" | "s" | "regular" => Some(Size::Small),
            "medium" | "m" => Some(Size::Medium),
            "large" | "l" => Some(Size::Large),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Size {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient(deserializer)
    }
}

// =============================================================================
// Ice Level
// =============================================================================

/// Ice level. Meaningless for hot drinks, where it is kept at `Regular`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, TS)]
#[ts(export)]
pub enum IceLevel {
    #[default]
    #[serde(rename = "regular")]
    Regular,
    #[serde(rename = "less")]
    Less,
    #[serde(rename = "none")]
    NoIce,
}

impl IceLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            IceLevel::Regular => "regular",
            IceLevel::Less => "less",
            IceLevel::NoIce => "none",
        }
    }
}

impl OptionLabel for IceLevel {
    fn parse(label: &str) -> Option<Self> {
        match normalize_label(label).as_str() {
            "regular" | "normal" | "full" => Some(IceLevel::Regular),
            "less" | "light" | "less ice" => Some(IceLevel::Less),
            "none" | "no" | "no ice" | "0%" => Some(IceLevel::NoIce),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for IceLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient(deserializer)
    }
}

// =============================================================================
// Sweetness
// =============================================================================

/// Sugar level, written as a percentage label (`"50%"`).
///
/// ```text
/// Label   Popup name   Surcharge
/// 0%      No Sugar     -
/// 30%     Light        -
/// 50%     Half         -
/// 80%     Less         -
/// 100%    Normal       -        (baseline; the cashier's "Regular")
/// 125%    Extra        +$0.20
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, TS)]
#[ts(export)]
pub enum Sweetness {
    #[serde(rename = "0%")]
    Zero,
    #[serde(rename = "30%")]
    Thirty,
    #[serde(rename = "50%")]
    Fifty,
    #[serde(rename = "80%")]
    Eighty,
    #[default]
    #[serde(rename = "100%")]
    Hundred,
    #[serde(rename = "125%")]
    Extra,
}

impl Sweetness {
    pub const ALL: [Sweetness; 6] = [
        Sweetness::Zero,
        Sweetness::Thirty,
        Sweetness::Fifty,
        Sweetness::Eighty,
        Sweetness::Hundred,
        Sweetness::Extra,
    ];

    pub const fn percent(&self) -> u32 {
        match self {
            Sweetness::Zero => 0,
            Sweetness::Thirty => 30,
            Sweetness::Fifty => 50,
            Sweetness::Eighty => 80,
            Sweetness::Hundred => 100,
            Sweetness::Extra => 125,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Sweetness::Zero => "0%",
            Sweetness::Thirty => "30%",
            Sweetness::Fifty => "50%",
            Sweetness::Eighty => "80%",
            Sweetness::Hundred => "100%",
            Sweetness::Extra => "125%",
        }
    }

    pub const fn surcharge(&self) -> Money {
        match self {
            Sweetness::Extra => Money::from_cents(20),
            _ => Money::from_cents(0),
        }
    }
}

impl OptionLabel for Sweetness {
    fn parse(label: &str) -> Option<Self> {
        let label = normalize_label(label);
        match label.as_str() {
            "no sugar" | "none" | "zero" => return Some(Sweetness::Zero),
            "light" => return Some(Sweetness::Thirty),
            "half" => return Some(Sweetness::Fifty),
            "less" => return Some(Sweetness::Eighty),
            "normal" | "regular" | "full" => return Some(Sweetness::Hundred),
            "extra" => return Some(Sweetness::Extra),
            _ => {}
        }
        let number = label.trim_end_matches('%').trim().parse::<f64>().ok()?;
        Self::from_number(number)
    }

    fn from_number(value: f64) -> Option<Self> {
        Sweetness::ALL
            .into_iter()
            .find(|s| s.percent() as f64 == value)
    }
}

impl fmt::Display for Sweetness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Sweetness {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient(deserializer)
    }
}

// =============================================================================
// Temperature
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Temperature {
    #[default]
    Iced,
    Hot,
}

impl Temperature {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Temperature::Iced => "iced",
            Temperature::Hot => "hot",
        }
    }
}

impl OptionLabel for Temperature {
    fn parse(label: &str) -> Option<Self> {
        match normalize_label(label).as_str() {
            "iced" | "ice" | "cold" => Some(Temperature::Iced),
            "hot" | "warm" => Some(Temperature::Hot),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Temperature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient(deserializer)
    }
}

// =============================================================================
// Tea Type
// =============================================================================

/// Tea base, only for drinks whose catalog entry offers a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum TeaType {
    Black,
    Green,
    Oolong,
}

impl TeaType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TeaType::Black => "black",
            TeaType::Green => "green",
            TeaType::Oolong => "oolong",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match normalize_label(label).as_str() {
            "black" | "black tea" => Some(TeaType::Black),
            "green" | "green tea" | "jasmine" => Some(TeaType::Green),
            "oolong" | "oolong tea" => Some(TeaType::Oolong),
            _ => None,
        }
    }
}

/// Reads an optional tea type; anything unrecognized is "no tea type".
pub fn deserialize_tea_type<'de, D>(deserializer: D) -> Result<Option<TeaType>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Text(s) => TeaType::parse(&s),
        _ => None,
    })
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the order was paid. Strict: an order with an unknown method is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PaymentMethod {
    Cash,
    Card,
}

impl PaymentMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Toppings Menu
// =============================================================================

/// Price of each topping, per drink.
pub const TOPPING_PRICE: Money = Money::from_cents(75);

/// Toppings offered by the customization popup: `(id, label)`.
pub const KNOWN_TOPPINGS: &[(&str, &str)] = &[
    ("pearls", "Pearls (Boba)"),
    ("lychee", "Lychee Jelly"),
    ("coffee", "Coffee Jelly"),
    ("honey", "Honey Jelly"),
    ("pudding", "Pudding"),
    ("crystal", "Crystal Boba"),
    ("icecream", "Ice Cream"),
    ("creama", "Creama"),
    ("mango", "Mango Pop Boba"),
    ("strawberry", "Strawberry Pop Boba"),
];

/// Display label for a topping id.
pub fn topping_label(id: &str) -> Option<&'static str> {
    KNOWN_TOPPINGS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(id.trim()))
        .map(|(_, label)| *label)
}

/// Whether a stored topping (id or label) is on the menu.
pub fn is_known_topping(topping: &str) -> bool {
    let topping = topping.trim();
    KNOWN_TOPPINGS
        .iter()
        .any(|(id, label)| id.eq_ignore_ascii_case(topping) || label.eq_ignore_ascii_case(topping))
}

// =============================================================================
// Unit Tests
// =============================================================================
