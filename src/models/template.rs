//! Structured message templates
//!
//! Templates are sent as a message attachment of type `template`. The
//! platform rejects oversized templates; call `validate()` before sending to
//! catch that locally.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Maximum number of elements (bubbles) in a generic or list template
pub const MAX_ELEMENTS: usize = 10;

/// Maximum element title length, in characters
pub const MAX_TITLE_CHARS: usize = 45;

/// Maximum element subtitle length, in characters
pub const MAX_SUBTITLE_CHARS: usize = 80;

/// Maximum number of buttons on an element or button template
pub const MAX_BUTTONS: usize = 3;

/// Template constraint violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template exceeds the {max} element limit", max = MAX_ELEMENTS)]
    BubblesLimitExceeded,

    #[error("element title exceeds the {max} character limit", max = MAX_TITLE_CHARS)]
    TitleTooLong,

    #[error("element subtitle exceeds the {max} character limit", max = MAX_SUBTITLE_CHARS)]
    SubtitleTooLong,

    #[error("at most {max} buttons are allowed", max = MAX_BUTTONS)]
    ButtonsLimitExceeded,
}

/// Any template, tagged by `template_type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "template_type", rename_all = "lowercase")]
pub enum Template {
    Generic(GenericTemplate),
    List(ListTemplate),
    Button(ButtonTemplate),
    Receipt(ReceiptTemplate),
}

impl From<GenericTemplate> for Template {
    fn from(template: GenericTemplate) -> Self {
        Self::Generic(template)
    }
}

impl From<ListTemplate> for Template {
    fn from(template: ListTemplate) -> Self {
        Self::List(template)
    }
}

impl From<ButtonTemplate> for Template {
    fn from(template: ButtonTemplate) -> Self {
        Self::Button(template)
    }
}

impl From<ReceiptTemplate> for Template {
    fn from(template: ReceiptTemplate) -> Self {
        Self::Receipt(template)
    }
}

/// Clickable button on an element, button template or persistent menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Button {
    /// Opens a URL
    WebUrl { title: String, url: String },
    /// Sends `payload` back to the webhook as a postback
    Postback { title: String, payload: String },
    /// Dials the phone number in `payload`
    PhoneNumber { title: String, payload: String },
}

impl Button {
    #[must_use]
    pub fn url(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self::WebUrl {
            title: title.into(),
            url: url.into(),
        }
    }

    #[must_use]
    pub fn postback(title: impl Into<String>, payload: impl Into<String>) -> Self {
        Self::Postback {
            title: title.into(),
            payload: payload.into(),
        }
    }

    #[must_use]
    pub fn phone_number(title: impl Into<String>, number: impl Into<String>) -> Self {
        Self::PhoneNumber {
            title: title.into(),
            payload: number.into(),
        }
    }

    /// Button caption
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::WebUrl { title, .. }
            | Self::Postback { title, .. }
            | Self::PhoneNumber { title, .. } => title,
        }
    }
}

/// One card (bubble) of a generic or list template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Button>,
}

impl Element {
    /// Create an element with only a title
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    #[must_use]
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_item_url(mut self, url: impl Into<String>) -> Self {
        self.item_url = Some(url.into());
        self
    }

    pub fn add_button(&mut self, button: Button) {
        self.buttons.push(button);
    }

    fn validate(&self) -> Result<(), TemplateError> {
        if self.title.chars().count() > MAX_TITLE_CHARS {
            return Err(TemplateError::TitleTooLong);
        }
        if self
            .subtitle
            .as_ref()
            .is_some_and(|s| s.chars().count() > MAX_SUBTITLE_CHARS)
        {
            return Err(TemplateError::SubtitleTooLong);
        }
        if self.buttons.len() > MAX_BUTTONS {
            return Err(TemplateError::ButtonsLimitExceeded);
        }
        Ok(())
    }
}

/// Checks bubble count first, then each element in order
fn validate_elements(elements: &[Element]) -> Result<(), TemplateError> {
    if elements.len() > MAX_ELEMENTS {
        return Err(TemplateError::BubblesLimitExceeded);
    }
    elements.iter().try_for_each(Element::validate)
}

/// Horizontally scrollable carousel of cards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericTemplate {
    pub elements: Vec<Element>,
}

impl GenericTemplate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_element(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Check element count, title and subtitle lengths and button counts
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint
    pub fn validate(&self) -> Result<(), TemplateError> {
        validate_elements(&self.elements)
    }
}

/// How the first list item is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopElementStyle {
    #[default]
    Large,
    Compact,
}

/// Vertical list of cards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTemplate {
    pub elements: Vec<Element>,
    #[serde(default)]
    pub top_element_style: TopElementStyle,
}

impl ListTemplate {
    #[must_use]
    pub fn new(top_element_style: TopElementStyle) -> Self {
        Self {
            elements: Vec::new(),
            top_element_style,
        }
    }

    pub fn add_element(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Same checks as [`GenericTemplate::validate`]
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint
    pub fn validate(&self) -> Result<(), TemplateError> {
        validate_elements(&self.elements)
    }
}

/// Text with up to three buttons underneath
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonTemplate {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Button>,
}

impl ButtonTemplate {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    pub fn add_button(&mut self, button: Button) {
        self.buttons.push(button);
    }

    /// # Errors
    ///
    /// Returns [`TemplateError::ButtonsLimitExceeded`] with more than
    /// [`MAX_BUTTONS`] buttons
    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.buttons.len() > MAX_BUTTONS {
            return Err(TemplateError::ButtonsLimitExceeded);
        }
        Ok(())
    }
}

/// Order confirmation
///
/// The order number is generated when the template is created and cannot be
/// changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptTemplate {
    pub recipient_name: String,
    order_number: String,
    pub currency: String,
    pub payment_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_url: Option<String>,
    #[serde(rename = "elements", default)]
    pub items: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<OrderAddress>,
    pub summary: OrderSummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub adjustments: Vec<OrderAdjustment>,
}

impl ReceiptTemplate {
    /// Create an empty USD receipt with a fresh order number
    #[must_use]
    pub fn new(recipient_name: impl Into<String>) -> Self {
        Self {
            recipient_name: recipient_name.into(),
            order_number: Uuid::new_v4().to_string(),
            currency: "USD".to_string(),
            payment_method: String::new(),
            timestamp: None,
            order_url: None,
            items: Vec::new(),
            address: None,
            summary: OrderSummary::default(),
            adjustments: Vec::new(),
        }
    }

    #[must_use]
    pub fn order_number(&self) -> &str {
        &self.order_number
    }

    pub fn add_item(&mut self, item: OrderItem) {
        self.items.push(item);
    }

    pub fn add_adjustment(&mut self, adjustment: OrderAdjustment) {
        self.adjustments.push(adjustment);
    }
}

/// Line item on a receipt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAddress {
    pub street_1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub state: String,
    pub country: String,
}

/// Cost breakdown; only `total_cost` is required by the platform
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub total_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tax: Option<f64>,
}

/// Discount or surcharge applied to an order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderAdjustment {
    pub name: String,
    pub amount: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element_with_buttons(title: &str, buttons: usize) -> Element {
        let mut element = Element::new(title);
        for i in 0..buttons {
            element.add_button(Button::postback(format!("b{i}"), format!("p{i}")));
        }
        element
    }

    #[test]
    fn too_many_bubbles_is_reported_alone() {
        let mut template = GenericTemplate::new();
        for _ in 0..=MAX_ELEMENTS {
            // Every element is also invalid; only the bubble count must be reported
            template.add_element(element_with_buttons(&"t".repeat(60), 5));
        }
        assert_eq!(template.validate(), Err(TemplateError::BubblesLimitExceeded));
    }

    #[test]
    fn title_checked_before_subtitle_and_buttons() {
        let mut template = GenericTemplate::new();
        template.add_element(
            element_with_buttons(&"t".repeat(MAX_TITLE_CHARS + 1), 4)
                .with_subtitle("s".repeat(MAX_SUBTITLE_CHARS + 1)),
        );
        assert_eq!(template.validate(), Err(TemplateError::TitleTooLong));
    }

    #[test]
    fn subtitle_checked_before_buttons() {
        let mut template = GenericTemplate::new();
        template.add_element(
            element_with_buttons("ok", 4).with_subtitle("s".repeat(MAX_SUBTITLE_CHARS + 1)),
        );
        assert_eq!(template.validate(), Err(TemplateError::SubtitleTooLong));
    }

    #[test]
    fn button_limit_per_element() {
        let mut template = GenericTemplate::new();
        template.add_element(element_with_buttons("first", 3));
        template.add_element(element_with_buttons("second", 4));
        assert_eq!(template.validate(), Err(TemplateError::ButtonsLimitExceeded));
    }

    #[test]
    fn limits_are_inclusive_and_counted_in_chars() {
        let mut template = GenericTemplate::new();
        for _ in 0..MAX_ELEMENTS {
            template.add_element(
                element_with_buttons(&"é".repeat(MAX_TITLE_CHARS), MAX_BUTTONS)
                    .with_subtitle("ü".repeat(MAX_SUBTITLE_CHARS)),
            );
        }
        assert_eq!(template.validate(), Ok(()));
    }

    #[test]
    fn list_template_shares_element_checks() {
        let mut list = ListTemplate::new(TopElementStyle::Compact);
        list.add_element(Element::new("t".repeat(MAX_TITLE_CHARS + 1)));
        assert_eq!(list.validate(), Err(TemplateError::TitleTooLong));
    }

    #[test]
    fn button_template_limits_buttons() {
        let mut template = ButtonTemplate::new("Pick one");
        for i in 0..=MAX_BUTTONS {
            template.add_button(Button::url(format!("b{i}"), "https://example.com"));
        }
        assert_eq!(template.validate(), Err(TemplateError::ButtonsLimitExceeded));
    }

    #[test]
    fn template_is_tagged_by_template_type() {
        let mut list = ListTemplate::new(TopElementStyle::Compact);
        list.add_element(Element::new("Shirt").with_subtitle("Blue"));
        let json = serde_json::to_value(Template::from(list)).unwrap();
        assert_eq!(json["template_type"], "list");
        assert_eq!(json["top_element_style"], "compact");
        assert_eq!(json["elements"][0]["subtitle"], "Blue");
        assert!(json["elements"][0].get("buttons").is_none());
    }

    #[test]
    fn buttons_are_tagged_by_type() {
        let json = serde_json::to_value(vec![
            Button::url("Open", "https://example.com"),
            Button::postback("Start", "START"),
            Button::phone_number("Call", "+15550100"),
        ])
        .unwrap();
        assert_eq!(
            json[0],
            serde_json::json!({"type": "web_url", "title": "Open", "url": "https://example.com"})
        );
        assert_eq!(json[1]["type"], "postback");
        assert_eq!(
            json[2],
            serde_json::json!({"type": "phone_number", "title": "Call", "payload": "+15550100"})
        );
    }

    #[test]
    fn receipt_order_number_is_generated_once() {
        let receipt = ReceiptTemplate::new("Jane");
        assert!(Uuid::parse_str(receipt.order_number()).is_ok());
        assert_ne!(receipt.order_number(), ReceiptTemplate::new("Jane").order_number());

        let cloned = receipt.clone();
        assert_eq!(cloned.order_number(), receipt.order_number());
    }

    #[test]
    fn receipt_serializes_platform_field_names() {
        let mut receipt = ReceiptTemplate::new("Jane");
        receipt.payment_method = "Visa 1234".to_string();
        receipt.add_item(OrderItem {
            title: "Shirt".to_string(),
            quantity: Some(2),
            price: 25.0,
            ..OrderItem::default()
        });
        receipt.summary.total_cost = 50.0;

        let json = serde_json::to_value(Template::from(receipt.clone())).unwrap();
        assert_eq!(json["template_type"], "receipt");
        assert_eq!(json["order_number"], receipt.order_number());
        assert_eq!(json["currency"], "USD");
        assert_eq!(json["elements"][0]["title"], "Shirt");
        assert_eq!(json["summary"]["total_cost"], 50.0);
        assert!(json.get("adjustments").is_none());
        assert!(json.get("address").is_none());
    }
}
