use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use cwo_common::Rupees;
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

/// The `customization.type` value that marks an item as carrying an uploaded photo.
pub const PHOTO_CUSTOMIZATION: &str = "photo";

//--------------------------------------        OrderId        -------------------------------------------------------
/// The human-readable order identifier, e.g. `CWO20250609001`.
///
/// The format (`CWO` + 8-digit date + 3-digit daily sequence) is a contract shared with
/// customer support and the order-confirmation URLs; see [`crate::order_id`] for how ids
/// are allocated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   OrderStatusType     -------------------------------------------------------
/// The delivery lifecycle of an order. Transitions only move forward; `Delivered` and
/// `Cancelled` are terminal, and delivered orders may never be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatusType {
    /// Newly created; payment not yet confirmed.
    Pending,
    /// Payment received, order accepted.
    Confirmed,
    /// The kitchen is working on it.
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatusType {
    /// Position in the forward-only progression. `Cancelled` sits outside the
    /// progression and is handled separately.
    pub fn rank(&self) -> u8 {
        match self {
            OrderStatusType::Pending => 0,
            OrderStatusType::Confirmed => 1,
            OrderStatusType::Preparing => 2,
            OrderStatusType::OutForDelivery => 3,
            OrderStatusType::Delivered => 4,
            OrderStatusType::Cancelled => 5,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatusType::Delivered | OrderStatusType::Cancelled)
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "pending"),
            OrderStatusType::Confirmed => write!(f, "confirmed"),
            OrderStatusType::Preparing => write!(f, "preparing"),
            OrderStatusType::OutForDelivery => write!(f, "out_for_delivery"),
            OrderStatusType::Delivered => write!(f, "delivered"),
            OrderStatusType::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid status value: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "preparing" => Ok(Self::Preparing),
            "out_for_delivery" => Ok(Self::OutForDelivery),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status in database: {value}. Defaulting to pending.");
            OrderStatusType::Pending
        })
    }
}

//--------------------------------------  PaymentStatusType    -------------------------------------------------------
/// The payment axis of an order. Moves independently of [`OrderStatusType`], but `Paid` is a
/// prerequisite for the order status to progress past `Confirmed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatusType {
    Pending,
    Paid,
    Failed,
}

impl Display for PaymentStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatusType::Pending => write!(f, "pending"),
            PaymentStatusType::Paid => write!(f, "paid"),
            PaymentStatusType::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for PaymentStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

impl From<String> for PaymentStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid payment status in database: {value}. Defaulting to pending.");
            PaymentStatusType::Pending
        })
    }
}

//--------------------------------------  ItemCustomization    -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCustomization {
    /// Currently only "photo" is meaningful; anything else passes through untouched.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: String,
    /// Set by the upstream checkout upload. May legitimately be missing if that upload failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ItemCustomization {
    pub fn is_photo(&self) -> bool {
        self.kind == PHOTO_CUSTOMIZATION
    }
}

//--------------------------------------      OrderItem        -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub price: Rupees,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customization: Option<ItemCustomization>,
}

//--------------------------------------      OrderAddon       -------------------------------------------------------
/// A supplementary purchasable attached to the order, independent of the item list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAddon {
    pub addon_id: String,
    pub name: String,
    pub price: Rupees,
    pub quantity: u32,
    #[serde(default)]
    pub image: String,
}

//--------------------------------------     CustomerInfo      -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub full_name: String,
    /// Normalized 10-digit Indian mobile number. Also the key that correlates orders with
    /// users; see the users table.
    pub mobile_number: String,
    pub delivery_date: NaiveDate,
    pub time_slot: String,
    pub area: String,
    pub full_address: String,
}

//--------------------------------------        Order          -------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub items: Vec<OrderItem>,
    pub addons: Vec<OrderAddon>,
    pub customer_info: CustomerInfo,
    pub total_amount: Rupees,
    pub subtotal: Rupees,
    pub delivery_charge: Rupees,
    pub status: OrderStatusType,
    pub payment_status: PaymentStatusType,
    pub payment_method: String,
    pub notes: String,
    pub order_date: DateTime<Utc>,
    pub estimated_delivery_date: NaiveDate,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       NewOrder        -------------------------------------------------------
/// A validated order that has not been persisted yet. The order id is assigned at save time
/// by the allocator, not carried here, so that a duplicate-key retry can re-allocate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub items: Vec<OrderItem>,
    pub addons: Vec<OrderAddon>,
    pub customer_info: CustomerInfo,
    pub total_amount: Rupees,
    pub subtotal: Rupees,
    pub delivery_charge: Rupees,
    pub payment_method: String,
    pub notes: String,
    /// The moment the order entered the system. Defaults to now; tests override it to seed
    /// specific days.
    pub order_date: DateTime<Utc>,
}

impl NewOrder {
    pub fn new(items: Vec<OrderItem>, customer_info: CustomerInfo, total_amount: Rupees) -> Self {
        Self {
            items,
            addons: Vec::new(),
            customer_info,
            total_amount,
            subtotal: total_amount,
            delivery_charge: Rupees::from(0),
            payment_method: "online".to_string(),
            notes: String::new(),
            order_date: Utc::now(),
        }
    }

    pub fn with_addons(mut self, addons: Vec<OrderAddon>) -> Self {
        self.addons = addons;
        self
    }
}

//--------------------------------------       Payment         -------------------------------------------------------
/// The link between a storefront order and a gateway order, created when the hosted checkout
/// is initiated and resolved when the payment proof is verified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub order_id: OrderId,
    pub gateway_order_id: String,
    pub payment_id: Option<String>,
    pub amount: Rupees,
    pub currency: String,
    pub status: GatewayPaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub order_id: OrderId,
    pub gateway_order_id: String,
    pub amount: Rupees,
    pub currency: String,
}

impl NewPayment {
    pub fn new(order_id: OrderId, gateway_order_id: String, amount: Rupees) -> Self {
        Self { order_id, gateway_order_id, amount, currency: cwo_common::INR_CURRENCY_CODE.to_string() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayPaymentStatus {
    Created,
    Verified,
    Failed,
}

impl Display for GatewayPaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayPaymentStatus::Created => write!(f, "created"),
            GatewayPaymentStatus::Verified => write!(f, "verified"),
            GatewayPaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

impl From<String> for GatewayPaymentStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "created" => Self::Created,
            "verified" => Self::Verified,
            "failed" => Self::Failed,
            _ => {
                error!("Invalid gateway payment status in database: {value}. Defaulting to created.");
                Self::Created
            },
        }
    }
}

//--------------------------------------     Notification      -------------------------------------------------------
/// A "new paid order" alert for the admin panel's poll loop. Drained at-most-once.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub order_id: OrderId,
    pub customer_name: String,
    pub total_amount: Rupees,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub order_id: OrderId,
    pub customer_name: String,
    pub total_amount: Rupees,
}

impl From<&Order> for NewNotification {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.order_id.clone(),
            customer_name: order.customer_info.full_name.clone(),
            total_amount: order.total_amount,
        }
    }
}

//--------------------------------------         User          -------------------------------------------------------
/// A storefront account. The phone number doubles as the correlation key to orders; there is
/// no foreign key between the two tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub phone_number: String,
    pub name: String,
    pub email: String,
    pub is_verified: bool,
    pub addresses: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub phone_number: String,
    pub name: String,
    pub email: String,
    pub is_verified: bool,
    pub addresses: Vec<String>,
}
