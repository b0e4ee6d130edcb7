//! The checkout submission payload and its validation.
//!
//! Validation is fail-fast: the first violated rule produces a 400 whose message names the
//! offending field, in the same order the storefront has always checked them (top-level
//! fields, customer sub-fields, mobile number, item list).

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use cwo_common::Rupees;
use log::{trace, warn};
use serde::{Deserialize, Serialize};

use cwo_order_engine::{
    db_types::{CustomerInfo, ItemCustomization, NewOrder, OrderAddon, OrderItem},
    helpers::normalize_mobile_number,
};

use crate::errors::OrderConversionError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    pub items: Option<Vec<CheckoutItem>>,
    pub customer_info: Option<CheckoutCustomerInfo>,
    /// Paise, like every other amount on the wire.
    pub total_amount: Option<i64>,
    pub subtotal: Option<i64>,
    pub delivery_charge: Option<i64>,
    #[serde(default)]
    pub selected_add_ons: Vec<CheckoutAddon>,
    #[serde(default)]
    pub add_on_quantities: HashMap<String, u32>,
    pub notes: Option<String>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    #[serde(alias = "id")]
    pub product_id: Option<String>,
    pub name: String,
    pub price: i64,
    pub quantity: Option<u32>,
    pub selected_weight: Option<String>,
    pub customization: Option<ItemCustomization>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutCustomerInfo {
    pub full_name: Option<String>,
    pub mobile_number: Option<String>,
    pub delivery_date: Option<String>,
    pub time_slot: Option<String>,
    pub area: Option<String>,
    pub full_address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutAddon {
    #[serde(alias = "_id")]
    pub add_on_id: String,
    pub name: String,
    pub price: i64,
    pub image: Option<String>,
}

fn require<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str, OrderConversionError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(OrderConversionError(message.to_string())),
    }
}

impl TryFrom<CheckoutPayload> for NewOrder {
    type Error = OrderConversionError;

    fn try_from(payload: CheckoutPayload) -> Result<Self, Self::Error> {
        trace!("Converting CheckoutPayload to NewOrder");
        let items = payload.items.ok_or_else(|| OrderConversionError("items is required".to_string()))?;
        let customer =
            payload.customer_info.ok_or_else(|| OrderConversionError("customerInfo is required".to_string()))?;
        let total_amount =
            payload.total_amount.ok_or_else(|| OrderConversionError("totalAmount is required".to_string()))?;

        let full_name = require(&customer.full_name, "Customer fullName is required")?;
        let mobile_raw = require(&customer.mobile_number, "Customer mobileNumber is required")?;
        let delivery_date_raw = require(&customer.delivery_date, "Customer deliveryDate is required")?;
        let time_slot = require(&customer.time_slot, "Customer timeSlot is required")?;
        let area = require(&customer.area, "Customer area is required")?;
        let full_address = require(&customer.full_address, "Customer fullAddress is required")?;

        let mobile_number = normalize_mobile_number(mobile_raw).map_err(|e| OrderConversionError(e.to_string()))?;
        let delivery_date = delivery_date_raw
            .parse::<NaiveDate>()
            .map_err(|_| OrderConversionError(format!("Customer deliveryDate is invalid: {delivery_date_raw}")))?;

        if items.is_empty() {
            return Err(OrderConversionError("At least one item is required".to_string()));
        }
        let items = items.into_iter().map(process_item).collect::<Vec<OrderItem>>();

        let addons = process_addons(payload.selected_add_ons, &payload.add_on_quantities);

        let customer_info = CustomerInfo {
            full_name: full_name.to_string(),
            mobile_number,
            delivery_date,
            time_slot: time_slot.to_string(),
            area: area.to_string(),
            full_address: full_address.to_string(),
        };
        Ok(NewOrder {
            items,
            addons,
            customer_info,
            total_amount: Rupees::from(total_amount),
            subtotal: Rupees::from(payload.subtotal.unwrap_or(total_amount)),
            delivery_charge: Rupees::from(payload.delivery_charge.unwrap_or(0)),
            payment_method: payload.payment_method.unwrap_or_else(|| "online".to_string()),
            notes: payload.notes.unwrap_or_default(),
            order_date: Utc::now(),
        })
    }
}

/// Photo-customized items arrive with the image already uploaded by the checkout page. A
/// missing URL means that upload failed; the order still goes through, it just gets logged.
fn process_item(item: CheckoutItem) -> OrderItem {
    if let Some(customization) = &item.customization {
        if customization.is_photo() && customization.image_url.is_none() {
            warn!("📸️ Photo item '{}' is missing its image URL - upload may have failed", item.name);
        }
    }
    OrderItem {
        product_id: item.product_id.unwrap_or_default(),
        name: item.name,
        price: Rupees::from(item.price),
        quantity: item.quantity.unwrap_or(1),
        selected_weight: item.selected_weight,
        customization: item.customization,
    }
}

/// Normalizes the selected add-ons, pulling each quantity out of the separate quantity map
/// and defaulting to 1 when absent.
fn process_addons(addons: Vec<CheckoutAddon>, quantities: &HashMap<String, u32>) -> Vec<OrderAddon> {
    addons
        .into_iter()
        .map(|addon| {
            let quantity = quantities.get(&addon.add_on_id).copied().unwrap_or(1);
            OrderAddon {
                name: addon.name,
                price: Rupees::from(addon.price),
                quantity,
                image: addon.image.unwrap_or_default(),
                addon_id: addon.add_on_id,
            }
        })
        .collect()
}
