//! Pure field mapping: remote record shapes to local record shapes.
//!
//! Nothing here performs I/O. The resolver hands in already-resolved ids;
//! these functions only translate vocabularies and assemble payloads.

use rust_decimal::Decimal;

use woosync_core::{
    Address, CurrencyId, NewOrder, NewOrderLine, OrderRef, OrderState, PartnerId, RemoteOrder,
};

/// Map a remote order status onto the local sale-order state.
///
/// Total over all inputs: anything outside the fixed table (including a
/// missing status) maps to `draft`.
#[must_use]
pub fn map_order_status(remote_status: Option<&str>) -> OrderState {
    match remote_status {
        Some("processing" | "on-hold" | "completed") => OrderState::Sale,
        Some("cancelled" | "refunded" | "failed") => OrderState::Cancel,
        // "pending", unknown vocabulary, or no status at all
        _ => OrderState::Draft,
    }
}

/// Whether the shipping block names a different destination than billing.
///
/// Field-by-field comparison over first/last name, company, both address
/// lines, city, state, postcode, country and phone. A missing field reads
/// as the empty string, so blank-vs-blank is equal while `"123"` vs blank
/// differs. A missing or all-empty shipping block never differs (it means
/// "ships to billing").
#[must_use]
pub fn addresses_differ(billing: &Address, shipping: Option<&Address>) -> bool {
    let Some(shipping) = shipping.filter(|s| !s.is_empty()) else {
        return false;
    };

    let fields = |a: &Address| -> [String; 10] {
        [
            normalized(a.first_name.as_deref()),
            normalized(a.last_name.as_deref()),
            normalized(a.company.as_deref()),
            normalized(a.address_1.as_deref()),
            normalized(a.address_2.as_deref()),
            normalized(a.city.as_deref()),
            normalized(a.state.as_deref()),
            normalized(a.postcode.as_deref()),
            normalized(a.country.as_deref()),
            normalized(a.phone.as_deref()),
        ]
    };

    fields(billing) != fields(shipping)
}

fn normalized(field: Option<&str>) -> String {
    field.unwrap_or_default().trim().to_string()
}

/// Display name for a contact: `"<first> <last>"` trimmed, or `"Unknown"`
/// when both parts are blank.
#[must_use]
pub fn display_name(first_name: Option<&str>, last_name: Option<&str>) -> String {
    let name = format!(
        "{} {}",
        first_name.unwrap_or_default().trim(),
        last_name.unwrap_or_default().trim()
    );
    let name = name.trim();
    if name.is_empty() {
        "Unknown".to_string()
    } else {
        name.to_string()
    }
}

/// Assemble the local order payload from a remote order and the ids the
/// resolver produced for it.
///
/// The remote-reported total is authoritative; line amounts are carried for
/// reference, never summed back into the total.
#[must_use]
pub fn build_order_payload(
    order: &RemoteOrder,
    reference: OrderRef,
    billing_partner_id: PartnerId,
    shipping_partner_id: Option<PartnerId>,
    currency_id: Option<CurrencyId>,
    lines: Vec<NewOrderLine>,
) -> NewOrder {
    NewOrder {
        reference,
        partner_id: billing_partner_id,
        partner_shipping_id: shipping_partner_id,
        currency_id,
        state: map_order_status(order.status.as_deref()),
        amount_total: order.total,
        note: order
            .customer_note
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string),
        date_order: order.date_created,
        lines,
    }
}

/// Whether a remote order needs a synthetic shipping line.
#[must_use]
pub fn has_shipping_charge(order: &RemoteOrder) -> bool {
    order.shipping_total > Decimal::ZERO
}
