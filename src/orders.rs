//! Order lifecycle: a buyer's order is matched to the seller registered at
//! the order's pincode, then that seller accepts or rejects it once.

use chrono::Utc;
use thiserror::Error;

use crate::models::{Decision, Order, OrderInput, OrderStatus};
use crate::store::{RecordStore, StoreError, ORDER_SEQUENCE};

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("No seller found for this pincode")]
    NoSellerAvailable,

    /// Also returned for orders that belong to another seller.
    #[error("Order not found")]
    OrderNotFound,

    #[error("Reject reason is required when rejecting an order")]
    RejectReasonRequired,

    #[error("Order has already been responded to")]
    AlreadyResolved,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Place an order for `buyer_id`. The request's unit price is taken as is;
/// stock is neither checked nor decremented.
pub async fn create_order(
    store: &dyn RecordStore,
    buyer_id: i64,
    request: OrderInput,
) -> Result<Order, OrderError> {
    let seller = store
        .find_seller_by_pincode(&request.pincode)
        .await?
        .ok_or(OrderError::NoSellerAvailable)?;

    let id = store.next_id(ORDER_SEQUENCE).await?;
    let now = Utc::now();
    let order = Order {
        id,
        buyer_id,
        seller_id: seller.id,
        product_id: request.product_id,
        product_name: request.product_name,
        quantity: request.quantity,
        price: request.price,
        total_amount: request.price * request.quantity as f64,
        pincode: request.pincode,
        status: OrderStatus::Pending,
        reject_reason: None,
        created_at: now,
        updated_at: now,
    };
    store.insert_order(&order).await?;

    log::info!(
        "order {} from buyer {} matched to seller {} at pincode {}",
        order.id,
        order.buyer_id,
        order.seller_id,
        order.pincode
    );
    Ok(order)
}

/// Record `seller_id`'s decision on a pending order.
pub async fn respond_to_order(
    store: &dyn RecordStore,
    seller_id: i64,
    order_id: i64,
    decision: Decision,
) -> Result<Order, OrderError> {
    let mut order = store
        .find_seller_order(order_id, seller_id)
        .await?
        .ok_or(OrderError::OrderNotFound)?;

    let reason = decision
        .reject_reason
        .filter(|reason| !reason.trim().is_empty());
    if !decision.accept && reason.is_none() {
        return Err(OrderError::RejectReasonRequired);
    }
    if order.status != OrderStatus::Pending {
        return Err(OrderError::AlreadyResolved);
    }

    if decision.accept {
        order.status = OrderStatus::Accepted;
        order.reject_reason = None;
    } else {
        order.status = OrderStatus::Rejected;
        order.reject_reason = reason;
    }
    order.updated_at = Utc::now();

    if !store.replace_order(&order).await? {
        return Err(OrderError::OrderNotFound);
    }

    log::info!(
        "order {} {:?} by seller {}",
        order.id,
        order.status,
        seller_id
    );
    Ok(order)
}
