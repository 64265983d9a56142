//! Dashboard counts.

use rakhshan_core::{Order, OrderStatus, Product};
use tracing::instrument;

use crate::client::{AdminApiError, AdminClient};

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub products: usize,
    pub out_of_stock: usize,
    pub orders: usize,
    pub open_orders: usize,
}

impl DashboardStats {
    #[must_use]
    pub fn from_lists(products: &[Product], orders: &[Order]) -> Self {
        Self {
            products: products.len(),
            out_of_stock: products.iter().filter(|p| !p.in_stock).count(),
            orders: orders.len(),
            open_orders: orders.iter().filter(|o| !o.status.is_closed()).count(),
        }
    }
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub by_status: Vec<(OrderStatus, usize)>,
}

/// Fetch products and orders and count them.
///
/// # Errors
///
/// Returns an error if either list cannot be fetched.
#[instrument(skip(client))]
pub async fn load(client: &AdminClient) -> Result<Dashboard, AdminApiError> {
    let products = client.list_products().await?;
    let orders = client.list_orders().await?;
    let stats = DashboardStats::from_lists(&products, &orders);
    tracing::debug!(?stats, "Dashboard loaded");
    Ok(Dashboard {
        stats,
        by_status: status_breakdown(&orders),
    })
}

/// Count of orders per status, in [`OrderStatus::ALL`] order.
#[must_use]
pub fn status_breakdown(orders: &[Order]) -> Vec<(OrderStatus, usize)> {
    OrderStatus::ALL
        .iter()
        .map(|status| (*status, orders.iter().filter(|o| o.status == *status).count()))
        .collect()
}
