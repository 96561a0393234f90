//! Seller dashboard statistics.

use std::collections::HashSet;

use serde::Serialize;
use utoipa::ToSchema;

use super::order::{OrderStatus, PaymentStatus, SellerLine};

/// Aggregated figures for a seller's dashboard
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_materials: u64,
    pub active_materials: u64,
    /// Distinct orders containing at least one of the seller's listings
    pub total_orders: u64,
    pub pending_orders: u64,
    pub delivered_orders: u64,
    pub total_revenue: f64,
}

impl DashboardStats {
    /// Aggregate the seller's order lines.
    ///
    /// `lines` holds only lines referencing the seller's own listings. Revenue
    /// counts lines of delivered, paid orders; when there are none it falls
    /// back to every matched line.
    pub fn compute(total_materials: u64, active_materials: u64, lines: &[SellerLine]) -> Self {
        let mut orders = HashSet::new();
        let mut pending = HashSet::new();
        let mut delivered = HashSet::new();

        for line in lines {
            orders.insert(line.order_id);
            match line.status {
                OrderStatus::Processing => {
                    pending.insert(line.order_id);
                }
                OrderStatus::Delivered => {
                    delivered.insert(line.order_id);
                }
                OrderStatus::PaymentFailed => {}
            }
        }

        let settled: Vec<&SellerLine> = lines
            .iter()
            .filter(|line| {
                line.status == OrderStatus::Delivered
                    && line.payment_status == PaymentStatus::Completed
            })
            .collect();

        let total_revenue = if settled.is_empty() {
            lines.iter().map(SellerLine::line_total).sum()
        } else {
            settled.iter().map(|line| line.line_total()).sum()
        };

        Self {
            total_materials,
            active_materials,
            total_orders: orders.len() as u64,
            pending_orders: pending.len() as u64,
            delivered_orders: delivered.len() as u64,
            total_revenue,
        }
    }
}
