use crate::domain::money::Money;
use crate::domain::ports::{GatewayOrder, PaymentGateway};
use crate::error::{CoreError, Result};
use crate::infrastructure::signature::SignatureVerifier;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// An in-process stand-in for the payment gateway.
///
/// Creates orders and fabricates signed captures with the same shared secret
/// the reconciler verifies against. Used by the replay harness and tests; a
/// production deployment implements [`PaymentGateway`] over the real gateway's
/// HTTP API.
#[derive(Clone)]
pub struct SimulatedGateway {
    orders: Arc<RwLock<HashMap<String, Money>>>,
    signer: SignatureVerifier,
}

impl SimulatedGateway {
    pub fn new(signer: SignatureVerifier) -> Self {
        Self {
            orders: Arc::new(RwLock::new(HashMap::new())),
            signer,
        }
    }

    /// Simulates the customer completing checkout: returns the gateway
    /// payment id and the capture signature for a known order.
    pub async fn capture(&self, order_id: &str) -> Result<(String, String)> {
        let orders = self.orders.read().await;
        if !orders.contains_key(order_id) {
            return Err(CoreError::Payment(format!(
                "gateway has no order {order_id}"
            )));
        }
        let payment_id = format!("pay_{}", Uuid::new_v4().simple());
        let signature = self.signer.sign(order_id, &payment_id);
        Ok((payment_id, signature))
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn create_order(&self, amount: Money, currency: &str) -> Result<GatewayOrder> {
        let id = format!("order_{}", Uuid::new_v4().simple());
        let mut orders = self.orders.write().await;
        orders.insert(id.clone(), amount);
        Ok(GatewayOrder {
            id,
            amount,
            currency: currency.to_string(),
        })
    }
}
