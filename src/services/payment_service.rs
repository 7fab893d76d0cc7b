use crate::entities::{OrderStatus, order_entity as orders, payment_entity as payments};
use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

const METHOD_MAX_LEN: usize = 50;

#[derive(Clone)]
pub struct PaymentService {
    pool: DatabaseConnection,
    default_method: String,
}

impl PaymentService {
    pub fn new(pool: DatabaseConnection, default_method: String) -> Self {
        Self {
            pool,
            default_method,
        }
    }

    /// 支付订单：待支付订单原子地转为 PAID 并记录支付流水
    pub async fn pay(&self, user_id: i32, request: CreatePaymentRequest) -> AppResult<PaymentResponse> {
        let txn = self.pool.begin().await?;
        match self.pay_in(&txn, user_id, request).await {
            Ok(payment) => {
                txn.commit().await?;
                log::info!(
                    "Order {} paid by user {} via {} ({})",
                    payment.order_id,
                    user_id,
                    payment.method,
                    payment.transaction_id
                );
                Ok(PaymentResponse::from(payment))
            }
            Err(e) => {
                txn.rollback().await?;
                Err(e)
            }
        }
    }

    async fn pay_in(
        &self,
        txn: &DatabaseTransaction,
        user_id: i32,
        request: CreatePaymentRequest,
    ) -> AppResult<payments::Model> {
        let already_processed =
            || AppError::ValidationError("Order already paid or processed".to_string());

        let order = orders::Entity::find_by_id(request.order_id)
            .filter(orders::Column::UserId.eq(user_id))
            .one(txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        if order.status != OrderStatus::Pending {
            return Err(already_processed());
        }
        // 管理员可能把已支付订单改回 PENDING，每个订单最多一条支付记录
        let paid_before = payments::Entity::find()
            .filter(payments::Column::OrderId.eq(order.id))
            .one(txn)
            .await?;
        if paid_before.is_some() {
            return Err(already_processed());
        }

        if let Some(amount) = request.amount
            && amount != order.total
        {
            return Err(AppError::ValidationError(
                "Payment amount must equal the order total".to_string(),
            ));
        }

        let method = match request.method.as_deref().map(str::trim) {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => self.default_method.clone(),
        };
        if method.chars().count() > METHOD_MAX_LEN {
            return Err(AppError::ValidationError(format!(
                "Payment method must be at most {METHOD_MAX_LEN} characters"
            )));
        }

        let now = Utc::now();
        // 仅当订单仍为 PENDING 时更新，防止并发重复支付
        let res = orders::Entity::update_many()
            .set(orders::ActiveModel {
                status: Set(OrderStatus::Paid),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(orders::Column::Id.eq(order.id))
            .filter(orders::Column::Status.eq(OrderStatus::Pending))
            .exec(txn)
            .await?;
        if res.rows_affected == 0 {
            return Err(already_processed());
        }

        let payment = payments::ActiveModel {
            order_id: Set(order.id),
            amount: Set(order.total),
            method: Set(method),
            transaction_id: Set(Uuid::new_v4().to_string()),
            success: Set(true),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        Ok(payment)
    }
}
