use axum::extract::State;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::database::models::{Payment, PaymentView};
use crate::database::payments::{self, NewPayment};
use crate::database::{catalog, users};
use crate::error::ApiError;
use crate::filter::{PageRequest, PaymentFilter};
use crate::handlers::validation::{self, Validator};
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult};
use crate::state::AppState;

/// Query string of the payment listing. Dates arrive as text so blanks can be ignored.
#[derive(Debug, Default, Deserialize)]
pub struct PaymentQuery {
    pub user_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<i64>,
    pub last_seen_id: Option<i64>,
}

impl PaymentQuery {
    fn into_parts(self) -> Result<(PaymentFilter, PageRequest), ApiError> {
        let filter = PaymentFilter {
            user_id: self.user_id,
            start_date: validation::parse_date("start_date", self.start_date.as_deref())?,
            end_date: validation::parse_date("end_date", self.end_date.as_deref())?,
        };
        filter.validate()?;
        let page = PageRequest::new(self.limit, self.last_seen_id)?;
        Ok((filter, page))
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentPage {
    pub payments: Vec<PaymentView>,
    pub next_cursor: Option<i64>,
}

/// GET /payment/paginated?user_id&start_date&end_date&limit&last_seen_id
pub async fn paginated(State(state): State<AppState>, ApiQuery(query): ApiQuery<PaymentQuery>) -> ApiResult<PaymentPage> {
    let (filter, page) = query.into_parts()?;

    let mut conn = state.pool.acquire().await?;
    let page = payments::list_page(&mut conn, &filter, page).await?.map(PaymentView::from);

    Ok(ApiResponse::success(PaymentPage {
        payments: page.items,
        next_cursor: page.next_cursor,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AddPaymentRequest {
    pub user_id: i64,
    pub curso_id: i64,
    pub amount: i64,
    pub affect_month: String,
}

impl AddPaymentRequest {
    fn affect_month(&self) -> Result<NaiveDate, ApiError> {
        let mut v = Validator::new();
        v.check("amount", self.amount > 0, "amount must be greater than 0");
        v.finish()?;
        validation::parse_month("affect_month", &self.affect_month)
    }
}

/// POST /payment/add - 404 when the student or the curso does not exist. Payments are only
/// listed alongside the student's details, so a user without a detail row cannot pay.
pub async fn add(State(state): State<AppState>, ApiJson(payload): ApiJson<AddPaymentRequest>) -> ApiResult<Payment> {
    let affect_month = payload.affect_month()?;

    let mut tx = state.pool.begin().await?;
    let student = users::find_profile(&mut tx, payload.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {} not found", payload.user_id)))?;
    if student.dni.is_none() {
        return Err(ApiError::invalid_field("user_id", "user has no personal details"));
    }
    if catalog::find_curso(&mut tx, payload.curso_id).await?.is_none() {
        return Err(ApiError::not_found(format!("Curso {} not found", payload.curso_id)));
    }
    let payment = payments::create(
        &mut tx,
        &NewPayment {
            user_id: payload.user_id,
            curso_id: payload.curso_id,
            amount: payload.amount,
            affect_month,
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(payment_id = payment.id, user_id = payment.user_id, "payment recorded");
    Ok(ApiResponse::created(payment))
}

/// DELETE /payment/delete/:id
pub async fn remove(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<Value> {
    let mut conn = state.pool.acquire().await?;
    payments::delete(&mut conn, id).await?;
    Ok(ApiResponse::success(json!({
        "status": "success",
        "message": format!("Payment {} deleted", id),
    })))
}

/// GET /payment/user/:username - every payment of one student
pub async fn by_username(State(state): State<AppState>, ApiPath(username): ApiPath<String>) -> ApiResult<Value> {
    let mut conn = state.pool.acquire().await?;
    let user = users::find_profile_by_username(&mut conn, &username)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User {} not found", username)))?;
    let rows = payments::list_for_user(&mut conn, user.user_id).await?;
    let payments: Vec<PaymentView> = rows.into_iter().map(PaymentView::from).collect();

    Ok(ApiResponse::success(json!({
        "user_id": user.user_id,
        "username": user.username,
        "payments": payments,
    })))
}
