//! API Routes
//!
//! HTTP endpoint definitions. Handlers map requests onto the ledger service
//! and ledger failures onto status codes; the service itself stays
//! HTTP-agnostic.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Account, Currency, LedgerError};
use crate::error::AppError;
use crate::service::LedgerService;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    pub currency: Currency,
    pub balance: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from: Uuid,
    pub to: Uuid,
    pub amount: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub currency: Currency,
    pub balance: Decimal,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            currency: account.currency,
            balance: account.balance,
        }
    }
}

// =========================================================================
// API Router
// =========================================================================

/// Create the ledger API router
pub fn create_router() -> Router<Arc<LedgerService>> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/:id", get(get_account))
        .route("/accounts/transfer", post(transfer))
}

// =========================================================================
// POST /accounts
// =========================================================================

/// Create a new account
async fn create_account(
    State(service): State<Arc<LedgerService>>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    let account = service.create_account(request.currency, request.balance)?;

    Ok((StatusCode::CREATED, Json(account.into())))
}

// =========================================================================
// GET /accounts/:id
// =========================================================================

/// Get account by ID
async fn get_account(
    State(service): State<Arc<LedgerService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = service
        .get_account(id)
        .ok_or(LedgerError::AccountNotFound(id))?;

    Ok(Json(account.into()))
}

// =========================================================================
// GET /accounts
// =========================================================================

/// List all accounts
async fn list_accounts(
    State(service): State<Arc<LedgerService>>,
) -> Json<Vec<AccountResponse>> {
    Json(
        service
            .list_accounts()
            .into_iter()
            .map(AccountResponse::from)
            .collect(),
    )
}

// =========================================================================
// POST /accounts/transfer
// =========================================================================

/// Move money between two accounts
async fn transfer(
    State(service): State<Arc<LedgerService>>,
    Json(request): Json<TransferRequest>,
) -> Result<StatusCode, AppError> {
    // The ledger core applies whatever amount it is handed; the sign check
    // belongs to the boundary.
    if request.amount <= Decimal::ZERO {
        return Err(AppError::InvalidRequest(format!(
            "transfer amount must be positive (got {})",
            request.amount
        )));
    }

    service.transfer(request.from, request.to, request.amount)?;

    Ok(StatusCode::NO_CONTENT)
}
