//! API Routes
//!
//! HTTP endpoint definitions. Handlers only translate between HTTP and the
//! orchestrators / query service.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::domain::OperationContext;
use crate::error::AppError;
use crate::handlers::{
    AccountView, ClientView, CreateAccountHandler, CreateClientCommand, CreateClientHandler, DepositCommand,
    TransactionHandler, TransactionView, TransferCommand, WithdrawCommand,
};
use crate::queries::{AccountBalanceView, ClientAccountsSummary, LedgerQueries, Paged};
use crate::store::LedgerStore;

// =========================================================================
// State
// =========================================================================

/// Shared state for every route
#[derive(Clone)]
pub struct AppState<S> {
    pub store: S,
    pub valid_account_types: Vec<String>,
}

impl<S> AppState<S> {
    pub fn new(store: S, valid_account_types: Vec<String>) -> Self {
        Self {
            store,
            valid_account_types,
        }
    }
}

// =========================================================================
// Request types
// =========================================================================

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub account_type: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub page_size: Option<i64>,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router<S>() -> Router<AppState<S>>
where
    S: LedgerStore + Clone,
{
    Router::new()
        // Clients
        .route("/clients", post(create_client::<S>))
        .route("/clients/me/summary", get(client_summary::<S>))
        // Accounts
        .route("/accounts", post(create_account::<S>).get(list_accounts::<S>))
        .route("/accounts/me/balance", get(my_account_balance::<S>))
        .route("/accounts/:account_number", get(account_details::<S>))
        .route("/accounts/:account_number/balance", get(account_balance::<S>))
        .route("/accounts/:account_number/movements", get(account_movements::<S>))
        // Transactions
        .route("/transactions/deposit", post(deposit::<S>))
        .route("/transactions/withdraw", post(withdraw::<S>))
        .route("/transactions/transfer", post(transfer::<S>))
}

// =========================================================================
// Clients
// =========================================================================

/// Onboard a client together with its first account
async fn create_client<S: LedgerStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(context): Extension<OperationContext>,
    Json(command): Json<CreateClientCommand>,
) -> Result<(StatusCode, Json<ClientView>), AppError> {
    let handler = CreateClientHandler::new(state.store, state.valid_account_types);
    let view = handler.execute(command, &context).await?;

    Ok((StatusCode::CREATED, Json(view)))
}

async fn client_summary<S: LedgerStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<ClientAccountsSummary>, AppError> {
    let summary = LedgerQueries::new(state.store).client_summary(&context).await?;
    Ok(Json(summary))
}

// =========================================================================
// Accounts
// =========================================================================

/// Open another account for the caller
async fn create_account<S: LedgerStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountView>), AppError> {
    let handler = CreateAccountHandler::new(state.store, state.valid_account_types);
    let view = handler.execute_for_caller(request.account_type, &context).await?;

    Ok((StatusCode::CREATED, Json(view)))
}

async fn list_accounts<S: LedgerStore + Clone>(
    State(state): State<AppState<S>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paged<AccountView>>, AppError> {
    let page = LedgerQueries::new(state.store)
        .list_accounts(query.page, query.page_size)
        .await?;
    Ok(Json(page))
}

async fn my_account_balance<S: LedgerStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<AccountBalanceView>, AppError> {
    let balance = LedgerQueries::new(state.store).my_account_balance(&context).await?;
    Ok(Json(balance))
}

async fn account_details<S: LedgerStore + Clone>(
    State(state): State<AppState<S>>,
    Path(account_number): Path<String>,
) -> Result<Json<AccountView>, AppError> {
    let account = LedgerQueries::new(state.store).account_details(&account_number).await?;
    Ok(Json(account))
}

async fn account_balance<S: LedgerStore + Clone>(
    State(state): State<AppState<S>>,
    Path(account_number): Path<String>,
) -> Result<Json<AccountBalanceView>, AppError> {
    let balance = LedgerQueries::new(state.store).account_balance(&account_number).await?;
    Ok(Json(balance))
}

async fn account_movements<S: LedgerStore + Clone>(
    State(state): State<AppState<S>>,
    Path(account_number): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Paged<TransactionView>>, AppError> {
    let page = LedgerQueries::new(state.store)
        .account_movements(&account_number, query.page, query.page_size)
        .await?;
    Ok(Json(page))
}

// =========================================================================
// Transactions
// =========================================================================

async fn deposit<S: LedgerStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(context): Extension<OperationContext>,
    Json(command): Json<DepositCommand>,
) -> Result<Json<TransactionView>, AppError> {
    let view = TransactionHandler::new(state.store).deposit(command, &context).await?;
    Ok(Json(view))
}

async fn withdraw<S: LedgerStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(context): Extension<OperationContext>,
    Json(command): Json<WithdrawCommand>,
) -> Result<Json<TransactionView>, AppError> {
    let view = TransactionHandler::new(state.store).withdraw(command, &context).await?;
    Ok(Json(view))
}

/// Returns the source account's "Transfer Out" entry
async fn transfer<S: LedgerStore + Clone>(
    State(state): State<AppState<S>>,
    Extension(context): Extension<OperationContext>,
    Json(command): Json<TransferCommand>,
) -> Result<Json<TransactionView>, AppError> {
    let view = TransactionHandler::new(state.store).transfer(command, &context).await?;
    Ok(Json(view))
}
