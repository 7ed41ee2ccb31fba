use crate::{error::AppError, AppState};
use analytics::AnalysisRecord;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

/// # GET /equity/:symbol
/// Computes the Sharpe ratio, beta, Piotroski F-Score and Altman Z-Score for one symbol.
pub async fn get_equity_analysis(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<AnalysisRecord>, AppError> {
    let record = state.service.analyze(&symbol).await?;
    Ok(Json(record))
}
