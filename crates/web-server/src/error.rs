use analyzer::error::AnalyzerError;
use api_client::error::ApiError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalyzerError),
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let AppError::Analysis(err) = self;

        let status = match &err {
            AnalyzerError::InvalidSymbol(_) => StatusCode::BAD_REQUEST,
            AnalyzerError::MarketData(ApiError::SymbolNotFound(_)) => StatusCode::NOT_FOUND,
            AnalyzerError::MarketData(api_err) => {
                tracing::error!(error = ?api_err, "Market data error.");
                StatusCode::BAD_GATEWAY
            }
            AnalyzerError::Metric(metric_err) => {
                tracing::error!(error = ?metric_err, "Metric calculation error.");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "error": err.to_string() }));
        (status, body).into_response()
    }
}
