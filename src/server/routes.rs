use serde::Serialize;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reply::{Json, WithStatus};
use warp::{Filter, Rejection};

use crate::bulk::{parse_batch, run_batch, BatchReport};
use crate::features::FeatureRecord;
use crate::pipeline::{PredictionError, ScoringPipeline};

/// Largest accepted request body.
pub const MAX_BODY_BYTES: u64 = 4 * 1024 * 1024;

type ApiReply = WithStatus<Json>;

/// `POST /predict` and `POST /bulk_predict` over one shared pipeline.
pub fn routes(
    pipeline: Arc<ScoringPipeline>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = Rejection> + Clone {
    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["POST"])
        .allow_headers(vec!["content-type"]);

    predict(Arc::clone(&pipeline))
        .or(bulk_predict(pipeline))
        .unify()
        .with(cors)
        .with(warp::trace::request())
}

fn predict(
    pipeline: Arc<ScoringPipeline>,
) -> impl Filter<Extract = (ApiReply,), Error = Rejection> + Clone {
    warp::path!("predict")
        .and(warp::post())
        .and(body())
        .and(with_pipeline(pipeline))
        .map(handle_predict)
}

fn bulk_predict(
    pipeline: Arc<ScoringPipeline>,
) -> impl Filter<Extract = (ApiReply,), Error = Rejection> + Clone {
    warp::path!("bulk_predict")
        .and(warp::post())
        .and(body())
        .and(with_pipeline(pipeline))
        .map(handle_bulk_predict)
}

fn body() -> impl Filter<Extract = (Bytes,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::bytes())
}

fn with_pipeline(
    pipeline: Arc<ScoringPipeline>,
) -> impl Filter<Extract = (Arc<ScoringPipeline>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&pipeline))
}

fn handle_predict(body: Bytes, pipeline: Arc<ScoringPipeline>) -> ApiReply {
    let result = serde_json::from_slice::<FeatureRecord>(&body)
        .map_err(|e| malformed(e.to_string()))
        .and_then(|record| pipeline.predict(&record));

    match result {
        Ok(price) => warp::reply::with_status(
            warp::reply::json(&json!({ "prediction": price })),
            StatusCode::OK,
        ),
        Err(err) => failure(&err),
    }
}

/// Bulk response: the full batch report plus a flat `predictions` list
/// aligned with the input, `null` where a record failed.
#[derive(Serialize)]
struct BulkResponse {
    predictions: Vec<Option<f64>>,
    #[serde(flatten)]
    report: BatchReport,
}

fn handle_bulk_predict(body: Bytes, pipeline: Arc<ScoringPipeline>) -> ApiReply {
    let items = std::str::from_utf8(&body)
        .map_err(|e| malformed(e.to_string()))
        .and_then(|text| parse_batch(text).map_err(|e| malformed(format!("{:#}", e))));

    match items {
        Ok(items) => {
            let report = run_batch(&pipeline, items);
            let response = BulkResponse {
                predictions: report.predictions(),
                report,
            };
            warp::reply::with_status(warp::reply::json(&response), StatusCode::OK)
        }
        Err(err) => failure(&err),
    }
}

fn malformed(reason: String) -> PredictionError {
    tracing::warn!(%reason, "malformed request body");
    PredictionError::Malformed(reason)
}

fn failure(err: &PredictionError) -> ApiReply {
    let status = if err.is_rejection() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    warp::reply::with_status(warp::reply::json(&json!({ "error": err.report() })), status)
}
