mod limit_handle;
mod sensor_handle;

pub use limit_handle::*;
pub use sensor_handle::*;

use axum::routing::get;
use axum::{Json, Router};
use irrigation_api::{LimitResponse, Pagination, SensorDataPage, SensorSampleResponse};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Irrigation relay", description = "Sensor history and limit configuration"),
    paths(get_sensor_data, get_limit),
    components(schemas(SensorDataPage, SensorSampleResponse, Pagination, LimitResponse)),
    tags(
        (name = "sensor", description = "Stored sensor samples"),
        (name = "limit", description = "Irrigation limits")
    )
)]
pub struct ApiDoc;

pub fn openapi_router() -> Router {
    Router::new().route("/api/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
