//! API Gateway response builders.
//!
//! Every JSON body carries the payload fields plus a numeric `status` and,
//! on failure, a `message`.

use lambda_http::http::StatusCode;
use lambda_http::{Body, Error, Response};
use serde::Serialize;

use crate::error::AppError;

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    #[serde(flatten)]
    data: &'a T,
    status: u16,
}

#[derive(Serialize)]
struct ErrorEnvelope {
    status: u16,
    message: String,
}

pub fn json_response<T: Serialize>(status: StatusCode, data: &T) -> Result<Response<Body>, Error> {
    let body = serde_json::to_string(&Envelope {
        data,
        status: status.as_u16(),
    })?;

    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(body.into())
        .map_err(Box::new)?)
}

pub fn no_content() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::Empty)
        .map_err(Box::new)?)
}

/// Log the failure and render it for the caller.
pub fn error_response(err: &AppError) -> Result<Response<Body>, Error> {
    let status = err.status_code();
    if status.is_server_error() {
        tracing::error!("{}: {}", err.client_message(), err);
    } else {
        tracing::error!("Request rejected: {}", err);
    }
    message_response(status, err.client_message())
}

pub fn message_response(status: StatusCode, message: impl Into<String>) -> Result<Response<Body>, Error> {
    let body = serde_json::to_string(&ErrorEnvelope {
        status: status.as_u16(),
        message: message.into(),
    })?;

    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(body.into())
        .map_err(Box::new)?)
}

pub fn cors_preflight() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET,POST,PUT,DELETE,OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type,Authorization")
        .body(Body::Empty)
        .map_err(Box::new)?)
}
