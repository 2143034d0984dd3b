use std::panic::AssertUnwindSafe;

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::FutureExt;

use crate::error::ApiError;

/// Boundary converter for panics escaping request handling.
///
/// Installed as the outermost layer so every exit path of the inner stack,
/// including abnormal termination, still produces a structured 500 response.
pub async fn recover(request: Request, next: Next) -> Response {
    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            let message = panic_message(&*panic);
            tracing::error!("request handler panicked: {}", message);
            ApiError::internal_server_error(message).into_response()
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "unknown error occurred".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_string_and_str_payloads() {
        let owned: Box<dyn std::any::Any + Send> = Box::new("boom".to_string());
        assert_eq!(panic_message(&*owned), "boom");

        let borrowed: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(&*borrowed), "boom");
    }

    #[test]
    fn falls_back_to_generic_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new(42_u32);
        assert_eq!(panic_message(&*payload), "unknown error occurred");
    }
}
