use axum::extract::{FromRequest, FromRequestParts, Path, Query};
use axum::Json;

use super::app_error::AppError;

/// `Json` whose rejections are reported through [`AppError`].
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub(crate) struct AppJson<T>(pub(crate) T);

/// `Path` whose rejections are reported through [`AppError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub(crate) struct AppPath<T>(pub(crate) T);

/// `Query` whose rejections are reported through [`AppError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub(crate) struct AppQuery<T>(pub(crate) T);
