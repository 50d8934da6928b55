use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] db::Error),
    #[error(transparent)]
    Solana(#[from] solana_nft::Error),
    #[error(transparent)]
    Pinata(#[from] pinata_api::Error),
    #[error("not found")]
    NotFound,
    #[error("{}", msg)]
    Custom { status: StatusCode, msg: String },
    #[error(transparent)]
    Actix(#[from] actix_web::Error),
}

impl Error {
    pub fn custom<T: std::fmt::Display>(status: StatusCode, msg: T) -> Self {
        Error::Custom {
            status,
            msg: msg.to_string(),
        }
    }

    pub fn not_configured(what: &str) -> Self {
        Error::custom(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("server configuration error: {} is not set", what),
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn build<E: ResponseError>(e: &E) -> HttpResponse {
        HttpResponse::build(e.status_code()).json(ErrorBody {
            error: e.to_string(),
        })
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Db(db::Error::ResourceNotFound { .. }) => StatusCode::NOT_FOUND,
            Error::Db(db::Error::StatusConflict { .. }) => StatusCode::CONFLICT,
            Error::Solana(
                solana_nft::Error::InvalidAddress(_)
                | solana_nft::Error::InvalidAmount(_)
                | solana_nft::Error::RoyaltyOutOfRange(_)
                | solana_nft::Error::InvalidCreatorShares(_),
            ) => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Custom { status, .. } => *status,
            Error::Actix(e) => e.as_response_error().status_code(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        ErrorBody::build(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let err = Error::from(solana_nft::Error::RoyaltyOutOfRange(10_001));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = Error::from(db::Error::StatusConflict {
            expected: db::OrderStatus::Paid,
            actual: db::OrderStatus::Pending,
        });
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err = Error::from(db::Error::not_found("order", "abc"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        assert_eq!(
            Error::not_configured("solana.backend_wallet").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
