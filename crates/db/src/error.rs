use crate::order_store::OrderStatus;
use std::panic::Location;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("failed to create database connection pool:\n{0}")]
    CreatePool(deadpool_postgres::ConfigError),
    #[error("failed to get a database connection from pool:\n{0}")]
    GetDbConnection(deadpool_postgres::PoolError),
    #[error("timeout when getting a database connection")]
    Timeout,
    #[error("failed to initialize database tables:\n{0}")]
    InitDb(tokio_postgres::Error),
    #[error("failed to execute statement: {error}, context {context:?}, at {location}")]
    Execute {
        #[source]
        error: tokio_postgres::Error,
        context: &'static str,
        location: &'static Location<'static>,
    },
    #[error("failed to parse data: {error}, context {context:?}, at {location}")]
    Data {
        #[source]
        error: tokio_postgres::Error,
        context: &'static str,
        location: &'static Location<'static>,
    },
    #[error("{kind} not found: {id}, at {location}")]
    ResourceNotFound {
        kind: &'static str,
        id: String,
        location: &'static Location<'static>,
    },
    #[error("sled error: {error}, context {context:?}, at {location}")]
    LocalStorage {
        #[source]
        error: kv::Error,
        context: &'static str,
        location: &'static Location<'static>,
    },
    #[error("order is {actual}, expected {expected}")]
    StatusConflict {
        expected: OrderStatus,
        actual: OrderStatus,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Local storage (sled) error
    #[track_caller]
    pub fn local(context: &'static str) -> impl FnOnce(kv::Error) -> Self {
        let location = std::panic::Location::caller();

        move |error: kv::Error| Error::LocalStorage {
            context,
            location,
            error,
        }
    }

    /// Error when executing a PG statement.
    #[track_caller]
    pub fn exec(context: &'static str) -> impl FnOnce(tokio_postgres::Error) -> Self {
        let location = std::panic::Location::caller();

        move |error: tokio_postgres::Error| Error::Execute {
            context,
            location,
            error,
        }
    }

    /// Error when parsing data coming back from the database.
    #[track_caller]
    pub fn data(context: &'static str) -> impl FnOnce(tokio_postgres::Error) -> Self {
        let location = std::panic::Location::caller();

        move |error: tokio_postgres::Error| Error::Data {
            context,
            location,
            error,
        }
    }

    #[track_caller]
    pub fn not_found<I: std::fmt::Display>(kind: &'static str, id: I) -> Self {
        let location = std::panic::Location::caller();

        Error::ResourceNotFound {
            kind,
            location,
            id: id.to_string(),
        }
    }
}
