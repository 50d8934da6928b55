use crate::{config::DbConfig, Error};
use deadpool_postgres::{ClientWrapper, Hook, HookError, Metrics, Pool, PoolConfig};
use futures_util::FutureExt;
use std::time::Duration;

pub use deadpool_postgres::Object as Connection;

const INIT_DB: &str = "
CREATE TABLE IF NOT EXISTS nfts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    royalty_basis_points INT NOT NULL,
    author TEXT NOT NULL,
    owner TEXT NOT NULL,
    metadata_url TEXT NOT NULL,
    media_url TEXT,
    mint_address TEXT NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
CREATE TABLE IF NOT EXISTS nft_transfers (
    id BIGSERIAL PRIMARY KEY,
    mint_address TEXT NOT NULL,
    from_address TEXT NOT NULL,
    to_address TEXT NOT NULL,
    signature TEXT NOT NULL,
    transferred_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
CREATE INDEX IF NOT EXISTS nft_transfers_mint_idx ON nft_transfers (mint_address);
";

async fn conn_healthcheck(
    conn: &mut ClientWrapper,
    metric: &Metrics,
) -> Result<(), deadpool_postgres::HookError> {
    if metric.last_used() <= Duration::from_secs(10) {
        Ok(())
    } else {
        conn.simple_query("").await.map_err(HookError::Backend)?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct DbPool {
    pg: Pool,
}

impl DbPool {
    pub async fn new(cfg: &DbConfig) -> crate::Result<Self> {
        use deadpool_postgres::{Config, Runtime};

        let pool_cfg = Config {
            user: Some(cfg.user.clone()),
            password: Some(cfg.password.clone()),
            dbname: Some(cfg.dbname.clone()),
            host: Some(cfg.host.clone()),
            port: Some(cfg.port),
            pool: Some(PoolConfig {
                max_size: 32,
                ..Default::default()
            }),
            ..Config::default()
        };

        let pg = pool_cfg
            .builder(tokio_postgres::NoTls)
            .map_err(Error::CreatePool)?
            .pre_recycle(Hook::async_fn(|c, m| conn_healthcheck(c, m).boxed()))
            .runtime(Runtime::Tokio1)
            .build()
            .expect("shouldn't fail");

        // Test to see if we can connect
        let _conn = pg.get().await.map_err(Error::GetDbConnection)?;

        Ok(Self { pg })
    }

    pub async fn get_conn(&self) -> crate::Result<Connection> {
        let conn = tokio::time::timeout(Duration::from_secs(240), self.pg.get())
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(Error::GetDbConnection)?;
        Ok(conn)
    }

    pub async fn init_db(&self) -> crate::Result<()> {
        let conn = self.get_conn().await?;
        conn.batch_execute(INIT_DB).await.map_err(Error::InitDb)?;
        tracing::info!("database tables ready");
        Ok(())
    }
}
