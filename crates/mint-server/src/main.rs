use actix_web::{App, HttpServer, middleware::Logger, web};
use db::OrderStore;
use futures_util::future::ok;
use mint_server::{
    Config, SolanaContext,
    api::{self, prelude::Success},
    mint_worker,
};
use std::{convert::Infallible, sync::Arc, time::Duration};

#[actix_web::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::get_config();

    tracing::info!("allow CORS origins: {:?}", config.cors_origins);

    let sol = match SolanaContext::new(&config.solana) {
        Ok(sol) => Arc::new(sol),
        Err(e) => {
            tracing::error!("failed to load creator keypair: {}", e);
            return;
        }
    };
    tracing::info!(
        "creator wallet: {}, cluster: {}",
        sol.creator_pubkey(),
        sol.cluster
    );

    let store = match OrderStore::new(&config.local_storage) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(
                "failed to open local storage {:?}: {}",
                config.local_storage.display(),
                e
            );
            return;
        }
    };

    let db = match &config.db {
        Some(cfg) => match db::DbPool::new(cfg).await {
            Ok(pool) => {
                if let Err(e) = pool.init_db().await {
                    tracing::error!("failed to initialize database tables: {}", e);
                    return;
                }
                Some(pool)
            }
            Err(e) => {
                tracing::error!("failed to start database connection pool: {}", e);
                return;
            }
        },
        None => {
            tracing::info!("no database configured, nft rows are not recorded");
            None
        }
    };

    let pinata = config.pinata.client();

    let queue = mint_worker::start(sol.clone(), pinata.clone(), store.clone(), db.clone());

    {
        // periodic cleanup of overdue orders
        let store = store.clone();
        let every = Duration::from_secs(config.orders.sweep_interval_secs);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // the first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                match store.sweep(chrono::Utc::now()) {
                    Ok(stats) => tracing::info!(
                        "order sweep: {} expired, {} removed",
                        stats.expired,
                        stats.removed
                    ),
                    Err(error) => tracing::error!("order sweep failed: {}", error),
                }
            }
        });
    }

    let host = config.host.clone();
    let port = config.port;

    tracing::info!("listening on {:?} port {:?}", host, port);

    HttpServer::new(move || {
        let payments = web::scope("/payments")
            .service(api::verify_payment::service(&config))
            .service(api::payment_qr::service(&config))
            .service(api::backend_wallet::service(&config));
        let orders = web::scope("/orders")
            .service(api::orders::create::service(&config))
            .service(api::orders::status::service(&config))
            .service(api::orders::upload::service(&config))
            .service(api::orders::qr::service(&config))
            .service(api::orders::deeplink::service(&config));
        let pinata_jwt = web::scope("/pinata").service(api::pinata_jwt::service(&config));
        let nfts = web::scope("/nfts").service(api::get_nft::service(&config));

        let healthcheck = web::resource("/health")
            .route(web::get().to(|()| ok::<_, Infallible>(web::Json(Success))));

        App::new()
            .wrap(Logger::new(r#""%r" %s %b %Dms"#).exclude("/health"))
            .app_data(web::Data::from(sol.clone()))
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(pinata.clone()))
            .app_data(web::Data::new(queue.clone()))
            .app_data(web::Data::new(config.clone()))
            .service(api::mint::service(&config))
            .service(api::transfer::service(&config))
            .service(api::update_royalty::service(&config))
            .service(payments)
            .service(orders)
            .service(pinata_jwt)
            .service(nfts)
            .service(healthcheck)
    })
    .bind((host, port))
    .unwrap()
    .run()
    .await
    .unwrap();
}
