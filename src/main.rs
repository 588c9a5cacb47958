mod api;
mod config;
mod datastore;
mod identity;
mod metrics;
mod render;
mod twoface;

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate prometheus;
#[macro_use]
extern crate guard;
#[macro_use]
extern crate diesel;

use crate::config::Config;
use crate::datastore::postgres::PostgresStore;
use crate::identity::{form::FormResolver, token::TokenResolver, Resolver};
use actix_service::Service;
use actix_web::{dev::ServiceResponse, middleware, web, App, HttpServer};
use datastore::postgres;
use futures::future::FutureExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};

fn main() {
    let args: Vec<_> = std::env::args().collect();
    guard!(let [_, config_file_path, ..] = &args[..] else {
        eprintln!("First argument should be path to config file");
        return
    });

    let config = Config::from_file(config_file_path);

    // Set up logger output
    let subscriber_builder = tracing_subscriber::fmt().with_max_level(Level::DEBUG);
    if config.human_logs {
        subscriber_builder.init();
    } else {
        subscriber_builder.json().init();
    }

    info!("starting corkboard");

    let sys = actix_rt::System::new("corkboard");

    // Build the postgres client
    let db = PostgresStore::new(
        postgres::Dsn::new(&config),
        config.db_pool_size,
        Duration::from_secs(config.db_connection_timeout),
    )
    .expect("couldn't connect to Postgres");
    prometheus::register(Box::new(db.clone())).expect("couldn't register DB metrics");

    // Pick how authorship gets decided, then start the board server
    if config.disable_auth {
        warn!("Auth is disabled. Posts are credited to whatever name the form claims.");
        serve(&config, db, FormResolver::new(config.anonymous_author.clone()));
    } else {
        let identity = config
            .identity
            .as_ref()
            .expect("disable_auth is off but config has no [identity] section");
        let resolver =
            TokenResolver::from_config(identity).expect("couldn't build the token resolver");
        serve(&config, db, resolver);
    }

    // Start the metrics server
    info!(
        addr = &config.metrics_address[..],
        "starting metrics server"
    );
    HttpServer::new(|| {
        App::new().service(
            web::scope("/metrics")
                .service(web::resource("/").route(web::get().to(metrics::endpoint::gather)))
                .service(web::resource("").route(web::get().to(metrics::endpoint::gather))),
        )
    })
    .bind(config.metrics_address)
    .expect("couldn't start metrics server")
    .run();

    sys.run().expect("actix runtime terminated");
}

/// Start the board server with the given authorship resolver.
fn serve<R>(config: &Config, db: PostgresStore, resolver: R)
where
    R: Resolver + Send + Sync + 'static,
{
    let state = api::State {
        ds: Arc::new(db),
        resolver: Arc::new(resolver),
        settle: config.delete_settle(),
    };

    info!(
        addr = &config.listen_address[..],
        "starting board server"
    );
    let max_form_size = config.max_form_size;
    HttpServer::new(move || {
        App::new()
            // Middleware for Prometheus
            .wrap_fn(|request, srv| srv.call(request).map(increment_response_metrics))
            .data(state.clone())
            // enable logger
            .wrap(middleware::Logger::default())
            // limit size of the payload (global configuration)
            .data(web::FormConfig::default().limit(max_form_size))
            .configure(api::board::configure::<PostgresStore, R>)
            .default_service(web::route().to(api::board::other_paths))
    })
    .bind(config.listen_address.clone())
    .expect("couldn't start board HTTP server")
    .run();
}

/// If response is OK, increment the metrics for HTTP statuses.
fn increment_response_metrics<E, B>(
    response: Result<ServiceResponse<B>, E>,
) -> Result<ServiceResponse<B>, E> {
    match response {
        Ok(response) => {
            metrics::HTTP_RESPONSES
                .with_label_values(&[response.status().as_str()])
                .inc();
            Ok(response)
        }
        other => other,
    }
}
