use actix_files::Files;
use actix_web::{middleware, web, App, HttpServer};
use infergate::classes::ClassIndex;
use infergate::client::InferenceClient;
use infergate::config::{PREDICT_TIMEOUT_SECS, RUST_LOG, UPLOAD_DIR};
use infergate::gateway::Gateway;
use infergate::server::routes;
use std::path::PathBuf;
use std::time::Duration;
use std::{env, io, process};

use tracing::info;
use tracing_subscriber;

const USAGE: &str = "usage: ./infergate <port> <inference url> <class index file>";

fn get_args() -> (u16, String, String) {
    let args: Vec<String> = env::args().collect();
    if args.len() - 1 != 3 {
        println!("{USAGE}");
        process::exit(1);
    }

    let port: u16 = args[1].parse().expect("invalid port");
    let inference_url = args[2].clone();
    let class_index = args[3].clone();

    (port, inference_url, class_index)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", RUST_LOG);
    }
    tracing_subscriber::fmt::init();

    let (port, inference_url, class_index) = get_args();

    let classes = ClassIndex::load(&class_index).expect("could not load class index");
    let client = InferenceClient::new(inference_url, Duration::from_secs(PREDICT_TIMEOUT_SECS))
        .expect("could not build inference client");
    let gateway = web::Data::new(
        Gateway::new(classes, client, PathBuf::from(UPLOAD_DIR))
            .expect("could not initialize gateway"),
    );

    info!("serving the inference gateway on port {port}");

    // Start the HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(gateway.clone())
            .wrap(middleware::Logger::default())
            .service(routes::index)
            .service(routes::classify)
            .service(Files::new("/uploads", UPLOAD_DIR))
    })
    .bind(format!("0.0.0.0:{port}"))?
    .run()
    .await
}
