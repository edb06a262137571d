use std::io;
use std::net::TcpListener;
use std::sync::Arc;

use actix_web::web;
use dotenvy::dotenv;
use front_of_house::application::auto_advance;
use front_of_house::application::restaurant_service::RestaurantService;
use front_of_house::config::{Settings, Storage};
use front_of_house::domain::ports::RestaurantRepository;
use front_of_house::infrastructure::memory_repo::InMemoryRepository;
use front_of_house::infrastructure::restaurant_repo::DieselRestaurantRepository;
use front_of_house::{build_server, create_pool, run_migrations};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let settings = Settings::from_env().map_err(io::Error::other)?;

    let repo: Arc<dyn RestaurantRepository> = match &settings.storage {
        Storage::Postgres { database_url } => {
            let pool = create_pool(database_url).map_err(io::Error::other)?;
            run_migrations(&pool).map_err(io::Error::other)?;
            Arc::new(DieselRestaurantRepository::new(pool))
        }
        Storage::Memory => {
            log::warn!("Using in-memory storage; state is lost on restart");
            Arc::new(InMemoryRepository::new())
        }
    };

    let service = web::Data::new(RestaurantService::new(repo));
    let _auto_advance = auto_advance::spawn(service.clone(), settings.auto_advance);

    let listener = TcpListener::bind((settings.host.as_str(), settings.port))?;
    log::info!("Starting server at http://{}", listener.local_addr()?);

    build_server(service, listener)?.await
}
