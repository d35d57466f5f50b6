#[macro_use]
extern crate rocket;

use std::fs;
use std::process;
use std::sync::Arc;

use clap::Parser;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::fs::FileServer;
use rocket::http::Header;
use rocket::response::content::RawHtml;
use rocket::{Build, Rocket};
use rocket_dyn_templates::Template;

mod auth;
mod boot;
mod cli;
mod config;
mod contact;
mod db;
mod email;
mod images;
mod models;
mod routes;
mod security;


use cli::{Cli, Command};
use config::{AppConfig, STATIC_DIR};
use db::DbPool;
use email::{Mailer, SmtpMailer};
use security::{BotCheck, Turnstile};

pub struct NoCacheAdmin;

#[rocket::async_trait]
impl Fairing for NoCacheAdmin {
    fn info(&self) -> Info {
        Info { name: "No-Cache Admin Pages", kind: Kind::Response }
    }

    async fn on_response<'r>(&self, req: &'r rocket::Request<'_>, res: &mut rocket::Response<'r>) {
        if req.uri().path().starts_with("/admin") {
            res.set_header(Header::new("Cache-Control", "no-store, no-cache, must-revalidate, max-age=0"));
            res.set_header(Header::new("Pragma", "no-cache"));
        }
    }
}

#[catch(404)]
fn not_found() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>404</h1><p>Page not found.</p><a href='/'>← Home</a></body></html>".to_string())
}

#[catch(500)]
fn server_error() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>500</h1><p>Internal server error.</p><a href='/'>← Home</a></body></html>".to_string())
}

/// Assemble the application around an already-migrated pool.
pub fn build(
    config: AppConfig,
    pool: DbPool,
    bot: Arc<dyn BotCheck>,
    mailer: Arc<dyn Mailer>,
) -> Rocket<Build> {
    let uploads = FileServer::from(&config.upload_dir);

    rocket::custom(config.figment())
        .manage(pool)
        .manage(config)
        .manage(bot)
        .manage(mailer)
        .attach(Template::fairing())
        .attach(NoCacheAdmin)
        .mount("/static", FileServer::from(STATIC_DIR))
        .mount("/uploads", uploads)
        .mount("/", routes::public::routes())
        .mount("/admin", routes::admin::routes())
        .mount("/admin", routes::auth::routes())
        .register("/", catchers![not_found, server_error])
}

fn fail(msg: impl std::fmt::Display) -> ! {
    log::error!("{}", msg);
    process::exit(1);
}

/// Open the configured database, with schema and default settings in place.
fn open_database(config: &AppConfig) -> DbPool {
    if let Some(dir) = config.database_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(dir) {
            fail(format!("Could not create {}: {}", dir.display(), e));
        }
    }

    let pool = db::init_pool(&config.database_path)
        .unwrap_or_else(|e| fail(format!("Failed to initialize database pool: {}", e)));
    let conn = pool
        .get()
        .unwrap_or_else(|e| fail(format!("Failed to open database: {}", e)));
    db::run_migrations(&conn).unwrap_or_else(|e| fail(format!("Failed to run database migrations: {}", e)));
    db::seed_defaults(&conn).unwrap_or_else(|e| fail(format!("Failed to seed default settings: {}", e)));
    pool
}

fn run_init_admin(config: &AppConfig, username: Option<String>, password: Option<String>) {
    let pool = open_database(config);
    let conn = pool
        .get()
        .unwrap_or_else(|e| fail(format!("Failed to open database: {}", e)));

    let username = match username {
        Some(u) => u,
        None => cli::prompt("Admin username: ").unwrap_or_else(|e| fail(e)),
    };
    let username = cli::check_username(&conn, &username).unwrap_or_else(|msg| {
        eprintln!("{}", msg);
        process::exit(1);
    });

    let password = match password {
        Some(p) => p,
        None => cli::prompt("Admin password: ").unwrap_or_else(|e| fail(e)),
    };

    match cli::init_admin(&conn, &username, &password) {
        Ok(_) => println!("Admin user '{}' created.", username),
        Err(msg) => {
            eprintln!("{}", msg);
            process::exit(1);
        }
    }
}

#[rocket::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().unwrap_or_else(|e| fail(format!("Invalid configuration: {}", e)));

    if let Some(Command::InitAdmin { username, password }) = cli.command {
        run_init_admin(&config, username, password);
        return;
    }

    // Create missing directories and validate critical files
    boot::run(&config);

    let pool = open_database(&config);
    let bot: Arc<dyn BotCheck> = Arc::new(Turnstile::new(config.turnstile_secret_key.clone()));
    let mailer: Arc<dyn Mailer> = Arc::new(SmtpMailer);

    log::info!("Serving '{}' (admin panel at /admin)", config.site_name);

    if let Err(e) = build(config, pool, bot, mailer).launch().await {
        fail(format!("Rocket failed: {}", e));
    }
}
