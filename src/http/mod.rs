use actix_web::web;

pub mod auth;
pub mod authors;
pub mod bookings;
mod error;
pub mod newsletter;
pub mod posts;
pub mod settings;
pub mod uploads;

pub use error::ApiError;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/auth")
                    .route("/login", web::post().to(auth::login))
                    .route("/logout", web::post().to(auth::logout)),
            )
            .route("/upload", web::post().to(uploads::upload))
            .service(
                web::scope("/admin")
                    .route("/seo-settings", web::get().to(settings::get_seo))
                    .route("/seo-settings", web::put().to(settings::put_seo))
                    .route("/smtp-settings", web::get().to(settings::get_smtp))
                    .route("/smtp-settings", web::put().to(settings::put_smtp))
                    .route("/subscribers", web::get().to(newsletter::admin_list))
                    .route("/newsletter/send", web::post().to(newsletter::send))
                    .service(
                        web::scope("/posts")
                            .route("", web::get().to(posts::admin_list))
                            .route("", web::post().to(posts::create))
                            .route("/{id}", web::put().to(posts::update))
                            .route("/{id}", web::delete().to(posts::delete)),
                    )
                    .service(
                        web::scope("/authors")
                            .route("", web::get().to(authors::admin_list))
                            .route("", web::post().to(authors::create))
                            .route("/{id}", web::put().to(authors::update))
                            .route("/{id}", web::delete().to(authors::delete)),
                    )
                    .service(
                        web::scope("/bookings")
                            .route("", web::get().to(bookings::admin_list))
                            .route("/{id}", web::patch().to(bookings::update_status))
                            .route("/{id}", web::delete().to(bookings::delete)),
                    ),
            )
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_published))
                    .route("/{slug}", web::get().to(posts::get_published)),
            )
            .service(
                web::scope("/authors")
                    .route("", web::get().to(authors::list_all))
                    .route("/{slug}", web::get().to(authors::get_by_slug)),
            )
            .route("/bookings", web::post().to(bookings::submit))
            .service(
                web::scope("/newsletter")
                    .route("/subscribe", web::post().to(newsletter::subscribe))
                    .route("/unsubscribe", web::get().to(newsletter::unsubscribe)),
            ),
    );
}
