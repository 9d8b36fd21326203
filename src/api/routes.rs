use actix_web::web;

use super::handlers;

/// Registers every `/api` route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/labdata")
                    .route("", web::get().to(handlers::get_lab_data))
                    .route("/reload", web::post().to(handlers::reload_lab_data)),
            )
            .route("/categories", web::get().to(handlers::get_categories))
            .service(
                web::scope("/tests")
                    .route("", web::get().to(handlers::get_tests))
                    .route("/{name}/results", web::get().to(handlers::get_test_results))
                    .route("/{name}/chart", web::get().to(handlers::get_test_chart)),
            )
            .route("/charts/multi", web::get().to(handlers::get_multi_chart))
            .service(
                web::scope("/dashboard")
                    .route("", web::get().to(handlers::get_dashboard))
                    .route("/graphs", web::post().to(handlers::add_graphs))
                    .route("/graphs/move", web::post().to(handlers::move_graph))
                    .route("/graphs/{id}", web::delete().to(handlers::remove_graph))
                    .route("/graphs/{id}/expand", web::post().to(handlers::toggle_graph))
                    .route("/selection", web::get().to(handlers::get_selection))
                    .route("/selection/toggle", web::post().to(handlers::toggle_selection))
                    .route("/selection/commit", web::post().to(handlers::commit_selection)),
            ),
    );
}
