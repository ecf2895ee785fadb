use crate::{
    api::{
        absence, advance, doublage, employee, extra, ledger, notification, punch, retard,
        schedule, sync,
    },
    config::Config,
};
use actix_governor::{
    governor::middleware::NoOpMiddleware, Governor, GovernorConfigBuilder, PeerIpKeyExtractor,
};
use actix_web::web;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 { 1 } else { 60_000 / requests_per_min as u64 };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let read_limiter = Arc::new(build_limiter(config.rate_read_per_min));
    let mutation_limiter = Arc::new(build_limiter(config.rate_mutation_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::scope("/ledger")
                    .service(
                        web::resource("/pardon")
                            .wrap(mutation_limiter.clone())
                            .route(web::post().to(ledger::pardon)),
                    )
                    .service(
                        web::resource("/{period}")
                            .wrap(read_limiter.clone())
                            .route(web::get().to(ledger::get_ledger)),
                    )
                    .service(
                        web::resource("/{period}/pay")
                            .wrap(mutation_limiter.clone())
                            .route(web::post().to(ledger::pay)),
                    )
                    .service(
                        web::resource("/{period}/provision")
                            .wrap(mutation_limiter.clone())
                            .route(web::post().to(ledger::provision)),
                    )
                    .service(
                        web::resource("/{period}/{row_id}")
                            .wrap(mutation_limiter.clone())
                            .route(web::put().to(ledger::edit_ledger_row)),
                    ),
            )
            .service(
                web::scope("/employees")
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/schedules").service(
                    web::resource("/{employee_id}")
                        .route(web::get().to(schedule::get_schedule))
                        .route(web::put().to(schedule::set_schedule)),
                ),
            )
            .service(
                web::scope("/punches")
                    .service(
                        web::resource("")
                            .wrap(mutation_limiter.clone())
                            .route(web::post().to(punch::ingest_punches)),
                    )
                    .service(
                        web::resource("/{date}")
                            .wrap(read_limiter.clone())
                            .route(web::get().to(punch::list_punches)),
                    ),
            )
            .service(
                web::scope("/advances")
                    .service(
                        web::resource("")
                            .route(web::post().to(advance::add_advance))
                            .route(web::get().to(advance::list_advances)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(advance::update_advance))
                            .route(web::delete().to(advance::delete_advance)),
                    ),
            )
            .service(
                web::scope("/retards")
                    .service(
                        web::resource("")
                            .route(web::post().to(retard::add_retard))
                            .route(web::get().to(retard::list_retards)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(retard::update_retard))
                            .route(web::delete().to(retard::delete_retard)),
                    ),
            )
            .service(
                web::scope("/absences")
                    .service(
                        web::resource("")
                            .route(web::post().to(absence::add_absence))
                            .route(web::get().to(absence::list_absences)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(absence::update_absence))
                            .route(web::delete().to(absence::delete_absence)),
                    ),
            )
            .service(
                web::scope("/extras")
                    .service(
                        web::resource("")
                            .route(web::post().to(extra::add_extra))
                            .route(web::get().to(extra::list_extras)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(extra::update_extra))
                            .route(web::delete().to(extra::delete_extra)),
                    ),
            )
            .service(
                web::scope("/doublages")
                    .service(
                        web::resource("")
                            .route(web::post().to(doublage::add_doublage))
                            .route(web::get().to(doublage::list_doublages)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(doublage::update_doublage))
                            .route(web::delete().to(doublage::delete_doublage)),
                    ),
            )
            .service(
                web::resource("/notifications")
                    .wrap(read_limiter.clone())
                    .route(web::get().to(notification::list_notifications)),
            )
            .service(
                web::resource("/sync")
                    .wrap(mutation_limiter.clone())
                    .route(web::post().to(sync::trigger_sync)),
            ),
    );
}
