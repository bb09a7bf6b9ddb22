//! User service demo: typed endpoints on a route group, a template table
//! and the generated documents.

pub mod api;
pub mod models;
pub mod services;
pub mod state;

use bindoc::prelude::*;
use bindoc::{catch_panic_layer, default_trace};

use api::UserTemplates;
use state::AppState;

/// Register every endpoint and the document routes.
pub fn build_api(settings: DocSettings) -> (ApiGroup, ApiRouter<AppState>) {
    let mut router = ApiRouter::new();
    let mut api = ApiGroup::new().with_settings(settings);

    {
        let mut users = router.group("/api/users");
        api.register(
            &mut users,
            Method::POST,
            "",
            api::create_user,
            EndpointOptions::new()
                .with_title("create_user")
                .with_description("Create a new user"),
        );
        api.register(
            &mut users,
            Method::GET,
            ":username",
            api::get_user,
            EndpointOptions::new().with_title("get_user"),
        );
        api.register_with_doc(
            &mut users,
            Method::GET,
            "/docs/:doc_name",
            api::get_document,
            "get doc",
            "Echo a document request",
        );
    }

    api.register_all(
        &mut router,
        &UserTemplates,
        |name| name != "list_users",
        EndpointOptions::new().unexported(),
    );
    api.register_template(
        &mut router,
        ApiTemplate::new("list_users", Method::GET, "/api/users", api::list_users)
            .with_title("list users"),
        EndpointOptions::new(),
    );

    api.doc_routes(&mut router);
    (api, router)
}

/// The served application.
pub fn build_app(settings: DocSettings, state: AppState) -> bindoc::axum::Router {
    let (_, router) = build_api(settings);
    router
        .into_router()
        .with_state(state)
        .layer(default_trace())
        .layer(catch_panic_layer())
}
