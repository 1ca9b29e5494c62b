use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::Config;
use crate::container::{Container, Registrar};
use crate::controllers;
use crate::hooks::{sync_action, DEFAULT_PRIORITY};
use crate::host::{CurrentUser, NonceVerifier, RewriteRules};
use crate::http::{
    HandlerRegistry, HttpError, Middleware, MiddlewareRegistry, Nonce, Renderer, Request, Response, ResponseRenderer,
    Route, UserCan,
};
use crate::kernel::constants::{INIT_ACTION, TEMPLATE_REDIRECT_ACTION};
use crate::kernel::error::Result;
use crate::providers::{Boot, BootContext, Register};
use crate::support::{RouteFile, UrlGenerator};

/// Request handling services, and the public request path on
/// `template_redirect`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteServiceProvider;

/// The middleware route declarations may name.
pub fn middleware_registry(container: &Container) -> Result<MiddlewareRegistry> {
    let mut registry = MiddlewareRegistry::new();

    let nonces = container.get::<dyn NonceVerifier>()?;
    registry.register("nonce", move |action| {
        let action = action.ok_or_else(|| HttpError::MissingMiddlewareArgument { name: "nonce".to_string() })?;
        Ok(Arc::new(Nonce::new(action, nonces.clone())) as Arc<dyn Middleware>)
    });

    let user = container.get::<dyn CurrentUser>()?;
    registry.register("can", move |capability| {
        let capability = capability.ok_or_else(|| HttpError::MissingMiddlewareArgument { name: "can".to_string() })?;
        Ok(Arc::new(UserCan::new(capability, user.clone())) as Arc<dyn Middleware>)
    });

    Ok(registry)
}

impl Register for RouteServiceProvider {
    fn name(&self) -> &'static str {
        "RouteServiceProvider"
    }

    fn register(&self, registrar: &Registrar<'_>) -> Result<()> {
        registrar.singleton::<Request, _>(|_| Ok(Arc::new(Request::capture())))?;
        registrar.bind::<Response, _>(|_| Ok(Arc::new(Response::new())))?;
        registrar.singleton::<UrlGenerator, _>(|c| {
            let config = c.get::<Config>()?;
            Ok(Arc::new(UrlGenerator::from_config(&config, c.get::<dyn RewriteRules>()?)))
        })?;
        registrar.singleton::<MiddlewareRegistry, _>(|c| Ok(Arc::new(middleware_registry(c)?)))?;
        registrar.singleton::<HandlerRegistry, _>(|c| Ok(Arc::new(controllers::handlers(c)?)))?;
        registrar.singleton::<dyn Renderer, _>(|_| Ok(Arc::new(ResponseRenderer::stdout()) as Arc<dyn Renderer>))
    }
}

#[async_trait]
impl Boot for RouteServiceProvider {
    async fn boot(&self, cx: &BootContext) -> Result<()> {
        let container = cx.container.clone();
        cx.hooks
            .add_action(INIT_ACTION, DEFAULT_PRIORITY, sync_action(move |_| add_rewrite_rules(&container)))
            .await?;

        let container = cx.container.clone();
        cx.hooks
            .add_action(
                TEMPLATE_REDIRECT_ACTION,
                DEFAULT_PRIORITY,
                sync_action(move |_| dispatch_public(&container).map(|_| ())),
            )
            .await?;
        Ok(())
    }
}

/// One entry of `routes.rewrites`.
#[derive(Debug, Clone, Deserialize)]
pub struct RewriteRule {
    pub pattern: String,
    pub query: String,
}

/// Install the configured rewrite rules the host does not have yet.
pub fn add_rewrite_rules(container: &Container) -> Result<()> {
    let rules: Vec<RewriteRule> = container.get::<Config>()?.get_or("routes.rewrites", Vec::new());
    let rewrites = container.get::<dyn RewriteRules>()?;
    for rule in rules.iter().filter(|rule| !rewrites.exists(&rule.pattern)) {
        log::debug!("Adding rewrite rule {} -> {}", rule.pattern, rule.query);
        rewrites.add(&rule.pattern, &rule.query);
    }
    Ok(())
}

/// The route file a public request belongs to, and the path left for its
/// routes.
///
/// The query form (`?dt-plugin=hello`) is checked first; otherwise the
/// longest route file prefix of the request path wins.
pub fn match_route_file<'a>(urls: &'a UrlGenerator, request: &Request) -> Option<(&'a RouteFile, String)> {
    for file in urls.route_files().values() {
        if let Some(path) = request.query_param(&file.query) {
            return Some((file, format!("/{}", path.trim_start_matches('/'))));
        }
    }

    let path = request.path().trim_start_matches('/');
    urls.route_files()
        .values()
        .filter_map(|file| {
            let prefix = file.path.trim_matches('/');
            let rest = path.strip_prefix(prefix)?;
            (rest.is_empty() || rest.starts_with('/')).then(|| (file, prefix.len(), rest))
        })
        .max_by_key(|(_, len, _)| *len)
        .map(|(file, _, rest)| (file, format!("/{}", rest.trim_start_matches('/'))))
}

/// Dispatch and render the current request when it targets one of the
/// plugin's route files. Returns whether it did.
pub fn dispatch_public(container: &Container) -> Result<bool> {
    let request = container.get::<Request>()?;
    let urls = container.get::<UrlGenerator>()?;
    let Some((file, path)) = match_route_file(&urls, &request) else {
        return Ok(false);
    };
    log::debug!("Public request {} {} routed to {} as {}", request.method(), request.path(), file.file, path);

    let middleware: Vec<String> = container.get::<Config>()?.get_or("routes.middleware", Vec::new());
    Route::from_container(container)?
        .with_middleware(middleware)?
        .as_uri(&path)
        .from_route_file(&file.file)?
        .render()?;
    Ok(true)
}
