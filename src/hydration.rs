//! Server rendering and hydration
//!
//! A server resolves the requested URL once, renders it with
//! [`compose_static`](crate::compose::compose_static) and ships the resolved
//! view alongside the markup. The client decodes it and seeds its router with
//! it, so the first frame needs no resolution.

use crate::error::RouterError;
use crate::location::Url;
use crate::logging::log_resolution;
use crate::route::RouteTable;
use crate::view::ResolvedView;

/// Resolve the view for the first request
///
/// Blocks the calling thread until the route table's loaders finish.
pub fn resolve_initial_view(routes: &dyn RouteTable, url: &Url) -> ResolvedView {
    log_resolution(url, routes.check(url));
    pollster::block_on(routes.match_url(url))
}

/// Serialize a resolved view for embedding in server output
pub fn encode_view(view: &ResolvedView) -> Result<String, RouterError> {
    Ok(serde_json::to_string(view)?)
}

/// Restore a view produced by [`encode_view`]
pub fn decode_view(payload: &str) -> Result<ResolvedView, RouterError> {
    Ok(serde_json::from_str(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::compose_static;
    use crate::location::Location;
    use crate::route::Route;
    use crate::table::Routes;
    use serde_json::json;

    fn routes() -> Routes {
        Routes::new(vec![Route::new("/", "shell").child(
            Route::new("posts/:slug", "post")
                .name("post")
                .loader(|ctx| {
                    let slug = ctx.args.get("slug").cloned().unwrap_or_default();
                    async move {
                        let mut props = crate::view::Props::new();
                        props.insert("title".into(), json!(slug.to_uppercase()));
                        props
                    }
                }),
        )])
        .unwrap()
    }

    #[test]
    fn test_server_view_hydrates_identically() {
        let table = routes();
        let view = resolve_initial_view(&table, &Url::new("/posts/intro?ref=feed"));
        assert_eq!(view.leaf().unwrap().props.get("title"), Some(&json!("INTRO")));

        let payload = encode_view(&view).unwrap();
        let restored = decode_view(&payload).unwrap();
        assert_eq!(restored, view);
        assert_eq!(compose_static(&restored), compose_static(&view));
        assert_eq!(table.link(&restored.location).unwrap(), "/posts/intro?ref=feed");
    }

    #[test]
    fn test_unmatched_url_hydrates_as_not_found() {
        let table = routes();
        let view = resolve_initial_view(&table, &Url::new("/missing"));
        assert!(view.is_not_found());
        let restored = decode_view(&encode_view(&view).unwrap()).unwrap();
        assert!(restored.is_not_found());
        assert_eq!(restored.location, Location::path("/missing"));
    }

    #[test]
    fn test_malformed_payload() {
        let err = decode_view("{\"location\":").unwrap_err();
        assert!(matches!(err, RouterError::Hydration { .. }));
    }
}
