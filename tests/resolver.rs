use trellis_router::{
    ActionResult, ResolveRequest, ResolveResult, Resolver, Route, RouterError,
};

use futures::executor::block_on;
use futures::future;

use std::cell::RefCell;
use std::rc::Rc;

fn story_routes() -> Vec<Route> {
    vec![Route::new("/").children(vec![
        Route::new("/")
            .action(|_ctx, c| Box::pin(future::ready(Ok(c.component("home-view"))))),
        Route::new("/stories")
            .action(|_ctx, c| Box::pin(future::ready(Ok(c.component("stories-view"))))),
        Route::new("/users/:user").action(|ctx, _c| {
            let user = ctx.params.get("user").unwrap_or_default().to_string();
            Box::pin(future::ready(Ok(ActionResult::Component(format!(
                "user-{}",
                user
            )))))
        }),
    ])]
}

fn component_of(result: &ResolveResult) -> &str {
    match result {
        ResolveResult::Component(name) => name,
        other => panic!("expected a component result, got {:?}", other),
    }
}

#[test]
fn nested_child_resolves_under_a_pass_through_parent() {
    let resolver = Resolver::new();
    resolver.set_routes(story_routes()).unwrap();

    let context = block_on(resolver.resolve("/stories")).unwrap();
    assert_eq!(component_of(&context.result), "stories-view");
    assert!(context.is_found());
    assert_eq!(context.chain.len(), 2);
    assert_eq!(context.chain[1].path, "stories");

    let context = block_on(resolver.resolve("/users/kim")).unwrap();
    assert_eq!(component_of(&context.result), "user-kim");
    assert_eq!(context.params.get("user"), Some("kim"));
}

#[test]
fn empty_parent_and_child_patterns_match_the_root_path() {
    let resolver = Resolver::new();
    resolver
        .set_routes(vec![Route::new("").children(vec![
            Route::new("").action(|_ctx, c| Box::pin(future::ready(Ok(c.component("shell")))))
        ])])
        .unwrap();

    let context = block_on(resolver.resolve("/")).unwrap();
    assert_eq!(component_of(&context.result), "shell");
    assert!(context.is_found());
}

#[test]
fn declaration_order_decides_between_overlapping_routes() {
    let order = Rc::new(RefCell::new(Vec::new()));

    let visited = order.clone();
    let first = Route::new("/item/:id").action(move |_ctx, c| {
        visited.borrow_mut().push("first");
        Box::pin(future::ready(Ok(c.pass())))
    });
    let visited = order.clone();
    let second = Route::new("/item/special").action(move |_ctx, c| {
        visited.borrow_mut().push("second");
        Box::pin(future::ready(Ok(c.component("special"))))
    });

    let resolver = Resolver::new();
    resolver.set_routes(vec![first, second]).unwrap();

    let context = block_on(resolver.resolve("/item/special")).unwrap();
    assert_eq!(component_of(&context.result), "special");
    assert_eq!(*order.borrow(), vec!["first", "second"]);
}

#[test]
fn exhausted_subtree_backtracks_to_the_next_sibling() {
    let resolver = Resolver::new();
    resolver
        .set_routes(vec![
            Route::new("/docs").children(vec![
                Route::new("/intro")
                    .action(|_ctx, c| Box::pin(future::ready(Ok(c.pass()))))
            ]),
            Route::new("/docs/intro")
                .action(|_ctx, c| Box::pin(future::ready(Ok(c.component("flat-intro"))))),
        ])
        .unwrap();

    let context = block_on(resolver.resolve("/docs/intro")).unwrap();
    assert_eq!(component_of(&context.result), "flat-intro");
    assert_eq!(context.chain.len(), 1);
}

#[test]
fn child_params_shadow_parent_params_of_the_same_name() {
    let resolver = Resolver::new();
    resolver
        .set_routes(vec![Route::new("/:kind").children(vec![Route::new("/:kind").action(
            |ctx, _c| {
                let kind = ctx.params.get("kind").unwrap_or_default().to_string();
                Box::pin(future::ready(Ok(ActionResult::Component(kind))))
            },
        )])])
        .unwrap();

    let context = block_on(resolver.resolve("/outer/inner")).unwrap();
    assert_eq!(component_of(&context.result), "inner");
    assert_eq!(context.params.get("kind"), Some("inner"));
}

#[test]
fn search_and_hash_reach_the_action_context() {
    let resolver = Resolver::new();
    resolver
        .set_routes(vec![Route::new("/a").action(|ctx, _c| {
            let tag = format!("{}{}", ctx.search, ctx.hash);
            Box::pin(future::ready(Ok(ActionResult::Component(tag))))
        })])
        .unwrap();

    let request = ResolveRequest::path("/a").search("?q=1").hash("#top");
    let context = block_on(resolver.resolve(request)).unwrap();
    assert_eq!(component_of(&context.result), "?q=1#top");
    assert_eq!(context.search, "?q=1");
    assert_eq!(context.hash, "#top");
}

#[test]
fn alternative_patterns_are_tried_in_order() {
    let resolver = Resolver::new();
    resolver
        .set_routes(vec![Route::new(vec!["/posts", "/articles"])
            .action(|ctx, _c| {
                let path = ctx.route_path.clone();
                Box::pin(future::ready(Ok(ActionResult::Component(path))))
            })])
        .unwrap();

    let context = block_on(resolver.resolve("/articles")).unwrap();
    assert_eq!(component_of(&context.result), "articles");
    assert!(block_on(resolver.resolve("/posts")).is_ok());
}

#[test]
fn not_found_error_names_the_last_attempted_route() {
    let resolver = Resolver::new();
    resolver
        .set_routes(vec![Route::new("/shop").children(vec![
            Route::new("/cart").action(|_ctx, c| Box::pin(future::ready(Ok(c.pass()))))
        ])])
        .unwrap();

    match block_on(resolver.resolve("/shop/cart")).unwrap_err() {
        RouterError::NotFound {
            pathname,
            route_path,
        } => {
            assert_eq!(pathname, "/shop/cart");
            assert!(route_path.is_some());
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn partial_match_without_a_leaf_is_not_found() {
    let resolver = Resolver::new();
    resolver.set_routes(story_routes()).unwrap();

    let err = block_on(resolver.resolve("/stories/deeper")).unwrap_err();
    assert_eq!(err.code(), 404);
}

#[test]
fn dynamic_children_run_at_most_once_per_resolution() {
    let calls = Rc::new(RefCell::new(0));

    let counter = calls.clone();
    let resolver = Resolver::new();
    resolver
        .set_routes(vec![Route::new("/lazy").children_fn(move |_ctx| {
            *counter.borrow_mut() += 1;
            Box::pin(future::ready(Ok(vec![
                Route::new("/a").action(|_ctx, c| Box::pin(future::ready(Ok(c.pass())))),
                Route::new("/b")
                    .action(|_ctx, c| Box::pin(future::ready(Ok(c.component("b"))))),
            ])))
        })])
        .unwrap();

    let context = block_on(resolver.resolve("/lazy/b")).unwrap();
    assert_eq!(component_of(&context.result), "b");
    assert_eq!(*calls.borrow(), 1);
}

#[test]
fn failing_children_fn_propagates_its_error() {
    let resolver = Resolver::new();
    resolver
        .set_routes(vec![Route::new("/lazy").children_fn(|_ctx| {
            Box::pin(future::ready(Err(RouterError::callback(
                "children unavailable",
            ))))
        })])
        .unwrap();

    let err = block_on(resolver.resolve("/lazy/a")).unwrap_err();
    assert_eq!(err.code(), 500);
}
