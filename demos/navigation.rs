//! End-to-end navigation over an in-memory element tree.
//!
//!     cargo run --example navigation

use trellis_router::{BuildArgs, Element, Route, Router, RouterEvent};

use futures::executor::block_on;
use futures::future;

fn print_tree(element: &Element, depth: usize) {
    println!("{}<{}>", "  ".repeat(depth), element.component());
    for child in element.children() {
        print_tree(&child, depth + 1);
    }
}

fn main() {
    let router = Router::new(Element::new("outlet"), |name: &str| Some(Element::new(name)));
    router.subscribe(|event| {
        if let RouterEvent::LocationChanged(location) = event {
            println!("-> {}", location.url());
        }
    });
    router
        .set_routes(vec![
            Route::new("/").children(vec![
                Route::new("/").component("home-view"),
                Route::new("/stories").component("stories-view"),
                Route::new("/users/:user")
                    .component("user-view")
                    .name("user"),
            ]),
            Route::new("/old-stories").redirect("/stories"),
            Route::new("/admin").action(|_ctx, c| {
                Box::pin(future::ready(Ok(c.redirect("/"))))
            }),
        ])
        .expect("route configuration is valid");

    for path in ["/stories", "/users/kim", "/old-stories", "/admin"].iter() {
        match block_on(router.render(*path)) {
            Ok(location) => {
                if let Some(from) = &location.redirect_from {
                    println!("   (redirected from {})", from);
                }
                print_tree(router.outlet(), 1);
            }
            Err(err) => println!("   error: {}", err),
        }
    }

    let url = router
        .url_for_name("user", &BuildArgs::new().with("user", "kim"))
        .expect("known route name");
    println!("url for \"user\": {}", url);
}
