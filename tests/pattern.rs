use trellis_router::pattern::{
    compile, BuildArgs, CompileOptions, PathBuildError, PathBuilder,
};

fn exact() -> CompileOptions {
    CompileOptions::default()
}

fn prefix() -> CompileOptions {
    CompileOptions {
        end: false,
        ..CompileOptions::default()
    }
}

#[test]
fn exact_match_cases() {
    let cases: &[(&str, &str, &[(&str, &str)])] = &[
        ("/", "/", &[]),
        ("/stories", "/stories", &[]),
        ("/stories", "/stories/", &[]),
        ("/user/:id", "/user/42", &[("id", "42")]),
        ("/user/:id/post/:post", "/user/a/post/7", &[("id", "a"), ("post", "7")]),
        ("/file/:path+", "/file/a/b/c", &[("path", "c")]),
        ("/icon-:size(\\d+).png", "/icon-32.png", &[("size", "32")]),
        ("/search/:query?", "/search", &[]),
        ("/search/:query?", "/search/cats", &[("query", "cats")]),
        ("/money/:amount", "/money/%2410", &[("amount", "$10")]),
    ];

    for (pattern, path, params) in cases {
        let matcher = compile(pattern, &exact()).unwrap();
        let m = matcher
            .test(path)
            .unwrap_or_else(|| panic!("{:?} must match {:?}", pattern, path));
        for (name, value) in params.iter() {
            assert_eq!(m.params.get(name), Some(*value), "param {:?} of {:?}", name, pattern);
        }
    }
}

#[test]
fn exact_reject_cases() {
    let cases: &[(&str, &str)] = &[
        ("/user", "/username"),
        ("/user/:id", "/user"),
        ("/user/:id", "/user/42/post"),
        ("/icon-:size(\\d+).png", "/icon-big.png"),
        ("/a", "/b"),
    ];
    for (pattern, path) in cases {
        let matcher = compile(pattern, &exact()).unwrap();
        assert!(matcher.test(path).is_none(), "{:?} must reject {:?}", pattern, path);
    }
}

#[test]
fn prefix_consumes_up_to_a_boundary() {
    let matcher = compile("/users", &prefix()).unwrap();
    let m = matcher.test("/users/42").unwrap();
    assert_eq!(m.path, "/users");

    // a non-boundary continuation is not a prefix match
    assert!(matcher.test("/username").is_none());
}

#[test]
fn repeated_parameter_splits_on_the_delimiter() {
    let matcher = compile("/file/:path+", &exact()).unwrap();
    let m = matcher.test("/file/a/b/c").unwrap();
    assert_eq!(
        m.params.get_all("path").map(<[String]>::to_vec),
        Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
    );
}

#[test]
fn case_sensitivity_is_opt_in() {
    let insensitive = compile("/About", &exact()).unwrap();
    assert!(insensitive.test("/about").is_some());

    let sensitive = compile(
        "/About",
        &CompileOptions {
            sensitive: true,
            ..CompileOptions::default()
        },
    )
    .unwrap();
    assert!(sensitive.test("/about").is_none());
    assert!(sensitive.test("/About").is_some());
}

// Building a path from values satisfying each parameter's pattern and
// matching it back recovers the same values.
#[test]
fn build_then_match_round_trip() {
    let cases: &[(&str, &[(&str, &str)])] = &[
        ("/user/:id", &[("id", "42")]),
        ("/user/:id/post/:post", &[("id", "abc"), ("post", "9")]),
        ("/icon-:size(\\d+).png", &[("size", "128")]),
        ("/money/:amount", &[("amount", "$10")]),
    ];
    for (pattern, values) in cases {
        let mut args = BuildArgs::new();
        for (k, v) in values.iter() {
            args.insert(*k, v);
        }
        let builder = PathBuilder::compile(pattern).unwrap();
        let path = builder.build(&args).unwrap();
        let m = compile(pattern, &exact())
            .unwrap()
            .test(&path)
            .unwrap_or_else(|| panic!("built path {:?} must match {:?}", path, pattern));
        for (k, v) in values.iter() {
            assert_eq!(m.params.get(k), Some(*v), "round trip of {:?}", pattern);
        }
    }
}

#[test]
fn build_repeat_joins_with_the_delimiter() {
    let builder = PathBuilder::compile("/file/:path+").unwrap();
    let mut args = BuildArgs::new();
    args.insert_list(
        "path",
        vec!["a".to_string(), "b".to_string(), "c".to_string()],
    );
    assert_eq!(builder.build(&args).unwrap(), "/file/a/b/c");
}

#[test]
fn build_errors_name_the_parameter() {
    let builder = PathBuilder::compile("/user/:id").unwrap();

    match builder.build(&BuildArgs::new()) {
        Err(PathBuildError::Missing { name, .. }) => assert_eq!(name, "id"),
        other => panic!("expected a missing-parameter error, got {:?}", other),
    }

    let mut list = BuildArgs::new();
    list.insert_list("id", vec!["a".to_string(), "b".to_string()]);
    assert!(matches!(
        builder.build(&list),
        Err(PathBuildError::UnexpectedRepeat { .. })
    ));

    let sized = PathBuilder::compile("/icon-:size(\\d+).png").unwrap();
    match sized.build(&BuildArgs::new().with("size", "big")) {
        Err(PathBuildError::PatternMismatch { name, .. }) => assert_eq!(name, "size"),
        other => panic!("expected a pattern-mismatch error, got {:?}", other),
    }
}

#[test]
fn optional_parameter_may_be_omitted_when_building() {
    let builder = PathBuilder::compile("/search/:query?").unwrap();
    assert_eq!(builder.build(&BuildArgs::new()).unwrap(), "/search");
    assert_eq!(
        builder.build(&BuildArgs::new().with("query", "cats")).unwrap(),
        "/search/cats"
    );
}

#[test]
fn built_values_are_percent_encoded_per_segment() {
    let builder = PathBuilder::compile("/money/:amount").unwrap();
    assert_eq!(
        builder.build(&BuildArgs::new().with("amount", "$10")).unwrap(),
        "/money/%2410"
    );
}
