use uhsapi::{RequestInterface, UriInterface};

use crate::ok;

/// Runs every request check. `request` must use the `GET` method, carry no `Host` header
/// and have an empty uri. `parse` turns a string into the request's uri type
pub fn assert_request<R, F>(request: &R, parse: F)
where
    R: RequestInterface,
    F: Fn(&str) -> R::Uri,
{
    assert_method(request);
    assert_request_target(request, &parse);
    assert_host_from_uri(request, &parse);
    assert_preserve_host(request, &parse);
}

pub fn assert_method<R: RequestInterface>(request: &R) {
    assert_eq!(request.method(), "GET");
    let same = ok(request.with_method("GET"), "with_method");
    assert!(same.same_instance(request));

    for method in ["POST", "get", "PROPFIND", "M-SEARCH", ""] {
        let next = ok(request.with_method(method), "with_method");
        assert_eq!(next.method(), method, "the method must be kept as supplied");
    }
    for bad in ["GE T", "GET\r\n", "(GET)", "GÉT"] {
        assert!(request.with_method(bad).is_err(), "method {bad:?} must be rejected");
    }
    assert_eq!(request.method(), "GET");
}

pub fn assert_request_target<R, F>(request: &R, parse: F)
where
    R: RequestInterface,
    F: Fn(&str) -> R::Uri,
{
    assert_eq!(request.request_target(), "/");

    let with_uri = ok(request.with_uri(parse("/a/b?c=d"), false), "with_uri");
    assert_eq!(with_uri.request_target(), "/a/b?c=d");
    let moved = ok(with_uri.with_uri(parse("/other"), false), "with_uri");
    assert_eq!(moved.request_target(), "/other", "the target must follow the uri");

    for target in ["*", "example.com:443", "http://example.com/x", "no-leading-slash"] {
        let next = ok(request.with_request_target(target), "with_request_target");
        assert_eq!(next.request_target(), target);
        let again = ok(next.with_request_target(target), "with_request_target");
        assert!(again.same_instance(&next));
    }
    for bad in ["/a b", "/a\tb", "/a\nb", "/a\rb"] {
        assert!(
            request.with_request_target(bad).is_err(),
            "request target {bad:?} must be rejected"
        );
    }
    assert_eq!(request.request_target(), "/");
}

pub fn assert_host_from_uri<R, F>(request: &R, parse: F)
where
    R: RequestInterface,
    F: Fn(&str) -> R::Uri,
{
    let next = ok(request.with_header("Accept", "*/*"), "with_header");
    let next = ok(next.with_uri(parse("http://www.example.com/"), false), "with_uri");
    assert_eq!(next.header_line("host"), "www.example.com");
    let first = next.headers().next().map(|(name, _)| name.to_owned());
    assert_eq!(first.as_deref(), Some("Host"), "the host header must come first");

    let with_port = ok(next.with_uri(parse("http://example.com:8080/"), false), "with_uri");
    assert_eq!(with_port.header_line("Host"), "example.com:8080");

    let default_port = ok(next.with_uri(parse("https://example.com:443/"), false), "with_uri");
    assert_eq!(default_port.header_line("Host"), "example.com");

    let hostless = ok(with_port.with_uri(parse("/relative"), false), "with_uri");
    assert_eq!(
        hostless.header_line("Host"),
        "example.com:8080",
        "a uri without host must keep the header"
    );

    let same = ok(next.with_uri(next.uri().clone(), false), "with_uri");
    assert!(same.same_instance(&next));
    assert!(!request.has_header("Host"));
}

pub fn assert_preserve_host<R, F>(request: &R, parse: F)
where
    R: RequestInterface,
    F: Fn(&str) -> R::Uri,
{
    let synthesized = ok(request.with_uri(parse("http://bar.com/"), true), "with_uri");
    assert_eq!(
        synthesized.header_line("Host"),
        "bar.com",
        "without a host header preserve_host must still synthesize it"
    );

    let explicit = ok(request.with_header("Host", "foo.com"), "with_header");
    let kept = ok(explicit.with_uri(parse("http://bar.com/"), true), "with_uri");
    assert_eq!(kept.header_line("Host"), "foo.com");
    assert_eq!(kept.uri().host(), "bar.com");

    let replaced = ok(explicit.with_uri(parse("http://bar.com/"), false), "with_uri");
    assert_eq!(replaced.header_line("Host"), "bar.com");
}
