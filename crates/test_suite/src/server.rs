use std::collections::BTreeMap;

use uhsapi::{Params, ParsedBody, ServerRequestInterface};

use crate::ok;

fn params(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// `request` must have no cookies, query params, uploads, parsed body or attributes
pub fn assert_server_request<S: ServerRequestInterface>(request: &S) {
    assert!(request.cookie_params().is_empty());
    assert!(request.query_params().is_empty());
    assert!(request.uploaded_files().is_empty());
    assert!(request.parsed_body().is_none());
    assert!(request.attributes().is_empty());

    let cookies = request.with_cookie_params(params(&[("session", "s1")]));
    assert_eq!(cookies.cookie_params(), &params(&[("session", "s1")]));
    assert!(!cookies.same_instance(request));

    let query = cookies.with_query_params(params(&[("page", "3")]));
    assert_eq!(query.query_params(), &params(&[("page", "3")]));
    assert_eq!(query.cookie_params(), cookies.cookie_params());

    let body = query.with_parsed_body(Some(ParsedBody::Form(params(&[("field", "v")]))));
    assert_eq!(
        body.parsed_body().and_then(ParsedBody::as_form),
        Some(&params(&[("field", "v")]))
    );
    assert!(body.with_parsed_body(None).parsed_body().is_none());

    let files = request.with_uploaded_files(BTreeMap::new());
    assert!(files.uploaded_files().is_empty());

    let attributed = request.with_attribute("route", String::from("home"));
    assert_eq!(attributed.attribute::<String>("route").map(String::as_str), Some("home"));
    assert!(attributed.attribute::<u64>("route").is_none());
    assert!(attributed.same_instance(&attributed.without_attribute("other")));
    assert!(attributed.without_attribute("route").attributes().is_empty());

    // Message operations keep the server side state
    let header = ok(attributed.with_header("X-Suite", "1"), "with_header");
    assert_eq!(header.attribute::<String>("route").map(String::as_str), Some("home"));
    assert!(request.attributes().is_empty());
    assert!(request.cookie_params().is_empty());
}
