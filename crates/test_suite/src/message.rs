use uhsapi::{MessageInterface, SameInstance};

use crate::ok;

/// Runs every message check. `message` must have no `X-Suite-*` headers and a body other
/// than `body`
pub fn assert_message<M: MessageInterface>(message: &M, body: M::Body) {
    assert_protocol_version(message);
    assert_header_case_insensitive(message);
    assert_header_replace_and_append(message);
    assert_header_removal(message);
    assert_header_validation(message);
    assert_header_trimming(message);
    assert_body(message, body);
}

pub fn assert_protocol_version<M: MessageInterface>(message: &M) {
    let current = message.protocol_version().to_owned();
    let same = ok(message.with_protocol_version(&current), "with_protocol_version");
    assert!(same.same_instance(message), "setting the same version must be a no-op");

    for version in ["1.0", "1.1", "2"] {
        let next = ok(message.with_protocol_version(version), "with_protocol_version");
        assert_eq!(next.protocol_version(), version);
    }
    assert_eq!(message.protocol_version(), current, "the receiver must not change");

    for bad in ["", "HTTP/1.1", "1", "3.0", "1.1 "] {
        assert!(
            message.with_protocol_version(bad).is_err(),
            "protocol version {bad:?} must be rejected"
        );
    }
}

pub fn assert_header_case_insensitive<M: MessageInterface>(message: &M) {
    let next = ok(message.with_header("X-Suite-Case", "value"), "with_header");
    assert!(!next.same_instance(message));
    assert!(next.has_header("x-suite-case"));
    assert!(next.has_header("X-SUITE-CASE"));
    assert_eq!(next.header("x-SuItE-cAsE"), ["value"]);
    assert_eq!(next.header_line("X-SUITE-case"), "value");
    assert!(
        next.headers().any(|(name, _)| name == "X-Suite-Case"),
        "the supplied case must be kept"
    );

    assert!(!message.has_header("X-Suite-Case"), "the receiver must not change");
    assert!(message.header("X-Suite-Case").is_empty());
    assert_eq!(message.header_line("X-Suite-Case"), "");
}

pub fn assert_header_replace_and_append<M: MessageInterface>(message: &M) {
    let first = ok(message.with_header("X-Suite-List", ["a", "b"]), "with_header");
    assert_eq!(first.header_line("x-suite-list"), "a, b");

    let same = ok(first.with_header("X-Suite-List", ["a", "b"]), "with_header");
    assert!(same.same_instance(&first), "replacing with equal values must be a no-op");

    let recased = ok(first.with_header("x-suite-list", "c"), "with_header");
    assert_eq!(recased.header("X-Suite-List"), ["c"]);
    assert!(recased.headers().any(|(name, _)| name == "x-suite-list"));
    assert!(!recased.headers().any(|(name, _)| name == "X-Suite-List"));

    let appended = ok(first.with_added_header("X-SUITE-LIST", "c"), "with_added_header");
    assert_eq!(appended.header("x-suite-list"), ["a", "b", "c"]);
    assert!(
        appended.headers().any(|(name, _)| name == "X-Suite-List"),
        "appending must keep the case of the existing header"
    );

    let created = ok(message.with_added_header("X-Suite-New", 42), "with_added_header");
    assert_eq!(created.header("X-Suite-New"), ["42"]);
    assert_eq!(first.header("x-suite-list"), ["a", "b"]);
}

pub fn assert_header_removal<M: MessageInterface>(message: &M) {
    let same = ok(message.without_header("X-Suite-Missing"), "without_header");
    assert!(same.same_instance(message), "removing an absent header must be a no-op");

    let with = ok(message.with_header("X-Suite-Gone", "x"), "with_header");
    let without = ok(with.without_header("x-suite-gone"), "without_header");
    assert!(!without.has_header("X-Suite-Gone"));
    assert!(with.has_header("X-Suite-Gone"));
    assert!(message.without_header("Bad Name").is_err());
}

pub fn assert_header_validation<M: MessageInterface>(message: &M) {
    for bad in ["", "X Suite", "X-Suite:", "X-Suite\r\n", "Ünicode", "(comment)"] {
        assert!(
            message.with_header(bad, "value").is_err(),
            "header name {bad:?} must be rejected"
        );
        assert!(message.with_added_header(bad, "value").is_err());
    }
    for bad in [
        "value\r\nX-Injected: 1",
        "value\nX-Injected: 1",
        "value\rX-Injected: 1",
        "nul\0",
        "bell\x07",
        "del\x7f",
        "trailing fold\r\n ",
        "trailing fold\r\n\t",
    ] {
        assert!(
            message.with_header("X-Suite", bad).is_err(),
            "header value {bad:?} must be rejected"
        );
        assert!(message.with_added_header("X-Suite", bad).is_err());
    }
    assert!(message.with_header("X-Suite", Vec::<String>::new()).is_err());
    let folded = ok(message.with_header("X-Suite", "folded\r\n value"), "with_header");
    assert_eq!(folded.header_line("X-Suite"), "folded\r\n value");
    for (_, values) in folded.headers() {
        for value in values {
            assert!(!value.ends_with(['\r', '\n']), "a stored value must not end in a line break");
        }
    }
}

pub fn assert_header_trimming<M: MessageInterface>(message: &M) {
    let next = ok(message.with_header("X-Suite-Trim", [" \tpadded \t", "x "]), "with_header");
    assert_eq!(next.header("X-Suite-Trim"), ["padded", "x"]);
    let next = ok(message.with_header("X-Suite-Trim", "\u{a0}kept"), "with_header");
    assert_eq!(next.header("X-Suite-Trim"), ["\u{a0}kept"], "only SP and HTAB are trimmed");
}

pub fn assert_body<M: MessageInterface>(message: &M, body: M::Body) {
    let next = message.with_body(body.clone());
    assert!(next.body().same_instance(&body));
    assert!(!message.body().same_instance(&body), "the receiver must not change");
    let same = next.with_body(body);
    assert!(same.same_instance(&next), "setting the same body must be a no-op");
}
