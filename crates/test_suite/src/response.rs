use uhsapi::ResponseInterface;

use crate::ok;

/// `response` must be a fresh `200` response without an explicit reason phrase
pub fn assert_response<R: ResponseInterface>(response: &R) {
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.reason_phrase(), "OK");

    let same = ok(response.with_status(200, ""), "with_status");
    assert!(same.same_instance(response));

    for (code, reason) in [(201, "Created"), (404, "Not Found"), (503, "Service Unavailable")] {
        let next = ok(response.with_status(code, ""), "with_status");
        assert_eq!(next.status_code(), code);
        assert_eq!(next.reason_phrase(), reason);
    }

    let custom = ok(response.with_status(404, "Nothing Here"), "with_status");
    assert_eq!(custom.reason_phrase(), "Nothing Here");
    let unknown = ok(response.with_status(599, ""), "with_status");
    assert_eq!(unknown.reason_phrase(), "", "unknown codes have no reason phrase");

    for bad in [0, 99, 600, 999] {
        assert!(response.with_status(bad, "").is_err(), "status {bad} must be rejected");
    }
    assert_eq!(response.status_code(), 200);
}
