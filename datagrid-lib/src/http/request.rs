//! Incoming request abstraction

/// The slice of an HTTP request the grid reads.
///
/// The grid looks up its own query bucket (nested under the grid hash key),
/// a few routing attributes, the referer header, and the current URL parts
/// used for same-grid navigation detection. Frameworks adapt their request
/// type behind this trait.
pub trait HttpRequest {
    /// Returns the query/body parameter stored under the given key.
    ///
    /// The grid's bucket is a JSON object nested under the grid hash key.
    fn parameter(&self, key: &str) -> Option<serde_json::Value>;

    /// Returns a routing attribute such as `_controller` or `_route`.
    fn attribute(&self, key: &str) -> Option<String>;

    /// Returns a request header value.
    fn header(&self, name: &str) -> Option<String>;

    /// Returns `true` for XMLHttpRequest-style requests.
    fn is_xml_http_request(&self) -> bool {
        false
    }

    /// Returns the request scheme (`http`, `https`).
    fn scheme(&self) -> String;

    /// Returns the host, including any non-default port.
    fn http_host(&self) -> String;

    /// Returns the base URL prefix the application is mounted under.
    fn base_url(&self) -> String;

    /// Returns the path below the base URL.
    fn path_info(&self) -> String;
}
