/// Join an API root and a relative endpoint path with exactly one `/` between them.
///
/// `join_url("/api", "config/")` and `join_url("/api/", "config/")` both yield
/// `/api/config/`.
pub fn join_url(root: &str, path: &str) -> String {
    format!(
        "{}/{}",
        root.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
