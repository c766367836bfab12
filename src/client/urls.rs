//! Service URLs from the environment: one the browser can reach and one for
//! server-side code, which may use an internal hostname.

pub const PUBLIC_URL_ENV: &str = "PUBLIC_POCKETBASE_URL";
pub const INTERNAL_URL_ENV: &str = "POCKETBASE_URL";
pub const DEFAULT_URL: &str = "http://127.0.0.1:8090";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceUrls {
    pub public: Option<String>,
    pub internal: Option<String>,
}

impl ServiceUrls {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            public: read(PUBLIC_URL_ENV),
            internal: read(INTERNAL_URL_ENV),
        }
    }

    pub fn public(&self) -> Option<&str> {
        self.public.as_deref()
    }

    /// Server-side URL, falling back to the public one.
    pub fn internal(&self) -> Option<&str> {
        self.internal.as_deref().or(self.public.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_internal_falls_back_to_public() {
        let urls = ServiceUrls::from_lookup(lookup(&[(PUBLIC_URL_ENV, "https://pb.example.com")]));
        assert_eq!(urls.public(), Some("https://pb.example.com"));
        assert_eq!(urls.internal(), Some("https://pb.example.com"));
    }

    #[test]
    fn test_internal_preferred_when_set() {
        let urls = ServiceUrls::from_lookup(lookup(&[
            (PUBLIC_URL_ENV, "https://pb.example.com"),
            (INTERNAL_URL_ENV, "http://pocketbase:8090"),
        ]));
        assert_eq!(urls.internal(), Some("http://pocketbase:8090"));
    }

    #[test]
    fn test_blank_values_ignored() {
        let urls = ServiceUrls::from_lookup(lookup(&[(INTERNAL_URL_ENV, "  ")]));
        assert_eq!(urls, ServiceUrls::default());
        assert_eq!(urls.internal(), None);
    }
}
