//! `Set-Cookie` header parsing

use crate::elements::Cookie;
use crate::response::Response;
use url::Url;

/// All cookies a response sets, defaulting their domain to the response host
pub fn from_response(response: &Response, url: &Url) -> Vec<Cookie> {
    response
        .header_values("set-cookie")
        .filter_map(parse_set_cookie)
        .map(|mut cookie| {
            if cookie.domain.is_none() {
                cookie.domain = url.host_str().map(str::to_string);
            }
            cookie
        })
        .collect()
}

/// Parse a single `Set-Cookie` header value
pub fn parse_set_cookie(header: &str) -> Option<Cookie> {
    let mut parts = header.split(';');
    let (name, value) = parts.next()?.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let mut cookie = Cookie::new(name, value.trim().trim_matches('"'));
    for attribute in parts {
        let (key, val) = match attribute.split_once('=') {
            Some((k, v)) => (k.trim(), Some(v.trim())),
            None => (attribute.trim(), None),
        };

        match key.to_ascii_lowercase().as_str() {
            "domain" => {
                cookie.domain = val
                    .map(|d| d.trim_start_matches('.').to_ascii_lowercase())
                    .filter(|d| !d.is_empty());
            }
            "path" => cookie.path = val.filter(|p| !p.is_empty()).map(str::to_string),
            "secure" => cookie.secure = true,
            "httponly" => cookie.http_only = true,
            _ => {}
        }
    }

    Some(cookie)
}
