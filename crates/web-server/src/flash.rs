//! One-shot notices carried across a redirect in a cookie.

use crate::views::Notice;
use axum_extra::extract::cookie::{Cookie, CookieJar};

const FLASH_COOKIE: &str = "flash";

/// Queues `notice` for the next page that calls [`take`].
pub fn set(jar: CookieJar, notice: Notice) -> CookieJar {
    let value = format!("{}:{}", notice.kind, notice.text);
    jar.add(
        Cookie::build((FLASH_COOKIE, value))
            .path("/")
            .http_only(true),
    )
}

/// Removes the pending notice, if any, and returns it.
pub fn take(jar: CookieJar) -> (CookieJar, Option<Notice>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };
    let notice = parse(cookie.value());
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), notice)
}

fn parse(value: &str) -> Option<Notice> {
    match value.split_once(':')? {
        ("success", text) => Some(Notice::success(text)),
        ("error", text) => Some(Notice::error(text)),
        _ => None,
    }
}
