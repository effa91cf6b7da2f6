mod common;

use anyhow::Result;
use axum::http::{header, StatusCode};

#[tokio::test]
async fn root_gets_default_locale_prefix() -> Result<()> {
    let app = common::app();
    let res = common::send(&app, common::get("/", None)).await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(common::location(&res).as_deref(), Some("/pt"));
    Ok(())
}

#[tokio::test]
async fn unprefixed_path_keeps_rest_and_query() -> Result<()> {
    let app = common::app();
    let res = common::send(&app, common::get("/admin/companies?page=2&q=acme", None)).await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        common::location(&res).as_deref(),
        Some("/pt/admin/companies?page=2&q=acme")
    );
    Ok(())
}

#[tokio::test]
async fn locale_redirect_does_not_consult_the_session_service() -> Result<()> {
    // The outage token would turn into a 502 if authentication ran.
    let app = common::app();
    let res = common::send(&app, common::get("/dashboard", Some(common::OUTAGE_TOKEN))).await?;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(common::location(&res).as_deref(), Some("/pt/dashboard"));
    Ok(())
}

#[tokio::test]
async fn unsupported_locale_is_treated_as_a_path() -> Result<()> {
    let app = common::app();
    let res = common::send(&app, common::get("/fr/login", None)).await?;
    assert_eq!(common::location(&res).as_deref(), Some("/pt/fr/login"));
    Ok(())
}

#[tokio::test]
async fn assets_bypass_the_gate() -> Result<()> {
    let app = common::app();
    for path in ["/favicon.ico", "/_next/static/app.js", "/images/logo.png"] {
        let res = common::send(&app, common::get(path, Some(common::OUTAGE_TOKEN))).await?;
        assert!(common::location(&res).is_none(), "{path} was redirected");
        assert!(res.headers().get(header::CONTENT_LANGUAGE).is_none());
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{path}");
    }
    Ok(())
}

#[tokio::test]
async fn asset_bypass_does_not_open_admin_handlers() -> Result<()> {
    let app = common::app();
    let res = common::send(&app, common::get("/api/admin/companies", None)).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn allowed_pages_carry_locale_headers() -> Result<()> {
    let app = common::app();
    let res = common::send(&app, common::get("/es/dashboard", Some(common::MEMBER_TOKEN))).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get(header::CONTENT_LANGUAGE).unwrap(), "es");
    let cookie = res.headers().get(header::SET_COOKIE).unwrap().to_str()?;
    assert!(cookie.starts_with("NEXT_LOCALE=es"));

    let body = common::body_json(res).await?;
    assert_eq!(body["data"]["locale"], "es");
    assert_eq!(body["data"]["route_path"], "/dashboard");
    Ok(())
}
