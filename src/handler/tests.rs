use super::*;
use crate::common::{Handler, Method, Request, Response, StatusCode};
use crate::error::Error;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct TestRequest {
    name: String,
    value: i32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct TestResponse {
    message: String,
    value: i32,
}

fn test_get_handler(req: Request) -> Result<TestResponse, Error> {
    Ok(TestResponse {
        message: format!("Hello {}", req.param("id").unwrap_or("nobody")),
        value: 42,
    })
}

fn test_post_handler(_req: Request, body: TestRequest) -> Result<TestResponse, Error> {
    Ok(TestResponse {
        message: format!("Hello, {}", body.name),
        value: body.value * 2,
    })
}

async fn test_async_get_handler(_req: Request) -> Result<TestResponse, Error> {
    Ok(TestResponse {
        message: "Hello from async GET".to_string(),
        value: 100,
    })
}

async fn test_async_post_handler(_req: Request, body: TestRequest) -> Result<TestResponse, Error> {
    Ok(TestResponse {
        message: format!("Hello async, {}", body.name),
        value: body.value * 3,
    })
}

fn parse_body(res: Response) -> TestResponse {
    let body_str = String::from_utf8(res.body.unwrap()).unwrap();
    serde_json::from_str(&body_str).unwrap()
}

fn routed_request(method: Method, path: &str, id: &str) -> Request {
    let mut req = Request::new(method, path);
    let mut params = std::collections::HashMap::new();
    params.insert("id".to_string(), id.to_string());
    req.set_route_info("/items/:id", params);
    req
}

#[tokio::test]
async fn test_from_fn_reads_path_params() {
    let handler = from_fn(test_get_handler);
    let res = handler
        .handle(routed_request(Method::GET, "/items/7", "7"))
        .await
        .unwrap();

    assert_eq!(res.status, 200);
    assert_eq!(res.headers.get("Content-Type"), Some(&"application/json".to_string()));
    let body = parse_body(res);
    assert_eq!(body.message, "Hello 7");
    assert_eq!(body.value, 42);
}

#[tokio::test]
async fn test_from_fn_ignores_body() {
    let handler = from_fn(test_get_handler);
    let req = Request::new(Method::GET, "/items")
        .with_header("Content-Type", "text/plain")
        .with_body(b"not json".to_vec());

    assert!(handler.handle(req).await.is_ok());
}

#[tokio::test]
async fn test_json_fn_execution() {
    let handler = json_fn(test_post_handler);
    let test_data = TestRequest {
        name: "Test User".to_string(),
        value: 21,
    };
    let req = Request::new(Method::POST, "/users")
        .with_header("Content-Type", "application/json; charset=utf-8")
        .with_body(serde_json::to_vec(&test_data).unwrap());

    let body = parse_body(handler.handle(req).await.unwrap());
    assert_eq!(body.message, "Hello, Test User");
    assert_eq!(body.value, 42);
}

#[tokio::test]
async fn test_json_fn_missing_body() {
    let handler = json_fn(test_post_handler);
    let req = Request::new(Method::POST, "/users");

    match handler.handle(req).await {
        Err(Error::InvalidRequestBody(msg)) => assert_eq!(msg, "Missing request body"),
        other => panic!("unexpected result: {:?}", other.map(|r| r.status)),
    }
}

#[tokio::test]
async fn test_json_fn_rejects_wrong_content_type() {
    let handler = json_fn(test_post_handler);
    let req = Request::new(Method::POST, "/users")
        .with_header("Content-Type", "text/plain")
        .with_body(br#"{"name":"x","value":1}"#.to_vec());

    assert!(matches!(
        handler.handle(req).await,
        Err(Error::InvalidRequestBody(_))
    ));

    let req = Request::new(Method::POST, "/users").with_body(br#"{"name":"x","value":1}"#.to_vec());
    assert!(matches!(
        handler.handle(req).await,
        Err(Error::InvalidRequestBody(_))
    ));
}

#[tokio::test]
async fn test_json_fn_accepts_vendor_json() {
    let handler = json_fn(test_post_handler);
    let req = Request::new(Method::POST, "/users")
        .with_header("Content-Type", "application/vnd.api+json")
        .with_body(br#"{"name":"vendor","value":5}"#.to_vec());

    let body = parse_body(handler.handle(req).await.unwrap());
    assert_eq!(body.value, 10);
}

#[tokio::test]
async fn test_async_handlers() {
    let handler = from_async_fn(test_async_get_handler);
    let body = parse_body(handler.handle(Request::new(Method::GET, "/")).await.unwrap());
    assert_eq!(body.value, 100);

    let handler = json_async_fn(test_async_post_handler);
    let req = Request::new(Method::POST, "/async")
        .with_header("content-type", "application/json")
        .with_body(br#"{"name":"Async","value":3}"#.to_vec());
    let body = parse_body(handler.handle(req).await.unwrap());
    assert_eq!(body.message, "Hello async, Async");
    assert_eq!(body.value, 9);

    let missing = handler.handle(Request::new(Method::POST, "/async")).await;
    assert!(matches!(missing, Err(Error::InvalidRequestBody(_))));
}

#[tokio::test]
async fn test_response_and_status_passthrough() {
    let handler = from_fn(|_req| {
        Ok(Response::ok()
            .with_header("X-Custom-Header", "CustomValue")
            .text("plain"))
    });
    let res = handler.handle(Request::new(Method::GET, "/")).await.unwrap();
    assert_eq!(res.headers.get("X-Custom-Header"), Some(&"CustomValue".to_string()));
    assert_eq!(res.body_text().as_deref(), Some("plain"));

    let handler = from_fn(|_req| Ok(StatusCode::NoContent));
    let res = handler.handle(Request::new(Method::DELETE, "/")).await.unwrap();
    assert_eq!(res.status, 204);
    assert!(res.body.is_none());
}

#[tokio::test]
async fn test_handler_error_propagates() {
    let handler = from_fn(|_req| -> Result<Response, Error> {
        Err(Error::InternalServerError("boom".to_string()))
    });
    let result = handler.handle(Request::new(Method::GET, "/")).await;
    assert!(matches!(result, Err(Error::InternalServerError(_))));
}

#[test]
fn test_is_json_like_content_type() {
    assert!(body::is_json_like_content_type("application/json"));
    assert!(body::is_json_like_content_type("Application/JSON; charset=utf-8"));
    assert!(body::is_json_like_content_type("application/problem+json"));
    assert!(body::is_json_like_content_type("application/json-seq"));
    assert!(!body::is_json_like_content_type("text/json"));
    assert!(!body::is_json_like_content_type(""));
}
