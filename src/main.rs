use log::info;
use serde::{Deserialize, Serialize};

use triebridge::common::{Method, Request, Response};
use triebridge::error::Error;
use triebridge::middleware::{self, AccessLogMiddleware, Next, RecoveryMiddleware};
use triebridge::{handler, RouterConfig, TrieBridgeBuilder};

#[derive(Serialize, Deserialize)]
struct Order {
    id: String,
    item: String,
}

// ヘルスチェック
fn health_handler(_req: Request) -> Result<serde_json::Value, Error> {
    Ok(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn order_detail(req: Request) -> Result<Order, Error> {
    let id = req
        .param("id")
        .ok_or_else(|| Error::InvalidRequestBody("missing id".to_string()))?;
    Ok(Order {
        id: id.to_string(),
        item: "coffee".to_string(),
    })
}

fn create_order(_req: Request, order: Order) -> Result<Order, Error> {
    info!("Creating new order: {}", order.id);
    Ok(order)
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = RouterConfig::from_env();

    let auth = middleware::from_fn(|req: Request, next: Next| async move {
        match req.header("x-auth-token") {
            Some(_) => next.handle(req).await,
            None => Ok(Response::new(401).text("unauthorized")),
        }
    });

    let app = match TrieBridgeBuilder::with_config(&config)
        .middleware(RecoveryMiddleware::default())
        .middleware(AccessLogMiddleware::new())
        .get("/", handler::from_fn(health_handler))
        .get("/order/:id(^[0-9]+$)", handler::from_fn(order_detail))
        .post("/order", handler::json_fn(create_order))
        .get("/user/*", handler::from_fn(|req: Request| {
            Ok(Response::ok().text(format!("user area: {}", req.path)))
        }))
        .use_middleware(Method::GET, "/user", auth)
        .build()
    {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Failed to build application: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting TrieBridge demo");

    let requests = vec![
        Request::new(Method::GET, "/"),
        Request::new(Method::GET, "/order/42"),
        Request::new(Method::GET, "/order/abc"),
        Request::new(Method::POST, "/order")
            .with_header("Content-Type", "application/json")
            .with_body(br#"{"id":"7","item":"tea"}"#.to_vec()),
        Request::new(Method::GET, "/user/alice/settings"),
        Request::new(Method::GET, "/user/alice/settings").with_header("X-Auth-Token", "demo"),
        Request::new(Method::DELETE, "/order/42"),
    ];

    for req in requests {
        let line = format!("{} {}", req.method, req.path);
        let res = app.dispatch(req).await;
        println!(
            "{} -> {} {}",
            line,
            res.status,
            res.body_text().unwrap_or_default()
        );
    }
}
