//! An in-process stand-in for the accrual service.
use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use actix_web::{dev::ServerHandle, web, App, HttpResponse, HttpServer};
use serde_json::json;

#[derive(Debug, Clone)]
pub enum StubReply {
    /// 200 with a record for the requested order
    Accrual { status: &'static str, accrual: Option<f64> },
    /// 200 with a record for a different order
    WrongOrder { order: &'static str },
    /// 200 with an unparseable body
    Garbage,
    NoContent,
    TooManyRequests(Option<&'static str>),
    Status(u16),
}

#[derive(Default)]
struct StubState {
    replies: Mutex<HashMap<String, VecDeque<StubReply>>>,
    hits: Mutex<Vec<String>>,
}

pub struct AccrualStub {
    pub base_url: String,
    state: web::Data<StubState>,
    handle: ServerHandle,
}

impl AccrualStub {
    /// Starts the stub on a random local port. Must be called from within an actix/tokio runtime.
    pub fn start() -> Self {
        let state = web::Data::new(StubState::default());
        let app_state = state.clone();
        let server = HttpServer::new(move || {
            App::new().app_data(app_state.clone()).route("/api/orders/{number}", web::get().to(order_handler))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("Could not bind stub server");
        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);
        Self { base_url: format!("http://{addr}"), state, handle }
    }

    /// Always answer `reply` for `order`.
    pub fn set(&self, order: &str, reply: StubReply) {
        self.set_sequence(order, vec![reply]);
    }

    /// Answer with each reply in turn. The last one repeats forever.
    pub fn set_sequence(&self, order: &str, replies: Vec<StubReply>) {
        self.state.replies.lock().unwrap().insert(order.to_string(), replies.into());
    }

    pub fn hits(&self, order: &str) -> usize {
        self.state.hits.lock().unwrap().iter().filter(|o| *o == order).count()
    }

    pub fn total_hits(&self) -> usize {
        self.state.hits.lock().unwrap().len()
    }

    pub async fn stop(self) {
        self.handle.stop(true).await;
    }
}

async fn order_handler(path: web::Path<String>, state: web::Data<StubState>) -> HttpResponse {
    let order = path.into_inner();
    state.hits.lock().unwrap().push(order.clone());
    let reply = {
        let mut replies = state.replies.lock().unwrap();
        match replies.get_mut(&order) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        }
    };
    match reply.unwrap_or(StubReply::NoContent) {
        StubReply::Accrual { status, accrual } => {
            let mut body = json!({ "order": order, "status": status });
            if let Some(accrual) = accrual {
                body["accrual"] = json!(accrual);
            }
            HttpResponse::Ok().json(body)
        },
        StubReply::WrongOrder { order } => {
            HttpResponse::Ok().json(json!({ "order": order, "status": "PROCESSED", "accrual": 500 }))
        },
        StubReply::Garbage => HttpResponse::Ok().content_type("application/json").body("{ not json"),
        StubReply::NoContent => HttpResponse::NoContent().finish(),
        StubReply::TooManyRequests(retry_after) => {
            let mut response = HttpResponse::TooManyRequests();
            if let Some(value) = retry_after {
                response.insert_header(("Retry-After", value));
            }
            response.body("No more than N requests per minute allowed")
        },
        StubReply::Status(code) => {
            let status = actix_web::http::StatusCode::from_u16(code).expect("Invalid status code");
            HttpResponse::build(status).finish()
        },
    }
}
