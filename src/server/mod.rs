pub mod api;

use crate::controller::ViewController;
use std::error::Error;
use std::sync::Arc;

pub struct Server {
    addr: String,
    controller: Arc<ViewController>,
}

impl Server {
    pub fn new(addr: String, controller: Arc<ViewController>) -> Self {
        Self { addr, controller }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        api::start_http_server(&self.addr, self.controller.clone()).await
    }
}
