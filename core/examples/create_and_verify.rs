//! Register an expectation, hit it, verify it, then clear the server.
//!
//! Targets `MOCKSERVER_URL` when set; otherwise boots the bundled mock server
//! on a random local port.

use std::error::Error;

use mockserver_client::{ClientConfig, Context, MockServerClient, VerifyRequestBody};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const EXPECTATION: &[u8] = br#"{
  "id": "successfully get cart",
  "httpRequest": {
    "method": "GET",
    "path": "/view/cart"
  },
  "httpResponse": {
    "body": "some_response_body"
  }
}"#;

fn start_local_server() -> Result<String, std::io::Error> {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = std_listener.local_addr()?;
    std_listener.set_nonblocking(true)?;

    std::thread::spawn(move || -> Result<(), std::io::Error> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener)?;
            mock_server::run(listener).await
        })
    });

    Ok(format!("http://{addr}"))
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "create_and_verify=info,mockserver_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = ClientConfig::from_env()?;
    if std::env::var_os("MOCKSERVER_URL").is_none() {
        config.base_url = start_local_server()?;
    }
    info!(base_url = %config.base_url, "using mock server");

    let client = MockServerClient::from_config(&config);
    let ctx = Context::background();

    client.create_expectation(&ctx, EXPECTATION)?;

    let mut response = ureq::get(&format!("{}/view/cart", config.base_url)).call()?;
    let body = response.body_mut().read_to_string()?;
    info!(status = response.status().as_u16(), %body, "GET /view/cart");

    client.verify_request(&ctx, &VerifyRequestBody::for_expectation("successfully get cart"))?;
    info!("request verified");

    client.clear(&ctx)?;
    info!("mock server cleared");
    Ok(())
}
