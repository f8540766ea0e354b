use docgate::gateway::Gateway;
use docgate::gateway_config::GatewayConfig;

fn main() {
    colog::init();

    let config = GatewayConfig::from_env();
    let gateway = match Gateway::init_global(config) {
        Ok(gateway) => gateway,
        Err(err) => {
            log::error!("Gateway initialization failed: {:?}", err);
            std::process::exit(1);
        }
    };

    log::info!(
        "API running on http://localhost:{}",
        gateway.config().http_port()
    );

    if let Err(err) = gateway.serve() {
        log::error!("Server terminated: {:?}", err);
        std::process::exit(1);
    }
}
