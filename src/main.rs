use flight_cost_tracker::browser::BrowserStore;
use flight_cost_tracker::logging::init_logging;
use flight_cost_tracker::ui::App;
use flight_cost_tracker::AppConfig;

fn main() {
    let config = AppConfig::load(&BrowserStore);
    init_logging(config.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting flight cost tracker");
    yew::Renderer::<App>::new().render();
}
