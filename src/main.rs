use competence_graph::config::Config;
use competence_graph::{App, init_logging};
use leptos::mount::mount_to_body;

fn main() {
	init_logging(Config::from_env().log_level);
	mount_to_body(App);
}
