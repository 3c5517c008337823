use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    shardcat::example_apps::run_catalog_demo(std::env::args().skip(1))
}
