use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    shardcat::example_apps::run_shard_inventory(std::env::args().skip(1))
}
